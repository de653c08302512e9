//! The validation report: everything a run found, keyed by check.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::core::severity::Severity;
use crate::core::violation::Violation;

/// Facts about the validated dataset and run configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub rows: usize,
    pub columns: usize,
    pub target_col: String,
    pub group_col: Option<String>,
    pub unit_col: Option<String>,
    pub policy: String,
}

/// Aggregate counts derived from a report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub total_checks: usize,
    pub passed_checks: usize,
    pub failed_checks: usize,
    pub success_rate: f64,
    pub critical_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub duration_seconds: f64,
    pub is_valid: bool,
}

/// Structured, multi-check validation report.
///
/// Violations are stored per check; flattened views preserve check
/// registration order, then emission order within a check.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    metadata: ReportMetadata,
    check_order: Vec<String>,
    by_check: HashMap<String, Vec<Violation>>,
    check_results: HashMap<String, bool>,
    check_durations: HashMap<String, Duration>,
    summary_stats: Option<Value>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl ValidationReport {
    /// Creates an empty report; the start timestamp is taken now.
    pub fn new(metadata: ReportMetadata) -> Self {
        Self {
            metadata,
            check_order: Vec::new(),
            by_check: HashMap::new(),
            check_results: HashMap::new(),
            check_durations: HashMap::new(),
            summary_stats: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Records a violation under the given check, stamping its check name.
    pub fn add_violation(&mut self, check_name: &str, mut violation: Violation) {
        violation.stamp_check_name(check_name);
        self.touch_check(check_name);
        self.by_check
            .entry(check_name.to_string())
            .or_default()
            .push(violation);
    }

    /// Marks a check as complete. Last write wins for repeated names.
    pub fn mark_check_complete(&mut self, check_name: &str, passed: bool) {
        self.touch_check(check_name);
        self.check_results.insert(check_name.to_string(), passed);
    }

    /// Records how long a check took.
    pub fn record_duration(&mut self, check_name: &str, duration: Duration) {
        self.check_durations.insert(check_name.to_string(), duration);
    }

    /// Attaches the summary-statistics blob computed for the target column.
    pub fn set_summary_stats(&mut self, stats: Value) {
        self.summary_stats = Some(stats);
    }

    /// Stamps the end timestamp. Calling again refreshes it, so a report
    /// that keeps accumulating results can be re-finalized.
    pub fn finalize(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    fn touch_check(&mut self, check_name: &str) {
        if !self.check_order.iter().any(|c| c == check_name) {
            self.check_order.push(check_name.to_string());
        }
    }

    /// Dataset and run configuration facts.
    pub fn metadata(&self) -> &ReportMetadata {
        &self.metadata
    }

    /// The summary-statistics blob, when computed.
    pub fn summary_stats(&self) -> Option<&Value> {
        self.summary_stats.as_ref()
    }

    /// All violations, in check order then emission order.
    pub fn violations(&self) -> Vec<&Violation> {
        self.check_order
            .iter()
            .filter_map(|check| self.by_check.get(check))
            .flatten()
            .collect()
    }

    /// Violations of one severity, preserving report order.
    pub fn by_severity(&self, severity: Severity) -> Vec<&Violation> {
        self.violations()
            .into_iter()
            .filter(|v| v.severity() == severity)
            .collect()
    }

    /// Critical violations.
    pub fn critical(&self) -> Vec<&Violation> {
        self.by_severity(Severity::Critical)
    }

    /// Error violations.
    pub fn errors(&self) -> Vec<&Violation> {
        self.by_severity(Severity::Error)
    }

    /// Warning violations.
    pub fn warnings(&self) -> Vec<&Violation> {
        self.by_severity(Severity::Warning)
    }

    /// Info violations.
    pub fn infos(&self) -> Vec<&Violation> {
        self.by_severity(Severity::Info)
    }

    /// Violations recorded by one check.
    pub fn violations_for(&self, check_name: &str) -> &[Violation] {
        self.by_check
            .get(check_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterates `(check, violations)` pairs in report order, including
    /// checks that recorded none.
    pub fn by_check(&self) -> impl Iterator<Item = (&str, &[Violation])> {
        self.check_order.iter().map(move |check| {
            (
                check.as_str(),
                self.by_check
                    .get(check)
                    .map(Vec::as_slice)
                    .unwrap_or_default(),
            )
        })
    }

    /// Pass/fail status per completed check.
    pub fn check_results(&self) -> &HashMap<String, bool> {
        &self.check_results
    }

    /// Wall-clock durations per check.
    pub fn check_durations(&self) -> &HashMap<String, Duration> {
        &self.check_durations
    }

    /// True when a specific violation code was recorded.
    pub fn has_code(&self, code: &str) -> bool {
        self.by_check
            .values()
            .flatten()
            .any(|v| v.code() == code)
    }

    /// No critical and no error violations.
    pub fn is_valid(&self) -> bool {
        !self
            .by_check
            .values()
            .flatten()
            .any(|v| v.severity().is_blocking())
    }

    /// No critical violations; analysis can proceed with caution.
    pub fn can_proceed(&self) -> bool {
        self.critical().is_empty()
    }

    /// Aggregate counts. Duration is zero until [`finalize`](Self::finalize)
    /// has been called; an empty report has a success rate of zero.
    pub fn summary(&self) -> ReportSummary {
        let total_checks = self.check_results.len();
        let passed_checks = self.check_results.values().filter(|p| **p).count();
        let duration_seconds = self
            .finished_at
            .map(|end| {
                (end - self.started_at)
                    .to_std()
                    .map(|d| d.as_secs_f64())
                    .unwrap_or(0.0)
            })
            .unwrap_or(0.0);

        ReportSummary {
            total_checks,
            passed_checks,
            failed_checks: total_checks - passed_checks,
            success_rate: if total_checks > 0 {
                passed_checks as f64 / total_checks as f64
            } else {
                0.0
            },
            critical_count: self.critical().len(),
            error_count: self.errors().len(),
            warning_count: self.warnings().len(),
            info_count: self.infos().len(),
            duration_seconds,
            is_valid: self.is_valid(),
        }
    }

    /// The full report as a JSON value.
    pub fn to_json_value(&self) -> Value {
        let violations: Vec<Value> = self
            .violations()
            .into_iter()
            .map(|v| serde_json::to_value(v).unwrap_or(Value::Null))
            .collect();

        let mut by_check = serde_json::Map::new();
        for (check, vs) in self.by_check() {
            if !vs.is_empty() {
                by_check.insert(
                    check.to_string(),
                    serde_json::to_value(vs).unwrap_or(Value::Null),
                );
            }
        }

        json!({
            "metadata": serde_json::to_value(&self.metadata).unwrap_or(Value::Null),
            "summary": serde_json::to_value(self.summary()).unwrap_or(Value::Null),
            "summary_stats": self.summary_stats.clone().unwrap_or(Value::Null),
            "violations": violations,
            "violations_by_check": Value::Object(by_check),
            "check_results": serde_json::to_value(&self.check_results).unwrap_or(Value::Null),
        })
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return write!(f, "✅ Validation passed (no statistical errors detected)");
        }

        writeln!(f, "❌ Validation failed:")?;
        writeln!(f, "   Critical: {}", self.critical().len())?;
        writeln!(f, "   Errors: {}", self.errors().len())?;
        writeln!(f, "   Warnings: {}", self.warnings().len())?;

        for (check, violations) in self.by_check() {
            if violations.is_empty() {
                continue;
            }
            write!(f, "\n[{check}]")?;
            for v in violations {
                write!(f, "\n  {v}")?;
            }
        }
        Ok(())
    }
}
