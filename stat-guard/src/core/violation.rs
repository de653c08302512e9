//! The violation data model and stable violation codes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::core::severity::Severity;

/// Stable violation codes, grouped by numeric range.
///
/// Ranges:
/// - `SG1xx`: sample size and power
/// - `SG2xx`: distribution and statistical assumptions
/// - `SG3xx`: data quality and integrity
/// - `SG4xx`: correlation and multicollinearity
/// - `SG5xx`: outliers and anomalies
/// - `SG6xx`: missing data
/// - `SG7xx`: categorical and cardinality
/// - `SG9xx`: data drift
pub mod codes {
    // Sample size & power (SG1xx)
    pub const SAMPLE_TOO_SMALL: &str = "SG101";
    pub const INSUFFICIENT_POWER: &str = "SG102";
    pub const UNBALANCED_GROUPS: &str = "SG103";
    pub const COVARIATE_IMBALANCE: &str = "SG104";

    // Distribution & assumptions (SG2xx)
    pub const ZERO_VARIANCE: &str = "SG201";
    pub const NEAR_ZERO_VARIANCE: &str = "SG202";
    pub const HIGH_SKEWNESS: &str = "SG203";
    pub const HIGH_KURTOSIS: &str = "SG204";
    pub const NON_NORMAL: &str = "SG205";
    pub const HETEROSCEDASTICITY: &str = "SG206";

    // Data quality & integrity (SG3xx)
    pub const DUPLICATE_OBSERVATIONS: &str = "SG301";
    pub const DUPLICATE_ROWS: &str = "SG302";
    pub const UNIT_LEAKAGE: &str = "SG303";
    pub const MISSING_UNIT_ID: &str = "SG304";
    pub const INCONSISTENT_DATA_TYPES: &str = "SG305";
    pub const CONSTANT_COLUMN: &str = "SG306";
    pub const SUSPICIOUS_PATTERN: &str = "SG307";

    // Correlation & multicollinearity (SG4xx)
    pub const HIGH_CORRELATION: &str = "SG401";
    pub const MULTICOLLINEARITY: &str = "SG402";
    pub const PERFECT_CORRELATION: &str = "SG403";

    // Outliers & anomalies (SG5xx)
    pub const EXTREME_OUTLIERS: &str = "SG501";
    pub const MODERATE_OUTLIERS: &str = "SG502";
    pub const OUTLIER_CLUSTER: &str = "SG503";

    // Missing data (SG6xx)
    pub const EXCESSIVE_MISSING: &str = "SG601";
    pub const MISSING_NOT_AT_RANDOM: &str = "SG602";
    pub const MISSING_PATTERN: &str = "SG603";
    pub const COMPLETE_CASE_RATIO_LOW: &str = "SG604";

    // Categorical & cardinality (SG7xx)
    pub const HIGH_CARDINALITY: &str = "SG701";
    pub const LOW_CARDINALITY: &str = "SG702";
    pub const RARE_CATEGORIES: &str = "SG703";
    pub const EMPTY_CATEGORIES: &str = "SG704";

    // Data drift (SG9xx)
    pub const DATA_DRIFT_DETECTED: &str = "SG901";
    pub const DISTRIBUTION_SHIFT: &str = "SG903";
}

/// A single validation violation with diagnostic context.
///
/// Violations are immutable once built, with one exception: the report stamps
/// `check_name` when the violation is recorded, so checks never need to know
/// their own registered name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    code: String,
    severity: Severity,
    message: String,
    suggestion: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    context: Map<String, Value>,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    check_name: String,
}

impl Violation {
    /// Starts building a violation with the given code and severity.
    pub fn builder(code: impl Into<String>, severity: Severity) -> ViolationBuilder {
        ViolationBuilder {
            code: code.into(),
            severity,
            message: String::new(),
            suggestion: String::new(),
            context: Map::new(),
        }
    }

    /// The stable `SG…` code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// How serious the violation is.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Human-readable description.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Recommended action.
    pub fn suggestion(&self) -> &str {
        &self.suggestion
    }

    /// Additional diagnostic values.
    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }

    /// When the violation was detected.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// The check that emitted this violation; empty until recorded.
    pub fn check_name(&self) -> &str {
        &self.check_name
    }

    /// Stamps the emitting check's name. First write wins.
    pub(crate) fn stamp_check_name(&mut self, name: &str) {
        if self.check_name.is_empty() {
            self.check_name = name.to_string();
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}\n  {}\n  → {}",
            self.severity.icon(),
            self.severity,
            self.code,
            self.message,
            self.suggestion
        )?;
        if !self.context.is_empty() {
            write!(f, "\n  Context: {}", Value::Object(self.context.clone()))?;
        }
        Ok(())
    }
}

/// Builder for [`Violation`].
#[derive(Debug)]
pub struct ViolationBuilder {
    code: String,
    severity: Severity,
    message: String,
    suggestion: String,
    context: Map<String, Value>,
}

impl ViolationBuilder {
    /// Sets the human-readable description.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Sets the recommended action.
    pub fn suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = suggestion.into();
        self
    }

    /// Adds one diagnostic value.
    pub fn context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Finalizes the violation, stamping the creation timestamp.
    pub fn build(self) -> Violation {
        Violation {
            code: self.code,
            severity: self.severity,
            message: self.message,
            suggestion: self.suggestion,
            context: self.context,
            timestamp: Utc::now(),
            check_name: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_context() {
        let v = Violation::builder(codes::SAMPLE_TOO_SMALL, Severity::Error)
            .message("Total sample size (12) below minimum (30)")
            .suggestion("Collect more data or use non-parametric methods")
            .context("actual", 12)
            .context("required", 30)
            .build();

        assert_eq!(v.code(), "SG101");
        assert_eq!(v.severity(), Severity::Error);
        assert_eq!(v.context()["actual"], 12);
        assert!(v.check_name().is_empty());
    }

    #[test]
    fn test_check_name_stamped_once() {
        let mut v = Violation::builder(codes::ZERO_VARIANCE, Severity::Error).build();
        v.stamp_check_name("Zero Variance");
        v.stamp_check_name("Something Else");
        assert_eq!(v.check_name(), "Zero Variance");
    }

    #[test]
    fn test_serialization_round_trip() {
        let v = Violation::builder(codes::NON_NORMAL, Severity::Warning)
            .message("Non-normal distribution detected")
            .context("p_value", 0.001)
            .build();
        let json = serde_json::to_string(&v).unwrap();
        let back: Violation = serde_json::from_str(&json).unwrap();
        assert_eq!(back.code(), v.code());
        assert_eq!(back.severity(), v.severity());
        assert_eq!(back.context()["p_value"], 0.001);
    }
}
