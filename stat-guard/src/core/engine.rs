//! The validation engine: runs every registered check and builds the report.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::checks::default_checks;
use crate::core::check::{BoxedCheck, Check, CheckContext, CheckOutcome};
use crate::core::policy::PolicyRef;
use crate::core::report::{ReportMetadata, ValidationReport};
use crate::dataset::Dataset;
use crate::error::{GuardError, Result};
use crate::stats::providers::Providers;

/// Per-run configuration for [`ValidationEngine::validate`].
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    target: String,
    group: Option<String>,
    unit: Option<String>,
    policy: PolicyRef,
    fail_fast: bool,
    include_summary_stats: bool,
}

impl ValidationOptions {
    /// Options for validating the given target column under the default
    /// policy, with summary statistics enabled.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            group: None,
            unit: None,
            policy: PolicyRef::default(),
            fail_fast: false,
            include_summary_stats: true,
        }
    }

    /// Sets the grouping column.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Sets the unit identifier column.
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Sets the policy, by preset name or inline.
    pub fn policy(mut self, policy: impl Into<PolicyRef>) -> Self {
        self.policy = policy.into();
        self
    }

    /// Stops the run at the first error or critical violation.
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Controls whether the summary-statistics blob is computed.
    pub fn include_summary_stats(mut self, include: bool) -> Self {
        self.include_summary_stats = include;
        self
    }

    /// The target column under analysis.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The configured grouping column, if any.
    pub fn group_col(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// The configured unit column, if any.
    pub fn unit_col(&self) -> Option<&str> {
        self.unit.as_deref()
    }
}

/// Orchestrates statistical validation checks over a dataset.
///
/// The engine holds an ordered registry of checks plus any custom checks
/// registered on top; a run executes them all in order and collects their
/// violations into a [`ValidationReport`]. Checks are isolated: a panicking
/// check is recorded as failed and the run continues.
///
/// # Examples
///
/// ```rust,ignore
/// use stat_guard::prelude::*;
///
/// let engine = ValidationEngine::new();
/// let report = engine.validate(&data, &ValidationOptions::new("revenue").group("arm"))?;
/// if !report.is_valid() {
///     eprintln!("{report}");
/// }
/// ```
#[derive(Debug)]
pub struct ValidationEngine {
    checks: Vec<BoxedCheck>,
    custom_checks: Vec<BoxedCheck>,
    providers: Providers,
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationEngine {
    /// An engine with the full default check registry.
    pub fn new() -> Self {
        Self {
            checks: default_checks(),
            custom_checks: Vec::new(),
            providers: Providers::default(),
        }
    }

    /// An engine running only the given checks.
    pub fn with_checks(checks: Vec<BoxedCheck>) -> Self {
        Self {
            checks,
            custom_checks: Vec::new(),
            providers: Providers::default(),
        }
    }

    /// Replaces the capability providers.
    pub fn with_providers(mut self, providers: Providers) -> Self {
        self.providers = providers;
        self
    }

    /// Registers a custom check, appended after the built-in registry.
    pub fn register(&mut self, check: impl Check + 'static) -> &mut Self {
        self.custom_checks.push(Box::new(check));
        self
    }

    /// Removes any check (built-in or custom) with the given name.
    pub fn unregister(&mut self, check_name: &str) -> &mut Self {
        self.checks.retain(|c| c.name() != check_name);
        self.custom_checks.retain(|c| c.name() != check_name);
        self
    }

    /// Restores the default registry and drops all custom checks.
    pub fn reset(&mut self) -> &mut Self {
        self.checks = default_checks();
        self.custom_checks.clear();
        self
    }

    /// Names of all registered checks, in execution order.
    pub fn list_checks(&self) -> Vec<&str> {
        self.checks
            .iter()
            .chain(&self.custom_checks)
            .map(|c| c.name())
            .collect()
    }

    /// Runs every registered check against the dataset.
    ///
    /// Fails before running anything when the target column is absent or
    /// the policy name is unknown. With `fail_fast`, the run stops at the
    /// first error or critical violation; the report still contains every
    /// violation recorded up to that point.
    pub fn validate(&self, data: &Dataset, options: &ValidationOptions) -> Result<ValidationReport> {
        if !data.has_column(options.target()) {
            return Err(GuardError::ColumnNotFound(options.target().to_string()));
        }
        let (policy, policy_label) = options.policy.resolve()?;

        info!(
            target_col = options.target(),
            group_col = options.group_col(),
            rows = data.num_rows(),
            policy = %policy_label,
            "starting validation run"
        );

        let mut report = ValidationReport::new(ReportMetadata {
            rows: data.num_rows(),
            columns: data.num_columns(),
            target_col: options.target().to_string(),
            group_col: options.group_col().map(String::from),
            unit_col: options.unit_col().map(String::from),
            policy: policy_label,
        });

        if options.include_summary_stats {
            report.set_summary_stats(crate::profile::summary_stats(
                data,
                options.target(),
                options.group_col(),
            ));
        }

        let ctx = CheckContext {
            target: options.target(),
            group: options.group_col(),
            unit: options.unit_col(),
            policy: &policy,
            providers: &self.providers,
        };

        for check in self.checks.iter().chain(&self.custom_checks) {
            let name = check.name();
            let start = Instant::now();
            debug!(check = name, "running check");

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| check.run(data, &ctx)))
                .unwrap_or_else(|_| CheckOutcome::Failed("check panicked".to_string()));

            match outcome {
                CheckOutcome::Completed(violations) => {
                    let passed = violations.is_empty();
                    for violation in violations {
                        let blocking = violation.severity().is_blocking();
                        report.add_violation(name, violation);
                        if options.fail_fast && blocking {
                            warn!(check = name, "stopping early on blocking violation");
                            report.mark_check_complete(name, passed);
                            report.record_duration(name, start.elapsed());
                            report.finalize();
                            return Ok(report);
                        }
                    }
                    report.mark_check_complete(name, passed);
                }
                CheckOutcome::Skipped(reason) => {
                    debug!(check = name, reason = reason.as_str(), "check skipped");
                    report.mark_check_complete(name, true);
                }
                CheckOutcome::Failed(error) => {
                    warn!(check = name, error = %error, "check failed");
                    report.mark_check_complete(name, false);
                }
            }
            report.record_duration(name, start.elapsed());
        }

        report.finalize();
        let summary = report.summary();
        info!(
            total = summary.total_checks,
            passed = summary.passed_checks,
            violations = summary.critical_count + summary.error_count + summary.warning_count + summary.info_count,
            valid = summary.is_valid,
            "validation run finished"
        );
        Ok(report)
    }

    /// Validates several target columns, skipping those absent from the
    /// dataset. Returns one report per validated column.
    pub fn validate_multiple(
        &self,
        data: &Dataset,
        targets: &[&str],
        options: &ValidationOptions,
    ) -> Result<HashMap<String, ValidationReport>> {
        let mut reports = HashMap::new();
        for target in targets {
            if !data.has_column(target) {
                debug!(target_col = target, "skipping absent target column");
                continue;
            }
            let per_target = ValidationOptions {
                target: target.to_string(),
                ..options.clone()
            };
            reports.insert(target.to_string(), self.validate(data, &per_target)?);
        }
        Ok(reports)
    }
}
