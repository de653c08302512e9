//! The check trait and the outcome model shared by all checks.

use serde::Serialize;
use std::fmt::Debug;

use crate::core::policy::Policy;
use crate::core::violation::Violation;
use crate::dataset::Dataset;
use crate::stats::providers::Providers;

/// The family a check belongs to, used for reporting only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckCategory {
    SampleSize,
    Distribution,
    Integrity,
    Outliers,
    Correlation,
    Cardinality,
    MissingData,
    Custom,
}

/// Why a check did not run to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Too few observations to evaluate anything.
    InsufficientData,
    /// Input is degenerate for this check (constant values, zero spread).
    DegenerateInput,
    /// An optional column (group, unit) the check needs is not configured.
    MissingColumn,
    /// The check depends on a capability provider that is not installed.
    ProviderUnavailable,
}

impl SkipReason {
    /// Human-readable reason used in log events.
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::InsufficientData => "insufficient data",
            SkipReason::DegenerateInput => "degenerate input",
            SkipReason::MissingColumn => "required column not configured",
            SkipReason::ProviderUnavailable => "provider unavailable",
        }
    }
}

/// What a single check execution produced.
///
/// Skips are a normal pass: the check could not say anything about this data
/// and records no violations. `Failed` marks the check as failed in the
/// report without synthesizing a violation; the engine uses it when a check
/// panics or reports an internal error.
#[derive(Debug, Clone)]
pub enum CheckOutcome {
    /// The check ran; zero violations means it passed.
    Completed(Vec<Violation>),
    /// The check could not evaluate this data and was skipped.
    Skipped(SkipReason),
    /// The check broke while running.
    Failed(String),
}

impl CheckOutcome {
    /// A completed outcome with no violations.
    pub fn passed() -> Self {
        CheckOutcome::Completed(Vec::new())
    }

    /// Returns the violations, if the check completed.
    pub fn violations(&self) -> &[Violation] {
        match self {
            CheckOutcome::Completed(v) => v,
            _ => &[],
        }
    }

    /// True when the outcome counts as a pass in the report.
    pub fn is_pass(&self) -> bool {
        match self {
            CheckOutcome::Completed(v) => v.is_empty(),
            CheckOutcome::Skipped(_) => true,
            CheckOutcome::Failed(_) => false,
        }
    }
}

impl From<Vec<Violation>> for CheckOutcome {
    fn from(violations: Vec<Violation>) -> Self {
        CheckOutcome::Completed(violations)
    }
}

/// Per-run inputs handed to every check.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    /// The numeric metric column under analysis.
    pub target: &'a str,
    /// Optional column defining experimental groups.
    pub group: Option<&'a str>,
    /// Optional column with unit identifiers.
    pub unit: Option<&'a str>,
    /// Resolved policy thresholds.
    pub policy: &'a Policy,
    /// Optional capability providers (VIF, power analysis).
    pub providers: &'a Providers,
}

impl<'a> CheckContext<'a> {
    /// Partitions the target column by the group column.
    ///
    /// Without a group column (or when the configured one is absent), the
    /// whole target becomes a single synthetic `all` partition. Nulls are
    /// dropped from each partition; rows whose group value is null are
    /// excluded entirely.
    pub fn grouped(&self, data: &Dataset) -> Vec<(String, Vec<f64>)> {
        data.grouped_numeric(self.target, self.group)
    }
}

/// A statistical validation check.
///
/// Implementations are stateless and reusable across datasets and runs.
/// A check must never error out of `run`: data it cannot handle produces
/// `Skipped` or `Failed`, not a panic.
///
/// # Examples
///
/// ```rust,ignore
/// use stat_guard::prelude::*;
///
/// #[derive(Debug)]
/// struct RowCountCheck;
///
/// impl Check for RowCountCheck {
///     fn name(&self) -> &str {
///         "Row Count"
///     }
///
///     fn category(&self) -> CheckCategory {
///         CheckCategory::Custom
///     }
///
///     fn run(&self, data: &Dataset, _ctx: &CheckContext<'_>) -> CheckOutcome {
///         if data.num_rows() == 0 {
///             return CheckOutcome::Completed(vec![Violation::builder(
///                 "SG901",
///                 Severity::Critical,
///             )
///             .message("Dataset is empty")
///             .build()]);
///         }
///         CheckOutcome::passed()
///     }
/// }
/// ```
pub trait Check: Debug + Send + Sync {
    /// Human-readable name, unique within an engine.
    fn name(&self) -> &str;

    /// The family this check belongs to.
    fn category(&self) -> CheckCategory;

    /// Brief description of what this check validates.
    fn description(&self) -> &str {
        ""
    }

    /// Executes the check against the dataset.
    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome;
}

/// A boxed check for use in the engine's registry.
pub type BoxedCheck = Box<dyn Check>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::severity::Severity;
    use crate::core::violation::codes;

    #[test]
    fn test_outcome_pass_semantics() {
        assert!(CheckOutcome::passed().is_pass());
        assert!(CheckOutcome::Skipped(SkipReason::MissingColumn).is_pass());
        assert!(!CheckOutcome::Failed("boom".into()).is_pass());

        let with_violation = CheckOutcome::Completed(vec![Violation::builder(
            codes::ZERO_VARIANCE,
            Severity::Error,
        )
        .build()]);
        assert!(!with_violation.is_pass());
        assert_eq!(with_violation.violations().len(), 1);
    }

    #[test]
    fn test_skipped_outcome_has_no_violations() {
        let skipped = CheckOutcome::Skipped(SkipReason::InsufficientData);
        assert!(skipped.violations().is_empty());
    }
}
