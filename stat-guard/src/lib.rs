//! # StatGuard - Statistical Readiness Validation for Rust
//!
//! StatGuard answers one question about a tabular dataset: is it
//! statistically sound enough to analyze? It runs a battery of
//! assumption checks (sample size, distribution shape, outliers,
//! missing-data mechanisms, correlation structure, unit integrity)
//! against a policy of thresholds and returns a structured report of
//! every violated assumption instead of a bare yes/no.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stat_guard::prelude::*;
//!
//! let data = Dataset::new(batch);
//! let options = ValidationOptions::new("metric")
//!     .group("treatment")
//!     .policy("experiment");
//!
//! let report = stat_guard::validate(&data, &options)?;
//! if !report.is_valid() {
//!     for violation in report.violations() {
//!         println!("{violation}");
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`core`**: the data model (`Severity`, `Violation`, `Policy`) plus the
//!   `Check` trait, `ValidationEngine`, and `ValidationReport`
//! - **`checks`**: all built-in check implementations, grouped by family
//! - **`dataset`**: Arrow-backed read-only tabular view consumed by checks
//! - **`stats`**: descriptive and inferential statistics primitives, plus
//!   optional capability providers (VIF, power analysis)
//! - **`profile`**: standalone dataset profiling
//! - **`compare`**: two-dataset drift comparison
//! - **`reporters`**: JSON / Markdown / HTML renderings of a report
//! - **`sources`**: DataFusion-backed file loading (CSV, Parquet, NDJSON)
//!
//! Checks never mutate data and never abort a run: an individual check that
//! cannot run is skipped or marked failed in the report, and the run
//! continues. Only configuration mistakes (unknown policy, missing target
//! column, unknown output format) surface as errors.

pub mod checks;
pub mod compare;
pub mod core;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod profile;
pub mod reporters;
pub mod sources;
pub mod stats;

#[cfg(test)]
pub mod test_helpers;

use std::collections::HashMap;

use crate::core::{ValidationEngine, ValidationOptions, ValidationReport};
use crate::dataset::Dataset;
use crate::error::Result;

/// Validates a dataset with a fresh engine carrying the default checks.
///
/// This is the main entry point for one-off validation. Construct a
/// [`ValidationEngine`] directly when you need custom checks, injected
/// providers, or to reuse the engine across runs.
pub fn validate(data: &Dataset, options: &ValidationOptions) -> Result<ValidationReport> {
    ValidationEngine::new().validate(data, options)
}

/// Validates several target columns, skipping any that are absent.
pub fn validate_multiple(
    data: &Dataset,
    targets: &[&str],
    options: &ValidationOptions,
) -> Result<HashMap<String, ValidationReport>> {
    ValidationEngine::new().validate_multiple(data, targets, options)
}

/// Quick validity check without inspecting the full report.
///
/// Returns `Ok(true)` when the default policy raises no critical or error
/// violations for the target column.
pub fn quick_check(data: &Dataset, target: &str) -> Result<bool> {
    let report = validate(data, &ValidationOptions::new(target))?;
    Ok(report.is_valid())
}

/// Specialized validation for A/B tests and experiments.
///
/// Uses the `experiment` policy, which carries stricter thresholds for
/// experimental data.
pub fn check_experiment(
    data: &Dataset,
    metric: &str,
    treatment: &str,
    unit: Option<&str>,
) -> Result<ValidationReport> {
    let mut options = ValidationOptions::new(metric)
        .group(treatment)
        .policy("experiment");
    if let Some(unit) = unit {
        options = options.unit(unit);
    }
    validate(data, &options)
}

/// Names of the built-in policy presets.
pub fn available_policies() -> &'static [&'static str] {
    crate::core::policy::PRESET_NAMES
}
