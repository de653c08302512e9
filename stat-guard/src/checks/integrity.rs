//! Unit integrity and data-quality checks.

use std::collections::{HashMap, HashSet};

use serde_json::json;

use crate::core::check::{Check, CheckCategory, CheckContext, CheckOutcome, SkipReason};
use crate::core::severity::Severity;
use crate::core::violation::{codes, Violation};
use crate::dataset::{ColumnKind, Dataset};

/// Validates unit identifier consistency: missing ids, duplicate ids, and
/// units leaking across groups.
#[derive(Debug, Default)]
pub struct UnitIntegrityCheck;

impl Check for UnitIntegrityCheck {
    fn name(&self) -> &str {
        "Unit Integrity"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Integrity
    }

    fn description(&self) -> &str {
        "Validates unit identifier consistency and prevents cross-group leakage"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        let Some(unit_col) = ctx.unit else {
            return CheckOutcome::Skipped(SkipReason::MissingColumn);
        };
        let Some(units) = data.labels(unit_col) else {
            return CheckOutcome::Skipped(SkipReason::MissingColumn);
        };

        let mut violations = Vec::new();
        let total = units.len();

        let missing = units.iter().filter(|u| u.is_none()).count();
        if missing > 0 {
            violations.push(
                Violation::builder(codes::MISSING_UNIT_ID, Severity::Error)
                    .message(format!("{missing} missing unit identifiers detected"))
                    .suggestion("Remove or fix null unit IDs before analysis")
                    .context("count", missing)
                    .context("percentage", missing as f64 / total as f64 * 100.0)
                    .build(),
            );
        }

        if ctx.policy.check_duplicate_units {
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for unit in units.iter().flatten() {
                *counts.entry(unit.as_str()).or_insert(0) += 1;
            }
            let mut dup_values: Vec<&str> = Vec::new();
            let mut seen: HashSet<&str> = HashSet::new();
            let mut total_duplicates = 0usize;
            for unit in units.iter().flatten() {
                if counts[unit.as_str()] > 1 {
                    total_duplicates += 1;
                    if seen.insert(unit.as_str()) {
                        dup_values.push(unit.as_str());
                    }
                }
            }
            if !dup_values.is_empty() {
                let examples: Vec<&str> = dup_values.iter().take(10).copied().collect();
                violations.push(
                    Violation::builder(codes::DUPLICATE_OBSERVATIONS, Severity::Error)
                        .message(format!(
                            "{} duplicate unit identifiers detected",
                            dup_values.len()
                        ))
                        .suggestion("Each unit must appear exactly once; aggregate or deduplicate")
                        .context("unique_duplicates", dup_values.len())
                        .context("total_duplicates", total_duplicates)
                        .context("examples", json!(examples))
                        .build(),
                );
            }
        }

        if let Some(group_col) = ctx.group {
            if let Some(groups) = data.labels(group_col) {
                let mut unit_groups: HashMap<&str, HashSet<&str>> = HashMap::new();
                let mut order: Vec<&str> = Vec::new();
                for (unit, group) in units.iter().zip(&groups) {
                    let (Some(unit), Some(group)) = (unit, group) else {
                        continue;
                    };
                    let entry = unit_groups.entry(unit.as_str()).or_default();
                    if entry.is_empty() {
                        order.push(unit.as_str());
                    }
                    entry.insert(group.as_str());
                }
                let leaking: Vec<&str> = order
                    .into_iter()
                    .filter(|u| unit_groups[u].len() > 1)
                    .collect();
                if !leaking.is_empty() {
                    let examples: Vec<&str> = leaking.iter().take(20).copied().collect();
                    violations.push(
                        Violation::builder(codes::UNIT_LEAKAGE, Severity::Error)
                            .message(format!("{} units appear in multiple groups", leaking.len()))
                            .suggestion("Fix group assignment to prevent unit-level leakage")
                            .context("leaking_units", json!(examples))
                            .context("total_leaking", leaking.len())
                            .build(),
                    );
                }
            }
        }

        CheckOutcome::Completed(violations)
    }
}

/// Detects completely identical rows.
#[derive(Debug, Default)]
pub struct DuplicateRowsCheck;

impl Check for DuplicateRowsCheck {
    fn name(&self) -> &str {
        "Duplicate Rows"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Integrity
    }

    fn description(&self) -> &str {
        "Detects completely identical rows"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        if !ctx.policy.check_duplicate_rows {
            return CheckOutcome::Skipped(SkipReason::DegenerateInput);
        }
        if data.num_rows() == 0 {
            return CheckOutcome::Skipped(SkipReason::InsufficientData);
        }

        let mask = data.duplicate_row_mask();
        let total_duplicates = mask.iter().filter(|d| **d).count();
        if total_duplicates == 0 {
            return CheckOutcome::passed();
        }

        let mut patterns: HashSet<String> = HashSet::new();
        for (row, flagged) in mask.iter().enumerate() {
            if *flagged {
                patterns.insert(data.row_key(row));
            }
        }

        CheckOutcome::Completed(vec![Violation::builder(
            codes::DUPLICATE_ROWS,
            Severity::Error,
        )
        .message(format!(
            "{total_duplicates} duplicate rows detected ({} unique patterns)",
            patterns.len()
        ))
        .suggestion("Remove duplicate rows before analysis")
        .context("total_duplicates", total_duplicates)
        .context("unique_patterns", patterns.len())
        .context(
            "percentage",
            total_duplicates as f64 / data.num_rows() as f64 * 100.0,
        )
        .build()])
    }
}

/// Overall and per-column missingness, plus the complete-case ratio.
#[derive(Debug, Default)]
pub struct MissingDataCheck;

impl Check for MissingDataCheck {
    fn name(&self) -> &str {
        "Missing Data"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Integrity
    }

    fn description(&self) -> &str {
        "Analyzes missing data patterns and completeness"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        let rows = data.num_rows();
        if rows == 0 || data.num_columns() == 0 {
            return CheckOutcome::Skipped(SkipReason::InsufficientData);
        }

        let mut violations = Vec::new();
        let total_cells = rows * data.num_columns();
        let missing_cells = data.total_missing_cells();
        let overall_pct = missing_cells as f64 / total_cells as f64;

        if overall_pct > ctx.policy.max_missing_pct {
            violations.push(
                Violation::builder(codes::EXCESSIVE_MISSING, Severity::Error)
                    .message(format!(
                        "Overall missing data ({:.1}%) exceeds threshold ({:.1}%)",
                        overall_pct * 100.0,
                        ctx.policy.max_missing_pct * 100.0
                    ))
                    .suggestion("Investigate missing data mechanism and consider imputation")
                    .context("overall_missing_pct", overall_pct)
                    .context("threshold", ctx.policy.max_missing_pct)
                    .context("total_missing", missing_cells)
                    .build(),
            );
        }

        let threshold = ctx.policy.max_missing_pct_column;
        let mut high_missing = serde_json::Map::new();
        for name in data.column_names() {
            let pct = data.null_count(name) as f64 / rows as f64;
            if pct > threshold {
                high_missing.insert(name.to_string(), json!(pct));
            }
        }
        if !high_missing.is_empty() {
            violations.push(
                Violation::builder(codes::EXCESSIVE_MISSING, Severity::Warning)
                    .message(format!(
                        "{} columns have >{:.0}% missing values",
                        high_missing.len(),
                        threshold * 100.0
                    ))
                    .suggestion("Consider removing high-missing columns or using advanced imputation")
                    .context("columns", serde_json::Value::Object(high_missing))
                    .context("threshold", threshold)
                    .build(),
            );
        }

        let complete_cases = data.complete_row_count();
        let ratio = complete_cases as f64 / rows as f64;
        if ratio < 0.5 {
            violations.push(
                Violation::builder(codes::COMPLETE_CASE_RATIO_LOW, Severity::Warning)
                    .message(format!(
                        "Only {:.1}% of rows are complete cases",
                        ratio * 100.0
                    ))
                    .suggestion(
                        "Consider using methods that handle missing data (e.g., multiple imputation)",
                    )
                    .context("complete_cases", complete_cases)
                    .context("total_rows", rows)
                    .context("ratio", ratio)
                    .build(),
            );
        }

        CheckOutcome::Completed(violations)
    }
}

/// Flags a string-typed target column carrying non-numeric values.
#[derive(Debug, Default)]
pub struct DataTypeCheck;

impl Check for DataTypeCheck {
    fn name(&self) -> &str {
        "Data Type Consistency"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Integrity
    }

    fn description(&self) -> &str {
        "Checks for consistent data types and suspicious conversions"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        if data.kind(ctx.target) != Some(ColumnKind::Categorical) {
            return CheckOutcome::passed();
        }

        let rows = data.num_rows();
        let non_null = rows - data.null_count(ctx.target);
        let parsed = data.numeric_dropna(ctx.target).len();
        let non_numeric = non_null.saturating_sub(parsed);

        if non_numeric > 0 {
            let dtype = data
                .column(ctx.target)
                .map(|a| a.data_type().to_string())
                .unwrap_or_default();
            return CheckOutcome::Completed(vec![Violation::builder(
                codes::INCONSISTENT_DATA_TYPES,
                Severity::Error,
            )
            .message(format!(
                "Target column contains {non_numeric} non-numeric values"
            ))
            .suggestion("Convert to numeric or exclude non-numeric values")
            .context("non_numeric_count", non_numeric)
            .context("dtype", dtype)
            .build()]);
        }

        CheckOutcome::passed()
    }
}

/// Detects a constant target column (single distinct value, nulls counted).
#[derive(Debug, Default)]
pub struct ConstantColumnCheck;

impl Check for ConstantColumnCheck {
    fn name(&self) -> &str {
        "Constant Columns"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Integrity
    }

    fn description(&self) -> &str {
        "Detects columns with only one unique value"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        if !ctx.policy.flag_constant_columns {
            return CheckOutcome::Skipped(SkipReason::DegenerateInput);
        }
        if data.num_rows() == 0 {
            return CheckOutcome::Skipped(SkipReason::InsufficientData);
        }

        if data.distinct_count(ctx.target, true) == 1 {
            let constant_value = data
                .labels(ctx.target)
                .and_then(|labels| labels.into_iter().next().flatten())
                .unwrap_or_else(|| "null".to_string());
            return CheckOutcome::Completed(vec![Violation::builder(
                codes::CONSTANT_COLUMN,
                Severity::Error,
            )
            .message(format!("Target column is constant (value: {constant_value})"))
            .suggestion("Remove constant columns as they provide no information")
            .context("constant_value", constant_value)
            .context("column", ctx.target)
            .build()]);
        }

        CheckOutcome::passed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::policy::Policy;
    use crate::stats::providers::Providers;
    use crate::test_helpers::{dataset_of, float_col, numeric_dataset, str_col};

    fn ctx<'a>(
        policy: &'a Policy,
        providers: &'a Providers,
        group: Option<&'a str>,
        unit: Option<&'a str>,
    ) -> CheckContext<'a> {
        CheckContext {
            target: "metric",
            group,
            unit,
            policy,
            providers,
        }
    }

    #[test]
    fn test_unit_integrity_reports_all_three_problems() {
        let data = dataset_of(vec![
            (
                "metric",
                float_col(vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)]),
            ),
            (
                "unit",
                str_col(vec![Some("u1"), Some("u1"), None, Some("u2"), Some("u2")]),
            ),
            (
                "arm",
                str_col(vec![Some("a"), Some("a"), Some("b"), Some("a"), Some("b")]),
            ),
        ]);
        let policy = Policy::default();
        let providers = Providers::default();
        let outcome =
            UnitIntegrityCheck.run(&data, &ctx(&policy, &providers, Some("arm"), Some("unit")));
        let violations = outcome.violations();
        assert_eq!(violations.len(), 3);
        assert_eq!(violations[0].code(), codes::MISSING_UNIT_ID);
        assert_eq!(violations[0].context()["count"], 1);
        assert_eq!(violations[1].code(), codes::DUPLICATE_OBSERVATIONS);
        assert_eq!(violations[1].context()["unique_duplicates"], 2);
        assert_eq!(violations[2].code(), codes::UNIT_LEAKAGE);
        // only u2 spans two groups; u1 stays in arm a
        assert_eq!(violations[2].context()["total_leaking"], 1);
    }

    #[test]
    fn test_unit_integrity_skips_without_unit_column() {
        let data = numeric_dataset("metric", &[1.0, 2.0]);
        let policy = Policy::default();
        let providers = Providers::default();
        let outcome = UnitIntegrityCheck.run(&data, &ctx(&policy, &providers, None, None));
        assert!(matches!(outcome, CheckOutcome::Skipped(SkipReason::MissingColumn)));
    }

    #[test]
    fn test_duplicate_rows_counts_patterns() {
        let data = dataset_of(vec![
            (
                "metric",
                float_col(vec![Some(1.0), Some(1.0), Some(2.0), Some(2.0), Some(3.0)]),
            ),
            (
                "arm",
                str_col(vec![Some("a"), Some("a"), Some("b"), Some("b"), Some("c")]),
            ),
        ]);
        let policy = Policy::default();
        let providers = Providers::default();
        let outcome = DuplicateRowsCheck.run(&data, &ctx(&policy, &providers, None, None));
        let violations = outcome.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].context()["total_duplicates"], 4);
        assert_eq!(violations[0].context()["unique_patterns"], 2);
        assert_eq!(violations[0].context()["percentage"], 80.0);
    }

    #[test]
    fn test_duplicate_rows_respects_policy_toggle() {
        let data = numeric_dataset("metric", &[1.0, 1.0]);
        let policy = Policy {
            check_duplicate_rows: false,
            ..Policy::default()
        };
        let providers = Providers::default();
        let outcome = DuplicateRowsCheck.run(&data, &ctx(&policy, &providers, None, None));
        assert!(outcome.is_pass());
    }

    #[test]
    fn test_missing_data_flags_overall_and_columns() {
        let data = dataset_of(vec![
            (
                "metric",
                float_col(vec![Some(1.0), None, None, None, Some(5.0)]),
            ),
            (
                "other",
                float_col(vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)]),
            ),
        ]);
        let policy = Policy::default();
        let providers = Providers::default();
        let outcome = MissingDataCheck.run(&data, &ctx(&policy, &providers, None, None));
        let violations = outcome.violations();
        // 30% overall missing, metric column 60% missing, 40% complete rows
        assert_eq!(violations.len(), 3);
        assert_eq!(violations[0].severity(), Severity::Error);
        assert!(violations[1].context()["columns"]["metric"].as_f64().unwrap() > 0.5);
        assert_eq!(violations[2].code(), codes::COMPLETE_CASE_RATIO_LOW);
    }

    #[test]
    fn test_data_type_flags_non_numeric_strings() {
        let data = dataset_of(vec![(
            "metric",
            str_col(vec![Some("1.5"), Some("oops"), Some("n/a"), None, Some("3")]),
        )]);
        let policy = Policy::default();
        let providers = Providers::default();
        let outcome = DataTypeCheck.run(&data, &ctx(&policy, &providers, None, None));
        let violations = outcome.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].context()["non_numeric_count"], 2);
    }

    #[test]
    fn test_data_type_passes_numeric_column() {
        let data = numeric_dataset("metric", &[1.0, 2.0, 3.0]);
        let policy = Policy::default();
        let providers = Providers::default();
        assert!(DataTypeCheck
            .run(&data, &ctx(&policy, &providers, None, None))
            .is_pass());
    }

    #[test]
    fn test_constant_column_flags_single_value() {
        let data = numeric_dataset("metric", &[7.0; 10]);
        let policy = Policy::default();
        let providers = Providers::default();
        let outcome = ConstantColumnCheck.run(&data, &ctx(&policy, &providers, None, None));
        let violations = outcome.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].context()["column"], "metric");
    }

    #[test]
    fn test_constant_column_with_nulls_is_not_constant() {
        let data = dataset_of(vec![(
            "metric",
            float_col(vec![Some(7.0), Some(7.0), None]),
        )]);
        let policy = Policy::default();
        let providers = Providers::default();
        assert!(ConstantColumnCheck
            .run(&data, &ctx(&policy, &providers, None, None))
            .is_pass());
    }
}
