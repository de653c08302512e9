//! Cardinality and categorical-variable checks.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

use crate::core::check::{Check, CheckCategory, CheckContext, CheckOutcome, SkipReason};
use crate::core::severity::Severity;
use crate::core::violation::{codes, Violation};
use crate::dataset::Dataset;

/// Flags unusual cardinality per column: likely identifiers, near-constant
/// columns, and rare categories.
#[derive(Debug, Default)]
pub struct CardinalityCheck;

impl Check for CardinalityCheck {
    fn name(&self) -> &str {
        "Cardinality"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Cardinality
    }

    fn description(&self) -> &str {
        "Checks for unusual cardinality in categorical variables"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        let n_total = data.num_rows();
        if n_total == 0 {
            return CheckOutcome::Skipped(SkipReason::InsufficientData);
        }

        let mut violations = Vec::new();
        for col in data.column_names() {
            let n_unique = data.distinct_count(col, true);
            let ratio = n_unique as f64 / n_total as f64;

            if ratio > ctx.policy.max_cardinality_ratio {
                violations.push(
                    Violation::builder(codes::HIGH_CARDINALITY, Severity::Warning)
                        .message(format!(
                            "High cardinality in '{col}' ({n_unique}/{n_total} = {:.1}%)",
                            ratio * 100.0
                        ))
                        .suggestion("Column may be an identifier; consider excluding from analysis")
                        .context("column", col)
                        .context("unique_values", n_unique)
                        .context("total_rows", n_total)
                        .context("cardinality_ratio", ratio)
                        .context("threshold", ctx.policy.max_cardinality_ratio)
                        .build(),
                );
            }

            if ratio < ctx.policy.min_cardinality_ratio && n_unique > 1 {
                violations.push(
                    Violation::builder(codes::LOW_CARDINALITY, Severity::Info)
                        .message(format!(
                            "Low cardinality in '{col}' ({n_unique} unique values)"
                        ))
                        .suggestion("Consider if this variable provides enough information")
                        .context("column", col)
                        .context("unique_values", n_unique)
                        .context("cardinality_ratio", ratio)
                        .build(),
                );
            }

            if n_unique > 1 {
                let threshold = ctx.policy.rare_category_threshold;
                let rare: Vec<(String, usize)> = data
                    .value_counts(col)
                    .into_iter()
                    .filter(|(_, count)| *count < threshold)
                    .collect();
                if !rare.is_empty() {
                    let rare_map: serde_json::Map<String, serde_json::Value> = rare
                        .iter()
                        .map(|(cat, count)| (cat.clone(), json!(count)))
                        .collect();
                    violations.push(
                        Violation::builder(codes::RARE_CATEGORIES, Severity::Warning)
                            .message(format!(
                                "{} rare categories in '{col}' (<{threshold} occurrences)",
                                rare.len()
                            ))
                            .suggestion(
                                "Consider combining rare categories or using regularization",
                            )
                            .context("column", col)
                            .context("rare_category_count", rare.len())
                            .context("threshold", threshold)
                            .context("rare_categories", serde_json::Value::Object(rare_map))
                            .build(),
                    );
                }
            }
        }
        CheckOutcome::Completed(violations)
    }
}

/// Detects columns that are entirely null.
///
/// Not part of the default registry; register it when working with
/// sparse categorical panels.
#[derive(Debug, Default)]
pub struct EmptyCategoryCheck;

impl Check for EmptyCategoryCheck {
    fn name(&self) -> &str {
        "Empty Categories"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Cardinality
    }

    fn description(&self) -> &str {
        "Detects categories with no valid data"
    }

    fn run(&self, data: &Dataset, _ctx: &CheckContext<'_>) -> CheckOutcome {
        let rows = data.num_rows();
        if rows == 0 {
            return CheckOutcome::Skipped(SkipReason::InsufficientData);
        }

        let mut violations = Vec::new();
        for col in data.column_names() {
            let null_count = data.null_count(col);
            if null_count == rows {
                violations.push(
                    Violation::builder(codes::EMPTY_CATEGORIES, Severity::Error)
                        .message(format!("Column '{col}' is entirely null"))
                        .suggestion("Remove this column from analysis")
                        .context("column", col)
                        .context("null_count", null_count)
                        .build(),
                );
            }
        }
        CheckOutcome::Completed(violations)
    }
}

/// Checks whether categorical distributions stay balanced across groups.
#[derive(Debug, Default)]
pub struct CategoricalBalanceCheck;

impl Check for CategoricalBalanceCheck {
    fn name(&self) -> &str {
        "Categorical Balance"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Cardinality
    }

    fn description(&self) -> &str {
        "Checks if categorical distributions are balanced across groups"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        let Some(group_col) = ctx.group else {
            return CheckOutcome::Skipped(SkipReason::MissingColumn);
        };
        let Some(group_labels) = data.labels(group_col) else {
            return CheckOutcome::Skipped(SkipReason::MissingColumn);
        };

        let cat_cols: Vec<&str> = data
            .categorical_columns()
            .into_iter()
            .filter(|c| *c != ctx.target && *c != group_col)
            .collect();

        let mut violations = Vec::new();
        for col in cat_cols {
            let Some(labels) = data.labels(col) else { continue };

            // crosstab: category -> group -> count, first-appearance order
            let mut categories: Vec<String> = Vec::new();
            let mut groups: Vec<String> = Vec::new();
            let mut counts: std::collections::HashMap<(String, String), usize> =
                std::collections::HashMap::new();
            for (category, group) in labels.iter().zip(&group_labels) {
                let (Some(category), Some(group)) = (category, group) else {
                    continue;
                };
                if !categories.contains(category) {
                    categories.push(category.clone());
                }
                if !groups.contains(group) {
                    groups.push(group.clone());
                }
                *counts
                    .entry((category.clone(), group.clone()))
                    .or_insert(0) += 1;
            }

            for category in &categories {
                let row: Vec<(String, usize)> = groups
                    .iter()
                    .map(|g| {
                        (
                            g.clone(),
                            counts
                                .get(&(category.clone(), g.clone()))
                                .copied()
                                .unwrap_or(0),
                        )
                    })
                    .collect();
                let min = row.iter().map(|(_, c)| *c).min().unwrap_or(0);
                let max = row.iter().map(|(_, c)| *c).max().unwrap_or(0);
                if min == 0 {
                    continue;
                }
                let ratio = max as f64 / min as f64;
                if ratio > ctx.policy.max_imbalance_ratio {
                    let distribution: serde_json::Map<String, serde_json::Value> =
                        row.into_iter().map(|(g, c)| (g, json!(c))).collect();
                    violations.push(
                        Violation::builder(codes::UNBALANCED_GROUPS, Severity::Warning)
                            .message(format!(
                                "Category '{category}' in '{col}' is imbalanced across groups (ratio={ratio:.2})"
                            ))
                            .suggestion("Check for sampling bias or stratification issues")
                            .context("column", col)
                            .context("category", category.as_str())
                            .context("imbalance_ratio", ratio)
                            .context("distribution", serde_json::Value::Object(distribution))
                            .build(),
                    );
                }
            }
        }
        CheckOutcome::Completed(violations)
    }
}

/// Column names that look like identifiers: an `id`/`key` suffix or a
/// well-known identifier name.
static ID_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(id|key)$|^(uuid|guid|index|row_number)$").unwrap());

/// Detects likely ID columns: every row unique, plus an id-like name or
/// sequential values.
#[derive(Debug, Default)]
pub struct IdColumnDetectionCheck;

impl IdColumnDetectionCheck {
    fn is_sequential(values: &[f64]) -> bool {
        if values.len() < 2 {
            return false;
        }
        values.windows(2).all(|w| w[1] - w[0] == 1.0)
    }

    fn has_id_name(name: &str) -> bool {
        ID_NAME.is_match(name)
    }
}

impl Check for IdColumnDetectionCheck {
    fn name(&self) -> &str {
        "ID Column Detection"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Cardinality
    }

    fn description(&self) -> &str {
        "Detects potential ID columns that should be excluded from analysis"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        let n_total = data.num_rows();
        if n_total == 0 {
            return CheckOutcome::Skipped(SkipReason::InsufficientData);
        }

        let mut violations = Vec::new();
        for col in data.column_names() {
            if col == ctx.target || Some(col) == ctx.group || Some(col) == ctx.unit {
                continue;
            }
            let n_unique = data.distinct_count(col, true);
            if n_unique != n_total {
                continue;
            }

            let sample: Vec<f64> = data
                .numeric_dropna(col)
                .into_iter()
                .take(100)
                .collect();
            let sequential = Self::is_sequential(&sample);
            if Self::has_id_name(col) || sequential {
                violations.push(
                    Violation::builder(codes::HIGH_CARDINALITY, Severity::Warning)
                        .message(format!(
                            "Column '{col}' appears to be an ID column (all unique values)"
                        ))
                        .suggestion("Exclude ID columns from statistical analysis")
                        .context("column", col)
                        .context("unique_values", n_unique)
                        .context("pattern", if sequential { "sequential" } else { "random" })
                        .build(),
                );
            }
        }
        CheckOutcome::Completed(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::policy::Policy;
    use crate::stats::providers::Providers;
    use crate::test_helpers::{dataset_of, float_col, str_col};

    fn ctx<'a>(policy: &'a Policy, providers: &'a Providers, group: Option<&'a str>) -> CheckContext<'a> {
        CheckContext {
            target: "metric",
            group,
            unit: None,
            policy,
            providers,
        }
    }

    fn floats(values: &[f64]) -> arrow::array::ArrayRef {
        float_col(values.iter().copied().map(Some).collect())
    }

    #[test]
    fn test_cardinality_flags_rare_categories() {
        // 200 rows: two common categories plus two rare ones
        let labels: Vec<Option<&str>> = (0..200)
            .map(|i| {
                Some(match i {
                    0 => "rare_a",
                    1 | 2 => "rare_b",
                    i if i % 2 == 0 => "big_x",
                    _ => "big_y",
                })
            })
            .collect();
        let values: Vec<f64> = (0..200).map(|i| i as f64).collect();
        let data = dataset_of(vec![
            ("metric", floats(&values)),
            ("segment", str_col(labels)),
        ]);
        let policy = Policy::default();
        let providers = Providers::default();
        let outcome = CardinalityCheck.run(&data, &ctx(&policy, &providers, None));
        let rare: Vec<_> = outcome
            .violations()
            .iter()
            .filter(|v| v.code() == codes::RARE_CATEGORIES)
            .cloned()
            .collect();
        assert_eq!(rare.len(), 1);
        assert_eq!(rare[0].context()["rare_category_count"], 2);
        assert_eq!(rare[0].context()["rare_categories"]["rare_a"], 1);
    }

    #[test]
    fn test_cardinality_flags_low_cardinality() {
        // 300 rows, 2 distinct values: ratio below 1%
        let values: Vec<f64> = (0..300).map(|i| (i % 2) as f64).collect();
        let data = dataset_of(vec![("metric", floats(&values))]);
        let policy = Policy::default();
        let providers = Providers::default();
        let outcome = CardinalityCheck.run(&data, &ctx(&policy, &providers, None));
        let low: Vec<_> = outcome
            .violations()
            .iter()
            .filter(|v| v.code() == codes::LOW_CARDINALITY)
            .cloned()
            .collect();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].severity(), Severity::Info);
    }

    #[test]
    fn test_empty_category_flags_all_null_column() {
        let data = dataset_of(vec![
            ("metric", floats(&[1.0, 2.0, 3.0])),
            ("void", float_col(vec![None, None, None])),
        ]);
        let policy = Policy::default();
        let providers = Providers::default();
        let outcome = EmptyCategoryCheck.run(&data, &ctx(&policy, &providers, None));
        let violations = outcome.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code(), codes::EMPTY_CATEGORIES);
        assert_eq!(violations[0].context()["column"], "void");
    }

    #[test]
    fn test_categorical_balance_detects_skewed_category() {
        // category "urban" appears 9 times in arm a, 2 in arm b
        let mut segments = Vec::new();
        let mut arms = Vec::new();
        let mut values = Vec::new();
        for i in 0..22 {
            values.push(Some(i as f64));
            if i < 11 {
                segments.push(Some("urban"));
                arms.push(Some(if i < 9 { "a" } else { "b" }));
            } else {
                segments.push(Some("rural"));
                arms.push(Some(if i % 2 == 0 { "a" } else { "b" }));
            }
        }
        let data = dataset_of(vec![
            ("metric", float_col(values)),
            ("segment", str_col(segments)),
            ("arm", str_col(arms)),
        ]);
        let policy = Policy::default();
        let providers = Providers::default();
        let outcome = CategoricalBalanceCheck.run(&data, &ctx(&policy, &providers, Some("arm")));
        let violations = outcome.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].context()["category"], "urban");
        assert_eq!(violations[0].context()["imbalance_ratio"], 4.5);
    }

    #[test]
    fn test_id_name_pattern() {
        for name in ["user_id", "ID", "session_key", "UUID", "guid", "index", "row_number"] {
            assert!(IdColumnDetectionCheck::has_id_name(name), "{name}");
        }
        for name in ["metric", "revenue", "identity_score", "keyword"] {
            assert!(!IdColumnDetectionCheck::has_id_name(name), "{name}");
        }
    }

    #[test]
    fn test_id_column_detection_by_name_and_sequence() {
        let ids: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let randoms: Vec<f64> = (0..50).map(|i| ((i * 37) % 50) as f64).collect();
        let values: Vec<f64> = (0..50).map(|i| (i % 5) as f64).collect();
        let data = dataset_of(vec![
            ("metric", floats(&values)),
            ("row_number", floats(&ids)),
            ("shuffled", floats(&randoms)),
        ]);
        let policy = Policy::default();
        let providers = Providers::default();
        let outcome = IdColumnDetectionCheck.run(&data, &ctx(&policy, &providers, None));
        let violations = outcome.violations();
        // row_number flags by name AND sequence; shuffled is all-unique but
        // neither named like an id nor sequential
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].context()["column"], "row_number");
        assert_eq!(violations[0].context()["pattern"], "sequential");
    }
}
