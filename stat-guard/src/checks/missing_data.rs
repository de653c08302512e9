//! Missing-data pattern checks.

use serde_json::json;

use crate::core::check::{Check, CheckCategory, CheckContext, CheckOutcome, SkipReason};
use crate::core::severity::Severity;
use crate::core::violation::{codes, Violation};
use crate::dataset::Dataset;
use crate::stats::inference::t_test;
use crate::stats::{mean, std_dev};

/// Detects systematic missingness: rates varying by group, and columns
/// whose missing masks are identical.
#[derive(Debug, Default)]
pub struct MissingPatternCheck;

impl Check for MissingPatternCheck {
    fn name(&self) -> &str {
        "Missing Pattern Analysis"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::MissingData
    }

    fn description(&self) -> &str {
        "Analyzes patterns and mechanisms of missing data"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        if !ctx.policy.flag_missing_pattern {
            return CheckOutcome::Skipped(SkipReason::DegenerateInput);
        }
        let rows = data.num_rows();
        if rows == 0 || data.num_columns() == 0 {
            return CheckOutcome::Skipped(SkipReason::InsufficientData);
        }

        let mut violations = Vec::new();

        if let Some(group_col) = ctx.group {
            let partitions = data.grouped_rows(group_col);
            if !partitions.is_empty() {
                let masks: Vec<Vec<bool>> = data
                    .column_names()
                    .iter()
                    .filter_map(|c| data.missing_mask(c))
                    .collect();
                let rates: Vec<(String, f64)> = partitions
                    .iter()
                    .map(|(group, indices)| {
                        let total = indices.len() * masks.len();
                        let missing: usize = masks
                            .iter()
                            .map(|mask| indices.iter().filter(|i| mask[**i]).count())
                            .sum();
                        (group.clone(), missing as f64 / total.max(1) as f64)
                    })
                    .collect();
                let values: Vec<f64> = rates.iter().map(|(_, r)| *r).collect();
                let spread = std_dev(&values);
                if spread > 0.05 {
                    let by_group: serde_json::Map<String, serde_json::Value> =
                        rates.into_iter().map(|(g, r)| (g, json!(r))).collect();
                    violations.push(
                        Violation::builder(codes::MISSING_NOT_AT_RANDOM, Severity::Warning)
                            .message("Missing data rates vary significantly across groups")
                            .suggestion("Investigate if missingness is related to group assignment")
                            .context("missing_by_group", serde_json::Value::Object(by_group))
                            .context("std", spread)
                            .build(),
                    );
                }
            }
        }

        let high_missing: Vec<&str> = data
            .column_names()
            .into_iter()
            .filter(|c| data.null_count(c) as f64 / rows as f64 > 0.1)
            .collect();
        if high_missing.len() >= 2 {
            for i in 0..high_missing.len() {
                for j in (i + 1)..high_missing.len() {
                    let (Some(mask1), Some(mask2)) = (
                        data.missing_mask(high_missing[i]),
                        data.missing_mask(high_missing[j]),
                    ) else {
                        continue;
                    };
                    if mask1 == mask2 {
                        violations.push(
                            Violation::builder(codes::MISSING_PATTERN, Severity::Info)
                                .message(format!(
                                    "Columns '{}' and '{}' have identical missing patterns",
                                    high_missing[i], high_missing[j]
                                ))
                                .suggestion("These columns may be derived from the same source")
                                .context("column1", high_missing[i])
                                .context("column2", high_missing[j])
                                .build(),
                        );
                    }
                }
            }
        }

        CheckOutcome::Completed(violations)
    }
}

/// Flags missing values in the target column itself.
#[derive(Debug, Default)]
pub struct MissingTargetCheck;

impl Check for MissingTargetCheck {
    fn name(&self) -> &str {
        "Target Missingness"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::MissingData
    }

    fn description(&self) -> &str {
        "Checks for missing values in the target variable"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        let rows = data.num_rows();
        if rows == 0 {
            return CheckOutcome::Skipped(SkipReason::InsufficientData);
        }

        let missing_count = data.null_count(ctx.target);
        if missing_count == 0 {
            return CheckOutcome::passed();
        }

        let missing_pct = missing_count as f64 / rows as f64;
        let severity = if missing_pct > 0.1 {
            Severity::Error
        } else {
            Severity::Warning
        };
        CheckOutcome::Completed(vec![Violation::builder(codes::EXCESSIVE_MISSING, severity)
            .message(format!(
                "Target column has {missing_count} missing values ({:.1}%)",
                missing_pct * 100.0
            ))
            .suggestion("Remove rows with missing targets or use imputation carefully")
            .context("missing_count", missing_count)
            .context("missing_percentage", missing_pct * 100.0)
            .context("total_rows", rows)
            .build()])
    }
}

/// Tests whether missingness in a feature is associated with the target's
/// value, a sign of a Missing Not At Random mechanism.
#[derive(Debug, Default)]
pub struct MissingFeatureRelationshipCheck;

impl Check for MissingFeatureRelationshipCheck {
    fn name(&self) -> &str {
        "Missing-Feature Relationship"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::MissingData
    }

    fn description(&self) -> &str {
        "Checks if missingness is related to other feature values"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        let rows = data.num_rows();
        let Some(target_values) = data.numeric_values(ctx.target) else {
            return CheckOutcome::Skipped(SkipReason::DegenerateInput);
        };

        let mut violations = Vec::new();
        for col in data.column_names() {
            if col == ctx.target {
                continue;
            }
            let Some(mask) = data.missing_mask(col) else { continue };
            let missing_total = mask.iter().filter(|m| **m).count();
            if missing_total < 5 || missing_total as f64 > rows as f64 * 0.9 {
                continue;
            }

            let mut when_missing = Vec::new();
            let mut when_present = Vec::new();
            for (is_missing, target) in mask.iter().zip(&target_values) {
                let Some(target) = target else { continue };
                if *is_missing {
                    when_missing.push(*target);
                } else {
                    when_present.push(*target);
                }
            }
            if when_missing.len() <= 5 || when_present.len() <= 5 {
                continue;
            }

            let Some(result) = t_test(&when_missing, &when_present) else {
                continue;
            };
            if result.p_value < 0.05 {
                violations.push(
                    Violation::builder(codes::MISSING_NOT_AT_RANDOM, Severity::Info)
                        .message(format!(
                            "Missingness in '{col}' is related to target values (p={:.4})",
                            result.p_value
                        ))
                        .suggestion("Consider MNAR mechanisms in your analysis")
                        .context("column", col)
                        .context("p_value", result.p_value)
                        .context("target_mean_when_missing", mean(&when_missing))
                        .context("target_mean_when_present", mean(&when_present))
                        .build(),
                );
            }
        }
        CheckOutcome::Completed(violations)
    }
}

/// Evaluates how much data listwise deletion would cost.
#[derive(Debug, Default)]
pub struct CompleteCaseCheck;

impl Check for CompleteCaseCheck {
    fn name(&self) -> &str {
        "Complete Case Analysis"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::MissingData
    }

    fn description(&self) -> &str {
        "Evaluates impact of listwise deletion"
    }

    fn run(&self, data: &Dataset, _ctx: &CheckContext<'_>) -> CheckOutcome {
        let total_cases = data.num_rows();
        if total_cases == 0 {
            return CheckOutcome::Skipped(SkipReason::InsufficientData);
        }

        let complete_cases = data.complete_row_count();
        let ratio = complete_cases as f64 / total_cases as f64;
        let cases_lost = total_cases - complete_cases;

        let severity = if ratio < 0.7 {
            Severity::Error
        } else if ratio < 0.9 {
            Severity::Warning
        } else {
            return CheckOutcome::passed();
        };
        let suggestion = if severity == Severity::Error {
            "Use multiple imputation or full information maximum likelihood"
        } else {
            "Consider imputation methods to retain more data"
        };

        CheckOutcome::Completed(vec![Violation::builder(
            codes::COMPLETE_CASE_RATIO_LOW,
            severity,
        )
        .message(format!(
            "Complete case analysis would lose {cases_lost} cases ({:.1}%)",
            (1.0 - ratio) * 100.0
        ))
        .suggestion(suggestion)
        .context("complete_cases", complete_cases)
        .context("total_cases", total_cases)
        .context("cases_lost", cases_lost)
        .context("retention_rate", ratio)
        .build()])
    }
}
