//! Correlation and multicollinearity checks.

use serde_json::json;

use crate::core::check::{Check, CheckCategory, CheckContext, CheckOutcome, SkipReason};
use crate::core::severity::Severity;
use crate::core::violation::{codes, Violation};
use crate::dataset::Dataset;
use crate::stats::{pearson, std_dev};

/// Rows where both columns are non-null, as aligned value pairs.
fn pairwise_complete(data: &Dataset, a: &str, b: &str) -> Option<(Vec<f64>, Vec<f64>)> {
    let xs = data.numeric_values(a)?;
    let ys = data.numeric_values(b)?;
    let mut left = Vec::new();
    let mut right = Vec::new();
    for (x, y) in xs.into_iter().zip(ys) {
        if let (Some(x), Some(y)) = (x, y) {
            left.push(x);
            right.push(y);
        }
    }
    Some((left, right))
}

/// Numeric columns with non-degenerate spread.
fn varying_numeric_columns<'a>(data: &'a Dataset) -> Vec<&'a str> {
    data.numeric_columns()
        .into_iter()
        .filter(|col| std_dev(&data.numeric_dropna(col)) > 1e-12)
        .collect()
}

/// Flags highly correlated pairs of numeric columns.
#[derive(Debug, Default)]
pub struct CorrelationCheck;

impl Check for CorrelationCheck {
    fn name(&self) -> &str {
        "Correlation Analysis"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Correlation
    }

    fn description(&self) -> &str {
        "Detects high correlations between variables"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        let columns = varying_numeric_columns(data);
        if columns.len() < 2 {
            return CheckOutcome::Skipped(SkipReason::InsufficientData);
        }

        let mut violations = Vec::new();
        for i in 0..columns.len() {
            for j in (i + 1)..columns.len() {
                let Some((xs, ys)) = pairwise_complete(data, columns[i], columns[j]) else {
                    continue;
                };
                let Some(r) = pearson(&xs, &ys) else { continue };
                if r.abs() > ctx.policy.max_correlation {
                    let (code, severity) = if r.abs() > 0.99 {
                        (codes::PERFECT_CORRELATION, Severity::Error)
                    } else {
                        (codes::HIGH_CORRELATION, Severity::Warning)
                    };
                    violations.push(
                        Violation::builder(code, severity)
                            .message(format!(
                                "High correlation ({r:.3}) between '{}' and '{}'",
                                columns[i], columns[j]
                            ))
                            .suggestion(
                                "Consider removing one variable or using dimensionality reduction",
                            )
                            .context("column1", columns[i])
                            .context("column2", columns[j])
                            .context("correlation", r)
                            .context("method", "pearson")
                            .build(),
                    );
                }
            }
        }
        CheckOutcome::Completed(violations)
    }
}

/// Detects multicollinearity through variance inflation factors.
/// VIF above 5 is problematic; above 10, severe.
#[derive(Debug, Default)]
pub struct MulticollinearityCheck;

impl Check for MulticollinearityCheck {
    fn name(&self) -> &str {
        "Multicollinearity (VIF)"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Correlation
    }

    fn description(&self) -> &str {
        "Detects multicollinearity using Variance Inflation Factor"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        let Some(provider) = ctx.providers.vif() else {
            return CheckOutcome::Skipped(SkipReason::ProviderUnavailable);
        };

        let feature_cols: Vec<&str> = data
            .numeric_columns()
            .into_iter()
            .filter(|c| *c != ctx.target)
            .collect();
        if feature_cols.len() < 2 {
            return CheckOutcome::Skipped(SkipReason::InsufficientData);
        }

        // Complete cases across all candidate features.
        let per_column: Vec<Vec<Option<f64>>> = feature_cols
            .iter()
            .filter_map(|c| data.numeric_values(c))
            .collect();
        let rows = data.num_rows();
        let complete: Vec<usize> = (0..rows)
            .filter(|row| per_column.iter().all(|col| col[*row].is_some()))
            .collect();

        let mut kept_names: Vec<&str> = Vec::new();
        let mut kept_values: Vec<Vec<f64>> = Vec::new();
        for (name, column) in feature_cols.iter().zip(&per_column) {
            let values: Vec<f64> = complete
                .iter()
                .map(|row| column[*row].unwrap_or_default())
                .collect();
            if std_dev(&values) > 1e-12 {
                kept_names.push(name);
                kept_values.push(values);
            }
        }
        if kept_names.len() < 2 {
            return CheckOutcome::Skipped(SkipReason::DegenerateInput);
        }

        let Some(vifs) = provider.vif(&kept_values) else {
            return CheckOutcome::Skipped(SkipReason::DegenerateInput);
        };

        let mut violations = Vec::new();
        for (feature, vif) in kept_names.iter().zip(vifs) {
            if vif > ctx.policy.vif_threshold {
                let severity = if vif > 10.0 {
                    Severity::Error
                } else {
                    Severity::Warning
                };
                violations.push(
                    Violation::builder(codes::MULTICOLLINEARITY, severity)
                        .message(format!("High VIF ({vif:.2}) for '{feature}'"))
                        .suggestion("Consider removing or combining correlated predictors")
                        .context("feature", *feature)
                        .context("vif", vif)
                        .context("threshold", ctx.policy.vif_threshold)
                        .build(),
                );
            }
        }
        CheckOutcome::Completed(violations)
    }
}

/// Surfaces features with negligible correlation to the target.
#[derive(Debug, Default)]
pub struct TargetCorrelationCheck;

impl Check for TargetCorrelationCheck {
    fn name(&self) -> &str {
        "Target Correlation"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Correlation
    }

    fn description(&self) -> &str {
        "Analyzes feature-target correlations"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        let feature_cols: Vec<&str> = data
            .numeric_columns()
            .into_iter()
            .filter(|c| *c != ctx.target)
            .collect();
        if feature_cols.is_empty() {
            return CheckOutcome::Skipped(SkipReason::InsufficientData);
        }

        let mut low: Vec<serde_json::Value> = Vec::new();
        for col in feature_cols {
            if std_dev(&data.numeric_dropna(col)) < 1e-12
                || std_dev(&data.numeric_dropna(ctx.target)) < 1e-12
            {
                continue;
            }
            let Some((xs, ys)) = pairwise_complete(data, col, ctx.target) else {
                continue;
            };
            let Some(r) = pearson(&xs, &ys) else { continue };
            if r.abs() < ctx.policy.min_target_correlation {
                low.push(json!({"feature": col, "correlation": r}));
            }
        }

        if low.is_empty() {
            return CheckOutcome::passed();
        }
        CheckOutcome::Completed(vec![Violation::builder(
            codes::HIGH_CORRELATION,
            Severity::Info,
        )
        .message(format!(
            "{} features have very low correlation with target",
            low.len()
        ))
        .suggestion("Consider feature selection or engineering")
        .context("low_correlation_features", json!(low))
        .context("threshold", ctx.policy.min_target_correlation)
        .build()])
    }
}

/// Compares feature-target correlations across groups; large gaps can
/// indicate moderation effects or data quality issues.
#[derive(Debug, Default)]
pub struct GroupCorrelationDifferenceCheck;

impl Check for GroupCorrelationDifferenceCheck {
    fn name(&self) -> &str {
        "Group Correlation Differences"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Correlation
    }

    fn description(&self) -> &str {
        "Checks for correlation differences between groups"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        let Some(group_col) = ctx.group else {
            return CheckOutcome::Skipped(SkipReason::MissingColumn);
        };
        let partitions = data.grouped_rows(group_col);
        if partitions.len() < 2 {
            return CheckOutcome::Skipped(SkipReason::InsufficientData);
        }

        let feature_cols: Vec<&str> = data
            .numeric_columns()
            .into_iter()
            .filter(|c| *c != ctx.target && *c != group_col)
            .collect();

        let target_values = match data.numeric_values(ctx.target) {
            Some(v) => v,
            None => return CheckOutcome::Skipped(SkipReason::DegenerateInput),
        };

        let mut violations = Vec::new();
        for col in feature_cols {
            let Some(col_values) = data.numeric_values(col) else {
                continue;
            };
            let mut correlations: Vec<(String, f64)> = Vec::new();

            for (group, rows) in &partitions {
                if rows.len() <= 5 {
                    continue;
                }
                let mut xs = Vec::new();
                let mut ys = Vec::new();
                for row in rows {
                    if let (Some(x), Some(y)) = (col_values[*row], target_values[*row]) {
                        xs.push(x);
                        ys.push(y);
                    }
                }
                if std_dev(&xs) < 1e-12 || std_dev(&ys) < 1e-12 {
                    continue;
                }
                if let Some(r) = pearson(&xs, &ys) {
                    correlations.push((group.clone(), r));
                }
            }

            if correlations.len() >= 2 {
                let max = correlations.iter().map(|(_, r)| *r).fold(f64::MIN, f64::max);
                let min = correlations.iter().map(|(_, r)| *r).fold(f64::MAX, f64::min);
                let max_diff = max - min;
                if max_diff > ctx.policy.max_correlation_diff {
                    let by_group: serde_json::Map<String, serde_json::Value> = correlations
                        .into_iter()
                        .map(|(g, r)| (g, json!(r)))
                        .collect();
                    violations.push(
                        Violation::builder(codes::HIGH_CORRELATION, Severity::Info)
                            .message(format!(
                                "Large correlation difference ({max_diff:.3}) for '{col}' between groups"
                            ))
                            .suggestion("Consider group-specific models or interaction terms")
                            .context("feature", col)
                            .context("correlations_by_group", serde_json::Value::Object(by_group))
                            .context("max_difference", max_diff)
                            .build(),
                    );
                }
            }
        }
        CheckOutcome::Completed(violations)
    }
}
