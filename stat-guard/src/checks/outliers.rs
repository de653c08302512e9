//! Outlier detection checks.

use serde_json::json;

use crate::core::check::{Check, CheckCategory, CheckContext, CheckOutcome, SkipReason};
use crate::core::policy::OutlierMethod;
use crate::core::severity::Severity;
use crate::core::violation::{codes, Violation};
use crate::dataset::Dataset;
use crate::stats::{median, median_abs_deviation, quantile, zscores};

/// Marks outliers in `values` with the given method and threshold.
///
/// The MAD method returns an all-false mask when the deviation collapses
/// to zero.
pub fn outlier_mask(values: &[f64], method: OutlierMethod, threshold: f64) -> Vec<bool> {
    match method {
        OutlierMethod::Iqr => {
            let (Some(q1), Some(q3)) = (quantile(values, 0.25), quantile(values, 0.75)) else {
                return vec![false; values.len()];
            };
            let iqr = q3 - q1;
            let lower = q1 - threshold * iqr;
            let upper = q3 + threshold * iqr;
            values.iter().map(|v| *v < lower || *v > upper).collect()
        }
        OutlierMethod::Zscore => {
            let z = zscores(values);
            if z.is_empty() {
                return vec![false; values.len()];
            }
            z.iter().map(|z| z.abs() > threshold).collect()
        }
        OutlierMethod::Mad => {
            let (Some(med), Some(mad)) = (median(values), median_abs_deviation(values)) else {
                return vec![false; values.len()];
            };
            if mad == 0.0 {
                return vec![false; values.len()];
            }
            values
                .iter()
                .map(|v| (0.6745 * (v - med) / mad).abs() > threshold)
                .collect()
        }
    }
}

/// Detects outliers per group using the policy's method and flags
/// one-sided outlier clusters.
#[derive(Debug, Default)]
pub struct OutlierCheck;

impl OutlierCheck {
    fn cluster_violation(values: &[f64], outliers: &[f64], group: &str) -> Option<Violation> {
        if outliers.len() < 5 {
            return None;
        }
        let med = median(values)?;
        let lower = outliers.iter().filter(|v| **v < med).count();
        let upper = outliers.len() - lower;
        if lower != 0 && upper != 0 {
            return None;
        }
        let side = if upper > 0 { "upper" } else { "lower" };
        Some(
            Violation::builder(codes::OUTLIER_CLUSTER, Severity::Warning)
                .message(format!(
                    "All outliers are on the {side} side in group '{group}'"
                ))
                .suggestion("Check for one-sided data collection issues or censoring")
                .context("group", group)
                .context("side", side)
                .context("outlier_count", outliers.len())
                .build(),
        )
    }
}

impl Check for OutlierCheck {
    fn name(&self) -> &str {
        "Outlier Detection"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Outliers
    }

    fn description(&self) -> &str {
        "Detects extreme values that may indicate errors or anomalies"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        let mut violations = Vec::new();
        for (group, values) in ctx.grouped(data) {
            if values.len() < 10 {
                continue;
            }
            let mask = outlier_mask(&values, ctx.policy.outlier_method, ctx.policy.outlier_threshold);
            let outliers: Vec<f64> = values
                .iter()
                .zip(&mask)
                .filter(|(_, m)| **m)
                .map(|(v, _)| *v)
                .collect();
            let pct = outliers.len() as f64 / values.len() as f64;
            let method = match ctx.policy.outlier_method {
                OutlierMethod::Iqr => "iqr",
                OutlierMethod::Zscore => "zscore",
                OutlierMethod::Mad => "mad",
            };

            if pct > ctx.policy.max_outlier_pct {
                let severity = if pct > 0.15 {
                    Severity::Error
                } else {
                    Severity::Warning
                };
                let min = outliers.iter().copied().fold(f64::MAX, f64::min);
                let max = outliers.iter().copied().fold(f64::MIN, f64::max);
                violations.push(
                    Violation::builder(codes::EXTREME_OUTLIERS, severity)
                        .message(format!(
                            "High outlier percentage ({:.1}%) in group '{group}'",
                            pct * 100.0
                        ))
                        .suggestion("Review outliers for data errors or consider robust methods")
                        .context("group", group.as_str())
                        .context("outlier_count", outliers.len())
                        .context("outlier_percentage", pct * 100.0)
                        .context("threshold_percentage", ctx.policy.max_outlier_pct * 100.0)
                        .context("method", method)
                        .context("outlier_range", json!({"min": min, "max": max}))
                        .build(),
                );
            } else if pct > 0.0 {
                violations.push(
                    Violation::builder(codes::MODERATE_OUTLIERS, Severity::Info)
                        .message(format!(
                            "Moderate outliers detected ({:.1}%) in group '{group}'",
                            pct * 100.0
                        ))
                        .suggestion("Review if outliers are valid data points")
                        .context("group", group.as_str())
                        .context("outlier_count", outliers.len())
                        .context("outlier_percentage", pct * 100.0)
                        .build(),
                );
            }

            if ctx.policy.flag_outlier_clusters && pct > 0.0 {
                if let Some(v) = Self::cluster_violation(&values, &outliers, &group) {
                    violations.push(v);
                }
            }
        }
        CheckOutcome::Completed(violations)
    }
}

/// Flags values beyond hard domain bounds from the policy.
#[derive(Debug, Default)]
pub struct ExtremeValueCheck;

impl Check for ExtremeValueCheck {
    fn name(&self) -> &str {
        "Extreme Values"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Outliers
    }

    fn description(&self) -> &str {
        "Validates values against domain-specific thresholds"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        let values = data.numeric_dropna(ctx.target);
        let mut violations = Vec::new();

        if let Some(lower_bound) = ctx.policy.lower_bound {
            let below: Vec<f64> = values.iter().copied().filter(|v| *v < lower_bound).collect();
            if !below.is_empty() {
                let min_value = values.iter().copied().fold(f64::MAX, f64::min);
                let examples: Vec<f64> = below.iter().take(5).copied().collect();
                violations.push(
                    Violation::builder(codes::EXTREME_OUTLIERS, Severity::Error)
                        .message(format!(
                            "{} values below lower bound ({lower_bound})",
                            below.len()
                        ))
                        .suggestion("Check for data entry errors or incorrect units")
                        .context("count", below.len())
                        .context("lower_bound", lower_bound)
                        .context("min_value", min_value)
                        .context("examples", json!(examples))
                        .build(),
                );
            }
        }

        if let Some(upper_bound) = ctx.policy.upper_bound {
            let above: Vec<f64> = values.iter().copied().filter(|v| *v > upper_bound).collect();
            if !above.is_empty() {
                let max_value = values.iter().copied().fold(f64::MIN, f64::max);
                let examples: Vec<f64> = above.iter().take(5).copied().collect();
                violations.push(
                    Violation::builder(codes::EXTREME_OUTLIERS, Severity::Error)
                        .message(format!(
                            "{} values above upper bound ({upper_bound})",
                            above.len()
                        ))
                        .suggestion("Check for data entry errors or incorrect units")
                        .context("count", above.len())
                        .context("upper_bound", upper_bound)
                        .context("max_value", max_value)
                        .context("examples", json!(examples))
                        .build(),
                );
            }
        }

        CheckOutcome::Completed(violations)
    }
}

/// Informational check suggesting winsorization for long-tailed data.
#[derive(Debug, Default)]
pub struct WinsorizationCheck;

impl Check for WinsorizationCheck {
    fn name(&self) -> &str {
        "Winsorization Recommendation"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Outliers
    }

    fn description(&self) -> &str {
        "Suggests winsorization for datasets with extreme values"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        let values = data.numeric_dropna(ctx.target);
        if values.len() < 100 {
            return CheckOutcome::Skipped(SkipReason::InsufficientData);
        }

        let wt = ctx.policy.winsorize_threshold;
        let (Some(lower_pctile), Some(upper_pctile)) =
            (quantile(&values, wt), quantile(&values, 1.0 - wt))
        else {
            return CheckOutcome::Skipped(SkipReason::InsufficientData);
        };
        let (Some(q1), Some(q3)) = (quantile(&values, 0.25), quantile(&values, 0.75)) else {
            return CheckOutcome::Skipped(SkipReason::InsufficientData);
        };
        if q3 - q1 <= 0.0 {
            return CheckOutcome::Skipped(SkipReason::DegenerateInput);
        }

        let lower_extreme = values.iter().filter(|v| **v < lower_pctile).count();
        let upper_extreme = values.iter().filter(|v| **v > upper_pctile).count();
        if lower_extreme > 0 || upper_extreme > 0 {
            return CheckOutcome::Completed(vec![Violation::builder(
                codes::MODERATE_OUTLIERS,
                Severity::Info,
            )
            .message(format!(
                "Consider winsorization at {:.1}% level",
                wt * 100.0
            ))
            .suggestion("Winsorization can reduce the impact of extreme values")
            .context("lower_extreme_count", lower_extreme)
            .context("upper_extreme_count", upper_extreme)
            .context("winsorize_threshold", wt)
            .context("lower_value", lower_pctile)
            .context("upper_value", upper_pctile)
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
    use crate::test_helpers::{linspace, numeric_dataset};

    fn ctx<'a>(policy: &'a Policy, providers: &'a Providers) -> CheckContext<'a> {
        CheckContext {
            target: "metric",
            group: None,
            unit: None,
            policy,
            providers,
        }
    }

    #[test]
    fn test_outlier_mask_iqr() {
        let mut values = linspace(0.0, 10.0, 20);
        values.push(1000.0);
        let mask = outlier_mask(&values, OutlierMethod::Iqr, 1.5);
        assert_eq!(mask.iter().filter(|m| **m).count(), 1);
        assert!(mask[20]);
    }

    #[test]
    fn test_outlier_mask_mad_zero_spread() {
        // mad of mostly-identical data collapses to zero: nothing flagged
        let values = vec![5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 100.0];
        let mask = outlier_mask(&values, OutlierMethod::Mad, 3.5);
        assert!(mask.iter().all(|m| !m));
    }

    #[test]
    fn test_outlier_mask_zscore() {
        let mut values = vec![0.0; 30];
        for (i, v) in values.iter_mut().enumerate() {
            *v = (i % 7) as f64;
        }
        values.push(500.0);
        let mask = outlier_mask(&values, OutlierMethod::Zscore, 3.0);
        assert!(mask[30]);
        assert_eq!(mask.iter().filter(|m| **m).count(), 1);
    }

    #[test]
    fn test_moderate_outliers_are_info() {
        let mut values = linspace(0.0, 10.0, 40);
        values.push(200.0);
        let data = numeric_dataset("metric", &values);
        let policy = Policy::default();
        let providers = Providers::default();
        let outcome = OutlierCheck.run(&data, &ctx(&policy, &providers));
        let violations = outcome.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code(), codes::MODERATE_OUTLIERS);
        assert_eq!(violations[0].severity(), Severity::Info);
    }

    #[test]
    fn test_heavy_contamination_is_error_with_cluster() {
        let mut values = linspace(0.0, 1.0, 50);
        // 10 far-out upper points: 16.7% outliers, all on one side
        values.extend(vec![500.0, 510.0, 520.0, 530.0, 540.0, 550.0, 560.0, 570.0, 580.0, 590.0]);
        let data = numeric_dataset("metric", &values);
        let policy = Policy::default();
        let providers = Providers::default();
        let outcome = OutlierCheck.run(&data, &ctx(&policy, &providers));
        let violations = outcome.violations();
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].code(), codes::EXTREME_OUTLIERS);
        assert_eq!(violations[0].severity(), Severity::Error);
        assert_eq!(violations[1].code(), codes::OUTLIER_CLUSTER);
        assert_eq!(violations[1].context()["side"], "upper");
    }

    #[test]
    fn test_extreme_value_bounds() {
        let data = numeric_dataset("metric", &[-10.0, 1.0, 2.0, 3.0, 150.0, 200.0]);
        let policy = Policy {
            lower_bound: Some(0.0),
            upper_bound: Some(100.0),
            ..Policy::default()
        };
        let providers = Providers::default();
        let outcome = ExtremeValueCheck.run(&data, &ctx(&policy, &providers));
        let violations = outcome.violations();
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].context()["count"], 1);
        assert_eq!(violations[0].context()["min_value"], -10.0);
        assert_eq!(violations[1].context()["count"], 2);
        assert_eq!(violations[1].context()["max_value"], 200.0);
    }

    #[test]
    fn test_winsorization_suggested_for_long_tails() {
        let mut values = linspace(0.0, 10.0, 150);
        values.push(10_000.0);
        let data = numeric_dataset("metric", &values);
        let policy = Policy::default();
        let providers = Providers::default();
        let outcome = WinsorizationCheck.run(&data, &ctx(&policy, &providers));
        let violations = outcome.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity(), Severity::Info);
    }

    #[test]
    fn test_winsorization_skips_small_samples() {
        let data = numeric_dataset("metric", &linspace(0.0, 1.0, 50));
        let policy = Policy::default();
        let providers = Providers::default();
        let outcome = WinsorizationCheck.run(&data, &ctx(&policy, &providers));
        assert!(matches!(
            outcome,
            CheckOutcome::Skipped(SkipReason::InsufficientData)
        ));
    }
}
