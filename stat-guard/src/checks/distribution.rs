//! Distribution-shape and statistical-assumption checks.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

use crate::core::check::{Check, CheckCategory, CheckContext, CheckOutcome, SkipReason};
use crate::core::severity::Severity;
use crate::core::violation::{codes, Violation};
use crate::dataset::Dataset;
use crate::stats::inference::{levene_test, normality_test};
use crate::stats::{distinct, kurtosis, sample_variance, skewness, std_dev};

/// Detects zero or near-zero variance per group.
#[derive(Debug, Default)]
pub struct ZeroVarianceCheck;

impl Check for ZeroVarianceCheck {
    fn name(&self) -> &str {
        "Zero Variance"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Distribution
    }

    fn description(&self) -> &str {
        "Checks for columns with no or minimal variation"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        let mut violations = Vec::new();
        for (group, values) in ctx.grouped(data) {
            if values.len() < 2 {
                continue;
            }
            let variance = sample_variance(&values);
            let n_unique = distinct(&values);
            if n_unique <= 1 || variance < ctx.policy.variance_threshold {
                violations.push(
                    Violation::builder(codes::ZERO_VARIANCE, Severity::Error)
                        .message(format!(
                            "Zero or near-zero variance in group '{group}' (var={variance:.2e})"
                        ))
                        .suggestion(
                            "Metric has no variability - check data collection or choose different metric",
                        )
                        .context("group", group)
                        .context("variance", variance)
                        .context("unique_values", n_unique)
                        .build(),
                );
            }
        }
        CheckOutcome::Completed(violations)
    }
}

/// Detects a single dominant value in the target column.
#[derive(Debug, Default)]
pub struct NearZeroVarianceCheck;

impl Check for NearZeroVarianceCheck {
    fn name(&self) -> &str {
        "Near-Zero Variance"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Distribution
    }

    fn description(&self) -> &str {
        "Detects columns where one value dominates"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        let counts = data.value_counts(ctx.target);
        let total: usize = counts.iter().map(|(_, c)| c).sum();
        if total == 0 {
            return CheckOutcome::Skipped(SkipReason::InsufficientData);
        }

        let (dominant, count) = &counts[0];
        let frequency = *count as f64 / total as f64;
        if frequency > ctx.policy.near_zero_variance_ratio {
            return CheckOutcome::Completed(vec![Violation::builder(
                codes::NEAR_ZERO_VARIANCE,
                Severity::Warning,
            )
            .message(format!(
                "Near-zero variance: {:.1}% of values are {dominant}",
                frequency * 100.0
            ))
            .suggestion(
                "Check for imputed values, data quality issues, or consider removing this variable",
            )
            .context("dominant_value", dominant.as_str())
            .context("frequency", frequency)
            .context("threshold", ctx.policy.near_zero_variance_ratio)
            .build()]);
        }

        CheckOutcome::passed()
    }
}

/// Flags strongly asymmetric distributions per group.
#[derive(Debug, Default)]
pub struct SkewnessCheck;

impl Check for SkewnessCheck {
    fn name(&self) -> &str {
        "Skewness"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Distribution
    }

    fn description(&self) -> &str {
        "Checks for asymmetric distributions"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        let mut violations = Vec::new();
        for (group, values) in ctx.grouped(data) {
            if values.len() < 10 {
                continue;
            }
            let Some(s) = skewness(&values) else { continue };
            if s.abs() > ctx.policy.max_skewness {
                let severity = if s.abs() > 4.0 {
                    Severity::Error
                } else {
                    Severity::Warning
                };
                violations.push(
                    Violation::builder(codes::HIGH_SKEWNESS, severity)
                        .message(format!("High skewness ({s:.2}) in group '{group}'"))
                        .suggestion(
                            "Mean may be misleading; consider median, log-transform, or non-parametric tests",
                        )
                        .context("group", group)
                        .context("skewness", s)
                        .context("threshold", ctx.policy.max_skewness)
                        .context("direction", if s > 0.0 { "right" } else { "left" })
                        .build(),
                );
            }
        }
        CheckOutcome::Completed(violations)
    }
}

/// Flags extreme tail behavior per group.
#[derive(Debug, Default)]
pub struct KurtosisCheck;

impl Check for KurtosisCheck {
    fn name(&self) -> &str {
        "Kurtosis"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Distribution
    }

    fn description(&self) -> &str {
        "Checks for unusual tail behavior in distributions"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        let mut violations = Vec::new();
        for (group, values) in ctx.grouped(data) {
            if values.len() < 20 {
                continue;
            }
            let Some(k) = kurtosis(&values) else { continue };
            if k.abs() > ctx.policy.max_kurtosis {
                violations.push(
                    Violation::builder(codes::HIGH_KURTOSIS, Severity::Warning)
                        .message(format!("High kurtosis ({k:.2}) in group '{group}'"))
                        .suggestion(
                            "Distribution has heavy tails; consider robust methods or outlier treatment",
                        )
                        .context("group", group)
                        .context("kurtosis", k)
                        .context("threshold", ctx.policy.max_kurtosis)
                        .context(
                            "interpretation",
                            if k > 0.0 { "heavy_tailed" } else { "light_tailed" },
                        )
                        .build(),
                );
            }
        }
        CheckOutcome::Completed(violations)
    }
}

/// Omnibus normality test per group.
///
/// Large groups are subsampled deterministically before testing.
#[derive(Debug, Default)]
pub struct NormalityCheck;

impl Check for NormalityCheck {
    fn name(&self) -> &str {
        "Normality"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Distribution
    }

    fn description(&self) -> &str {
        "Tests if data follows a normal distribution"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        let mut violations = Vec::new();
        for (group, values) in ctx.grouped(data) {
            if values.len() < ctx.policy.min_normality_sample {
                continue;
            }
            let n_unique = distinct(&values);
            if n_unique <= 1 || n_unique < 4 {
                continue;
            }
            if std_dev(&values) < 1e-8 {
                continue;
            }

            let sample = if values.len() > ctx.policy.max_normality_sample {
                subsample(&values, ctx.policy.max_normality_sample)
            } else {
                values.clone()
            };
            let Some(result) = normality_test(&sample) else {
                continue;
            };

            if result.p_value < ctx.policy.normality_alpha {
                violations.push(
                    Violation::builder(codes::NON_NORMAL, Severity::Warning)
                        .message(format!(
                            "Non-normal distribution detected in group '{group}' (p={:.4})",
                            result.p_value
                        ))
                        .suggestion("Consider non-parametric tests or data transformation")
                        .context("group", group)
                        .context("p_value", result.p_value)
                        .context("alpha", ctx.policy.normality_alpha)
                        .context("sample_size", values.len())
                        .build(),
                );
            }
        }
        CheckOutcome::Completed(violations)
    }
}

/// Deterministic random subsample (fixed seed keeps runs reproducible).
fn subsample(values: &[f64], amount: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(42);
    rand::seq::index::sample(&mut rng, values.len(), amount)
        .into_iter()
        .map(|i| values[i])
        .collect()
}

/// Levene's test for unequal variances between groups.
#[derive(Debug, Default)]
pub struct HeteroscedasticityCheck;

impl Check for HeteroscedasticityCheck {
    fn name(&self) -> &str {
        "Heteroscedasticity"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Distribution
    }

    fn description(&self) -> &str {
        "Tests for unequal variances between groups"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        if ctx.group.is_none() {
            return CheckOutcome::Skipped(SkipReason::MissingColumn);
        }
        let groups = ctx.grouped(data);
        if groups.len() < 2 || groups.iter().any(|(_, v)| v.len() < 3) {
            return CheckOutcome::Skipped(SkipReason::InsufficientData);
        }

        let samples: Vec<Vec<f64>> = groups.iter().map(|(_, v)| v.clone()).collect();
        let Some(result) = levene_test(&samples) else {
            return CheckOutcome::Skipped(SkipReason::DegenerateInput);
        };

        if result.p_value < ctx.policy.alpha {
            let variances: Vec<(String, f64)> = groups
                .iter()
                .map(|(g, v)| (g.clone(), sample_variance(v)))
                .collect();
            let max_var = variances.iter().map(|(_, v)| *v).fold(f64::MIN, f64::max);
            let min_var = variances.iter().map(|(_, v)| *v).fold(f64::MAX, f64::min);
            let by_group: serde_json::Map<String, serde_json::Value> = variances
                .into_iter()
                .map(|(g, v)| (g, json!(v)))
                .collect();

            return CheckOutcome::Completed(vec![Violation::builder(
                codes::HETEROSCEDASTICITY,
                Severity::Warning,
            )
            .message(format!(
                "Heteroscedasticity detected (p={:.4})",
                result.p_value
            ))
            .suggestion("Consider Welch's t-test or variance-stabilizing transformation")
            .context("p_value", result.p_value)
            .context("group_variances", serde_json::Value::Object(by_group))
            .context("variance_ratio", max_var / min_var)
            .build()]);
        }

        CheckOutcome::passed()
    }
}

/// Validates that target values fall inside the policy's expected range.
#[derive(Debug, Default)]
pub struct RangeCheck;

impl Check for RangeCheck {
    fn name(&self) -> &str {
        "Range Validation"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Distribution
    }

    fn description(&self) -> &str {
        "Checks if values are within expected ranges"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        let values = data.numeric_dropna(ctx.target);
        let mut violations = Vec::new();

        if let Some(min_value) = ctx.policy.min_value {
            let below = values.iter().filter(|v| **v < min_value).count();
            if below > 0 {
                let actual_min = values.iter().copied().fold(f64::MAX, f64::min);
                violations.push(
                    Violation::builder(codes::SUSPICIOUS_PATTERN, Severity::Error)
                        .message(format!("{below} values below minimum ({min_value})"))
                        .suggestion("Check for data entry errors")
                        .context("count", below)
                        .context("min_allowed", min_value)
                        .context("actual_min", actual_min)
                        .build(),
                );
            }
        }

        if let Some(max_value) = ctx.policy.max_value {
            let above = values.iter().filter(|v| **v > max_value).count();
            if above > 0 {
                let actual_max = values.iter().copied().fold(f64::MIN, f64::max);
                violations.push(
                    Violation::builder(codes::SUSPICIOUS_PATTERN, Severity::Error)
                        .message(format!("{above} values above maximum ({max_value})"))
                        .suggestion("Check for data entry errors")
                        .context("count", above)
                        .context("max_allowed", max_value)
                        .context("actual_max", actual_max)
                        .build(),
                );
            }
        }

        CheckOutcome::Completed(violations)
    }
}
