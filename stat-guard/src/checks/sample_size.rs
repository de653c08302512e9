//! Sample size, balance, and statistical power checks.

use serde_json::json;

use crate::core::check::{Check, CheckCategory, CheckContext, CheckOutcome, SkipReason};
use crate::core::severity::Severity;
use crate::core::violation::{codes, Violation};
use crate::dataset::Dataset;
use crate::stats::{cohens_d, mean, sample_variance, EffectMagnitude};

/// Validates that total and per-group sample sizes meet the policy minimums.
#[derive(Debug, Default)]
pub struct MinimumSampleSizeCheck;

impl Check for MinimumSampleSizeCheck {
    fn name(&self) -> &str {
        "Minimum Sample Size"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::SampleSize
    }

    fn description(&self) -> &str {
        "Checks if groups have sufficient observations for reliable analysis"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        let mut violations = Vec::new();
        let groups = ctx.grouped(data);

        let total = data.numeric_dropna(ctx.target).len();
        if total < ctx.policy.min_sample_size {
            violations.push(
                Violation::builder(codes::SAMPLE_TOO_SMALL, Severity::Error)
                    .message(format!(
                        "Total sample size ({total}) below minimum ({})",
                        ctx.policy.min_sample_size
                    ))
                    .suggestion("Collect more data or use non-parametric methods")
                    .context("actual", total)
                    .context("required", ctx.policy.min_sample_size)
                    .build(),
            );
        }

        let per_group = ctx.policy.min_sample_size_per_group;
        let small: Vec<(&str, usize)> = groups
            .iter()
            .filter(|(_, values)| values.len() < per_group)
            .map(|(name, values)| (name.as_str(), values.len()))
            .collect();
        if !small.is_empty() {
            let mut builder = Violation::builder(codes::SAMPLE_TOO_SMALL, Severity::Warning)
                .message(format!(
                    "Some groups have fewer than {per_group} observations"
                ))
                .suggestion("Consider combining groups or collecting more data");
            for (name, size) in small {
                builder = builder.context(name, size);
            }
            violations.push(builder.build());
        }

        CheckOutcome::Completed(violations)
    }
}

/// Flags groups whose sizes are badly imbalanced, or empty.
#[derive(Debug, Default)]
pub struct BalancedGroupsCheck;

impl Check for BalancedGroupsCheck {
    fn name(&self) -> &str {
        "Balanced Groups"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::SampleSize
    }

    fn description(&self) -> &str {
        "Checks for significant imbalance between group sizes"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        if ctx.group.is_none() {
            return CheckOutcome::Skipped(SkipReason::MissingColumn);
        }
        let groups = ctx.grouped(data);
        if groups.len() < 2 {
            return CheckOutcome::Skipped(SkipReason::InsufficientData);
        }

        let sizes: Vec<usize> = groups.iter().map(|(_, v)| v.len()).collect();
        let min_size = *sizes.iter().min().unwrap_or(&0);
        let max_size = *sizes.iter().max().unwrap_or(&0);

        if min_size == 0 {
            let empty: Vec<&str> = groups
                .iter()
                .filter(|(_, v)| v.is_empty())
                .map(|(g, _)| g.as_str())
                .collect();
            return CheckOutcome::Completed(vec![Violation::builder(
                codes::UNBALANCED_GROUPS,
                Severity::Error,
            )
            .message(format!("Empty groups detected: {empty:?}"))
            .suggestion("Fix group assignment or filtering")
            .context("empty_groups", json!(empty))
            .build()]);
        }

        let ratio = max_size as f64 / min_size as f64;
        if ratio > ctx.policy.max_imbalance_ratio {
            let group_sizes: serde_json::Map<String, serde_json::Value> = groups
                .iter()
                .map(|(g, v)| (g.clone(), json!(v.len())))
                .collect();
            return CheckOutcome::Completed(vec![Violation::builder(
                codes::UNBALANCED_GROUPS,
                Severity::Warning,
            )
            .message(format!(
                "Group imbalance ratio {ratio:.2} exceeds threshold {}",
                ctx.policy.max_imbalance_ratio
            ))
            .suggestion("Consider rebalancing, stratification, or weighted analysis")
            .context("ratio", ratio)
            .context("threshold", ctx.policy.max_imbalance_ratio)
            .context("group_sizes", serde_json::Value::Object(group_sizes))
            .build()]);
        }

        CheckOutcome::passed()
    }
}

/// Covariate balance between two groups via the standardized mean
/// difference. SMD below 0.25 is generally acceptable; below 0.10 is
/// well balanced.
#[derive(Debug, Default)]
pub struct CovariateBalanceCheck;

impl Check for CovariateBalanceCheck {
    fn name(&self) -> &str {
        "Covariate Balance (SMD)"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::SampleSize
    }

    fn description(&self) -> &str {
        "Checks for covariate imbalance between groups using standardized mean difference"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        if ctx.group.is_none() {
            return CheckOutcome::Skipped(SkipReason::MissingColumn);
        }
        let groups = ctx.grouped(data);
        if groups.len() != 2 {
            return CheckOutcome::Skipped(SkipReason::InsufficientData);
        }
        let (g1_name, x1) = &groups[0];
        let (g2_name, x2) = &groups[1];

        let pooled_std = ((sample_variance(x1) + sample_variance(x2)) / 2.0).sqrt();
        if pooled_std == 0.0 {
            return CheckOutcome::Skipped(SkipReason::DegenerateInput);
        }

        let (mean1, mean2) = (mean(x1), mean(x2));
        let smd = (mean1 - mean2).abs() / pooled_std;
        if smd > ctx.policy.max_smd {
            let severity = if smd > 0.5 {
                Severity::Error
            } else {
                Severity::Warning
            };
            return CheckOutcome::Completed(vec![Violation::builder(
                codes::COVARIATE_IMBALANCE,
                severity,
            )
            .message(format!(
                "SMD imbalance detected ({smd:.3}) between groups '{g1_name}' and '{g2_name}'"
            ))
            .suggestion("Consider stratification, matching, or rebalancing")
            .context("smd", smd)
            .context("threshold", ctx.policy.max_smd)
            .context("group1_mean", mean1)
            .context("group2_mean", mean2)
            .context("group1", g1_name.as_str())
            .context("group2", g2_name.as_str())
            .build()]);
        }

        CheckOutcome::passed()
    }
}

/// Estimates achieved power for a two-group comparison at the observed
/// effect size. Needs the power provider.
#[derive(Debug, Default)]
pub struct StatisticalPowerCheck;

impl Check for StatisticalPowerCheck {
    fn name(&self) -> &str {
        "Statistical Power"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::SampleSize
    }

    fn description(&self) -> &str {
        "Estimates if sample size provides adequate statistical power"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        let Some(provider) = ctx.providers.power() else {
            return CheckOutcome::Skipped(SkipReason::ProviderUnavailable);
        };
        if ctx.group.is_none() {
            return CheckOutcome::Skipped(SkipReason::MissingColumn);
        }
        let groups = ctx.grouped(data);
        if groups.len() != 2 {
            return CheckOutcome::Skipped(SkipReason::InsufficientData);
        }
        let (_, x1) = &groups[0];
        let (_, x2) = &groups[1];
        let (n1, n2) = (x1.len(), x2.len());
        if n1 == 0 {
            return CheckOutcome::Skipped(SkipReason::InsufficientData);
        }

        let pooled_std = ((sample_variance(x1) + sample_variance(x2)) / 2.0).sqrt();
        let effect_size = if pooled_std > 0.0 {
            (mean(x1) - mean(x2)).abs() / pooled_std
        } else {
            // fall back to a small conventional effect
            0.2
        };

        let nobs = (n1 + n2) as f64 / 2.0;
        let ratio = n2 as f64 / n1 as f64;
        let Some(power) = provider.power(effect_size, nobs, ratio, ctx.policy.alpha) else {
            return CheckOutcome::Skipped(SkipReason::DegenerateInput);
        };

        if power < ctx.policy.min_power {
            return CheckOutcome::Completed(vec![Violation::builder(
                codes::INSUFFICIENT_POWER,
                Severity::Warning,
            )
            .message(format!(
                "Statistical power ({power:.2}) below threshold ({})",
                ctx.policy.min_power
            ))
            .suggestion("Increase sample size or accept higher Type II error rate")
            .context("power", power)
            .context("required_power", ctx.policy.min_power)
            .context("effect_size", effect_size)
            .context("sample_size", nobs as u64)
            .build()]);
        }

        CheckOutcome::passed()
    }
}

/// Flags very small observed effect sizes between two groups.
#[derive(Debug, Default)]
pub struct EffectSizeCheck;

impl Check for EffectSizeCheck {
    fn name(&self) -> &str {
        "Effect Size"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::SampleSize
    }

    fn description(&self) -> &str {
        "Evaluates if observed effect size is practically meaningful"
    }

    fn run(&self, data: &Dataset, ctx: &CheckContext<'_>) -> CheckOutcome {
        if ctx.group.is_none() {
            return CheckOutcome::Skipped(SkipReason::MissingColumn);
        }
        let groups = ctx.grouped(data);
        if groups.len() != 2 {
            return CheckOutcome::Skipped(SkipReason::InsufficientData);
        }
        let (_, x1) = &groups[0];
        let (_, x2) = &groups[1];

        let pooled_std = ((sample_variance(x1) + sample_variance(x2)) / 2.0).sqrt();
        if pooled_std == 0.0 {
            return CheckOutcome::Skipped(SkipReason::DegenerateInput);
        }

        let d = cohens_d(x1, x2);
        if d < ctx.policy.min_effect_size {
            return CheckOutcome::Completed(vec![Violation::builder(
                codes::COVARIATE_IMBALANCE,
                Severity::Info,
            )
            .message(format!("Effect size (Cohen's d = {d:.3}) is very small"))
            .suggestion("Consider if this effect is practically meaningful")
            .context("cohens_d", d)
            .context("threshold", ctx.policy.min_effect_size)
            .context("interpretation", EffectMagnitude::from_d(d).as_str())
            .build()]);
        }

        CheckOutcome::passed()
    }
}
