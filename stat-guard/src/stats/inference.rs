//! Hypothesis tests: t-test, ANOVA, Levene, Kolmogorov-Smirnov, and the
//! D'Agostino-Pearson omnibus normality test.

use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor, StudentsT};

use crate::stats::{mean, median, sample_variance, skewness};

/// A test statistic with its two-sided p-value.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TestResult {
    pub statistic: f64,
    pub p_value: f64,
}

impl TestResult {
    /// True when the p-value falls below the given significance level.
    pub fn significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Two-sample pooled-variance t-test (equal variances assumed).
///
/// `None` when either group has fewer than two values or the pooled
/// variance vanishes.
pub fn t_test(group1: &[f64], group2: &[f64]) -> Option<TestResult> {
    let (n1, n2) = (group1.len(), group2.len());
    if n1 < 2 || n2 < 2 {
        return None;
    }
    let df = (n1 + n2 - 2) as f64;
    let pooled = ((n1 - 1) as f64 * sample_variance(group1)
        + (n2 - 1) as f64 * sample_variance(group2))
        / df;
    let se = (pooled * (1.0 / n1 as f64 + 1.0 / n2 as f64)).sqrt();
    if se < 1e-12 {
        return None;
    }
    let t = (mean(group1) - mean(group2)) / se;
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    let p = 2.0 * (1.0 - dist.cdf(t.abs()));
    Some(TestResult {
        statistic: t,
        p_value: p.clamp(0.0, 1.0),
    })
}

/// One-way ANOVA F-test across two or more groups.
///
/// `None` with fewer than two groups, any empty group, or zero
/// within-group variance.
pub fn one_way_anova(groups: &[Vec<f64>]) -> Option<TestResult> {
    let k = groups.len();
    if k < 2 || groups.iter().any(|g| g.is_empty()) {
        return None;
    }
    let n_total: usize = groups.iter().map(Vec::len).sum();
    if n_total <= k {
        return None;
    }
    let grand_mean = groups.iter().flatten().sum::<f64>() / n_total as f64;

    let ss_between: f64 = groups
        .iter()
        .map(|g| g.len() as f64 * (mean(g) - grand_mean).powi(2))
        .sum();
    let ss_within: f64 = groups
        .iter()
        .map(|g| {
            let m = mean(g);
            g.iter().map(|v| (v - m).powi(2)).sum::<f64>()
        })
        .sum();

    let df_between = (k - 1) as f64;
    let df_within = (n_total - k) as f64;
    let ms_within = ss_within / df_within;
    if ms_within < 1e-24 {
        return None;
    }
    let f = (ss_between / df_between) / ms_within;
    let dist = FisherSnedecor::new(df_between, df_within).ok()?;
    Some(TestResult {
        statistic: f,
        p_value: (1.0 - dist.cdf(f)).clamp(0.0, 1.0),
    })
}

/// Levene's test for equal variances, median-centered (Brown-Forsythe).
///
/// Computes absolute deviations from each group's median and runs a
/// one-way ANOVA on them.
pub fn levene_test(groups: &[Vec<f64>]) -> Option<TestResult> {
    if groups.len() < 2 {
        return None;
    }
    let mut deviations: Vec<Vec<f64>> = Vec::with_capacity(groups.len());
    for group in groups {
        let med = median(group)?;
        deviations.push(group.iter().map(|v| (v - med).abs()).collect());
    }
    one_way_anova(&deviations)
}

/// Two-sample Kolmogorov-Smirnov test with the asymptotic p-value.
pub fn ks_test(sample1: &[f64], sample2: &[f64]) -> Option<TestResult> {
    let (n1, n2) = (sample1.len(), sample2.len());
    if n1 == 0 || n2 == 0 {
        return None;
    }
    let mut a = sample1.to_vec();
    let mut b = sample2.to_vec();
    a.sort_by(|x, y| x.total_cmp(y));
    b.sort_by(|x, y| x.total_cmp(y));

    // Maximum gap between the two empirical CDFs, scanned in merge order.
    let mut d: f64 = 0.0;
    let (mut i, mut j) = (0usize, 0usize);
    while i < n1 && j < n2 {
        let (x, y) = (a[i], b[j]);
        if x <= y {
            i += 1;
        }
        if y <= x {
            j += 1;
        }
        let gap = (i as f64 / n1 as f64 - j as f64 / n2 as f64).abs();
        d = d.max(gap);
    }

    let en = ((n1 * n2) as f64 / (n1 + n2) as f64).sqrt();
    let lambda = (en + 0.12 + 0.11 / en) * d;
    Some(TestResult {
        statistic: d,
        p_value: ks_survival(lambda),
    })
}

/// Kolmogorov distribution survival function `Q_KS(lambda)`.
fn ks_survival(lambda: f64) -> f64 {
    if lambda < 1e-12 {
        return 1.0;
    }
    let mut sum = 0.0;
    let mut sign = 1.0;
    for j in 1..=100 {
        let term = sign * (-2.0 * (j as f64).powi(2) * lambda * lambda).exp();
        sum += term;
        if term.abs() < 1e-10 {
            break;
        }
        sign = -sign;
    }
    (2.0 * sum).clamp(0.0, 1.0)
}

/// D'Agostino-Pearson omnibus normality test.
///
/// Combines the normalized skewness and kurtosis statistics into
/// `K^2 = Z_s^2 + Z_k^2`, referred to a chi-squared distribution with
/// two degrees of freedom. Requires at least 20 observations.
pub fn normality_test(values: &[f64]) -> Option<TestResult> {
    if values.len() < 20 {
        return None;
    }
    let zs = skew_z(values)?;
    let zk = kurtosis_z(values)?;
    let k2 = zs * zs + zk * zk;
    let dist = ChiSquared::new(2.0).ok()?;
    Some(TestResult {
        statistic: k2,
        p_value: (1.0 - dist.cdf(k2)).clamp(0.0, 1.0),
    })
}

/// Normalized skewness statistic (D'Agostino's transformation).
fn skew_z(values: &[f64]) -> Option<f64> {
    let n = values.len() as f64;
    let b1 = skewness(values)?;
    let y = b1 * (((n + 1.0) * (n + 3.0)) / (6.0 * (n - 2.0))).sqrt();
    let beta2 = 3.0 * (n * n + 27.0 * n - 70.0) * (n + 1.0) * (n + 3.0)
        / ((n - 2.0) * (n + 5.0) * (n + 7.0) * (n + 9.0));
    let w2 = -1.0 + (2.0 * (beta2 - 1.0)).sqrt();
    let delta = 1.0 / (0.5 * w2.ln()).sqrt();
    let alpha = (2.0 / (w2 - 1.0)).sqrt();
    let y = if y == 0.0 { 1.0 } else { y };
    Some(delta * (y / alpha + ((y / alpha).powi(2) + 1.0).sqrt()).ln())
}

/// Normalized kurtosis statistic (Anscombe-Glynn transformation).
fn kurtosis_z(values: &[f64]) -> Option<f64> {
    use crate::stats::kurtosis;

    let n = values.len() as f64;
    // Pearson kurtosis m4 / m2^2, not excess.
    let b2 = kurtosis(values)? + 3.0;
    let e = 3.0 * (n - 1.0) / (n + 1.0);
    let var_b2 = 24.0 * n * (n - 2.0) * (n - 3.0) / ((n + 1.0).powi(2) * (n + 3.0) * (n + 5.0));
    let x = (b2 - e) / var_b2.sqrt();
    let sqrt_beta1 = 6.0 * (n * n - 5.0 * n + 2.0) / ((n + 7.0) * (n + 9.0))
        * ((6.0 * (n + 3.0) * (n + 5.0)) / (n * (n - 2.0) * (n - 3.0))).sqrt();
    let a = 6.0 + 8.0 / sqrt_beta1 * (2.0 / sqrt_beta1 + (1.0 + 4.0 / (sqrt_beta1 * sqrt_beta1)).sqrt());
    let term1 = 1.0 - 2.0 / (9.0 * a);
    let denom = 1.0 + x * (2.0 / (a - 4.0)).sqrt();
    if denom == 0.0 {
        return None;
    }
    let term2 = denom.signum() * ((1.0 - 2.0 / a) / denom.abs()).cbrt();
    Some((term1 - term2) / (2.0 / (9.0 * a)).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_t_test_identical_groups() {
        let g = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = t_test(&g, &g).unwrap();
        assert!(result.statistic.abs() < 1e-12);
        assert!(result.p_value > 0.99);
    }

    #[test]
    fn test_t_test_separated_groups() {
        let g1 = vec![1.0, 2.0, 1.5, 2.5, 1.8, 2.2];
        let g2 = vec![10.0, 11.0, 10.5, 11.5, 10.8, 11.2];
        let result = t_test(&g1, &g2).unwrap();
        assert!(result.significant(0.001));
        assert!(result.statistic < 0.0);
    }

    #[test]
    fn test_t_test_degenerate() {
        assert!(t_test(&[1.0], &[2.0, 3.0]).is_none());
        assert!(t_test(&[2.0, 2.0], &[2.0, 2.0]).is_none());
    }

    #[test]
    fn test_anova_matches_known_value() {
        // scipy.stats.f_oneway([1,2,3], [2,3,4], [5,6,7]) → F = 9.0
        let groups = vec![
            vec![1.0, 2.0, 3.0],
            vec![2.0, 3.0, 4.0],
            vec![5.0, 6.0, 7.0],
        ];
        let result = one_way_anova(&groups).unwrap();
        assert!((result.statistic - 9.0).abs() < 1e-9);
        assert!(result.significant(0.05));
    }

    #[test]
    fn test_levene_detects_unequal_spread() {
        let tight: Vec<f64> = (0..30).map(|i| 10.0 + 0.01 * i as f64).collect();
        let wide: Vec<f64> = (0..30).map(|i| 10.0 + 2.0 * (i as f64 - 15.0)).collect();
        let result = levene_test(&[tight.clone(), wide]).unwrap();
        assert!(result.significant(0.05));

        let same = levene_test(&[tight.clone(), tight]);
        // identical groups have zero deviation spread
        assert!(same.is_none() || !same.unwrap().significant(0.05));
    }

    #[test]
    fn test_ks_identical_samples() {
        let s: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let result = ks_test(&s, &s).unwrap();
        assert!(result.statistic < 1e-12);
        assert!(result.p_value > 0.99);
    }

    #[test]
    fn test_ks_disjoint_samples() {
        let s1: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let s2: Vec<f64> = (0..50).map(|i| 1000.0 + i as f64).collect();
        let result = ks_test(&s1, &s2).unwrap();
        assert!((result.statistic - 1.0).abs() < 1e-12);
        assert!(result.significant(0.001));
    }

    #[test]
    fn test_normality_rejects_heavy_skew() {
        // strongly right-skewed: exponential-like growth
        let skewed: Vec<f64> = (0..100).map(|i| (i as f64 / 10.0).exp()).collect();
        let result = normality_test(&skewed).unwrap();
        assert!(result.significant(0.05));
    }

    #[test]
    fn test_normality_accepts_symmetric_spread() {
        // evenly spaced values are platykurtic but far from rejection at n=40
        let values: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let result = normality_test(&values).unwrap();
        assert!(result.p_value > 0.01);
    }

    #[test]
    fn test_normality_needs_twenty_observations() {
        let values: Vec<f64> = (0..19).map(|i| i as f64).collect();
        assert!(normality_test(&values).is_none());
    }
}
