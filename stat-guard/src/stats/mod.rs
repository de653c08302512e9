//! Descriptive statistics, effect sizes, and hypothesis tests.
//!
//! Everything here operates on plain `&[f64]` slices of non-null values.
//! Functions return `Option` when the quantity is undefined for the input
//! (empty slice, zero spread) rather than producing NaN.

pub mod inference;
pub mod providers;

use serde::Serialize;

/// Arithmetic mean. Zero for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (`n - 1` denominator). Zero when fewer than two values.
pub fn sample_variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64
}

/// Sample standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    sample_variance(values).sqrt()
}

fn central_moment(values: &[f64], order: i32) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(order)).sum::<f64>() / values.len() as f64
}

/// Biased sample skewness `g1 = m3 / m2^(3/2)`.
///
/// `None` when the slice has fewer than three values or zero spread.
pub fn skewness(values: &[f64]) -> Option<f64> {
    if values.len() < 3 {
        return None;
    }
    let m2 = central_moment(values, 2);
    if m2 <= f64::EPSILON {
        return None;
    }
    Some(central_moment(values, 3) / m2.powf(1.5))
}

/// Biased excess kurtosis `g2 = m4 / m2^2 - 3`.
///
/// `None` when the slice has fewer than four values or zero spread.
pub fn kurtosis(values: &[f64]) -> Option<f64> {
    if values.len() < 4 {
        return None;
    }
    let m2 = central_moment(values, 2);
    if m2 <= f64::EPSILON {
        return None;
    }
    Some(central_moment(values, 4) / (m2 * m2) - 3.0)
}

/// Quantile with linear interpolation between order statistics.
///
/// `q` is clamped to `[0, 1]`. `None` for an empty slice.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return Some(sorted[lower]);
    }
    let weight = pos - lower as f64;
    Some(sorted[lower] * (1.0 - weight) + sorted[upper] * weight)
}

/// Median. `None` for an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Interquartile range. `None` for an empty slice.
pub fn iqr(values: &[f64]) -> Option<f64> {
    Some(quantile(values, 0.75)? - quantile(values, 0.25)?)
}

/// Median absolute deviation from the median.
pub fn median_abs_deviation(values: &[f64]) -> Option<f64> {
    let med = median(values)?;
    let deviations: Vec<f64> = values.iter().map(|v| (v - med).abs()).collect();
    median(&deviations)
}

/// Standard z-scores. Empty when the spread is (near) zero.
pub fn zscores(values: &[f64]) -> Vec<f64> {
    let sd = std_dev(values);
    if sd < 1e-12 {
        return Vec::new();
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) / sd).collect()
}

/// Pearson correlation coefficient between two equal-length slices.
///
/// `None` when either side has (near) zero spread or fewer than two pairs.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }
    let (x, y) = (&x[..n], &y[..n]);
    let (mx, my) = (mean(x), mean(y));
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let (da, db) = (a - mx, b - my);
        cov += da * db;
        vx += da * da;
        vy += db * db;
    }
    if vx < 1e-24 || vy < 1e-24 {
        return None;
    }
    Some(cov / (vx * vy).sqrt())
}

/// Distinct count of exact float values.
pub fn distinct(values: &[f64]) -> usize {
    let mut bits: Vec<u64> = values.iter().map(|v| v.to_bits()).collect();
    bits.sort_unstable();
    bits.dedup();
    bits.len()
}

/// Qualitative magnitude of a Cohen's d effect size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectMagnitude {
    Negligible,
    Small,
    Medium,
    Large,
}

impl EffectMagnitude {
    /// Conventional thresholds: 0.2 / 0.5 / 0.8.
    pub fn from_d(d: f64) -> Self {
        let d = d.abs();
        if d < 0.2 {
            EffectMagnitude::Negligible
        } else if d < 0.5 {
            EffectMagnitude::Small
        } else if d < 0.8 {
            EffectMagnitude::Medium
        } else {
            EffectMagnitude::Large
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EffectMagnitude::Negligible => "negligible",
            EffectMagnitude::Small => "small",
            EffectMagnitude::Medium => "medium",
            EffectMagnitude::Large => "large",
        }
    }
}

/// Effect-size measures between two groups.
#[derive(Debug, Clone, Serialize)]
pub struct EffectSizes {
    pub cohens_d: f64,
    pub hedges_g: f64,
    pub glass_delta: f64,
    pub interpretation: EffectMagnitude,
}

/// Cohen's d with the mean-of-variances pooled standard deviation,
/// `sqrt((s1^2 + s2^2) / 2)`. Zero when the pooled spread vanishes.
pub fn cohens_d(group1: &[f64], group2: &[f64]) -> f64 {
    let pooled = ((sample_variance(group1) + sample_variance(group2)) / 2.0).sqrt();
    if pooled > 0.0 {
        (mean(group1) - mean(group2)).abs() / pooled
    } else {
        0.0
    }
}

/// Cohen's d, Hedges' g (small-sample corrected), and Glass's delta
/// (second group as control). `None` when either group is empty.
pub fn effect_sizes(group1: &[f64], group2: &[f64]) -> Option<EffectSizes> {
    if group1.is_empty() || group2.is_empty() {
        return None;
    }
    let d = cohens_d(group1, group2);
    let (n1, n2) = (group1.len(), group2.len());
    let correction = 1.0 - 3.0 / (4.0 * (n1 + n2) as f64 - 9.0);
    let control_std = std_dev(group2);
    let glass = if control_std > 0.0 {
        (mean(group1) - mean(group2)).abs() / control_std
    } else {
        0.0
    };
    Some(EffectSizes {
        cohens_d: d,
        hedges_g: d * correction,
        glass_delta: glass,
        interpretation: EffectMagnitude::from_d(d),
    })
}

/// Student-t confidence interval for the mean.
#[derive(Debug, Clone, Serialize)]
pub struct ConfidenceInterval {
    pub mean: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub confidence: f64,
    pub margin_of_error: f64,
}

/// Two-sided t interval for the mean. `None` when fewer than two values
/// or the spread is (near) zero.
pub fn confidence_interval(values: &[f64], confidence: f64) -> Option<ConfidenceInterval> {
    use statrs::distribution::{ContinuousCDF, StudentsT};

    let n = values.len();
    if n < 2 {
        return None;
    }
    let sd = std_dev(values);
    if sd < 1e-12 {
        return None;
    }
    let m = mean(values);
    let sem = sd / (n as f64).sqrt();
    let t = StudentsT::new(0.0, 1.0, (n - 1) as f64).ok()?;
    let crit = t.inverse_cdf(1.0 - (1.0 - confidence) / 2.0);
    let margin = crit * sem;
    Some(ConfidenceInterval {
        mean: m,
        ci_lower: m - margin,
        ci_upper: m + margin,
        confidence,
        margin_of_error: margin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_mean_and_variance() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&values), 5.0);
        assert!(approx(sample_variance(&values), 4.571_428_571, 1e-6));
    }

    #[test]
    fn test_quantile_linear_interpolation() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&values, 0.25), Some(1.75));
        assert_eq!(quantile(&values, 0.5), Some(2.5));
        assert_eq!(median(&[5.0]), Some(5.0));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn test_skewness_matches_biased_estimator() {
        // scipy.stats.skew([1, 2, 3, 4, 100]) ≈ 1.4953
        let values = [1.0, 2.0, 3.0, 4.0, 100.0];
        let g1 = skewness(&values).unwrap();
        assert!(approx(g1, 1.4953, 1e-3));

        // Symmetric data has zero skew
        assert!(skewness(&[1.0, 2.0, 3.0]).unwrap().abs() < 1e-12);
        assert_eq!(skewness(&[3.0, 3.0, 3.0]), None);
    }

    #[test]
    fn test_kurtosis_of_uniform_spread() {
        // scipy.stats.kurtosis([1, 2, 3, 4, 5]) = -1.3
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(approx(kurtosis(&values).unwrap(), -1.3, 1e-9));
    }

    #[test]
    fn test_pearson_perfect_and_degenerate() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        assert!(approx(pearson(&x, &y).unwrap(), 1.0, 1e-12));
        let inverted = [8.0, 6.0, 4.0, 2.0];
        assert!(approx(pearson(&x, &inverted).unwrap(), -1.0, 1e-12));
        assert_eq!(pearson(&x, &[1.0, 1.0, 1.0, 1.0]), None);
    }

    #[test]
    fn test_mad() {
        let values = [1.0, 1.0, 2.0, 2.0, 4.0, 6.0, 9.0];
        assert_eq!(median_abs_deviation(&values), Some(1.0));
    }

    #[test]
    fn test_effect_sizes() {
        let g1 = [5.0, 6.0, 7.0, 8.0, 9.0];
        let g2 = [1.0, 2.0, 3.0, 4.0, 5.0];
        let es = effect_sizes(&g1, &g2).unwrap();
        // equal variances: pooled std = std = sqrt(2.5)
        assert!(approx(es.cohens_d, 4.0 / 2.5f64.sqrt(), 1e-12));
        assert!(es.hedges_g < es.cohens_d);
        assert_eq!(es.interpretation, EffectMagnitude::Large);
        assert!(effect_sizes(&[], &g2).is_none());
    }

    #[test]
    fn test_confidence_interval_contains_mean() {
        let values: Vec<f64> = (1..=30).map(|i| i as f64).collect();
        let ci = confidence_interval(&values, 0.95).unwrap();
        assert!(ci.ci_lower < ci.mean && ci.mean < ci.ci_upper);
        assert!(approx(ci.mean, 15.5, 1e-12));
        assert!(confidence_interval(&[1.0], 0.95).is_none());
        assert!(confidence_interval(&[2.0, 2.0, 2.0], 0.95).is_none());
    }

    #[test]
    fn test_zscores_degenerate_is_empty() {
        assert!(zscores(&[4.0, 4.0, 4.0]).is_empty());
        let z = zscores(&[1.0, 2.0, 3.0]);
        assert!(approx(z[1], 0.0, 1e-12));
    }
}
