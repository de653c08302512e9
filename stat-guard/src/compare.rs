//! Drift comparison between two datasets over one target column.
//!
//! Used to compare training against test data, or before/after snapshots of
//! the same pipeline. Three two-sample tests run at alpha 0.05: a
//! Kolmogorov-Smirnov test for distribution shape, a pooled t-test for the
//! mean, and Levene's test for the variance. Drift is flagged when any of
//! them is significant.

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::dataset::Dataset;
use crate::error::{GuardError, Result};
use crate::stats::inference::{ks_test, levene_test, t_test, TestResult};
use crate::stats::{mean, std_dev};

const DRIFT_ALPHA: f64 = 0.05;

/// Descriptive statistics for one side of the comparison.
#[derive(Debug, Clone, Serialize)]
pub struct SideStats {
    pub mean: f64,
    pub std: f64,
    pub count: usize,
}

impl SideStats {
    fn of(values: &[f64]) -> Self {
        Self {
            mean: mean(values),
            std: std_dev(values),
            count: values.len(),
        }
    }
}

/// One two-sample test's contribution to the drift verdict.
#[derive(Debug, Clone, Serialize)]
pub struct DriftTest {
    pub statistic: f64,
    pub p_value: f64,
    pub significant: bool,
}

impl From<TestResult> for DriftTest {
    fn from(result: TestResult) -> Self {
        Self {
            statistic: result.statistic,
            p_value: result.p_value,
            significant: result.p_value < DRIFT_ALPHA,
        }
    }
}

/// Distribution drift within a single group present on both sides.
#[derive(Debug, Clone, Serialize)]
pub struct GroupDrift {
    pub group: String,
    pub ks_test: DriftTest,
}

/// The result of comparing two datasets.
#[derive(Debug, Clone, Serialize)]
pub struct DriftReport {
    pub target: String,
    pub data1_rows: usize,
    pub data2_rows: usize,
    pub data1_stats: SideStats,
    pub data2_stats: SideStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ks_test: Option<DriftTest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t_test: Option<DriftTest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub levene_test: Option<DriftTest>,
    pub drift_detected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_group: Option<Vec<GroupDrift>>,
}

impl DriftReport {
    /// The report as a JSON value, suitable for saving.
    pub fn to_json_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Compares the target column's distribution across two datasets.
///
/// A test that cannot run on the data (too few observations, zero spread)
/// is omitted from the report and does not count toward the verdict. With a
/// group column present in both datasets, groups that appear on both sides
/// additionally get a per-group KS test; per-group results are informational
/// and do not affect `drift_detected`.
pub fn compare(
    data1: &Dataset,
    data2: &Dataset,
    target: &str,
    group: Option<&str>,
) -> Result<DriftReport> {
    if !data1.has_column(target) || !data2.has_column(target) {
        return Err(GuardError::ColumnNotFound(target.to_string()));
    }

    let x1 = data1.numeric_dropna(target);
    let x2 = data2.numeric_dropna(target);

    let ks = ks_test(&x1, &x2).map(DriftTest::from);
    let t = t_test(&x1, &x2).map(DriftTest::from);
    let levene = levene_test(&[x1.clone(), x2.clone()]).map(DriftTest::from);

    let drift_detected = [&ks, &t, &levene]
        .into_iter()
        .flatten()
        .any(|test| test.significant);

    let by_group = group
        .filter(|g| data1.has_column(g) && data2.has_column(g))
        .map(|g| compare_groups(data1, data2, target, g));

    info!(
        target_column = target,
        n1 = x1.len(),
        n2 = x2.len(),
        drift_detected,
        "drift comparison complete"
    );

    Ok(DriftReport {
        target: target.to_string(),
        data1_rows: data1.num_rows(),
        data2_rows: data2.num_rows(),
        data1_stats: SideStats::of(&x1),
        data2_stats: SideStats::of(&x2),
        ks_test: ks,
        t_test: t,
        levene_test: levene,
        drift_detected,
        by_group,
    })
}

fn compare_groups(
    data1: &Dataset,
    data2: &Dataset,
    target: &str,
    group: &str,
) -> Vec<GroupDrift> {
    let side1 = data1.grouped_numeric(target, Some(group));
    let side2 = data2.grouped_numeric(target, Some(group));

    let mut results = Vec::new();
    for (name, values1) in &side1 {
        let Some((_, values2)) = side2.iter().find(|(other, _)| other == name) else {
            continue;
        };
        if let Some(ks) = ks_test(values1, values2) {
            results.push(GroupDrift {
                group: name.clone(),
                ks_test: ks.into(),
            });
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{dataset_of, float_col, numeric_dataset, str_col};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};

    fn normal_sample(mean: f64, std: f64, n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let dist = Normal::new(mean, std).unwrap();
        (0..n).map(|_| dist.sample(&mut rng)).collect()
    }

    #[test]
    fn test_no_drift_between_equal_distributions() {
        // same generator, same parameters on both sides
        let a = numeric_dataset("metric", &normal_sample(0.0, 1.0, 500, 7));
        let b = numeric_dataset("metric", &normal_sample(0.0, 1.0, 500, 7));

        let report = compare(&a, &b, "metric", None).unwrap();
        assert!(!report.drift_detected);
        assert!(!report.ks_test.as_ref().unwrap().significant);
        assert!(!report.t_test.as_ref().unwrap().significant);
    }

    #[test]
    fn test_mean_shift_detected() {
        let a = numeric_dataset("metric", &normal_sample(0.0, 1.0, 1000, 1));
        let b = numeric_dataset("metric", &normal_sample(2.0, 1.0, 1000, 2));

        let report = compare(&a, &b, "metric", None).unwrap();
        assert!(report.drift_detected);
        assert!(report.ks_test.as_ref().unwrap().significant);
        assert!(report.t_test.as_ref().unwrap().significant);
        assert!((report.data2_stats.mean - report.data1_stats.mean - 2.0).abs() < 0.2);
    }

    #[test]
    fn test_variance_shift_detected() {
        let a = numeric_dataset("metric", &normal_sample(0.0, 1.0, 1000, 1));
        let b = numeric_dataset("metric", &normal_sample(0.0, 4.0, 1000, 2));

        let report = compare(&a, &b, "metric", None).unwrap();
        assert!(report.drift_detected);
        assert!(report.levene_test.as_ref().unwrap().significant);
    }

    #[test]
    fn test_missing_target_is_config_error() {
        let a = numeric_dataset("metric", &[1.0, 2.0, 3.0]);
        let b = numeric_dataset("other", &[1.0, 2.0, 3.0]);
        let err = compare(&a, &b, "metric", None).unwrap_err();
        assert!(matches!(err, GuardError::ColumnNotFound(col) if col == "metric"));
    }

    #[test]
    fn test_per_group_comparison() {
        let control = normal_sample(0.0, 1.0, 200, 11);
        let treatment = normal_sample(0.0, 1.0, 200, 12);
        let build = |treatment_shift: f64| {
            let mut metric = Vec::new();
            let mut arms = Vec::new();
            for v in &control {
                metric.push(Some(*v));
                arms.push(Some("control"));
            }
            for v in &treatment {
                metric.push(Some(v + treatment_shift));
                arms.push(Some("treatment"));
            }
            dataset_of(vec![("metric", float_col(metric)), ("arm", str_col(arms))])
        };

        // treatment arm drifts between snapshots, control stays put
        let before = build(0.0);
        let after = build(3.0);

        let report = compare(&before, &after, "metric", Some("arm")).unwrap();
        let by_group = report.by_group.as_ref().unwrap();
        assert_eq!(by_group.len(), 2);

        let control = by_group.iter().find(|g| g.group == "control").unwrap();
        let treatment = by_group.iter().find(|g| g.group == "treatment").unwrap();
        assert!(!control.ks_test.significant);
        assert!(treatment.ks_test.significant);
    }
}
