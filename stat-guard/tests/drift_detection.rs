//! Drift comparison scenarios through the public API.

use arrow::array::{ArrayRef, Float64Array};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use stat_guard::compare::compare;
use stat_guard::dataset::{dataset_from_columns, Dataset};

fn numeric(values: Vec<f64>) -> Dataset {
    let array: ArrayRef = Arc::new(Float64Array::from(values));
    dataset_from_columns(vec![("metric", array)]).unwrap()
}

fn normal_sample(mean: f64, std: f64, n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = Normal::new(mean, std).unwrap();
    (0..n).map(|_| dist.sample(&mut rng)).collect()
}

#[test]
fn equal_samples_show_no_drift() {
    let sample = normal_sample(0.0, 1.0, 1000, 21);
    let report = compare(&numeric(sample.clone()), &numeric(sample), "metric", None).unwrap();

    assert!(!report.drift_detected);
    assert_eq!(report.data1_stats.count, 1000);
    assert!(!report.ks_test.unwrap().significant);
    assert!(!report.t_test.unwrap().significant);
    assert!(!report.levene_test.unwrap().significant);
}

#[test]
fn mean_shift_triggers_shape_and_mean_tests() {
    let before = normal_sample(0.0, 1.0, 1000, 22);
    let after = normal_sample(2.0, 1.0, 1000, 23);
    let report = compare(&numeric(before), &numeric(after), "metric", None).unwrap();

    assert!(report.drift_detected);
    assert!(report.ks_test.unwrap().significant);
    assert!(report.t_test.unwrap().significant);
}

#[test]
fn drift_report_serializes_for_saving() {
    let before = normal_sample(0.0, 1.0, 500, 24);
    let after = normal_sample(5.0, 1.0, 500, 25);
    let report = compare(&numeric(before), &numeric(after), "metric", None).unwrap();

    let value = report.to_json_value();
    assert_eq!(value["target"], "metric");
    assert_eq!(value["drift_detected"], true);
    assert_eq!(value["data1_stats"]["count"], 500);
    assert!(value["ks_test"]["p_value"].as_f64().unwrap() < 0.05);
}
