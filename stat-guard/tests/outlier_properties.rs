//! Property tests for the outlier detection primitives.

use proptest::prelude::*;

use stat_guard::checks::outliers::outlier_mask;
use stat_guard::core::OutlierMethod;

fn finite_values() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1e6f64..1e6, 0..200)
}

fn any_method() -> impl Strategy<Value = OutlierMethod> {
    prop_oneof![
        Just(OutlierMethod::Iqr),
        Just(OutlierMethod::Zscore),
        Just(OutlierMethod::Mad),
    ]
}

proptest! {
    #[test]
    fn mask_is_a_pure_function(values in finite_values(), method in any_method(), threshold in 0.5f64..5.0) {
        let first = outlier_mask(&values, method, threshold);
        let second = outlier_mask(&values, method, threshold);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn mask_length_matches_input(values in finite_values(), method in any_method()) {
        let mask = outlier_mask(&values, method, 3.0);
        prop_assert_eq!(mask.len(), values.len());
    }

    #[test]
    fn constant_input_has_no_outliers(value in -1e6f64..1e6, n in 1usize..100, method in any_method()) {
        let values = vec![value; n];
        let mask = outlier_mask(&values, method, 3.0);
        prop_assert!(mask.iter().all(|flagged| !flagged));
    }

    #[test]
    fn raising_the_threshold_never_adds_outliers(values in finite_values(), method in any_method()) {
        let tight = outlier_mask(&values, method, 1.5);
        let loose = outlier_mask(&values, method, 3.0);
        for (t, l) in tight.iter().zip(&loose) {
            prop_assert!(*t || !*l, "value flagged at 3.0 but not at 1.5");
        }
    }
}

#[test]
fn zero_mad_yields_no_outliers_despite_extremes() {
    // majority at one value forces MAD to zero even with extremes present
    let mut values = vec![10.0; 50];
    values.push(1e9);
    let mask = outlier_mask(&values, OutlierMethod::Mad, 3.5);
    assert!(mask.iter().all(|flagged| !flagged));
}
