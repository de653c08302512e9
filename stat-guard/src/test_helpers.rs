//! Shared helpers for building in-memory datasets in tests.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::dataset::Dataset;

/// A single-column numeric dataset.
pub fn numeric_dataset(name: &str, values: &[f64]) -> Dataset {
    let schema = Arc::new(Schema::new(vec![Field::new(name, DataType::Float64, true)]));
    let array: ArrayRef = Arc::new(Float64Array::from(values.to_vec()));
    Dataset::new(RecordBatch::try_new(schema, vec![array]).expect("valid batch"))
}

/// A numeric column with nulls.
pub fn nullable_numeric_dataset(name: &str, values: Vec<Option<f64>>) -> Dataset {
    let schema = Arc::new(Schema::new(vec![Field::new(name, DataType::Float64, true)]));
    let array: ArrayRef = Arc::new(Float64Array::from(values));
    Dataset::new(RecordBatch::try_new(schema, vec![array]).expect("valid batch"))
}

/// A target column paired with a group label column of equal length.
pub fn grouped_dataset(target: &str, values: &[f64], group: &str, labels: &[&str]) -> Dataset {
    assert_eq!(values.len(), labels.len(), "columns must align");
    let schema = Arc::new(Schema::new(vec![
        Field::new(target, DataType::Float64, true),
        Field::new(group, DataType::Utf8, true),
    ]));
    let values: ArrayRef = Arc::new(Float64Array::from(values.to_vec()));
    let labels: ArrayRef = Arc::new(StringArray::from(labels.to_vec()));
    Dataset::new(RecordBatch::try_new(schema, vec![values, labels]).expect("valid batch"))
}

/// An arbitrary mixed-column dataset. All fields are nullable.
pub fn dataset_of(columns: Vec<(&str, ArrayRef)>) -> Dataset {
    let fields: Vec<Field> = columns
        .iter()
        .map(|(name, array)| Field::new(*name, array.data_type().clone(), true))
        .collect();
    let arrays: Vec<ArrayRef> = columns.into_iter().map(|(_, a)| a).collect();
    Dataset::new(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).expect("valid batch"))
}

/// Float column helper for [`dataset_of`].
pub fn float_col(values: Vec<Option<f64>>) -> ArrayRef {
    Arc::new(Float64Array::from(values))
}

/// String column helper for [`dataset_of`].
pub fn str_col(values: Vec<Option<&str>>) -> ArrayRef {
    Arc::new(StringArray::from(values))
}

/// `n` evenly spaced values in `[lo, hi]`, a spread-free way to get
/// well-behaved continuous data in tests.
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![lo];
    }
    let step = (hi - lo) / (n - 1) as f64;
    (0..n).map(|i| lo + step * i as f64).collect()
}
