//! Read-only tabular view over Arrow record batches.
//!
//! Checks consume this view instead of raw Arrow arrays: it centralizes
//! column lookup, numeric extraction, missing masks, group partitioning,
//! and row identity. The view never mutates the underlying data.

use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::compute::{cast, concat_batches};
use arrow::datatypes::{DataType, SchemaRef};
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;

use crate::error::Result;

/// Broad classification of a column's Arrow type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Integer, float, or decimal.
    Numeric,
    /// Booleans.
    Boolean,
    /// Timestamps and dates.
    Datetime,
    /// Strings, dictionaries, and everything else.
    Categorical,
}

/// An immutable tabular dataset backed by a single Arrow [`RecordBatch`].
#[derive(Debug, Clone)]
pub struct Dataset {
    batch: RecordBatch,
}

impl Dataset {
    /// Wraps a record batch.
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    /// Concatenates several batches of the same schema into one dataset.
    pub fn from_batches(schema: SchemaRef, batches: &[RecordBatch]) -> Result<Self> {
        if batches.is_empty() {
            return Ok(Self::new(RecordBatch::new_empty(schema)));
        }
        let batch = concat_batches(&schema, batches)?;
        Ok(Self::new(batch))
    }

    /// The underlying record batch.
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    /// Column names in schema order.
    pub fn column_names(&self) -> Vec<&str> {
        self.batch
            .schema_ref()
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect()
    }

    /// True when a column with this name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.batch.schema_ref().index_of(name).is_ok()
    }

    /// The raw Arrow array for a column.
    pub fn column(&self, name: &str) -> Option<&ArrayRef> {
        self.batch.column_by_name(name)
    }

    /// Broad type classification for a column.
    pub fn kind(&self, name: &str) -> Option<ColumnKind> {
        self.column(name).map(|array| match array.data_type() {
            dt if dt.is_numeric() => ColumnKind::Numeric,
            DataType::Boolean => ColumnKind::Boolean,
            DataType::Timestamp(_, _) | DataType::Date32 | DataType::Date64 => ColumnKind::Datetime,
            _ => ColumnKind::Categorical,
        })
    }

    /// Names of all numeric columns, in schema order.
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.columns_of_kind(ColumnKind::Numeric)
    }

    /// Names of all categorical columns, in schema order.
    pub fn categorical_columns(&self) -> Vec<&str> {
        self.columns_of_kind(ColumnKind::Categorical)
    }

    /// Names of all datetime columns, in schema order.
    pub fn datetime_columns(&self) -> Vec<&str> {
        self.columns_of_kind(ColumnKind::Datetime)
    }

    fn columns_of_kind(&self, kind: ColumnKind) -> Vec<&str> {
        self.column_names()
            .into_iter()
            .filter(|name| self.kind(name) == Some(kind))
            .collect()
    }

    /// Number of nulls in a column, zero when the column is absent.
    pub fn null_count(&self, name: &str) -> usize {
        self.column(name).map(|a| a.null_count()).unwrap_or(0)
    }

    /// Per-row null mask for a column.
    pub fn missing_mask(&self, name: &str) -> Option<Vec<bool>> {
        let array = self.column(name)?;
        Some((0..array.len()).map(|i| array.is_null(i)).collect())
    }

    /// The column's values cast to `f64`, nulls preserved.
    ///
    /// Strings are parsed; unparseable strings become nulls. Returns `None`
    /// when the column is absent or cannot be cast at all.
    pub fn numeric_values(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let array = self.column(name)?;
        let casted = cast(array, &DataType::Float64).ok()?;
        let floats = casted.as_any().downcast_ref::<Float64Array>()?;
        Some(
            (0..floats.len())
                .map(|i| {
                    if floats.is_null(i) {
                        None
                    } else {
                        let v = floats.value(i);
                        if v.is_finite() {
                            Some(v)
                        } else {
                            None
                        }
                    }
                })
                .collect(),
        )
    }

    /// Non-null, finite values of a column as `f64`. Empty when the column
    /// is absent or non-numeric.
    pub fn numeric_dropna(&self, name: &str) -> Vec<f64> {
        self.numeric_values(name)
            .map(|values| values.into_iter().flatten().collect())
            .unwrap_or_default()
    }

    /// The column's values rendered as strings, nulls preserved.
    pub fn labels(&self, name: &str) -> Option<Vec<Option<String>>> {
        let array = self.column(name)?;
        // Fast path for plain strings; display rendering covers the rest.
        if let Some(strings) = array.as_any().downcast_ref::<StringArray>() {
            return Some(
                (0..strings.len())
                    .map(|i| {
                        if strings.is_null(i) {
                            None
                        } else {
                            Some(strings.value(i).to_string())
                        }
                    })
                    .collect(),
            );
        }
        Some(
            (0..array.len())
                .map(|i| {
                    if array.is_null(i) {
                        None
                    } else {
                        array_value_to_string(array, i).ok()
                    }
                })
                .collect(),
        )
    }

    /// Count of distinct values in a column.
    ///
    /// With `include_nulls`, null counts as one extra distinct value when
    /// present (pandas `nunique(dropna=False)` semantics).
    pub fn distinct_count(&self, name: &str, include_nulls: bool) -> usize {
        let Some(labels) = self.labels(name) else {
            return 0;
        };
        let mut seen: HashMap<String, ()> = HashMap::new();
        let mut has_null = false;
        for label in labels {
            match label {
                Some(value) => {
                    seen.insert(value, ());
                }
                None => has_null = true,
            }
        }
        seen.len() + usize::from(include_nulls && has_null)
    }

    /// Value counts over a column's non-null values, most frequent first.
    /// Ties break on first appearance.
    pub fn value_counts(&self, name: &str) -> Vec<(String, usize)> {
        let Some(labels) = self.labels(name) else {
            return Vec::new();
        };
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        for label in labels.into_iter().flatten() {
            let entry = counts.entry(label.clone()).or_insert(0);
            if *entry == 0 {
                order.push(label);
            }
            *entry += 1;
        }
        let mut result: Vec<(String, usize)> = order
            .into_iter()
            .map(|label| {
                let count = counts[&label];
                (label, count)
            })
            .collect();
        result.sort_by(|a, b| b.1.cmp(&a.1));
        result
    }

    /// Partitions the target column's numeric values by a group column.
    ///
    /// Without a group column, or when the configured one is absent, the
    /// whole target becomes a single synthetic `all` partition. Rows with a
    /// null group label are excluded; nulls in the target are dropped from
    /// each partition. Partitions appear in first-appearance order.
    pub fn grouped_numeric(&self, target: &str, group: Option<&str>) -> Vec<(String, Vec<f64>)> {
        let values = match self.numeric_values(target) {
            Some(values) => values,
            None => return vec![("all".to_string(), Vec::new())],
        };

        let group_labels = group.and_then(|g| self.labels(g));
        let Some(group_labels) = group_labels else {
            let all: Vec<f64> = values.into_iter().flatten().collect();
            return vec![("all".to_string(), all)];
        };

        let mut partitions: Vec<(String, Vec<f64>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for (label, value) in group_labels.into_iter().zip(values) {
            let Some(label) = label else { continue };
            let slot = *index.entry(label.clone()).or_insert_with(|| {
                partitions.push((label, Vec::new()));
                partitions.len() - 1
            });
            if let Some(value) = value {
                partitions[slot].1.push(value);
            }
        }
        partitions
    }

    /// Row indices per non-null group label, in first-appearance order.
    pub fn grouped_rows(&self, group: &str) -> Vec<(String, Vec<usize>)> {
        let Some(labels) = self.labels(group) else {
            return Vec::new();
        };
        let mut partitions: Vec<(String, Vec<usize>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for (row, label) in labels.into_iter().enumerate() {
            let Some(label) = label else { continue };
            let slot = *index.entry(label.clone()).or_insert_with(|| {
                partitions.push((label, Vec::new()));
                partitions.len() - 1
            });
            partitions[slot].1.push(row);
        }
        partitions
    }

    /// Number of rows with no null in any column.
    pub fn complete_row_count(&self) -> usize {
        let rows = self.num_rows();
        let mut complete = vec![true; rows];
        for column in self.batch.columns() {
            if column.null_count() == 0 {
                continue;
            }
            for (row, flag) in complete.iter_mut().enumerate() {
                if column.is_null(row) {
                    *flag = false;
                }
            }
        }
        complete.into_iter().filter(|c| *c).count()
    }

    /// Total null cells across the whole dataset.
    pub fn total_missing_cells(&self) -> usize {
        self.batch.columns().iter().map(|c| c.null_count()).sum()
    }

    /// A row rendered as a composite key over all columns, with nulls made
    /// explicit so they compare equal to each other.
    pub fn row_key(&self, row: usize) -> String {
        let mut key = String::new();
        for column in self.batch.columns() {
            if column.is_null(row) {
                key.push_str("\u{0}<null>");
            } else {
                key.push('\u{0}');
                key.push_str(&array_value_to_string(column, row).unwrap_or_default());
            }
        }
        key
    }

    /// Per-row flag marking every row that has at least one exact duplicate
    /// elsewhere in the dataset (all occurrences flagged).
    pub fn duplicate_row_mask(&self) -> Vec<bool> {
        let rows = self.num_rows();
        let mut counts: HashMap<String, usize> = HashMap::with_capacity(rows);
        let keys: Vec<String> = (0..rows).map(|row| self.row_key(row)).collect();
        for key in &keys {
            *counts.entry(key.clone()).or_insert(0) += 1;
        }
        keys.into_iter().map(|key| counts[&key] > 1).collect()
    }
}

impl From<RecordBatch> for Dataset {
    fn from(batch: RecordBatch) -> Self {
        Self::new(batch)
    }
}

/// Builds a dataset from columns, for tests and examples.
pub fn dataset_from_columns(columns: Vec<(&str, ArrayRef)>) -> Result<Dataset> {
    use arrow::datatypes::{Field, Schema};

    let fields: Vec<Field> = columns
        .iter()
        .map(|(name, array)| Field::new(*name, array.data_type().clone(), true))
        .collect();
    let arrays: Vec<ArrayRef> = columns.into_iter().map(|(_, array)| array).collect();
    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
    Ok(Dataset::new(batch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int64Array, StringArray};

    fn float_col(values: Vec<Option<f64>>) -> ArrayRef {
        Arc::new(Float64Array::from(values))
    }

    fn string_col(values: Vec<Option<&str>>) -> ArrayRef {
        Arc::new(StringArray::from(values))
    }

    fn sample() -> Dataset {
        dataset_from_columns(vec![
            (
                "metric",
                float_col(vec![Some(1.0), Some(2.0), None, Some(4.0), Some(5.0)]),
            ),
            (
                "arm",
                string_col(vec![Some("a"), Some("a"), Some("b"), Some("b"), None]),
            ),
            (
                "count",
                Arc::new(Int64Array::from(vec![Some(10), Some(20), Some(30), Some(40), Some(50)]))
                    as ArrayRef,
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_column_classification() {
        let data = sample();
        assert_eq!(data.kind("metric"), Some(ColumnKind::Numeric));
        assert_eq!(data.kind("count"), Some(ColumnKind::Numeric));
        assert_eq!(data.kind("arm"), Some(ColumnKind::Categorical));
        assert_eq!(data.kind("missing"), None);
        assert_eq!(data.numeric_columns(), vec!["metric", "count"]);
    }

    #[test]
    fn test_numeric_dropna_skips_nulls() {
        let data = sample();
        assert_eq!(data.numeric_dropna("metric"), vec![1.0, 2.0, 4.0, 5.0]);
        assert_eq!(data.numeric_dropna("arm"), Vec::<f64>::new());
    }

    #[test]
    fn test_string_parsing_yields_nulls_for_non_numeric() {
        let data = dataset_from_columns(vec![(
            "mixed",
            string_col(vec![Some("1.5"), Some("oops"), None, Some("3")]),
        )])
        .unwrap();
        let values = data.numeric_values("mixed").unwrap();
        assert_eq!(values, vec![Some(1.5), None, None, Some(3.0)]);
    }

    #[test]
    fn test_grouped_numeric_partitions() {
        let data = sample();
        let groups = data.grouped_numeric("metric", Some("arm"));
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], ("a".to_string(), vec![1.0, 2.0]));
        // null metric in group b dropped; null arm row excluded entirely
        assert_eq!(groups[1], ("b".to_string(), vec![4.0]));
    }

    #[test]
    fn test_grouped_numeric_without_group_is_all() {
        let data = sample();
        let groups = data.grouped_numeric("metric", None);
        assert_eq!(groups, vec![("all".to_string(), vec![1.0, 2.0, 4.0, 5.0])]);

        // Absent group column degrades the same way.
        let groups = data.grouped_numeric("metric", Some("nope"));
        assert_eq!(groups[0].0, "all");
    }

    #[test]
    fn test_complete_rows_and_missing_cells() {
        let data = sample();
        assert_eq!(data.total_missing_cells(), 2);
        assert_eq!(data.complete_row_count(), 3);
    }

    #[test]
    fn test_duplicate_row_mask_flags_all_occurrences() {
        let data = dataset_from_columns(vec![
            ("x", float_col(vec![Some(1.0), Some(1.0), Some(2.0)])),
            ("y", string_col(vec![Some("a"), Some("a"), Some("b")])),
        ])
        .unwrap();
        assert_eq!(data.duplicate_row_mask(), vec![true, true, false]);
    }

    #[test]
    fn test_distinct_count_null_handling() {
        let data = sample();
        assert_eq!(data.distinct_count("arm", false), 2);
        assert_eq!(data.distinct_count("arm", true), 3);
    }

    #[test]
    fn test_value_counts_sorted_desc() {
        let data = dataset_from_columns(vec![(
            "cat",
            string_col(vec![Some("x"), Some("y"), Some("y"), Some("y"), Some("x"), None]),
        )])
        .unwrap();
        let counts = data.value_counts("cat");
        assert_eq!(counts[0], ("y".to_string(), 3));
        assert_eq!(counts[1], ("x".to_string(), 2));
    }
}
