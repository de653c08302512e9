//! Dataset profiling: per-column summaries, correlations, and the summary
//! statistics block attached to validation reports.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::dataset::{ColumnKind, Dataset};
use crate::stats::inference::{levene_test, normality_test, one_way_anova};
use crate::stats::{distinct, kurtosis, mean, quantile, sample_variance, skewness, std_dev};

/// Summary statistics for the target column, plus per-group statistics and
/// group comparison tests when a group column is configured.
///
/// This is the `summary_stats` block embedded in a validation report.
pub fn summary_stats(data: &Dataset, target: &str, group: Option<&str>) -> Value {
    let values = data.numeric_dropna(target);
    let missing = data.null_count(target);
    let mut out = Map::new();
    out.insert("target".into(), column_stats(&values, missing));

    if let Some(group_col) = group.filter(|g| data.has_column(g)) {
        out.insert("by_group".into(), group_stats(data, target, group_col));
    }

    Value::Object(out)
}

/// Descriptive statistics for one series of observations.
///
/// `missing` is the null count before the series was cleaned. Shape
/// statistics need at least 8 observations; the normality test runs on
/// samples of 20 to 5000 rows, subsampled to 500 with a fixed seed.
fn column_stats(values: &[f64], missing: usize) -> Value {
    let n = values.len();
    if n == 0 {
        return json!({ "count": 0 });
    }

    let mut stats = Map::new();
    stats.insert("count".into(), json!(n));
    stats.insert("missing".into(), json!(missing));
    stats.insert("mean".into(), json!(mean(values)));
    stats.insert("std".into(), json!(std_dev(values)));
    stats.insert("min".into(), json!(values.iter().cloned().fold(f64::INFINITY, f64::min)));
    stats.insert("max".into(), json!(values.iter().cloned().fold(f64::NEG_INFINITY, f64::max)));

    let q25 = quantile(values, 0.25);
    let q75 = quantile(values, 0.75);
    if let (Some(q25), Some(q75)) = (q25, q75) {
        stats.insert("q05".into(), json!(quantile(values, 0.05)));
        stats.insert("q25".into(), json!(q25));
        stats.insert("q50".into(), json!(quantile(values, 0.50)));
        stats.insert("q75".into(), json!(q75));
        stats.insert("q95".into(), json!(quantile(values, 0.95)));
        stats.insert("iqr".into(), json!(q75 - q25));
    }

    if n >= 8 {
        if let Some(skew) = skewness(values) {
            stats.insert("skewness".into(), json!(skew));
        }
        if let Some(kurt) = kurtosis(values) {
            stats.insert("kurtosis".into(), json!(kurt));
        }
    }

    if (20..=5000).contains(&n) {
        let sample = if n > 500 {
            subsample(values, 500)
        } else {
            values.to_vec()
        };
        if sample.len() >= 3 && distinct(&sample) > 1 && sample_variance(&sample) >= 1e-12 {
            if let Some(result) = normality_test(&sample) {
                stats.insert("normality_pvalue".into(), json!(result.p_value));
                stats.insert("is_normal".into(), json!(result.p_value > 0.05));
            }
        }
    }

    Value::Object(stats)
}

/// Per-group descriptive statistics plus ANOVA and Levene comparisons.
fn group_stats(data: &Dataset, target: &str, group_col: &str) -> Value {
    let target_values = data.numeric_values(target).unwrap_or_default();
    let partitions = data.grouped_rows(group_col);

    let mut groups = Map::new();
    let mut group_values = Vec::new();
    for (name, indices) in &partitions {
        let mut clean = Vec::new();
        let mut missing = 0usize;
        for &i in indices {
            match target_values.get(i).copied().flatten() {
                Some(v) => clean.push(v),
                None => missing += 1,
            }
        }
        groups.insert(name.clone(), column_stats(&clean, missing));
        if !clean.is_empty() {
            group_values.push(clean);
        }
    }

    let mut out = Map::new();
    out.insert("n_groups".into(), json!(groups.len()));
    out.insert("groups".into(), Value::Object(groups));

    if group_values.len() >= 2 && group_values.iter().all(|g| std_dev(g) > 1e-12) {
        if let Some(anova) = one_way_anova(&group_values) {
            out.insert(
                "anova".into(),
                json!({
                    "f_statistic": anova.statistic,
                    "p_value": anova.p_value,
                    "significant": anova.p_value < 0.05,
                }),
            );
        }
        if let Some(levene) = levene_test(&group_values) {
            out.insert(
                "levene".into(),
                json!({
                    "w_statistic": levene.statistic,
                    "p_value": levene.p_value,
                    "equal_variances": levene.p_value > 0.05,
                }),
            );
        }
    }

    Value::Object(out)
}

fn subsample(values: &[f64], amount: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(42);
    rand::seq::index::sample(&mut rng, values.len(), amount)
        .into_iter()
        .map(|i| values[i])
        .collect()
}

/// One value in a categorical column's frequency table.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
    pub percentage: f64,
}

/// Profile of a single column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: String,
    pub count: usize,
    pub missing_count: usize,
    pub missing_pct: f64,
    pub unique_count: usize,
    pub unique_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q25: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q50: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q75: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skewness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kurtosis: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_categories: Option<Vec<CategoryCount>>,
    pub is_numeric: bool,
    pub is_categorical: bool,
    pub is_datetime: bool,
    pub is_constant: bool,
}

/// A data quality concern surfaced while profiling.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileWarning {
    pub column: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub severity: String,
}

/// Pearson correlation between one pair of numeric columns.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationEntry {
    pub column1: String,
    pub column2: String,
    pub coefficient: f64,
}

/// Profile of an entire dataset.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetProfile {
    pub n_rows: usize,
    pub n_columns: usize,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub datetime_columns: Vec<String>,
    pub total_missing_cells: usize,
    pub missing_cell_pct: f64,
    pub complete_rows: usize,
    pub complete_row_pct: f64,
    pub columns: Vec<ColumnProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlations: Option<Vec<CorrelationEntry>>,
    pub warnings: Vec<ProfileWarning>,
    pub created_at: DateTime<Utc>,
}

impl DatasetProfile {
    /// Looks up one column's profile by name.
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The profile as a JSON value, suitable for saving.
    pub fn to_json_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Configuration for [`DataProfiler`].
#[derive(Debug, Clone)]
pub struct ProfilerConfig {
    /// Compute the pairwise Pearson correlations between numeric columns.
    pub compute_correlations: bool,
    /// Maximum categories kept per categorical column's frequency table.
    pub max_categories: usize,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            compute_correlations: true,
            max_categories: 10,
        }
    }
}

/// Generates detailed statistical summaries of datasets.
#[derive(Debug, Default)]
pub struct DataProfiler {
    config: ProfilerConfig,
}

impl DataProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ProfilerConfig) -> Self {
        Self { config }
    }

    /// Profiles every column of the dataset.
    pub fn profile(&self, data: &Dataset) -> DatasetProfile {
        let n_rows = data.num_rows();
        let n_columns = data.num_columns();

        let numeric_columns: Vec<String> =
            data.numeric_columns().iter().map(|s| s.to_string()).collect();
        let categorical_columns: Vec<String> =
            data.categorical_columns().iter().map(|s| s.to_string()).collect();
        let datetime_columns: Vec<String> =
            data.datetime_columns().iter().map(|s| s.to_string()).collect();

        let total_missing_cells = data.total_missing_cells();
        let total_cells = n_rows * n_columns;
        let missing_cell_pct = if total_cells > 0 {
            total_missing_cells as f64 / total_cells as f64
        } else {
            0.0
        };
        let complete_rows = data.complete_row_count();
        let complete_row_pct = if n_rows > 0 {
            complete_rows as f64 / n_rows as f64
        } else {
            0.0
        };

        let mut columns = Vec::with_capacity(n_columns);
        let mut warnings = Vec::new();
        for name in data.column_names() {
            let profile = self.profile_column(data, name);
            warnings.extend(generate_warnings(&profile));
            columns.push(profile);
        }

        let correlations = if self.config.compute_correlations && numeric_columns.len() >= 2 {
            Some(self.compute_correlations(data, &numeric_columns))
        } else {
            None
        };

        DatasetProfile {
            n_rows,
            n_columns,
            numeric_columns,
            categorical_columns,
            datetime_columns,
            total_missing_cells,
            missing_cell_pct,
            complete_rows,
            complete_row_pct,
            columns,
            correlations,
            warnings,
            created_at: Utc::now(),
        }
    }

    fn profile_column(&self, data: &Dataset, name: &str) -> ColumnProfile {
        let count = data.num_rows();
        let missing_count = data.null_count(name);
        let unique_count = data.distinct_count(name, true);
        let kind = data.kind(name);
        let dtype = data
            .column(name)
            .map(|array| array.data_type().to_string())
            .unwrap_or_default();

        let is_numeric = kind == Some(ColumnKind::Numeric);
        let is_categorical = kind == Some(ColumnKind::Categorical);
        let is_datetime = kind == Some(ColumnKind::Datetime);

        let mut profile = ColumnProfile {
            name: name.to_string(),
            dtype,
            count,
            missing_count,
            missing_pct: if count > 0 {
                missing_count as f64 / count as f64
            } else {
                0.0
            },
            unique_count,
            unique_pct: if count > 0 {
                unique_count as f64 / count as f64
            } else {
                0.0
            },
            mean: None,
            std: None,
            min: None,
            max: None,
            q25: None,
            q50: None,
            q75: None,
            skewness: None,
            kurtosis: None,
            top_categories: None,
            is_numeric,
            is_categorical,
            is_datetime,
            is_constant: unique_count == 1,
        };

        if is_numeric {
            let values = data.numeric_dropna(name);
            if !values.is_empty() {
                profile.mean = Some(mean(&values));
                profile.min = values.iter().cloned().reduce(f64::min);
                profile.max = values.iter().cloned().reduce(f64::max);
                profile.q25 = quantile(&values, 0.25);
                profile.q50 = quantile(&values, 0.50);
                profile.q75 = quantile(&values, 0.75);
                if values.len() >= 2 {
                    profile.std = Some(std_dev(&values));
                }
                if values.len() >= 8 {
                    profile.skewness = skewness(&values);
                    profile.kurtosis = kurtosis(&values);
                }
            }
        }

        if is_categorical {
            let total = count.max(1);
            let top: Vec<CategoryCount> = data
                .value_counts(name)
                .into_iter()
                .take(self.config.max_categories)
                .map(|(value, count)| CategoryCount {
                    value,
                    count,
                    percentage: count as f64 / total as f64 * 100.0,
                })
                .collect();
            profile.top_categories = Some(top);
        }

        profile
    }

    fn compute_correlations(&self, data: &Dataset, columns: &[String]) -> Vec<CorrelationEntry> {
        let mut entries = Vec::new();
        for i in 0..columns.len() {
            for j in (i + 1)..columns.len() {
                let Some(a) = data.numeric_values(&columns[i]) else { continue };
                let Some(b) = data.numeric_values(&columns[j]) else { continue };
                let (mut xs, mut ys) = (Vec::new(), Vec::new());
                for (x, y) in a.iter().zip(&b) {
                    if let (Some(x), Some(y)) = (x, y) {
                        xs.push(*x);
                        ys.push(*y);
                    }
                }
                if let Some(r) = crate::stats::pearson(&xs, &ys) {
                    entries.push(CorrelationEntry {
                        column1: columns[i].clone(),
                        column2: columns[j].clone(),
                        coefficient: r,
                    });
                }
            }
        }
        entries
    }
}

fn generate_warnings(profile: &ColumnProfile) -> Vec<ProfileWarning> {
    let mut warnings = Vec::new();

    if profile.missing_pct > 0.5 {
        warnings.push(ProfileWarning {
            column: profile.name.clone(),
            kind: "high_missing".into(),
            message: format!(
                "Column has {:.1}% missing values",
                profile.missing_pct * 100.0
            ),
            severity: "warning".into(),
        });
    }

    if profile.unique_pct > 0.9 && profile.is_categorical {
        warnings.push(ProfileWarning {
            column: profile.name.clone(),
            kind: "high_cardinality".into(),
            message: "Column appears to be an identifier (all unique values)".into(),
            severity: "info".into(),
        });
    }

    if profile.is_constant {
        warnings.push(ProfileWarning {
            column: profile.name.clone(),
            kind: "constant".into(),
            message: "Column has constant value".into(),
            severity: "warning".into(),
        });
    }

    if let Some(skew) = profile.skewness {
        if skew.abs() > 3.0 {
            warnings.push(ProfileWarning {
                column: profile.name.clone(),
                kind: "high_skewness".into(),
                message: format!("Column has high skewness ({skew:.2})"),
                severity: "info".into(),
            });
        }
    }

    if profile.std == Some(0.0) {
        warnings.push(ProfileWarning {
            column: profile.name.clone(),
            kind: "zero_variance".into(),
            message: "Column has zero variance".into(),
            severity: "error".into(),
        });
    }

    warnings
}
