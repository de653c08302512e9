//! Validation policies: the thresholds every check reads.

use serde::{Deserialize, Serialize};

use crate::error::{GuardError, Result};

/// Names of the built-in presets, in resolution order.
pub const PRESET_NAMES: &[&str] = &["default", "strict", "lenient", "experiment", "time_series"];

/// Outlier detection method used by the outlier checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlierMethod {
    /// Tukey fences on the interquartile range.
    Iqr,
    /// Standard z-scores.
    Zscore,
    /// Modified z-scores on the median absolute deviation.
    Mad,
}

/// All thresholds and toggles used across validation checks.
///
/// A policy is a plain value: copy one, tweak fields, pass it to the engine.
/// The built-in presets are reachable by name through [`Policy::named`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    // Sample size & power
    pub min_sample_size: usize,
    pub min_sample_size_per_group: usize,
    pub max_imbalance_ratio: f64,
    pub max_smd: f64,
    pub min_power: f64,
    pub min_effect_size: f64,
    pub alpha: f64,

    // Distribution & normality
    pub max_skewness: f64,
    pub max_kurtosis: f64,
    pub normality_alpha: f64,
    pub min_normality_sample: usize,
    pub max_normality_sample: usize,

    // Variance
    pub variance_threshold: f64,
    pub near_zero_variance_ratio: f64,

    // Missing data
    pub max_missing_pct: f64,
    pub max_missing_pct_column: f64,
    pub flag_missing_pattern: bool,

    // Outliers
    pub outlier_method: OutlierMethod,
    pub outlier_threshold: f64,
    pub max_outlier_pct: f64,
    pub flag_outlier_clusters: bool,
    pub winsorize_threshold: f64,

    // Correlation
    pub max_correlation: f64,
    pub vif_threshold: f64,
    pub min_target_correlation: f64,
    pub max_correlation_diff: f64,

    // Cardinality
    pub max_cardinality_ratio: f64,
    pub min_cardinality_ratio: f64,
    pub rare_category_threshold: usize,

    // Duplicates & data quality
    pub check_duplicate_rows: bool,
    pub check_duplicate_units: bool,
    pub flag_constant_columns: bool,

    // Expected value ranges (unset by default)
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            min_sample_size: 30,
            min_sample_size_per_group: 15,
            max_imbalance_ratio: 2.0,
            max_smd: 0.25,
            min_power: 0.80,
            min_effect_size: 0.1,
            alpha: 0.05,
            max_skewness: 2.0,
            max_kurtosis: 7.0,
            normality_alpha: 0.05,
            min_normality_sample: 20,
            max_normality_sample: 5000,
            variance_threshold: 1e-10,
            near_zero_variance_ratio: 0.95,
            max_missing_pct: 0.05,
            max_missing_pct_column: 0.20,
            flag_missing_pattern: true,
            outlier_method: OutlierMethod::Iqr,
            outlier_threshold: 3.0,
            max_outlier_pct: 0.05,
            flag_outlier_clusters: true,
            winsorize_threshold: 0.01,
            max_correlation: 0.95,
            vif_threshold: 5.0,
            min_target_correlation: 0.01,
            max_correlation_diff: 0.3,
            max_cardinality_ratio: 0.95,
            min_cardinality_ratio: 0.01,
            rare_category_threshold: 5,
            check_duplicate_rows: true,
            check_duplicate_units: true,
            flag_constant_columns: true,
            min_value: None,
            max_value: None,
            lower_bound: None,
            upper_bound: None,
        }
    }
}

impl Policy {
    /// Preset with tightened thresholds for high-stakes analyses.
    pub fn strict() -> Self {
        Self {
            min_sample_size: 50,
            min_sample_size_per_group: 25,
            max_imbalance_ratio: 1.5,
            max_smd: 0.10,
            max_skewness: 1.5,
            max_kurtosis: 5.0,
            max_missing_pct: 0.02,
            max_missing_pct_column: 0.10,
            max_correlation: 0.90,
            vif_threshold: 4.0,
            outlier_threshold: 2.5,
            max_outlier_pct: 0.02,
            ..Self::default()
        }
    }

    /// Preset with relaxed thresholds for exploratory work.
    pub fn lenient() -> Self {
        Self {
            min_sample_size: 10,
            min_sample_size_per_group: 5,
            max_imbalance_ratio: 5.0,
            max_smd: 0.50,
            max_skewness: 3.0,
            max_kurtosis: 10.0,
            max_missing_pct: 0.20,
            max_missing_pct_column: 0.50,
            max_correlation: 0.99,
            vif_threshold: 10.0,
            ..Self::default()
        }
    }

    /// Preset for A/B tests: strict balance and completeness requirements.
    pub fn experiment() -> Self {
        Self {
            min_sample_size: 100,
            min_sample_size_per_group: 50,
            max_imbalance_ratio: 1.2,
            max_smd: 0.10,
            max_missing_pct: 0.01,
            ..Self::default()
        }
    }

    /// Preset for time-indexed data (stricter normality gate).
    pub fn time_series() -> Self {
        Self {
            normality_alpha: 0.01,
            ..Self::default()
        }
    }

    /// Resolves a preset by name.
    ///
    /// Unknown names are a configuration error that enumerates the valid
    /// presets.
    pub fn named(name: &str) -> Result<Self> {
        match name {
            "default" => Ok(Self::default()),
            "strict" => Ok(Self::strict()),
            "lenient" => Ok(Self::lenient()),
            "experiment" => Ok(Self::experiment()),
            "time_series" => Ok(Self::time_series()),
            other => Err(GuardError::unknown_policy(other)),
        }
    }

    /// Copies a named preset and applies sparse overrides to it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stat_guard::core::{Policy, PolicyOverrides};
    ///
    /// let policy = Policy::customize(
    ///     "default",
    ///     PolicyOverrides {
    ///         min_sample_size: Some(100),
    ///         ..PolicyOverrides::default()
    ///     },
    /// )
    /// .unwrap();
    /// assert_eq!(policy.min_sample_size, 100);
    /// ```
    pub fn customize(base: &str, overrides: PolicyOverrides) -> Result<Self> {
        Ok(Self::named(base)?.apply(overrides))
    }

    /// Applies sparse overrides, returning the modified policy.
    pub fn apply(mut self, o: PolicyOverrides) -> Self {
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = o.$field {
                    self.$field = v;
                })*
            };
        }
        take!(
            min_sample_size,
            min_sample_size_per_group,
            max_imbalance_ratio,
            max_smd,
            min_power,
            min_effect_size,
            alpha,
            max_skewness,
            max_kurtosis,
            normality_alpha,
            min_normality_sample,
            max_normality_sample,
            variance_threshold,
            near_zero_variance_ratio,
            max_missing_pct,
            max_missing_pct_column,
            flag_missing_pattern,
            outlier_method,
            outlier_threshold,
            max_outlier_pct,
            flag_outlier_clusters,
            winsorize_threshold,
            max_correlation,
            vif_threshold,
            min_target_correlation,
            max_correlation_diff,
            max_cardinality_ratio,
            min_cardinality_ratio,
            rare_category_threshold,
            check_duplicate_rows,
            check_duplicate_units,
            flag_constant_columns,
        );
        // Optional bounds: an override replaces the whole Option.
        if o.min_value.is_some() {
            self.min_value = o.min_value;
        }
        if o.max_value.is_some() {
            self.max_value = o.max_value;
        }
        if o.lower_bound.is_some() {
            self.lower_bound = o.lower_bound;
        }
        if o.upper_bound.is_some() {
            self.upper_bound = o.upper_bound;
        }
        self
    }
}

/// Sparse, typed policy overrides.
///
/// Every field mirrors one [`Policy`] field; `None` leaves the base value
/// untouched. When deserialized, unknown keys are rejected rather than
/// silently ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyOverrides {
    pub min_sample_size: Option<usize>,
    pub min_sample_size_per_group: Option<usize>,
    pub max_imbalance_ratio: Option<f64>,
    pub max_smd: Option<f64>,
    pub min_power: Option<f64>,
    pub min_effect_size: Option<f64>,
    pub alpha: Option<f64>,
    pub max_skewness: Option<f64>,
    pub max_kurtosis: Option<f64>,
    pub normality_alpha: Option<f64>,
    pub min_normality_sample: Option<usize>,
    pub max_normality_sample: Option<usize>,
    pub variance_threshold: Option<f64>,
    pub near_zero_variance_ratio: Option<f64>,
    pub max_missing_pct: Option<f64>,
    pub max_missing_pct_column: Option<f64>,
    pub flag_missing_pattern: Option<bool>,
    pub outlier_method: Option<OutlierMethod>,
    pub outlier_threshold: Option<f64>,
    pub max_outlier_pct: Option<f64>,
    pub flag_outlier_clusters: Option<bool>,
    pub winsorize_threshold: Option<f64>,
    pub max_correlation: Option<f64>,
    pub vif_threshold: Option<f64>,
    pub min_target_correlation: Option<f64>,
    pub max_correlation_diff: Option<f64>,
    pub max_cardinality_ratio: Option<f64>,
    pub min_cardinality_ratio: Option<f64>,
    pub rare_category_threshold: Option<usize>,
    pub check_duplicate_rows: Option<bool>,
    pub check_duplicate_units: Option<bool>,
    pub flag_constant_columns: Option<bool>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
}

/// The engine-facing handle for choosing a policy.
#[derive(Debug, Clone)]
pub enum PolicyRef {
    /// A built-in preset, resolved by name at validation time.
    Named(String),
    /// A policy value supplied by the caller.
    Inline(Policy),
}

impl PolicyRef {
    /// Resolves to a concrete policy and the label recorded in report
    /// metadata (`custom` for inline policies).
    pub fn resolve(&self) -> Result<(Policy, String)> {
        match self {
            PolicyRef::Named(name) => Ok((Policy::named(name)?, name.clone())),
            PolicyRef::Inline(policy) => Ok((policy.clone(), "custom".to_string())),
        }
    }
}

impl Default for PolicyRef {
    fn default() -> Self {
        PolicyRef::Named("default".to_string())
    }
}

impl From<&str> for PolicyRef {
    fn from(name: &str) -> Self {
        PolicyRef::Named(name.to_string())
    }
}

impl From<String> for PolicyRef {
    fn from(name: String) -> Self {
        PolicyRef::Named(name)
    }
}

impl From<Policy> for PolicyRef {
    fn from(policy: Policy) -> Self {
        PolicyRef::Inline(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_resolve_by_name() {
        for name in PRESET_NAMES {
            assert!(Policy::named(name).is_ok(), "preset {name} must resolve");
        }
    }

    #[test]
    fn test_unknown_policy_lists_presets() {
        let err = Policy::named("nope").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("nope"));
        assert!(msg.contains("strict"));
        assert!(msg.contains("time_series"));
    }

    #[test]
    fn test_customize_touches_only_overridden_fields() {
        let custom = Policy::customize(
            "default",
            PolicyOverrides {
                min_sample_size: Some(100),
                ..PolicyOverrides::default()
            },
        )
        .unwrap();

        let mut expected = Policy::default();
        expected.min_sample_size = 100;
        assert_eq!(custom, expected);
    }

    #[test]
    fn test_overrides_reject_unknown_keys() {
        let result: std::result::Result<PolicyOverrides, _> =
            serde_json::from_str(r#"{"min_sample_size": 40, "not_a_field": 1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_deserialize_known_keys() {
        let overrides: PolicyOverrides =
            serde_json::from_str(r#"{"outlier_method": "mad", "max_smd": 0.1}"#).unwrap();
        assert_eq!(overrides.outlier_method, Some(OutlierMethod::Mad));
        assert_eq!(overrides.max_smd, Some(0.1));
    }

    #[test]
    fn test_strict_is_tighter_than_default() {
        let strict = Policy::strict();
        let default = Policy::default();
        assert!(strict.min_sample_size > default.min_sample_size);
        assert!(strict.max_missing_pct < default.max_missing_pct);
        assert!(strict.max_imbalance_ratio < default.max_imbalance_ratio);
    }

    #[test]
    fn test_inline_policy_label_is_custom() {
        let (policy, label) = PolicyRef::from(Policy::lenient()).resolve().unwrap();
        assert_eq!(label, "custom");
        assert_eq!(policy, Policy::lenient());
    }
}
