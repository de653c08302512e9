//! Capability providers for checks that need heavier numerics.
//!
//! Variance-inflation factors and power analysis sit behind traits so that
//! callers can swap implementations or disable them entirely. Checks that
//! depend on a missing provider skip instead of failing.

use std::fmt::Debug;
use std::sync::Arc;

use statrs::distribution::{ContinuousCDF, Normal};

use crate::stats::pearson;

/// Computes variance inflation factors for a set of feature columns.
pub trait VifProvider: Debug + Send + Sync {
    /// One VIF per input column. Columns are equal-length, complete-case,
    /// non-degenerate slices. `None` when the computation is not possible
    /// (singular correlation structure).
    fn vif(&self, columns: &[Vec<f64>]) -> Option<Vec<f64>>;
}

/// Computes achieved power for a two-sample t-test.
pub trait PowerProvider: Debug + Send + Sync {
    /// Power given Cohen's d, first-group size, `n2 / n1` ratio, and alpha.
    fn power(&self, effect_size: f64, nobs1: f64, ratio: f64, alpha: f64) -> Option<f64>;
}

/// The provider set handed to every check run.
#[derive(Debug, Clone)]
pub struct Providers {
    vif: Option<Arc<dyn VifProvider>>,
    power: Option<Arc<dyn PowerProvider>>,
}

impl Default for Providers {
    fn default() -> Self {
        Self {
            vif: Some(Arc::new(MatrixVif)),
            power: Some(Arc::new(NormalApproxPower)),
        }
    }
}

impl Providers {
    /// No providers installed; dependent checks will skip.
    pub fn disabled() -> Self {
        Self {
            vif: None,
            power: None,
        }
    }

    /// Replaces the VIF provider.
    pub fn with_vif(mut self, provider: Arc<dyn VifProvider>) -> Self {
        self.vif = Some(provider);
        self
    }

    /// Replaces the power provider.
    pub fn with_power(mut self, provider: Arc<dyn PowerProvider>) -> Self {
        self.power = Some(provider);
        self
    }

    pub fn vif(&self) -> Option<&dyn VifProvider> {
        self.vif.as_deref()
    }

    pub fn power(&self) -> Option<&dyn PowerProvider> {
        self.power.as_deref()
    }
}

/// VIF from the diagonal of the inverted correlation matrix.
#[derive(Debug, Clone, Copy)]
pub struct MatrixVif;

impl VifProvider for MatrixVif {
    fn vif(&self, columns: &[Vec<f64>]) -> Option<Vec<f64>> {
        let k = columns.len();
        if k < 2 {
            return None;
        }
        let mut corr = vec![vec![0.0f64; k]; k];
        for i in 0..k {
            corr[i][i] = 1.0;
            for j in (i + 1)..k {
                let r = pearson(&columns[i], &columns[j])?;
                corr[i][j] = r;
                corr[j][i] = r;
            }
        }
        let inverse = invert(corr)?;
        Some((0..k).map(|i| inverse[i][i]).collect())
    }
}

/// Gauss-Jordan inverse with partial pivoting. `None` when singular.
fn invert(mut m: Vec<Vec<f64>>) -> Option<Vec<Vec<f64>>> {
    let n = m.len();
    let mut inv = vec![vec![0.0f64; n]; n];
    for (i, row) in inv.iter_mut().enumerate() {
        row[i] = 1.0;
    }

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&a, &b| m[a][col].abs().total_cmp(&m[b][col].abs()))?;
        if m[pivot_row][col].abs() < 1e-12 {
            return None;
        }
        m.swap(col, pivot_row);
        inv.swap(col, pivot_row);

        let pivot = m[col][col];
        for j in 0..n {
            m[col][j] /= pivot;
            inv[col][j] /= pivot;
        }
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = m[row][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..n {
                m[row][j] -= factor * m[col][j];
                inv[row][j] -= factor * inv[col][j];
            }
        }
    }
    Some(inv)
}

/// Two-sample t-test power via the normal approximation.
///
/// Uses the noncentrality parameter `d * sqrt(n1 * n2 / (n1 + n2))` against
/// the two-sided critical value at `alpha`.
#[derive(Debug, Clone, Copy)]
pub struct NormalApproxPower;

impl PowerProvider for NormalApproxPower {
    fn power(&self, effect_size: f64, nobs1: f64, ratio: f64, alpha: f64) -> Option<f64> {
        if nobs1 <= 0.0 || ratio <= 0.0 || !(0.0..1.0).contains(&alpha) {
            return None;
        }
        let n1 = nobs1;
        let n2 = nobs1 * ratio;
        let ncp = effect_size.abs() * (n1 * n2 / (n1 + n2)).sqrt();
        let normal = Normal::new(0.0, 1.0).ok()?;
        let crit = normal.inverse_cdf(1.0 - alpha / 2.0);
        let power = (1.0 - normal.cdf(crit - ncp)) + normal.cdf(-crit - ncp);
        Some(power.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vif_independent_columns_near_one() {
        // orthogonal-ish patterns
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let b = vec![2.0, 1.0, 4.0, 3.0, 6.0, 5.0, 8.0, 7.0];
        let c = vec![1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0];
        let vifs = MatrixVif.vif(&[a, b, c]).unwrap();
        assert_eq!(vifs.len(), 3);
        for v in vifs {
            assert!(v >= 1.0 && v < 2.0, "vif {v} out of range");
        }
    }

    #[test]
    fn test_vif_collinear_columns_explode() {
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b: Vec<f64> = a.iter().map(|v| 2.0 * v + 0.001 * (v % 2.0)).collect();
        let c = vec![5.0, 1.0, 4.0, 2.0, 6.0, 3.0];
        let vifs = MatrixVif.vif(&[a, b, c]).unwrap();
        assert!(vifs[0] > 10.0);
        assert!(vifs[1] > 10.0);
    }

    #[test]
    fn test_vif_perfectly_collinear_is_singular() {
        let a = vec![1.0, 2.0, 3.0, 4.0];
        let b: Vec<f64> = a.iter().map(|v| 3.0 * v).collect();
        assert!(MatrixVif.vif(&[a, b]).is_none());
    }

    #[test]
    fn test_power_grows_with_sample_size() {
        let provider = NormalApproxPower;
        let small = provider.power(0.5, 20.0, 1.0, 0.05).unwrap();
        let large = provider.power(0.5, 200.0, 1.0, 0.05).unwrap();
        assert!(large > small);
        assert!(large > 0.9);
    }

    #[test]
    fn test_power_at_zero_effect_is_alpha() {
        let power = NormalApproxPower.power(0.0, 100.0, 1.0, 0.05).unwrap();
        assert!((power - 0.05).abs() < 0.01);
    }

    #[test]
    fn test_disabled_providers_are_empty() {
        let providers = Providers::disabled();
        assert!(providers.vif().is_none());
        assert!(providers.power().is_none());
    }
}
