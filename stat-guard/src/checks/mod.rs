//! The built-in check registry.
//!
//! Checks are grouped by family; [`default_checks`] assembles the full
//! registry in the order the engine runs them.

pub mod cardinality;
pub mod correlation;
pub mod distribution;
pub mod integrity;
pub mod missing_data;
pub mod outliers;
pub mod sample_size;

pub use cardinality::{
    CardinalityCheck, CategoricalBalanceCheck, EmptyCategoryCheck, IdColumnDetectionCheck,
};
pub use correlation::{
    CorrelationCheck, GroupCorrelationDifferenceCheck, MulticollinearityCheck,
    TargetCorrelationCheck,
};
pub use distribution::{
    HeteroscedasticityCheck, KurtosisCheck, NearZeroVarianceCheck, NormalityCheck, RangeCheck,
    SkewnessCheck, ZeroVarianceCheck,
};
pub use integrity::{
    ConstantColumnCheck, DataTypeCheck, DuplicateRowsCheck, MissingDataCheck, UnitIntegrityCheck,
};
pub use missing_data::{
    CompleteCaseCheck, MissingFeatureRelationshipCheck, MissingPatternCheck, MissingTargetCheck,
};
pub use outliers::{ExtremeValueCheck, OutlierCheck, WinsorizationCheck};
pub use sample_size::{
    BalancedGroupsCheck, CovariateBalanceCheck, EffectSizeCheck, MinimumSampleSizeCheck,
    StatisticalPowerCheck,
};

use crate::core::check::BoxedCheck;

/// The default check registry, in execution order.
pub fn default_checks() -> Vec<BoxedCheck> {
    vec![
        // Sample size & power
        Box::new(MinimumSampleSizeCheck),
        Box::new(BalancedGroupsCheck),
        Box::new(CovariateBalanceCheck),
        Box::new(StatisticalPowerCheck),
        Box::new(EffectSizeCheck),
        // Distribution & assumptions
        Box::new(ZeroVarianceCheck),
        Box::new(NearZeroVarianceCheck),
        Box::new(SkewnessCheck),
        Box::new(KurtosisCheck),
        Box::new(NormalityCheck),
        Box::new(HeteroscedasticityCheck),
        Box::new(RangeCheck),
        // Data integrity
        Box::new(UnitIntegrityCheck),
        Box::new(DuplicateRowsCheck),
        Box::new(MissingDataCheck),
        Box::new(DataTypeCheck),
        Box::new(ConstantColumnCheck),
        // Outliers
        Box::new(OutlierCheck),
        Box::new(ExtremeValueCheck),
        Box::new(WinsorizationCheck),
        // Correlation
        Box::new(CorrelationCheck),
        Box::new(MulticollinearityCheck),
        Box::new(TargetCorrelationCheck),
        Box::new(GroupCorrelationDifferenceCheck),
        // Cardinality & categoricals
        Box::new(CardinalityCheck),
        Box::new(CategoricalBalanceCheck),
        Box::new(IdColumnDetectionCheck),
        // Missing data
        Box::new(MissingPatternCheck),
        Box::new(MissingTargetCheck),
        Box::new(MissingFeatureRelationshipCheck),
        Box::new(CompleteCaseCheck),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_order_and_uniqueness() {
        let checks = default_checks();
        assert_eq!(checks.len(), 31);
        assert_eq!(checks[0].name(), "Minimum Sample Size");
        assert_eq!(checks.last().unwrap().name(), "Complete Case Analysis");

        let names: HashSet<&str> = checks.iter().map(|c| c.name()).collect();
        assert_eq!(names.len(), checks.len(), "check names must be unique");
    }
}
