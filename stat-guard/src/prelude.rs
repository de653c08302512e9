//! Prelude for commonly used types and traits in stat-guard.

pub use crate::core::{
    Check, CheckCategory, CheckContext, CheckOutcome, Policy, PolicyOverrides, PolicyRef,
    Severity, ValidationEngine, ValidationOptions, ValidationReport, Violation,
};
pub use crate::dataset::{ColumnKind, Dataset};
pub use crate::error::{GuardError, Result};
pub use crate::reporters::ReportFormat;
pub use crate::stats::providers::Providers;
