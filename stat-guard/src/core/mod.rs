//! Core types: the violation data model, policies, the check trait, the
//! validation engine, and the report it produces.

pub mod check;
pub mod engine;
pub mod policy;
pub mod report;
pub mod severity;
pub mod violation;

pub use check::{BoxedCheck, Check, CheckCategory, CheckContext, CheckOutcome, SkipReason};
pub use engine::{ValidationEngine, ValidationOptions};
pub use policy::{OutlierMethod, Policy, PolicyOverrides, PolicyRef};
pub use report::{ReportMetadata, ReportSummary, ValidationReport};
pub use severity::Severity;
pub use violation::{codes, Violation};
