//! Severity levels for violations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a violation is.
///
/// The ordering is total and increases with seriousness, so severities can be
/// compared directly: `Severity::Critical > Severity::Warning`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Informational only.
    Info,
    /// Proceed with caution.
    Warning,
    /// Analysis should not proceed.
    Error,
    /// Data is fundamentally unusable.
    Critical,
}

impl Severity {
    /// Returns true if this severity makes a validation run invalid.
    pub fn is_blocking(&self) -> bool {
        *self >= Severity::Error
    }

    /// The canonical uppercase label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }

    /// Icon used in human-readable renderings.
    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Info => "ℹ️",
            Severity::Warning => "⚠️",
            Severity::Error => "❌",
            Severity::Critical => "🔴",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_increases_with_seriousness() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Critical);
    }

    #[test]
    fn test_blocking_boundary() {
        assert!(!Severity::Info.is_blocking());
        assert!(!Severity::Warning.is_blocking());
        assert!(Severity::Error.is_blocking());
        assert!(Severity::Critical.is_blocking());
    }

    #[test]
    fn test_serde_uses_uppercase_labels() {
        let json = serde_json::to_string(&Severity::Warning).unwrap();
        assert_eq!(json, "\"WARNING\"");
        let parsed: Severity = serde_json::from_str("\"CRITICAL\"").unwrap();
        assert_eq!(parsed, Severity::Critical);
    }
}
