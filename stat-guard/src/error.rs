//! Error types for stat-guard.

use thiserror::Error;

/// Result type for stat-guard operations.
pub type Result<T> = std::result::Result<T, GuardError>;

/// Errors surfaced by stat-guard.
///
/// Individual checks never produce these: a check that cannot run is skipped
/// or marked failed inside the report. This enum covers configuration
/// mistakes and I/O, the only failures a caller is expected to handle.
#[derive(Error, Debug)]
pub enum GuardError {
    /// A policy name that does not match any registered preset.
    #[error("Unknown policy '{name}'. Available: {available}")]
    UnknownPolicy {
        /// The name that failed to resolve.
        name: String,
        /// Comma-separated list of valid preset names.
        available: String,
    },

    /// The target column is absent from the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// An output format string that is not json, markdown, or html.
    #[error("Unknown report format '{0}' (expected json, markdown, or html)")]
    UnknownFormat(String),

    /// A file extension with no registered loader.
    #[error("Unsupported file format '{0}' (expected csv, parquet, or ndjson)")]
    UnsupportedFileFormat(String),

    /// Invalid configuration or parameters.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// DataFusion query execution error.
    #[error("Query execution failed: {0}")]
    QueryExecution(#[from] datafusion::error::DataFusionError),

    /// Arrow computation error.
    #[error("Arrow computation failed: {0}")]
    ArrowComputation(#[from] arrow::error::ArrowError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error while loading data or saving reports.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GuardError {
    /// Creates an unknown-policy error that enumerates the valid presets.
    pub fn unknown_policy(name: impl Into<String>) -> Self {
        Self::UnknownPolicy {
            name: name.into(),
            available: crate::core::policy::PRESET_NAMES.join(", "),
        }
    }

    /// Creates an invalid configuration error with the given message.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}
