//! Error types for the degeneromics library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum OmicsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unsupported file format '{0}': only .csv and .xlsx are supported")]
    UnsupportedFormat(String),

    #[error("Failed to parse '{file}': {reason}")]
    Parse { file: String, reason: String },

    #[error("Missing column '{0}'")]
    MissingColumn(String),

    #[error("Duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("Exactly 2 groups required for comparison, found {found}")]
    GroupCount { found: usize },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Row alignment error: {0}")]
    RowAlignment(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, OmicsError>;
