//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur during data operations.
#[derive(Debug, Error)]
pub enum DataError {
    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog document is structurally valid JSON but semantically unusable
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// Dataset is missing a required column
    #[error("Dataset missing required column: {0}")]
    MissingColumn(String),

    /// Dataset contains no rows after filtering
    #[error("Dataset is empty: {0}")]
    EmptyDataset(String),
}
