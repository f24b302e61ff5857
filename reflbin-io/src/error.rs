//! I/O error types.

use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or unexpected JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input file held no records.
    #[error("no records in {0}")]
    NoRecords(String),

    /// Core library error.
    #[error("core error: {0}")]
    CoreError(#[from] reflbin_core::Error),
}
