//! Error types for reflbin-core.

use thiserror::Error;

/// Result type alias for reflbin operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for merge and rebin operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A per-point field is neither broadcastable nor the record's length.
    #[error("{field} length {found} does not match data length {expected} in {record}")]
    ColumnLengthMismatch {
        field: String,
        record: String,
        expected: usize,
        found: usize,
    },

    /// Normalization basis outside monitor/time/none.
    #[error("unsupported normalization basis {0:?}: expected monitor, time or none")]
    UnsupportedNormBasis(String),

    /// Records in a group were normalized differently.
    #[error("record {record} is normalized by {found}, expected {expected}")]
    MixedNormBasis {
        record: String,
        expected: String,
        found: String,
    },

    /// Weighted averaging found a zero, negative or non-finite weight.
    #[error("non-positive weight {weight} in {column} at point {index}")]
    NonPositiveWeight {
        column: &'static str,
        index: usize,
        weight: f64,
    },

    /// Sort key is not one of the recognized column names.
    #[error("unknown sort key {0:?}")]
    UnknownSortKey(String),

    /// Unknown measurement intent tag.
    #[error("unknown intent {0:?}")]
    UnknownIntent(String),

    /// Unknown record ordering key.
    #[error("unknown sort key {0:?}: use file, time, theta, slit or none")]
    UnknownRecordOrder(String),

    /// Merge or rebin was called with no records.
    #[error("cannot combine an empty group of records")]
    EmptyGroup,

    /// Bin edges are too short, unordered or NaN.
    #[error("invalid bin edges: {0}")]
    InvalidBinEdges(String),

    /// Fewer than two bin centers were given for edge construction.
    #[error("need at least two bin centers, got {0}")]
    InsufficientBinCenters(usize),
}
