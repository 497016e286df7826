//! Error types for the SOFM engine.

use thiserror::Error;

/// The main error type for SOFM operations.
#[derive(Error, Debug)]
pub enum SofmError {
    /// Grid dimensions, schedule parameters or weight bounds are unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Training data is empty, ragged, or otherwise unusable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A vector's length disagrees with the node weight length.
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// The dimensionality the map was trained with.
        expected: usize,
        /// The dimensionality that was supplied.
        got: usize,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted map content is malformed or incompatible.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// A numeric field in a data file could not be parsed.
    #[error("Parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },
}

/// Result type alias for SOFM operations.
pub type Result<T> = std::result::Result<T, SofmError>;

impl From<bincode::Error> for SofmError {
    fn from(err: bincode::Error) -> Self {
        SofmError::Deserialization(err.to_string())
    }
}
