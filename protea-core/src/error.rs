//! Structured error types for the Protea toolkit.

use thiserror::Error;

/// Unified error type for all Protea operations.
#[derive(Debug, Error)]
pub enum ProteaError {
    /// I/O error (matrix file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error (malformed matrix file)
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid input (bad arguments, out-of-range values)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The dynamic-programming matrices could not be allocated
    #[error("allocation failed: {0}")]
    Allocation(String),

    /// A predecessor pointer led nowhere during traceback
    #[error("traceback error: {0}")]
    Traceback(String),

    /// Catch-all for other errors
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the Protea toolkit.
pub type Result<T> = std::result::Result<T, ProteaError>;
