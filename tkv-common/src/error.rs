//! # Argument Errors
//!
//! Contract violations detected before any command leaves the process.
//! These are always surfaced to the caller; they are never converted into
//! fallback values.

use thiserror::Error;

/// Result alias for argument validation.
pub type TkvResult<T> = Result<T, TkvError>;

/// Errors raised while validating or encoding command arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TkvError {
    /// An argument was outside of its accepted domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Weighted aggregate called with a mismatched number of weights.
    #[error("the number of weights ({weights}) must match the number of source sets ({sets})")]
    WeightsMismatch { weights: usize, sets: usize },

    /// The store reported a data type this crate does not know.
    #[error("unknown data type: {0}")]
    UnknownDataType(String),
}

impl TkvError {
    /// Shorthand for [`TkvError::InvalidArgument`].
    pub fn invalid(message: impl Into<String>) -> Self {
        TkvError::InvalidArgument(message.into())
    }
}
