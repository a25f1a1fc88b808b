//! # Typed Layer Errors
//!
//! Only caller-side mistakes surface as `Err` from typed operations: bad
//! arguments and values that cannot be (de)serialized. Store and connection
//! failures are folded into `Executed::Defaulted` by the template instead.

use thiserror::Error;

use tkv_common::TkvError;

/// Encoding or decoding a value failed.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("invalid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload carries a type tag for a different type.
    #[error("type tag mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
}

/// Errors returned by typed operations before or after the command runs.
#[derive(Debug, Error)]
pub enum OpError {
    #[error(transparent)]
    Argument(#[from] TkvError),

    #[error(transparent)]
    Serialization(#[from] SerializationError),
}

pub type OpResult<T> = Result<T, OpError>;

/// Rejects NaN, which the store cannot parse as a score or increment.
pub(crate) fn check_score(score: f64) -> Result<(), TkvError> {
    if score.is_nan() {
        return Err(TkvError::invalid("score must not be NaN"));
    }
    Ok(())
}
