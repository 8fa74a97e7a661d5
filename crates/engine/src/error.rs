//! Engine error taxonomy
//!
//! Remote unavailability is not an error variant: it is folded into
//! [`crate::api::RemoteOutcome::Unavailable`] and recovered locally.

use persistence::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvalError {
    /// Malformed request: missing field, unknown scenario, bad sort key, out-of-range value
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Trade store could not be read
    #[error("Trade store error: {0}")]
    Store(String),
}

impl From<DbError> for EvalError {
    fn from(e: DbError) -> Self {
        EvalError::Store(e.to_string())
    }
}

impl From<serde_json::Error> for EvalError {
    fn from(e: serde_json::Error) -> Self {
        EvalError::Store(format!("corrupt trade record: {e}"))
    }
}

pub type EvalResult<T> = Result<T, EvalError>;
