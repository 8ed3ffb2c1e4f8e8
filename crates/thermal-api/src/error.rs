//! Request validation errors.

use thiserror::Error;

/// The incoming body is not a usable extender call.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

pub type RequestResult<T> = Result<T, RequestError>;
