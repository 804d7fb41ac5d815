// ABOUTME: Errors raised while talking to machined or importd.
// ABOUTME: Separates connection failures from failed method calls.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to connect to the system bus: {0}")]
    Connection(String),

    #[error("{method} failed: {message}")]
    Call {
        method: &'static str,
        message: String,
    },

    #[error("image not found: {0}")]
    ImageNotFound(String),
}

impl ServiceError {
    pub fn call(method: &'static str, message: impl Into<String>) -> Self {
        ServiceError::Call {
            method,
            message: message.into(),
        }
    }
}
