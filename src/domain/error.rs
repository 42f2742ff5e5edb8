//! Domain-level error types.

use thiserror::Error;

/// Validation failure while constructing a value object from raw client input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{field} exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Failure while pushing a message to a connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' not found")]
    ConnectionNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}
