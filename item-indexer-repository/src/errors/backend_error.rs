//! Backend error types.
//!
//! These cover everything that can go wrong while talking to the indexing
//! service itself. A task that was accepted and later failed is not an error
//! at this level; it is reported through its task status.

use thiserror::Error;

/// Errors that can occur during backend operations.
#[derive(Error, Debug, Clone)]
pub enum BackendError {
    /// Invalid client configuration (bad URL, bad API key header).
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Failed to reach the service.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The service answered with a non-success status.
    #[error("API error (status {status}, code {code}): {message}")]
    ApiError {
        status: u16,
        code: String,
        message: String,
    },

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize a request body.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A write was accepted but the response carried no task uid.
    #[error("Task object has no uid: {0}")]
    MissingTaskUid(String),
}

impl BackendError {
    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an API error.
    pub fn api(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create a missing task uid error.
    pub fn missing_task_uid(msg: impl Into<String>) -> Self {
        Self::MissingTaskUid(msg.into())
    }

    /// Whether the service reported that the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ApiError { status: 404, .. })
    }
}
