//! Error types for the item indexer pipeline.

use item_indexer_repository::BackendError;
use item_indexer_shared::RecordError;
use thiserror::Error;

/// Errors that can occur in the item indexer pipeline.
///
/// Only failures to submit work surface here. Tasks that the service accepted
/// and later failed are collected as `FailedTask`s instead.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The item could not be converted into a record.
    #[error("Invalid record: {0}")]
    InvalidRecord(#[from] RecordError),

    /// Error from the indexing backend.
    #[error("Backend error: {0}")]
    BackendError(#[from] BackendError),

    /// Invalid pipeline configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl PipelineError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
