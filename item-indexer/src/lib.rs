//! # Item Indexer
//!
//! Main library for the item indexer binary.
//!
//! This crate provides the configuration loading, logging setup and
//! dependency wiring needed to run the batching item pipeline against a
//! Meilisearch instance.

pub mod config;
pub mod feed;
pub mod telemetry;

pub use config::Dependencies;

use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] item_indexer_pipeline::PipelineError),

    /// Backend error.
    #[error("Backend error: {0}")]
    BackendError(#[from] item_indexer_repository::BackendError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
