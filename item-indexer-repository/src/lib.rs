//! # Item Indexer Repository
//!
//! This crate provides the interface the pipeline uses to talk to the
//! indexing service, together with a concrete implementation for Meilisearch.
//! It includes definitions for errors, configuration and task outcomes.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod meilisearch;
pub mod types;

pub use config::BackendConfig;
pub use errors::BackendError;
pub use interfaces::IndexBackend;
pub use meilisearch::MeilisearchClient;
pub use types::TaskOutcome;
