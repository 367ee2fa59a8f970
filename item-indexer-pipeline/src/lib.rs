//! # Item Indexer Pipeline
//!
//! This crate provides the item pipeline that batches crawled records and
//! forwards them to the search index.
//!
//! ## Architecture
//!
//! 1. **Pipeline**: The host-facing lifecycle (`open`, `process_item`, `close`)
//! 2. **Loader**: Buffers records, submits batches and verifies their tasks
//! 3. **Failures**: Records failed tasks and reports them once at close

pub mod config;
pub mod errors;
pub mod failures;
pub mod loader;
pub mod pipeline;

#[cfg(test)]
mod testing;

pub use config::IndexerConfig;
pub use errors::PipelineError;
pub use failures::{FailedTask, FailureReason, FailureReporter, TracingReporter};
pub use loader::BatchingIndexer;
pub use pipeline::ItemPipeline;
