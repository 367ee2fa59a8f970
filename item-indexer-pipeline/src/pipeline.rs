//! Host-facing item pipeline trait.
//!
//! A crawler drives a pipeline through three calls: `open` once before the
//! first item, `process_item` for every item it produces, and `close` once at
//! the end of the run.

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::PipelineError;
use crate::loader::BatchingIndexer;
use item_indexer_shared::Record;

/// The contract between a crawler and an item processing stage.
///
/// `process_item` hands the item back so the host can pass it on to the next
/// stage.
#[async_trait]
pub trait ItemPipeline<I>: Send
where
    I: Send + 'static,
{
    /// Returns the name of the pipeline.
    fn name(&self) -> &str;

    /// Called once before any item is processed.
    async fn open(&mut self) -> Result<(), PipelineError> {
        Ok(())
    }

    /// Processes a single item.
    async fn process_item(&mut self, item: I) -> Result<I, PipelineError>;

    /// Called once when the crawler finishes.
    async fn close(&mut self) -> Result<(), PipelineError> {
        Ok(())
    }
}

#[async_trait]
impl<I> ItemPipeline<I> for BatchingIndexer
where
    I: Serialize + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        "batching-indexer"
    }

    async fn open(&mut self) -> Result<(), PipelineError> {
        BatchingIndexer::open(self).await
    }

    async fn process_item(&mut self, item: I) -> Result<I, PipelineError> {
        let record = Record::from_item(&item)?;
        self.accept(record).await?;
        Ok(item)
    }

    async fn close(&mut self) -> Result<(), PipelineError> {
        BatchingIndexer::close(self).await
    }
}
