//! Dependency initialization and wiring for the item indexer.

use std::sync::Arc;
use tracing::info;

use crate::IndexingError;
use item_indexer_pipeline::{BatchingIndexer, IndexerConfig, TracingReporter};
use item_indexer_repository::{IndexBackend, MeilisearchClient};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured pipeline ready to be opened.
    pub pipeline: BatchingIndexer,
}

impl Dependencies {
    /// Initialize all dependencies from an indexer configuration.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If the configuration is invalid or
    ///   Meilisearch is unreachable
    pub async fn new(config: IndexerConfig) -> Result<Self, IndexingError> {
        config.validate()?;

        info!(
            url = %config.index_url,
            index = %config.index_name,
            batch_size = config.effective_batch_size(),
            task_timeout_secs = config.task_timeout.as_secs(),
            "Initializing dependencies"
        );

        let client = MeilisearchClient::new(&config.backend_config()).map_err(|e| {
            IndexingError::config(format!("Failed to create Meilisearch client: {}", e))
        })?;

        let healthy = client
            .health_check()
            .await
            .map_err(|e| IndexingError::config(format!("Meilisearch health check failed: {}", e)))?;

        if !healthy {
            return Err(IndexingError::config("Meilisearch is not available"));
        }

        info!("Meilisearch connection verified");

        let pipeline = BatchingIndexer::new(Arc::new(client), Arc::new(TracingReporter), config);

        Ok(Self { pipeline })
    }
}
