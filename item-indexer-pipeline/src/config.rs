//! Configuration for the batching indexer.

use std::time::Duration;

use serde_json::{Map, Value};

use crate::errors::PipelineError;
use item_indexer_repository::BackendConfig;

/// Default number of records per submitted batch.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Default upper bound on waiting for a single task.
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(120);

/// Default delay between two polls of the same task.
pub const DEFAULT_TASK_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for the batching indexer.
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    /// Base URL of the indexing service.
    pub index_url: String,
    /// API key for the service, if it is protected.
    pub api_key: Option<String>,
    /// Destination index.
    pub index_name: String,
    /// Primary key used when the index has to be created.
    pub primary_key: Option<String>,
    /// Settings applied once when the pipeline opens.
    pub index_settings: Option<Map<String, Value>>,
    /// Create the index at open time if it does not exist.
    pub ensure_index: bool,
    /// Number of records per batch. Values below 1 are treated as 1.
    pub batch_size: usize,
    /// Upper bound on waiting for a single task.
    pub task_timeout: Duration,
    /// Delay between two polls of the same task.
    pub task_poll_interval: Duration,
}

impl IndexerConfig {
    /// Create a config with default batching and waiting parameters.
    pub fn new(index_url: impl Into<String>, index_name: impl Into<String>) -> Self {
        Self {
            index_url: index_url.into(),
            api_key: None,
            index_name: index_name.into(),
            primary_key: None,
            index_settings: None,
            ensure_index: true,
            batch_size: DEFAULT_BATCH_SIZE,
            task_timeout: DEFAULT_TASK_TIMEOUT,
            task_poll_interval: DEFAULT_TASK_POLL_INTERVAL,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = Some(primary_key.into());
        self
    }

    pub fn with_index_settings(mut self, settings: Map<String, Value>) -> Self {
        self.index_settings = Some(settings);
        self
    }

    pub fn with_ensure_index(mut self, ensure_index: bool) -> Self {
        self.ensure_index = ensure_index;
        self
    }

    /// Set the batch size, clamped to at least 1.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_task_timeout(mut self, task_timeout: Duration) -> Self {
        self.task_timeout = task_timeout;
        self
    }

    pub fn with_task_poll_interval(mut self, task_poll_interval: Duration) -> Self {
        self.task_poll_interval = task_poll_interval;
        self
    }

    /// Batch size actually used for flushing.
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }

    /// Settings to apply at open, if any are configured.
    pub fn settings_to_apply(&self) -> Option<&Map<String, Value>> {
        self.index_settings.as_ref().filter(|s| !s.is_empty())
    }

    /// Check that the required fields are present.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.index_url.trim().is_empty() {
            return Err(PipelineError::config("index_url is required"));
        }
        if self.index_name.trim().is_empty() {
            return Err(PipelineError::config("index_name is required"));
        }
        Ok(())
    }

    /// Connection settings for the backend client.
    pub fn backend_config(&self) -> BackendConfig {
        let config = BackendConfig::new(self.index_url.clone());
        match self.api_key {
            Some(ref key) => config.with_api_key(key.clone()),
            None => config,
        }
    }
}
