//! Loader module for the item indexer pipeline.
//!
//! Buffers records, submits them to the search index in batches and verifies
//! that every submitted task completes.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, error, info, instrument, warn};

use crate::config::IndexerConfig;
use crate::errors::PipelineError;
use crate::failures::{FailedTask, FailureReason, FailureReporter};
use item_indexer_repository::{IndexBackend, TaskOutcome};
use item_indexer_shared::{Record, TaskHandle};

/// Error code returned when creating an index that already exists.
const INDEX_ALREADY_EXISTS: &str = "index_already_exists";

/// Batches records and forwards them to the search index.
///
/// The indexer is responsible for:
/// - Buffering records until a batch is full
/// - Submitting each batch as a single write and keeping its task handle
/// - Waiting on every pending task after a submission and keeping the failed ones
/// - Reporting all failed tasks once, when the pipeline closes
///
/// Submission errors propagate to the caller. Task failures never do; they are
/// only collected and reported.
pub struct BatchingIndexer {
    backend: Arc<dyn IndexBackend>,
    reporter: Arc<dyn FailureReporter>,
    config: IndexerConfig,
    batch_size: usize,
    buffer: Vec<Record>,
    pending_tasks: Vec<TaskHandle>,
    failed_tasks: Vec<FailedTask>,
}

impl BatchingIndexer {
    /// Create a new indexer for the given backend and failure reporter.
    pub fn new(
        backend: Arc<dyn IndexBackend>,
        reporter: Arc<dyn FailureReporter>,
        config: IndexerConfig,
    ) -> Self {
        let batch_size = config.effective_batch_size();
        Self {
            backend,
            reporter,
            config,
            batch_size,
            buffer: Vec::with_capacity(batch_size),
            pending_tasks: Vec::new(),
            failed_tasks: Vec::new(),
        }
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// Records waiting for the next flush.
    pub fn buffered(&self) -> &[Record] {
        &self.buffer
    }

    /// Tasks submitted but not verified yet.
    pub fn pending_tasks(&self) -> &[TaskHandle] {
        &self.pending_tasks
    }

    /// Tasks that failed so far in this run.
    pub fn failed_tasks(&self) -> &[FailedTask] {
        &self.failed_tasks
    }

    /// Prepare the destination index before any record is accepted.
    ///
    /// Creates the index when enabled, then submits the configured settings.
    /// The settings task is verified at the next flush or at close.
    pub async fn open(&mut self) -> Result<(), PipelineError> {
        info!(
            url = %self.config.index_url,
            index = %self.config.index_name,
            batch_size = self.batch_size,
            "Opening indexing pipeline"
        );

        if self.config.ensure_index {
            self.ensure_index().await?;
        }

        if let Some(settings) = self.config.settings_to_apply().cloned() {
            self.apply_settings(&settings).await?;
        }

        Ok(())
    }

    /// Create the destination index if it does not exist yet.
    ///
    /// The creation task is waited on immediately. An index that already
    /// exists, or that was created concurrently, is not an error.
    #[instrument(skip(self), fields(index = %self.config.index_name))]
    pub async fn ensure_index(&mut self) -> Result<(), PipelineError> {
        let index_name = self.config.index_name.clone();

        if self.backend.get_index(&index_name).await?.is_some() {
            debug!("Index already exists");
            return Ok(());
        }

        info!(
            primary_key = ?self.config.primary_key,
            "Creating index"
        );
        let handle = self
            .backend
            .create_index(&index_name, self.config.primary_key.as_deref())
            .await?;

        let failure = self.check_task(&handle).await;
        match failure {
            None => info!(task_uid = handle.task_uid, "Index created"),
            Some(FailedTask {
                reason: FailureReason::Failed { ref code, .. },
                ..
            }) if code == INDEX_ALREADY_EXISTS => {
                debug!("Index was created concurrently");
            }
            Some(failed) => self.failed_tasks.push(failed),
        }

        Ok(())
    }

    /// Submit a settings update. Its task joins the pending tasks.
    #[instrument(skip(self, settings), fields(index = %self.config.index_name))]
    pub async fn apply_settings(
        &mut self,
        settings: &Map<String, Value>,
    ) -> Result<(), PipelineError> {
        info!(keys = settings.len(), "Applying index settings");

        let handle = self
            .backend
            .update_settings(&self.config.index_name, settings)
            .await?;
        self.pending_tasks.push(handle);

        Ok(())
    }

    /// Buffer a record, flushing when the batch is full.
    pub async fn accept(&mut self, record: Record) -> Result<(), PipelineError> {
        self.buffer.push(record);

        if self.buffer.len() >= self.batch_size {
            self.flush().await?;
        }

        Ok(())
    }

    /// Submit the buffered records as one batch, then verify all pending tasks.
    ///
    /// With an empty buffer only the verification runs. If the submission
    /// fails the error is returned and the batch is dropped; it is never
    /// submitted twice. The batch stays buffered while the request is in
    /// flight, so a flush cancelled before the service answers leaves it for
    /// the next flush.
    #[instrument(skip(self), fields(index = %self.config.index_name))]
    pub async fn flush(&mut self) -> Result<(), PipelineError> {
        if self.buffer.is_empty() {
            if !self.pending_tasks.is_empty() {
                self.verify_all().await;
            }
            return Ok(());
        }

        let count = self.buffer.len();

        info!(count, "Sending batch of documents");

        let submitted = self
            .backend
            .add_documents(&self.config.index_name, &self.buffer)
            .await;
        self.buffer.clear();

        let handle = match submitted {
            Ok(handle) => handle,
            Err(e) => {
                error!(error = %e, count, "Error inserting batch");
                return Err(e.into());
            }
        };

        debug!(task_uid = handle.task_uid, count, "Batch accepted");
        self.pending_tasks.push(handle);

        self.verify_all().await;
        Ok(())
    }

    /// Wait on every pending task and keep the ones that did not succeed.
    ///
    /// A task leaves the pending list only once it has been checked, whatever
    /// the outcome; a task is never checked twice to completion.
    #[instrument(skip(self), fields(index = %self.config.index_name))]
    pub async fn verify_all(&mut self) {
        let mut checked = 0;
        let mut failed = 0;

        while let Some(handle) = self.pending_tasks.first().cloned() {
            let failure = self.check_task(&handle).await;
            self.pending_tasks.remove(0);
            checked += 1;

            if let Some(failure) = failure {
                failed += 1;
                self.failed_tasks.push(failure);
            }
        }

        debug!(checked, failed, total_failed = self.failed_tasks.len(), "Verified pending tasks");
    }

    /// Flush what is left, verify remaining tasks and report failures.
    ///
    /// Pending tasks are verified and failures are reported even when the
    /// final submission fails; that submission error is then returned.
    pub async fn close(&mut self) -> Result<(), PipelineError> {
        let flushed = if self.buffer.is_empty() {
            Ok(())
        } else {
            self.flush().await
        };

        if !self.pending_tasks.is_empty() {
            self.verify_all().await;
        }

        if !self.failed_tasks.is_empty() {
            self.reporter.report(&self.config.index_name, &self.failed_tasks);
        }

        info!(
            index = %self.config.index_name,
            failed = self.failed_tasks.len(),
            "Closed indexing pipeline"
        );

        flushed
    }

    /// Wait on a single task and classify the result.
    async fn check_task(&self, handle: &TaskHandle) -> Option<FailedTask> {
        let result = self
            .backend
            .wait_for_task(
                handle.task_uid,
                self.config.task_timeout,
                self.config.task_poll_interval,
            )
            .await;

        match &result {
            Ok(TaskOutcome::TimedOut {
                last_status,
                waited,
                ..
            }) => warn!(
                task_uid = handle.task_uid,
                status = %last_status,
                waited_ms = waited.as_millis() as u64,
                "Task did not finish in time"
            ),
            Err(e) => warn!(
                task_uid = handle.task_uid,
                error = %e,
                "Waiting for task failed"
            ),
            Ok(TaskOutcome::Completed(_)) => {}
        }

        FailedTask::classify(handle, result)
    }
}
