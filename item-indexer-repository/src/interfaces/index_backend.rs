//! Index backend trait definition.
//!
//! This module defines the abstract interface for the indexing service. Writes
//! follow a two-phase protocol: submitting returns a `TaskHandle` right away,
//! and the handle's uid is polled later until the task reaches a terminal
//! status.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::time::Instant;
use tracing::debug;

use crate::errors::BackendError;
use crate::types::TaskOutcome;
use item_indexer_shared::{IndexInfo, Record, TaskHandle, TaskInfo, TaskStatus, TaskUid};

/// Abstract interface for indexing service operations.
///
/// Implementations can be swapped for different backends (Meilisearch, an
/// in-memory fake, etc.) enabling the batching logic to be tested without a
/// running service.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, BackendError>`. An `Err` always means the
/// request itself failed; a task that was accepted and later failed is
/// reported through its `TaskStatus`.
#[async_trait]
pub trait IndexBackend: Send + Sync {
    /// Look up an index by name.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(IndexInfo))` - If the index exists
    /// * `Ok(None)` - If the index does not exist
    /// * `Err(BackendError)` - If the lookup fails
    async fn get_index(&self, index_uid: &str) -> Result<Option<IndexInfo>, BackendError>;

    /// Submit the creation of an index.
    ///
    /// # Arguments
    ///
    /// * `index_uid` - Name of the index to create
    /// * `primary_key` - Primary key field for documents, inferred by the service when `None`
    async fn create_index(
        &self,
        index_uid: &str,
        primary_key: Option<&str>,
    ) -> Result<TaskHandle, BackendError>;

    /// Submit a batch of documents to be added or replaced.
    ///
    /// The whole slice is sent in one request and yields exactly one task.
    async fn add_documents(
        &self,
        index_uid: &str,
        documents: &[Record],
    ) -> Result<TaskHandle, BackendError>;

    /// Submit an update of the index settings.
    async fn update_settings(
        &self,
        index_uid: &str,
        settings: &Map<String, Value>,
    ) -> Result<TaskHandle, BackendError>;

    /// Fetch the current state of a task.
    async fn get_task(&self, task_uid: TaskUid) -> Result<TaskInfo, BackendError>;

    /// Check if the service is healthy and reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the service reports itself available
    /// * `Ok(false)` - If the service answered but is unavailable
    /// * `Err(BackendError)` - If the health check fails to execute
    async fn health_check(&self) -> Result<bool, BackendError>;

    /// Poll a task until it reaches a terminal status or `timeout` elapses.
    ///
    /// The task is fetched once immediately, then every `interval` until the
    /// deadline. A fetch still in flight at the deadline is abandoned. A
    /// `timeout` too large to represent as a deadline means no deadline. An
    /// error while fetching ends the wait and is returned as is.
    ///
    /// # Returns
    ///
    /// * `Ok(TaskOutcome::Completed)` - The task succeeded, failed or was canceled
    /// * `Ok(TaskOutcome::TimedOut)` - The task was still running at the deadline
    /// * `Err(BackendError)` - If polling the task failed
    async fn wait_for_task(
        &self,
        task_uid: TaskUid,
        timeout: Duration,
        interval: Duration,
    ) -> Result<TaskOutcome, BackendError> {
        let started = Instant::now();
        let deadline = started.checked_add(timeout);
        let mut last_status = TaskStatus::Enqueued;

        loop {
            let poll = self.get_task(task_uid);
            let task = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, poll).await {
                    Ok(result) => result?,
                    Err(_) => {
                        debug!(task_uid, "Task poll still running at deadline");
                        return Ok(TaskOutcome::TimedOut {
                            task_uid,
                            last_status,
                            waited: started.elapsed(),
                        });
                    }
                },
                None => poll.await?,
            };

            if task.status.is_terminal() {
                debug!(task_uid, status = %task.status, "Task reached terminal status");
                return Ok(TaskOutcome::Completed(task));
            }
            last_status = task.status;

            let now = Instant::now();
            let pause = match deadline {
                Some(deadline) if now >= deadline => {
                    return Ok(TaskOutcome::TimedOut {
                        task_uid,
                        last_status,
                        waited: now - started,
                    });
                }
                Some(deadline) => interval.min(deadline - now),
                None => interval,
            };

            tokio::time::sleep(pause).await;
        }
    }
}
