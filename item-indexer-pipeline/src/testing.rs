//! In-memory fakes shared by the pipeline tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::failures::{FailedTask, FailureReporter};
use item_indexer_repository::{BackendError, IndexBackend};
use item_indexer_shared::{IndexInfo, Record, TaskHandle, TaskInfo, TaskKind, TaskStatus, TaskUid};

/// Fake backend. Task uids are handed out sequentially starting at 1 and
/// every task succeeds unless scripted otherwise.
pub(crate) struct FakeBackend {
    next_uid: AtomicU64,
    index_exists: bool,
    fail_submissions: bool,
    statuses: HashMap<TaskUid, TaskStatus>,
    poll_errors: HashSet<TaskUid>,
    failure_codes: HashMap<TaskUid, String>,
    latency: Duration,
    pub kinds: Mutex<HashMap<TaskUid, TaskKind>>,
    pub document_batches: Mutex<Vec<Vec<Record>>>,
    pub settings_updates: Mutex<Vec<Map<String, Value>>>,
    pub created_indexes: Mutex<Vec<(String, Option<String>)>>,
    pub polled: Mutex<Vec<TaskUid>>,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self {
            next_uid: AtomicU64::new(1),
            index_exists: true,
            fail_submissions: false,
            statuses: HashMap::new(),
            poll_errors: HashSet::new(),
            failure_codes: HashMap::new(),
            latency: Duration::ZERO,
            kinds: Mutex::new(HashMap::new()),
            document_batches: Mutex::new(Vec::new()),
            settings_updates: Mutex::new(Vec::new()),
            created_indexes: Mutex::new(Vec::new()),
            polled: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn without_index(mut self) -> Self {
        self.index_exists = false;
        self
    }

    pub(crate) fn failing_submissions(mut self) -> Self {
        self.fail_submissions = true;
        self
    }

    /// Terminal (or stuck, for non-terminal values) status of task `uid`.
    pub(crate) fn with_status(mut self, uid: TaskUid, status: TaskStatus) -> Self {
        self.statuses.insert(uid, status);
        self
    }

    /// Fail task `uid` with the given error code.
    pub(crate) fn with_failure_code(mut self, uid: TaskUid, code: &str) -> Self {
        self.statuses.insert(uid, TaskStatus::Failed);
        self.failure_codes.insert(uid, code.to_string());
        self
    }

    /// Delay every submission and every poll by `latency`.
    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    pub(crate) fn with_poll_error(mut self, uid: TaskUid) -> Self {
        self.poll_errors.insert(uid);
        self
    }

    pub(crate) async fn batch_sizes(&self) -> Vec<usize> {
        self.document_batches
            .lock()
            .await
            .iter()
            .map(Vec::len)
            .collect()
    }

    async fn enqueue(&self, index_uid: &str, kind: TaskKind) -> Result<TaskHandle, BackendError> {
        self.delay().await;
        if self.fail_submissions {
            return Err(BackendError::api(401, "invalid_api_key", "The provided API key is invalid."));
        }
        let uid = self.next_uid.fetch_add(1, Ordering::SeqCst);
        self.kinds.lock().await.insert(uid, kind);
        Ok(TaskHandle::enqueued(uid, index_uid, kind))
    }
}

#[async_trait]
impl IndexBackend for FakeBackend {
    async fn get_index(&self, index_uid: &str) -> Result<Option<IndexInfo>, BackendError> {
        let exists = self.index_exists
            || self
                .created_indexes
                .lock()
                .await
                .iter()
                .any(|(name, _)| name == index_uid);

        Ok(exists.then(|| IndexInfo {
            uid: index_uid.to_string(),
            primary_key: None,
            created_at: None,
            updated_at: None,
        }))
    }

    async fn create_index(
        &self,
        index_uid: &str,
        primary_key: Option<&str>,
    ) -> Result<TaskHandle, BackendError> {
        let handle = self.enqueue(index_uid, TaskKind::IndexCreation).await?;
        self.created_indexes
            .lock()
            .await
            .push((index_uid.to_string(), primary_key.map(str::to_string)));
        Ok(handle)
    }

    async fn add_documents(
        &self,
        index_uid: &str,
        documents: &[Record],
    ) -> Result<TaskHandle, BackendError> {
        let handle = self
            .enqueue(index_uid, TaskKind::DocumentAdditionOrUpdate)
            .await?;
        self.document_batches.lock().await.push(documents.to_vec());
        Ok(handle)
    }

    async fn update_settings(
        &self,
        index_uid: &str,
        settings: &Map<String, Value>,
    ) -> Result<TaskHandle, BackendError> {
        let handle = self.enqueue(index_uid, TaskKind::SettingsUpdate).await?;
        self.settings_updates.lock().await.push(settings.clone());
        Ok(handle)
    }

    async fn get_task(&self, task_uid: TaskUid) -> Result<TaskInfo, BackendError> {
        self.polled.lock().await.push(task_uid);
        self.delay().await;

        if self.poll_errors.contains(&task_uid) {
            return Err(BackendError::connection("network timeout"));
        }

        let status = self
            .statuses
            .get(&task_uid)
            .copied()
            .unwrap_or(TaskStatus::Succeeded);
        let kind = self
            .kinds
            .lock()
            .await
            .get(&task_uid)
            .copied()
            .unwrap_or(TaskKind::Other);

        let task = TaskInfo::new(task_uid, status, kind);
        Ok(match status {
            TaskStatus::Failed => {
                let code = self
                    .failure_codes
                    .get(&task_uid)
                    .map(String::as_str)
                    .unwrap_or("fake_failure");
                task.with_error(code, format!("task {} failed", task_uid))
            }
            _ => task,
        })
    }

    async fn health_check(&self) -> Result<bool, BackendError> {
        Ok(true)
    }
}

/// Reporter that keeps every report it receives.
#[derive(Default)]
pub(crate) struct CollectingReporter {
    pub reports: StdMutex<Vec<(String, Vec<FailedTask>)>>,
}

impl CollectingReporter {
    pub(crate) fn report_count(&self) -> usize {
        self.reports.lock().unwrap().len()
    }

    pub(crate) fn reported_uids(&self) -> Vec<TaskUid> {
        self.reports
            .lock()
            .unwrap()
            .iter()
            .flat_map(|(_, failures)| failures.iter().map(|f| f.task_uid))
            .collect()
    }
}

impl FailureReporter for CollectingReporter {
    fn report(&self, index_name: &str, failures: &[FailedTask]) {
        self.reports
            .lock()
            .unwrap()
            .push((index_name.to_string(), failures.to_vec()));
    }
}
