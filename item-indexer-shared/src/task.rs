//! Asynchronous task types returned by the indexing service.
//!
//! Every write to the service is accepted immediately and processed later.
//! The service answers a write with a [`TaskHandle`]; polling the task uid
//! yields a [`TaskInfo`] whose status eventually becomes terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of an asynchronous task.
pub type TaskUid = u64;

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    Enqueued,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl TaskStatus {
    /// Whether the task will never change status again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enqueued => "enqueued",
            Self::Processing => "processing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of write a task performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskKind {
    IndexCreation,
    DocumentAdditionOrUpdate,
    SettingsUpdate,
    /// Any task type this crate does not submit itself.
    #[serde(other)]
    Other,
}

/// Error details attached to a failed task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskError {
    /// Machine readable error code, e.g. `invalid_document_id`.
    pub code: String,
    /// Human readable description.
    pub message: String,
    /// Error category reported by the service.
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    /// Documentation link for the error code.
    #[serde(default)]
    pub link: Option<String>,
}

/// Handle returned when a write is accepted.
///
/// Only the uid is needed to poll the task; the remaining fields are kept for
/// reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskHandle {
    pub task_uid: TaskUid,
    #[serde(default)]
    pub index_uid: Option<String>,
    pub status: TaskStatus,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    #[serde(default)]
    pub enqueued_at: Option<DateTime<Utc>>,
}

impl TaskHandle {
    /// Build a freshly enqueued handle.
    pub fn enqueued(task_uid: TaskUid, index_uid: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            task_uid,
            index_uid: Some(index_uid.into()),
            status: TaskStatus::Enqueued,
            kind,
            enqueued_at: Some(Utc::now()),
        }
    }
}

/// Full task state as returned when polling a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInfo {
    pub uid: TaskUid,
    #[serde(default)]
    pub index_uid: Option<String>,
    pub status: TaskStatus,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    #[serde(default)]
    pub error: Option<TaskError>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub enqueued_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

impl TaskInfo {
    pub fn new(uid: TaskUid, status: TaskStatus, kind: TaskKind) -> Self {
        Self {
            uid,
            index_uid: None,
            status,
            kind,
            error: None,
            duration: None,
            enqueued_at: None,
            started_at: None,
            finished_at: None,
        }
    }

    /// Attach error details.
    pub fn with_error(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.error = Some(TaskError {
            code: code.into(),
            message: message.into(),
            error_type: None,
            link: None,
        });
        self
    }
}

/// Index metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexInfo {
    pub uid: String,
    #[serde(default)]
    pub primary_key: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_terminal_statuses() {
        assert!(!TaskStatus::Enqueued.is_terminal());
        assert!(!TaskStatus::Processing.is_terminal());
        assert!(TaskStatus::Succeeded.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(TaskStatus::Canceled.is_terminal());
    }

    #[test]
    fn test_parse_summarized_task() {
        let handle: TaskHandle = serde_json::from_value(json!({
            "taskUid": 12,
            "indexUid": "products",
            "status": "enqueued",
            "type": "documentAdditionOrUpdate",
            "enqueuedAt": "2024-03-01T10:15:00.123456Z"
        }))
        .unwrap();

        assert_eq!(handle.task_uid, 12);
        assert_eq!(handle.index_uid.as_deref(), Some("products"));
        assert_eq!(handle.kind, TaskKind::DocumentAdditionOrUpdate);
        assert!(handle.enqueued_at.is_some());
    }

    #[test]
    fn test_parse_failed_task() {
        let task: TaskInfo = serde_json::from_value(json!({
            "uid": 30,
            "indexUid": "products",
            "status": "failed",
            "type": "settingsUpdate",
            "error": {
                "message": "Attribute `rating` is not filterable.",
                "code": "invalid_settings_filterable_attributes",
                "type": "invalid_request",
                "link": "https://docs.meilisearch.com/errors#invalid_settings_filterable_attributes"
            },
            "duration": "PT0.001S",
            "enqueuedAt": "2024-03-01T10:15:00Z",
            "startedAt": "2024-03-01T10:15:00Z",
            "finishedAt": "2024-03-01T10:15:01Z"
        }))
        .unwrap();

        assert_eq!(task.status, TaskStatus::Failed);
        assert_eq!(task.kind, TaskKind::SettingsUpdate);
        let error = task.error.unwrap();
        assert_eq!(error.code, "invalid_settings_filterable_attributes");
        assert_eq!(error.error_type.as_deref(), Some("invalid_request"));
    }

    #[test]
    fn test_unknown_task_type() {
        let task: TaskInfo = serde_json::from_value(json!({
            "uid": 1,
            "status": "succeeded",
            "type": "dumpCreation"
        }))
        .unwrap();

        assert_eq!(task.kind, TaskKind::Other);
        assert!(task.index_uid.is_none());
    }
}
