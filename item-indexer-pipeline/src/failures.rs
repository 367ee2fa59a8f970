//! Failed task records and failure reporting.

use std::fmt;
use std::time::Duration;

use tracing::error;

use item_indexer_repository::{BackendError, TaskOutcome};
use item_indexer_shared::{TaskHandle, TaskInfo, TaskKind, TaskStatus, TaskUid};

/// Code used when the service reported a failure without error details.
pub const UNKNOWN_ERROR_CODE: &str = "unknown";

/// Code used when the task could not be polled.
pub const WAIT_ERROR_CODE: &str = "wait_error";

/// Code used when the task did not finish within the wait budget.
pub const WAIT_TIMEOUT_CODE: &str = "wait_timeout";

/// Code used when the task was canceled on the service side.
pub const CANCELED_CODE: &str = "task_canceled";

/// Why a task was classified as failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The service processed the task and reported a failure.
    Failed {
        code: String,
        message: String,
        link: Option<String>,
    },
    /// The task was canceled before completing.
    Canceled,
    /// The task was still running when the wait budget ran out.
    TimedOut { waited: Duration },
    /// Polling the task itself failed.
    WaitError { message: String },
}

impl FailureReason {
    /// Machine readable code for this failure.
    pub fn code(&self) -> &str {
        match self {
            Self::Failed { code, .. } => code.as_str(),
            Self::Canceled => CANCELED_CODE,
            Self::TimedOut { .. } => WAIT_TIMEOUT_CODE,
            Self::WaitError { .. } => WAIT_ERROR_CODE,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed { code, message, .. } => write!(f, "{}: {}", code, message),
            Self::Canceled => f.write_str("task was canceled"),
            Self::TimedOut { waited } => {
                write!(f, "task did not finish within {:.1}s", waited.as_secs_f64())
            }
            Self::WaitError { message } => write!(f, "{}: {}", WAIT_ERROR_CODE, message),
        }
    }
}

/// A task whose verification concluded in failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedTask {
    pub task_uid: TaskUid,
    pub index_uid: Option<String>,
    pub kind: TaskKind,
    pub reason: FailureReason,
}

impl FailedTask {
    fn new(handle: &TaskHandle, reason: FailureReason) -> Self {
        Self {
            task_uid: handle.task_uid,
            index_uid: handle.index_uid.clone(),
            kind: handle.kind,
            reason,
        }
    }

    /// Classify the result of waiting on `handle`.
    ///
    /// Returns `None` when the task succeeded. Every other result, including
    /// timeouts and polling errors, yields a failed task.
    pub fn classify(
        handle: &TaskHandle,
        result: Result<TaskOutcome, BackendError>,
    ) -> Option<Self> {
        let reason = match result {
            Ok(TaskOutcome::Completed(task)) => return Self::from_task_info(handle, task),
            Ok(TaskOutcome::TimedOut { waited, .. }) => FailureReason::TimedOut { waited },
            Err(e) => FailureReason::WaitError {
                message: e.to_string(),
            },
        };

        Some(Self::new(handle, reason))
    }

    fn from_task_info(handle: &TaskHandle, task: TaskInfo) -> Option<Self> {
        let reason = match task.status {
            TaskStatus::Succeeded => return None,
            TaskStatus::Canceled => FailureReason::Canceled,
            TaskStatus::Failed => match task.error {
                Some(error) => FailureReason::Failed {
                    code: error.code,
                    message: error.message,
                    link: error.link,
                },
                None => FailureReason::Failed {
                    code: UNKNOWN_ERROR_CODE.to_string(),
                    message: "task failed without error details".to_string(),
                    link: None,
                },
            },
            // Completed outcomes are terminal; anything else did not finish.
            TaskStatus::Enqueued | TaskStatus::Processing => FailureReason::TimedOut {
                waited: Duration::ZERO,
            },
        };

        Some(Self::new(handle, reason))
    }
}

impl fmt::Display for FailedTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task {} ({:?}): {}", self.task_uid, self.kind, self.reason)
    }
}

/// Receives the consolidated list of failed tasks when the pipeline closes.
///
/// Implementations must not fail; the report is informational and never
/// changes the outcome of the run.
pub trait FailureReporter: Send + Sync {
    fn report(&self, index_name: &str, failures: &[FailedTask]);
}

/// Reporter that logs failures through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl FailureReporter for TracingReporter {
    fn report(&self, index_name: &str, failures: &[FailedTask]) {
        error!(
            index = %index_name,
            failed = failures.len(),
            "Indexing finished with failed tasks"
        );

        for task in failures {
            error!(
                task_uid = task.task_uid,
                kind = ?task.kind,
                code = %task.reason.code(),
                reason = %task.reason,
                "Meilisearch failed task"
            );
        }
    }
}
