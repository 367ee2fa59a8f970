//! Result types for backend operations.

use std::time::Duration;

use item_indexer_shared::{TaskInfo, TaskStatus, TaskUid};

/// How waiting on a task ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    /// The task reached a terminal status (succeeded, failed or canceled).
    Completed(TaskInfo),
    /// The task was still running when the wait budget ran out.
    TimedOut {
        task_uid: TaskUid,
        last_status: TaskStatus,
        waited: Duration,
    },
}
