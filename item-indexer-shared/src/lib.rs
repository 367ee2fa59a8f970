//! # Item Indexer Shared
//!
//! Types shared by every item indexer crate: the records produced by a crawler
//! and the task objects returned by the indexing service.

pub mod record;
pub mod task;

pub use record::{Record, RecordError};
pub use task::{IndexInfo, TaskError, TaskHandle, TaskInfo, TaskKind, TaskStatus, TaskUid};
