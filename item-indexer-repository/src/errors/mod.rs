//! Error types for the item indexer repository.

mod backend_error;

pub use backend_error::BackendError;
