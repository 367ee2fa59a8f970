//! Interface definitions for the indexing backend.
//!
//! The `IndexBackend` trait allows the pipeline to be driven against the real
//! service or an in-memory fake.

mod index_backend;

pub use index_backend::IndexBackend;
