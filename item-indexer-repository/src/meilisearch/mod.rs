//! Meilisearch implementation of the indexing backend.

mod client;
mod routes;

pub use client::MeilisearchClient;
