//! Backend abstraction for the facade
//!
//! The facade never talks to LightRAG directly; it goes through a
//! [`RagBackend`] obtained from a [`LazyBackend`], which builds the shared
//! instance on first use.

pub mod lazy;
pub mod lightrag;

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::types::QueryMode;

pub use lazy::LazyBackend;
pub use lightrag::{LightRagClient, LightRagFactory};

/// Retrieval engine operations exposed by the facade
///
/// Implementations:
/// - `LightRagClient`: a LightRAG server reached over HTTP
#[async_trait]
pub trait RagBackend: Send + Sync {
    /// Answer `query` using the given retrieval mode
    async fn query(&self, query: &str, mode: QueryMode) -> Result<serde_json::Value>;

    /// Ingest `text` into the index, returning a human-readable message
    async fn insert(&self, text: &str) -> Result<String>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Builds the shared backend instance
#[async_trait]
pub trait BackendFactory: Send + Sync {
    async fn build(&self) -> Result<Arc<dyn RagBackend>>;
}
