//! One-time, mutually exclusive backend initialization

use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::error::Result;

use super::{BackendFactory, RagBackend};

/// Shared backend handle, built on first use.
///
/// Two states: uninitialized and ready. Concurrent first callers wait on the
/// same initialization; a failed build leaves the handle uninitialized so the
/// next caller retries.
pub struct LazyBackend {
    factory: Arc<dyn BackendFactory>,
    cell: OnceCell<Arc<dyn RagBackend>>,
}

impl LazyBackend {
    pub fn new(factory: Arc<dyn BackendFactory>) -> Self {
        Self {
            factory,
            cell: OnceCell::new(),
        }
    }

    /// Get the backend, building it if this is the first successful call
    pub async fn get(&self) -> Result<Arc<dyn RagBackend>> {
        let backend = self
            .cell
            .get_or_try_init(|| async {
                tracing::info!("Initializing LightRAG backend...");
                let backend = self.factory.build().await?;
                tracing::info!("Backend ready ({})", backend.name());
                Ok::<_, crate::error::Error>(backend)
            })
            .await?;

        Ok(Arc::clone(backend))
    }

    /// Whether the backend has been built
    pub fn is_ready(&self) -> bool {
        self.cell.initialized()
    }
}
