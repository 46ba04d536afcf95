//! Application state for the facade

use std::sync::Arc;

use crate::backend::{BackendFactory, LazyBackend, LightRagFactory, RagBackend};
use crate::config::GatewayConfig;
use crate::error::Result;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Backend, built on the first query or insert
    backend: LazyBackend,
}

impl AppState {
    /// Create state backed by the configured LightRAG server.
    ///
    /// Nothing is contacted here; the backend is built on first use.
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_factory(Arc::new(LightRagFactory::new(config)))
    }

    /// Create state with a custom backend factory
    pub fn with_factory(factory: Arc<dyn BackendFactory>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                backend: LazyBackend::new(factory),
            }),
        }
    }

    /// Get the backend, initializing it on first use
    pub async fn backend(&self) -> Result<Arc<dyn RagBackend>> {
        self.inner.backend.get().await
    }

    /// Whether the backend has been initialized
    pub fn is_backend_ready(&self) -> bool {
        self.inner.backend.is_ready()
    }
}
