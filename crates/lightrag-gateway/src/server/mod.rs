//! HTTP facade over the LightRAG backend

pub mod routes;
pub mod state;

use axum::Router;
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{GatewayConfig, ServerConfig};
use crate::error::{Error, Result};
use state::AppState;

/// Facade HTTP server
pub struct GatewayServer {
    config: GatewayConfig,
    state: AppState,
}

impl GatewayServer {
    /// Create a new facade server; the backend is not contacted yet
    pub fn new(config: GatewayConfig) -> Self {
        let state = AppState::new(config.clone());
        Self { config, state }
    }

    /// Start the server and run until Ctrl-C
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let router = build_router(self.state, &self.config.server);

        tracing::info!("Starting LightRAG facade on http://{}", addr);
        tracing::info!("Upstream LightRAG server: {}", self.config.lightrag.base_url);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind {}: {}", addr, e)))?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

        tracing::info!("Facade stopped");
        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}

/// Build the router with all routes and middleware
pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    let router = routes::facade_routes(server.max_body_size)
        .with_state(state)
        // Middleware layers (order matters - applied bottom to top)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    if server.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router.layer(cors)
    } else {
        router
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
