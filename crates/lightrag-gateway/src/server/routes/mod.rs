//! Facade routes

pub mod insert;
pub mod query;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use std::collections::BTreeMap;

use crate::server::state::AppState;
use crate::types::{HealthResponse, StatusResponse};

/// Routes served by the facade, with descriptions
pub const ENDPOINTS: [(&str, &str); 4] = [
    ("GET /", "Service status and available endpoints"),
    ("GET /health", "Health check"),
    ("POST /query", "Query the knowledge base: {\"query\": str, \"mode\"?: str}"),
    ("POST /insert", "Insert text into the knowledge base: {\"text\": str}"),
];

/// Build all facade routes
pub fn facade_routes(max_body_size: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(status))
        .route("/health", get(health))
        .route("/query", post(query::query))
        .route("/insert", post(insert::insert))
        .layer(DefaultBodyLimit::max(max_body_size))
}

/// GET / - service status
async fn status() -> Json<StatusResponse> {
    let endpoints: BTreeMap<String, String> = ENDPOINTS
        .iter()
        .map(|(route, description)| (route.to_string(), description.to_string()))
        .collect();

    Json(StatusResponse::running(endpoints))
}

/// GET /health - does not touch the backend
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
