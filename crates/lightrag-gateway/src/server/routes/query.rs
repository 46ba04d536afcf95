//! Query endpoint

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{QueryRequest, QueryResponse};

/// POST /query - forward a query to the backend
pub async fn query(
    State(state): State<AppState>,
    payload: std::result::Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>> {
    let Json(request) = payload.map_err(|e| Error::invalid_request(e.body_text()))?;
    let (query, mode) = request.validate()?;

    let start = Instant::now();
    let backend = state.backend().await?;
    let result = backend.query(query, mode).await?;

    tracing::info!(
        "Query completed in {}ms (mode: {})",
        start.elapsed().as_millis(),
        mode
    );

    Ok(Json(QueryResponse::success(result)))
}
