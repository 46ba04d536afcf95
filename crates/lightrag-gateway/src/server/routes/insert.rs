//! Text insertion endpoint

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{InsertRequest, InsertResponse};

/// POST /insert - ingest text into the backend's index
///
/// The body is validated before the backend is touched, so a bad request
/// never triggers backend initialization.
pub async fn insert(
    State(state): State<AppState>,
    payload: std::result::Result<Json<InsertRequest>, JsonRejection>,
) -> Result<Json<InsertResponse>> {
    let Json(request) = payload.map_err(|e| Error::invalid_request(e.body_text()))?;
    let text = request.validate()?;

    let backend = state.backend().await?;
    let message = backend.insert(text).await?;

    Ok(Json(InsertResponse::success(message)))
}
