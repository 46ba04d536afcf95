//! Error types for the gateway

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::types::ErrorResponse;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Gateway errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request body failed validation
    #[error("{0}")]
    InvalidRequest(String),

    /// The shared backend could not be constructed
    #[error("Failed to initialize LightRAG backend: {0}")]
    BackendInit(String),

    /// The backend failed while serving a call
    #[error("LightRAG backend error: {0}")]
    Backend(String),

    /// The LightRAG server could not be started
    #[error("Launch error: {0}")]
    Launch(String),

    /// The launched server exited unsuccessfully
    #[error("'{program}' exited with {}", describe_exit(.code))]
    ProcessExit { program: String, code: Option<i32> },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML config parse error
    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl Error {
    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a backend initialization error
    pub fn backend_init(message: impl Into<String>) -> Self {
        Self::BackendInit(message.into())
    }

    /// Create a backend call error
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// Create a launch error
    pub fn launch(message: impl Into<String>) -> Self {
        Self::Launch(message.into())
    }

    /// HTTP status this error maps to when returned from a handler
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidRequest(_) | Error::Json(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Rejected request: {}", self);
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}
