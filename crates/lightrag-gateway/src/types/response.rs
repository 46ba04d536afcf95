//! Response envelopes for the facade

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Envelope status value for successful calls
pub const STATUS_SUCCESS: &str = "success";

/// `GET /` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    /// Route -> description
    pub endpoints: BTreeMap<String, String>,
}

impl StatusResponse {
    pub fn running(endpoints: BTreeMap<String, String>) -> Self {
        Self {
            status: "running".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            endpoints,
        }
    }
}

/// `GET /health` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

/// `POST /query` success body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub status: String,
    /// Backend-defined result
    pub result: serde_json::Value,
}

impl QueryResponse {
    pub fn success(result: serde_json::Value) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            result,
        }
    }
}

/// `POST /insert` success body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertResponse {
    pub status: String,
    pub message: String,
}

impl InsertResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message: message.into(),
        }
    }
}

/// Error envelope, as produced by `Error::into_response`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
