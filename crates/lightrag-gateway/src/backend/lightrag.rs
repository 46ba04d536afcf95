//! LightRAG server client

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::GatewayConfig;
use crate::error::{Error, Result};
use crate::types::QueryMode;

use super::{BackendFactory, RagBackend};

const API_KEY_HEADER: &str = "X-API-Key";

/// Upper bound for the health check, independent of the request timeout
const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for a running LightRAG server
pub struct LightRagClient {
    /// HTTP client
    client: Client,
    /// Server base URL without trailing slash
    base_url: String,
    /// Optional API key for the server
    api_key: Option<String>,
    /// Timeout for `/health` only
    health_timeout: Duration,
}

#[derive(Serialize)]
struct QueryBody<'a> {
    query: &'a str,
    mode: QueryMode,
}

#[derive(Serialize)]
struct InsertTextBody<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct InsertTextResponse {
    #[serde(default)]
    message: Option<String>,
}

impl LightRagClient {
    /// Create a new client
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(5)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            health_timeout: HEALTH_TIMEOUT,
        })
    }

    /// Override the health check timeout
    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    /// Create from gateway configuration
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        Self::new(
            &config.lightrag.base_url,
            config.lightrag.api_key.clone(),
            Duration::from_secs(config.lightrag.timeout_secs),
        )
    }

    /// Server base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    /// Check that the server answers its health endpoint with 2xx
    pub async fn health_check(&self) -> Result<()> {
        let request = self
            .authorized(self.client.get(self.url("/health")))
            .timeout(self.health_timeout);

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::backend(format!(
                    "no health response within {}s",
                    self.health_timeout.as_secs_f32()
                ))
            } else {
                Error::backend(format!("unreachable: {}", e))
            }
        })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::backend(format!("health check returned HTTP {}", status)))
        }
    }

    /// Turn a non-2xx upstream response into a backend error
    async fn check_status(response: Response, operation: &str) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(Error::backend(format!(
            "{} failed: HTTP {} - {}",
            operation, status, body
        )))
    }
}

#[async_trait]
impl RagBackend for LightRagClient {
    async fn query(&self, query: &str, mode: QueryMode) -> Result<serde_json::Value> {
        tracing::info!("Query ({}): \"{}\"", mode, query);

        let request = self
            .client
            .post(self.url("/query"))
            .json(&QueryBody { query, mode });

        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| Error::backend(format!("Query request failed: {}", e)))?;
        let response = Self::check_status(response, "Query").await?;

        let mut body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::backend(format!("Failed to parse query response: {}", e)))?;

        // LightRAG wraps the answer in {"response": ...}
        Ok(match body.get_mut("response") {
            Some(answer) => answer.take(),
            None => body,
        })
    }

    async fn insert(&self, text: &str) -> Result<String> {
        tracing::info!("Inserting {} bytes of text", text.len());

        let request = self
            .client
            .post(self.url("/documents/text"))
            .json(&InsertTextBody { text });

        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| Error::backend(format!("Insert request failed: {}", e)))?;
        let response = Self::check_status(response, "Insert").await?;

        let body: InsertTextResponse = response
            .json()
            .await
            .map_err(|e| Error::backend(format!("Failed to parse insert response: {}", e)))?;

        Ok(body
            .message
            .unwrap_or_else(|| "Text inserted successfully".to_string()))
    }

    fn name(&self) -> &str {
        "lightrag"
    }
}

/// Builds a [`LightRagClient`] once the upstream server is reachable
pub struct LightRagFactory {
    config: GatewayConfig,
}

impl LightRagFactory {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    fn working_dir(&self) -> &PathBuf {
        &self.config.paths.working_dir
    }
}

#[async_trait]
impl BackendFactory for LightRagFactory {
    async fn build(&self) -> Result<Arc<dyn RagBackend>> {
        tokio::fs::create_dir_all(self.working_dir())
            .await
            .map_err(|e| {
                Error::backend_init(format!(
                    "cannot create working directory {}: {}",
                    self.working_dir().display(),
                    e
                ))
            })?;

        let client = LightRagClient::from_config(&self.config)
            .map_err(|e| Error::backend_init(e.to_string()))?;

        if let Err(e) = client.health_check().await {
            return Err(Error::backend_init(format!(
                "LightRAG server at {} is not healthy ({})",
                client.base_url(),
                e
            )));
        }

        Ok(Arc::new(client))
    }
}
