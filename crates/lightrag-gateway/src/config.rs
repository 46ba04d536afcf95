//! Configuration for the gateway
//!
//! Built once at start-up from defaults, an optional TOML file, and
//! environment overrides, then passed by reference to every component.
//! This is the only module that reads the process environment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::launcher::LaunchStrategy;

/// Main gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Data and log directories
    pub paths: PathsConfig,
    /// Credentials for the language-model backend
    pub credentials: Credentials,
    /// Model bindings handed to the LightRAG server
    pub models: ModelConfig,
    /// Facade listener configuration
    pub server: ServerConfig,
    /// Upstream LightRAG server the facade talks to
    pub lightrag: LightRagConfig,
    /// Native server launch configuration
    pub launch: LaunchConfig,
}

/// Directory layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// LightRAG working directory (index and graph storage)
    pub working_dir: PathBuf,
    /// Log directory
    pub log_dir: PathBuf,
    /// Directory LightRAG scans for input documents
    pub input_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("/app/data"),
            log_dir: PathBuf::from("/app/logs"),
            input_dir: PathBuf::from("/app/inputs"),
        }
    }
}

impl PathsConfig {
    /// All directories that must exist before anything starts
    pub fn directories(&self) -> [&Path; 3] {
        [
            self.working_dir.as_path(),
            self.log_dir.as_path(),
            self.input_dir.as_path(),
        ]
    }
}

/// Secrets; never serialized and redacted in debug output
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// API key for the OpenAI language-model and embedding bindings
    #[serde(skip_serializing)]
    pub openai_api_key: Option<String>,
}

impl Credentials {
    /// Whether a usable language-model credential is present
    pub fn has_llm_key(&self) -> bool {
        self.openai_api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Language-model and embedding bindings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// LLM binding name (e.g. "openai", "ollama")
    pub llm_binding: String,
    /// LLM model name
    pub llm_model: String,
    /// Embedding binding name
    pub embedding_binding: String,
    /// Embedding model name
    pub embedding_model: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            llm_binding: "openai".to_string(),
            llm_model: "gpt-4o-mini".to_string(),
            embedding_binding: "openai".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
        }
    }
}

/// Facade server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum request body size in bytes (default: 10MB)
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9621,
            enable_cors: true,
            max_body_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Upstream LightRAG server configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightRagConfig {
    /// LightRAG server base URL
    pub base_url: String,
    /// Value sent as `X-API-Key` when the upstream server requires one
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl fmt::Debug for LightRagConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LightRagConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for LightRagConfig {
    fn default() -> Self {
        Self {
            // The facade itself owns 9621
            base_url: "http://127.0.0.1:9622".to_string(),
            api_key: None,
            timeout_secs: 300, // graph extraction on insert is slow
        }
    }
}

/// Native LightRAG server launch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// How to start the server
    pub strategy: LaunchStrategy,
    /// Bind host passed to the server
    pub host: String,
    /// Bind port passed to the server
    pub port: u16,
    /// Console entry point installed by the lightrag package
    pub entry_point: String,
    /// Python interpreter used by the module strategy
    pub python: String,
    /// Module run with `python -m`
    pub module: String,
    /// Current directory for the server process
    pub server_dir: Option<PathBuf>,
    /// Pass `--working-dir` and `--input-dir` explicitly
    pub pass_directories: bool,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            strategy: LaunchStrategy::Auto,
            host: "0.0.0.0".to_string(),
            port: 9621,
            entry_point: "lightrag-server".to_string(),
            python: "python3".to_string(),
            module: "lightrag.api.lightrag_server".to_string(),
            server_dir: None,
            pass_directories: false,
        }
    }
}

impl GatewayConfig {
    /// Load configuration: defaults or the given TOML file, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file; missing sections fall back to defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Ok(toml::from_str(&raw)?)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(dir) = var("LIGHTRAG_WORKING_DIR") {
            self.paths.working_dir = PathBuf::from(dir);
        }
        if let Some(dir) = var("LIGHTRAG_LOG_DIR") {
            self.paths.log_dir = PathBuf::from(dir);
        }
        if let Some(dir) = var("LIGHTRAG_INPUT_DIR") {
            self.paths.input_dir = PathBuf::from(dir);
        }
        if let Some(key) = var("OPENAI_API_KEY") {
            self.credentials.openai_api_key = Some(key);
        }
        if let Some(url) = var("LIGHTRAG_URL") {
            self.lightrag.base_url = url;
        }
        if let Some(key) = var("LIGHTRAG_API_KEY") {
            self.lightrag.api_key = Some(key);
        }
        if let Some(host) = var("HOST") {
            self.server.host = host.clone();
            self.launch.host = host;
        }
        match var("PORT").map(|raw| raw.trim().parse::<u16>()) {
            Some(Ok(port)) => {
                self.server.port = port;
                self.launch.port = port;
            }
            Some(Err(e)) => tracing::warn!("Ignoring invalid PORT: {}", e),
            None => {}
        }
        // Launched server only, so it can sit beside a facade on PORT
        match var("LIGHTRAG_LAUNCH_PORT").map(|raw| raw.trim().parse::<u16>()) {
            Some(Ok(port)) => self.launch.port = port,
            Some(Err(e)) => tracing::warn!("Ignoring invalid LIGHTRAG_LAUNCH_PORT: {}", e),
            None => {}
        }
        match var("LIGHTRAG_LAUNCH_STRATEGY").map(|raw| raw.parse::<LaunchStrategy>()) {
            Some(Ok(strategy)) => self.launch.strategy = strategy,
            Some(Err(e)) => tracing::warn!("Ignoring LIGHTRAG_LAUNCH_STRATEGY: {}", e),
            None => {}
        }
    }

    /// Reject configurations that cannot work
    pub fn validate(&self) -> Result<()> {
        if !self.lightrag.base_url.starts_with("http://")
            && !self.lightrag.base_url.starts_with("https://")
        {
            return Err(Error::Config(format!(
                "lightrag.base_url must be an http(s) URL, got '{}'",
                self.lightrag.base_url
            )));
        }
        if self.lightrag.timeout_secs == 0 {
            return Err(Error::Config("lightrag.timeout_secs must be > 0".to_string()));
        }
        if self.launch.entry_point.trim().is_empty() || self.launch.python.trim().is_empty() {
            return Err(Error::Config(
                "launch.entry_point and launch.python must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_container_layout() {
        let config = GatewayConfig::default();
        assert_eq!(config.paths.working_dir, PathBuf::from("/app/data"));
        assert_eq!(config.paths.log_dir, PathBuf::from("/app/logs"));
        assert_eq!(config.server.port, 9621);
        assert_eq!(config.launch.port, 9621);
        assert_eq!(config.launch.host, "0.0.0.0");
        assert_eq!(config.models.llm_model, "gpt-4o-mini");
        assert_eq!(config.models.embedding_model, "text-embedding-3-small");
        assert!(!config.credentials.has_llm_key());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = GatewayConfig::default();
        config.apply_env_with(env(&[
            ("LIGHTRAG_WORKING_DIR", "/tmp/rag"),
            ("OPENAI_API_KEY", "sk-test"),
            ("PORT", "8080"),
            ("LIGHTRAG_URL", "http://rag:9621"),
            ("LIGHTRAG_LAUNCH_STRATEGY", "module"),
        ]));

        assert_eq!(config.paths.working_dir, PathBuf::from("/tmp/rag"));
        assert_eq!(config.paths.log_dir, PathBuf::from("/app/logs"));
        assert!(config.credentials.has_llm_key());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.launch.port, 8080);
        assert_eq!(config.lightrag.base_url, "http://rag:9621");
        assert_eq!(config.launch.strategy, LaunchStrategy::Module);
    }

    #[test]
    fn test_launch_port_overrides_port_for_launch_only() {
        let mut config = GatewayConfig::default();
        config.apply_env_with(env(&[("PORT", "9621"), ("LIGHTRAG_LAUNCH_PORT", "9622")]));

        assert_eq!(config.server.port, 9621);
        assert_eq!(config.launch.port, 9622);
        assert!(config.lightrag.base_url.ends_with(":9622"));

        let mut config = GatewayConfig::default();
        config.apply_env_with(env(&[("LIGHTRAG_LAUNCH_PORT", "high")]));
        assert_eq!(config.launch.port, 9621);
    }

    #[test]
    fn test_empty_and_invalid_env_values_are_ignored() {
        let mut config = GatewayConfig::default();
        config.apply_env_with(env(&[
            ("OPENAI_API_KEY", "   "),
            ("PORT", "not-a-port"),
            ("LIGHTRAG_LAUNCH_STRATEGY", "docker"),
        ]));

        assert!(!config.credentials.has_llm_key());
        assert_eq!(config.server.port, 9621);
        assert_eq!(config.launch.strategy, LaunchStrategy::Auto);
    }

    #[test]
    fn test_partial_toml_overlays_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [paths]
            working_dir = "/srv/rag"

            [launch]
            strategy = "entry-point"
            pass_directories = true
            "#,
        )
        .unwrap();

        assert_eq!(config.paths.working_dir, PathBuf::from("/srv/rag"));
        assert_eq!(config.paths.log_dir, PathBuf::from("/app/logs"));
        assert_eq!(config.launch.strategy, LaunchStrategy::EntryPoint);
        assert!(config.launch.pass_directories);
        assert_eq!(config.launch.module, "lightrag.api.lightrag_server");
    }

    #[test]
    fn test_from_file_reports_missing_file() {
        let err = GatewayConfig::from_file(Path::new("/nonexistent/gateway.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_validate_rejects_bad_upstream_url() {
        let mut config = GatewayConfig::default();
        config.lightrag.base_url = "rag:9621".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_credentials_are_redacted() {
        let credentials = Credentials {
            openai_api_key: Some("sk-secret".to_string()),
        };
        let debug = format!("{:?}", credentials);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_upstream_api_key_is_redacted() {
        let mut config = GatewayConfig::default();
        config.lightrag.api_key = Some("upstream-secret".to_string());
        let debug = format!("{:?}", config);
        assert!(!debug.contains("upstream-secret"));
        assert!(debug.contains("http://127.0.0.1:9622"));
    }
}
