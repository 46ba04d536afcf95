//! Environment bootstrap: directory layout and credential check

use std::path::PathBuf;

use crate::config::GatewayConfig;
use crate::error::Result;

/// Outcome of a bootstrap run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Directories that are guaranteed to exist
    pub directories: Vec<PathBuf>,
    /// Whether the language-model credential was found
    pub credential_present: bool,
}

/// Ensure the working, log and input directories exist and check credentials.
///
/// Safe to call repeatedly. A missing credential only produces a warning: the
/// server still starts, and queries fail later when LightRAG reaches the
/// language-model API.
pub fn bootstrap(config: &GatewayConfig) -> Result<BootstrapReport> {
    let mut directories = Vec::with_capacity(3);
    for dir in config.paths.directories() {
        std::fs::create_dir_all(dir)?;
        tracing::debug!("Directory ready: {}", dir.display());
        directories.push(dir.to_path_buf());
    }

    let credential_present = config.credentials.has_llm_key();
    if !credential_present {
        tracing::warn!("OPENAI_API_KEY is not set");
        tracing::warn!("The server will start, but queries and inserts will fail until the key is configured");
    }

    tracing::info!(
        working_dir = %config.paths.working_dir.display(),
        log_dir = %config.paths.log_dir.display(),
        credential_present,
        "bootstrap complete"
    );

    Ok(BootstrapReport {
        directories,
        credential_present,
    })
}
