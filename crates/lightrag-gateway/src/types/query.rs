//! Query and insert request types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// LightRAG retrieval mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// Entity-centric retrieval
    Local,
    /// Relationship-centric retrieval
    Global,
    /// Local and global combined
    #[default]
    Hybrid,
    /// Plain vector search without the graph
    Naive,
    /// Graph and vector retrieval combined
    Mix,
    /// Send the query straight to the LLM
    Bypass,
}

impl QueryMode {
    pub const ALL: [QueryMode; 6] = [
        Self::Local,
        Self::Global,
        Self::Hybrid,
        Self::Naive,
        Self::Mix,
        Self::Bypass,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Global => "global",
            Self::Hybrid => "hybrid",
            Self::Naive => "naive",
            Self::Mix => "mix",
            Self::Bypass => "bypass",
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == wanted)
            .ok_or_else(|| {
                Error::invalid_request(format!(
                    "Unknown mode '{}'; expected one of: local, global, hybrid, naive, mix, bypass",
                    s
                ))
            })
    }
}

/// Body of `POST /query`
///
/// Fields are optional at the serde level so that a missing field is reported
/// as a 400 by [`QueryRequest::validate`] rather than as an extractor rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    #[serde(default)]
    pub query: Option<String>,

    /// Retrieval mode (default: hybrid)
    #[serde(default)]
    pub mode: Option<String>,
}

impl QueryRequest {
    /// Validated query text and mode
    pub fn validate(&self) -> Result<(&str, QueryMode)> {
        let query = self
            .query
            .as_deref()
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| Error::invalid_request("Missing 'query' in request body"))?;

        let mode = match self.mode.as_deref() {
            Some(mode) => mode.parse()?,
            None => QueryMode::default(),
        };

        Ok((query, mode))
    }
}

/// Body of `POST /insert`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InsertRequest {
    /// Text to ingest
    #[serde(default)]
    pub text: Option<String>,
}

impl InsertRequest {
    /// Validated, non-empty text
    pub fn validate(&self) -> Result<&str> {
        self.text
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::invalid_request("Missing or empty 'text' in request body"))
    }
}
