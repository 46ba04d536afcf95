//! lightrag-gateway: launcher and minimal HTTP facade for a LightRAG server
//!
//! Two alternative deployments share one configuration and bootstrap step:
//! - `launcher` starts the LightRAG server itself, as an entry-point binary or
//!   as a Python module
//! - `server` exposes status, health, query and insert routes that delegate
//!   to a lazily built [`backend::RagBackend`]

pub mod backend;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod launcher;
pub mod server;
pub mod types;

pub use bootstrap::{bootstrap, BootstrapReport};
pub use config::GatewayConfig;
pub use error::{Error, Result};
pub use launcher::{LaunchPlan, LaunchStrategy, Launcher};
pub use server::GatewayServer;
pub use types::{QueryMode, QueryRequest, QueryResponse};
