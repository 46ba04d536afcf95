//! Request and response types for the facade

pub mod query;
pub mod response;

pub use query::{InsertRequest, QueryMode, QueryRequest};
pub use response::{ErrorResponse, HealthResponse, InsertResponse, QueryResponse, StatusResponse};
