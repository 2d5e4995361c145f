//! Assigner Server - HTTP boundary for the reviewer assigner
//!
//! Maps JSON requests onto the core services and domain errors onto HTTP
//! statuses. The `assigner` binary wires it to a store and runs it.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use error::{ApiError, ApiResult};
pub use routes::{router, AppState};
