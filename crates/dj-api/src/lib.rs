//! # dj-api
//!
//! REST API for Djoppie Inventory.
//!
//! Routes live under `/api/v1` (with `/api` kept as an alias), health probes
//! under `/health` and Prometheus metrics at `/metrics`. Requests carry an
//! Entra ID bearer token unless authentication is disabled for development.

pub mod auth;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use auth::{AuthConfig, JwtValidator, Principal, Role};
pub use error::ApiError;
pub use middleware::CorsConfig;
pub use server::{ApiDoc, ApiServer, ApiServerConfig};
pub use state::AppState;
