//! Axum HTTP server for algocast render jobs.
//!
//! Exposes `POST /render` (bearer-protected, one job at a time), health and
//! readiness probes, local-mode file serving and Prometheus metrics.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod security;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
