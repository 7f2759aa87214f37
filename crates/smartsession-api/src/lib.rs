//! Axum HTTP/WebSocket server for SmartSession.
//!
//! This crate provides:
//! - `/ws/student`: subjects stream frames, one monitoring pipeline each
//! - `/ws/teacher`: observers receive every status update
//! - Health/readiness probes and Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod ws;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
