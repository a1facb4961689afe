//! Axum HTTP API for the face-swap service.
//!
//! This crate provides:
//! - Session-based login backed by a credentials file
//! - Multipart upload of a face image and a target video
//! - Synchronous swap processing through the provider pipeline
//! - Temp-file housekeeping and Prometheus metrics

pub mod auth;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod files;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use cleanup::UploadSweeper;
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
