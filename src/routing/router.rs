//! Route table.
//!
//! # Responsibilities
//! - Mount the liveness endpoint
//! - Mount versioned API routes under their prefix
//! - Answer every unmatched path with a `NOT_FOUND` envelope
//!
//! # Design Decisions
//! - Built once at startup, immutable afterwards
//! - Versions live side by side under `/api/v{n}`

use axum::{http::Uri, routing::get, Router};

use crate::health::liveness;
use crate::http::error::AppError;

pub const HEALTH_PATH: &str = "/health";
pub const API_V1_PREFIX: &str = "/api/v1";

/// Routes served under [`API_V1_PREFIX`]. Nothing is mounted yet.
pub fn api_v1() -> Router {
    Router::new()
}

/// Full route table with `api` nested under [`API_V1_PREFIX`].
pub fn routes(api: Router) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(liveness))
        .nest(API_V1_PREFIX, api.fallback(not_found))
        .fallback(not_found)
}

pub async fn not_found(uri: Uri) -> AppError {
    tracing::debug!(path = %uri.path(), "No route matched");
    AppError::not_found("The requested resource was not found")
}
