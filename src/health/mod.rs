//! Liveness endpoint.
//!
//! `GET /health` answers unconditionally. It consults no downstream
//! dependency, so it keeps working while those are unavailable.

use serde::Serialize;

use crate::http::response::ApiResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

pub async fn liveness() -> ApiResponse<HealthStatus> {
    ApiResponse::ok(HealthStatus { status: "ok" })
}
