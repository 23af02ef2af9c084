//! Per-request deadline.
//!
//! Downstream processing runs under `tokio::time::timeout`. On expiry the
//! downstream future is dropped, which cancels whatever it was awaiting,
//! and the client receives a `TIMEOUT` envelope.

use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::error::AppError;

/// Deadline applied to each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestDeadline(pub Duration);

pub async fn deadline_middleware(
    State(RequestDeadline(deadline)): State<RequestDeadline>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match tokio::time::timeout(deadline, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(
                timeout_ms = deadline.as_millis() as u64,
                "Request exceeded deadline"
            );
            AppError::timeout().into_response()
        }
    }
}
