//! Panic containment.
//!
//! A panicking handler becomes an `INTERNAL_ERROR` envelope; the panic
//! payload is logged as the cause and the server keeps running.

use std::any::Any;

use axum::response::{IntoResponse, Response};
use tower_http::catch_panic::CatchPanicLayer;

use crate::http::error::AppError;

/// Panic payload carried as the cause of the resulting [`AppError`].
#[derive(Debug, thiserror::Error)]
#[error("handler panicked: {0}")]
pub struct PanicError(pub String);

pub type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response;

pub fn catch_panic_layer() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(handle_panic as PanicHandler)
}

pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "non-string panic payload".to_string()
    };

    AppError::from_cause(PanicError(detail)).into_response()
}
