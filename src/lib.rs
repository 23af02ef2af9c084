//! API server backbone library.
//!
//! Request lifecycle, middleware pipeline and the uniform response
//! envelope shared by every route.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::AppConfig;
pub use http::{ApiResponse, ApiResult, AppError, HttpServer};
pub use lifecycle::Shutdown;
