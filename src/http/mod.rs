//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, request span)
//!     → middleware/ (client ip, panic, deadline, cors, in-flight)
//!     → routing (health, /api/v1)
//!     → response.rs (envelope) / error.rs (classified failures)
//!     → Send to client
//! ```

pub mod error;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use error::{AppError, ErrorKind};
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use response::{ApiResponse, ApiResult, PaginationMeta};
pub use server::HttpServer;
