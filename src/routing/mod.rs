//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → /health           → liveness handler
//!     → /api/v1/...       → versioned API router
//!     → anything else     → NOT_FOUND envelope
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Handlers return `ApiResult<T>` so the envelope codec is the single
//!   serialization point

pub mod router;

pub use router::{api_v1, routes, API_V1_PREFIX, HEALTH_PATH};
