//! Request pipeline stages.
//!
//! # Order (outermost first)
//! ```text
//! request id → trace span → propagate id
//!     → client_ip.rs (resolve caller address)
//!     → cors.rs (cross-origin policy, wraps every envelope)
//!     → panic.rs (contain handler panics)
//!     → timeout.rs (per-request deadline)
//!     → inflight.rs (drain bookkeeping)
//!     → router
//! ```

pub mod client_ip;
pub mod cors;
pub mod inflight;
pub mod panic;
pub mod timeout;

pub use client_ip::{client_ip_middleware, ClientIp};
pub use cors::cors_layer;
pub use inflight::{track_in_flight, InFlightTracker};
pub use panic::catch_panic_layer;
pub use timeout::{deadline_middleware, RequestDeadline};
