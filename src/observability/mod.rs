//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured fields)
//!     → inside the per-request span (request_id, method, path, client_ip)
//!
//! logging.rs installs one subscriber at startup:
//!     development → human-readable lines
//!     staging/production → JSON lines
//! ```

pub mod logging;
