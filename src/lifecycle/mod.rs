//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Init logging → Build pipeline → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Token cancelled → Stop accepting → Drain (bounded) → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Cancel shutdown token
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then logging, then listener
//! - Fail fast: configuration, logging and bind errors are fatal
//! - Shutdown has timeout: forced exit after deadline, still exit 0

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{DrainOutcome, Shutdown};
pub use startup::{Lifecycle, Phase};
