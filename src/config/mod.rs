//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment (+ optional .env file)
//!     → loader.rs (read & parse variables)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no reload path exists
//! - Everything except the secrets has a default
//! - Validation separates parsing from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use schema::AppConfig;
pub use schema::{AllowedOrigins, CorsConfig, Environment, ListenerConfig, Secret, TimeoutConfig};
