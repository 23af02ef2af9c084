//! Network layer.
//!
//! # Data Flow
//! ```text
//! ListenerConfig (host, port)
//!     → listener.rs (bind TcpListener)
//!     → http::server (axum::serve accepts connections)
//! ```

pub mod listener;

pub use listener::{bind, ListenerError};
