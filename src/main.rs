//! API server.
//!
//! # Architecture Overview
//!
//! ```text
//!   environment ──▶ config ──▶ observability::logging
//!                     │
//!                     ▼
//!   Client ──▶ net::listener ──▶ http::server
//!                                   │
//!          ┌────────────────────────┴───────────────────────┐
//!          │ request id → client ip → panic → deadline → cors │
//!          └────────────────────────┬───────────────────────┘
//!                                   ▼
//!                 routing: /health, /api/v1/*, fallback
//!                                   │
//!   Client ◀── http::response (envelope) ◀── handler result
//!
//!   SIGINT/SIGTERM ──▶ lifecycle::Shutdown ──▶ drain (bounded) ──▶ exit
//! ```

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    api_server::lifecycle::startup::run().await
}
