//! Startup orchestration and the process state machine.
//!
//! ```text
//! Initializing → Listening → Draining → Stopped
//!       │            │
//!       └────────────┴──→ Failed
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Configuration and logging errors go to stderr, since no subscriber
//!   exists yet
//! - A forced drain is logged but still exits successfully

use std::process::ExitCode;
use std::sync::Arc;

use tokio::sync::watch;

use crate::config::{AppConfig, ConfigError};
use crate::http::HttpServer;
use crate::lifecycle::{signals, DrainOutcome, Shutdown};
use crate::net::{self, ListenerError};
use crate::observability::logging::{self, LoggingError};

/// Process phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Listening,
    Draining,
    Stopped,
    Failed,
}

impl Phase {
    /// Whether `self → next` is a legal transition.
    pub fn can_transition_to(self, next: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, next),
            (Initializing, Listening)
                | (Initializing, Failed)
                | (Listening, Draining)
                | (Listening, Stopped)
                | (Listening, Failed)
                | (Draining, Stopped)
                | (Draining, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Stopped | Phase::Failed)
    }
}

/// Observable process phase.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    tx: Arc<watch::Sender<Phase>>,
}

impl Lifecycle {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Phase::Initializing);
        Self { tx: Arc::new(tx) }
    }

    pub fn phase(&self) -> Phase {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.tx.subscribe()
    }

    /// Move to `next`. Illegal transitions are logged and ignored.
    pub fn advance(&self, next: Phase) -> bool {
        self.tx.send_if_modified(|current| {
            if current.can_transition_to(next) {
                tracing::info!(from = ?*current, to = ?next, "Lifecycle transition");
                *current = next;
                true
            } else {
                tracing::warn!(
                    from = ?*current,
                    to = ?next,
                    "Ignoring illegal lifecycle transition"
                );
                false
            }
        })
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Fatal startup or serving failure.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to set up logging: {0}")]
    Logging(#[from] LoggingError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Bind the configured port and serve until `shutdown` fires and the
/// drain phase ends.
pub async fn serve(
    config: Arc<AppConfig>,
    shutdown: Shutdown,
) -> Result<DrainOutcome, StartupError> {
    serve_with(HttpServer::new(config), shutdown).await
}

/// [`serve`] for a server built by the caller.
pub async fn serve_with(
    server: HttpServer,
    shutdown: Shutdown,
) -> Result<DrainOutcome, StartupError> {
    let listener = match net::bind(&server.config().listener).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, "Failed to bind listener");
            server.lifecycle().advance(Phase::Failed);
            return Err(e.into());
        }
    };

    Ok(server.run(listener, shutdown).await?)
}

/// Load configuration and install logging.
fn initialize() -> Result<Arc<AppConfig>, StartupError> {
    let _ = dotenvy::dotenv();
    let config = AppConfig::from_env()?;
    logging::init(&config)?;
    Ok(Arc::new(config))
}

/// Run the service from process start to exit.
pub async fn run() -> ExitCode {
    let config = match initialize() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("fatal: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        port = config.listener.port,
        request_timeout_ms = config.timeouts.request.as_millis() as u64,
        shutdown_grace_ms = config.timeouts.shutdown_grace.as_millis() as u64,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    tokio::spawn(signals::forward_signals(shutdown.clone()));

    match serve(config, shutdown).await {
        Ok(DrainOutcome::Completed) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Ok(DrainOutcome::Forced { in_flight }) => {
            tracing::warn!(in_flight, "Shutdown complete, abandoned in-flight requests");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}
