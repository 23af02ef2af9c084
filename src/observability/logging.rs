//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber exactly once at startup
//! - Pick the output format for the deployment environment
//! - Resolve the log filter from config, `RUST_LOG`, or defaults
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format outside development, readable format in development
//! - Request context comes from the per-request span, not from globals

use tracing_subscriber::{
    filter::ParseError, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError,
    EnvFilter,
};

use crate::config::{AppConfig, Environment};

/// Error type for logging setup.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter '{filter}': {source}")]
    Filter {
        filter: String,
        #[source]
        source: ParseError,
    },

    #[error("failed to install log subscriber: {0}")]
    Install(#[from] TryInitError),
}

/// Filter used when neither `LOG_LEVEL` nor `RUST_LOG` is set.
pub fn default_filter(environment: Environment) -> &'static str {
    if environment.is_development() {
        "api_server=debug,tower_http=debug,info"
    } else {
        "api_server=info,tower_http=info,warn"
    }
}

/// Resolve the filter: `LOG_LEVEL`, then `RUST_LOG`, then the default.
pub fn build_filter(config: &AppConfig) -> Result<EnvFilter, LoggingError> {
    let parse = |filter: &str| {
        EnvFilter::try_new(filter).map_err(|source| LoggingError::Filter {
            filter: filter.to_string(),
            source,
        })
    };

    match config.observability.log_level.as_deref() {
        Some(level) => parse(level),
        None => match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => parse(default_filter(config.environment)),
        },
    }
}

/// Install the global subscriber.
pub fn init(config: &AppConfig) -> Result<(), LoggingError> {
    let filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    if config.environment.is_development() {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .flatten_event(true),
            )
            .try_init()?;
    }

    Ok(())
}
