//! TCP listener binding.
//!
//! # Responsibilities
//! - Bind to the configured host and port
//! - Report bind failures with the address that was attempted

use tokio::net::TcpListener;

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Bind to the configured address.
pub async fn bind(config: &ListenerConfig) -> Result<TcpListener, ListenerError> {
    let address = config.bind_address();

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| ListenerError::Bind {
            address: address.clone(),
            source,
        })?;

    let local_addr = listener.local_addr().map_err(|source| ListenerError::Bind {
        address: address.clone(),
        source,
    })?;

    tracing::info!(address = %local_addr, "Listener bound");

    Ok(listener)
}
