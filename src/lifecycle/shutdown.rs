//! Shutdown coordination.

use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

/// Coordinator for graceful shutdown.
///
/// Clones share one cancellation token: the signal watcher triggers it,
/// the accept loop and the drain timer observe it.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    token: CancellationToken,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger the shutdown signal. Idempotent.
    pub fn trigger(&self) {
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait until shutdown is triggered.
    pub async fn wait(&self) {
        self.token.cancelled().await
    }

    /// Owned variant of [`Shutdown::wait`] for `'static` contexts.
    pub fn wait_owned(self) -> WaitForCancellationFutureOwned {
        self.token.cancelled_owned()
    }
}

/// How the drain phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Every in-flight request finished within the grace period.
    Completed,
    /// The grace period elapsed with requests still running.
    Forced { in_flight: u64 },
}
