//! In-flight request tracking.
//!
//! Counts requests currently inside the router so the drain phase can
//! report how many were cut off by a forced shutdown.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

/// Shared counter of requests being processed.
#[derive(Debug, Clone, Default)]
pub struct InFlightTracker {
    active_count: Arc<AtomicU64>,
}

impl InFlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new request. Returns a guard that decrements on drop.
    pub fn track(&self) -> InFlightGuard {
        self.active_count.fetch_add(1, Ordering::SeqCst);
        InFlightGuard {
            active_count: Arc::clone(&self.active_count),
        }
    }

    pub fn active_count(&self) -> u64 {
        self.active_count.load(Ordering::SeqCst)
    }
}

/// Guard that tracks a request's lifetime.
#[derive(Debug)]
pub struct InFlightGuard {
    active_count: Arc<AtomicU64>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.active_count.fetch_sub(1, Ordering::SeqCst);
    }
}

pub async fn track_in_flight(
    State(tracker): State<InFlightTracker>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let _guard = tracker.track();
    next.run(request).await
}
