//! Shared utilities for integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use api_server::http::middleware::InFlightTracker;
use api_server::lifecycle::{DrainOutcome, Lifecycle};
use api_server::{ApiResponse, ApiResult, AppConfig, HttpServer, Shutdown};
use axum::extract::Query;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Build a validated config from the mandatory secrets plus `overrides`.
pub fn config(overrides: &[(&str, &str)]) -> Arc<AppConfig> {
    let mut env: HashMap<&str, &str> =
        HashMap::from([("JWT_SECRET", "test-secret"), ("DATABASE_URL", "postgres://test")]);
    env.extend(overrides.iter().copied());
    Arc::new(AppConfig::from_lookup(|key| env.get(key).map(|v| v.to_string())).unwrap())
}

/// Handler that sleeps for `?ms=` milliseconds (default 300) before answering.
async fn slow(Query(params): Query<HashMap<String, u64>>) -> ApiResult<&'static str> {
    let ms = params.get("ms").copied().unwrap_or(300);
    tokio::time::sleep(Duration::from_millis(ms)).await;
    Ok(ApiResponse::ok("done"))
}

async fn boom() -> ApiResult<()> {
    panic!("integration panic");
}

pub fn test_api() -> Router {
    Router::new()
        .route("/slow", get(slow))
        .route("/boom", get(boom))
}

/// A server running on an ephemeral loopback port.
pub struct RunningServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub in_flight: InFlightTracker,
    pub lifecycle: Lifecycle,
    pub handle: JoinHandle<Result<DrainOutcome, std::io::Error>>,
}

impl RunningServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Wait until at least `count` requests are inside the router.
    pub async fn wait_for_in_flight(&self, count: u64) {
        for _ in 0..200 {
            if self.in_flight.active_count() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("requests never arrived");
    }
}

pub async fn start(overrides: &[(&str, &str)]) -> RunningServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::with_api(config(overrides), test_api());
    let shutdown = Shutdown::new();
    let in_flight = server.in_flight();
    let lifecycle = server.lifecycle();

    let server_shutdown = shutdown.clone();
    let handle = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    RunningServer {
        addr,
        shutdown,
        in_flight,
        lifecycle,
        handle,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
}
