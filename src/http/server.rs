//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware in pipeline order
//! - Bind server to listener
//! - Stop accepting on shutdown and drain in-flight requests within the
//!   grace period

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::task::JoinError;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::http::middleware::{
    catch_panic_layer, client_ip_middleware, cors_layer, deadline_middleware, track_in_flight,
    InFlightTracker, RequestDeadline,
};
use crate::http::request::{make_request_span, propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::{DrainOutcome, Lifecycle, Phase, Shutdown};
use crate::routing;

/// HTTP server for the API.
pub struct HttpServer {
    router: Router,
    config: Arc<AppConfig>,
    in_flight: InFlightTracker,
    lifecycle: Lifecycle,
}

impl HttpServer {
    /// Create a server serving the built-in v1 API.
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self::with_api(config, routing::api_v1())
    }

    /// Create a server with `api` mounted under the v1 prefix.
    pub fn with_api(config: Arc<AppConfig>, api: Router) -> Self {
        let in_flight = InFlightTracker::new();
        let router = Self::build_router(&config, api, in_flight.clone());
        Self {
            router,
            config,
            in_flight,
            lifecycle: Lifecycle::new(),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &AppConfig, api: Router, in_flight: InFlightTracker) -> Router {
        routing::routes(api).layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                .layer(propagate_request_id_layer())
                .layer(middleware::from_fn(client_ip_middleware))
                .layer(cors_layer(&config.cors))
                .layer(catch_panic_layer())
                .layer(middleware::from_fn_with_state(
                    RequestDeadline(config.timeouts.request),
                    deadline_middleware,
                ))
                .layer(middleware::from_fn_with_state(in_flight, track_in_flight)),
        )
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn in_flight(&self) -> InFlightTracker {
        self.in_flight.clone()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Phase tracker for this server's process lifecycle.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle.clone()
    }

    /// Serve until `shutdown` fires, then drain.
    ///
    /// Returns once every connection has finished or the grace period has
    /// elapsed, whichever comes first.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: Shutdown,
    ) -> Result<DrainOutcome, std::io::Error> {
        let addr = listener.local_addr()?;
        self.lifecycle.advance(Phase::Listening);
        tracing::info!(address = %addr, "HTTP server starting");

        let grace = self.config.timeouts.shutdown_grace;
        let app = self
            .router
            .clone()
            .into_make_service_with_connect_info::<SocketAddr>();

        let serve =
            axum::serve(listener, app).with_graceful_shutdown(shutdown.clone().wait_owned());
        let mut server = tokio::spawn(serve.into_future());

        tokio::select! {
            result = &mut server => {
                return self.finish(flatten(result), DrainOutcome::Completed);
            }
            _ = shutdown.wait() => {}
        }

        self.lifecycle.advance(Phase::Draining);
        tracing::info!(
            grace_ms = grace.as_millis() as u64,
            in_flight = self.in_flight.active_count(),
            "Draining in-flight requests"
        );

        match tokio::time::timeout(grace, &mut server).await {
            Ok(result) => self.finish(flatten(result), DrainOutcome::Completed),
            Err(_) => {
                let in_flight = self.in_flight.active_count();
                server.abort();
                tracing::warn!(in_flight, "Grace period elapsed, forcing shutdown");
                self.finish(Ok(()), DrainOutcome::Forced { in_flight })
            }
        }
    }

    fn finish(
        &self,
        result: Result<(), std::io::Error>,
        outcome: DrainOutcome,
    ) -> Result<DrainOutcome, std::io::Error> {
        match result {
            Ok(()) => {
                self.lifecycle.advance(Phase::Stopped);
                tracing::info!("HTTP server stopped");
                Ok(outcome)
            }
            Err(e) => {
                self.lifecycle.advance(Phase::Failed);
                tracing::error!(error = %e, "HTTP server failed");
                Err(e)
            }
        }
    }
}

fn flatten(result: Result<Result<(), std::io::Error>, JoinError>) -> Result<(), std::io::Error> {
    result.map_err(std::io::Error::other)?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AllowedOrigins, ConfigError};
    use crate::http::error::AppError;
    use crate::http::middleware::ClientIp;
    use crate::http::request::X_REQUEST_ID;
    use crate::http::response::{ApiResponse, ApiResult};
    use axum::body::Body;
    use axum::extract::rejection::JsonRejection;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::response::Response;
    use axum::routing::get;
    use axum::{Extension, Json};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::time::Duration;
    use tower::ServiceExt;

    fn config(overrides: &[(&str, &str)]) -> Result<Arc<AppConfig>, ConfigError> {
        let mut env: HashMap<&str, &str> =
            HashMap::from([("JWT_SECRET", "jwt"), ("DATABASE_URL", "postgres://db")]);
        env.extend(overrides.iter().copied());
        AppConfig::from_lookup(|key| env.get(key).map(|v| v.to_string())).map(Arc::new)
    }

    async fn echo(payload: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
        let Json(payload) = payload?;
        Ok(ApiResponse::created(payload))
    }

    async fn boom() -> ApiResult<()> {
        panic!("handler exploded");
    }

    async fn slow() -> ApiResult<&'static str> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(ApiResponse::ok("late"))
    }

    async fn forbidden() -> ApiResult<()> {
        Err(AppError::forbidden("Not allowed"))
    }

    async fn whoami(client: Option<Extension<ClientIp>>) -> ApiResult<Option<String>> {
        Ok(ApiResponse::ok(client.map(|Extension(ClientIp(ip))| ip.to_string())))
    }

    fn test_api() -> Router {
        Router::new()
            .route("/echo", axum::routing::post(echo))
            .route("/boom", get(boom))
            .route("/slow", get(slow))
            .route("/forbidden", get(forbidden))
            .route("/whoami", get(whoami))
    }

    fn server(overrides: &[(&str, &str)]) -> Router {
        HttpServer::with_api(config(overrides).unwrap(), test_api()).router()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_is_always_ok() {
        let response = server(&[]).oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(body_json(response).await, json!({"success": true, "data": {"status": "ok"}}));
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let response = server(&[]).oneshot(get_request("/health")).await.unwrap();
        let id = response
            .headers()
            .get(X_REQUEST_ID)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn incoming_request_id_is_propagated() {
        let request = Request::builder()
            .uri("/health")
            .header(X_REQUEST_ID, "trace-abc-123")
            .body(Body::empty())
            .unwrap();
        let response = server(&[]).oneshot(request).await.unwrap();
        assert_eq!(response.headers().get(X_REQUEST_ID).unwrap(), "trace-abc-123");
    }

    #[tokio::test]
    async fn unknown_paths_are_not_found() {
        for uri in ["/api/v1/users", "/api/v1", "/nope", "/api/v2/users"] {
            let response = server(&[]).oneshot(get_request(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
            assert!(response.headers().contains_key(X_REQUEST_ID));
            let body = body_json(response).await;
            assert_eq!(body["success"], false);
            assert_eq!(body["error"]["code"], "NOT_FOUND");
        }
    }

    #[tokio::test]
    async fn built_in_api_has_no_routes_yet() {
        let router = HttpServer::new(config(&[]).unwrap()).router();
        let response = router
            .oneshot(get_request("/api/v1/anything"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn handler_errors_use_envelope() {
        let response = server(&[])
            .oneshot(get_request("/api/v1/forbidden"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_json(response).await,
            json!({"success": false, "error": {"code": "FORBIDDEN", "message": "Not allowed"}})
        );
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/echo")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = server(&[]).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn valid_json_is_created() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/echo")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name":"widget"}"#))
            .unwrap();
        let response = server(&[]).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await, json!({"success": true, "data": {"name": "widget"}}));
    }

    #[tokio::test]
    async fn panics_become_internal_errors() {
        let router = server(&[]);
        let response = router
            .clone()
            .oneshot(get_request("/api/v1/boom"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert!(!body.to_string().contains("exploded"));

        let response = router.oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn slow_requests_time_out() {
        let router = server(&[("REQUEST_TIMEOUT_MS", "100")]);
        let response = router
            .clone()
            .oneshot(get_request("/api/v1/slow"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "TIMEOUT");

        let response = router.oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn cors_allows_listed_origin() {
        let router = server(&[("CORS_ALLOWED_ORIGINS", "https://app.example")]);
        let request = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "https://app.example")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://app.example"
        );
    }

    #[tokio::test]
    async fn cors_ignores_unlisted_origin() {
        let router = server(&[("CORS_ALLOWED_ORIGINS", "https://app.example")]);
        let request = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "https://evil.example")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn cors_preflight_lists_methods() {
        let router = server(&[
            ("CORS_ALLOWED_ORIGINS", "https://app.example"),
            ("CORS_ALLOWED_METHODS", "GET,POST"),
        ]);
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/v1/echo")
            .header(header::ORIGIN, "https://app.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert!(response.status().is_success());
        let methods = response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(methods.contains("GET") && methods.contains("POST"));
    }

    fn cross_origin_get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::ORIGIN, "https://app.example")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn error_envelopes_carry_cors_headers() {
        let router = server(&[
            ("CORS_ALLOWED_ORIGINS", "https://app.example"),
            ("REQUEST_TIMEOUT_MS", "100"),
        ]);

        let response = router
            .clone()
            .oneshot(cross_origin_get("/api/v1/slow"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://app.example"
        );

        let response = router
            .clone()
            .oneshot(cross_origin_get("/api/v1/boom"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://app.example"
        );

        let response = router
            .oneshot(cross_origin_get("/api/v1/missing"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://app.example"
        );
    }

    #[tokio::test]
    async fn wildcard_origin_is_default() {
        let config = config(&[]).unwrap();
        assert_eq!(config.cors.allowed_origins, AllowedOrigins::Any);
        let request = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "https://anywhere.example")
            .body(Body::empty())
            .unwrap();
        let response = HttpServer::with_api(config, test_api())
            .router()
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
    }

    #[tokio::test]
    async fn handlers_see_forwarded_client_address() {
        let request = Request::builder()
            .uri("/api/v1/whoami")
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        let response = server(&[]).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"], "203.0.113.7");
    }

    #[tokio::test]
    async fn missing_client_address_is_not_an_error() {
        let response = server(&[])
            .oneshot(get_request("/api/v1/whoami"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_json(response).await["data"].is_null());
    }

    #[tokio::test]
    async fn in_flight_returns_to_zero() {
        let server = HttpServer::with_api(config(&[]).unwrap(), test_api());
        let tracker = server.in_flight();
        let response = server
            .router()
            .oneshot(get_request("/health"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(tracker.active_count(), 0);
    }
}
