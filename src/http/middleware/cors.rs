//! Cross-origin policy.
//!
//! Built from [`CorsConfig`]. Origins outside the allow-list get no
//! permissive headers; the browser enforces the rest.

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::{AllowedOrigins, CorsConfig};
use crate::http::request::X_REQUEST_ID;

pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = match &config.allowed_origins {
        AllowedOrigins::Any => AllowOrigin::any(),
        AllowedOrigins::List(origins) => AllowOrigin::list(parse_tokens(
            "CORS_ALLOWED_ORIGINS",
            origins,
            |o| HeaderValue::from_str(o).ok(),
        )),
    };

    let methods = parse_tokens("CORS_ALLOWED_METHODS", &config.allowed_methods, |m| {
        Method::from_bytes(m.as_bytes()).ok()
    });
    let headers = parse_tokens("CORS_ALLOWED_HEADERS", &config.allowed_headers, |h| {
        HeaderName::from_bytes(h.as_bytes()).ok()
    });

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
        .expose_headers([X_REQUEST_ID])
}

/// Parse allow-list entries, skipping (and logging) the unusable ones.
fn parse_tokens<T>(var: &str, entries: &[String], parse: impl Fn(&str) -> Option<T>) -> Vec<T> {
    entries
        .iter()
        .filter_map(|entry| {
            let parsed = parse(entry);
            if parsed.is_none() {
                tracing::warn!(var, entry = %entry, "Ignoring invalid CORS allow-list entry");
            }
            parsed
        })
        .collect()
}
