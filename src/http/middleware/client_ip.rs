//! Client address resolution.
//!
//! Trusts the first `X-Forwarded-For` entry, then `X-Real-IP`, then falls
//! back to the transport peer address from `ConnectInfo`.

use std::net::{IpAddr, SocketAddr};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_REAL_IP: &str = "x-real-ip";

/// Resolved client address, stored as a request extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub IpAddr);

/// Resolve the client address from proxy headers or the socket peer.
pub fn resolve(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<IpAddr> {
    let forwarded = headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|first| first.trim().parse().ok());

    forwarded
        .or_else(|| {
            headers
                .get(X_REAL_IP)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
        })
        .or_else(|| peer.map(|addr| addr.ip()))
}

pub async fn client_ip_middleware(mut request: Request<Body>, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    if let Some(ip) = resolve(request.headers(), peer) {
        tracing::Span::current().record("client_ip", tracing::field::display(ip));
        request.extensions_mut().insert(ClientIp(ip));
    }

    next.run(request).await
}
