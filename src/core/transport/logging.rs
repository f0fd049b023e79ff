//! Request logging middleware for the network transports.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::Response,
};
use tracing::info;

/// Log method, path and remote address of every request before forwarding it.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    info!(
        "Received {} request for path: {} from {}",
        request.method(),
        request.uri().path(),
        remote
    );

    next.run(request).await
}
