//! Transport layer for the MCP server.
//!
//! This module provides different transport implementations:
//! - **STDIO**: Standard input/output (default for MCP) - feature: `stdio`
//! - **HTTP**: Streamable HTTP, JSON-RPC over POST on any path - feature: `http`
//! - **SSE**: One event stream per tool path - feature: `sse`
//!
//! STDIO is served by rmcp. HTTP and SSE answer JSON-RPC through the shared
//! [`rpc::RpcDispatcher`], so the three transports expose the same tools
//! with the same results.
//!
//! # Feature Flags
//!
//! Transport implementations are conditionally compiled based on features:
//! - `stdio`: STDIO transport - minimal dependencies
//! - `http`: HTTP transport - adds axum, tower-http
//! - `sse`: SSE transport - adds axum

mod config;
mod error;
pub mod routes;
pub mod rpc;
mod service;

#[cfg(any(feature = "http", feature = "sse"))]
mod logging;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "sse")]
pub mod sse;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use routes::RouteTable;
pub use service::TransportService;

// Re-export configs for convenience
#[cfg(feature = "http")]
pub use config::HttpConfig;

#[cfg(feature = "sse")]
pub use config::SseConfig;

#[cfg(any(feature = "http", feature = "sse"))]
pub use config::DEFAULT_PORT;
