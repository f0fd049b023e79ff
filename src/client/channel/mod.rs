//! JSON-RPC channels between a client session and an MCP server.
//!
//! - [`ChildProcessChannel`]: launches the server and speaks newline-delimited
//!   JSON over its stdin/stdout.
//! - [`HttpChannel`]: POSTs each message to a streamable HTTP endpoint.

mod http;
mod process;

pub use http::HttpChannel;
pub use process::ChildProcessChannel;

use async_trait::async_trait;

use super::ClientResult;
use crate::core::transport::rpc::{JsonRpcRequest, JsonRpcResponse};

/// A bidirectional JSON-RPC link to one server.
#[async_trait]
pub trait RpcChannel: Send {
    /// Send a request and wait for the response carrying the same id.
    async fn request(&mut self, request: JsonRpcRequest) -> ClientResult<JsonRpcResponse>;

    /// Send a notification.
    async fn notify(&mut self, notification: JsonRpcRequest) -> ClientResult<()>;

    /// Release the link. Called once, after the last message.
    async fn close(&mut self) -> ClientResult<()>;
}

/// Decode `value` as the response to `id`.
///
/// Returns `None` for anything else the server sends on the link:
/// server-initiated requests, notifications, or responses to other ids.
pub(crate) fn match_response(
    value: serde_json::Value,
    id: &Option<serde_json::Value>,
) -> Option<JsonRpcResponse> {
    if value.get("method").is_some() {
        return None;
    }
    if value.get("id") != id.as_ref() {
        return None;
    }
    serde_json::from_value(value).ok()
}
