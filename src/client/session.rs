//! MCP client session on top of an [`RpcChannel`].

use rmcp::model::{JsonObject, Tool};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

use super::channel::{ChildProcessChannel, HttpChannel, RpcChannel};
use super::render::render_outcome;
use super::{ClientError, ClientResult};
use crate::core::transport::rpc::JsonRpcRequest;

/// Protocol version offered in `initialize`.
pub const CLIENT_PROTOCOL_VERSION: &str = "2025-03-26";

/// Name and version a client announces to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub name: String,
    pub version: String,
}

impl ClientIdentity {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Where the server lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerTarget {
    /// Launch this executable and talk over its stdio.
    Command { program: PathBuf, args: Vec<String> },
    /// POST to this streamable HTTP endpoint.
    Http { endpoint: String },
}

impl ServerTarget {
    pub fn command(program: impl Into<PathBuf>) -> Self {
        Self::Command {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn http(endpoint: impl Into<String>) -> Self {
        Self::Http {
            endpoint: endpoint.into(),
        }
    }

    /// Open a channel to the server.
    pub fn open(&self) -> ClientResult<Box<dyn RpcChannel>> {
        match self {
            Self::Command { program, args } => {
                Ok(Box::new(ChildProcessChannel::spawn(program, args)?))
            }
            Self::Http { endpoint } => Ok(Box::new(HttpChannel::new(endpoint.clone())?)),
        }
    }
}

/// Result of a `tools/call`.
///
/// A result lacking every field decodes as an empty success.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallOutcome {
    #[serde(default)]
    pub content: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl ToolCallOutcome {
    /// Whether the server flagged the call as failed.
    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }
}

/// An initialized MCP session.
pub struct ClientSession {
    channel: Box<dyn RpcChannel>,
    next_id: u64,
    server_info: Value,
}

impl ClientSession {
    /// Run the `initialize` handshake over `channel`.
    pub async fn connect(
        channel: Box<dyn RpcChannel>,
        client: &ClientIdentity,
    ) -> ClientResult<Self> {
        let mut session = Self {
            channel,
            next_id: 1,
            server_info: Value::Null,
        };

        let result = session
            .request(
                "initialize",
                json!({
                    "protocolVersion": CLIENT_PROTOCOL_VERSION,
                    "capabilities": {},
                    "clientInfo": { "name": client.name, "version": client.version },
                }),
            )
            .await?;
        session.server_info = result.get("serverInfo").cloned().unwrap_or_default();

        session
            .channel
            .notify(JsonRpcRequest::notification("notifications/initialized", None))
            .await?;

        let protocol_version = result
            .get("protocolVersion")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        info!(
            "Connected to {} (protocol {})",
            session.server_name().unwrap_or("unknown server"),
            protocol_version
        );

        Ok(session)
    }

    /// Name the server reported in `initialize`.
    pub fn server_name(&self) -> Option<&str> {
        self.server_info.get("name").and_then(Value::as_str)
    }

    async fn request(&mut self, method: &str, params: Value) -> ClientResult<Value> {
        let id = self.next_id;
        self.next_id += 1;

        let response = self
            .channel
            .request(JsonRpcRequest::new(id, method, Some(params)))
            .await?;

        if let Some(error) = response.error {
            return Err(ClientError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        response
            .result
            .ok_or_else(|| ClientError::protocol(format!("{method} response has no result")))
    }

    /// List the tools the server offers.
    pub async fn list_tools(&mut self) -> ClientResult<Vec<Tool>> {
        let result = self.request("tools/list", json!({})).await?;
        let tools = result.get("tools").cloned().unwrap_or_else(|| json!([]));
        Ok(serde_json::from_value(tools)?)
    }

    /// Call tool `name` with `arguments`.
    pub async fn call_tool(
        &mut self,
        name: &str,
        arguments: JsonObject,
    ) -> ClientResult<ToolCallOutcome> {
        let result = self
            .request(
                "tools/call",
                json!({ "name": name, "arguments": arguments }),
            )
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    /// End the session and release the channel.
    pub async fn close(mut self) -> ClientResult<()> {
        self.channel.close().await
    }
}

/// Connect to `target`, call one tool, print its result to `out`.
///
/// The session is closed whether or not the call succeeds.
pub async fn execute_tool<W: Write>(
    target: &ServerTarget,
    client: &ClientIdentity,
    tool: &str,
    arguments: JsonObject,
    out: &mut W,
) -> ClientResult<()> {
    let channel = target.open().map_err(ClientError::connect)?;
    let mut session = ClientSession::connect(channel, client)
        .await
        .map_err(ClientError::connect)?;

    let outcome = session.call_tool(tool, arguments).await;

    if let Err(e) = session.close().await {
        warn!("Failed to close session: {}", e);
    }

    let outcome = outcome.map_err(ClientError::call)?;
    render_outcome(&outcome, out)?;
    Ok(())
}
