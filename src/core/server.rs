//! MCP Server implementation and lifecycle management.
//!
//! `McpServer` owns one tool registry and exposes it two ways:
//! - as an rmcp `ServerHandler` (STDIO transport), through a `ToolRouter`
//!   built from the registry;
//! - as the registry itself, which the HTTP and SSE transports dispatch
//!   through their shared JSON-RPC dispatcher.
//!
//! **Adding a new tool does NOT require modifying this file!**

use rmcp::{
    ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler,
};
use std::sync::Arc;

use super::config::Config;
use super::error::Result as ServerResult;
use super::transport::rpc::ServerIdentity;
use crate::domains::tools::{ToolRegistry, build_tool_router};

/// Instructions reported to clients during initialization.
pub const INSTRUCTIONS: &str =
    "This server exposes Go developer-documentation tools: helloWorld and godoc.";

/// The main MCP server handler.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Tools exposed by this server.
    registry: Arc<ToolRegistry>,

    /// Tool router for handling tool calls over rmcp.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server with every built-in tool.
    pub fn new(config: Config) -> ServerResult<Self> {
        let registry = ToolRegistry::with_builtin_tools(&config.tools)?;
        Ok(Self::with_registry(config, registry))
    }

    /// Create a new MCP server exposing the tools of `registry`.
    pub fn with_registry(config: Config, registry: ToolRegistry) -> Self {
        Self {
            tool_router: build_tool_router::<Self>(&registry),
            config: Arc::new(config),
            registry: Arc::new(registry),
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Get the tool registry.
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Identity reported by the JSON-RPC dispatcher of the network transports.
    pub fn identity(&self) -> ServerIdentity {
        ServerIdentity::new(self.name(), self.version())
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.name().to_string(),
                version: self.version().to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
