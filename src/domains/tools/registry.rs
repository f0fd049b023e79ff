//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - A registry of the tools a server instance exposes
//! - Dispatch of tool calls by exact name
//! - Tool metadata for listing
//!
//! A registry is built once at startup and never mutated afterwards, so it is
//! shared between connections behind an `Arc` without locking.

use std::collections::BTreeMap;
use std::sync::Arc;

use rmcp::model::{CallToolResult, JsonObject, Tool};
use tracing::{debug, warn};

use super::definitions::{DocCommand, GodocTool, HelloWorldTool};
use super::{ToolError, ToolHandler};
use crate::core::config::ToolsConfig;

/// A registered tool: its descriptor and the handler serving it.
#[derive(Clone)]
struct RegisteredTool {
    descriptor: Tool,
    handler: Arc<dyn ToolHandler>,
}

// ============================================================================
// Tool Registry
// ============================================================================

/// Tool registry - the tool set of one server instance.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, RegisteredTool>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in tool, configured from `config`.
    pub fn with_builtin_tools(config: &ToolsConfig) -> Result<Self, ToolError> {
        let mut registry = Self::new();
        registry.register(HelloWorldTool::new(config.greeting.clone()))?;
        registry.register(GodocTool::new(DocCommand::from_config(&config.doc)))?;
        Ok(registry)
    }

    /// Register a tool handler.
    ///
    /// Fails if a tool with the same name is already registered.
    pub fn register<H>(&mut self, handler: H) -> Result<(), ToolError>
    where
        H: ToolHandler + 'static,
    {
        self.register_shared(Arc::new(handler))
    }

    /// Register an already shared tool handler.
    pub fn register_shared(&mut self, handler: Arc<dyn ToolHandler>) -> Result<(), ToolError> {
        let descriptor = handler.descriptor();
        let name = descriptor.name.to_string();

        if self.tools.contains_key(&name) {
            return Err(ToolError::already_registered(name));
        }

        debug!("Registered tool: {}", name);
        self.tools
            .insert(name, RegisteredTool { descriptor, handler });
        Ok(())
    }

    /// Derive a registry that holds only the tool called `name`.
    pub fn single(&self, name: &str) -> Result<Self, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::not_found(name))?;

        let mut registry = Self::new();
        registry.register_shared(tool.handler.clone())?;
        Ok(registry)
    }

    /// Get all tool names, in name order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Get all tool descriptors, in name order.
    pub fn tools(&self) -> Vec<Tool> {
        self.tools.values().map(|t| t.descriptor.clone()).collect()
    }

    /// Iterate over the registered handlers.
    pub fn handlers(&self) -> impl Iterator<Item = &Arc<dyn ToolHandler>> {
        self.tools.values().map(|t| &t.handler)
    }

    /// Whether a tool called `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry holds no tools.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Dispatch a tool call to the handler registered under `name`.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: JsonObject,
    ) -> Result<CallToolResult, ToolError> {
        match self.tools.get(name) {
            Some(tool) => tool.handler.call(arguments).await,
            None => {
                warn!("Unknown tool requested: {}", name);
                Err(ToolError::not_found(name))
            }
        }
    }
}
