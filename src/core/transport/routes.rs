//! Route table of the SSE transport.
//!
//! Maps a URL path to the server instance that owns it. Every tool gets its
//! own path (`/<tool name>`) and its own single-tool registry, so a client
//! connected to `/helloWorld` can never reach `godoc`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domains::tools::{ToolError, ToolRegistry};

/// Static mapping from URL path to a server instance.
#[derive(Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, Arc<ToolRegistry>>,
}

impl RouteTable {
    /// Create an empty route table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table with one single-tool instance per tool, at `/<tool name>`.
    pub fn per_tool(registry: &ToolRegistry) -> Result<Self, ToolError> {
        let mut table = Self::new();
        for name in registry.tool_names() {
            table.insert(format!("/{name}"), registry.single(name)?);
        }
        Ok(table)
    }

    /// Map `path` to `registry`, replacing any previous mapping.
    pub fn insert(&mut self, path: impl Into<String>, registry: ToolRegistry) {
        self.routes.insert(path.into(), Arc::new(registry));
    }

    /// Resolve a request path by exact match.
    pub fn resolve(&self, path: &str) -> Option<Arc<ToolRegistry>> {
        self.routes.get(path).cloned()
    }

    /// All mapped paths, sorted.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<_> = self.routes.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }
}
