//! Tool handler abstraction.
//!
//! Every tool exposed by the server implements [`ToolHandler`]. The registry
//! stores handlers behind `Arc<dyn ToolHandler>` so the same instance can be
//! shared by the stdio router, the HTTP dispatcher, and every SSE route.

use rmcp::model::{CallToolResult, JsonObject, Tool};
use serde::de::DeserializeOwned;

use super::ToolError;

/// Trait implemented by every tool.
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync {
    /// Descriptor (name, description, input and output schema) of this tool.
    fn descriptor(&self) -> Tool;

    /// Execute the tool with the given arguments.
    ///
    /// Only malformed arguments are reported as `Err`. Failures of the
    /// underlying work are encoded in the returned result.
    async fn call(&self, arguments: JsonObject) -> Result<CallToolResult, ToolError>;
}

/// Deserialize a JSON argument object into a typed parameter struct.
pub fn parse_arguments<T: DeserializeOwned>(arguments: JsonObject) -> Result<T, ToolError> {
    serde_json::from_value(serde_json::Value::Object(arguments))
        .map_err(|e| ToolError::invalid_arguments(e.to_string()))
}
