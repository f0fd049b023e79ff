//! Hello world tool definition.
//!
//! A tool with no parameters that answers with a fixed greeting.

use rmcp::{
    handler::server::tool::cached_schema_for_type,
    model::{CallToolResult, Content, JsonObject, Tool},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::domains::tools::{ToolError, ToolHandler, parse_arguments};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the hello world tool. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct HelloWorldParams {}

/// Structured result of the hello world tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HelloWorldOutput {
    /// The greeting text.
    pub message: String,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Hello world tool - returns the configured greeting.
pub struct HelloWorldTool {
    greeting: String,
}

impl HelloWorldTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "helloWorld";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "A simple tool that returns 'Hello, World!'.";

    /// Greeting used when no other is configured.
    pub const DEFAULT_GREETING: &'static str = "Hello, World!";

    /// Create the tool with the given greeting.
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            greeting: greeting.into(),
        }
    }

    /// Execute the tool logic.
    #[instrument(skip_all)]
    pub fn execute(&self, _params: &HelloWorldParams) -> CallToolResult {
        info!("Hello world tool called");

        let output = HelloWorldOutput {
            message: self.greeting.clone(),
        };

        let mut result = CallToolResult::success(vec![Content::text(output.message.clone())]);
        result.structured_content = Some(serde_json::json!(output));
        result
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<HelloWorldParams>(),
            annotations: None,
            output_schema: Some(cached_schema_for_type::<HelloWorldOutput>()),
            icons: None,
            meta: None,
            title: None,
        }
    }
}

impl Default for HelloWorldTool {
    fn default() -> Self {
        Self::new(Self::DEFAULT_GREETING)
    }
}

#[async_trait::async_trait]
impl ToolHandler for HelloWorldTool {
    fn descriptor(&self) -> Tool {
        Self::to_tool()
    }

    async fn call(&self, arguments: JsonObject) -> Result<CallToolResult, ToolError> {
        let params: HelloWorldParams = parse_arguments(arguments)?;
        Ok(self.execute(&params))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hello_world_execute() {
        let tool = HelloWorldTool::default();
        let result = tool.execute(&HelloWorldParams {});

        assert!(!result.is_error.unwrap_or(false));
        assert_eq!(
            result.structured_content,
            Some(serde_json::json!({ "message": "Hello, World!" }))
        );

        let text = match &result.content[0].raw {
            rmcp::model::RawContent::Text(text) => &text.text,
            _ => panic!("Expected text content"),
        };
        assert_eq!(text, "Hello, World!");
    }

    #[test]
    fn test_hello_world_custom_greeting() {
        let tool = HelloWorldTool::new("Hello, World! Hi Justin!");
        let result = tool.execute(&HelloWorldParams {});
        assert_eq!(
            result.structured_content,
            Some(serde_json::json!({ "message": "Hello, World! Hi Justin!" }))
        );
    }

    #[tokio::test]
    async fn test_hello_world_is_idempotent() {
        let tool = HelloWorldTool::default();
        let first = tool.call(JsonObject::new()).await.unwrap();
        let second = tool.call(JsonObject::new()).await.unwrap();
        assert_eq!(first.structured_content, second.structured_content);
    }

    #[tokio::test]
    async fn test_hello_world_ignores_extra_fields() {
        let tool = HelloWorldTool::default();
        let mut args = JsonObject::new();
        args.insert("unexpected".into(), serde_json::json!(42));
        let result = tool.call(args).await.unwrap();
        assert!(result.structured_content.is_some());
    }

    #[test]
    fn test_to_tool() {
        let tool = HelloWorldTool::to_tool();
        assert_eq!(tool.name, "helloWorld");
        assert!(tool.output_schema.is_some());
    }
}
