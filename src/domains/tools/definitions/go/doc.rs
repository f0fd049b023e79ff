//! Go documentation tool definition.
//!
//! Wraps `go doc <package> [<symbol>]`. A failing command is reported inside
//! the structured result (`error` field), never as an RPC error.

use rmcp::{
    handler::server::tool::cached_schema_for_type,
    model::{CallToolResult, Content, JsonObject, Tool},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::command::DocCommand;
use crate::domains::tools::{ToolError, ToolHandler, parse_arguments};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the godoc tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GodocParams {
    /// The Go package to document (e.g. "fmt").
    pub package: String,

    /// The symbol within the package to document (optional).
    #[serde(default)]
    pub symbol: Option<String>,
}

/// Structured result of the godoc tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GodocOutput {
    /// Combined stdout and stderr of the documentation command.
    pub output: String,

    /// Why the command failed, absent on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Godoc tool - runs the documentation command for a package or symbol.
pub struct GodocTool {
    command: DocCommand,
}

impl GodocTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "godoc";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Invokes the 'go doc' command to retrieve documentation for a Go package or symbol.";

    /// Create the tool around a documentation command runner.
    pub fn new(command: DocCommand) -> Self {
        Self { command }
    }

    /// Arguments passed to the documentation command for `params`.
    pub fn command_args(params: &GodocParams) -> Vec<String> {
        let mut args = vec!["doc".to_string(), params.package.clone()];
        if let Some(symbol) = params.symbol.as_deref().filter(|s| !s.is_empty()) {
            args.push(symbol.to_string());
        }
        args
    }

    /// Execute the tool logic.
    #[instrument(skip_all, fields(package = %params.package))]
    pub async fn execute(&self, params: &GodocParams) -> CallToolResult {
        info!("Godoc tool called for package: {}", params.package);

        let run = self.command.run(&Self::command_args(params)).await;

        match run.failure {
            None => {
                let mut result = CallToolResult::success(vec![Content::text(run.output.clone())]);
                result.structured_content = Some(serde_json::json!(GodocOutput {
                    output: run.output,
                    error: None,
                }));
                result
            }
            Some(failure) => {
                warn!(
                    "{} doc failed for {}: {}",
                    self.command.program(),
                    params.package,
                    failure
                );
                let mut result = CallToolResult::success(Vec::new());
                result.structured_content = Some(serde_json::json!(GodocOutput {
                    output: run.output,
                    error: Some(failure.to_string()),
                }));
                result
            }
        }
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<GodocParams>(),
            annotations: None,
            output_schema: Some(cached_schema_for_type::<GodocOutput>()),
            icons: None,
            meta: None,
            title: None,
        }
    }
}

#[async_trait::async_trait]
impl ToolHandler for GodocTool {
    fn descriptor(&self) -> Tool {
        Self::to_tool()
    }

    async fn call(&self, arguments: JsonObject) -> Result<CallToolResult, ToolError> {
        let params: GodocParams = parse_arguments(arguments)?;
        Ok(self.execute(&params).await)
    }
}

// ============================================================================
// Tests
// ============================================================================
