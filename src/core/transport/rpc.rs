//! JSON-RPC message types and the dispatcher shared by the HTTP and SSE
//! transports.
//!
//! The STDIO transport is served by rmcp directly; the network transports
//! carry the same MCP messages and answer them through [`RpcDispatcher`],
//! which forwards tool calls to a [`ToolRegistry`].

use rmcp::model::JsonObject;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::core::server::INSTRUCTIONS;
use crate::domains::tools::ToolRegistry;

/// Protocol versions this server can speak, newest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

/// Protocol version offered when the client asks for an unknown one.
pub const LATEST_PROTOCOL_VERSION: &str = "2025-06-18";

/// JSON-RPC request structure. A request without `id` is a notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

/// JSON-RPC response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcRequest {
    /// Create a request expecting a response.
    pub fn new(
        id: impl Into<serde_json::Value>,
        method: impl Into<String>,
        params: Option<serde_json::Value>,
    ) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id.into()),
            method: method.into(),
            params,
        }
    }

    /// Create a notification (no response expected).
    pub fn notification(method: impl Into<String>, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: None,
            method: method.into(),
            params,
        }
    }

    /// Whether this message is a notification.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<serde_json::Value>, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<serde_json::Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Method not found error.
    pub fn method_not_found(id: Option<serde_json::Value>) -> Self {
        Self::error(id, -32601, "Method not found")
    }

    /// Invalid request error.
    pub fn invalid_request(id: Option<serde_json::Value>) -> Self {
        Self::error(id, -32600, "Invalid Request")
    }

    /// Invalid params error.
    pub fn invalid_params(id: Option<serde_json::Value>, msg: impl Into<String>) -> Self {
        Self::error(id, -32602, msg)
    }

    /// Internal error.
    pub fn internal_error(id: Option<serde_json::Value>, msg: impl Into<String>) -> Self {
        Self::error(id, -32603, msg)
    }
}

/// Name and version a server instance reports during `initialize`.
#[derive(Debug, Clone)]
pub struct ServerIdentity {
    pub name: String,
    pub version: String,
    pub instructions: Option<String>,
}

impl ServerIdentity {
    /// Create an identity with the default instructions.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }
}

/// Parameters of a `tools/call` request.
#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Option<JsonObject>,
}

/// Answers JSON-RPC messages for one server instance.
#[derive(Clone)]
pub struct RpcDispatcher {
    registry: Arc<ToolRegistry>,
    identity: ServerIdentity,
}

impl RpcDispatcher {
    /// Create a dispatcher over `registry`.
    pub fn new(registry: Arc<ToolRegistry>, identity: ServerIdentity) -> Self {
        Self { registry, identity }
    }

    /// The registry this dispatcher forwards tool calls to.
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// The identity reported to clients.
    pub fn identity(&self) -> &ServerIdentity {
        &self.identity
    }

    /// Handle one message. Returns `None` for notifications.
    #[instrument(skip_all, fields(method = %request.method, server = %self.identity.name))]
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            self.handle_notification(&request);
            return None;
        }

        // Validate JSON-RPC version
        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::invalid_request(request.id));
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "ping" => JsonRpcResponse::success(request.id, serde_json::json!({})),
            "tools/list" => self.handle_tools_list(request),
            "tools/call" => self.handle_tools_call(request).await,
            _ => {
                warn!("Unknown method: {}", request.method);
                JsonRpcResponse::method_not_found(request.id)
            }
        };

        Some(response)
    }

    /// Handle initialize request.
    fn handle_initialize(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let requested = request
            .params
            .as_ref()
            .and_then(|p| p.get("protocolVersion"))
            .and_then(|v| v.as_str());
        let protocol_version = negotiate_protocol_version(requested);

        info!(
            "Processing initialize request (protocol {})",
            protocol_version
        );

        let mut result = serde_json::json!({
            "protocolVersion": protocol_version,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": self.identity.name,
                "version": self.identity.version
            }
        });
        if let Some(instructions) = &self.identity.instructions {
            result["instructions"] = serde_json::json!(instructions);
        }

        JsonRpcResponse::success(request.id, result)
    }

    /// Handle tools/list request.
    fn handle_tools_list(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!("Processing tools/list request");

        match serde_json::to_value(self.registry.tools()) {
            Ok(tools) => {
                JsonRpcResponse::success(request.id, serde_json::json!({ "tools": tools }))
            }
            Err(e) => JsonRpcResponse::internal_error(request.id, e.to_string()),
        }
    }

    /// Handle tools/call request.
    async fn handle_tools_call(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let params = match request.params {
            Some(p) => p,
            None => return JsonRpcResponse::invalid_params(request.id, "Missing params"),
        };

        let params: CallToolParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return JsonRpcResponse::invalid_params(request.id, e.to_string()),
        };

        info!("Processing tools/call request for {}", params.name);

        let arguments = params.arguments.unwrap_or_default();
        match self.registry.dispatch(&params.name, arguments).await {
            Ok(result) => match serde_json::to_value(&result) {
                Ok(value) => JsonRpcResponse::success(request.id, value),
                Err(e) => JsonRpcResponse::internal_error(request.id, e.to_string()),
            },
            Err(e) => JsonRpcResponse::error(request.id, e.rpc_code(), e.to_string()),
        }
    }

    /// Handle notifications (no response needed).
    fn handle_notification(&self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "notifications/initialized" => info!("Client sent initialized notification"),
            _ => debug!("Received notification: {}", request.method),
        }
    }
}

/// Pick the protocol version to answer `initialize` with.
pub fn negotiate_protocol_version(requested: Option<&str>) -> &'static str {
    requested
        .and_then(|v| SUPPORTED_PROTOCOL_VERSIONS.iter().find(|s| **s == v))
        .copied()
        .unwrap_or(LATEST_PROTOCOL_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ToolsConfig;
    use serde_json::json;

    fn dispatcher() -> RpcDispatcher {
        let registry = ToolRegistry::with_builtin_tools(&ToolsConfig::default()).unwrap();
        RpcDispatcher::new(Arc::new(registry), ServerIdentity::new("godoctor", "0.1.0"))
    }

    async fn call(
        dispatcher: &RpcDispatcher,
        method: &str,
        params: serde_json::Value,
    ) -> JsonRpcResponse {
        dispatcher
            .handle(JsonRpcRequest::new(1, method, Some(params)))
            .await
            .expect("requests get a response")
    }

    #[test]
    fn test_negotiate_protocol_version() {
        assert_eq!(negotiate_protocol_version(Some("2024-11-05")), "2024-11-05");
        assert_eq!(negotiate_protocol_version(Some("1999-01-01")), LATEST_PROTOCOL_VERSION);
        assert_eq!(negotiate_protocol_version(None), LATEST_PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn test_initialize() {
        let params = json!({ "protocolVersion": "2025-03-26" });
        let response = call(&dispatcher(), "initialize", params).await;
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2025-03-26");
        assert_eq!(result["serverInfo"]["name"], "godoctor");
        assert!(result["capabilities"]["tools"].is_object());
        assert_eq!(response.id, Some(json!(1)));
    }

    #[tokio::test]
    async fn test_tools_list() {
        let response = call(&dispatcher(), "tools/list", json!({})).await;
        let tools = response.result.unwrap()["tools"].clone();
        let names: Vec<_> = tools
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["godoc", "helloWorld"]);
        assert!(tools[0]["inputSchema"].is_object());
    }

    #[tokio::test]
    async fn test_tools_call_hello_world() {
        let response = call(&dispatcher(), "tools/call", json!({ "name": "helloWorld" })).await;
        assert!(response.error.is_none());
        let result = response.result.unwrap();
        assert_eq!(result["structuredContent"], json!({ "message": "Hello, World!" }));
        assert_eq!(result["content"][0]["type"], "text");
        assert_eq!(result["content"][0]["text"], "Hello, World!");
    }

    #[tokio::test]
    async fn test_tools_call_unknown_tool() {
        let params = json!({ "name": "nope", "arguments": {} });
        let response = call(&dispatcher(), "tools/call", params).await;
        let error = response.error.unwrap();
        assert_eq!(error.code, -32602);
        assert_eq!(error.message, "Unknown tool: nope");
        assert!(response.result.is_none());
    }

    #[tokio::test]
    async fn test_tools_call_invalid_arguments() {
        let params = json!({ "name": "godoc", "arguments": {} });
        let response = call(&dispatcher(), "tools/call", params).await;
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_tools_call_missing_params() {
        let response = dispatcher()
            .handle(JsonRpcRequest::new(7, "tools/call", None))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let response = call(&dispatcher(), "resources/list", json!({})).await;
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_invalid_version() {
        let mut request = JsonRpcRequest::new(1, "ping", None);
        request.jsonrpc = "1.0".to_string();
        let response = dispatcher().handle(request).await.unwrap();
        assert_eq!(response.error.unwrap().code, -32600);
    }

    #[tokio::test]
    async fn test_notification_has_no_response() {
        let request = JsonRpcRequest::notification("notifications/initialized", None);
        assert!(dispatcher().handle(request).await.is_none());
    }

    #[tokio::test]
    async fn test_ping() {
        let response = call(&dispatcher(), "ping", json!({})).await;
        assert_eq!(response.result, Some(json!({})));
    }
}
