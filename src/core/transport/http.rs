//! Streamable HTTP transport implementation.
//!
//! One server instance bound to one listener. Every POST, whatever its path,
//! carries a JSON-RPC message for that instance; replies come back as
//! `application/json`. `initialize` hands out an `Mcp-Session-Id` that later
//! requests may echo and `DELETE` ends.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::logging::log_requests;
use super::rpc::{JsonRpcRequest, RpcDispatcher};
use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::McpServer;

/// Header carrying the session id.
pub const SESSION_HEADER: &str = "mcp-session-id";

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Dispatcher of the single server instance.
    dispatcher: RpcDispatcher,
    /// Open sessions keyed by session id.
    sessions: Arc<RwLock<HashMap<String, SessionState>>>,
}

/// Session state for a client.
#[derive(Debug, Clone)]
struct SessionState {
    initialized: bool,
    protocol_version: String,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Build the router serving `server`.
    pub fn router(&self, server: &McpServer) -> Router {
        let state = AppState {
            dispatcher: RpcDispatcher::new(server.registry().clone(), server.identity()),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        };

        let mut app = Router::new()
            .route("/health", get(health_check))
            .route(
                "/",
                get(root_handler).post(handle_rpc).delete(handle_delete),
            )
            .route("/{*path}", post(handle_rpc).delete(handle_delete))
            .with_state(state)
            .layer(middleware::from_fn(log_requests));

        // Add CORS if enabled
        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any);
            app = app.layer(cors);
        }

        app
    }

    /// Run the HTTP transport.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();
        let app = self.router(&server);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!(
            "Ready - listening on {} (streamable HTTP, CORS {})",
            addr, cors_status
        );
        info!("  → JSON-RPC: POST <any path>");
        info!("  → Health:   GET /health");

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// Root handler - provides API info.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    let identity = state.dispatcher.identity();
    Json(serde_json::json!({
        "name": identity.name,
        "version": identity.version,
        "transport": "streamable HTTP",
        "tools": state.dispatcher.registry().tool_names(),
        "endpoints": {
            "rpc": "POST <any path>",
            "health": "/health"
        },
        "protocol": "JSON-RPC 2.0"
    }))
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Handle JSON-RPC messages.
#[instrument(skip_all, fields(method))]
async fn handle_rpc(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<JsonRpcRequest>,
) -> Response {
    tracing::Span::current().record("method", request.method.as_str());

    if request.method == "initialize" {
        return handle_initialize(&state, request).await;
    }

    if let Some(id) = session_id(&headers) {
        let mut sessions = state.sessions.write().await;
        match sessions.get_mut(&id) {
            Some(session) => {
                if request.method == "notifications/initialized" {
                    session.initialized = true;
                }
            }
            None => {
                warn!("Request for unknown session {}", id);
                return (StatusCode::NOT_FOUND, "Session not found").into_response();
            }
        }
    }

    match state.dispatcher.handle(request).await {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Handle initialize: answer it and open a session.
async fn handle_initialize(state: &AppState, request: JsonRpcRequest) -> Response {
    let Some(response) = state.dispatcher.handle(request).await else {
        return StatusCode::ACCEPTED.into_response();
    };

    let Some(protocol_version) = response
        .result
        .as_ref()
        .and_then(|r| r.get("protocolVersion"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
    else {
        return (StatusCode::OK, Json(response)).into_response();
    };

    let id = Uuid::new_v4().to_string();
    state.sessions.write().await.insert(
        id.clone(),
        SessionState {
            initialized: false,
            protocol_version,
        },
    );
    info!("Opened session {}", id);

    (StatusCode::OK, [(SESSION_HEADER, id)], Json(response)).into_response()
}

/// Handle session termination.
async fn handle_delete(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    let Some(id) = session_id(&headers) else {
        return StatusCode::BAD_REQUEST;
    };

    match state.sessions.write().await.remove(&id) {
        Some(session) => {
            info!(
                "Closed session {} (protocol {}, initialized: {})",
                id, session.protocol_version, session.initialized
            );
            StatusCode::OK
        }
        None => StatusCode::NOT_FOUND,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    fn app() -> Router {
        let server = McpServer::new(Config::default()).unwrap();
        HttpTransport::new(HttpConfig::default()).router(&server)
    }

    fn post(uri: &str, body: serde_json::Value, session: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(id) = session {
            builder = builder.header(SESSION_HEADER, id);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_initialize_opens_session() {
        let response = app()
            .oneshot(post(
                "/",
                json!({
                    "jsonrpc": "2.0", "id": 1, "method": "initialize",
                    "params": { "protocolVersion": "2025-03-26" }
                }),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(SESSION_HEADER).is_some());
        let body = body_json(response).await;
        assert_eq!(body["result"]["protocolVersion"], "2025-03-26");
    }

    #[tokio::test]
    async fn test_any_path_reaches_the_server() {
        let response = app()
            .oneshot(post(
                "/some/deep/path",
                json!({
                    "jsonrpc": "2.0", "id": 2, "method": "tools/call",
                    "params": { "name": "helloWorld", "arguments": {} }
                }),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["result"]["structuredContent"]["message"], "Hello, World!");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_rpc_error() {
        let response = app()
            .oneshot(post(
                "/mcp",
                json!({
                    "jsonrpc": "2.0", "id": 3, "method": "tools/call",
                    "params": { "name": "nope" }
                }),
                None,
            ))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], -32602);
        assert_eq!(body["error"]["message"], "Unknown tool: nope");
    }

    #[tokio::test]
    async fn test_notification_is_accepted() {
        let response = app()
            .oneshot(post(
                "/mcp",
                json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_unknown_session_is_rejected() {
        let response = app()
            .oneshot(post(
                "/mcp",
                json!({ "jsonrpc": "2.0", "id": 4, "method": "tools/list" }),
                Some("not-a-session"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let app = app();

        let response = app
            .clone()
            .oneshot(post(
                "/mcp",
                json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {} }),
                None,
            ))
            .await
            .unwrap();
        let id = response
            .headers()
            .get(SESSION_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();

        let response = app
            .clone()
            .oneshot(post(
                "/mcp",
                json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }),
                Some(&id),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let delete = Request::builder()
            .method("DELETE")
            .uri("/mcp")
            .header(SESSION_HEADER, &id)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(delete).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(post(
                "/mcp",
                json!({ "jsonrpc": "2.0", "id": 3, "method": "tools/list" }),
                Some(&id),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health_check() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
    }
}
