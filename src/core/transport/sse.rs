//! SSE transport implementation.
//!
//! Each tool is served by its own single-tool server instance at `/<tool>`.
//! A client opens an event stream with `GET <path>`; the first event
//! (`endpoint`) tells it where to POST its JSON-RPC messages, and every reply
//! is pushed back on the stream as a `message` event.
//!
//! Per connection: `Received → PathMatched → {ServerAssigned | Rejected}`.
//! A path missing from the [`RouteTable`] is rejected before any server
//! instance sees the connection.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, Uri},
    middleware,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::get,
};
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};
use tracing::{info, warn};
use uuid::Uuid;

use super::logging::log_requests;
use super::routes::RouteTable;
use super::rpc::{JsonRpcRequest, RpcDispatcher, ServerIdentity};
use super::{TransportError, TransportResult, config::SseConfig};
use crate::core::McpServer;

/// Messages buffered per stream before a POST waits for the client to read.
const STREAM_BUFFER: usize = 64;

/// SSE transport handler.
pub struct SseTransport {
    config: SseConfig,
}

/// One open event stream.
#[derive(Clone)]
struct SseSession {
    /// Path the stream was opened on.
    path: String,
    /// Dispatcher of the server instance assigned to this stream.
    dispatcher: RpcDispatcher,
    /// Sender feeding the event stream.
    tx: mpsc::Sender<String>,
}

/// State shared across SSE handlers.
#[derive(Clone)]
struct SseState {
    routes: Arc<RouteTable>,
    version: String,
    sessions: SessionMap,
}

type SessionMap = Arc<RwLock<HashMap<String, SseSession>>>;

impl SseState {
    fn new(routes: RouteTable, version: impl Into<String>) -> Self {
        Self {
            routes: Arc::new(routes),
            version: version.into(),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

/// Removes its session from the map once the event stream is dropped.
struct SessionGuard {
    id: String,
    sessions: SessionMap,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Ok(mut sessions) = self.sessions.try_write() {
            sessions.remove(&self.id);
            info!("Session {} disconnected", self.id);
            return;
        }

        // The map is busy; finish the removal on the runtime.
        let id = std::mem::take(&mut self.id);
        let sessions = self.sessions.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    sessions.write().await.remove(&id);
                    info!("Session {} disconnected", id);
                });
            }
            Err(_) => warn!("Session {} left open: no runtime to remove it", id),
        }
    }
}

/// Query string of the message endpoint.
#[derive(Debug, Deserialize)]
struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: String,
}

impl SseTransport {
    /// Create a new SSE transport with the given config.
    pub fn new(config: SseConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Build the router for `routes`.
    pub fn router(routes: RouteTable, version: impl Into<String>) -> Router {
        Self::router_with_state(SseState::new(routes, version))
    }

    fn router_with_state(state: SseState) -> Router {
        Router::new()
            .route("/{*path}", get(open_stream).post(post_message))
            .fallback(reject_unrouted)
            .with_state(state)
            .layer(middleware::from_fn(log_requests))
    }

    /// Run the SSE transport.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();

        let routes = RouteTable::per_tool(server.registry())?;
        for path in routes.paths() {
            info!("  → SSE stream: GET {}", path);
        }
        let app = Self::router(routes, server.version());

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        info!("Ready - listening on {} (SSE, one server per tool)", addr);

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// Open an event stream on the server instance mapped to the request path.
async fn open_stream(State(state): State<SseState>, uri: Uri) -> Response {
    let path = uri.path().to_string();
    info!("Handling request for URL {}", path);

    let Some(registry) = state.routes.resolve(&path) else {
        warn!("No server mapped to {}, rejecting connection", path);
        return (StatusCode::BAD_REQUEST, "no server available").into_response();
    };

    let name = path.trim_start_matches('/').to_string();
    let dispatcher = RpcDispatcher::new(registry, ServerIdentity::new(name, &state.version));

    let session_id = Uuid::new_v4().simple().to_string();
    let (tx, rx) = mpsc::channel(STREAM_BUFFER);
    state.sessions.write().await.insert(
        session_id.clone(),
        SseSession {
            path: path.clone(),
            dispatcher,
            tx,
        },
    );
    info!("Assigned session {} to {}", session_id, path);

    let endpoint = format!("{path}?sessionId={session_id}");
    let guard = SessionGuard {
        id: session_id,
        sessions: state.sessions.clone(),
    };
    Sse::new(event_stream(endpoint, rx, guard))
        .keep_alive(KeepAlive::default())
        .into_response()
}

/// The `endpoint` event followed by every message sent on `rx`.
///
/// `guard` lives as long as the stream, so the session disappears when the
/// client disconnects.
fn event_stream(
    endpoint: String,
    rx: mpsc::Receiver<String>,
    guard: SessionGuard,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let first =
        stream::once(async move { Ok(Event::default().event("endpoint").data(endpoint)) });
    let messages = stream::unfold((rx, guard), |(mut rx, guard)| async move {
        let message = rx.recv().await?;
        Some((
            Ok(Event::default().event("message").data(message)),
            (rx, guard),
        ))
    });
    first.chain(messages)
}

/// Deliver a JSON-RPC message to the server instance of a stream.
async fn post_message(
    State(state): State<SseState>,
    uri: Uri,
    Query(query): Query<MessageQuery>,
    Json(request): Json<JsonRpcRequest>,
) -> Response {
    let session = state.sessions.read().await.get(&query.session_id).cloned();

    let Some(session) = session.filter(|s| s.path == uri.path()) else {
        warn!(
            "No session {} on {}, rejecting message",
            query.session_id,
            uri.path()
        );
        return (StatusCode::NOT_FOUND, "Session not found").into_response();
    };

    let Some(response) = session.dispatcher.handle(request).await else {
        return StatusCode::ACCEPTED.into_response();
    };

    let payload = match serde_json::to_string(&response) {
        Ok(payload) => payload,
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    };

    if session.tx.send(payload).await.is_err() {
        info!("Stream of session {} is closed", query.session_id);
        state.sessions.write().await.remove(&query.session_id);
        return (StatusCode::GONE, "Stream closed").into_response();
    }

    StatusCode::ACCEPTED.into_response()
}

/// Requests outside any tool path.
async fn reject_unrouted(uri: Uri) -> Response {
    warn!("No server mapped to {}, rejecting connection", uri.path());
    (StatusCode::BAD_REQUEST, "no server available").into_response()
}
