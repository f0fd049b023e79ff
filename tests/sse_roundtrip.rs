//! End-to-end: raw SSE clients against a live per-tool SSE server.

#![cfg(feature = "sse")]

use std::net::SocketAddr;

use godoctor::core::transport::RouteTable;
use godoctor::core::transport::sse::SseTransport;
use godoctor::core::{Config, McpServer};
use serde_json::{Value, json};

/// Serve `config` on an ephemeral port and return its base URL.
async fn spawn_server(config: Config) -> String {
    let server = McpServer::new(config).unwrap();
    let routes = RouteTable::per_tool(server.registry()).unwrap();
    let app = SseTransport::router(routes, server.version());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    format!("http://{addr}")
}

/// Reads `event:`/`data:` frames off a streaming response.
struct EventStream {
    response: reqwest::Response,
    buffer: String,
}

impl EventStream {
    async fn open(url: &str) -> Self {
        let response = reqwest::get(url).await.unwrap();
        assert_eq!(response.status(), 200);
        Self {
            response,
            buffer: String::new(),
        }
    }

    async fn next_event(&mut self) -> (String, String) {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                let frame: String = self.buffer.drain(..end + 2).collect();
                let mut event = String::new();
                let mut data = String::new();
                for line in frame.lines() {
                    if let Some(v) = line.strip_prefix("event:") {
                        event = v.trim().to_string();
                    } else if let Some(v) = line.strip_prefix("data:") {
                        data.push_str(v.trim_start());
                    }
                }
                // keep-alive comments carry neither
                if event.is_empty() && data.is_empty() {
                    continue;
                }
                return (event, data);
            }
            let chunk = self.response.chunk().await.unwrap().expect("stream ended");
            self.buffer.push_str(&String::from_utf8_lossy(&chunk));
        }
    }
}

async fn post(base: &str, endpoint: &str, body: Value) -> reqwest::StatusCode {
    reqwest::Client::new()
        .post(format!("{base}{endpoint}"))
        .json(&body)
        .send()
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn failing_godoc_reports_error_over_sse() {
    let mut config = Config::default();
    config.tools.doc.program = "false".to_string();
    let base = spawn_server(config).await;

    let mut stream = EventStream::open(&format!("{base}/godoc")).await;
    let (event, endpoint) = stream.next_event().await;
    assert_eq!(event, "endpoint");
    assert!(endpoint.starts_with("/godoc?sessionId="));

    let status = post(
        &base,
        &endpoint,
        json!({
            "jsonrpc": "2.0", "id": 1, "method": "tools/call",
            "params": { "name": "godoc", "arguments": { "package": "doesnotexist123" } }
        }),
    )
    .await;
    assert_eq!(status, 202);

    let (event, data) = stream.next_event().await;
    assert_eq!(event, "message");
    let message: Value = serde_json::from_str(&data).unwrap();
    assert_eq!(message["id"], 1);
    let result = &message["result"];
    assert!(!result["structuredContent"]["error"].as_str().unwrap().is_empty());
    assert!(result["content"].as_array().is_none_or(|c| c.is_empty()));
}

#[tokio::test]
async fn hello_world_path_serves_only_hello_world() {
    let base = spawn_server(Config::default()).await;

    let mut stream = EventStream::open(&format!("{base}/helloWorld")).await;
    let (_, endpoint) = stream.next_event().await;

    post(
        &base,
        &endpoint,
        json!({ "jsonrpc": "2.0", "id": 1, "method": "tools/list" }),
    )
    .await;
    let (_, data) = stream.next_event().await;
    let message: Value = serde_json::from_str(&data).unwrap();
    let tools = message["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0]["name"], "helloWorld");

    post(
        &base,
        &endpoint,
        json!({
            "jsonrpc": "2.0", "id": 2, "method": "tools/call",
            "params": { "name": "helloWorld", "arguments": {} }
        }),
    )
    .await;
    let (_, data) = stream.next_event().await;
    let message: Value = serde_json::from_str(&data).unwrap();
    assert_eq!(
        message["result"]["structuredContent"],
        json!({ "message": "Hello, World!" })
    );
}

#[tokio::test]
async fn unmapped_path_is_rejected() {
    let base = spawn_server(Config::default()).await;

    let response = reqwest::get(format!("{base}/nope")).await.unwrap();
    assert_eq!(response.status(), 400);
    assert_eq!(response.text().await.unwrap(), "no server available");
}
