//! Channel to a streamable HTTP server.

use async_trait::async_trait;
use reqwest::{Client, Response, header};
use std::time::Duration;
use tracing::debug;

use super::{RpcChannel, match_response};
use crate::client::{ClientError, ClientResult};
use crate::core::transport::rpc::{JsonRpcRequest, JsonRpcResponse};

/// Header carrying the session id handed out on `initialize`.
const SESSION_HEADER: &str = "mcp-session-id";

/// Upper bound on a single request, `go doc` included.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// JSON-RPC over HTTP POST.
///
/// Replies may come back as `application/json` or as a `text/event-stream`
/// body carrying the response in a `message` event.
#[derive(Debug, Clone)]
pub struct HttpChannel {
    client: Client,
    endpoint: String,
    session_id: Option<String>,
}

impl HttpChannel {
    /// Create a channel posting to `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> ClientResult<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            session_id: None,
        })
    }

    /// Session id assigned by the server, if any.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    async fn post(&mut self, message: &JsonRpcRequest) -> ClientResult<Response> {
        debug!(endpoint = %self.endpoint, method = %message.method, "POST request");

        let mut builder = self
            .client
            .post(&self.endpoint)
            .header(header::ACCEPT, "application/json, text/event-stream")
            .json(message);
        if let Some(id) = &self.session_id {
            builder = builder.header(SESSION_HEADER, id);
        }

        let response = builder.send().await?;

        if let Some(id) = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            self.session_id = Some(id.to_string());
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }

        Ok(response)
    }
}

#[async_trait]
impl RpcChannel for HttpChannel {
    async fn request(&mut self, request: JsonRpcRequest) -> ClientResult<JsonRpcResponse> {
        let response = self.post(&request).await?;

        let is_stream = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("text/event-stream"));
        let body = response.text().await?;

        if is_stream {
            response_from_event_stream(&body, &request.id).ok_or_else(|| {
                ClientError::protocol(format!("no response to {} in event stream", request.method))
            })
        } else {
            Ok(serde_json::from_str(&body)?)
        }
    }

    async fn notify(&mut self, notification: JsonRpcRequest) -> ClientResult<()> {
        self.post(&notification).await?;
        Ok(())
    }

    async fn close(&mut self) -> ClientResult<()> {
        let Some(id) = self.session_id.take() else {
            return Ok(());
        };

        // Servers may not support explicit termination.
        let response = self
            .client
            .delete(&self.endpoint)
            .header(SESSION_HEADER, &id)
            .send()
            .await?;
        debug!("Session {} closed with status {}", id, response.status());
        Ok(())
    }
}

/// Find the response to `id` among the events of an SSE body.
fn response_from_event_stream(
    body: &str,
    id: &Option<serde_json::Value>,
) -> Option<JsonRpcResponse> {
    let body = body.replace("\r\n", "\n");

    body.split("\n\n").find_map(|event| {
        let data = event
            .lines()
            .filter_map(|line| line.strip_prefix("data:"))
            .map(|v| v.strip_prefix(' ').unwrap_or(v))
            .collect::<Vec<_>>()
            .join("\n");
        if data.is_empty() {
            return None;
        }
        let value = serde_json::from_str(&data).ok()?;
        match_response(value, id)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_from_event_stream() {
        let body = "event: message\r\n\
                    data: {\"jsonrpc\":\"2.0\",\"method\":\"notifications/progress\"}\r\n\
                    \r\n\
                    : keep-alive\r\n\
                    \r\n\
                    event: message\r\n\
                    data: {\"jsonrpc\":\"2.0\",\"id\":7,\"result\":{\"tools\":[]}}\r\n\
                    \r\n";

        let response = response_from_event_stream(body, &Some(json!(7))).unwrap();
        assert_eq!(response.result, Some(json!({ "tools": [] })));

        assert!(response_from_event_stream(body, &Some(json!(8))).is_none());
    }

    #[test]
    fn test_multiline_data() {
        let body = "data: {\"jsonrpc\":\"2.0\",\ndata: \"id\":1,\"result\":{}}\n\n";
        let response = response_from_event_stream(body, &Some(json!(1))).unwrap();
        assert_eq!(response.result, Some(json!({})));
    }

    #[test]
    fn test_new_channel_has_no_session() {
        let channel = HttpChannel::new("http://localhost:8080").unwrap();
        assert!(channel.session_id().is_none());
    }
}
