//! Client error types.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to an MCP server.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Opening the transport or the MCP handshake failed.
    #[error("Failed to connect to MCP server: {0}")]
    Connect(#[source] Box<ClientError>),

    /// The tool call itself failed.
    #[error("Tool call failed: {0}")]
    Call(#[source] Box<ClientError>),

    /// The server process could not be started.
    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O error on the transport or while writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success HTTP status.
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The server answered with a JSON-RPC error.
    #[error("{message} (code {code})")]
    Rpc { code: i32, message: String },

    /// The server broke the protocol (closed early, unexpected message).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The request was rejected before reaching the server.
    #[error("{0}")]
    Validation(String),
}

impl ClientError {
    /// Create a protocol error.
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Wrap as a connection failure.
    pub fn connect(self) -> Self {
        Self::Connect(Box::new(self))
    }

    /// Wrap as a call failure.
    pub fn call(self) -> Self {
        Self::Call(Box::new(self))
    }
}
