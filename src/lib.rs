//! godoctor: an MCP server exposing Go documentation tools.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the server and its transports
//!   (stdio, streamable HTTP, SSE with one server per tool path)
//! - **domains**: the tools themselves
//!   - **tools**: `helloWorld` and `godoc` (a wrapper around `go doc`)
//! - **client**: the MCP client behind the `godoctor-cli` (stdio) and
//!   `godoctor-client` (HTTP) binaries
//!
//! # Example
//!
//! ```rust,no_run
//! use godoctor::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config.clone())?;
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
