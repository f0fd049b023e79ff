//! MCP client used by the `godoctor-cli` and `godoctor-client` binaries.
//!
//! A client opens one [`RpcChannel`] to a server, runs the `initialize`
//! handshake, calls one tool and prints the result:
//!
//! ```rust,no_run
//! use godoctor::client::{ClientIdentity, ServerTarget, execute_tool};
//! use rmcp::model::JsonObject;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let target = ServerTarget::http("http://localhost:8080");
//!     let client = ClientIdentity::new("example", "1.0.0");
//!     let mut out = std::io::stdout();
//!     execute_tool(&target, &client, "helloWorld", JsonObject::new(), &mut out).await?;
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod cli;
mod error;
mod render;
mod session;

pub use channel::{ChildProcessChannel, HttpChannel, RpcChannel};
pub use error::{ClientError, ClientResult};
pub use render::render_outcome;
pub use session::{
    CLIENT_PROTOCOL_VERSION, ClientIdentity, ClientSession, ServerTarget, ToolCallOutcome,
    execute_tool,
};
