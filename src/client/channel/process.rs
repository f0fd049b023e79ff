//! Channel to a server launched as a child process.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, warn};

use super::{RpcChannel, match_response};
use crate::client::{ClientError, ClientResult};
use crate::core::transport::rpc::{JsonRpcRequest, JsonRpcResponse};

/// How long the server gets to exit after its stdin closes.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Newline-delimited JSON-RPC over the stdin/stdout of a child process.
///
/// The child's stderr is inherited so server logs stay visible.
pub struct ChildProcessChannel {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Lines<BufReader<ChildStdout>>,
}

impl ChildProcessChannel {
    /// Launch `program` with `args` and attach to its standard streams.
    pub fn spawn(program: &Path, args: &[String]) -> ClientResult<Self> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ClientError::Spawn {
                program: program.display().to_string(),
                source,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ClientError::protocol("server stdin is not piped"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ClientError::protocol("server stdout is not piped"))?;

        debug!("Launched server {}", program.display());

        Ok(Self {
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout).lines(),
        })
    }

    async fn send(&mut self, message: &JsonRpcRequest) -> ClientResult<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| ClientError::protocol("channel is closed"))?;

        let mut line = serde_json::to_string(message)?;
        line.push('\n');
        stdin.write_all(line.as_bytes()).await?;
        stdin.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl RpcChannel for ChildProcessChannel {
    async fn request(&mut self, request: JsonRpcRequest) -> ClientResult<JsonRpcResponse> {
        self.send(&request).await?;

        loop {
            let Some(line) = self.stdout.next_line().await? else {
                return Err(ClientError::protocol(format!(
                    "server exited before answering {}",
                    request.method
                )));
            };
            if line.trim().is_empty() {
                continue;
            }

            let value: serde_json::Value = match serde_json::from_str(&line) {
                Ok(value) => value,
                Err(e) => {
                    warn!("Ignoring malformed message from server: {}", e);
                    continue;
                }
            };

            match match_response(value, &request.id) {
                Some(response) => return Ok(response),
                None => debug!("Ignoring unrelated message: {}", line),
            }
        }
    }

    async fn notify(&mut self, notification: JsonRpcRequest) -> ClientResult<()> {
        self.send(&notification).await
    }

    async fn close(&mut self) -> ClientResult<()> {
        // Closing stdin is the shutdown signal for a stdio server.
        drop(self.stdin.take());

        match tokio::time::timeout(SHUTDOWN_GRACE, self.child.wait()).await {
            Ok(status) => {
                debug!("Server exited with {}", status?);
            }
            Err(_) => {
                warn!("Server did not exit after {:?}, killing it", SHUTDOWN_GRACE);
                self.child.kill().await?;
            }
        }
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    /// A shell "server" answering every line with a fixed response for id 1,
    /// preceded by a notification that must be skipped.
    fn fake_server(dir: &tempfile::TempDir) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join("server");
        let script = r#"#!/bin/sh
while read line; do
  echo '{"jsonrpc":"2.0","method":"notifications/message","params":{}}'
  echo '{"jsonrpc":"2.0","id":1,"result":{"ok":true}}'
done
"#;
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_request_skips_unrelated_messages() {
        let dir = tempfile::tempdir().unwrap();
        let mut channel = ChildProcessChannel::spawn(&fake_server(&dir), &[]).unwrap();

        let response = channel
            .request(JsonRpcRequest::new(1, "ping", None))
            .await
            .unwrap();
        assert_eq!(response.result, Some(json!({ "ok": true })));

        channel.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_server_exiting_early_fails_request() {
        let mut channel = ChildProcessChannel::spawn(Path::new("true"), &[]).unwrap();

        let err = channel
            .request(JsonRpcRequest::new(1, "initialize", None))
            .await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_missing_program() {
        let err = ChildProcessChannel::spawn(Path::new("/nonexistent/godoctor"), &[]);
        assert!(matches!(err, Err(ClientError::Spawn { .. })));
    }
}
