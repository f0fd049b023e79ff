//! Runner for the external documentation command.
//!
//! Spawns `<program> doc <package> [<symbol>]`, collects stdout and stderr
//! into a single buffer in arrival order, and waits for the process under a
//! timeout. Only the program itself is timed: once it exits, its status is
//! final even if something it spawned keeps the output pipes open.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::core::config::DocCommandConfig;

/// How long output is still collected after the program has exited.
const OUTPUT_GRACE: Duration = Duration::from_millis(500);

/// Why a documentation command did not complete successfully.
#[derive(Debug, Error)]
pub enum DocFailure {
    /// The program could not be started at all.
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran and exited with a non-zero status.
    #[error("{0}")]
    Exit(ExitStatus),

    /// The program did not finish within the configured timeout and was killed.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    /// Waiting for the program failed.
    #[error("failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of one documentation command run.
#[derive(Debug)]
pub struct DocRun {
    /// Combined stdout and stderr, lossily decoded as UTF-8.
    pub output: String,

    /// Set when the run did not exit with status 0.
    pub failure: Option<DocFailure>,
}

impl DocRun {
    /// Whether the command exited with status 0.
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

/// The external documentation command (`go doc` by default).
#[derive(Debug, Clone)]
pub struct DocCommand {
    program: String,
    working_dir: Option<PathBuf>,
    timeout: Duration,
}

impl DocCommand {
    /// Create a runner for `program` with the given timeout.
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            working_dir: None,
            timeout,
        }
    }

    /// Run the command from `dir` instead of the server's working directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Build the runner from configuration.
    pub fn from_config(config: &DocCommandConfig) -> Self {
        let command = Self::new(
            config.program.clone(),
            Duration::from_secs(config.timeout_secs),
        );
        match &config.working_dir {
            Some(dir) => command.with_working_dir(dir),
            None => command,
        }
    }

    /// The program this runner invokes.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the program with `args` and capture its combined output.
    pub async fn run(&self, args: &[String]) -> DocRun {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        debug!(program = %self.program, ?args, "Running documentation command");

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(source) => {
                warn!("Failed to launch {}: {}", self.program, source);
                return DocRun {
                    output: String::new(),
                    failure: Some(DocFailure::Launch {
                        program: self.program.clone(),
                        source,
                    }),
                };
            }
        };

        let (tx, mut rx) = mpsc::unbounded_channel();
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_output(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_output(stderr, tx.clone()));
        }
        drop(tx);

        let mut combined = Vec::new();
        let outcome = tokio::time::timeout(self.timeout, async {
            loop {
                tokio::select! {
                    Some(chunk) = rx.recv() => combined.extend_from_slice(&chunk),
                    status = child.wait() => break status,
                }
            }
        })
        .await;

        if outcome.is_ok() {
            // Output still in flight once the program has exited. A background
            // process it left behind may hold the pipes open indefinitely.
            let deadline = Instant::now() + OUTPUT_GRACE;
            while let Ok(Some(chunk)) = tokio::time::timeout_at(deadline, rx.recv()).await {
                combined.extend_from_slice(&chunk);
            }
        }

        let failure = match outcome {
            Ok(Ok(status)) if status.success() => None,
            Ok(Ok(status)) => Some(DocFailure::Exit(status)),
            Ok(Err(source)) => Some(DocFailure::Wait {
                program: self.program.clone(),
                source,
            }),
            Err(_) => {
                warn!("{} timed out after {:?}, killing it", self.program, self.timeout);
                if let Err(e) = child.start_kill() {
                    warn!("Failed to kill {}: {}", self.program, e);
                }
                while let Ok(chunk) = rx.try_recv() {
                    combined.extend_from_slice(&chunk);
                }
                Some(DocFailure::TimedOut(self.timeout))
            }
        };

        DocRun {
            output: String::from_utf8_lossy(&combined).into_owned(),
            failure,
        }
    }
}

/// Forward everything read from `reader` to `tx` until EOF.
async fn forward_output<R>(mut reader: R, tx: mpsc::UnboundedSender<Vec<u8>>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; 8192];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
            Err(e) => {
                debug!("Stopped reading command output: {}", e);
                break;
            }
        }
    }
}
