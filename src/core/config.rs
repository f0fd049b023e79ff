//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables, a `.env` file, or defaults.

use super::error::{Error, Result};
use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Main configuration structure for the MCP server.
///
/// This struct contains all configurable aspects of the server, organized
/// by domain for clarity and maintainability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Tools domain configuration.
    pub tools: ToolsConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Configuration for the tools domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Greeting returned by the `helloWorld` tool.
    pub greeting: String,

    /// External documentation command used by the `godoc` tool.
    pub doc: DocCommandConfig,
}

/// Configuration of the external documentation command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocCommandConfig {
    /// Program invoked as `<program> doc <package> [<symbol>]`.
    pub program: String,

    /// Directory the command runs in. Defaults to the server's own.
    pub working_dir: Option<PathBuf>,

    /// Seconds before a running command is killed.
    pub timeout_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            greeting: "Hello, World!".to_string(),
            doc: DocCommandConfig::default(),
        }
    }
}

impl Default for DocCommandConfig {
    fn default() -> Self {
        Self {
            program: "go".to_string(),
            working_dir: None,
            timeout_secs: 60,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "godoctor".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            tools: ToolsConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                with_timestamps: true,
            },
            transport: TransportConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Server settings are prefixed with `MCP_` (e.g. `MCP_SERVER_NAME`,
    /// `MCP_LOG_LEVEL`); the listen port of the network transports comes from
    /// `PORT`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(value) = std::env::var("MCP_LOG_TIMESTAMPS") {
            config.logging.with_timestamps = !matches!(value.as_str(), "0" | "false" | "no");
        }

        if let Ok(greeting) = std::env::var("MCP_GREETING") {
            config.tools.greeting = greeting;
        }

        if let Ok(program) = std::env::var("MCP_DOC_COMMAND") {
            info!("Documentation command set to {}", program);
            config.tools.doc.program = program;
        }

        if let Ok(dir) = std::env::var("MCP_DOC_WORKDIR") {
            config.tools.doc.working_dir = Some(PathBuf::from(dir));
        }

        if let Some(secs) = std::env::var("MCP_DOC_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.tools.doc.timeout_secs = secs;
        }

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env();

        config
    }

    /// Check the configuration for values the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.tools.doc.program.trim().is_empty() {
            return Err(Error::config("documentation command must not be empty"));
        }
        if self.tools.doc.timeout_secs == 0 {
            return Err(Error::config(
                "documentation command timeout must be at least one second",
            ));
        }
        Ok(())
    }
}
