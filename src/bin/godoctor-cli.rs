//! godoctor-cli: launches the godoctor server and calls one of its tools
//! over stdio.

use clap::Parser;
use std::path::PathBuf;

use godoctor::client::ServerTarget;
use godoctor::client::cli::{ToolCommand, init_logging, parse_args, run};

/// CLI client for the godoctor MCP server.
///
/// Launches the server as a subprocess and talks to it over stdin/stdout.
#[derive(Debug, Parser)]
#[command(name = "godoctor-cli", version, about)]
struct Cli {
    /// Path to the godoctor server executable.
    #[arg(long, global = true, env = "GODOCTOR_SERVER_CMD", default_value = "./bin/godoctor")]
    server_cmd: PathBuf,

    #[command(subcommand)]
    command: ToolCommand,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli: Cli = parse_args();
    init_logging();

    run(
        &ServerTarget::command(cli.server_cmd),
        "godoctor-cli",
        &cli.command,
    )
    .await
}
