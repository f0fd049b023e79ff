//! godoctor-client: calls a tool of a godoctor server listening on HTTP.

use clap::Parser;

use godoctor::client::ServerTarget;
use godoctor::client::cli::{ToolCommand, init_logging, parse_args, run};

/// HTTP client for the godoctor MCP server.
#[derive(Debug, Parser)]
#[command(name = "godoctor-client", version, about)]
struct Cli {
    /// Address of the godoctor server.
    #[arg(
        short = 'a',
        long,
        global = true,
        env = "GODOCTOR_SERVER_ADDR",
        default_value = "http://localhost:8080"
    )]
    server_addr: String,

    #[command(subcommand)]
    command: ToolCommand,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli: Cli = parse_args();
    init_logging();

    run(
        &ServerTarget::http(cli.server_addr),
        "godoctor-client",
        &cli.command,
    )
    .await
}
