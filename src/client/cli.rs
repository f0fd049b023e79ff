//! Command-line surface shared by the client binaries.

use clap::{Args, Parser, Subcommand};
use rmcp::model::JsonObject;
use serde_json::Value;
use tracing_subscriber::{EnvFilter, fmt};

use super::{ClientError, ClientIdentity, ClientResult, ServerTarget, execute_tool};

/// Tool to call.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum ToolCommand {
    /// Calls the helloWorld tool.
    #[command(name = "helloWorld")]
    HelloWorld,
    /// Calls the godoc tool.
    #[command(name = "godoc")]
    Godoc(GodocArgs),
}

/// Arguments of the `godoc` subcommand.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct GodocArgs {
    /// The package to get documentation for (e.g. fmt, net/http).
    #[arg(short, long, default_value = "")]
    pub package: String,
    /// The symbol to get documentation for (e.g. Println).
    #[arg(short, long, default_value = "")]
    pub symbol: String,
}

impl ToolCommand {
    /// Tool name and arguments for this command.
    ///
    /// Fails before any connection is made when `godoc` has no package.
    pub fn tool_call(&self) -> ClientResult<(&'static str, JsonObject)> {
        match self {
            Self::HelloWorld => Ok(("helloWorld", JsonObject::new())),
            Self::Godoc(args) => {
                if args.package.trim().is_empty() {
                    return Err(ClientError::validation(
                        "--package is required for godoc tool",
                    ));
                }

                let mut arguments = JsonObject::new();
                arguments.insert("package".into(), Value::String(args.package.clone()));
                if !args.symbol.is_empty() {
                    arguments.insert("symbol".into(), Value::String(args.symbol.clone()));
                }
                Ok(("godoc", arguments))
            }
        }
    }
}

/// Parse the command line, exiting 1 on usage errors and 0 for help/version.
pub fn parse_args<P: Parser>() -> P {
    P::try_parse().unwrap_or_else(|e| {
        let code = if e.use_stderr() { 1 } else { 0 };
        // Nothing better to do if stderr itself is gone.
        let _ = e.print();
        std::process::exit(code)
    })
}

/// Log to stderr so stdout carries only tool output.
///
/// Defaults to `warn`; `RUST_LOG` overrides.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Run `command` against `target`, printing the result to stdout.
pub async fn run(
    target: &ServerTarget,
    client_name: &str,
    command: &ToolCommand,
) -> anyhow::Result<()> {
    let (tool, arguments) = command.tool_call()?;
    let client = ClientIdentity::new(client_name, env!("CARGO_PKG_VERSION"));

    let mut stdout = std::io::stdout().lock();
    execute_tool(target, &client, tool, arguments, &mut stdout).await?;
    Ok(())
}
