//! End-to-end: the stdio client and `godoctor-cli` against the server binary.

#![cfg(feature = "stdio")]

use std::process::Command;

use godoctor::client::{ClientIdentity, ClientSession, ServerTarget, execute_tool};
use rmcp::model::JsonObject;

const SERVER: &str = env!("CARGO_BIN_EXE_godoctor");
const CLI: &str = env!("CARGO_BIN_EXE_godoctor-cli");

fn stdio_target() -> ServerTarget {
    ServerTarget::command(SERVER)
}

#[tokio::test]
async fn hello_world_over_stdio() {
    let mut out = Vec::new();

    execute_tool(
        &stdio_target(),
        &ClientIdentity::new("roundtrip", "0.0.0"),
        "helloWorld",
        JsonObject::new(),
        &mut out,
    )
    .await
    .unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Hello, World!\n{\n  \"message\": \"Hello, World!\"\n}\n"
    );
}

#[tokio::test]
async fn stdio_server_lists_both_tools() {
    let channel = stdio_target().open().unwrap();
    let mut session = ClientSession::connect(channel, &ClientIdentity::new("roundtrip", "0.0.0"))
        .await
        .unwrap();

    let tools = session.list_tools().await.unwrap();
    let mut names: Vec<&str> = tools.iter().map(|t| &*t.name).collect();
    names.sort_unstable();
    assert_eq!(names, ["godoc", "helloWorld"]);

    session.close().await.unwrap();
}

#[test]
fn cli_prints_hello_world() {
    let output = Command::new(CLI)
        .args(["--server-cmd", SERVER, "helloWorld"])
        .env_remove("MCP_TRANSPORT")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().next(), Some("Hello, World!"));
}

#[test]
fn cli_failing_godoc_prints_error_and_exits_0() {
    let output = Command::new(CLI)
        .args(["--server-cmd", SERVER, "godoc", "--package", "doesnotexist123"])
        .env_remove("MCP_TRANSPORT")
        .env("MCP_DOC_COMMAND", "false")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().next(), Some("{"), "no text line expected: {stdout}");

    let structured: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let error = structured["error"].as_str().unwrap();
    assert!(!error.is_empty());
    assert_eq!(structured["output"], "");
}

#[test]
fn cli_godoc_missing_program_reports_launch_failure() {
    let output = Command::new(CLI)
        .args(["--server-cmd", SERVER, "godoc", "-p", "fmt"])
        .env_remove("MCP_TRANSPORT")
        .env("MCP_DOC_COMMAND", "/nonexistent/go")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("\"error\": \"failed to launch /nonexistent/go"));
}

#[test]
fn cli_godoc_without_package_exits_1() {
    let output = Command::new(CLI)
        .args(["--server-cmd", SERVER, "godoc"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("--package is required for godoc tool"));
}

#[test]
fn cli_unknown_subcommand_exits_1() {
    let output = Command::new(CLI).arg("nope").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn cli_missing_server_fails() {
    let output = Command::new(CLI)
        .args(["--server-cmd", "/nonexistent/godoctor", "helloWorld"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Failed to connect to MCP server"));
}
