//! Printing tool results.

use serde_json::Value;
use std::io::{self, Write};
use tracing::warn;

use super::ToolCallOutcome;

/// Write `outcome` to `out`.
///
/// Text items are printed raw, one per line, in order. Any other item prints
/// as `Received content of type <type>: <json>`. The structured payload, if
/// present, follows as indented JSON.
pub fn render_outcome<W: Write>(outcome: &ToolCallOutcome, out: &mut W) -> io::Result<()> {
    for item in &outcome.content {
        match text_of(item) {
            Some(text) => writeln!(out, "{}", text)?,
            None => writeln!(
                out,
                "Received content of type {}: {}",
                kind_of(item),
                item
            )?,
        }
    }

    if let Some(structured) = &outcome.structured_content {
        match serde_json::to_string_pretty(structured) {
            Ok(pretty) => writeln!(out, "{}", pretty)?,
            Err(e) => {
                warn!("Failed to format structured content: {}", e);
                writeln!(out, "Structured Content: {:?}", structured)?;
            }
        }
    }

    Ok(())
}

fn text_of(item: &Value) -> Option<&str> {
    if item.get("type").and_then(Value::as_str) != Some("text") {
        return None;
    }
    item.get("text").and_then(Value::as_str)
}

fn kind_of(item: &Value) -> &str {
    item.get("type").and_then(Value::as_str).unwrap_or("unknown")
}
