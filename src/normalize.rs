//! Conversion of stored conversation turns into the canonical model shape.
//!
//! Histories loaded from persistence are structurally messy: content may be
//! a plain string, an array of content blocks, a serialized tool envelope,
//! or null. This module is the single parsing boundary that turns all of
//! those into [`NormalizedMessage`] values. Normalization is total and
//! idempotent: it never fails, and feeding its output back in produces the
//! same result.

use serde_json::Value;

use crate::types::{IncomingMessage, NormalizedMessage, Role};

/// Normalize a full history, preserving order.
pub fn normalize_messages(messages: &[IncomingMessage]) -> Vec<NormalizedMessage> {
    messages.iter().map(normalize_message).collect()
}

/// Normalize one turn.
pub fn normalize_message(message: &IncomingMessage) -> NormalizedMessage {
    match message.role {
        Role::User => NormalizedMessage::user(extract_text(&message.content)),
        Role::Assistant => NormalizedMessage::assistant(extract_text(&message.content)),
        Role::Tool => normalize_tool_message(message),
    }
}

/// Flatten arbitrary content into plain text.
///
/// Strings pass through, block arrays concatenate their `text` fields,
/// null becomes empty, and anything else is serialized as JSON.
fn extract_text(content: &Value) -> String {
    match content {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        Value::Array(blocks) => blocks
            .iter()
            .map(|block| block.get("text").and_then(Value::as_str).unwrap_or_default())
            .collect(),
        other => other.to_string(),
    }
}

fn normalize_tool_message(message: &IncomingMessage) -> NormalizedMessage {
    let mut tool_call_id = message.tool_call_id.clone();
    let mut name = message.name.clone();

    let content = match &message.content {
        // Older builds persisted the whole tool envelope as a JSON string.
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(parsed) if is_tool_envelope(&parsed) => {
                adopt_envelope_fields(&parsed, &mut tool_call_id, &mut name);
                extract_text(parsed.get("content").unwrap_or(&Value::Null))
            }
            _ => raw.clone(),
        },
        value if is_tool_envelope(value) => {
            adopt_envelope_fields(value, &mut tool_call_id, &mut name);
            extract_text(value.get("content").unwrap_or(&Value::Null))
        }
        value => extract_text(value),
    };

    NormalizedMessage::Tool {
        tool_call_id,
        name,
        content,
    }
}

/// Whether `value` looks like a wrapped tool result rather than tool output.
fn is_tool_envelope(value: &Value) -> bool {
    if value.get("role").and_then(Value::as_str) != Some("tool") {
        return false;
    }
    match value.get("tool_call_id") {
        Some(Value::String(id)) => !id.is_empty(),
        Some(Value::Number(_)) => true,
        _ => false,
    }
}

/// Fill missing identifiers from the envelope. Explicit top-level fields win.
fn adopt_envelope_fields(
    envelope: &Value,
    tool_call_id: &mut Option<String>,
    name: &mut Option<String>,
) {
    if tool_call_id.is_none() {
        *tool_call_id = envelope
            .get("tool_call_id")
            .and_then(Value::as_str)
            .map(str::to_owned);
    }
    if name.is_none() {
        *name = envelope
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_owned);
    }
}
