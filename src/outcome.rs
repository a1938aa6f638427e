//! Translation of tool completion records into handler-facing outcomes.
//!
//! Runtimes report tool results in a loose shape: output may be a JSON
//! string, a structured value, or missing entirely, and failures surface
//! through a status field. [`ToolOutcome::from_completion`] folds all of
//! that into either a text payload or a structured error, without ever
//! failing itself.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::types::ToolCompletion;

/// Result of a tool call as seen by outcome handlers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ToolOutcome {
    Success { content: Vec<OutcomeText> },
    Error { error: ToolErrorPayload },
}

/// One text entry in a successful outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutcomeText {
    pub text: String,
}

/// Structured error carried by a failed outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolErrorPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Value,
}

impl ToolOutcome {
    /// Translate a completion record into an outcome.
    pub fn from_completion(completion: &ToolCompletion) -> Self {
        if completion.status.is_error() {
            return Self::Error {
                error: error_payload(completion),
            };
        }

        let text = match &completion.output {
            Some(Value::String(text)) => text.clone(),
            Some(value) if !value.is_null() => value.to_string(),
            _ => "{}".to_string(),
        };
        Self::Success {
            content: vec![OutcomeText { text }],
        }
    }

    /// Whether this outcome represents a failed call.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// The value recorded into debug telemetry for this outcome.
    pub fn result_value(&self) -> Value {
        match self {
            Self::Success { content } => Value::String(
                content
                    .iter()
                    .map(|entry| entry.text.as_str())
                    .collect::<String>(),
            ),
            Self::Error { error } => serde_json::to_value(error).unwrap_or(Value::Null),
        }
    }
}

fn error_payload(completion: &ToolCompletion) -> ToolErrorPayload {
    let data = match &completion.output {
        // A string output frequently holds serialized error JSON; decode it
        // when possible, otherwise keep the raw string.
        Some(Value::String(raw)) => {
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone()))
        }
        Some(value) if !value.is_null() => value.clone(),
        _ => match &completion.error {
            Some(error) if !error.is_null() => error.clone(),
            _ => json!({"status": completion.status.to_string()}),
        },
    };

    let kind = data
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("tool_error")
        .to_string();

    ToolErrorPayload { kind, data }
}
