//! Streaming event types emitted by chat models.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use super::usage::TokenUsage;

/// An event emitted while a model turn is streaming.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Incremental assistant text.
    TextDelta { delta: String },
    /// The model began executing a tool.
    ToolCallStarted {
        call_id: String,
        tool_name: String,
        #[serde(default)]
        arguments: Value,
    },
    /// A tool call finished, successfully or not.
    ToolCallCompleted(ToolCompletion),
    /// The turn finished; carries the assembled reply.
    Completed {
        final_text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        usage: Option<TokenUsage>,
    },
}

/// Completion record for a single tool call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCompletion {
    pub call_id: String,
    pub tool_name: String,
    #[serde(default)]
    pub arguments: Value,
    pub status: CompletionStatus,
    /// Tool output, if any. Strings frequently contain serialized JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    /// Error payload reported alongside a non-success status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl ToolCompletion {
    /// Completion for a tool that produced `output` normally.
    pub fn succeeded(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        arguments: Value,
        output: Value,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            arguments,
            status: CompletionStatus::Completed,
            output: Some(output),
            error: None,
            latency_ms: None,
        }
    }

    /// Completion for a tool that ended in `status` with an optional output.
    pub fn ended(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        status: CompletionStatus,
        output: Option<Value>,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            arguments: Value::Null,
            status,
            output,
            error: None,
            latency_ms: None,
        }
    }
}

/// Terminal status reported for a tool call.
///
/// The set is open: runtimes add statuses over time, so anything
/// unrecognized lands in [`CompletionStatus::Unknown`] and is treated as a
/// success rather than dropped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CompletionStatus {
    Completed,
    Failed,
    Error,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl CompletionStatus {
    /// Whether this status denotes a failed call.
    pub fn is_error(self) -> bool {
        matches!(self, Self::Failed | Self::Error | Self::Cancelled)
    }
}
