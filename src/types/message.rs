//! Message types for agent conversations.
//!
//! Two message families live here. [`IncomingMessage`] is the loose shape
//! accepted from persistence and transport layers, where content may be a
//! plain string, an array of content blocks, or an arbitrary JSON value.
//! [`NormalizedMessage`] is the canonical shape handed to the model layer.
//! Conversion between the two happens in [`crate::normalize`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Conversation role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

/// A stored conversation turn in whatever shape the caller has it.
///
/// `content` is deliberately untyped: histories written by older builds mix
/// plain strings, block arrays, serialized envelopes, and nulls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncomingMessage {
    pub role: Role,
    #[serde(default)]
    pub content: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl IncomingMessage {
    /// Create a user turn with plain string content.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Value::String(text.into()),
            tool_call_id: None,
            name: None,
        }
    }

    /// Create an assistant turn with plain string content.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Value::String(text.into()),
            tool_call_id: None,
            name: None,
        }
    }

    /// Create a tool turn carrying an arbitrary result payload.
    pub fn tool(tool_call_id: impl Into<String>, content: Value) -> Self {
        Self {
            role: Role::Tool,
            content,
            tool_call_id: Some(tool_call_id.into()),
            name: None,
        }
    }
}

/// A single canonical content block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    InputText { text: String },
    OutputText { text: String },
}

impl ContentBlock {
    /// The text carried by this block.
    pub fn text(&self) -> &str {
        match self {
            Self::InputText { text } | Self::OutputText { text } => text,
        }
    }
}

/// A conversation turn in the canonical shape the model layer consumes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum NormalizedMessage {
    User {
        content: Vec<ContentBlock>,
    },
    Assistant {
        content: Vec<ContentBlock>,
    },
    Tool {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_call_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        content: String,
    },
}

impl NormalizedMessage {
    /// Create a canonical user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self::User {
            content: vec![ContentBlock::InputText { text: text.into() }],
        }
    }

    /// Create a canonical assistant turn.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::Assistant {
            content: vec![ContentBlock::OutputText { text: text.into() }],
        }
    }

    /// The role of this turn.
    pub fn role(&self) -> Role {
        match self {
            Self::User { .. } => Role::User,
            Self::Assistant { .. } => Role::Assistant,
            Self::Tool { .. } => Role::Tool,
        }
    }

    /// Extract the text content, concatenating all blocks.
    pub fn text(&self) -> String {
        match self {
            Self::User { content } | Self::Assistant { content } => {
                content.iter().map(ContentBlock::text).collect()
            }
            Self::Tool { content, .. } => content.clone(),
        }
    }
}

/// The assistant reply produced by a completed turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantMessage {
    pub role: Role,
    pub content: String,
}

impl AssistantMessage {
    /// Wrap final reply text in the shape delivered to message sinks.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
