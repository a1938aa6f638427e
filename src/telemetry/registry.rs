//! Per-conversation debug records.
//!
//! The registry tracks a bounded window of conversations in insertion
//! order plus process-lifetime counters. When the window is full the
//! oldest conversation is evicted regardless of activity, so recording
//! functions must tolerate ids that are no longer (or never were)
//! tracked: they no-op rather than fail, since telemetry must never take
//! down the chat path it observes.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::Display;

use crate::bridge::McpServerKind;
use crate::types::{Role, TokenUsage};

/// Maximum number of conversations retained.
pub const MAX_CONVERSATIONS: usize = 50;

/// Characters of message content kept in previews.
pub(crate) const MESSAGE_PREVIEW_CHARS: usize = 100;

/// Characters of a tool result kept on the conversation record.
pub(crate) const STORED_RESULT_CHARS: usize = 500;

/// Lifecycle state of a tracked conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConversationStatus {
    Active,
    Completed,
    Error,
}

/// A message observed during a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub role: Role,
    pub content_preview: String,
    pub timestamp: DateTime<Utc>,
}

/// A tool call observed during a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallRecord {
    pub tool_name: String,
    pub tool_args: Value,
    pub result: String,
    pub latency_ms: u64,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

/// A tool-server connection observed during a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct McpConnectionRecord {
    pub server_type: McpServerKind,
    pub server_url: String,
    pub tool_count: usize,
    pub latency_ms: u64,
    pub timestamp: DateTime<Utc>,
}

/// Terminal error recorded on a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationError {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

/// Everything tracked about one conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub shop_domain: String,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub messages: Vec<MessageRecord>,
    pub tool_calls: Vec<ToolCallRecord>,
    pub mcp_connections: Vec<McpConnectionRecord>,
    pub token_usage: TokenUsage,
    pub status: ConversationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_latency_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ConversationError>,
}

impl Conversation {
    fn new(id: &str, shop_domain: &str) -> Self {
        Self {
            id: id.to_string(),
            shop_domain: shop_domain.to_string(),
            start_time: Utc::now(),
            end_time: None,
            messages: Vec::new(),
            tool_calls: Vec::new(),
            mcp_connections: Vec::new(),
            token_usage: TokenUsage::default(),
            status: ConversationStatus::Active,
            total_latency_ms: None,
            error: None,
        }
    }
}

/// Process-lifetime counters, independent of conversation eviction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub total_tokens_in: u64,
    pub total_tokens_out: u64,
    pub total_tool_calls: u64,
    pub total_conversations: u64,
}

/// Bounded map of conversations plus global counters.
#[derive(Debug, Clone)]
pub struct ConversationRegistry {
    conversations: IndexMap<String, Conversation>,
    stats: GlobalStats,
    capacity: usize,
}

impl ConversationRegistry {
    pub fn new() -> Self {
        Self::with_capacity(MAX_CONVERSATIONS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            conversations: IndexMap::with_capacity(capacity),
            stats: GlobalStats::default(),
            capacity,
        }
    }

    /// Begin tracking a conversation, evicting the oldest when full.
    pub fn start(&mut self, conversation_id: &str, shop_domain: &str) {
        self.conversations.insert(
            conversation_id.to_string(),
            Conversation::new(conversation_id, shop_domain),
        );
        self.stats.total_conversations += 1;
        while self.conversations.len() > self.capacity {
            self.conversations.shift_remove_index(0);
        }
    }

    /// Append a message preview to a tracked conversation.
    pub fn record_message(&mut self, conversation_id: &str, role: Role, content: &str) {
        if let Some(conversation) = self.entry(conversation_id) {
            conversation.messages.push(MessageRecord {
                role,
                content_preview: preview_chars(content, MESSAGE_PREVIEW_CHARS),
                timestamp: Utc::now(),
            });
        }
    }

    /// Record a tool call. The global counter moves even when the
    /// conversation itself is gone.
    pub fn record_tool_call(
        &mut self,
        conversation_id: &str,
        tool_name: &str,
        tool_args: &Value,
        result: &Value,
        latency_ms: u64,
        success: bool,
    ) {
        if let Some(conversation) = self.entry(conversation_id) {
            conversation.tool_calls.push(ToolCallRecord {
                tool_name: tool_name.to_string(),
                tool_args: tool_args.clone(),
                result: truncate_result(result),
                latency_ms,
                success,
                timestamp: Utc::now(),
            });
        }
        self.stats.total_tool_calls += 1;
    }

    /// Accumulate token usage on the conversation and the global counters.
    pub fn record_token_usage(
        &mut self,
        conversation_id: &str,
        input_tokens: u64,
        output_tokens: u64,
    ) {
        if let Some(conversation) = self.entry(conversation_id) {
            conversation.token_usage.add(input_tokens, output_tokens);
        }
        self.stats.total_tokens_in += input_tokens;
        self.stats.total_tokens_out += output_tokens;
    }

    /// Record a tool-server connection on a tracked conversation.
    pub fn record_mcp_connection(
        &mut self,
        conversation_id: &str,
        server_type: McpServerKind,
        server_url: &str,
        tool_count: usize,
        latency_ms: u64,
    ) {
        if let Some(conversation) = self.entry(conversation_id) {
            conversation.mcp_connections.push(McpConnectionRecord {
                server_type,
                server_url: server_url.to_string(),
                tool_count,
                latency_ms,
                timestamp: Utc::now(),
            });
        }
    }

    /// Close out a conversation. An error status is sticky and survives
    /// the close.
    pub fn end(&mut self, conversation_id: &str, total_latency_ms: u64) {
        if let Some(conversation) = self.entry(conversation_id) {
            conversation.end_time = Some(Utc::now());
            conversation.total_latency_ms = Some(total_latency_ms);
            if conversation.status != ConversationStatus::Error {
                conversation.status = ConversationStatus::Completed;
            }
        }
    }

    /// Mark a conversation failed.
    pub fn record_error(&mut self, conversation_id: &str, error_type: &str, error_message: &str) {
        if let Some(conversation) = self.entry(conversation_id) {
            conversation.status = ConversationStatus::Error;
            conversation.error = Some(ConversationError {
                kind: error_type.to_string(),
                message: error_message.to_string(),
            });
        }
    }

    pub fn get(&self, conversation_id: &str) -> Option<&Conversation> {
        self.conversations.get(conversation_id)
    }

    /// Up to `limit` conversations, most recently started first.
    pub fn recent(&self, limit: usize) -> Vec<Conversation> {
        let mut indexed: Vec<(usize, &Conversation)> =
            self.conversations.values().enumerate().collect();
        // Insertion index breaks start-time ties so the order stays stable
        // on coarse clocks.
        indexed.sort_by(|(left_idx, left), (right_idx, right)| {
            right
                .start_time
                .cmp(&left.start_time)
                .then(right_idx.cmp(left_idx))
        });
        indexed
            .into_iter()
            .take(limit)
            .map(|(_, conversation)| conversation.clone())
            .collect()
    }

    /// How many tracked conversations are still active.
    pub fn active_count(&self) -> usize {
        self.conversations
            .values()
            .filter(|conversation| conversation.status == ConversationStatus::Active)
            .count()
    }

    pub fn stats(&self) -> GlobalStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Drop all conversations and reset the global counters.
    pub fn clear(&mut self) {
        self.conversations.clear();
        self.stats = GlobalStats::default();
    }

    fn entry(&mut self, conversation_id: &str) -> Option<&mut Conversation> {
        let conversation = self.conversations.get_mut(conversation_id);
        if conversation.is_none() {
            tracing::trace!(conversation_id, "telemetry for untracked conversation");
        }
        conversation
    }
}

impl Default for ConversationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// First `limit` characters of `text`, boundary-safe.
pub(crate) fn preview_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Render a result value for display. Strings pass through, everything
/// else serializes as JSON.
pub(crate) fn display_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn truncate_result(value: &Value) -> String {
    let text = display_string(value);
    if text.chars().count() > STORED_RESULT_CHARS {
        let mut truncated: String = text.chars().take(STORED_RESULT_CHARS).collect();
        truncated.push_str("...");
        truncated
    } else {
        text
    }
}
