//! Debug event feed.
//!
//! Every recording operation emits one [`Event`] into a bounded,
//! newest-first [`EventLog`]. The log is a diagnostic window, not an audit
//! trail: once more than [`MAX_EVENTS`] events arrive, the oldest fall off.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::bridge::McpServerKind;
use crate::types::Role;

/// Maximum number of events retained.
pub const MAX_EVENTS: usize = 100;

/// One recorded debug event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl Event {
    /// Stamp a payload with a fresh id and the current time.
    pub fn new(payload: EventPayload) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            timestamp: Utc::now(),
            payload,
        }
    }

    /// The wire name of this event's type.
    pub fn kind(&self) -> &'static str {
        self.payload.kind()
    }
}

/// Typed payload of a debug event.
///
/// Field names serialize in camelCase to match the debug dashboard wire
/// format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum EventPayload {
    ConversationStart {
        conversation_id: String,
        shop_domain: String,
    },
    ConversationEnd {
        conversation_id: String,
        total_latency_ms: u64,
    },
    McpConnection {
        conversation_id: String,
        server_type: McpServerKind,
        server_url: String,
        tool_count: usize,
        latency_ms: u64,
    },
    ToolCall {
        conversation_id: String,
        tool_name: String,
        tool_args: Value,
        latency_ms: u64,
        success: bool,
        result_preview: String,
    },
    TokenUsage {
        conversation_id: String,
        input_tokens: u64,
        output_tokens: u64,
        total_tokens: u64,
    },
    Message {
        conversation_id: String,
        role: Role,
        content_preview: String,
    },
    Error {
        conversation_id: String,
        error_type: String,
        error_message: String,
    },
}

impl EventPayload {
    /// The wire name of this payload's type.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConversationStart { .. } => "conversation_start",
            Self::ConversationEnd { .. } => "conversation_end",
            Self::McpConnection { .. } => "mcp_connection",
            Self::ToolCall { .. } => "tool_call",
            Self::TokenUsage { .. } => "token_usage",
            Self::Message { .. } => "message",
            Self::Error { .. } => "error",
        }
    }
}

/// Bounded, newest-first event buffer.
#[derive(Debug, Clone)]
pub struct EventLog {
    events: VecDeque<Event>,
    capacity: usize,
}

impl EventLog {
    pub fn new() -> Self {
        Self::with_capacity(MAX_EVENTS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record an event, evicting the oldest when full.
    pub fn append(&mut self, event: Event) {
        self.events.push_front(event);
        self.events.truncate(self.capacity);
    }

    /// Up to `limit` events, newest first.
    pub fn snapshot(&self, limit: usize) -> Vec<Event> {
        self.events.iter().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn usage_event(conversation_id: &str, input_tokens: u64) -> Event {
        Event::new(EventPayload::TokenUsage {
            conversation_id: conversation_id.into(),
            input_tokens,
            output_tokens: 0,
            total_tokens: input_tokens,
        })
    }

    #[test]
    fn append_keeps_newest_first_and_caps_length() {
        let mut log = EventLog::new();
        for i in 0..150 {
            log.append(usage_event("c1", i));
        }
        assert_eq!(log.len(), MAX_EVENTS);

        let snapshot = log.snapshot(MAX_EVENTS);
        match &snapshot[0].payload {
            EventPayload::TokenUsage { input_tokens, .. } => assert_eq!(*input_tokens, 149),
            other => panic!("unexpected payload: {other:?}"),
        }
        match &snapshot[MAX_EVENTS - 1].payload {
            EventPayload::TokenUsage { input_tokens, .. } => assert_eq!(*input_tokens, 50),
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn snapshot_respects_limit() {
        let mut log = EventLog::new();
        for i in 0..5 {
            log.append(usage_event("c1", i));
        }
        let snapshot = log.snapshot(3);
        assert_eq!(snapshot.len(), 3);
        match &snapshot[0].payload {
            EventPayload::TokenUsage { input_tokens, .. } => assert_eq!(*input_tokens, 4),
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn event_ids_are_unique() {
        let a = usage_event("c1", 1);
        let b = usage_event("c1", 1);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn clear_empties_the_log() {
        let mut log = EventLog::new();
        log.append(usage_event("c1", 1));
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn payload_serializes_with_type_tag_and_camel_case_fields() {
        let event = Event::new(EventPayload::ToolCall {
            conversation_id: "c1".into(),
            tool_name: "search_shop_catalog".into(),
            tool_args: json!({"query": "boots"}),
            latency_ms: 120,
            success: true,
            result_preview: "{\"products\":[]}".into(),
        });
        assert_eq!(event.kind(), "tool_call");

        let wire = serde_json::to_value(&event).unwrap();
        assert_eq!(wire["type"], "tool_call");
        assert_eq!(wire["conversationId"], "c1");
        assert_eq!(wire["toolName"], "search_shop_catalog");
        assert_eq!(wire["resultPreview"], "{\"products\":[]}");
        assert!(wire.get("id").is_some());
        assert!(wire.get("timestamp").is_some());
    }
}
