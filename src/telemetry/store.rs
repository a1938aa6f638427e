//! Process-wide debug store.
//!
//! [`DebugStore`] owns the event log and the conversation registry behind
//! one mutex, so every recording operation lands in both atomically. The
//! [`Telemetry`] trait is the recording surface handed to the runner and
//! transport layers; production code normally uses the [`global`] store,
//! tests build their own.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bridge::McpServerKind;
use crate::types::Role;

use super::event::{Event, EventLog, EventPayload};
use super::registry::{
    display_string, preview_chars, Conversation, ConversationRegistry, GlobalStats,
    MESSAGE_PREVIEW_CHARS,
};

/// Conversations returned in a debug snapshot.
const DEBUG_CONVERSATION_LIMIT: usize = 20;

/// Events returned in a debug snapshot.
const DEBUG_EVENT_LIMIT: usize = 50;

/// Characters of a tool result kept on the emitted event.
const EVENT_RESULT_PREVIEW_CHARS: usize = 200;

/// Global counters plus the live-conversation gauge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DebugStats {
    pub total_tokens_in: u64,
    pub total_tokens_out: u64,
    pub total_tool_calls: u64,
    pub total_conversations: u64,
    pub active_conversations: usize,
}

impl DebugStats {
    fn capture(stats: GlobalStats, active_conversations: usize) -> Self {
        Self {
            total_tokens_in: stats.total_tokens_in,
            total_tokens_out: stats.total_tokens_out,
            total_tool_calls: stats.total_tool_calls,
            total_conversations: stats.total_conversations,
            active_conversations,
        }
    }
}

/// Snapshot served to the debug dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DebugData {
    pub stats: DebugStats,
    pub conversations: Vec<Conversation>,
    pub recent_events: Vec<Event>,
}

/// Recording surface for conversation diagnostics.
///
/// Implementations must never fail or panic: telemetry runs inside the
/// chat path and is strictly best-effort.
pub trait Telemetry: Send + Sync {
    fn record_conversation_start(&self, conversation_id: &str, shop_domain: &str);

    fn record_mcp_connection(
        &self,
        conversation_id: &str,
        server_type: McpServerKind,
        server_url: &str,
        tool_count: usize,
        latency_ms: u64,
    );

    fn record_tool_call(
        &self,
        conversation_id: &str,
        tool_name: &str,
        tool_args: &Value,
        result: &Value,
        latency_ms: u64,
        success: bool,
    );

    fn record_token_usage(&self, conversation_id: &str, input_tokens: u64, output_tokens: u64);

    fn record_message(&self, conversation_id: &str, role: Role, content: &str);

    fn record_conversation_end(&self, conversation_id: &str, total_latency_ms: u64);

    fn record_error(&self, conversation_id: &str, error_type: &str, error_message: &str);

    /// Current record for one conversation, if still tracked.
    fn conversation(&self, conversation_id: &str) -> Option<Conversation>;

    /// Snapshot of recent activity for the debug dashboard.
    fn debug_data(&self) -> DebugData;

    /// Drop all recorded data.
    fn clear(&self);
}

/// In-memory [`Telemetry`] backend.
#[derive(Debug, Default)]
pub struct DebugStore {
    inner: Mutex<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    events: EventLog,
    registry: ConversationRegistry,
}

impl DebugStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Telemetry stays usable even if a writer panicked mid-record.
    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Telemetry for DebugStore {
    fn record_conversation_start(&self, conversation_id: &str, shop_domain: &str) {
        let mut inner = self.lock();
        inner.registry.start(conversation_id, shop_domain);
        inner.events.append(Event::new(EventPayload::ConversationStart {
            conversation_id: conversation_id.to_string(),
            shop_domain: shop_domain.to_string(),
        }));
    }

    fn record_mcp_connection(
        &self,
        conversation_id: &str,
        server_type: McpServerKind,
        server_url: &str,
        tool_count: usize,
        latency_ms: u64,
    ) {
        let mut inner = self.lock();
        inner.registry.record_mcp_connection(
            conversation_id,
            server_type,
            server_url,
            tool_count,
            latency_ms,
        );
        inner.events.append(Event::new(EventPayload::McpConnection {
            conversation_id: conversation_id.to_string(),
            server_type,
            server_url: server_url.to_string(),
            tool_count,
            latency_ms,
        }));
    }

    fn record_tool_call(
        &self,
        conversation_id: &str,
        tool_name: &str,
        tool_args: &Value,
        result: &Value,
        latency_ms: u64,
        success: bool,
    ) {
        let mut inner = self.lock();
        inner
            .registry
            .record_tool_call(conversation_id, tool_name, tool_args, result, latency_ms, success);
        inner.events.append(Event::new(EventPayload::ToolCall {
            conversation_id: conversation_id.to_string(),
            tool_name: tool_name.to_string(),
            tool_args: tool_args.clone(),
            latency_ms,
            success,
            result_preview: preview_chars(&display_string(result), EVENT_RESULT_PREVIEW_CHARS),
        }));
    }

    fn record_token_usage(&self, conversation_id: &str, input_tokens: u64, output_tokens: u64) {
        let mut inner = self.lock();
        inner
            .registry
            .record_token_usage(conversation_id, input_tokens, output_tokens);
        inner.events.append(Event::new(EventPayload::TokenUsage {
            conversation_id: conversation_id.to_string(),
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
        }));
    }

    fn record_message(&self, conversation_id: &str, role: Role, content: &str) {
        let mut inner = self.lock();
        inner.registry.record_message(conversation_id, role, content);
        inner.events.append(Event::new(EventPayload::Message {
            conversation_id: conversation_id.to_string(),
            role,
            content_preview: preview_chars(content, MESSAGE_PREVIEW_CHARS),
        }));
    }

    fn record_conversation_end(&self, conversation_id: &str, total_latency_ms: u64) {
        let mut inner = self.lock();
        inner.registry.end(conversation_id, total_latency_ms);
        inner.events.append(Event::new(EventPayload::ConversationEnd {
            conversation_id: conversation_id.to_string(),
            total_latency_ms,
        }));
    }

    fn record_error(&self, conversation_id: &str, error_type: &str, error_message: &str) {
        let mut inner = self.lock();
        inner
            .registry
            .record_error(conversation_id, error_type, error_message);
        inner.events.append(Event::new(EventPayload::Error {
            conversation_id: conversation_id.to_string(),
            error_type: error_type.to_string(),
            error_message: error_message.to_string(),
        }));
    }

    fn conversation(&self, conversation_id: &str) -> Option<Conversation> {
        self.lock().registry.get(conversation_id).cloned()
    }

    fn debug_data(&self) -> DebugData {
        let inner = self.lock();
        DebugData {
            stats: DebugStats::capture(inner.registry.stats(), inner.registry.active_count()),
            conversations: inner.registry.recent(DEBUG_CONVERSATION_LIMIT),
            recent_events: inner.events.snapshot(DEBUG_EVENT_LIMIT),
        }
    }

    fn clear(&self) {
        let mut inner = self.lock();
        inner.registry.clear();
        inner.events.clear();
        tracing::debug!("debug telemetry cleared");
    }
}

static GLOBAL_STORE: OnceLock<Arc<DebugStore>> = OnceLock::new();

/// Get (or create) the process-wide debug store.
pub fn global() -> Arc<DebugStore> {
    GLOBAL_STORE.get_or_init(|| Arc::new(DebugStore::new())).clone()
}
