//! Conversation diagnostics: bounded event feed, per-conversation records,
//! and the process-wide debug store.

pub mod event;
pub mod registry;
pub mod store;

pub use event::{Event, EventLog, EventPayload, MAX_EVENTS};
pub use registry::{
    Conversation, ConversationError, ConversationRegistry, ConversationStatus, GlobalStats,
    McpConnectionRecord, MessageRecord, ToolCallRecord, MAX_CONVERSATIONS,
};
pub use store::{global, DebugData, DebugStats, DebugStore, Telemetry};
