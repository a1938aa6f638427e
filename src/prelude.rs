//! Convenience re-exports for common use.

pub use crate::bridge::{enforce_strict_schema, McpServerKind, ToolBridge, ToolDescriptor};
pub use crate::config::ShopchatConfig;
pub use crate::error::{Result, ShopchatError};
pub use crate::model::{ChatModel, EventStream, TurnRequest};
pub use crate::normalize::{normalize_message, normalize_messages};
pub use crate::outcome::{OutcomeText, ToolErrorPayload, ToolOutcome};
pub use crate::runner::{
    AgentRunner, MessageSink, ProductBuffer, TextSink, ToolOutcomeContext, ToolOutcomeHandler,
    TurnHandlers,
};
pub use crate::telemetry::{
    Conversation, ConversationStatus, DebugData, DebugStats, DebugStore, Event, EventPayload,
    Telemetry,
};
pub use crate::types::{
    AssistantMessage, CompletionStatus, ContentBlock, IncomingMessage, NormalizedMessage, Role,
    StreamEvent, TokenUsage, ToolCompletion,
};
