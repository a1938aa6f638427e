//! Chat model trait and request types.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::bridge::ToolDescriptor;
use crate::error::Result;
use crate::types::{NormalizedMessage, StreamEvent};

/// Stream of turn events produced by a model.
pub type EventStream = BoxStream<'static, Result<StreamEvent>>;

/// A request sent to a chat model for one turn.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    /// System instructions for the turn.
    pub instructions: String,
    /// Canonical conversation history, oldest first.
    pub messages: Vec<NormalizedMessage>,
    /// Tools the model may call during the turn.
    pub tools: Vec<ToolDescriptor>,
}

impl TurnRequest {
    /// Last user turn in the request, if any.
    pub fn last_user_text(&self) -> Option<String> {
        self.messages.iter().rev().find_map(|message| match message {
            NormalizedMessage::User { .. } => Some(message.text()),
            _ => None,
        })
    }
}

/// Core trait implemented by chat model backends.
///
/// Implementations own the transport and the tool-execution loop; the
/// caller only observes the resulting [`StreamEvent`] sequence. A stream
/// should end with [`StreamEvent::Completed`], but consumers tolerate
/// streams that simply end.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one turn, streaming events as they happen.
    async fn stream_turn(&self, request: &TurnRequest) -> Result<EventStream>;
}
