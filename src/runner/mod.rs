//! Streaming turn orchestration.
//!
//! [`AgentRunner`] drives one conversation against a [`ChatModel`]: it
//! normalizes the stored history, opens the model stream, and fans events
//! out to caller-supplied handlers while recording telemetry. The runner
//! owns no transport and no tool execution; both sit behind the model,
//! which keeps this loop small enough to reason about ordering.

pub mod handlers;

pub use handlers::{
    MessageSink, ProductBuffer, TextSink, ToolOutcomeContext, ToolOutcomeHandler, TurnHandlers,
};

use std::sync::Arc;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::bridge::ToolDescriptor;
use crate::error::{Result, ShopchatError};
use crate::model::{ChatModel, TurnRequest};
use crate::normalize;
use crate::outcome::ToolOutcome;
use crate::telemetry::{self, Telemetry};
use crate::types::{
    AssistantMessage, IncomingMessage, NormalizedMessage, Role, StreamEvent, TokenUsage,
    ToolCompletion,
};

/// Orchestrates streaming turns for one conversation.
pub struct AgentRunner {
    model: Arc<dyn ChatModel>,
    telemetry: Arc<dyn Telemetry>,
    instructions: String,
    tools: Vec<ToolDescriptor>,
    conversation_id: String,
    products: ProductBuffer,
    cancel: CancellationToken,
}

impl AgentRunner {
    /// Create a runner recording into the global debug store.
    pub fn new(model: Arc<dyn ChatModel>, conversation_id: impl Into<String>) -> Self {
        Self {
            model,
            telemetry: telemetry::global(),
            instructions: String::new(),
            tools: Vec::new(),
            conversation_id: conversation_id.into(),
            products: ProductBuffer::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Record into a specific telemetry backend.
    pub fn with_telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// System instructions sent with every turn.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Tools offered to the model.
    pub fn with_tools(mut self, tools: Vec<ToolDescriptor>) -> Self {
        self.tools = tools;
        self
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that cancels in-flight turns when triggered.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Products surfaced by tool handlers during turns.
    pub fn products(&self) -> &ProductBuffer {
        &self.products
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Run one turn over the stored history.
    ///
    /// Tool turns are dropped from the replayed history; their content
    /// already reached the model inside the turn that produced them.
    /// Handlers are awaited before the next stream event is pulled.
    pub async fn run_turn(
        &self,
        history: &[IncomingMessage],
        handlers: &TurnHandlers,
    ) -> Result<AssistantMessage> {
        let replayable: Vec<IncomingMessage> = history
            .iter()
            .filter(|message| message.role != Role::Tool)
            .cloned()
            .collect();
        let normalized = Arc::new(normalize::normalize_messages(&replayable));

        let request = TurnRequest {
            instructions: self.instructions.clone(),
            messages: normalized.as_ref().clone(),
            tools: self.tools.clone(),
        };
        if let Some(text) = request.last_user_text() {
            self.telemetry
                .record_message(&self.conversation_id, Role::User, &text);
        }
        tracing::debug!(
            conversation_id = %self.conversation_id,
            turns = request.messages.len(),
            tools = request.tools.len(),
            "starting agent turn"
        );

        let mut stream = match self.model.stream_turn(&request).await {
            Ok(stream) => stream,
            Err(err) => {
                self.telemetry
                    .record_error(&self.conversation_id, err.kind(), &err.to_string());
                return Err(err);
            }
        };

        let mut streamed = String::new();
        let mut completion: Option<(String, Option<TokenUsage>)> = None;

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::debug!(conversation_id = %self.conversation_id, "agent turn canceled");
                    return Err(ShopchatError::Canceled);
                }
                event = stream.next() => {
                    let Some(event) = event else { break; };
                    match event {
                        Ok(StreamEvent::TextDelta { delta }) => {
                            if !delta.is_empty() {
                                if let Some(sink) = &handlers.text {
                                    sink.on_text(&delta);
                                }
                                streamed.push_str(&delta);
                            }
                        }
                        Ok(StreamEvent::ToolCallStarted { call_id, tool_name, arguments }) => {
                            tracing::debug!(
                                conversation_id = %self.conversation_id,
                                %tool_name,
                                %call_id,
                                "tool call started"
                            );
                            if let Some(handler) = &handlers.tool {
                                handler.on_started(&tool_name, &call_id, &arguments).await;
                            }
                        }
                        Ok(StreamEvent::ToolCallCompleted(record)) => {
                            self.handle_tool_completion(record, &normalized, handlers).await;
                        }
                        Ok(StreamEvent::Completed { final_text, usage }) => {
                            completion = Some((final_text, usage));
                            break;
                        }
                        Err(err) => {
                            self.telemetry
                                .record_error(&self.conversation_id, err.kind(), &err.to_string());
                            return Err(err);
                        }
                    }
                }
            }
        }

        let (final_text, usage) = completion.unwrap_or_else(|| {
            tracing::debug!(
                conversation_id = %self.conversation_id,
                "stream ended without a completion signal"
            );
            (streamed, None)
        });

        if let Some(usage) = usage {
            self.telemetry
                .record_token_usage(&self.conversation_id, usage.input, usage.output);
        }
        self.telemetry
            .record_message(&self.conversation_id, Role::Assistant, &final_text);

        let message = AssistantMessage::new(final_text);
        if let Some(sink) = &handlers.message {
            sink.on_message(&message);
        }
        tracing::debug!(
            conversation_id = %self.conversation_id,
            chars = message.content.len(),
            "agent turn complete"
        );
        Ok(message)
    }

    async fn handle_tool_completion(
        &self,
        record: ToolCompletion,
        history: &Arc<Vec<NormalizedMessage>>,
        handlers: &TurnHandlers,
    ) {
        let outcome = ToolOutcome::from_completion(&record);
        let success = !outcome.is_error();
        self.telemetry.record_tool_call(
            &self.conversation_id,
            &record.tool_name,
            &record.arguments,
            &outcome.result_value(),
            record.latency_ms.unwrap_or(0),
            success,
        );
        tracing::debug!(
            conversation_id = %self.conversation_id,
            tool_name = %record.tool_name,
            success,
            "tool call completed"
        );

        let Some(handler) = &handlers.tool else {
            return;
        };
        let ctx = ToolOutcomeContext {
            outcome,
            tool_name: record.tool_name,
            tool_call_id: record.call_id,
            history: Arc::clone(history),
            products: self.products.clone(),
            conversation_id: self.conversation_id.clone(),
        };
        if success {
            handler.on_success(ctx).await;
        } else {
            handler.on_error(ctx).await;
        }
    }
}
