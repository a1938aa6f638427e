//! Caller-supplied callbacks for a streaming turn.
//!
//! Transport layers hand the runner small sinks instead of subscribing to
//! an event bus: text deltas and the final message are synchronous
//! callbacks, tool outcomes get an async handler that the runner awaits
//! before pulling the next stream event, so side effects land in order.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::outcome::ToolOutcome;
use crate::types::{AssistantMessage, NormalizedMessage};

/// Receives incremental assistant text.
pub trait TextSink: Send + Sync {
    fn on_text(&self, delta: &str);
}

impl<F> TextSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_text(&self, delta: &str) {
        self(delta)
    }
}

/// Receives the final assistant message of a turn.
pub trait MessageSink: Send + Sync {
    fn on_message(&self, message: &AssistantMessage);
}

impl<F> MessageSink for F
where
    F: Fn(&AssistantMessage) + Send + Sync,
{
    fn on_message(&self, message: &AssistantMessage) {
        self(message)
    }
}

/// Shared buffer of product payloads surfaced by tool handlers.
///
/// Handlers push products as tool results arrive; the caller drains the
/// buffer after the turn to build the product rail.
#[derive(Debug, Clone, Default)]
pub struct ProductBuffer {
    inner: Arc<Mutex<Vec<Value>>>,
}

impl ProductBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, product: Value) {
        self.lock().push(product);
    }

    pub fn extend(&self, products: impl IntoIterator<Item = Value>) {
        self.lock().extend(products);
    }

    /// Take everything accumulated so far.
    pub fn drain(&self) -> Vec<Value> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Value>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Everything a tool handler needs to react to one outcome.
#[derive(Debug, Clone)]
pub struct ToolOutcomeContext {
    pub outcome: ToolOutcome,
    pub tool_name: String,
    pub tool_call_id: String,
    /// Canonical history the turn was started with.
    pub history: Arc<Vec<NormalizedMessage>>,
    pub products: ProductBuffer,
    pub conversation_id: String,
}

/// Reacts to tool calls as they start and finish.
#[async_trait]
pub trait ToolOutcomeHandler: Send + Sync {
    /// Called when the model begins a tool call. Default: ignore.
    async fn on_started(&self, _tool_name: &str, _call_id: &str, _arguments: &Value) {}

    /// Called for each successful tool call.
    async fn on_success(&self, ctx: ToolOutcomeContext);

    /// Called for each failed tool call.
    async fn on_error(&self, ctx: ToolOutcomeContext);
}

/// Optional callbacks for one turn.
#[derive(Clone, Default)]
pub struct TurnHandlers {
    pub text: Option<Arc<dyn TextSink>>,
    pub message: Option<Arc<dyn MessageSink>>,
    pub tool: Option<Arc<dyn ToolOutcomeHandler>>,
}

impl TurnHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, sink: Arc<dyn TextSink>) -> Self {
        self.text = Some(sink);
        self
    }

    pub fn with_message(mut self, sink: Arc<dyn MessageSink>) -> Self {
        self.message = Some(sink);
        self
    }

    pub fn with_tool(mut self, handler: Arc<dyn ToolOutcomeHandler>) -> Self {
        self.tool = Some(handler);
        self
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn closures_are_text_sinks() {
        let seen = Arc::new(Mutex::new(String::new()));
        let sink_target = Arc::clone(&seen);
        let handlers = TurnHandlers::new().with_text(Arc::new(move |delta: &str| {
            sink_target.lock().unwrap().push_str(delta);
        }));

        if let Some(sink) = &handlers.text {
            sink.on_text("Hel");
            sink.on_text("lo");
        }
        assert_eq!(*seen.lock().unwrap(), "Hello");
    }

    #[test]
    fn product_buffer_accumulates_and_drains() {
        let products = ProductBuffer::new();
        products.push(json!({"id": "p1"}));
        products.extend([json!({"id": "p2"}), json!({"id": "p3"})]);
        assert_eq!(products.len(), 3);

        let drained = products.drain();
        assert_eq!(drained.len(), 3);
        assert!(products.is_empty());
        assert_eq!(drained[0], json!({"id": "p1"}));
    }

    #[test]
    fn product_buffer_clones_share_storage() {
        let products = ProductBuffer::new();
        let alias = products.clone();
        alias.push(json!({"id": "p1"}));
        assert_eq!(products.len(), 1);
    }
}
