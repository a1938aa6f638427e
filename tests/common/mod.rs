//! Shared test helpers and scripted model backends.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use shopchat::error::{Result, ShopchatError};
use shopchat::model::{ChatModel, EventStream, TurnRequest};
use shopchat::prelude::*;

/// Ordered record of everything the handlers observed.
#[derive(Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }
}

/// Text sink that journals each delta as `delta:<text>`.
pub fn journal_text_sink(journal: &Journal) -> Arc<dyn TextSink> {
    let journal = journal.clone();
    Arc::new(move |delta: &str| journal.push(format!("delta:{delta}")))
}

/// Message sink that journals the final reply as `final:<text>`.
pub fn journal_message_sink(journal: &Journal) -> Arc<dyn MessageSink> {
    let journal = journal.clone();
    Arc::new(move |message: &AssistantMessage| journal.push(format!("final:{}", message.content)))
}

/// A model that replays a scripted event sequence and captures requests.
pub struct ScriptedModel {
    script: Mutex<Vec<Result<StreamEvent>>>,
    pub requests: Mutex<Vec<TurnRequest>>,
}

impl ScriptedModel {
    pub fn new(script: Vec<Result<StreamEvent>>) -> Self {
        Self {
            script: Mutex::new(script),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn last_request(&self) -> TurnRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request captured")
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn stream_turn(&self, request: &TurnRequest) -> Result<EventStream> {
        self.requests.lock().unwrap().push(request.clone());
        let events = std::mem::take(&mut *self.script.lock().unwrap());
        Ok(Box::pin(tokio_stream::iter(events)))
    }
}

/// A model whose stream never opens.
pub struct UnreachableModel;

#[async_trait]
impl ChatModel for UnreachableModel {
    async fn stream_turn(&self, _request: &TurnRequest) -> Result<EventStream> {
        Err(ShopchatError::Model("backend unreachable".into()))
    }
}

/// A model that emits one delta and then stalls forever.
pub struct StallingModel;

#[async_trait]
impl ChatModel for StallingModel {
    async fn stream_turn(&self, _request: &TurnRequest) -> Result<EventStream> {
        let stream = async_stream::stream! {
            yield Ok::<StreamEvent, ShopchatError>(StreamEvent::TextDelta {
                delta: "thinking".into(),
            });
            futures::future::pending::<()>().await;
        };
        Ok(Box::pin(stream))
    }
}

/// Tool handler that journals invocations and captures contexts.
///
/// `on_success` and `on_error` yield between a `begin` and `end` marker so
/// tests can prove the runner awaits a handler to completion before
/// pulling the next stream event.
#[derive(Default)]
pub struct RecordingToolHandler {
    pub journal: Journal,
    pub contexts: Mutex<Vec<ToolOutcomeContext>>,
    /// Pushed into the product buffer on each success when set.
    pub product: Option<Value>,
}

impl RecordingToolHandler {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            contexts: Mutex::new(Vec::new()),
            product: None,
        }
    }

    pub fn with_product(mut self, product: Value) -> Self {
        self.product = Some(product);
        self
    }

    pub fn contexts(&self) -> Vec<ToolOutcomeContext> {
        self.contexts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolOutcomeHandler for RecordingToolHandler {
    async fn on_started(&self, tool_name: &str, _call_id: &str, _arguments: &Value) {
        self.journal.push(format!("started:{tool_name}"));
    }

    async fn on_success(&self, ctx: ToolOutcomeContext) {
        self.journal.push(format!("success:{}:begin", ctx.tool_name));
        tokio::task::yield_now().await;
        if let Some(product) = &self.product {
            ctx.products.push(product.clone());
        }
        self.journal.push(format!("success:{}:end", ctx.tool_name));
        self.contexts.lock().unwrap().push(ctx);
    }

    async fn on_error(&self, ctx: ToolOutcomeContext) {
        self.journal.push(format!("error:{}:begin", ctx.tool_name));
        tokio::task::yield_now().await;
        self.journal.push(format!("error:{}:end", ctx.tool_name));
        self.contexts.lock().unwrap().push(ctx);
    }
}
