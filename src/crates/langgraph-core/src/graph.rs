//! The graph factory contract: the seam between `langgraph-server`'s run
//! engine and whatever actually executes an assistant's logic.
//!
//! spec.md treats this as an external collaborator satisfying
//! `graph = buildGraph(configurable, {checkpointer})`,
//! `graph.invoke(input, runnableConfig) -> result`,
//! `graph.getState(runnableConfig) -> {values}`. [`GraphFactory`] and
//! [`Graph`] are that contract made concrete; `langgraph-prebuilt` ships the
//! default implementation, but the run engine only ever depends on these
//! traits.

use crate::error::Result;
use async_trait::async_trait;
use langgraph_checkpoint::{Checkpointer, Message};
use serde_json::{Map, Value};
use std::sync::Arc;

/// The `configurable` bag merged from an assistant's stored config, a run's
/// per-call config, and the reserved keys the run engine injects
/// (`thread_id`, `assistant_id`, `run_id`, `graph_id`, `user_id`). Opaque to
/// `langgraph-core`; a graph factory interprets its own keys out of it.
pub type Configurable = Map<String, Value>;

/// Config threaded through `invoke`/`get_state`. Carries `configurable` plus
/// the run's metadata bag. Deliberately does not carry a `checkpoint_ns`
/// key — history accumulation is keyed by `thread_id` alone.
#[derive(Debug, Clone, Default)]
pub struct RunnableConfig {
    pub configurable: Configurable,
    pub metadata: Map<String, Value>,
}

impl RunnableConfig {
    pub fn new(configurable: Configurable) -> Self {
        Self {
            configurable,
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn thread_id(&self) -> Option<&str> {
        self.configurable.get("thread_id").and_then(Value::as_str)
    }
}

/// The new turn's input. The run engine passes only what the caller sent
/// for this run, not the accumulated history — the checkpointer already
/// knows what came before.
#[derive(Debug, Clone, Default)]
pub struct GraphInput {
    pub messages: Vec<Message>,
}

/// A graph's externally visible state: today, just the accumulated message
/// list under `values.messages`, matching what `graph.getState` reports and
/// what a state snapshot's `values` field holds.
#[derive(Debug, Clone, Default)]
pub struct GraphState {
    pub values: Map<String, Value>,
}

impl GraphState {
    pub fn from_messages(messages: &[Message]) -> Self {
        let mut values = Map::new();
        values.insert(
            "messages".to_string(),
            serde_json::to_value(messages).unwrap_or(Value::Array(Vec::new())),
        );
        Self { values }
    }
}

/// A compiled, runnable agent. One instance is built per run by a
/// [`GraphFactory`] and then discarded; nothing about it survives between
/// runs except what the `Checkpointer` it was built with records.
#[async_trait]
pub trait Graph: Send + Sync {
    /// Run one turn. `input` is the new turn's messages only; the
    /// implementation is expected to read prior history from the
    /// checkpointer it was constructed with and write the turn's new
    /// messages back to it before returning.
    async fn invoke(&self, input: GraphInput, config: &RunnableConfig) -> Result<GraphState>;

    /// Read the thread's current state without running anything. Used for
    /// `GET /threads/:id/state` and the run engine's post-invoke read-back.
    async fn get_state(&self, config: &RunnableConfig) -> Result<GraphState>;
}

/// Builds a [`Graph`] for a given `configurable`, wired to a shared
/// checkpointer. Registered per `graph_id` in the run engine's
/// `GraphFactoryRegistry`; `langgraph-prebuilt::EchoGraphFactory` is the
/// default registered under `"agent"`.
#[async_trait]
pub trait GraphFactory: Send + Sync {
    async fn build(
        &self,
        configurable: Configurable,
        checkpointer: Arc<dyn Checkpointer>,
    ) -> Result<Arc<dyn Graph>>;
}
