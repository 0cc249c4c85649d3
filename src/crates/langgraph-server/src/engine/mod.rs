//! The run engine: resolves an assistant, reconciles multitask conflicts,
//! builds the runnable config, normalizes input, invokes the graph, and
//! reads back the checkpointer's accumulated state. Spec's step sequence
//! (assistant resolution -> multitask check -> build config -> normalize
//! input -> invoke -> read-back) is this module, in this file, in that
//! order.

pub mod config;
pub mod input;
pub mod multitask;
pub mod registry;

use crate::domain::{Assistant, MultitaskStrategy, Run, RunStatus};
use crate::error::ApiError;
use crate::storage::{Storage, StateSnapshotInput};
use langgraph_checkpoint::Checkpointer;
use langgraph_core::GraphState;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

pub use registry::GraphFactoryRegistry;

pub struct RunEngine {
    pub storage: Arc<dyn Storage>,
    pub checkpointer: Arc<dyn Checkpointer>,
    pub registry: Arc<GraphFactoryRegistry>,
}

pub struct RunOutcome {
    pub run: Run,
    pub pre_state: GraphState,
    pub post_state: GraphState,
}

impl RunEngine {
    pub fn new(
        storage: Arc<dyn Storage>,
        checkpointer: Arc<dyn Checkpointer>,
        registry: Arc<GraphFactoryRegistry>,
    ) -> Self {
        Self { storage, checkpointer, registry }
    }

    /// Resolve `assistant_id_or_graph_id`: a valid UUID is looked up
    /// directly, anything else is treated as a `graph_id` alias and
    /// resolves to that graph's first registered assistant.
    pub async fn resolve_assistant(&self, id_or_graph_id: &str, owner: Option<&str>) -> Result<Assistant, ApiError> {
        if let Ok(id) = Uuid::parse_str(id_or_graph_id) {
            return Ok(self.storage.get_assistant(id, owner).await?);
        }
        let matches = self
            .storage
            .search_assistants(
                crate::storage::AssistantFilter {
                    graph_id: Some(id_or_graph_id.to_string()),
                    owner: owner.map(str::to_string),
                    ..Default::default()
                },
                crate::storage::Page { limit: 1, offset: 0 },
            )
            .await?;
        matches
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("no assistant registered for graph_id {id_or_graph_id}")))
    }

    /// Execute one run to completion. Caller has already created (or
    /// resolved) `thread_id` and persisted the `Run` row in `Pending`
    /// status; this drives it to a terminal status and returns the
    /// before/after graph state for response shaping (JSON body or SSE
    /// framing).
    pub async fn execute(
        &self,
        assistant: &Assistant,
        thread_id: Uuid,
        run: Run,
        input: &Value,
        run_config_override: Option<&Value>,
    ) -> Result<RunOutcome, ApiError> {
        let runnable_config = config::build(
            &assistant.config,
            run_config_override,
            thread_id,
            assistant.assistant_id,
            run.run_id,
            &assistant.graph_id,
            run.owner(),
        );

        let factory = self.registry.get(&assistant.graph_id).ok_or_else(|| {
            ApiError::BadRequest(format!("no graph factory registered for graph_id {}", assistant.graph_id))
        })?;

        let graph = factory
            .build(runnable_config.configurable.clone(), self.checkpointer.clone())
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        let pre_state = graph
            .get_state(&runnable_config)
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        self.storage
            .update_run_status(run.run_id, RunStatus::Running, None)
            .await?;

        let graph_input = input::normalize(input);
        let invoke_result = graph.invoke(graph_input, &runnable_config).await;

        let (status, error, post_state) = match invoke_result {
            Ok(state) => (RunStatus::Success, None, state),
            Err(e) => (RunStatus::Error, Some(e.to_string()), pre_state.clone()),
        };

        let run = self.storage.update_run_status(run.run_id, status, error.clone()).await?;

        let parent_checkpoint = self
            .storage
            .get_history(thread_id, 1, None)
            .await
            .ok()
            .and_then(|snapshots| snapshots.into_iter().next())
            .map(|snapshot| snapshot.checkpoint_id);

        let interrupts = match status {
            RunStatus::Error => error.clone().into_iter().map(Value::String).collect(),
            _ => Vec::new(),
        };

        self.storage
            .add_state_snapshot(
                thread_id,
                StateSnapshotInput {
                    values: post_state.values.clone(),
                    next: Vec::new(),
                    tasks: Vec::new(),
                    metadata: serde_json::Map::new(),
                    interrupts,
                    parent_checkpoint,
                },
            )
            .await?;

        Ok(RunOutcome { run, pre_state, post_state })
    }

    pub async fn resolve_multitask(
        &self,
        thread_id: Uuid,
        strategy: MultitaskStrategy,
    ) -> Result<multitask::Resolution, ApiError> {
        multitask::resolve(&self.storage, thread_id, strategy).await
    }

    pub async fn cancel(&self, thread_id: Uuid, run_id: Uuid) -> Result<Run, ApiError> {
        let run = self.storage.get_run(thread_id, run_id).await?;
        if run.status.is_terminal() {
            return Ok(run);
        }
        Ok(self.storage.update_run_status(run_id, RunStatus::Interrupted, None).await?)
    }

    pub async fn delete(&self, thread_id: Uuid, run_id: Uuid) -> Result<(), ApiError> {
        Ok(self.storage.delete_run(thread_id, run_id).await?)
    }

    /// v0 has no background queue: every run finishes within the request
    /// that started it, so "join" is just a fetch of the already-terminal
    /// run.
    pub async fn join(&self, thread_id: Uuid, run_id: Uuid) -> Result<Run, ApiError> {
        Ok(self.storage.get_run(thread_id, run_id).await?)
    }
}
