use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use langgraph_checkpoint::{Checkpointer, MemoryCheckpointer};
use langgraph_prebuilt::EchoGraphFactory;
use langgraph_server::context::auth::{AuthVerifier, PermissiveVerifier};
use langgraph_server::engine::{GraphFactoryRegistry, RunEngine};
use langgraph_server::metrics::Metrics;
use langgraph_server::prompts::PromptRegistry;
use langgraph_server::storage::{memory::MemoryStorage, Storage};
use langgraph_server::{api, AppState};

pub fn router() -> Router {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let checkpointer: Arc<dyn Checkpointer> = Arc::new(MemoryCheckpointer::new());
    let registry = Arc::new(GraphFactoryRegistry::new());
    registry.register("agent", Arc::new(EchoGraphFactory));
    let engine = Arc::new(RunEngine::new(storage.clone(), checkpointer.clone(), registry));

    let state = AppState {
        storage,
        checkpointer,
        engine,
        metrics: Arc::new(Metrics::new()),
        prompts: Arc::new(PromptRegistry::new(HashMap::new())),
    };

    let verifier: Arc<dyn AuthVerifier> = Arc::new(PermissiveVerifier);
    api::build_router(state, verifier)
}

pub fn bearer(owner: &str) -> String {
    format!("Bearer {owner}")
}
