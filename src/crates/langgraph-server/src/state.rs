//! Shared application state handed to every handler via axum's
//! `State` extractor.

use crate::engine::RunEngine;
use crate::metrics::Metrics;
use crate::prompts::PromptRegistry;
use crate::storage::Storage;
use langgraph_checkpoint::Checkpointer;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub checkpointer: Arc<dyn Checkpointer>,
    pub engine: Arc<RunEngine>,
    pub metrics: Arc<Metrics>,
    pub prompts: Arc<PromptRegistry>,
}
