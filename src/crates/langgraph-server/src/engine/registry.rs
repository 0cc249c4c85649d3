//! Maps a `graph_id` to the [`GraphFactory`] that builds runnable agents
//! for it. `langgraph-prebuilt`'s echo factory is registered under
//! `"agent"` at startup; a real deployment registers its own factories the
//! same way before serving traffic.

use dashmap::DashMap;
use langgraph_core::GraphFactory;
use std::sync::Arc;

#[derive(Default)]
pub struct GraphFactoryRegistry {
    factories: DashMap<String, Arc<dyn GraphFactory>>,
}

impl GraphFactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, graph_id: impl Into<String>, factory: Arc<dyn GraphFactory>) {
        self.factories.insert(graph_id.into(), factory);
    }

    pub fn get(&self, graph_id: &str) -> Option<Arc<dyn GraphFactory>> {
        self.factories.get(graph_id).map(|e| e.value().clone())
    }

    pub fn graph_ids(&self) -> Vec<String> {
        self.factories.iter().map(|e| e.key().clone()).collect()
    }
}
