//! The graph factory contract `langgraph-server`'s run engine compiles
//! against. Deliberately thin: the actual agent logic lives in
//! `langgraph-prebuilt` (or any other crate implementing these traits), not
//! here.

pub mod error;
pub mod graph;

pub use error::{GraphError, Result};
pub use graph::{Configurable, Graph, GraphFactory, GraphInput, GraphState, RunnableConfig};

pub use langgraph_checkpoint::{Checkpointer, Message, MessageType};

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use langgraph_checkpoint::MemoryCheckpointer;
    use std::sync::Arc;

    struct EchoGraph;

    #[async_trait]
    impl Graph for EchoGraph {
        async fn invoke(&self, input: GraphInput, _config: &RunnableConfig) -> Result<GraphState> {
            Ok(GraphState::from_messages(&input.messages))
        }

        async fn get_state(&self, _config: &RunnableConfig) -> Result<GraphState> {
            Ok(GraphState::default())
        }
    }

    struct EchoFactory;

    #[async_trait]
    impl GraphFactory for EchoFactory {
        async fn build(
            &self,
            _configurable: Configurable,
            _checkpointer: Arc<dyn Checkpointer>,
        ) -> Result<Arc<dyn Graph>> {
            Ok(Arc::new(EchoGraph))
        }
    }

    #[tokio::test]
    async fn factory_builds_a_graph_that_echoes_input() {
        let factory = EchoFactory;
        let checkpointer = Arc::new(MemoryCheckpointer::new());
        let graph = factory.build(Configurable::new(), checkpointer).await.unwrap();

        let input = GraphInput {
            messages: vec![Message::human("hi")],
        };
        let state = graph.invoke(input, &RunnableConfig::default()).await.unwrap();
        let messages = state.values.get("messages").unwrap().as_array().unwrap();
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn runnable_config_extracts_thread_id() {
        let mut configurable = Configurable::new();
        configurable.insert("thread_id".into(), "t1".into());
        let config = RunnableConfig::new(configurable);
        assert_eq!(config.thread_id(), Some("t1"));
    }
}
