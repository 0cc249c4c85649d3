//! The default [`GraphFactory`], registered under `graph_id = "agent"`
//! whenever no real agent implementation is wired in. It is deliberately
//! dumb — it recalls names mentioned earlier in the thread and otherwise
//! echoes the human's turn back — but it is a real [`Graph`] exercising the
//! full checkpointer read-accumulate-write cycle the run engine depends on.

use crate::recall::reply_to;
use async_trait::async_trait;
use langgraph_core::{
    error::GraphError, Checkpointer, Graph, GraphFactory, GraphInput, GraphState, Message,
    MessageType, RunnableConfig,
};
use std::sync::Arc;

pub struct EchoGraph {
    checkpointer: Arc<dyn Checkpointer>,
}

#[async_trait]
impl Graph for EchoGraph {
    async fn invoke(&self, input: GraphInput, config: &RunnableConfig) -> langgraph_core::Result<GraphState> {
        let thread_id = config
            .thread_id()
            .ok_or_else(|| GraphError::ExecutionFailed("missing thread_id in configurable".into()))?;

        let history = self
            .checkpointer
            .get_messages(thread_id)
            .await
            .map_err(|e| GraphError::ExecutionFailed(e.to_string()))?;

        let mut seen = history.clone();
        let mut to_append = Vec::with_capacity(input.messages.len() * 2);
        for turn in input.messages {
            let reply = if turn.message_type == MessageType::Human {
                Some(reply_to(&seen, &turn))
            } else {
                None
            };
            seen.push(turn.clone());
            to_append.push(turn);
            if let Some(reply) = reply {
                let ai = Message::ai(reply);
                seen.push(ai.clone());
                to_append.push(ai);
            }
        }

        let merged = self
            .checkpointer
            .append_messages(thread_id, to_append)
            .await
            .map_err(|e| GraphError::ExecutionFailed(e.to_string()))?;

        Ok(GraphState::from_messages(&merged))
    }

    async fn get_state(&self, config: &RunnableConfig) -> langgraph_core::Result<GraphState> {
        let thread_id = config
            .thread_id()
            .ok_or_else(|| GraphError::StateReadFailed("missing thread_id in configurable".into()))?;
        let messages = self
            .checkpointer
            .get_messages(thread_id)
            .await
            .map_err(|e| GraphError::StateReadFailed(e.to_string()))?;
        Ok(GraphState::from_messages(&messages))
    }
}

/// Builds an [`EchoGraph`] bound to whatever checkpointer the run engine
/// passes in. Stateless itself — every call to `build` is cheap.
#[derive(Debug, Default)]
pub struct EchoGraphFactory;

#[async_trait]
impl GraphFactory for EchoGraphFactory {
    async fn build(
        &self,
        _configurable: langgraph_core::Configurable,
        checkpointer: Arc<dyn Checkpointer>,
    ) -> langgraph_core::Result<Arc<dyn Graph>> {
        Ok(Arc::new(EchoGraph { checkpointer }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use langgraph_checkpoint::MemoryCheckpointer;
    use langgraph_core::Configurable;
    use serde_json::json;

    fn config(thread_id: &str) -> RunnableConfig {
        let mut configurable = Configurable::new();
        configurable.insert("thread_id".into(), json!(thread_id));
        RunnableConfig::new(configurable)
    }

    #[tokio::test]
    async fn remembers_a_name_across_turns() {
        let factory = EchoGraphFactory;
        let checkpointer = Arc::new(MemoryCheckpointer::new());
        let graph = factory
            .build(Configurable::new(), checkpointer)
            .await
            .unwrap();

        let cfg = config("t1");
        graph
            .invoke(
                GraphInput {
                    messages: vec![Message::human("my name is Luke")],
                },
                &cfg,
            )
            .await
            .unwrap();

        let state = graph
            .invoke(
                GraphInput {
                    messages: vec![Message::human("what's my name?")],
                },
                &cfg,
            )
            .await
            .unwrap();

        let messages = state.values.get("messages").unwrap().as_array().unwrap();
        let last = messages.last().unwrap();
        assert_eq!(last["content"], "Your name is Luke.");
        assert_eq!(messages.len(), 4);
    }

    #[tokio::test]
    async fn get_state_reflects_invoke_without_rerunning() {
        let factory = EchoGraphFactory;
        let checkpointer = Arc::new(MemoryCheckpointer::new());
        let graph = factory
            .build(Configurable::new(), checkpointer)
            .await
            .unwrap();
        let cfg = config("t2");
        graph
            .invoke(
                GraphInput {
                    messages: vec![Message::human("hello")],
                },
                &cfg,
            )
            .await
            .unwrap();

        let state = graph.get_state(&cfg).await.unwrap();
        let messages = state.values.get("messages").unwrap().as_array().unwrap();
        assert_eq!(messages.len(), 2);
    }

    #[tokio::test]
    async fn missing_thread_id_is_an_error() {
        let factory = EchoGraphFactory;
        let checkpointer = Arc::new(MemoryCheckpointer::new());
        let graph = factory
            .build(Configurable::new(), checkpointer)
            .await
            .unwrap();
        let result = graph
            .invoke(
                GraphInput {
                    messages: vec![Message::human("hi")],
                },
                &RunnableConfig::default(),
            )
            .await;
        assert!(result.is_err());
    }
}
