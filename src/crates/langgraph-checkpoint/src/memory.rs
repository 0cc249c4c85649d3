//! In-process [`Checkpointer`] backed by a concurrent map. The default, and
//! currently only, checkpointer implementation shipped with the server —
//! adequate for single-node deployments and for tests; it loses history on
//! process restart.

use crate::{
    error::Result,
    messages::{merge_messages, Message},
    traits::Checkpointer,
};
use async_trait::async_trait;
use dashmap::DashMap;

/// `DashMap`-backed [`Checkpointer`]. Cheap to clone (wraps an `Arc`-free
/// `DashMap` directly; callers share it behind their own `Arc`).
#[derive(Debug, Default)]
pub struct MemoryCheckpointer {
    threads: DashMap<String, Vec<Message>>,
}

impl MemoryCheckpointer {
    pub fn new() -> Self {
        Self {
            threads: DashMap::new(),
        }
    }
}

#[async_trait]
impl Checkpointer for MemoryCheckpointer {
    async fn append_messages(
        &self,
        thread_id: &str,
        new_messages: Vec<Message>,
    ) -> Result<Vec<Message>> {
        let mut entry = self.threads.entry(thread_id.to_string()).or_default();
        let merged = merge_messages(std::mem::take(&mut entry), new_messages);
        *entry = merged.clone();
        Ok(merged)
    }

    async fn get_messages(&self, thread_id: &str) -> Result<Vec<Message>> {
        Ok(self
            .threads
            .get(thread_id)
            .map(|m| m.clone())
            .unwrap_or_default())
    }

    async fn clear_thread(&self, thread_id: &str) -> Result<()> {
        self.threads.remove(thread_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accumulates_across_calls() {
        let cp = MemoryCheckpointer::new();
        cp.append_messages("t1", vec![Message::human("hi").with_id("1")])
            .await
            .unwrap();
        let merged = cp
            .append_messages("t1", vec![Message::ai("hello").with_id("2")])
            .await
            .unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(cp.get_messages("t1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_thread_is_empty_not_error() {
        let cp = MemoryCheckpointer::new();
        assert!(cp.get_messages("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_thread_drops_history() {
        let cp = MemoryCheckpointer::new();
        cp.append_messages("t1", vec![Message::human("hi")])
            .await
            .unwrap();
        cp.clear_thread("t1").await.unwrap();
        assert!(cp.get_messages("t1").await.unwrap().is_empty());
    }
}
