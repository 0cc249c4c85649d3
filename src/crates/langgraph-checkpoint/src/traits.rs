//! The [`Checkpointer`] trait: the run engine's sole handle onto persisted
//! conversation state.
//!
//! `langgraph-server` never inspects message history directly between
//! turns — it hands the checkpointer the *new* input messages for a run and
//! relies on the checkpointer to already know, keyed by `thread_id`, what
//! came before. This is what lets the run engine pass only the new turn's
//! input into `graph.invoke` (spec §4.6.5 step 4) while still producing a
//! fully accumulated transcript on read-back (step 5).

use crate::{error::Result, messages::Message};
use async_trait::async_trait;

/// Persists and accumulates per-thread message history.
///
/// Implementations must be safe to share across concurrently executing
/// runs; the default [`crate::memory::MemoryCheckpointer`] does this with
/// an internal concurrent map.
#[async_trait]
pub trait Checkpointer: Send + Sync {
    /// Append `new_messages` to `thread_id`'s history (merging by id, see
    /// [`crate::messages::merge_messages`]) and return the full
    /// accumulated history after the merge.
    async fn append_messages(
        &self,
        thread_id: &str,
        new_messages: Vec<Message>,
    ) -> Result<Vec<Message>>;

    /// Return the thread's current accumulated history, or an empty vector
    /// if nothing has been recorded yet.
    async fn get_messages(&self, thread_id: &str) -> Result<Vec<Message>>;

    /// Drop all history for a thread. Used when an ephemeral (stateless)
    /// thread is torn down after a run completes.
    async fn clear_thread(&self, thread_id: &str) -> Result<()>;
}
