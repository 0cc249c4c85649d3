//! What happens when a new run is requested on a thread that already has
//! one in flight. `langgraph-server` executes runs synchronously within the
//! request that started them, so "in flight" only matters across
//! concurrent requests on the same thread.

use crate::domain::{MultitaskStrategy, Run, RunStatus};
use crate::error::ApiError;
use crate::storage::Storage;
use std::sync::Arc;

pub enum Resolution {
    /// No conflict; proceed to execute the new run.
    Proceed,
    /// Strategy is `enqueue` and a run is active: create the new run as
    /// `pending` and return immediately without executing it.
    Defer,
}

pub async fn resolve(
    storage: &Arc<dyn Storage>,
    thread_id: uuid::Uuid,
    strategy: MultitaskStrategy,
) -> Result<Resolution, ApiError> {
    let active = storage.active_runs_for_thread(thread_id).await?;
    if active.is_empty() {
        return Ok(Resolution::Proceed);
    }

    match strategy {
        MultitaskStrategy::Reject => Err(ApiError::Conflict(format!(
            "thread {thread_id} already has an active run"
        ))),
        MultitaskStrategy::Interrupt => {
            for run in &active {
                storage
                    .update_run_status(run.run_id, RunStatus::Interrupted, None)
                    .await?;
            }
            Ok(Resolution::Proceed)
        }
        MultitaskStrategy::Rollback => {
            for run in &active {
                storage
                    .update_run_status(run.run_id, RunStatus::Error, Some("rolled back".to_string()))
                    .await?;
            }
            Ok(Resolution::Proceed)
        }
        MultitaskStrategy::Enqueue => Ok(Resolution::Defer),
    }
}

pub fn is_active(run: &Run) -> bool {
    !run.status.is_terminal()
}
