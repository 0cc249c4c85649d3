//! Reconciles externally-managed agent definitions into the assistants
//! table. `AgentSource` is the seam to whatever system of record owns agent
//! configuration (a product database, a config service); this module only
//! knows how to turn its rows into [`Assistant`]s and keep them in sync.
//! Sync runs once at startup (best-effort — a failure here must not stop
//! the server from serving traffic) and again lazily per-assistant when a
//! cached copy is older than [`SYNC_TTL`].

mod reconcile;
mod source;

pub use reconcile::reconcile;
pub use source::{AgentSource, ExternalAgentRow, NoopAgentSource};

use crate::state::AppState;
use std::sync::Arc;
use std::time::Duration;

pub const SYNC_TTL: Duration = Duration::from_secs(300);

/// Best-effort sync of every agent the source currently knows about. Errors
/// are logged, not propagated — agent-sync failing must never prevent
/// startup.
pub async fn sync_all(state: &AppState, source: &Arc<dyn AgentSource>) {
    match source.list_agents().await {
        Ok(rows) => {
            for row in rows {
                if let Err(e) = reconcile(&*state.storage, row).await {
                    tracing::warn!(error = %e, "agent sync: failed to reconcile row");
                }
            }
        }
        Err(e) => tracing::warn!(error = %e, "agent sync: source unavailable, continuing without sync"),
    }
}
