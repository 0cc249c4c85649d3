//! The storage contract: every resource operation the API layer needs,
//! independent of backend. `memory` is the default (DashMap-backed, no
//! persistence); `postgres` is the durable backend used when `DATABASE_URL`
//! is set and reachable at startup.

pub mod memory;
pub mod postgres;

use crate::domain::{Assistant, CronJob, Run, RunStatus, StateSnapshot, StoreItem, Thread};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Pagination input every list/search endpoint accepts. `limit` is clamped
/// to `[1, 1000]` by handlers before reaching storage.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self { limit: 10, offset: 0 }
    }
}

/// A metadata containment filter: `metadata` must be a superset of this map.
pub type MetadataFilter = Map<String, Value>;

#[derive(Debug, Clone, Default)]
pub struct AssistantFilter {
    pub graph_id: Option<String>,
    pub metadata: MetadataFilter,
    pub owner: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ThreadFilter {
    pub metadata: MetadataFilter,
    pub status: Option<crate::domain::ThreadStatus>,
    pub owner: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RunFilter {
    pub status: Option<RunStatus>,
    pub owner: Option<String>,
}

/// Input to `add_state_snapshot`. `values` is already normalized by the
/// caller: the handler accepts either `{values: {...}}` or a bare values
/// object from clients and unwraps to this shape before it reaches storage.
#[derive(Debug, Clone, Default)]
pub struct StateSnapshotInput {
    pub values: Map<String, Value>,
    pub next: Vec<String>,
    pub tasks: Vec<Value>,
    pub metadata: Map<String, Value>,
    pub interrupts: Vec<Value>,
    pub parent_checkpoint: Option<Uuid>,
}

/// Resource CRUD contract used by the assistant/thread/run/store/cron
/// handlers. A single trait (rather than one per resource) so a backend
/// implementation can share one connection pool / one lock across all of
/// them.
#[async_trait]
pub trait Storage: Send + Sync {
    // -- assistants --
    async fn create_assistant(&self, assistant: Assistant) -> Result<Assistant>;
    /// `owner`: `None` bypasses the read-access check (system/internal
    /// callers); `Some` must match the assistant's owner or `"system"`.
    async fn get_assistant(&self, id: Uuid, owner: Option<&str>) -> Result<Assistant>;
    /// `owner`: write-accessible only when `None` or matching the
    /// assistant's owner exactly; unlike reads, `"system"`-owned assistants
    /// are not writable by a non-system caller.
    async fn update_assistant(
        &self,
        id: Uuid,
        patch: AssistantPatch,
        owner: Option<&str>,
    ) -> Result<Assistant>;
    async fn delete_assistant(&self, id: Uuid, owner: Option<&str>) -> Result<()>;
    async fn search_assistants(
        &self,
        filter: AssistantFilter,
        page: Page,
    ) -> Result<Vec<Assistant>>;
    async fn count_assistants(&self, filter: AssistantFilter) -> Result<i64>;

    // -- threads --
    async fn create_thread(&self, thread: Thread) -> Result<Thread>;
    /// Not owner-scoped: the thread id itself is the access token.
    async fn get_thread(&self, id: Uuid) -> Result<Thread>;
    /// Unlike `get_thread`, writes stay owner-scoped: see `update_assistant`.
    async fn update_thread(&self, id: Uuid, patch: ThreadPatch, owner: Option<&str>) -> Result<Thread>;
    async fn delete_thread(&self, id: Uuid, owner: Option<&str>) -> Result<()>;
    async fn search_threads(&self, filter: ThreadFilter, page: Page) -> Result<Vec<Thread>>;
    async fn count_threads(&self, filter: ThreadFilter) -> Result<i64>;

    // -- thread state history --
    async fn add_state_snapshot(&self, thread_id: Uuid, input: StateSnapshotInput) -> Result<StateSnapshot>;
    /// Reverse chronological. `before`, if given, is an exclusive cursor: an
    /// unknown checkpoint id yields an empty page rather than an error.
    async fn get_history(&self, thread_id: Uuid, limit: i64, before: Option<Uuid>) -> Result<Vec<StateSnapshot>>;
    /// Most recent snapshot for the thread, synthesized from `thread.values`
    /// if none has been recorded yet.
    async fn get_state(&self, thread_id: Uuid) -> Result<StateSnapshot>;

    // -- runs --
    async fn create_run(&self, run: Run) -> Result<Run>;
    async fn get_run(&self, thread_id: Uuid, run_id: Uuid) -> Result<Run>;
    async fn update_run_status(
        &self,
        run_id: Uuid,
        status: RunStatus,
        error: Option<String>,
    ) -> Result<Run>;
    async fn list_runs(&self, thread_id: Uuid, filter: RunFilter, page: Page) -> Result<Vec<Run>>;
    async fn active_runs_for_thread(&self, thread_id: Uuid) -> Result<Vec<Run>>;
    async fn delete_run(&self, thread_id: Uuid, run_id: Uuid) -> Result<()>;

    // -- cross-thread store --
    async fn put_store_item(&self, item: StoreItem) -> Result<()>;
    async fn get_store_item(&self, namespace: &[String], key: &str, owner: &str) -> Result<StoreItem>;
    async fn delete_store_item(&self, namespace: &[String], key: &str, owner: &str) -> Result<()>;
    async fn search_store_items(
        &self,
        namespace_prefix: &[String],
        owner: &str,
        page: Page,
    ) -> Result<Vec<StoreItem>>;
    /// Distinct namespaces among the owner's own store items.
    async fn list_namespaces(&self, owner: &str) -> Result<Vec<Vec<String>>>;

    // -- crons --
    async fn create_cron(&self, cron: CronJob) -> Result<CronJob>;
    async fn get_cron(&self, id: Uuid) -> Result<CronJob>;
    async fn delete_cron(&self, id: Uuid, owner: Option<&str>) -> Result<()>;
    async fn search_crons(&self, owner: Option<&str>, page: Page) -> Result<Vec<CronJob>>;
    async fn count_crons(&self, owner: Option<&str>) -> Result<i64>;
    async fn due_crons(&self, now: DateTime<Utc>) -> Result<Vec<CronJob>>;
    async fn reschedule_cron(&self, id: Uuid, next_run_at: DateTime<Utc>) -> Result<()>;
}

/// Partial update for an assistant. `metadata` is merged (shallow), never
/// replaced, so a caller can't accidentally clobber `owner`.
#[derive(Debug, Clone, Default)]
pub struct AssistantPatch {
    pub graph_id: Option<String>,
    pub name: Option<String>,
    pub config: Option<Value>,
    pub context: Option<Value>,
    pub metadata_merge: Map<String, Value>,
}

#[derive(Debug, Clone, Default)]
pub struct ThreadPatch {
    pub metadata_merge: Map<String, Value>,
    pub status: Option<crate::domain::ThreadStatus>,
    pub values: Option<Map<String, Value>>,
}

pub fn metadata_contains(haystack: &Map<String, Value>, needle: &Map<String, Value>) -> bool {
    needle.iter().all(|(k, v)| haystack.get(k) == Some(v))
}
