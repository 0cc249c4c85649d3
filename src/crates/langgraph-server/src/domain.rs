//! Shared resource types: the things assistants, threads, runs and store
//! items actually are, independent of how a particular storage backend
//! represents them on disk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// The owner every resource records `metadata.owner` against. `"system"` is
/// distinguished: its resources are readable by every caller but writable
/// only by requests that authenticate as `system` themselves.
pub const SYSTEM_OWNER: &str = "system";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assistant {
    pub assistant_id: Uuid,
    pub graph_id: String,
    pub name: Option<String>,
    pub config: Value,
    pub context: Value,
    pub metadata: Map<String, Value>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assistant {
    pub fn owner(&self) -> &str {
        self.metadata
            .get("owner")
            .and_then(Value::as_str)
            .unwrap_or(SYSTEM_OWNER)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IfExists {
    Raise,
    DoNothing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub thread_id: Uuid,
    pub metadata: Map<String, Value>,
    pub status: ThreadStatus,
    pub values: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Thread {
    pub fn owner(&self) -> &str {
        self.metadata
            .get("owner")
            .and_then(Value::as_str)
            .unwrap_or(SYSTEM_OWNER)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadStatus {
    Idle,
    Busy,
    Interrupted,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Running,
    Success,
    Error,
    Timeout,
    Interrupted,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunStatus::Success | RunStatus::Error | RunStatus::Timeout | RunStatus::Interrupted
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultitaskStrategy {
    Reject,
    Interrupt,
    Rollback,
    Enqueue,
}

impl Default for MultitaskStrategy {
    fn default() -> Self {
        MultitaskStrategy::Reject
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub run_id: Uuid,
    pub thread_id: Uuid,
    pub assistant_id: Uuid,
    pub status: RunStatus,
    pub metadata: Map<String, Value>,
    pub input: Value,
    pub config: Value,
    pub multitask_strategy: MultitaskStrategy,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Run {
    pub fn owner(&self) -> &str {
        self.metadata
            .get("owner")
            .and_then(Value::as_str)
            .unwrap_or(SYSTEM_OWNER)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreItem {
    pub namespace: Vec<String>,
    pub key: String,
    pub value: Map<String, Value>,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CronJob {
    pub cron_id: Uuid,
    pub assistant_id: Uuid,
    pub thread_id: Option<Uuid>,
    pub schedule: String,
    pub end_time: Option<DateTime<Utc>>,
    pub payload: Value,
    pub metadata: Map<String, Value>,
    pub next_run_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CronJob {
    pub fn owner(&self) -> &str {
        self.metadata
            .get("owner")
            .and_then(Value::as_str)
            .unwrap_or(SYSTEM_OWNER)
    }
}

/// One entry in a thread's state history. Append-only: every run (and every
/// manual `/state` write) adds a new snapshot rather than mutating the last
/// one, so `getHistory` can walk the chain back through `parent_checkpoint`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub thread_id: Uuid,
    pub values: Map<String, Value>,
    pub next: Vec<String>,
    pub tasks: Vec<Value>,
    pub metadata: Map<String, Value>,
    pub checkpoint_id: Uuid,
    pub parent_checkpoint: Option<Uuid>,
    pub interrupts: Vec<Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnCompletion {
    Delete,
    Keep,
}

impl Default for OnCompletion {
    fn default() -> Self {
        OnCompletion::Delete
    }
}
