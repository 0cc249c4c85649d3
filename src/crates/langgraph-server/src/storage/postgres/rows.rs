//! `sqlx::FromRow` row shapes and their conversions to/from domain types.
//! Kept separate from the query bodies in `mod.rs` so the jsonb/text
//! plumbing doesn't crowd out the SQL.

use crate::domain::{
    Assistant, CronJob, MultitaskStrategy, Run, RunStatus, StateSnapshot, StoreItem, Thread, ThreadStatus,
};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(FromRow)]
pub struct AssistantRow {
    pub assistant_id: Uuid,
    pub graph_id: String,
    pub name: Option<String>,
    pub config: Value,
    pub context: Value,
    pub metadata: Value,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AssistantRow {
    pub fn from_domain(a: &Assistant) -> Self {
        Self {
            assistant_id: a.assistant_id,
            graph_id: a.graph_id.clone(),
            name: a.name.clone(),
            config: a.config.clone(),
            context: a.context.clone(),
            metadata: Value::Object(a.metadata.clone()),
            version: a.version,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }

    pub fn into_domain(self) -> Assistant {
        Assistant {
            assistant_id: self.assistant_id,
            graph_id: self.graph_id,
            name: self.name,
            config: self.config,
            context: self.context,
            metadata: as_object(self.metadata),
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
pub struct ThreadRow {
    pub thread_id: Uuid,
    pub metadata: Value,
    pub status: String,
    pub values: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ThreadRow {
    pub fn from_domain(t: &Thread) -> Self {
        Self {
            thread_id: t.thread_id,
            metadata: Value::Object(t.metadata.clone()),
            status: Self::status_str(t.status).to_string(),
            values: Value::Object(t.values.clone()),
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }

    pub fn into_domain(self) -> Thread {
        Thread {
            thread_id: self.thread_id,
            metadata: as_object(self.metadata),
            status: Self::parse_status(&self.status),
            values: as_object(self.values),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn status_str(status: ThreadStatus) -> &'static str {
        match status {
            ThreadStatus::Idle => "idle",
            ThreadStatus::Busy => "busy",
            ThreadStatus::Interrupted => "interrupted",
            ThreadStatus::Error => "error",
        }
    }

    fn parse_status(raw: &str) -> ThreadStatus {
        match raw {
            "busy" => ThreadStatus::Busy,
            "interrupted" => ThreadStatus::Interrupted,
            "error" => ThreadStatus::Error,
            _ => ThreadStatus::Idle,
        }
    }
}

#[derive(FromRow)]
pub struct RunRow {
    pub run_id: Uuid,
    pub thread_id: Uuid,
    pub assistant_id: Uuid,
    pub status: String,
    pub metadata: Value,
    pub input: Value,
    pub config: Value,
    pub multitask_strategy: String,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RunRow {
    pub fn from_domain(r: &Run) -> Self {
        Self {
            run_id: r.run_id,
            thread_id: r.thread_id,
            assistant_id: r.assistant_id,
            status: Self::status_str(r.status).to_string(),
            metadata: Value::Object(r.metadata.clone()),
            input: r.input.clone(),
            config: r.config.clone(),
            multitask_strategy: Self::multitask_str(r.multitask_strategy).to_string(),
            error: r.error.clone(),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }

    pub fn into_domain(self) -> Run {
        Run {
            run_id: self.run_id,
            thread_id: self.thread_id,
            assistant_id: self.assistant_id,
            status: Self::parse_status(&self.status),
            metadata: as_object(self.metadata),
            input: self.input,
            config: self.config,
            multitask_strategy: Self::parse_multitask(&self.multitask_strategy),
            error: self.error,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn status_str(status: RunStatus) -> &'static str {
        match status {
            RunStatus::Pending => "pending",
            RunStatus::Running => "running",
            RunStatus::Success => "success",
            RunStatus::Error => "error",
            RunStatus::Timeout => "timeout",
            RunStatus::Interrupted => "interrupted",
        }
    }

    fn parse_status(raw: &str) -> RunStatus {
        match raw {
            "running" => RunStatus::Running,
            "success" => RunStatus::Success,
            "error" => RunStatus::Error,
            "timeout" => RunStatus::Timeout,
            "interrupted" => RunStatus::Interrupted,
            _ => RunStatus::Pending,
        }
    }

    fn multitask_str(strategy: MultitaskStrategy) -> &'static str {
        match strategy {
            MultitaskStrategy::Reject => "reject",
            MultitaskStrategy::Interrupt => "interrupt",
            MultitaskStrategy::Rollback => "rollback",
            MultitaskStrategy::Enqueue => "enqueue",
        }
    }

    fn parse_multitask(raw: &str) -> MultitaskStrategy {
        match raw {
            "interrupt" => MultitaskStrategy::Interrupt,
            "rollback" => MultitaskStrategy::Rollback,
            "enqueue" => MultitaskStrategy::Enqueue,
            _ => MultitaskStrategy::Reject,
        }
    }
}

#[derive(FromRow)]
pub struct StoreItemRow {
    pub namespace: Vec<String>,
    pub key: String,
    pub value: Value,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoreItemRow {
    pub fn from_domain(item: &StoreItem) -> Self {
        Self {
            namespace: item.namespace.clone(),
            key: item.key.clone(),
            value: Value::Object(item.value.clone()),
            owner: item.owner.clone(),
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }

    pub fn into_domain(self) -> StoreItem {
        StoreItem {
            namespace: self.namespace,
            key: self.key,
            value: as_object(self.value),
            owner: self.owner,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
pub struct CronRow {
    pub cron_id: Uuid,
    pub assistant_id: Uuid,
    pub thread_id: Option<Uuid>,
    pub schedule: String,
    pub end_time: Option<DateTime<Utc>>,
    pub payload: Value,
    pub metadata: Value,
    pub next_run_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CronRow {
    pub fn from_domain(c: &CronJob) -> Self {
        Self {
            cron_id: c.cron_id,
            assistant_id: c.assistant_id,
            thread_id: c.thread_id,
            schedule: c.schedule.clone(),
            end_time: c.end_time,
            payload: c.payload.clone(),
            metadata: Value::Object(c.metadata.clone()),
            next_run_at: c.next_run_at,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }

    pub fn into_domain(self) -> CronJob {
        CronJob {
            cron_id: self.cron_id,
            assistant_id: self.assistant_id,
            thread_id: self.thread_id,
            schedule: self.schedule,
            end_time: self.end_time,
            payload: self.payload,
            metadata: as_object(self.metadata),
            next_run_at: self.next_run_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
pub struct StateSnapshotRow {
    pub thread_id: Uuid,
    pub values: Value,
    pub next: Vec<String>,
    pub tasks: Value,
    pub metadata: Value,
    pub checkpoint_id: Uuid,
    pub parent_checkpoint: Option<Uuid>,
    pub interrupts: Value,
    pub created_at: DateTime<Utc>,
}

impl StateSnapshotRow {
    pub fn from_domain(s: &StateSnapshot) -> Self {
        Self {
            thread_id: s.thread_id,
            values: Value::Object(s.values.clone()),
            next: s.next.clone(),
            tasks: Value::Array(s.tasks.clone()),
            metadata: Value::Object(s.metadata.clone()),
            checkpoint_id: s.checkpoint_id,
            parent_checkpoint: s.parent_checkpoint,
            interrupts: Value::Array(s.interrupts.clone()),
            created_at: s.created_at,
        }
    }

    pub fn into_domain(self) -> StateSnapshot {
        StateSnapshot {
            thread_id: self.thread_id,
            values: as_object(self.values),
            next: self.next,
            tasks: as_array(self.tasks),
            metadata: as_object(self.metadata),
            checkpoint_id: self.checkpoint_id,
            parent_checkpoint: self.parent_checkpoint,
            interrupts: as_array(self.interrupts),
            created_at: self.created_at,
        }
    }
}

fn as_array(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

fn as_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
