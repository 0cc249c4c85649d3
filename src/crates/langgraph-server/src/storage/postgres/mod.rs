//! Postgres-backed [`Storage`]. Durable sibling of [`super::memory`];
//! selected at startup when `DATABASE_URL` is set and the database
//! responds to a health check. Metadata containment filters translate
//! directly to jsonb's `@>` operator, which `memory`'s
//! [`super::metadata_contains`] reimplements in-process for the no-db path.

mod rows;

use super::{
    AssistantFilter, AssistantPatch, Page, Result, RunFilter, StateSnapshotInput, Storage,
    StorageError, ThreadFilter, ThreadPatch,
};
use crate::domain::{Assistant, CronJob, Run, RunStatus, StateSnapshot, StoreItem, Thread};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rows::{AssistantRow, CronRow, RunRow, StateSnapshotRow, StoreItemRow, ThreadRow};
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use uuid::Uuid;

pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    pub async fn connect(database_url: &str) -> std::result::Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Fetches by id with no owner filtering, then enforces the
    /// write-access rule in Rust: unlike reads, `"system"`-owned resources
    /// are never writable by a non-system caller.
    async fn get_assistant_for_write(&self, id: Uuid, owner: Option<&str>) -> Result<Assistant> {
        let row: AssistantRow = sqlx::query_as("SELECT * FROM assistants WHERE assistant_id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend_err)?
            .ok_or_else(|| StorageError::NotFound(format!("assistant {id} not found")))?;
        let assistant = row.into_domain();
        if !owner_can_write(assistant.owner(), owner) {
            return Err(StorageError::NotFound(format!("assistant {id} not found")));
        }
        Ok(assistant)
    }

    async fn get_thread_for_write(&self, id: Uuid, owner: Option<&str>) -> Result<Thread> {
        let current = self.get_thread(id).await?;
        if !owner_can_write(current.owner(), owner) {
            return Err(StorageError::NotFound(format!("thread {id} not found")));
        }
        Ok(current)
    }

    async fn get_cron_for_write(&self, id: Uuid, owner: Option<&str>) -> Result<CronJob> {
        let current = self.get_cron(id).await?;
        if !owner_can_write(current.owner(), owner) {
            return Err(StorageError::NotFound(format!("cron {id} not found")));
        }
        Ok(current)
    }
}

fn backend_err(e: sqlx::Error) -> StorageError {
    StorageError::Backend(e.to_string())
}

/// Write-access rule: unlike the read-scoping `metadata->>'owner' = $N OR
/// metadata->>'owner' = 'system'` clause used throughout this module,
/// writes never get the system exemption.
fn owner_can_write(resource_owner: &str, caller: Option<&str>) -> bool {
    match caller {
        Some(owner) => resource_owner == owner,
        None => true,
    }
}

#[async_trait]
impl Storage for PostgresStorage {
    async fn create_assistant(&self, assistant: Assistant) -> Result<Assistant> {
        let row = AssistantRow::from_domain(&assistant);
        sqlx::query(
            "INSERT INTO assistants (assistant_id, graph_id, name, config, context, metadata, version, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(row.assistant_id)
        .bind(&row.graph_id)
        .bind(&row.name)
        .bind(&row.config)
        .bind(&row.context)
        .bind(&row.metadata)
        .bind(row.version)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await
        .map_err(backend_err)?;
        Ok(assistant)
    }

    async fn get_assistant(&self, id: Uuid, owner: Option<&str>) -> Result<Assistant> {
        let row: AssistantRow = sqlx::query_as(
            "SELECT * FROM assistants
             WHERE assistant_id = $1
               AND ($2::text IS NULL OR metadata->>'owner' = $2 OR metadata->>'owner' = 'system')",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_err)?
        .ok_or_else(|| StorageError::NotFound(format!("assistant {id} not found")))?;
        Ok(row.into_domain())
    }

    async fn update_assistant(&self, id: Uuid, patch: AssistantPatch, owner: Option<&str>) -> Result<Assistant> {
        let current = self.get_assistant_for_write(id, owner).await?;
        let mut metadata = current.metadata.clone();
        for (k, v) in patch.metadata_merge {
            metadata.insert(k, v);
        }
        let updated = Assistant {
            graph_id: patch.graph_id.unwrap_or(current.graph_id),
            name: patch.name.or(current.name),
            config: patch.config.unwrap_or(current.config),
            context: patch.context.unwrap_or(current.context),
            metadata,
            version: current.version + 1,
            updated_at: Utc::now(),
            ..current
        };
        let row = AssistantRow::from_domain(&updated);
        sqlx::query(
            "UPDATE assistants SET graph_id = $2, name = $3, config = $4, context = $5, metadata = $6, version = $7, updated_at = $8
             WHERE assistant_id = $1",
        )
        .bind(row.assistant_id)
        .bind(&row.graph_id)
        .bind(&row.name)
        .bind(&row.config)
        .bind(&row.context)
        .bind(&row.metadata)
        .bind(row.version)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await
        .map_err(backend_err)?;
        Ok(updated)
    }

    async fn delete_assistant(&self, id: Uuid, owner: Option<&str>) -> Result<()> {
        self.get_assistant_for_write(id, owner).await?;
        let result = sqlx::query("DELETE FROM assistants WHERE assistant_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend_err)?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("assistant {id} not found")));
        }
        Ok(())
    }

    async fn search_assistants(&self, filter: AssistantFilter, page: Page) -> Result<Vec<Assistant>> {
        let metadata_json = serde_json::Value::Object(filter.metadata);
        let rows: Vec<AssistantRow> = sqlx::query_as(
            "SELECT * FROM assistants
             WHERE ($1::text IS NULL OR graph_id = $1)
               AND metadata @> $2
               AND ($3::text IS NULL OR metadata->>'owner' = $3 OR metadata->>'owner' = 'system')
             ORDER BY created_at DESC
             LIMIT $4 OFFSET $5",
        )
        .bind(filter.graph_id)
        .bind(metadata_json)
        .bind(filter.owner)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(backend_err)?;
        Ok(rows.into_iter().map(AssistantRow::into_domain).collect())
    }

    async fn count_assistants(&self, filter: AssistantFilter) -> Result<i64> {
        let metadata_json = serde_json::Value::Object(filter.metadata);
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM assistants
             WHERE ($1::text IS NULL OR graph_id = $1)
               AND metadata @> $2
               AND ($3::text IS NULL OR metadata->>'owner' = $3 OR metadata->>'owner' = 'system')",
        )
        .bind(filter.graph_id)
        .bind(metadata_json)
        .bind(filter.owner)
        .fetch_one(&self.pool)
        .await
        .map_err(backend_err)?;
        Ok(count)
    }

    async fn create_thread(&self, thread: Thread) -> Result<Thread> {
        let row = ThreadRow::from_domain(&thread);
        sqlx::query(
            "INSERT INTO threads (thread_id, metadata, status, values, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(row.thread_id)
        .bind(&row.metadata)
        .bind(&row.status)
        .bind(&row.values)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await
        .map_err(backend_err)?;
        Ok(thread)
    }

    async fn get_thread(&self, id: Uuid) -> Result<Thread> {
        let row: ThreadRow = sqlx::query_as("SELECT * FROM threads WHERE thread_id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend_err)?
            .ok_or_else(|| StorageError::NotFound(format!("thread {id} not found")))?;
        Ok(row.into_domain())
    }

    async fn update_thread(&self, id: Uuid, patch: ThreadPatch, owner: Option<&str>) -> Result<Thread> {
        let current = self.get_thread_for_write(id, owner).await?;
        let mut metadata = current.metadata.clone();
        for (k, v) in patch.metadata_merge {
            metadata.insert(k, v);
        }
        let updated = Thread {
            metadata,
            status: patch.status.unwrap_or(current.status),
            values: patch.values.unwrap_or(current.values),
            updated_at: Utc::now(),
            ..current
        };
        let row = ThreadRow::from_domain(&updated);
        sqlx::query(
            "UPDATE threads SET metadata = $2, status = $3, values = $4, updated_at = $5 WHERE thread_id = $1",
        )
        .bind(row.thread_id)
        .bind(&row.metadata)
        .bind(&row.status)
        .bind(&row.values)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await
        .map_err(backend_err)?;
        Ok(updated)
    }

    async fn delete_thread(&self, id: Uuid, owner: Option<&str>) -> Result<()> {
        self.get_thread_for_write(id, owner).await?;
        let result = sqlx::query("DELETE FROM threads WHERE thread_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend_err)?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("thread {id} not found")));
        }
        Ok(())
    }

    async fn add_state_snapshot(&self, thread_id: Uuid, input: StateSnapshotInput) -> Result<StateSnapshot> {
        let snapshot = StateSnapshot {
            thread_id,
            values: input.values,
            next: input.next,
            tasks: input.tasks,
            metadata: input.metadata,
            checkpoint_id: Uuid::new_v4(),
            parent_checkpoint: input.parent_checkpoint,
            interrupts: input.interrupts,
            created_at: Utc::now(),
        };
        let row = StateSnapshotRow::from_domain(&snapshot);
        sqlx::query(
            "INSERT INTO thread_states (thread_id, values, metadata, next, tasks, checkpoint_id, parent_checkpoint, interrupts, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(row.thread_id)
        .bind(&row.values)
        .bind(&row.metadata)
        .bind(&row.next)
        .bind(&row.tasks)
        .bind(row.checkpoint_id)
        .bind(row.parent_checkpoint)
        .bind(&row.interrupts)
        .bind(row.created_at)
        .execute(&self.pool)
        .await
        .map_err(backend_err)?;

        sqlx::query("UPDATE threads SET values = $2, updated_at = $3 WHERE thread_id = $1")
            .bind(thread_id)
            .bind(Value::Object(snapshot.values.clone()))
            .bind(snapshot.created_at)
            .execute(&self.pool)
            .await
            .map_err(backend_err)?;

        Ok(snapshot)
    }

    async fn get_history(&self, thread_id: Uuid, limit: i64, before: Option<Uuid>) -> Result<Vec<StateSnapshot>> {
        let cursor_created_at: Option<DateTime<Utc>> = match before {
            Some(cursor) => {
                let row: Option<(DateTime<Utc>,)> =
                    sqlx::query_as("SELECT created_at FROM thread_states WHERE thread_id = $1 AND checkpoint_id = $2")
                        .bind(thread_id)
                        .bind(cursor)
                        .fetch_optional(&self.pool)
                        .await
                        .map_err(backend_err)?;
                match row {
                    Some((created_at,)) => Some(created_at),
                    None => return Ok(Vec::new()),
                }
            }
            None => None,
        };
        let rows: Vec<StateSnapshotRow> = sqlx::query_as(
            "SELECT * FROM thread_states
             WHERE thread_id = $1
               AND ($2::timestamptz IS NULL OR created_at < $2)
             ORDER BY created_at DESC
             LIMIT $3",
        )
        .bind(thread_id)
        .bind(cursor_created_at)
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await
        .map_err(backend_err)?;
        Ok(rows.into_iter().map(StateSnapshotRow::into_domain).collect())
    }

    async fn get_state(&self, thread_id: Uuid) -> Result<StateSnapshot> {
        let row: Option<StateSnapshotRow> = sqlx::query_as(
            "SELECT * FROM thread_states WHERE thread_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(thread_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_err)?;
        if let Some(row) = row {
            return Ok(row.into_domain());
        }
        let thread = self.get_thread(thread_id).await?;
        Ok(StateSnapshot {
            thread_id,
            values: thread.values,
            next: Vec::new(),
            tasks: Vec::new(),
            metadata: serde_json::Map::new(),
            checkpoint_id: Uuid::new_v4(),
            parent_checkpoint: None,
            interrupts: Vec::new(),
            created_at: thread.updated_at,
        })
    }

    async fn search_threads(&self, filter: ThreadFilter, page: Page) -> Result<Vec<Thread>> {
        let metadata_json = serde_json::Value::Object(filter.metadata);
        let status = filter.status.map(ThreadRow::status_str);
        let rows: Vec<ThreadRow> = sqlx::query_as(
            "SELECT * FROM threads
             WHERE metadata @> $1
               AND ($2::text IS NULL OR status = $2)
               AND ($3::text IS NULL OR metadata->>'owner' = $3 OR metadata->>'owner' = 'system')
             ORDER BY created_at DESC
             LIMIT $4 OFFSET $5",
        )
        .bind(metadata_json)
        .bind(status)
        .bind(filter.owner)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(backend_err)?;
        Ok(rows.into_iter().map(ThreadRow::into_domain).collect())
    }

    async fn count_threads(&self, filter: ThreadFilter) -> Result<i64> {
        let metadata_json = serde_json::Value::Object(filter.metadata);
        let status = filter.status.map(ThreadRow::status_str);
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM threads
             WHERE metadata @> $1
               AND ($2::text IS NULL OR status = $2)
               AND ($3::text IS NULL OR metadata->>'owner' = $3 OR metadata->>'owner' = 'system')",
        )
        .bind(metadata_json)
        .bind(status)
        .bind(filter.owner)
        .fetch_one(&self.pool)
        .await
        .map_err(backend_err)?;
        Ok(count)
    }

    async fn create_run(&self, run: Run) -> Result<Run> {
        let row = RunRow::from_domain(&run);
        sqlx::query(
            "INSERT INTO runs (run_id, thread_id, assistant_id, status, metadata, input, config, multitask_strategy, error, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(row.run_id)
        .bind(row.thread_id)
        .bind(row.assistant_id)
        .bind(&row.status)
        .bind(&row.metadata)
        .bind(&row.input)
        .bind(&row.config)
        .bind(&row.multitask_strategy)
        .bind(&row.error)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await
        .map_err(backend_err)?;
        Ok(run)
    }

    async fn get_run(&self, thread_id: Uuid, run_id: Uuid) -> Result<Run> {
        let row: RunRow = sqlx::query_as("SELECT * FROM runs WHERE run_id = $1 AND thread_id = $2")
            .bind(run_id)
            .bind(thread_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend_err)?
            .ok_or_else(|| StorageError::NotFound(format!("run {run_id} not found")))?;
        Ok(row.into_domain())
    }

    async fn update_run_status(
        &self,
        run_id: Uuid,
        status: RunStatus,
        error: Option<String>,
    ) -> Result<Run> {
        let row: RunRow = sqlx::query_as(
            "UPDATE runs SET status = $2, error = $3, updated_at = now() WHERE run_id = $1 RETURNING *",
        )
        .bind(run_id)
        .bind(RunRow::status_str(status))
        .bind(&error)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_err)?
        .ok_or_else(|| StorageError::NotFound(format!("run {run_id} not found")))?;
        Ok(row.into_domain())
    }

    async fn list_runs(&self, thread_id: Uuid, filter: RunFilter, page: Page) -> Result<Vec<Run>> {
        let status = filter.status.map(RunRow::status_str);
        let rows: Vec<RunRow> = sqlx::query_as(
            "SELECT * FROM runs
             WHERE thread_id = $1
               AND ($2::text IS NULL OR status = $2)
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4",
        )
        .bind(thread_id)
        .bind(status)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(backend_err)?;
        Ok(rows.into_iter().map(RunRow::into_domain).collect())
    }

    async fn active_runs_for_thread(&self, thread_id: Uuid) -> Result<Vec<Run>> {
        let rows: Vec<RunRow> = sqlx::query_as(
            "SELECT * FROM runs WHERE thread_id = $1 AND status IN ('pending', 'running')",
        )
        .bind(thread_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend_err)?;
        Ok(rows.into_iter().map(RunRow::into_domain).collect())
    }

    async fn delete_run(&self, thread_id: Uuid, run_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM runs WHERE run_id = $1 AND thread_id = $2")
            .bind(run_id)
            .bind(thread_id)
            .execute(&self.pool)
            .await
            .map_err(backend_err)?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("run {run_id} not found")));
        }
        Ok(())
    }

    async fn put_store_item(&self, item: StoreItem) -> Result<()> {
        let row = StoreItemRow::from_domain(&item);
        sqlx::query(
            "INSERT INTO store_items (namespace, key, value, owner, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (namespace, key, owner)
             DO UPDATE SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at",
        )
        .bind(&row.namespace)
        .bind(&row.key)
        .bind(&row.value)
        .bind(&row.owner)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await
        .map_err(backend_err)?;
        Ok(())
    }

    async fn get_store_item(&self, namespace: &[String], key: &str, owner: &str) -> Result<StoreItem> {
        let row: StoreItemRow = sqlx::query_as(
            "SELECT * FROM store_items WHERE namespace = $1 AND key = $2 AND owner = $3",
        )
        .bind(namespace)
        .bind(key)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_err)?
        .ok_or_else(|| StorageError::NotFound(format!("store item {key} not found")))?;
        Ok(row.into_domain())
    }

    async fn delete_store_item(&self, namespace: &[String], key: &str, owner: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM store_items WHERE namespace = $1 AND key = $2 AND owner = $3")
            .bind(namespace)
            .bind(key)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(backend_err)?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("store item {key} not found")));
        }
        Ok(())
    }

    async fn search_store_items(
        &self,
        namespace_prefix: &[String],
        owner: &str,
        page: Page,
    ) -> Result<Vec<StoreItem>> {
        let rows: Vec<StoreItemRow> = sqlx::query_as(
            "SELECT * FROM store_items
             WHERE owner = $1 AND namespace[1:array_length($2::text[], 1)] = $2
             ORDER BY updated_at DESC
             LIMIT $3 OFFSET $4",
        )
        .bind(owner)
        .bind(namespace_prefix)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(backend_err)?;
        Ok(rows.into_iter().map(StoreItemRow::into_domain).collect())
    }

    async fn list_namespaces(&self, owner: &str) -> Result<Vec<Vec<String>>> {
        let rows: Vec<(Vec<String>,)> =
            sqlx::query_as("SELECT DISTINCT namespace FROM store_items WHERE owner = $1 ORDER BY namespace")
                .bind(owner)
                .fetch_all(&self.pool)
                .await
                .map_err(backend_err)?;
        Ok(rows.into_iter().map(|(ns,)| ns).collect())
    }

    async fn create_cron(&self, cron: CronJob) -> Result<CronJob> {
        let row = CronRow::from_domain(&cron);
        sqlx::query(
            "INSERT INTO crons (cron_id, assistant_id, thread_id, schedule, end_time, payload, metadata, next_run_at, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(row.cron_id)
        .bind(row.assistant_id)
        .bind(row.thread_id)
        .bind(&row.schedule)
        .bind(row.end_time)
        .bind(&row.payload)
        .bind(&row.metadata)
        .bind(row.next_run_at)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await
        .map_err(backend_err)?;
        Ok(cron)
    }

    async fn get_cron(&self, id: Uuid) -> Result<CronJob> {
        let row: CronRow = sqlx::query_as("SELECT * FROM crons WHERE cron_id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend_err)?
            .ok_or_else(|| StorageError::NotFound(format!("cron {id} not found")))?;
        Ok(row.into_domain())
    }

    async fn delete_cron(&self, id: Uuid, owner: Option<&str>) -> Result<()> {
        self.get_cron_for_write(id, owner).await?;
        let result = sqlx::query("DELETE FROM crons WHERE cron_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend_err)?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("cron {id} not found")));
        }
        Ok(())
    }

    async fn search_crons(&self, owner: Option<&str>, page: Page) -> Result<Vec<CronJob>> {
        let rows: Vec<CronRow> = sqlx::query_as(
            "SELECT * FROM crons
             WHERE ($1::text IS NULL OR metadata->>'owner' = $1 OR metadata->>'owner' = 'system')
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(owner)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(backend_err)?;
        Ok(rows.into_iter().map(CronRow::into_domain).collect())
    }

    async fn count_crons(&self, owner: Option<&str>) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM crons
             WHERE ($1::text IS NULL OR metadata->>'owner' = $1 OR metadata->>'owner' = 'system')",
        )
        .bind(owner)
        .fetch_one(&self.pool)
        .await
        .map_err(backend_err)?;
        Ok(count)
    }

    async fn due_crons(&self, now: DateTime<Utc>) -> Result<Vec<CronJob>> {
        let rows: Vec<CronRow> = sqlx::query_as("SELECT * FROM crons WHERE next_run_at <= $1")
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(backend_err)?;
        Ok(rows.into_iter().map(CronRow::into_domain).collect())
    }

    async fn reschedule_cron(&self, id: Uuid, next_run_at: DateTime<Utc>) -> Result<()> {
        let result = sqlx::query("UPDATE crons SET next_run_at = $2 WHERE cron_id = $1")
            .bind(id)
            .bind(next_run_at)
            .execute(&self.pool)
            .await
            .map_err(backend_err)?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("cron {id} not found")));
        }
        Ok(())
    }
}
