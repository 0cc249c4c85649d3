//! `DashMap`-backed [`Storage`]. No persistence across restarts; used when
//! `DATABASE_URL` is unset or unreachable at startup, and in tests.

use super::{
    metadata_contains, AssistantFilter, AssistantPatch, Page, Result, RunFilter, Storage,
    StateSnapshotInput, StorageError, ThreadFilter, ThreadPatch,
};
use crate::domain::{Assistant, CronJob, Run, RunStatus, StateSnapshot, StoreItem, Thread};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::Map;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStorage {
    assistants: DashMap<Uuid, Assistant>,
    threads: DashMap<Uuid, Thread>,
    runs: DashMap<Uuid, Run>,
    store: DashMap<(Vec<String>, String, String), StoreItem>,
    crons: DashMap<Uuid, CronJob>,
    snapshots: DashMap<Uuid, Vec<StateSnapshot>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn owner_allows(resource_owner: &str, filter_owner: Option<&str>) -> bool {
    match filter_owner {
        Some(owner) => resource_owner == owner || resource_owner == crate::domain::SYSTEM_OWNER,
        None => true,
    }
}

/// Write-access rule: unlike `owner_allows`, a caller never gets the
/// `"system"`-owner exemption here — system-owned resources are read-only
/// for everyone but `system` itself.
fn owner_can_write(resource_owner: &str, caller: Option<&str>) -> bool {
    match caller {
        Some(owner) => resource_owner == owner,
        None => true,
    }
}

fn page_slice<T: Clone>(mut items: Vec<T>, page: Page) -> Vec<T> {
    if page.offset > 0 {
        items = items.into_iter().skip(page.offset as usize).collect();
    }
    items.into_iter().take(page.limit.max(0) as usize).collect()
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn create_assistant(&self, assistant: Assistant) -> Result<Assistant> {
        self.assistants.insert(assistant.assistant_id, assistant.clone());
        Ok(assistant)
    }

    async fn get_assistant(&self, id: Uuid, owner: Option<&str>) -> Result<Assistant> {
        self.assistants
            .get(&id)
            .map(|a| a.clone())
            .filter(|a| owner_allows(a.owner(), owner))
            .ok_or_else(|| StorageError::NotFound(format!("assistant {id} not found")))
    }

    async fn update_assistant(&self, id: Uuid, patch: AssistantPatch, owner: Option<&str>) -> Result<Assistant> {
        let mut entry = self
            .assistants
            .get_mut(&id)
            .ok_or_else(|| StorageError::NotFound(format!("assistant {id} not found")))?;
        if !owner_can_write(entry.owner(), owner) {
            return Err(StorageError::NotFound(format!("assistant {id} not found")));
        }
        if let Some(graph_id) = patch.graph_id {
            entry.graph_id = graph_id;
        }
        if let Some(name) = patch.name {
            entry.name = Some(name);
        }
        if let Some(config) = patch.config {
            entry.config = config;
        }
        if let Some(context) = patch.context {
            entry.context = context;
        }
        for (k, v) in patch.metadata_merge {
            entry.metadata.insert(k, v);
        }
        entry.version += 1;
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn delete_assistant(&self, id: Uuid, owner: Option<&str>) -> Result<()> {
        self.assistants
            .remove_if(&id, |_, a| owner_can_write(a.owner(), owner))
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(format!("assistant {id} not found")))
    }

    async fn search_assistants(&self, filter: AssistantFilter, page: Page) -> Result<Vec<Assistant>> {
        let mut items: Vec<Assistant> = self
            .assistants
            .iter()
            .map(|e| e.value().clone())
            .filter(|a| filter.graph_id.as_deref().map_or(true, |g| a.graph_id == g))
            .filter(|a| metadata_contains(&a.metadata, &filter.metadata))
            .filter(|a| owner_allows(a.owner(), filter.owner.as_deref()))
            .collect();
        items.sort_by_key(|a| std::cmp::Reverse(a.created_at));
        Ok(page_slice(items, page))
    }

    async fn count_assistants(&self, filter: AssistantFilter) -> Result<i64> {
        Ok(self
            .assistants
            .iter()
            .filter(|e| filter.graph_id.as_deref().map_or(true, |g| e.graph_id == g))
            .filter(|e| metadata_contains(&e.metadata, &filter.metadata))
            .filter(|e| owner_allows(e.owner(), filter.owner.as_deref()))
            .count() as i64)
    }

    async fn create_thread(&self, thread: Thread) -> Result<Thread> {
        self.threads.insert(thread.thread_id, thread.clone());
        Ok(thread)
    }

    async fn get_thread(&self, id: Uuid) -> Result<Thread> {
        self.threads
            .get(&id)
            .map(|t| t.clone())
            .ok_or_else(|| StorageError::NotFound(format!("thread {id} not found")))
    }

    async fn update_thread(&self, id: Uuid, patch: ThreadPatch, owner: Option<&str>) -> Result<Thread> {
        let mut entry = self
            .threads
            .get_mut(&id)
            .ok_or_else(|| StorageError::NotFound(format!("thread {id} not found")))?;
        if !owner_can_write(entry.owner(), owner) {
            return Err(StorageError::NotFound(format!("thread {id} not found")));
        }
        for (k, v) in patch.metadata_merge {
            entry.metadata.insert(k, v);
        }
        if let Some(status) = patch.status {
            entry.status = status;
        }
        if let Some(values) = patch.values {
            entry.values = values;
        }
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn delete_thread(&self, id: Uuid, owner: Option<&str>) -> Result<()> {
        self.threads
            .remove_if(&id, |_, t| owner_can_write(t.owner(), owner))
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(format!("thread {id} not found")))?;
        self.snapshots.remove(&id);
        Ok(())
    }

    async fn search_threads(&self, filter: ThreadFilter, page: Page) -> Result<Vec<Thread>> {
        let mut items: Vec<Thread> = self
            .threads
            .iter()
            .map(|e| e.value().clone())
            .filter(|t| metadata_contains(&t.metadata, &filter.metadata))
            .filter(|t| filter.status.map_or(true, |s| t.status == s))
            .filter(|t| owner_allows(t.owner(), filter.owner.as_deref()))
            .collect();
        items.sort_by_key(|t| std::cmp::Reverse(t.created_at));
        Ok(page_slice(items, page))
    }

    async fn count_threads(&self, filter: ThreadFilter) -> Result<i64> {
        Ok(self
            .threads
            .iter()
            .filter(|e| metadata_contains(&e.metadata, &filter.metadata))
            .filter(|e| filter.status.map_or(true, |s| e.status == s))
            .filter(|e| owner_allows(e.owner(), filter.owner.as_deref()))
            .count() as i64)
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
        self.snapshots.entry(thread_id).or_default().push(snapshot.clone());
        if let Some(mut thread) = self.threads.get_mut(&thread_id) {
            thread.values = snapshot.values.clone();
            thread.updated_at = snapshot.created_at;
        }
        Ok(snapshot)
    }

    async fn get_history(&self, thread_id: Uuid, limit: i64, before: Option<Uuid>) -> Result<Vec<StateSnapshot>> {
        let mut items = self
            .snapshots
            .get(&thread_id)
            .map(|v| v.clone())
            .unwrap_or_default();
        items.sort_by_key(|s| std::cmp::Reverse(s.created_at));

        let items = match before {
            Some(cursor) => match items.iter().position(|s| s.checkpoint_id == cursor) {
                Some(idx) => items[idx + 1..].to_vec(),
                None => return Ok(Vec::new()),
            },
            None => items,
        };
        Ok(items.into_iter().take(limit.max(0) as usize).collect())
    }

    async fn get_state(&self, thread_id: Uuid) -> Result<StateSnapshot> {
        if let Some(latest) = self
            .snapshots
            .get(&thread_id)
            .and_then(|v| v.iter().max_by_key(|s| s.created_at).cloned())
        {
            return Ok(latest);
        }
        let thread = self.get_thread(thread_id).await?;
        Ok(StateSnapshot {
            thread_id,
            values: thread.values,
            next: Vec::new(),
            tasks: Vec::new(),
            metadata: Map::new(),
            checkpoint_id: Uuid::new_v4(),
            parent_checkpoint: None,
            interrupts: Vec::new(),
            created_at: thread.updated_at,
        })
    }

    async fn create_run(&self, run: Run) -> Result<Run> {
        self.runs.insert(run.run_id, run.clone());
        Ok(run)
    }

    async fn get_run(&self, thread_id: Uuid, run_id: Uuid) -> Result<Run> {
        self.runs
            .get(&run_id)
            .map(|r| r.clone())
            .filter(|r| r.thread_id == thread_id)
            .ok_or_else(|| StorageError::NotFound(format!("run {run_id} not found")))
    }

    async fn update_run_status(
        &self,
        run_id: Uuid,
        status: RunStatus,
        error: Option<String>,
    ) -> Result<Run> {
        let mut entry = self
            .runs
            .get_mut(&run_id)
            .ok_or_else(|| StorageError::NotFound(format!("run {run_id} not found")))?;
        entry.status = status;
        entry.error = error;
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn list_runs(&self, thread_id: Uuid, filter: RunFilter, page: Page) -> Result<Vec<Run>> {
        let mut items: Vec<Run> = self
            .runs
            .iter()
            .map(|e| e.value().clone())
            .filter(|r| r.thread_id == thread_id)
            .filter(|r| filter.status.map_or(true, |s| r.status == s))
            .filter(|r| owner_allows(r.owner(), filter.owner.as_deref()))
            .collect();
        items.sort_by_key(|r| std::cmp::Reverse(r.created_at));
        Ok(page_slice(items, page))
    }

    async fn active_runs_for_thread(&self, thread_id: Uuid) -> Result<Vec<Run>> {
        Ok(self
            .runs
            .iter()
            .map(|e| e.value().clone())
            .filter(|r| r.thread_id == thread_id && !r.status.is_terminal())
            .collect())
    }

    async fn delete_run(&self, thread_id: Uuid, run_id: Uuid) -> Result<()> {
        let existed = self
            .runs
            .remove_if(&run_id, |_, r| r.thread_id == thread_id)
            .is_some();
        if existed {
            Ok(())
        } else {
            Err(StorageError::NotFound(format!("run {run_id} not found")))
        }
    }

    async fn put_store_item(&self, item: StoreItem) -> Result<()> {
        let key = (item.namespace.clone(), item.key.clone(), item.owner.clone());
        self.store.insert(key, item);
        Ok(())
    }

    async fn get_store_item(&self, namespace: &[String], key: &str, owner: &str) -> Result<StoreItem> {
        let map_key = (namespace.to_vec(), key.to_string(), owner.to_string());
        self.store
            .get(&map_key)
            .map(|v| v.clone())
            .ok_or_else(|| StorageError::NotFound(format!("store item {key} not found")))
    }

    async fn delete_store_item(&self, namespace: &[String], key: &str, owner: &str) -> Result<()> {
        let map_key = (namespace.to_vec(), key.to_string(), owner.to_string());
        self.store
            .remove(&map_key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(format!("store item {key} not found")))
    }

    async fn search_store_items(
        &self,
        namespace_prefix: &[String],
        owner: &str,
        page: Page,
    ) -> Result<Vec<StoreItem>> {
        let mut items: Vec<StoreItem> = self
            .store
            .iter()
            .map(|e| e.value().clone())
            .filter(|it| it.owner == owner)
            .filter(|it| it.namespace.starts_with(namespace_prefix))
            .collect();
        items.sort_by_key(|it| std::cmp::Reverse(it.updated_at));
        Ok(page_slice(items, page))
    }

    async fn list_namespaces(&self, owner: &str) -> Result<Vec<Vec<String>>> {
        let mut namespaces: Vec<Vec<String>> = self
            .store
            .iter()
            .filter(|e| e.value().owner == owner)
            .map(|e| e.value().namespace.clone())
            .collect();
        namespaces.sort();
        namespaces.dedup();
        Ok(namespaces)
    }

    async fn create_cron(&self, cron: CronJob) -> Result<CronJob> {
        self.crons.insert(cron.cron_id, cron.clone());
        Ok(cron)
    }

    async fn get_cron(&self, id: Uuid) -> Result<CronJob> {
        self.crons
            .get(&id)
            .map(|c| c.clone())
            .ok_or_else(|| StorageError::NotFound(format!("cron {id} not found")))
    }

    async fn delete_cron(&self, id: Uuid, owner: Option<&str>) -> Result<()> {
        self.crons
            .remove_if(&id, |_, c| owner_can_write(c.owner(), owner))
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(format!("cron {id} not found")))
    }

    async fn search_crons(&self, owner: Option<&str>, page: Page) -> Result<Vec<CronJob>> {
        let mut items: Vec<CronJob> = self
            .crons
            .iter()
            .map(|e| e.value().clone())
            .filter(|c| owner_allows(c.owner(), owner))
            .collect();
        items.sort_by_key(|c| std::cmp::Reverse(c.created_at));
        Ok(page_slice(items, page))
    }

    async fn count_crons(&self, owner: Option<&str>) -> Result<i64> {
        Ok(self
            .crons
            .iter()
            .filter(|e| owner_allows(e.owner(), owner))
            .count() as i64)
    }

    async fn due_crons(&self, now: chrono::DateTime<chrono::Utc>) -> Result<Vec<CronJob>> {
        Ok(self
            .crons
            .iter()
            .map(|e| e.value().clone())
            .filter(|c| c.next_run_at <= now)
            .collect())
    }

    async fn reschedule_cron(&self, id: Uuid, next_run_at: chrono::DateTime<chrono::Utc>) -> Result<()> {
        let mut entry = self
            .crons
            .get_mut(&id)
            .ok_or_else(|| StorageError::NotFound(format!("cron {id} not found")))?;
        entry.next_run_at = next_run_at;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::{json, Map};

    fn assistant(owner: &str) -> Assistant {
        let mut metadata = Map::new();
        metadata.insert("owner".into(), json!(owner));
        Assistant {
            assistant_id: Uuid::new_v4(),
            graph_id: "agent".into(),
            name: Some("test".into()),
            config: json!({}),
            context: json!({}),
            metadata,
            version: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn search_respects_owner_and_system_visibility() {
        let storage = MemoryStorage::new();
        storage.create_assistant(assistant("alice")).await.unwrap();
        storage.create_assistant(assistant("system")).await.unwrap();
        storage.create_assistant(assistant("bob")).await.unwrap();

        let results = storage
            .search_assistants(
                AssistantFilter {
                    owner: Some("alice".into()),
                    ..Default::default()
                },
                Page { limit: 10, offset: 0 },
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|a| a.owner() != "bob"));
    }

    #[tokio::test]
    async fn update_merges_metadata_without_clobbering_owner() {
        let storage = MemoryStorage::new();
        let created = storage.create_assistant(assistant("alice")).await.unwrap();

        let mut merge = Map::new();
        merge.insert("label".into(), json!("v2"));
        let updated = storage
            .update_assistant(
                created.assistant_id,
                AssistantPatch { metadata_merge: merge, ..Default::default() },
                Some("alice"),
            )
            .await
            .unwrap();

        assert_eq!(updated.owner(), "alice");
        assert_eq!(updated.metadata.get("label"), Some(&json!("v2")));
        assert_eq!(updated.version, 2);
    }

    #[tokio::test]
    async fn update_by_a_different_owner_is_not_found() {
        let storage = MemoryStorage::new();
        let created = storage.create_assistant(assistant("alice")).await.unwrap();

        let err = storage
            .update_assistant(created.assistant_id, AssistantPatch::default(), Some("bob"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn pagination_clamps_to_limit() {
        let storage = MemoryStorage::new();
        for _ in 0..5 {
            storage.create_assistant(assistant("alice")).await.unwrap();
        }
        let page = storage
            .search_assistants(AssistantFilter::default(), Page { limit: 2, offset: 0 })
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
    }

    #[tokio::test]
    async fn delete_missing_assistant_is_not_found() {
        let storage = MemoryStorage::new();
        let err = storage.delete_assistant(Uuid::new_v4(), None).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_by_a_different_owner_is_not_found() {
        let storage = MemoryStorage::new();
        let created = storage.create_assistant(assistant("alice")).await.unwrap();
        let err = storage.delete_assistant(created.assistant_id, Some("bob")).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
        storage.delete_assistant(created.assistant_id, Some("alice")).await.unwrap();
    }

    #[tokio::test]
    async fn history_with_an_unknown_cursor_is_empty() {
        let storage = MemoryStorage::new();
        let thread_id = Uuid::new_v4();
        storage
            .add_state_snapshot(thread_id, StateSnapshotInput::default())
            .await
            .unwrap();

        let page = storage.get_history(thread_id, 10, Some(Uuid::new_v4())).await.unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn history_walks_back_from_a_known_cursor() {
        let storage = MemoryStorage::new();
        let thread_id = Uuid::new_v4();
        let first = storage
            .add_state_snapshot(thread_id, StateSnapshotInput::default())
            .await
            .unwrap();
        storage
            .add_state_snapshot(
                thread_id,
                StateSnapshotInput { parent_checkpoint: Some(first.checkpoint_id), ..Default::default() },
            )
            .await
            .unwrap();

        let page = storage.get_history(thread_id, 10, Some(first.checkpoint_id)).await.unwrap();
        assert!(page.is_empty(), "nothing precedes the oldest snapshot");

        let full = storage.get_history(thread_id, 10, None).await.unwrap();
        assert_eq!(full.len(), 2);
    }
}
