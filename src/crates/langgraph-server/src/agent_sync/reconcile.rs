//! Turns one [`ExternalAgentRow`] into a stored [`Assistant`], creating it
//! on first sync and updating it (without bumping `version` beyond what a
//! real config change would warrant) on every sync after.

use super::source::ExternalAgentRow;
use crate::domain::Assistant;
use crate::storage::{AssistantPatch, Storage};
use chrono::Utc;
use serde_json::{json, Map, Value};

pub fn row_to_config(row: &ExternalAgentRow) -> Value {
    let mut configurable = row.sampling_params.clone();
    if !row.mcp_servers.is_empty() {
        let mut mcp_config = Map::new();
        mcp_config.insert("servers".into(), Value::Array(row.mcp_servers.clone()));
        configurable.insert("mcp_config".into(), Value::Object(mcp_config));
    }
    json!({ "configurable": configurable })
}

pub async fn reconcile(storage: &dyn Storage, row: ExternalAgentRow) -> Result<Assistant, crate::storage::StorageError> {
    let assistant_id = row.assistant_id();
    let config = row_to_config(&row);
    let owner = row.owner().to_string();

    match storage.get_assistant(assistant_id, None).await {
        Ok(_) => {
            let mut metadata_merge = Map::new();
            metadata_merge.insert("owner".into(), json!(owner));
            metadata_merge.insert("external_id".into(), json!(row.external_id));
            metadata_merge.insert("synced_at".into(), json!(Utc::now().to_rfc3339()));
            storage
                .update_assistant(
                    assistant_id,
                    AssistantPatch {
                        graph_id: Some(row.graph_id),
                        name: row.name,
                        config: Some(config),
                        metadata_merge,
                        ..Default::default()
                    },
                    None,
                )
                .await
        }
        Err(_) => {
            let mut metadata = Map::new();
            metadata.insert("owner".into(), json!(owner));
            metadata.insert("external_id".into(), json!(row.external_id));
            metadata.insert("synced_at".into(), json!(Utc::now().to_rfc3339()));
            let now = Utc::now();
            storage
                .create_assistant(Assistant {
                    assistant_id,
                    graph_id: row.graph_id,
                    name: row.name,
                    config,
                    context: Value::Null,
                    metadata,
                    version: 1,
                    created_at: now,
                    updated_at: now,
                })
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;

    fn row() -> ExternalAgentRow {
        ExternalAgentRow {
            external_id: "agent-1".into(),
            graph_id: "agent".into(),
            name: Some("Agent One".into()),
            scope: "alice:team".into(),
            sampling_params: {
                let mut m = Map::new();
                m.insert("temperature".into(), json!(0.2));
                m
            },
            mcp_servers: vec![json!({"url": "http://localhost:9001"})],
        }
    }

    #[tokio::test]
    async fn first_sync_creates_assistant_with_spread_sampling_params() {
        let storage = MemoryStorage::new();
        let assistant = reconcile(&storage, row()).await.unwrap();
        assert_eq!(assistant.owner(), "alice");
        assert_eq!(assistant.config["configurable"]["temperature"], json!(0.2));
        assert_eq!(assistant.config["configurable"]["mcp_config"]["servers"][0]["url"], "http://localhost:9001");
        assert!(assistant.config["configurable"].get("tools").is_none());
    }

    #[tokio::test]
    async fn resyncing_the_same_external_id_updates_in_place() {
        let storage = MemoryStorage::new();
        let first = reconcile(&storage, row()).await.unwrap();

        let mut second_row = row();
        second_row.name = Some("Agent One Renamed".into());
        let second = reconcile(&storage, second_row).await.unwrap();

        assert_eq!(first.assistant_id, second.assistant_id);
        assert_eq!(second.name, Some("Agent One Renamed".into()));
    }
}
