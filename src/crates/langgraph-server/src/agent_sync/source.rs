//! The external collaborator agent-sync reconciles against. A real
//! deployment implements [`AgentSource`] against its own product database;
//! [`NoopAgentSource`] is the default when no source is configured, so
//! sync degrades to a no-op instead of failing startup.

use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

/// One externally-defined agent, in whatever shape the source's own schema
/// puts it. `sampling_params` is spread directly into the assistant's
/// `config.configurable` rather than nested, and `mcp_servers` is grouped
/// under `config.configurable.mcp_config` with the `tools` key always
/// omitted — tool wiring is this server's Non-goal, not agent-sync's.
#[derive(Debug, Clone)]
pub struct ExternalAgentRow {
    pub external_id: String,
    pub graph_id: String,
    pub name: Option<String>,
    pub scope: String,
    pub sampling_params: Map<String, Value>,
    pub mcp_servers: Vec<Value>,
}

impl ExternalAgentRow {
    /// Deterministic so re-syncing the same external id never creates a
    /// duplicate assistant.
    pub fn assistant_id(&self) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, self.external_id.as_bytes())
    }

    pub fn owner(&self) -> &str {
        self.scope.split(':').next().unwrap_or(&self.scope)
    }
}

#[async_trait]
pub trait AgentSource: Send + Sync {
    async fn list_agents(&self) -> Result<Vec<ExternalAgentRow>, String>;
}

#[derive(Debug, Default)]
pub struct NoopAgentSource;

#[async_trait]
impl AgentSource for NoopAgentSource {
    async fn list_agents(&self) -> Result<Vec<ExternalAgentRow>, String> {
        Ok(Vec::new())
    }
}
