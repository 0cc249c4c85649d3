//! `buildRunnableConfig`: merges an assistant's stored configurable, a
//! run's per-call override, and the reserved identity keys the engine
//! injects, in that precedence order (reserved keys always win — a caller
//! cannot override `thread_id` by smuggling it into `config.configurable`).

use langgraph_core::{Configurable, RunnableConfig};
use serde_json::{Map, Value};
use uuid::Uuid;

pub fn build(
    assistant_config: &Value,
    run_config_override: Option<&Value>,
    thread_id: Uuid,
    assistant_id: Uuid,
    run_id: Uuid,
    graph_id: &str,
    owner: &str,
) -> RunnableConfig {
    let mut configurable: Configurable = Map::new();

    if let Some(base) = assistant_config.get("configurable").and_then(Value::as_object) {
        configurable.extend(base.clone());
    }
    if let Some(override_cfg) = run_config_override.and_then(|c| c.get("configurable")).and_then(Value::as_object) {
        configurable.extend(override_cfg.clone());
    }

    configurable.insert("thread_id".into(), Value::String(thread_id.to_string()));
    configurable.insert("assistant_id".into(), Value::String(assistant_id.to_string()));
    configurable.insert("run_id".into(), Value::String(run_id.to_string()));
    configurable.insert("graph_id".into(), Value::String(graph_id.to_string()));
    configurable.insert("user_id".into(), Value::String(owner.to_string()));
    configurable.remove("checkpoint_ns");

    let metadata = run_config_override
        .and_then(|c| c.get("metadata"))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    RunnableConfig::new(configurable).with_metadata(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reserved_keys_override_caller_supplied_values() {
        let assistant_config = json!({"configurable": {"model": "x", "thread_id": "smuggled"}});
        let config = build(
            &assistant_config,
            None,
            Uuid::nil(),
            Uuid::nil(),
            Uuid::nil(),
            "agent",
            "alice",
        );
        assert_eq!(
            config.configurable.get("thread_id").unwrap(),
            &Value::String(Uuid::nil().to_string())
        );
        assert_eq!(config.configurable.get("model").unwrap(), "x");
    }

    #[test]
    fn run_override_wins_over_assistant_config() {
        let assistant_config = json!({"configurable": {"model": "a"}});
        let run_override = json!({"configurable": {"model": "b"}});
        let config = build(
            &assistant_config,
            Some(&run_override),
            Uuid::nil(),
            Uuid::nil(),
            Uuid::nil(),
            "agent",
            "alice",
        );
        assert_eq!(config.configurable.get("model").unwrap(), "b");
    }

    #[test]
    fn checkpoint_ns_is_never_carried() {
        let assistant_config = json!({"configurable": {"checkpoint_ns": "nope"}});
        let config = build(&assistant_config, None, Uuid::nil(), Uuid::nil(), Uuid::nil(), "agent", "alice");
        assert!(!config.configurable.contains_key("checkpoint_ns"));
    }
}
