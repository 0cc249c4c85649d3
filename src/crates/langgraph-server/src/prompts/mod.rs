//! Prompt lookup: a name resolves to a template stored cross-thread (via
//! the same store used for `/store` — namespace `["prompts"]`, owner
//! `system`), falling back to a code-registered default when nothing is
//! stored. Results are cached for a short TTL so a hot run loop doesn't
//! hit storage on every invocation.

use dashmap::DashMap;
use std::collections::HashMap;
use std::time::{Duration, Instant};

const CACHE_TTL: Duration = Duration::from_secs(30);

pub struct PromptRegistry {
    defaults: HashMap<String, String>,
    cache: DashMap<String, (String, Instant)>,
}

impl PromptRegistry {
    pub fn new(defaults: HashMap<String, String>) -> Self {
        Self { defaults, cache: DashMap::new() }
    }

    /// Resolve `name`, preferring a cached or freshly stored template over
    /// the code-registered default.
    pub async fn resolve(
        &self,
        name: &str,
        storage: &dyn crate::storage::Storage,
    ) -> Option<String> {
        if let Some(entry) = self.cache.get(name) {
            if entry.1.elapsed() < CACHE_TTL {
                return Some(entry.0.clone());
            }
        }

        let namespace = vec!["prompts".to_string()];
        if let Ok(item) = storage.get_store_item(&namespace, name, crate::domain::SYSTEM_OWNER).await {
            if let Some(template) = item.value.get("template").and_then(|v| v.as_str()) {
                self.cache.insert(name.to_string(), (template.to_string(), Instant::now()));
                return Some(template.to_string());
            }
        }

        self.defaults.get(name).cloned()
    }

    pub fn invalidate(&self, name: &str) {
        self.cache.remove(name);
    }
}

/// Substitute `{{var}}` placeholders in `template` from `vars`. Unknown
/// placeholders are left verbatim.
pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        output.push_str(&rest[..start]);
        let Some(end) = rest[start..].find("}}") else {
            output.push_str(&rest[start..]);
            return output;
        };
        let key = rest[start + 2..start + end].trim();
        match vars.get(key) {
            Some(value) => output.push_str(value),
            None => output.push_str(&rest[start..start + end + 2]),
        }
        rest = &rest[start + end + 2..];
    }
    output.push_str(rest);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_known_vars_and_leaves_unknown_verbatim() {
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Luke".to_string());
        let rendered = render("hello {{name}}, missing {{other}}", &vars);
        assert_eq!(rendered, "hello Luke, missing {{other}}");
    }

    #[tokio::test]
    async fn falls_back_to_default_when_nothing_stored() {
        let mut defaults = HashMap::new();
        defaults.insert("greeting".to_string(), "hi there".to_string());
        let registry = PromptRegistry::new(defaults);
        let storage = crate::storage::memory::MemoryStorage::new();
        let resolved = registry.resolve("greeting", &storage).await;
        assert_eq!(resolved, Some("hi there".to_string()));
    }
}
