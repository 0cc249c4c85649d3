//! Environment-variable configuration helpers.
//!
//! A small set of `get_env*` helpers used by `langgraph-server`'s
//! `ServerConfig::from_env` to read `DATABASE_URL`, `AGENT_SYNC_SCOPE`, and
//! friends without every call site re-implementing parse-or-default logic.

use crate::error::{Result, UtilsError};

/// Get an environment variable as a string.
pub fn get_env(key: &str) -> Result<String> {
    std::env::var(key).map_err(|e| {
        UtilsError::ConfigError(format!("Environment variable '{}' not found: {}", key, e))
    })
}

/// Get an environment variable with a default value.
pub fn get_env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an environment variable and parse it, or use a default value.
pub fn get_env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Get a boolean environment variable with a default.
///
/// Accepts `true/false`, `1/0`, `yes/no`, `on/off`, case-insensitively;
/// anything else falls back to `default`.
pub fn get_env_bool_or(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(value) => match value.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => true,
            "false" | "0" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Environment variables are process-global; serialize the tests that touch them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_get_env_or_default() {
        let _guard = ENV_LOCK.lock().unwrap();
        let value = get_env_or("LANGGRAPH_TEST_NONEXISTENT", "default");
        assert_eq!(value, "default");
    }

    #[test]
    fn test_get_env_existing() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var("LANGGRAPH_TEST_EXISTING", "value");
        assert_eq!(get_env("LANGGRAPH_TEST_EXISTING").unwrap(), "value");
        env::remove_var("LANGGRAPH_TEST_EXISTING");
    }

    #[test]
    fn test_get_env_missing() {
        let _guard = ENV_LOCK.lock().unwrap();
        assert!(get_env("LANGGRAPH_TEST_DEFINITELY_MISSING").is_err());
    }

    #[test]
    fn test_get_env_parse_or() {
        let _guard = ENV_LOCK.lock().unwrap();
        assert_eq!(get_env_parse_or("LANGGRAPH_TEST_PORT_MISSING", 8080u16), 8080);
        env::set_var("LANGGRAPH_TEST_PORT", "9090");
        assert_eq!(get_env_parse_or("LANGGRAPH_TEST_PORT", 8080u16), 9090);
        env::remove_var("LANGGRAPH_TEST_PORT");
    }

    #[test]
    fn test_get_env_bool_or() {
        let _guard = ENV_LOCK.lock().unwrap();
        assert!(get_env_bool_or("LANGGRAPH_TEST_BOOL_MISSING", true));
        env::set_var("LANGGRAPH_TEST_BOOL", "YES");
        assert!(get_env_bool_or("LANGGRAPH_TEST_BOOL", false));
        env::set_var("LANGGRAPH_TEST_BOOL", "0");
        assert!(!get_env_bool_or("LANGGRAPH_TEST_BOOL", true));
        env::remove_var("LANGGRAPH_TEST_BOOL");
    }
}
