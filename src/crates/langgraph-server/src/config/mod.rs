//! Server configuration, read entirely from the process environment. No
//! YAML/TOML file, no SSL/LDAP layer — startup is `ServerConfig::from_env()`
//! then go.

use utils::{get_env_bool_or, get_env_or, get_env_parse_or};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub database_url: Option<String>,
    pub auth_mode: AuthMode,
    pub hmac_secret: Option<String>,
    pub cron_tick_secs: u64,
    pub agent_sync_on_startup: bool,
    pub agent_sync_scope: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Any bearer token is trusted verbatim as the owner name. Only fit for
    /// local development.
    Permissive,
    /// `<owner>.<hex hmac-sha256>` tokens signed with `hmac_secret`.
    Hmac,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let bind_addr = get_env_or("LANGGRAPH_BIND_ADDR", "0.0.0.0:8000");
        let database_url = std::env::var("DATABASE_URL").ok();
        let hmac_secret = std::env::var("LANGGRAPH_HMAC_SECRET").ok();
        let auth_mode = match get_env_or("LANGGRAPH_AUTH_MODE", "permissive").as_str() {
            "hmac" => AuthMode::Hmac,
            _ => AuthMode::Permissive,
        };
        let cron_tick_secs = get_env_parse_or("LANGGRAPH_CRON_TICK_SECS", 30u64);
        let agent_sync_on_startup = get_env_bool_or("LANGGRAPH_AGENT_SYNC_ON_STARTUP", true);
        let agent_sync_scope = get_env_or("LANGGRAPH_AGENT_SYNC_SCOPE", "system");

        if auth_mode == AuthMode::Hmac && hmac_secret.is_none() {
            tracing::warn!("LANGGRAPH_AUTH_MODE=hmac but LANGGRAPH_HMAC_SECRET is unset, falling back to permissive auth");
        }

        Self {
            bind_addr,
            database_url,
            auth_mode,
            hmac_secret,
            cron_tick_secs,
            agent_sync_on_startup,
            agent_sync_scope,
        }
    }

    pub fn effective_auth_mode(&self) -> AuthMode {
        if self.auth_mode == AuthMode::Hmac && self.hmac_secret.is_none() {
            AuthMode::Permissive
        } else {
            self.auth_mode
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn hmac_mode_without_secret_falls_back_to_permissive() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("LANGGRAPH_AUTH_MODE", "hmac");
        std::env::remove_var("LANGGRAPH_HMAC_SECRET");
        let config = ServerConfig::from_env();
        assert_eq!(config.effective_auth_mode(), AuthMode::Permissive);
        std::env::remove_var("LANGGRAPH_AUTH_MODE");
    }

    #[test]
    fn defaults_apply_when_unset() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("LANGGRAPH_BIND_ADDR");
        std::env::remove_var("LANGGRAPH_AUTH_MODE");
        let config = ServerConfig::from_env();
        assert_eq!(config.bind_addr, "0.0.0.0:8000");
        assert_eq!(config.effective_auth_mode(), AuthMode::Permissive);
    }
}
