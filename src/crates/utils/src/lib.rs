//! Small shared utilities used across the langgraph-server workspace.
//!
//! Currently this is limited to environment-variable configuration helpers
//! ([`config`]) and a shared error type. Anything with a broader footprint
//! (HTTP client/server scaffolding) lives in the crate that actually needs
//! it rather than here.

pub mod config;
pub mod error;

pub use config::{get_env, get_env_bool_or, get_env_or, get_env_parse_or};
pub use error::{Result, UtilsError};
