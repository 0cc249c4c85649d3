//! LangGraph-compatible control plane: assistants, threads, runs, cron jobs
//! and a cross-thread key/value store, served over HTTP with SSE streaming
//! plus MCP and A2A JSON-RPC surfaces.
//!
//! Runs execute synchronously within the request (or cron tick) that starts
//! them — there is no background dispatch queue in this version, so
//! `MultitaskStrategy::Enqueue` has no dispatcher to hand a deferred run to
//! and `join` is just a fetch of an already-terminal run.

pub mod agent_sync;
pub mod api;
pub mod config;
pub mod context;
pub mod cron;
pub mod domain;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod prompts;
pub mod rpc;
pub mod sse;
pub mod state;
pub mod storage;

pub use error::{ApiError, Result};
pub use state::AppState;

/// Crate version, surfaced on `/ok`.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
