//! Error type surfaced by a [`crate::GraphFactory`]/[`crate::Graph`]
//! implementation back to the run engine.

use thiserror::Error;

/// Result type for graph factory/graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors a graph factory or a compiled graph may return. The run engine
/// (spec §4.6.5, §4.6.6) maps these onto an `error` SSE event or a 500
/// response; it never inspects the variant beyond the display message.
#[derive(Debug, Error)]
pub enum GraphError {
    /// `graph_id` did not resolve to a registered factory.
    #[error("unknown graph_id: {0}")]
    UnknownGraph(String),

    /// The factory failed to construct a graph for the given configurable.
    #[error("failed to initialize agent: {0}")]
    BuildFailed(String),

    /// `invoke` failed during execution.
    #[error("agent execution failed: {0}")]
    ExecutionFailed(String),

    /// `get_state` failed (read-back step of spec §4.6.5).
    #[error("failed to read graph state: {0}")]
    StateReadFailed(String),
}
