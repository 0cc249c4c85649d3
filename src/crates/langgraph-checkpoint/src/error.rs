//! Error type for checkpointer operations.

use thiserror::Error;

/// Result type for checkpointer operations.
pub type Result<T> = std::result::Result<T, CheckpointError>;

/// Errors a [`crate::Checkpointer`] implementation may return.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// The thread has no accumulated history yet.
    #[error("no checkpoint for thread {0}")]
    NotFound(String),

    /// The backing store failed (serialization, I/O, connection, ...).
    #[error("checkpoint backend error: {0}")]
    Backend(String),
}
