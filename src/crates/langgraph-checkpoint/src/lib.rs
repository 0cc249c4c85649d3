//! Message vocabulary and the [`Checkpointer`] trait.
//!
//! This crate is deliberately small: spec.md treats the checkpointer as an
//! opaque external collaborator that owns message accumulation keyed by
//! `thread_id`, so the only things that belong here are the wire-level
//! [`Message`] type both the checkpointer and the graph factory need to
//! agree on, the [`Checkpointer`] trait itself, and the in-memory default
//! implementation.

pub mod error;
pub mod memory;
pub mod messages;
pub mod traits;

pub use error::{CheckpointError, Result};
pub use memory::MemoryCheckpointer;
pub use messages::{merge_messages, Message, MessageType};
pub use traits::Checkpointer;
