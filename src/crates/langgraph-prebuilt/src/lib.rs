//! Default [`GraphFactory`](langgraph_core::GraphFactory) implementation.
//!
//! A real deployment registers its own graph factories against the run
//! engine's registry; this crate exists so a fresh server has something
//! registered under `graph_id = "agent"` without any external wiring, and
//! so the checkpointer accumulation contract (spec §4.6.5) has a concrete,
//! testable implementation to run against.

mod graph;
mod recall;

pub use graph::{EchoGraph, EchoGraphFactory};
