//! The message vocabulary shared by the checkpointer, the graph factory
//! contract, and the run engine's input-normalisation step.
//!
//! This mirrors the shape LangGraph's Python SDK puts on the wire: a
//! discriminated `type` field, free-form `content`, and the handful of
//! LLM-call bookkeeping fields (`tool_calls`, `usage_metadata`, ...) that a
//! real model client would populate. `langgraph-server` only ever treats
//! `content` and `type` as meaningful; the rest round-trips opaquely.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Discriminates who produced a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Human,
    Ai,
    System,
    Tool,
}

impl MessageType {
    /// Parse the `type`/`role` field of an inbound message, accepting the
    /// common synonyms SDKs send (`"user"` for `human`, `"assistant"` for
    /// `ai`).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "human" | "user" => Some(MessageType::Human),
            "ai" | "assistant" => Some(MessageType::Ai),
            "system" => Some(MessageType::System),
            "tool" => Some(MessageType::Tool),
            _ => None,
        }
    }
}

/// A single message in a thread's accumulated conversation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub content: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub additional_kwargs: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub response_metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalid_tool_calls: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<Value>,
}

impl Message {
    pub fn new(message_type: MessageType, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            message_type,
            content: content.into(),
            additional_kwargs: Map::new(),
            response_metadata: Map::new(),
            tool_calls: Vec::new(),
            invalid_tool_calls: Vec::new(),
            usage_metadata: None,
        }
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self::new(MessageType::Human, content)
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(MessageType::Ai, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageType::System, content)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn is_ai(&self) -> bool {
        self.message_type == MessageType::Ai
    }
}

/// Merge `new` into `history`, the same reducer semantics LangGraph's
/// `add_messages` uses: a message whose `id` already exists in `history` is
/// replaced in place (preserving order), everything else is appended.
pub fn merge_messages(mut history: Vec<Message>, new: Vec<Message>) -> Vec<Message> {
    for msg in new {
        if let Some(existing) = history.iter_mut().find(|m| m.id == msg.id) {
            *existing = msg;
        } else {
            history.push(msg);
        }
    }
    history
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_role_synonyms() {
        assert_eq!(MessageType::parse("user"), Some(MessageType::Human));
        assert_eq!(MessageType::parse("assistant"), Some(MessageType::Ai));
        assert_eq!(MessageType::parse("SYSTEM"), Some(MessageType::System));
        assert_eq!(MessageType::parse("bogus"), None);
    }

    #[test]
    fn merge_appends_new_and_replaces_existing_by_id() {
        let history = vec![Message::human("hi").with_id("1")];
        let merged = merge_messages(
            history,
            vec![
                Message::human("hi edited").with_id("1"),
                Message::ai("hello").with_id("2"),
            ],
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].content, "hi edited");
        assert_eq!(merged[1].content, "hello");
    }

    #[test]
    fn message_constructors_assign_default_ids() {
        let m = Message::human("hi");
        assert!(!m.id.is_empty());
        assert_eq!(m.message_type, MessageType::Human);
    }
}
