//! Normalizes a run's wire-level `input` into the `GraphInput` a graph
//! factory's contract expects: a list of [`Message`]s, regardless of
//! whether the caller sent `{"messages": [...]}`, a single message object,
//! or a bare string.

use langgraph_checkpoint::{Message, MessageType};
use langgraph_core::GraphInput;
use serde_json::Value;

pub fn normalize(input: &Value) -> GraphInput {
    let messages = match input {
        Value::Object(map) => match map.get("messages") {
            Some(Value::Array(items)) => items.iter().filter_map(parse_message).collect(),
            Some(single) => parse_message(single).into_iter().collect(),
            None => Vec::new(),
        },
        Value::Array(items) => items.iter().filter_map(parse_message).collect(),
        Value::String(text) => vec![Message::human(text.clone())],
        _ => Vec::new(),
    };
    GraphInput { messages }
}

fn parse_message(value: &Value) -> Option<Message> {
    match value {
        Value::String(text) => Some(Message::human(text.clone())),
        Value::Object(map) => {
            let content = map.get("content")?.as_str()?.to_string();
            let message_type = map
                .get("type")
                .or_else(|| map.get("role"))
                .and_then(Value::as_str)
                .and_then(MessageType::parse)
                .unwrap_or(MessageType::Human);
            let mut message = Message::new(message_type, content);
            if let Some(id) = map.get("id").and_then(Value::as_str) {
                message = message.with_id(id);
            }
            Some(message)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_bare_string_to_one_human_message() {
        let input = normalize(&json!("hello"));
        assert_eq!(input.messages.len(), 1);
        assert_eq!(input.messages[0].content, "hello");
    }

    #[test]
    fn normalizes_messages_array_with_role_synonyms() {
        let input = normalize(&json!({"messages": [{"role": "user", "content": "hi"}]}));
        assert_eq!(input.messages.len(), 1);
        assert_eq!(input.messages[0].content, "hi");
    }

    #[test]
    fn empty_object_yields_no_messages() {
        let input = normalize(&json!({}));
        assert!(input.messages.is_empty());
    }
}
