//! Tiny heuristic the default graph uses to produce a reply that actually
//! depends on prior turns, so multi-turn accumulation (spec §4.6.5 step 5)
//! is observably exercised rather than every reply being a fixed string.

use langgraph_checkpoint::{Message, MessageType};

/// Look for `"my name is X"` / `"i'm X"` / `"i am X"` in prior human
/// messages, most recent first.
pub fn remembered_name(history: &[Message]) -> Option<String> {
    let patterns = ["my name is ", "i'm ", "i am "];
    history
        .iter()
        .rev()
        .filter(|m| m.message_type == MessageType::Human)
        .find_map(|m| {
            let lower = m.content.to_ascii_lowercase();
            patterns.iter().find_map(|p| {
                lower.find(p).map(|idx| {
                    let rest = &m.content[idx + p.len()..];
                    rest.split(|c: char| !c.is_alphanumeric())
                        .find(|w| !w.is_empty())
                        .unwrap_or("")
                        .to_string()
                })
            })
        })
        .filter(|name| !name.is_empty())
}

fn asks_for_name(content: &str) -> bool {
    let lower = content.to_ascii_lowercase();
    lower.contains("what's my name") || lower.contains("what is my name")
}

/// Produce the assistant's reply to `latest` given everything that came
/// before it in `history` (not yet including `latest`).
pub fn reply_to(history: &[Message], latest: &Message) -> String {
    if asks_for_name(&latest.content) {
        return match remembered_name(history) {
            Some(name) => format!("Your name is {name}."),
            None => "I don't know your name yet — you haven't told me.".to_string(),
        };
    }
    if let Some(name) = remembered_name(std::slice::from_ref(latest)) {
        return format!("Nice to meet you, {name}.");
    }
    format!("You said: {}", latest.content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_name_from_common_phrasings() {
        assert_eq!(
            remembered_name(&[Message::human("my name is Luke")]),
            Some("Luke".to_string())
        );
        assert_eq!(
            remembered_name(&[Message::human("I'm Luke, nice to meet you")]),
            Some("Luke".to_string())
        );
        assert_eq!(remembered_name(&[Message::human("hello there")]), None);
    }

    #[test]
    fn recalls_the_most_recently_stated_name() {
        let history = vec![
            Message::human("my name is Luke"),
            Message::human("actually call me Anakin"),
        ];
        assert_eq!(remembered_name(&history), Some("Anakin".to_string()));
    }

    #[test]
    fn answers_name_question_from_history() {
        let history = vec![Message::human("my name is Luke")];
        let question = Message::human("what's my name?");
        assert_eq!(reply_to(&history, &question), "Your name is Luke.");
    }

    #[test]
    fn admits_not_knowing_when_never_told() {
        let question = Message::human("what's my name?");
        assert_eq!(
            reply_to(&[], &question),
            "I don't know your name yet — you haven't told me."
        );
    }
}
