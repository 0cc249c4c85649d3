//! SSE framing for streamed runs. Event sequence is fixed:
//! `metadata` -> `values` (pre-run state) -> zero or more `messages` deltas
//! -> `updates` -> `values` (post-run state) -> `end`.

use async_stream::stream;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use langgraph_checkpoint::Message;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::time::Duration;
use uuid::Uuid;

pub fn headers() -> [(&'static str, &'static str); 3] {
    [
        ("Cache-Control", "no-store"),
        ("X-Accel-Buffering", "no"),
        ("Content-Type", "text/event-stream; charset=utf-8"),
    ]
}

fn event(name: &str, data: Value) -> Event {
    Event::default().event(name).json_data(data).unwrap_or_else(|_| Event::default().event(name).data("{}"))
}

/// One run's worth of SSE events, built from the pieces the run engine
/// gathers along the way. `new_messages` is emitted as individual
/// `messages` deltas in order, mirroring how a real token-streaming graph
/// would emit them one at a time even though this one produces its reply
/// in a single step.
pub fn run_stream(
    run_id: Uuid,
    pre_values: Value,
    new_messages: Vec<Message>,
    post_values: Value,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let body = stream! {
        yield Ok(event("metadata", json!({ "run_id": run_id })));
        yield Ok(event("values", pre_values));
        for message in &new_messages {
            yield Ok(event("messages", json!([message, { "run_id": run_id }])));
        }
        yield Ok(event("updates", json!({ "messages": new_messages })));
        yield Ok(event("values", post_values));
        yield Ok(Event::default().event("end").data(""));
    };
    Sse::new(body).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

/// A stream carrying a single `error` event then `end`, for runs that fail
/// after the SSE response has already started.
pub fn error_stream(message: String) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let body = stream! {
        yield Ok(event("error", json!({ "error": message })));
        yield Ok(Event::default().event("end").data(""));
    };
    Sse::new(body)
}
