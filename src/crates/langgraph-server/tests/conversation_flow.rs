mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::util::ServiceExt;

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn post_json(router: &axum::Router, uri: &str, owner: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, common::bearer(owner))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, json_body(response).await)
}

/// A name mentioned in one turn is available to the graph on a later turn
/// in the same thread, because the checkpointer accumulates history keyed
/// by thread id across separate runs.
#[tokio::test]
async fn remembers_a_name_across_separate_runs_on_the_same_thread() {
    let router = common::router();

    let (status, assistant) = post_json(&router, "/assistants", "alice", json!({"graph_id": "agent"})).await;
    assert_eq!(status, StatusCode::OK);
    let assistant_id = assistant["assistant_id"].as_str().unwrap();

    let (status, thread) = post_json(&router, "/threads", "alice", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let thread_id = thread["thread_id"].as_str().unwrap();

    let (status, _snapshot) = post_json(
        &router,
        &format!("/threads/{thread_id}/runs/wait"),
        "alice",
        json!({
            "assistant_id": assistant_id,
            "input": {"messages": [{"role": "human", "content": "my name is Luke"}]},
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, snapshot) = post_json(
        &router,
        &format!("/threads/{thread_id}/runs/wait"),
        "alice",
        json!({
            "assistant_id": assistant_id,
            "input": {"messages": [{"role": "human", "content": "what is my name?"}]},
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(snapshot["values"]["messages"].as_array().is_some());

    let state_request = Request::builder()
        .uri(format!("/threads/{thread_id}/state"))
        .header(header::AUTHORIZATION, common::bearer("alice"))
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(state_request).await.unwrap();
    let state = json_body(response).await;
    let messages = state["values"]["messages"].as_array().unwrap();
    let last_reply = messages.last().unwrap()["content"].as_str().unwrap();
    assert!(last_reply.contains("Luke"), "expected reply to recall the name Luke, got: {last_reply}");
}

/// Thread state reads are not owner-scoped: the thread id is the access
/// token, so a different caller who knows the id can still read it.
#[tokio::test]
async fn thread_state_read_ignores_the_caller_identity() {
    let router = common::router();

    let (_, assistant) = post_json(&router, "/assistants", "alice", json!({"graph_id": "agent"})).await;
    let assistant_id = assistant["assistant_id"].as_str().unwrap();
    let (_, thread) = post_json(&router, "/threads", "alice", json!({})).await;
    let thread_id = thread["thread_id"].as_str().unwrap();

    post_json(
        &router,
        &format!("/threads/{thread_id}/runs/wait"),
        "alice",
        json!({"assistant_id": assistant_id, "input": {"messages": [{"role": "human", "content": "hi"}]}}),
    )
    .await;

    let request = Request::builder()
        .uri(format!("/threads/{thread_id}/state"))
        .header(header::AUTHORIZATION, common::bearer("mallory"))
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
