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

/// A stateless run creates its own thread behind the scenes, but leaves
/// nothing behind once it completes: no thread to list, no history to
/// fetch.
#[tokio::test]
async fn stateless_run_leaves_no_thread_behind() {
    let router = common::router();
    let (_, assistant) = post_json(&router, "/assistants", "alice", json!({"graph_id": "agent"})).await;
    let assistant_id = assistant["assistant_id"].as_str().unwrap();

    let (status, run) = post_json(
        &router,
        "/runs",
        "alice",
        json!({
            "assistant_id": assistant_id,
            "input": {"messages": [{"role": "human", "content": "hi"}]},
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(run["status"], "success");
    let thread_id = run["thread_id"].as_str().unwrap();

    let get_thread = Request::builder()
        .uri(format!("/threads/{thread_id}"))
        .header(header::AUTHORIZATION, common::bearer("alice"))
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(get_thread).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
