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

/// Every `/wait` run finishes synchronously inside its own request, so by
/// the time a second `POST .../runs/wait` lands there is no longer an
/// active run on the thread for any multitask strategy to act on — the
/// second run simply proceeds. This test documents that v0 behavior rather
/// than exercising a real race.
#[tokio::test]
async fn sequential_runs_on_an_idle_thread_both_succeed() {
    let router = common::router();
    let (_, assistant) = post_json(&router, "/assistants", "alice", json!({"graph_id": "agent"})).await;
    let assistant_id = assistant["assistant_id"].as_str().unwrap();
    let (_, thread) = post_json(&router, "/threads", "alice", json!({})).await;
    let thread_id = thread["thread_id"].as_str().unwrap();

    for strategy in ["reject", "interrupt", "rollback"] {
        let (status, snapshot) = post_json(
            &router,
            &format!("/threads/{thread_id}/runs/wait"),
            "alice",
            json!({
                "assistant_id": assistant_id,
                "input": {"messages": [{"role": "human", "content": "hi"}]},
                "multitask_strategy": strategy,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "strategy {strategy} should proceed on an idle thread");
        assert!(snapshot["values"]["messages"].as_array().is_some());
    }
}

/// Plain `POST /threads/:id/runs` never executes inline; it just records a
/// `pending` run for a future `/wait`, `/stream`, or background worker to
/// drive. `enqueue`'s FIFO semantics only matter once something actually
/// contends for the thread, which v0 has no dispatcher to do.
#[tokio::test]
async fn enqueue_strategy_on_an_idle_thread_still_proceeds() {
    let router = common::router();
    let (_, assistant) = post_json(&router, "/assistants", "alice", json!({"graph_id": "agent"})).await;
    let assistant_id = assistant["assistant_id"].as_str().unwrap();
    let (_, thread) = post_json(&router, "/threads", "alice", json!({})).await;
    let thread_id = thread["thread_id"].as_str().unwrap();

    let create_request = |body: Value| {
        Request::builder()
            .method("POST")
            .uri(format!("/threads/{thread_id}/runs"))
            .header(header::AUTHORIZATION, common::bearer("alice"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    };

    let first = create_request(json!({
        "assistant_id": assistant_id,
        "input": {"messages": [{"role": "human", "content": "hi"}]},
        "multitask_strategy": "enqueue",
    }));
    let response = router.clone().oneshot(first).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK, "first run on an idle thread always proceeds");

    let list_request = Request::builder()
        .uri(format!("/threads/{thread_id}/runs"))
        .header(header::AUTHORIZATION, common::bearer("alice"))
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(list_request).await.unwrap();
    let runs = json_body(response).await;
    assert_eq!(runs.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_assistant_id_is_rejected() {
    let router = common::router();
    let (_, thread) = post_json(&router, "/threads", "alice", json!({})).await;
    let thread_id = thread["thread_id"].as_str().unwrap();

    let (status, _) = post_json(
        &router,
        &format!("/threads/{thread_id}/runs"),
        "alice",
        json!({
            "assistant_id": "00000000-0000-0000-0000-000000000000",
            "input": {"messages": []},
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
