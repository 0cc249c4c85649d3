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

#[tokio::test]
async fn assistant_search_does_not_leak_across_owners() {
    let router = common::router();
    post_json(&router, "/assistants", "alice", json!({"graph_id": "agent", "name": "alice's"})).await;
    post_json(&router, "/assistants", "bob", json!({"graph_id": "agent", "name": "bob's"})).await;

    let (_, results) = post_json(&router, "/assistants/search", "alice", json!({})).await;
    let names: Vec<&str> = results.as_array().unwrap().iter().map(|a| a["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["alice's"]);
}

#[tokio::test]
async fn system_owned_assistants_are_visible_to_every_caller() {
    let router = common::router();
    post_json(&router, "/assistants", "system", json!({"graph_id": "agent", "name": "shared"})).await;
    post_json(&router, "/assistants", "alice", json!({"graph_id": "agent", "name": "alice's"})).await;

    let (_, results) = post_json(&router, "/assistants/search", "bob", json!({})).await;
    let names: Vec<&str> = results.as_array().unwrap().iter().map(|a| a["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["shared"]);
}

#[tokio::test]
async fn store_items_are_isolated_per_owner() {
    let router = common::router();

    let put_request = |owner: &str, value: &str| {
        Request::builder()
            .method("PUT")
            .uri("/store/items")
            .header(header::AUTHORIZATION, common::bearer(owner))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::to_vec(&json!({
                    "namespace": ["notes"],
                    "key": "k1",
                    "value": {"text": value},
                }))
                .unwrap(),
            ))
            .unwrap()
    };

    router.clone().oneshot(put_request("alice", "alice's note")).await.unwrap();
    router.clone().oneshot(put_request("bob", "bob's note")).await.unwrap();

    let get_request = Request::builder()
        .uri("/store/items?namespace=notes&key=k1")
        .header(header::AUTHORIZATION, common::bearer("alice"))
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(get_request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let item = json_body(response).await;
    assert_eq!(item["value"]["text"], "alice's note");
}
