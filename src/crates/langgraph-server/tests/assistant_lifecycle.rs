mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::util::ServiceExt;

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn create_get_update_delete_assistant() {
    let router = common::router();

    let create = Request::builder()
        .method("POST")
        .uri("/assistants")
        .header(header::AUTHORIZATION, common::bearer("alice"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"graph_id": "agent", "name": "First"})).unwrap()))
        .unwrap();
    let response = router.clone().oneshot(create).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = json_body(response).await;
    let assistant_id = created["assistant_id"].as_str().unwrap().to_string();
    assert_eq!(created["name"], "First");
    assert_eq!(created["version"], 1);

    let get = Request::builder()
        .uri(format!("/assistants/{assistant_id}"))
        .header(header::AUTHORIZATION, common::bearer("alice"))
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(get).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let update = Request::builder()
        .method("PATCH")
        .uri(format!("/assistants/{assistant_id}"))
        .header(header::AUTHORIZATION, common::bearer("alice"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"name": "Renamed"})).unwrap()))
        .unwrap();
    let response = router.clone().oneshot(update).await.unwrap();
    let updated = json_body(response).await;
    assert_eq!(updated["name"], "Renamed");
    assert_eq!(updated["version"], 2);

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/assistants/{assistant_id}"))
        .header(header::AUTHORIZATION, common::bearer("alice"))
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(delete).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({}));

    let get_again = Request::builder()
        .uri(format!("/assistants/{assistant_id}"))
        .header(header::AUTHORIZATION, common::bearer("alice"))
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(get_again).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn requests_without_a_bearer_token_are_rejected() {
    let router = common::router();
    let request = Request::builder()
        .method("POST")
        .uri("/assistants")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"graph_id": "agent"})).unwrap()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
