//! Response shaping helpers. The wire contract here is fixed by
//! langgraph-sdk client compatibility, not by this codebase's usual
//! envelope conventions: create returns 200 with the bare resource, delete
//! returns an empty object, count returns a bare integer, search returns a
//! bare array.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::json;

pub fn ok<T: Serialize>(body: T) -> impl IntoResponse {
    (StatusCode::OK, Json(body))
}

pub fn created<T: Serialize>(body: T) -> impl IntoResponse {
    (StatusCode::OK, Json(body))
}

pub fn deleted() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({})))
}

pub fn count(n: i64) -> impl IntoResponse {
    (StatusCode::OK, Json(n))
}

pub fn list<T: Serialize>(items: Vec<T>) -> impl IntoResponse {
    (StatusCode::OK, Json(items))
}
