//! Health and metrics exposition. Unauthenticated — these sit outside the
//! auth middleware's route group (see `routes.rs`).

use crate::state::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let healthy = state.storage.count_assistants(Default::default()).await.is_ok();
    let status = if healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(json!({ "status": if healthy { "ok" } else { "degraded" } })))
}

pub async fn root() -> impl IntoResponse {
    Json(json!({ "name": "langgraph-server", "version": env!("CARGO_PKG_VERSION") }))
}

pub async fn info() -> impl IntoResponse {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "flags": { "assistants_reload": true, "langsmith_tracing": false },
    }))
}

pub async fn openapi() -> impl IntoResponse {
    Json(json!({
        "openapi": "3.0.0",
        "info": { "title": "langgraph-server", "version": env!("CARGO_PKG_VERSION") },
        "paths": {},
    }))
}

pub async fn metrics_json(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.to_json())
}

pub async fn metrics_prometheus(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.to_prometheus(),
    )
}
