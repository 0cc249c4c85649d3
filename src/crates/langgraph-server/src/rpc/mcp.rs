//! `/mcp`: the Model Context Protocol surface. Tool execution itself is a
//! Non-goal — what's implemented here is just enough of the handshake
//! (`initialize`, `tools/list`) for an MCP client to connect and discover
//! that this server exposes no tools of its own.

use super::{RpcRequest, RpcResponse, METHOD_NOT_FOUND};
use crate::context::RequestContext;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

pub async fn post(
    State(_state): State<crate::state::AppState>,
    _ctx: RequestContext,
    Json(request): Json<RpcRequest>,
) -> Json<RpcResponse> {
    let response = match request.method.as_str() {
        "initialize" => RpcResponse::ok(
            request.id,
            json!({
                "protocolVersion": "2024-11-05",
                "serverInfo": { "name": "langgraph-server", "version": env!("CARGO_PKG_VERSION") },
                "capabilities": { "tools": {} },
            }),
        ),
        "tools/list" => RpcResponse::ok(request.id, json!({ "tools": [] })),
        "ping" => RpcResponse::ok(request.id, json!({})),
        other => RpcResponse::err(request.id, METHOD_NOT_FOUND, format!("unknown method: {other}")),
    };
    Json(response)
}

pub async fn get() -> impl IntoResponse {
    (axum::http::StatusCode::METHOD_NOT_ALLOWED, Json(json!({ "detail": "MCP session streaming is not supported" })))
}

pub async fn delete() -> impl IntoResponse {
    Json(json!({}))
}
