//! `/a2a/:assistantId`: the Agent-to-Agent JSON-RPC surface. Supports a
//! single method, `message/send`, which runs the target assistant
//! statelessly and returns its reply as an A2A message.

use super::{RpcRequest, RpcResponse, INVALID_PARAMS, METHOD_NOT_FOUND};
use crate::context::RequestContext;
use crate::domain::{MultitaskStrategy, Run, RunStatus, Thread, ThreadStatus};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde_json::{json, Map, Value};
use uuid::Uuid;

pub async fn post(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(assistant_id): Path<String>,
    Json(request): Json<RpcRequest>,
) -> Json<RpcResponse> {
    if request.method != "message/send" {
        return Json(RpcResponse::err(request.id, METHOD_NOT_FOUND, format!("unknown method: {}", request.method)));
    }

    let Some(text) = request
        .params
        .get("message")
        .and_then(|m| m.get("parts"))
        .and_then(Value::as_array)
        .and_then(|parts| parts.first())
        .and_then(|p| p.get("text"))
        .and_then(Value::as_str)
    else {
        return Json(RpcResponse::err(request.id, INVALID_PARAMS, "message.parts[0].text is required"));
    };

    match run_once(&state, &ctx, &assistant_id, text).await {
        Ok(reply) => Json(RpcResponse::ok(
            request.id,
            json!({
                "role": "agent",
                "parts": [{ "type": "text", "text": reply }],
            }),
        )),
        Err(message) => Json(RpcResponse::err(request.id, super::INTERNAL_ERROR, message)),
    }
}

async fn run_once(state: &AppState, ctx: &RequestContext, assistant_id: &str, text: &str) -> Result<String, String> {
    let assistant = state.engine.resolve_assistant(assistant_id, Some(&ctx.owner)).await.map_err(|e| e.to_string())?;

    let thread_id = Uuid::new_v4();
    let mut metadata = Map::new();
    metadata.insert("owner".into(), json!(ctx.owner));
    let now = Utc::now();
    state
        .storage
        .create_thread(Thread { thread_id, metadata: metadata.clone(), status: ThreadStatus::Idle, values: Map::new(), created_at: now, updated_at: now })
        .await
        .map_err(|e| e.to_string())?;

    let run = Run {
        run_id: Uuid::new_v4(),
        thread_id,
        assistant_id: assistant.assistant_id,
        status: RunStatus::Pending,
        metadata,
        input: json!({ "messages": [{ "type": "human", "content": text }] }),
        config: Value::Null,
        multitask_strategy: MultitaskStrategy::Reject,
        error: None,
        created_at: now,
        updated_at: now,
    };
    let run = state.storage.create_run(run).await.map_err(|e| e.to_string())?;
    let input = run.input.clone();
    let outcome = state
        .engine
        .execute(&assistant, thread_id, run, &input, None)
        .await
        .map_err(|e| e.to_string())?;

    let _ = state.checkpointer.clear_thread(&thread_id.to_string()).await;
    let _ = state.storage.delete_thread(thread_id, None).await;

    let reply = outcome
        .post_state
        .values
        .get("messages")
        .and_then(Value::as_array)
        .and_then(|m| m.last())
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Ok(reply)
}
