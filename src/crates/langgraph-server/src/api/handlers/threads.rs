//! `/threads` handlers. Reads of a thread's state/history are
//! deliberately NOT owner-scoped — the thread id itself is the access
//! token, matching how a shared conversation link is meant to work.
//! Writes, list and search remain owner-scoped.

use crate::context::RequestContext;
use crate::domain::{IfExists, StateSnapshot, Thread, ThreadStatus};
use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::storage::{StateSnapshotInput, ThreadFilter, ThreadPatch};
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::assistants::clamp_page;

#[derive(Deserialize, Default)]
pub struct CreateThreadBody {
    pub thread_id: Option<Uuid>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub if_exists: Option<IfExists>,
}

pub async fn create(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<CreateThreadBody>,
) -> Result<impl axum::response::IntoResponse> {
    let thread_id = body.thread_id.unwrap_or_else(Uuid::new_v4);

    if let Ok(existing) = state.storage.get_thread(thread_id).await {
        return match body.if_exists.unwrap_or(IfExists::Raise) {
            IfExists::DoNothing => Ok(crate::api::response::created(existing)),
            IfExists::Raise => Err(ApiError::Conflict(format!("thread {thread_id} already exists"))),
        };
    }

    let mut metadata = body.metadata;
    metadata.insert("owner".into(), json!(ctx.owner));

    let now = Utc::now();
    let thread = Thread {
        thread_id,
        metadata,
        status: ThreadStatus::Idle,
        values: Map::new(),
        created_at: now,
        updated_at: now,
    };
    let created = state.storage.create_thread(thread).await?;
    Ok(crate::api::response::created(created))
}

pub async fn get(State(state): State<AppState>, Path(thread_id): Path<Uuid>) -> Result<Json<Thread>> {
    Ok(Json(state.storage.get_thread(thread_id).await?))
}

#[derive(Deserialize, Default)]
pub struct UpdateThreadBody {
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

pub async fn update(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(thread_id): Path<Uuid>,
    Json(body): Json<UpdateThreadBody>,
) -> Result<Json<Thread>> {
    let updated = state
        .storage
        .update_thread(
            thread_id,
            ThreadPatch { metadata_merge: body.metadata, ..Default::default() },
            Some(&ctx.owner),
        )
        .await?;
    Ok(Json(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(thread_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse> {
    state.storage.delete_thread(thread_id, Some(&ctx.owner)).await?;
    let _ = state.checkpointer.clear_thread(&thread_id.to_string()).await;
    Ok(crate::api::response::deleted())
}

#[derive(Deserialize, Default)]
pub struct SearchThreadsBody {
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub status: Option<ThreadStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn search(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<SearchThreadsBody>,
) -> Result<impl axum::response::IntoResponse> {
    let page = clamp_page(body.limit, body.offset);
    let filter = ThreadFilter { metadata: body.metadata, status: body.status, owner: Some(ctx.owner) };
    let items = state.storage.search_threads(filter, page).await?;
    Ok(crate::api::response::list(items))
}

#[derive(Deserialize, Default)]
pub struct CountThreadsBody {
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub status: Option<ThreadStatus>,
}

pub async fn count(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<CountThreadsBody>,
) -> Result<impl axum::response::IntoResponse> {
    let n = state
        .storage
        .count_threads(ThreadFilter { metadata: body.metadata, status: body.status, owner: Some(ctx.owner) })
        .await?;
    Ok(crate::api::response::count(n))
}

/// Not owner-scoped: see module docs.
pub async fn get_state(State(state): State<AppState>, Path(thread_id): Path<Uuid>) -> Result<Json<Value>> {
    state.storage.get_thread(thread_id).await?;
    let messages = state.checkpointer.get_messages(&thread_id.to_string()).await.map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(json!({ "values": { "messages": messages } })))
}

/// Accepts either `{values: {...}}` or a bare values object, tolerating
/// callers that forget the wrapper.
fn extract_values(body: &Value) -> Value {
    match body.get("values") {
        Some(v) => v.clone(),
        None => body.clone(),
    }
}

/// `POST /threads/:id/state`: force-append messages into a thread's
/// history without running the graph, for manual corrections. Also
/// records a state snapshot so it shows up in `getHistory`.
pub async fn post_state(
    State(state): State<AppState>,
    Path(thread_id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Result<Json<Value>> {
    state.storage.get_thread(thread_id).await?;
    let values = extract_values(&body);
    let input = crate::engine::input::normalize(&values);
    let merged = state
        .checkpointer
        .append_messages(&thread_id.to_string(), input.messages)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let mut snapshot_values = Map::new();
    snapshot_values.insert("messages".into(), json!(merged));
    let parent_checkpoint = state
        .storage
        .get_history(thread_id, 1, None)
        .await
        .ok()
        .and_then(|snapshots| snapshots.into_iter().next())
        .map(|snapshot| snapshot.checkpoint_id);
    state
        .storage
        .add_state_snapshot(
            thread_id,
            StateSnapshotInput { values: snapshot_values, parent_checkpoint, ..Default::default() },
        )
        .await?;

    Ok(Json(json!({ "values": { "messages": merged } })))
}

fn clamp_history_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(10).clamp(1, 1000)
}

#[derive(Deserialize, Default)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
    pub before: Option<Uuid>,
}

/// Not owner-scoped: see module docs.
pub async fn get_history(
    State(state): State<AppState>,
    Path(thread_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<StateSnapshot>>> {
    state.storage.get_thread(thread_id).await?;
    let limit = clamp_history_limit(query.limit);
    let items = state.storage.get_history(thread_id, limit, query.before).await?;
    Ok(Json(items))
}

#[derive(Deserialize, Default)]
pub struct HistorySearchBody {
    pub limit: Option<i64>,
    pub before: Option<Uuid>,
}

/// `POST /threads/:id/history`: same data as the GET, SDKs also send this
/// as a POST with a body controlling the limit and cursor.
pub async fn post_history(
    State(state): State<AppState>,
    Path(thread_id): Path<Uuid>,
    Json(body): Json<HistorySearchBody>,
) -> Result<Json<Vec<StateSnapshot>>> {
    state.storage.get_thread(thread_id).await?;
    let limit = clamp_history_limit(body.limit);
    let items = state.storage.get_history(thread_id, limit, body.before).await?;
    Ok(Json(items))
}

pub async fn copy(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(thread_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse> {
    let source = state.storage.get_thread(thread_id).await?;
    let new_id = Uuid::new_v4();
    let mut metadata = source.metadata.clone();
    metadata.insert("owner".into(), json!(ctx.owner));
    let now = Utc::now();
    let copy = Thread {
        thread_id: new_id,
        metadata,
        status: ThreadStatus::Idle,
        values: source.values.clone(),
        created_at: now,
        updated_at: now,
    };
    let created = state.storage.create_thread(copy).await?;

    let messages = state
        .checkpointer
        .get_messages(&thread_id.to_string())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    state
        .checkpointer
        .append_messages(&new_id.to_string(), messages)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(crate::api::response::created(created))
}
