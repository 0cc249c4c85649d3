//! `/threads/:id/runs` and its `/wait`, `/stream` driving variants, plus
//! the stateless `/runs` alias of each. Plain create just records a
//! `pending` run; `/wait` and `/stream` are the ones that actually invoke
//! [`crate::engine::RunEngine`]. Stateless runs wrap an ephemeral thread
//! that gets torn down once the run completes, unless `on_completion` says
//! to keep it.

use crate::context::RequestContext;
use crate::domain::{MultitaskStrategy, OnCompletion, Run, RunStatus, Thread, ThreadStatus};
use crate::engine::multitask::Resolution;
use crate::error::{ApiError, Result};
use crate::sse;
use crate::state::AppState;
use crate::storage::RunFilter;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::assistants::clamp_page;

fn default_enqueue() -> MultitaskStrategy {
    MultitaskStrategy::Enqueue
}

/// Background create: `POST /threads/:id/runs`. Never executes inline;
/// the run sits `pending` until a worker (none exist in v0) or a
/// `/wait`/`/stream` call drives it. Defaults to `enqueue` so a second
/// request on a busy thread is accepted rather than rejected.
#[derive(Deserialize)]
pub struct CreateRunBody {
    pub assistant_id: String,
    #[serde(default)]
    pub input: Value,
    pub config: Option<Value>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default = "default_enqueue")]
    pub multitask_strategy: MultitaskStrategy,
}

/// Driving body shared by `/runs/wait` and `/runs/stream` (both thread-
/// scoped and stateless). Defaults to `reject` since these endpoints
/// execute inline and can't silently defer a conflicting run.
#[derive(Deserialize)]
pub struct WaitRunBody {
    pub assistant_id: String,
    #[serde(default)]
    pub input: Value,
    pub config: Option<Value>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub multitask_strategy: MultitaskStrategy,
    #[serde(default)]
    pub on_completion: OnCompletion,
}

enum RunCreation {
    Executed(crate::engine::RunOutcome),
    Pending(Run),
}

#[allow(clippy::too_many_arguments)]
async fn start_run(
    state: &AppState,
    ctx: &RequestContext,
    thread_id: Uuid,
    assistant_id: &str,
    input: &Value,
    config: Option<&Value>,
    metadata: Map<String, Value>,
    multitask_strategy: MultitaskStrategy,
    drive: bool,
) -> Result<RunCreation> {
    let assistant = state.engine.resolve_assistant(assistant_id, Some(&ctx.owner)).await?;

    let resolution = state.engine.resolve_multitask(thread_id, multitask_strategy).await?;

    let mut metadata = metadata;
    metadata.insert("owner".into(), json!(ctx.owner));
    let now = Utc::now();
    let run = Run {
        run_id: Uuid::new_v4(),
        thread_id,
        assistant_id: assistant.assistant_id,
        status: RunStatus::Pending,
        metadata,
        input: input.clone(),
        config: config.cloned().unwrap_or(Value::Null),
        multitask_strategy,
        error: None,
        created_at: now,
        updated_at: now,
    };
    let run = state.storage.create_run(run).await?;

    if !drive || matches!(resolution, Resolution::Defer) {
        return Ok(RunCreation::Pending(run));
    }

    state.metrics.run_started();
    let start = std::time::Instant::now();
    let outcome = state.engine.execute(&assistant, thread_id, run, input, config).await?;
    state
        .metrics
        .run_finished(outcome.run.status == RunStatus::Success, start.elapsed().as_millis() as u64);

    Ok(RunCreation::Executed(outcome))
}

async fn ensure_thread(state: &AppState, ctx: &RequestContext, thread_id: Uuid) -> Result<()> {
    if state.storage.get_thread(thread_id).await.is_err() {
        let mut metadata = Map::new();
        metadata.insert("owner".into(), json!(ctx.owner));
        let now = Utc::now();
        state
            .storage
            .create_thread(Thread {
                thread_id,
                metadata,
                status: ThreadStatus::Idle,
                values: Map::new(),
                created_at: now,
                updated_at: now,
            })
            .await?;
    }
    Ok(())
}

/// `POST /threads/:id/runs`: create-and-return, never executes inline.
/// Drive it with `/wait` or `/stream`, or a future background worker.
pub async fn create(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(thread_id): Path<Uuid>,
    Json(body): Json<CreateRunBody>,
) -> Result<impl IntoResponse> {
    ensure_thread(&state, &ctx, thread_id).await?;
    match start_run(
        &state,
        &ctx,
        thread_id,
        &body.assistant_id,
        &body.input,
        body.config.as_ref(),
        body.metadata,
        body.multitask_strategy,
        false,
    )
    .await?
    {
        RunCreation::Pending(run) => Ok(crate::api::response::created(run)),
        RunCreation::Executed(outcome) => Ok(crate::api::response::created(outcome.run)),
    }
}

/// `POST /threads/:id/runs/wait`: create and execute inline, returning the
/// thread's state once the run finishes.
pub async fn wait(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(thread_id): Path<Uuid>,
    Json(body): Json<WaitRunBody>,
) -> Result<impl IntoResponse> {
    ensure_thread(&state, &ctx, thread_id).await?;
    match start_run(
        &state,
        &ctx,
        thread_id,
        &body.assistant_id,
        &body.input,
        body.config.as_ref(),
        body.metadata,
        body.multitask_strategy,
        true,
    )
    .await?
    {
        RunCreation::Executed(_) => {
            let snapshot = state.storage.get_state(thread_id).await?;
            Ok(crate::api::response::created(snapshot))
        }
        RunCreation::Pending(_) => Err(ApiError::Conflict(format!(
            "run on thread {thread_id} deferred by multitask_strategy=enqueue; /wait cannot defer"
        ))),
    }
}

pub async fn stream(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(thread_id): Path<Uuid>,
    Json(body): Json<WaitRunBody>,
) -> Result<impl IntoResponse> {
    ensure_thread(&state, &ctx, thread_id).await?;
    match start_run(
        &state,
        &ctx,
        thread_id,
        &body.assistant_id,
        &body.input,
        body.config.as_ref(),
        body.metadata,
        body.multitask_strategy,
        true,
    )
    .await?
    {
        RunCreation::Executed(outcome) => {
            let new_messages = extract_new_messages(&outcome.pre_state, &outcome.post_state);
            Ok(sse::run_stream(
                outcome.run.run_id,
                json!(outcome.pre_state.values),
                new_messages,
                json!(outcome.post_state.values),
            )
            .into_response())
        }
        RunCreation::Pending(_) => Ok(sse::error_stream(format!(
            "run on thread {thread_id} deferred by multitask_strategy=enqueue; /stream cannot defer"
        ))
        .into_response()),
    }
}

/// `GET /threads/:id/runs/:id/stream`: reconnect to a run already past its
/// request lifetime. v0 has no background execution, so by the time a
/// reconnect is possible the run is always terminal; this just frames the
/// run's outcome and the thread's current state, without invoking anything.
pub async fn get_stream(
    State(state): State<AppState>,
    Path((thread_id, run_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    let run = state.storage.get_run(thread_id, run_id).await?;
    let snapshot = state.storage.get_state(thread_id).await?;
    if run.status == RunStatus::Error {
        return Ok(sse::error_stream(run.error.unwrap_or_else(|| "run failed".to_string())).into_response());
    }
    Ok(sse::run_stream(run.run_id, json!(snapshot.values), Vec::new(), json!(snapshot.values)).into_response())
}

fn extract_new_messages(
    pre: &langgraph_core::GraphState,
    post: &langgraph_core::GraphState,
) -> Vec<langgraph_checkpoint::Message> {
    let pre_len = pre
        .values
        .get("messages")
        .and_then(|v| v.as_array())
        .map(|a| a.len())
        .unwrap_or(0);
    post.values
        .get("messages")
        .and_then(|v| v.as_array())
        .map(|a| {
            a.iter()
                .skip(pre_len)
                .filter_map(|v| serde_json::from_value(v.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

async fn cleanup_stateless(state: &AppState, thread_id: Uuid, on_completion: OnCompletion) {
    if on_completion == OnCompletion::Keep {
        return;
    }
    let _ = state.checkpointer.clear_thread(&thread_id.to_string()).await;
    let _ = state.storage.delete_thread(thread_id, None).await;
}

/// `/runs` (stateless): create an ephemeral thread, run synchronously, tear
/// the thread (and its checkpointer history) down afterward unless
/// `on_completion: "keep"` was requested. Response shape stays the run
/// object, not `getState`, so existing callers of this route see no change.
pub async fn create_stateless(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<WaitRunBody>,
) -> Result<impl IntoResponse> {
    let thread_id = Uuid::new_v4();
    ensure_thread(&state, &ctx, thread_id).await?;
    let result = start_run(
        &state,
        &ctx,
        thread_id,
        &body.assistant_id,
        &body.input,
        body.config.as_ref(),
        body.metadata,
        body.multitask_strategy,
        true,
    )
    .await;
    cleanup_stateless(&state, thread_id, body.on_completion).await;
    match result? {
        RunCreation::Executed(outcome) => Ok(crate::api::response::created(outcome.run)),
        RunCreation::Pending(_) => Err(ApiError::Conflict("stateless run cannot be deferred".into())),
    }
}

/// `POST /runs/wait`: same as [`create_stateless`] but returns `getState`.
pub async fn wait_stateless(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<WaitRunBody>,
) -> Result<impl IntoResponse> {
    let thread_id = Uuid::new_v4();
    ensure_thread(&state, &ctx, thread_id).await?;
    let result = start_run(
        &state,
        &ctx,
        thread_id,
        &body.assistant_id,
        &body.input,
        body.config.as_ref(),
        body.metadata,
        body.multitask_strategy,
        true,
    )
    .await;
    let snapshot = match &result {
        Ok(RunCreation::Executed(_)) => state.storage.get_state(thread_id).await.ok(),
        _ => None,
    };
    cleanup_stateless(&state, thread_id, body.on_completion).await;
    match result? {
        RunCreation::Executed(_) => {
            let snapshot = snapshot.ok_or_else(|| ApiError::Internal("missing state snapshot after run".into()))?;
            Ok(crate::api::response::created(snapshot))
        }
        RunCreation::Pending(_) => Err(ApiError::Conflict("stateless run cannot be deferred".into())),
    }
}

pub async fn stream_stateless(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<WaitRunBody>,
) -> Result<impl IntoResponse> {
    let thread_id = Uuid::new_v4();
    ensure_thread(&state, &ctx, thread_id).await?;
    let on_completion = body.on_completion;
    let result = start_run(
        &state,
        &ctx,
        thread_id,
        &body.assistant_id,
        &body.input,
        body.config.as_ref(),
        body.metadata,
        body.multitask_strategy,
        true,
    )
    .await;
    let response = match result {
        Ok(RunCreation::Executed(outcome)) => {
            let new_messages = extract_new_messages(&outcome.pre_state, &outcome.post_state);
            sse::run_stream(
                outcome.run.run_id,
                json!(outcome.pre_state.values),
                new_messages,
                json!(outcome.post_state.values),
            )
            .into_response()
        }
        Ok(RunCreation::Pending(_)) => sse::error_stream("stateless run cannot be deferred".into()).into_response(),
        Err(e) => sse::error_stream(e.to_string()).into_response(),
    };
    cleanup_stateless(&state, thread_id, on_completion).await;
    Ok(response)
}

pub async fn get(
    State(state): State<AppState>,
    Path((thread_id, run_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Run>> {
    Ok(Json(state.storage.get_run(thread_id, run_id).await?))
}

#[derive(Deserialize, Default)]
pub struct ListRunsQuery {
    pub status: Option<RunStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(thread_id): Path<Uuid>,
    axum::extract::Query(query): axum::extract::Query<ListRunsQuery>,
) -> Result<impl IntoResponse> {
    let page = clamp_page(query.limit, query.offset);
    let filter = RunFilter { status: query.status, owner: Some(ctx.owner) };
    let items = state.storage.list_runs(thread_id, filter, page).await?;
    Ok(crate::api::response::list(items))
}

pub async fn cancel(
    State(state): State<AppState>,
    Path((thread_id, run_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Run>> {
    Ok(Json(state.engine.cancel(thread_id, run_id).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((thread_id, run_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    state.engine.delete(thread_id, run_id).await?;
    Ok(crate::api::response::deleted())
}

pub async fn join(
    State(state): State<AppState>,
    Path((thread_id, run_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Run>> {
    Ok(Json(state.engine.join(thread_id, run_id).await?))
}
