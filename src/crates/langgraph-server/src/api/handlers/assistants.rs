//! `/assistants` handlers: CRUD plus the `search` POST endpoint and the
//! introspection stubs SDK clients probe for (`graph`, `schemas`,
//! `latest`).

use crate::context::RequestContext;
use crate::domain::{Assistant, IfExists};
use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::storage::{AssistantFilter, AssistantPatch, Page};
use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

#[derive(Deserialize)]
pub struct CreateAssistantBody {
    pub graph_id: String,
    pub name: Option<String>,
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub context: Value,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub assistant_id: Option<Uuid>,
    pub if_exists: Option<IfExists>,
}

pub async fn create(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<CreateAssistantBody>,
) -> Result<impl axum::response::IntoResponse> {
    let assistant_id = body.assistant_id.unwrap_or_else(Uuid::new_v4);

    if let Ok(existing) = state.storage.get_assistant(assistant_id, None).await {
        return match body.if_exists.unwrap_or(IfExists::Raise) {
            IfExists::DoNothing => Ok(crate::api::response::created(existing)),
            IfExists::Raise => Err(ApiError::Conflict(format!("assistant {assistant_id} already exists"))),
        };
    }

    let mut metadata = body.metadata;
    metadata.insert("owner".into(), json!(ctx.owner));

    let now = Utc::now();
    let assistant = Assistant {
        assistant_id,
        graph_id: body.graph_id,
        name: body.name,
        config: body.config,
        context: body.context,
        metadata,
        version: 1,
        created_at: now,
        updated_at: now,
    };
    let created = state.storage.create_assistant(assistant).await?;
    Ok(crate::api::response::created(created))
}

pub async fn get(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(assistant_id): Path<Uuid>,
) -> Result<Json<Assistant>> {
    Ok(Json(state.storage.get_assistant(assistant_id, Some(&ctx.owner)).await?))
}

#[derive(Deserialize, Default)]
pub struct UpdateAssistantBody {
    pub graph_id: Option<String>,
    pub name: Option<String>,
    pub config: Option<Value>,
    pub context: Option<Value>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

pub async fn update(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(assistant_id): Path<Uuid>,
    Json(body): Json<UpdateAssistantBody>,
) -> Result<Json<Assistant>> {
    let updated = state
        .storage
        .update_assistant(
            assistant_id,
            AssistantPatch {
                graph_id: body.graph_id,
                name: body.name,
                config: body.config,
                context: body.context,
                metadata_merge: body.metadata,
            },
            Some(&ctx.owner),
        )
        .await?;
    Ok(Json(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(assistant_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse> {
    state.storage.delete_assistant(assistant_id, Some(&ctx.owner)).await?;
    Ok(crate::api::response::deleted())
}

#[derive(Deserialize, Default)]
pub struct SearchAssistantsBody {
    pub graph_id: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn search(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<SearchAssistantsBody>,
) -> Result<impl axum::response::IntoResponse> {
    let page = clamp_page(body.limit, body.offset);
    let filter = AssistantFilter {
        graph_id: body.graph_id,
        metadata: body.metadata,
        owner: Some(ctx.owner.clone()),
    };
    let items = state.storage.search_assistants(filter, page).await?;
    Ok(crate::api::response::list(items))
}

#[derive(Deserialize, Default)]
pub struct CountBody {
    pub graph_id: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

pub async fn count(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<CountBody>,
) -> Result<impl axum::response::IntoResponse> {
    let filter = AssistantFilter {
        graph_id: body.graph_id,
        metadata: body.metadata,
        owner: Some(ctx.owner),
    };
    let n = state.storage.count_assistants(filter).await?;
    Ok(crate::api::response::count(n))
}

pub async fn graph(
    State(state): State<AppState>,
    Path(assistant_id): Path<Uuid>,
) -> Result<Json<Value>> {
    let assistant = state.storage.get_assistant(assistant_id, None).await?;
    Ok(Json(json!({ "graph_id": assistant.graph_id, "nodes": [], "edges": [] })))
}

pub async fn schemas(
    State(state): State<AppState>,
    Path(assistant_id): Path<Uuid>,
) -> Result<Json<Value>> {
    state.storage.get_assistant(assistant_id, None).await?;
    Ok(Json(json!({
        "input_schema": {"type": "object"},
        "output_schema": {"type": "object"},
        "config_schema": {"type": "object"},
    })))
}

#[derive(Deserialize)]
pub struct LatestBody {
    pub assistant_id: Uuid,
    pub version: i32,
}

pub async fn latest(
    State(state): State<AppState>,
    Json(body): Json<LatestBody>,
) -> Result<Json<Assistant>> {
    let assistant = state.storage.get_assistant(body.assistant_id, None).await?;
    if assistant.version != body.version {
        return Err(ApiError::BadRequest(format!(
            "assistant {} is at version {}, not {}",
            body.assistant_id, assistant.version, body.version
        )));
    }
    Ok(Json(assistant))
}

pub fn clamp_page(limit: Option<i64>, offset: Option<i64>) -> Page {
    Page {
        limit: limit.unwrap_or(10).clamp(1, 1000),
        offset: offset.unwrap_or(0).max(0),
    }
}
