//! `/store` handlers: a cross-thread key-value namespace, owner-isolated —
//! unlike thread reads, a caller only ever sees its own items (or
//! `system`'s).

use crate::context::RequestContext;
use crate::domain::StoreItem;
use crate::error::Result;
use crate::state::AppState;
use crate::storage::Page;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Map;

use super::assistants::clamp_page;

#[derive(Deserialize)]
pub struct PutItemBody {
    pub namespace: Vec<String>,
    pub key: String,
    pub value: Map<String, serde_json::Value>,
}

pub async fn put(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<PutItemBody>,
) -> Result<impl axum::response::IntoResponse> {
    let now = Utc::now();
    let existing = state.storage.get_store_item(&body.namespace, &body.key, &ctx.owner).await.ok();
    let item = StoreItem {
        namespace: body.namespace,
        key: body.key,
        value: body.value,
        owner: ctx.owner,
        created_at: existing.map(|e| e.created_at).unwrap_or(now),
        updated_at: now,
    };
    state.storage.put_store_item(item).await?;
    Ok(crate::api::response::created(serde_json::json!({})))
}

#[derive(Deserialize)]
pub struct ItemQuery {
    pub namespace: String,
    pub key: String,
}

fn split_namespace(raw: &str) -> Vec<String> {
    raw.split('.').filter(|s| !s.is_empty()).map(str::to_string).collect()
}

pub async fn get(
    State(state): State<AppState>,
    ctx: RequestContext,
    axum::extract::Query(query): axum::extract::Query<ItemQuery>,
) -> Result<Json<StoreItem>> {
    let namespace = split_namespace(&query.namespace);
    Ok(Json(state.storage.get_store_item(&namespace, &query.key, &ctx.owner).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    ctx: RequestContext,
    axum::extract::Query(query): axum::extract::Query<ItemQuery>,
) -> Result<impl axum::response::IntoResponse> {
    let namespace = split_namespace(&query.namespace);
    state.storage.delete_store_item(&namespace, &query.key, &ctx.owner).await?;
    Ok(crate::api::response::deleted())
}

#[derive(Deserialize, Default)]
pub struct SearchItemsBody {
    #[serde(default)]
    pub namespace_prefix: Vec<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn search(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<SearchItemsBody>,
) -> Result<impl axum::response::IntoResponse> {
    let page: Page = clamp_page(body.limit, body.offset);
    let items = state
        .storage
        .search_store_items(&body.namespace_prefix, &ctx.owner, page)
        .await?;
    Ok(crate::api::response::list(items))
}

pub async fn list_namespaces(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<impl axum::response::IntoResponse> {
    let namespaces = state.storage.list_namespaces(&ctx.owner).await?;
    Ok(crate::api::response::list(namespaces))
}
