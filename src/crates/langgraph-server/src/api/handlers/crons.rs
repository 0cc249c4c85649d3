//! `/crons` handlers. Scheduling itself lives in [`crate::cron`]; this is
//! just CRUD plus computing the first `next_run_at` at creation time.

use crate::context::RequestContext;
use crate::cron::expr;
use crate::domain::CronJob;
use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::storage::Page;
use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::assistants::clamp_page;

#[derive(Deserialize)]
pub struct CreateCronBody {
    pub assistant_id: Uuid,
    pub thread_id: Option<Uuid>,
    pub schedule: String,
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

pub async fn create(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<CreateCronBody>,
) -> Result<impl axum::response::IntoResponse> {
    let next_run_at = expr::next_after(&body.schedule, Utc::now())
        .map_err(|e| ApiError::BadRequest(format!("invalid cron schedule: {e}")))?;

    if let Some(end_time) = body.end_time {
        if end_time <= Utc::now() {
            return Err(ApiError::BadRequest("end_time must be in the future".into()));
        }
    }

    let mut metadata = body.metadata;
    metadata.insert("owner".into(), json!(ctx.owner));

    let now = Utc::now();
    let cron = CronJob {
        cron_id: Uuid::new_v4(),
        assistant_id: body.assistant_id,
        thread_id: body.thread_id,
        schedule: body.schedule,
        end_time: body.end_time,
        payload: body.payload,
        metadata,
        next_run_at,
        created_at: now,
        updated_at: now,
    };
    let created = state.storage.create_cron(cron).await?;
    Ok(crate::api::response::created(created))
}

pub async fn delete(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(cron_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse> {
    state.storage.delete_cron(cron_id, Some(&ctx.owner)).await?;
    Ok(crate::api::response::deleted())
}

#[derive(Deserialize, Default)]
pub struct SearchCronsBody {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn search(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<SearchCronsBody>,
) -> Result<impl axum::response::IntoResponse> {
    let page: Page = clamp_page(body.limit, body.offset);
    let items = state.storage.search_crons(Some(&ctx.owner), page).await?;
    Ok(crate::api::response::list(items))
}

#[derive(Deserialize, Default)]
pub struct CountCronsBody {}

pub async fn count(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(_body): Json<CountCronsBody>,
) -> Result<impl axum::response::IntoResponse> {
    let n = state.storage.count_crons(Some(&ctx.owner)).await?;
    Ok(crate::api::response::count(n))
}
