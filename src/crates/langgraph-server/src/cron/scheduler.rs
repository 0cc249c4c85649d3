//! In-process cron ticker. Polls storage for due jobs on a fixed interval
//! and drives each one through the run engine exactly like an HTTP-
//! initiated stateful run would, then reschedules it.

use super::expr;
use crate::domain::{MultitaskStrategy, Run, RunStatus, Thread, ThreadStatus};
use crate::state::AppState;
use chrono::Utc;
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;

pub async fn run(state: AppState, tick: Duration) {
    let mut interval = tokio::time::interval(tick);
    loop {
        interval.tick().await;
        if let Err(e) = tick_once(&state).await {
            tracing::error!(error = %e, "cron tick failed");
        }
    }
}

async fn tick_once(state: &AppState) -> Result<(), String> {
    let due = state.storage.due_crons(Utc::now()).await.map_err(|e| e.to_string())?;
    for cron in due {
        if let Some(end_time) = cron.end_time {
            if end_time <= Utc::now() {
                tracing::info!(cron_id = %cron.cron_id, "cron past its end_time, not firing or rescheduling");
                continue;
            }
        }
        if let Err(e) = fire(state, &cron).await {
            tracing::warn!(cron_id = %cron.cron_id, error = %e, "cron run failed");
        }
        match expr::next_after(&cron.schedule, Utc::now()) {
            Ok(next) => {
                let _ = state.storage.reschedule_cron(cron.cron_id, next).await;
            }
            Err(e) => tracing::error!(cron_id = %cron.cron_id, error = %e, "could not reschedule cron"),
        }
    }
    Ok(())
}

async fn fire(state: &AppState, cron: &crate::domain::CronJob) -> Result<(), String> {
    let assistant = state.storage.get_assistant(cron.assistant_id, None).await.map_err(|e| e.to_string())?;
    let thread_id = cron.thread_id.unwrap_or_else(Uuid::new_v4);

    if state.storage.get_thread(thread_id).await.is_err() {
        let now = Utc::now();
        state
            .storage
            .create_thread(Thread { thread_id, metadata: cron.metadata.clone(), status: ThreadStatus::Idle, values: Default::default(), created_at: now, updated_at: now })
            .await
            .map_err(|e| e.to_string())?;
    }

    let now = Utc::now();
    let input: Value = if cron.payload.is_null() { json!({}) } else { cron.payload.clone() };
    let run = Run {
        run_id: Uuid::new_v4(),
        thread_id,
        assistant_id: assistant.assistant_id,
        status: RunStatus::Pending,
        metadata: cron.metadata.clone(),
        input: input.clone(),
        config: Value::Null,
        multitask_strategy: MultitaskStrategy::Interrupt,
        error: None,
        created_at: now,
        updated_at: now,
    };
    let run = state.storage.create_run(run).await.map_err(|e| e.to_string())?;
    state.engine.execute(&assistant, thread_id, run, &input, None).await.map_err(|e| e.to_string())?;
    Ok(())
}
