//! Job and trigger handlers.
//!
//! - POST /reconcile          - Reinstall triggers from the job store
//! - GET  /triggers           - List active triggers
//! - POST /jobs/{id}/run      - Run a job now
//! - GET  /jobs/{id}/latest   - Latest successful result
//! - GET  /jobs/{id}/history  - Execution history

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use scrapehub_core::ExecutionRecord;
use scrapehub_scheduler::{ActiveTrigger, LatestResult, ReconcileReport, RunOutcome};

use crate::error::ApiError;
use crate::state::AppState;

/// Response for listing triggers.
#[derive(Debug, Serialize)]
pub struct TriggerListResponse {
    pub count: usize,
    pub generation: u64,
    pub triggers: Vec<ActiveTrigger>,
}

/// Response for a job's history.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub job_id: String,
    pub count: usize,
    pub records: Vec<ExecutionRecord>,
}

/// POST /reconcile
pub async fn reconcile(State(state): State<AppState>) -> Result<Json<ReconcileReport>, ApiError> {
    let report = state.hub.trigger_reconciliation().await?;
    Ok(Json(report))
}

/// GET /triggers
pub async fn list_triggers(State(state): State<AppState>) -> Json<TriggerListResponse> {
    let triggers = state.hub.list_active_triggers();
    Json(TriggerListResponse {
        count: triggers.len(),
        generation: state.hub.scheduler().generation(),
        triggers,
    })
}

/// Run a job outside its schedule.
///
/// A run that fails inside the executor is still a 200: the outcome
/// carries `successful: false` and the recorded error.
///
/// POST /jobs/{id}/run
pub async fn run_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RunOutcome>, ApiError> {
    info!("Run requested for job {}", id);
    let outcome = state.hub.run_job_now(&id).await?;
    Ok(Json(outcome))
}

/// GET /jobs/{id}/latest
pub async fn latest_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LatestResult>, ApiError> {
    match state.hub.latest_result(&id).await? {
        Some(latest) => Ok(Json(latest)),
        None => Err(ApiError::NoResult(id)),
    }
}

/// GET /jobs/{id}/history
pub async fn job_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let records = state.hub.job_history(&id).await?;
    Ok(Json(HistoryResponse {
        job_id: id,
        count: records.len(),
        records,
    }))
}
