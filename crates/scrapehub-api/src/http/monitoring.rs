//! Health check handlers.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use scrapehub_scheduler::HubStatus;

use crate::state::AppState;

/// Health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// Triggers may be stale: the last reconciliation failed or none
    /// has succeeded yet.
    Degraded,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub timezone: String,
    pub generation: u64,
    pub active_triggers: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reconcile_success: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reconcile_error: Option<String>,
}

impl From<HubStatus> for HealthResponse {
    fn from(status: HubStatus) -> Self {
        let health = if status.reconcile.is_healthy() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        };

        Self {
            status: health,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: status.uptime_secs,
            timezone: status.timezone,
            generation: status.generation,
            active_triggers: status.active_triggers,
            last_reconcile_success: status.reconcile.last_success_at,
            last_reconcile_error: status.reconcile.last_error,
        }
    }
}

/// Detailed health check.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::from(state.hub.status()))
}

/// Liveness check (Kubernetes).
pub async fn liveness() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "alive"
    }))
}
