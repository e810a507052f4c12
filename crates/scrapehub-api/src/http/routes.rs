//! HTTP route definitions.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::http::{jobs, monitoring};
use crate::state::AppState;

/// Create the main router.
///
/// ```text
/// POST /reconcile
/// GET  /triggers
/// POST /jobs/{id}/run
/// GET  /jobs/{id}/latest
/// GET  /jobs/{id}/history
/// GET  /health
/// GET  /livez
/// ```
pub fn create_router(state: AppState) -> Router {
    let job_router = Router::new()
        .route("/{id}/run", post(jobs::run_job))
        .route("/{id}/latest", get(jobs::latest_result))
        .route("/{id}/history", get(jobs::job_history))
        .with_state(state.clone());

    let scheduler_routes = Router::new()
        .route("/reconcile", post(jobs::reconcile))
        .route("/triggers", get(jobs::list_triggers))
        .route("/health", get(monitoring::health_check))
        .with_state(state);

    // Liveness check has no state dependency
    let liveness_route = Router::new().route("/livez", get(monitoring::liveness));

    Router::new()
        .nest("/jobs", job_router)
        .merge(scheduler_routes)
        .merge(liveness_route)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
