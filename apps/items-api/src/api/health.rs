//! Health check endpoints

use axum::{Router, extract::State, routing::get};
use axum_helpers::{HealthCheckFuture, ReadinessResult, health_router, run_health_checks};

use crate::state::AppState;

/// `/health` plus `/ready`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(readiness_check))
        .with_state(state.clone())
        .merge(health_router(state.config.app))
}

/// Readiness check - pings MongoDB when it backs the repository
async fn readiness_check(State(state): State<AppState>) -> ReadinessResult {
    let store = if state.database.is_some() {
        "mongodb"
    } else {
        "memory"
    };

    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        store,
        Box::pin(async { state.check_store().await.map_err(|e| e.to_string()) }),
    )];

    run_health_checks(checks).await
}
