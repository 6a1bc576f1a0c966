//! Readiness endpoint

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use axum_helpers::{HealthCheckFuture, ReadyResponse, run_health_checks};

use crate::state::AppState;

/// `GET /ready`, 503 while MongoDB does not answer a ping
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(readiness_check))
        .with_state(state)
}

async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let checks: Vec<(&str, HealthCheckFuture)> = vec![(
        "mongodb",
        Box::pin(async {
            database::mongodb::check_health(&state.mongo_client)
                .await
                .map(|latency| tracing::debug!(?latency, "MongoDB ping"))
                .map_err(|e| e.to_string())
        }),
    )];
    run_health_checks(checks).await
}
