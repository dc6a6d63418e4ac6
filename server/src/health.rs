use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthCheckResponse {
    status: String,
}

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthCheckResponse>) {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthCheckResponse {
                status: "ok".to_string(),
            }),
        ),
        Err(e) => {
            tracing::warn!("health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthCheckResponse {
                    status: "unavailable".to_string(),
                }),
            )
        }
    }
}
