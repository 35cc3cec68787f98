pub mod orders;
pub mod products;

use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub store: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthStatus),
        (status = 503, description = "Service is unhealthy", body = HealthStatus)
    ),
    tag = "Health"
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let (store_status, status_code) = match state.orders.health_check().await {
        Ok(()) => ("connected", StatusCode::OK),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            ("disconnected", StatusCode::SERVICE_UNAVAILABLE)
        }
    };

    let health_response = HealthStatus {
        status: if status_code == StatusCode::OK {
            "healthy".to_string()
        } else {
            "unhealthy".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: store_status.to_string(),
    };

    (status_code, Json(health_response))
}
