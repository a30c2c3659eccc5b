use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;

use crate::services::metrics::get_metrics;
use crate::AppState;

/// Liveness plus a storage ping.
pub async fn health_check(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    state.suppliers.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "Health check failed");
        AppError::ServiceUnavailable
    })?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": state.config.service_name,
            "version": state.config.service_version,
        })),
    ))
}

/// Prometheus metrics endpoint.
pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        get_metrics(),
    )
}
