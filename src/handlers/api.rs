use axum::Json;
use serde::Serialize;

/// Health check response body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

/// Liveness probe. Does not touch the upstream service.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}
