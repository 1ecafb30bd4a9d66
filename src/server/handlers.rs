// HTTP request handlers
// Author: kelexine (https://github.com/kelexine)

use super::routes::AppState;
use crate::error::ServiceError;
use crate::metrics::{gather_metrics, StatsSnapshot};
use crate::models::api::{GenerateRequest, HealthResponse, RootResponse};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::time::Instant;
use tracing::{error, info};

/// Response header telling clients whether `/generate` was served from cache.
pub const CACHE_STATUS_HEADER: &str = "x-cache";

pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: "promptcache is running!".to_string(),
    })
}

/// Handler for `POST /generate`
pub async fn generate_handler(
    State(state): State<AppState>,
    body: Bytes, // Raw body; decoding failures become 422
) -> Result<Response, ServiceError> {
    let started = Instant::now();

    // Manually deserialize to get better error messages
    let req: GenerateRequest = serde_json::from_slice(&body).map_err(|e| {
        error!("Failed to deserialize request: {}", e);
        ServiceError::InvalidRequest(format!("JSON deserialization error: {}", e))
    })?;

    info!(
        "Received generate request: chars={}, max_length={:?}, temperature={:?}",
        req.text.chars().count(),
        req.max_length,
        req.temperature
    );

    let response = state.service.generate_since(req, started).await?;
    let cache_status = if response.cached { "HIT" } else { "MISS" };

    info!(
        "Served generate request: cached={}, response_time={:.4}s",
        response.cached, response.response_time
    );

    Ok(([(CACHE_STATUS_HEADER, cache_status)], Json(response)).into_response())
}

/// Handler for `GET /metrics`
pub async fn metrics_handler(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.service.stats())
}

/// Handler for `GET /metrics/prometheus`
pub async fn prometheus_handler() -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        gather_metrics(),
    )
}

/// Handler for `GET /health`
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        model: state.config.model.name.clone(),
        cache_type: state.service.cache_kind().to_string(),
    })
}
