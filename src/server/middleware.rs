// HTTP middleware
// Author: kelexine (https://github.com/kelexine)

use super::handlers::CACHE_STATUS_HEADER;
use crate::metrics;
use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

/// Create request ID layers for the application
pub fn request_id_layers() -> (SetRequestIdLayer<MakeRequestUuid>, PropagateRequestIdLayer) {
    (
        SetRequestIdLayer::x_request_id(MakeRequestUuid),
        PropagateRequestIdLayer::x_request_id(),
    )
}

/// Record per-route request counts and latency
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let started = Instant::now();

    let response = next.run(req).await;

    let cached = response
        .headers()
        .get(CACHE_STATUS_HEADER)
        .is_some_and(|value| value == "HIT");
    metrics::record_request(
        &endpoint,
        response.status().as_u16(),
        cached,
        started.elapsed().as_secs_f64(),
    );

    response
}
