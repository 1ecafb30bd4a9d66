// Error handling tests
// Author: kelexine (https://github.com/kelexine)

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use promptcache::error::{CacheError, InferenceError, ServiceError};
use std::time::Duration;

async fn body_json(error: ServiceError) -> (StatusCode, serde_json::Value) {
    let response = error.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[test]
fn test_error_display_messages() {
    let errors = vec![
        ServiceError::Inference(InferenceError::Request("boom".to_string())),
        ServiceError::InvalidRequest("Bad request".to_string()),
        ServiceError::Config("bad port".to_string()),
        ServiceError::Internal("oops".to_string()),
    ];

    for error in errors {
        let display = format!("{}", error);
        assert!(!display.is_empty(), "Error should have display message");
    }
}

#[test]
fn test_inference_error_prefix() {
    let error = ServiceError::from(InferenceError::Status {
        status: 503,
        body: "loading".to_string(),
    });
    assert_eq!(
        error.to_string(),
        "Generation failed: engine returned HTTP 503: loading"
    );
}

#[test]
fn test_error_kinds() {
    assert_eq!(InferenceError::Timeout(Duration::from_secs(1)).kind(), "timeout");
    assert_eq!(InferenceError::Decode("x".to_string()).kind(), "decode");
    assert_eq!(CacheError::Backend("x".to_string()).kind(), "backend");
    assert_eq!(CacheError::Timeout(Duration::from_millis(5)).kind(), "timeout");
}

#[tokio::test]
async fn test_inference_error_response() {
    let (status, body) =
        body_json(ServiceError::Inference(InferenceError::Request("engine down".to_string()))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "Generation failed: engine request failed: engine down");
}

#[tokio::test]
async fn test_invalid_request_response() {
    let (status, body) = body_json(ServiceError::InvalidRequest("missing field `text`".to_string())).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"], "missing field `text`");
}
