// Error types for the promptcache service
// Author: kelexine (https://github.com/kelexine)

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Failures surfaced at the request boundary.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Generation failed: {0}")]
    Inference(#[from] InferenceError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures from the inference engine. Fatal to the single request only.
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("engine request failed: {0}")]
    Request(String),

    #[error("engine returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode engine response: {0}")]
    Decode(String),

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("engine is not accepting work: {0}")]
    Unavailable(String),
}

impl InferenceError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            InferenceError::Request(_) => "request",
            InferenceError::Status { .. } => "status",
            InferenceError::Decode(_) => "decode",
            InferenceError::Timeout(_) => "timeout",
            InferenceError::Unavailable(_) => "unavailable",
        }
    }
}

impl From<reqwest::Error> for InferenceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            InferenceError::Decode(e.to_string())
        } else {
            InferenceError::Request(e.to_string())
        }
    }
}

/// Failures talking to a cache backend. Always absorbed by the cache layer.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("cache operation timed out after {0:?}")]
    Timeout(Duration),
}

impl CacheError {
    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CacheError::Backend(_) => "backend",
            CacheError::Timeout(_) => "timeout",
        }
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(e: redis::RedisError) -> Self {
        CacheError::Backend(e.to_string())
    }
}

// Convert ServiceError to HTTP responses for Axum
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match self {
            ServiceError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let detail = match &self {
            ServiceError::InvalidRequest(message) => message.clone(),
            _ => self.to_string(),
        };

        (status, axum::Json(json!({ "detail": detail }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
