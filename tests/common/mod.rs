// Shared helpers for integration tests
// Author: kelexine (https://github.com/kelexine)

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use promptcache::cache::{CacheBackend, CacheManager, MemoryBackend};
use promptcache::config::{AppConfig, CacheBackendKind};
use promptcache::engine::{GenerationParams, InferenceEngine};
use promptcache::error::{CacheError, InferenceError};
use promptcache::metrics::{HostSample, MetricsRecorder, StaticSampler};
use promptcache::server::create_router;
use promptcache::service::{GenerationService, GenerationSettings};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// Engine that echoes the prompt followed by a fixed continuation.
pub struct StubEngine {
    pub continuation: String,
    pub delay: Duration,
    pub fail_with: Option<String>,
    pub calls: AtomicUsize,
}

impl StubEngine {
    pub fn replying(continuation: &str) -> Self {
        Self {
            continuation: continuation.to_string(),
            delay: Duration::from_millis(25),
            fail_with: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::replying("")
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceEngine for StubEngine {
    fn name(&self) -> &str {
        "stub"
    }

    fn echoes_prompt(&self) -> bool {
        true
    }

    async fn generate(&self, prompt: &str, _params: &GenerationParams) -> Result<String, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        match &self.fail_with {
            Some(message) => Err(InferenceError::Request(message.clone())),
            None => Ok(format!("{}{}", prompt, self.continuation)),
        }
    }
}

/// Networked-style backend that fails every call.
pub struct UnreachableBackend;

#[async_trait]
impl CacheBackend for UnreachableBackend {
    fn kind(&self) -> CacheBackendKind {
        CacheBackendKind::Redis
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Backend("Connection refused (os error 111)".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Backend("Connection refused (os error 111)".to_string()))
    }
}

pub struct Harness {
    pub router: Router,
    pub engine: Arc<StubEngine>,
    pub recorder: Arc<MetricsRecorder>,
}

pub fn harness(engine: StubEngine, backend: Arc<dyn CacheBackend>) -> Harness {
    let config = AppConfig::default();
    let engine = Arc::new(engine);
    let cache = Arc::new(CacheManager::new(backend, Duration::from_secs(60)));
    let recorder = Arc::new(MetricsRecorder::new(Arc::new(StaticSampler(HostSample {
        memory_percent: 42.0,
        cpu_percent: 7.0,
    }))));
    let service = Arc::new(GenerationService::new(
        cache,
        Arc::clone(&recorder),
        engine.clone(),
        GenerationSettings::from_config(&config),
    ));
    let router = create_router(config, service).unwrap();

    Harness {
        router,
        engine,
        recorder,
    }
}

pub fn memory_harness(engine: StubEngine) -> Harness {
    harness(engine, Arc::new(MemoryBackend::new()))
}

pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

pub async fn post_generate(router: &Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/generate")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(router, request).await
}
