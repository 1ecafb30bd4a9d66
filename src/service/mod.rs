//! Request orchestration.
//!
//! [`GenerationService`] composes the response cache, the inference engine
//! and the metrics recorder for one `/generate` call:
//!
//! - cache hit: record a hit observation and answer immediately
//! - cache miss: call the engine, store the completion, record a miss
//! - engine failure: record nothing and surface [`ServiceError::Inference`]
//!
//! Failures are never retried.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::cache::CacheManager;
use crate::config::{AppConfig, CacheBackendKind};
use crate::engine::{completion_text, GenerationParams, InferenceEngine};
use crate::error::{InferenceError, Result, ServiceError};
use crate::metrics::{self, MetricsRecorder, StatsSnapshot};
use crate::models::api::{GenerateRequest, GenerateResponse};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

/// Defaults and limits applied to every generation.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub default_max_length: u32,
    pub default_temperature: f32,
    /// Engine calls allowed in flight at once.
    pub max_concurrent: usize,
    /// Deadline covering both the wait for a slot and the engine call.
    pub request_timeout: Duration,
}

impl GenerationSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            default_max_length: config.model.max_length,
            default_temperature: config.model.temperature,
            max_concurrent: config.performance.max_concurrent_requests,
            request_timeout: Duration::from_secs(config.performance.request_timeout_seconds),
        }
    }
}

/// Orchestrates cache lookup, generation and metrics for each request.
pub struct GenerationService {
    cache: Arc<CacheManager>,
    recorder: Arc<MetricsRecorder>,
    engine: Arc<dyn InferenceEngine>,
    limiter: Semaphore,
    settings: GenerationSettings,
}

impl GenerationService {
    /// Cache and recorder must be fully constructed before the service
    /// accepts traffic.
    pub fn new(
        cache: Arc<CacheManager>,
        recorder: Arc<MetricsRecorder>,
        engine: Arc<dyn InferenceEngine>,
        settings: GenerationSettings,
    ) -> Self {
        let permits = settings.max_concurrent.max(1);
        info!(
            "Generation service ready: engine={}, cache={}, max_concurrent={}",
            engine.name(),
            cache.kind(),
            permits
        );
        Self {
            cache,
            recorder,
            engine,
            limiter: Semaphore::new(permits),
            settings,
        }
    }

    pub fn cache_kind(&self) -> CacheBackendKind {
        self.cache.kind()
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Rolling statistics over recorded requests
    pub fn stats(&self) -> StatsSnapshot {
        self.recorder.snapshot()
    }

    /// Serve a generation request arriving now
    pub async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        self.generate_since(request, Instant::now()).await
    }

    /// Serve a generation request that arrived at `started`
    pub async fn generate_since(
        &self,
        request: GenerateRequest,
        started: Instant,
    ) -> Result<GenerateResponse> {
        let params = self.resolve_params(&request)?;
        let prompt = request.text;

        if let Some(cached) = self.cache.get(&prompt).await {
            let elapsed = started.elapsed();
            self.recorder.observe(elapsed, &prompt, &cached, true);
            return Ok(GenerateResponse {
                response: cached,
                cached: true,
                response_time: elapsed.as_secs_f64(),
            });
        }

        let raw = match self.invoke_engine(&prompt, &params).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(kind = e.kind(), "Generation failed: {}", e);
                metrics::record_engine_failure(e.kind());
                return Err(ServiceError::Inference(e));
            }
        };

        let response = completion_text(self.engine.echoes_prompt(), &prompt, &raw);
        self.cache.set(&prompt, &response).await;

        let elapsed = started.elapsed();
        self.recorder.observe(elapsed, &prompt, &response, false);
        Ok(GenerateResponse {
            response,
            cached: false,
            response_time: elapsed.as_secs_f64(),
        })
    }

    fn resolve_params(&self, request: &GenerateRequest) -> Result<GenerationParams> {
        let max_length = request.max_length.unwrap_or(self.settings.default_max_length);
        if max_length == 0 {
            return Err(ServiceError::InvalidRequest(
                "max_length must be at least 1".to_string(),
            ));
        }

        let temperature = request
            .temperature
            .unwrap_or(self.settings.default_temperature);
        if !temperature.is_finite() || temperature < 0.0 {
            return Err(ServiceError::InvalidRequest(
                "temperature must be a non-negative number".to_string(),
            ));
        }

        Ok(GenerationParams {
            max_length,
            temperature,
        })
    }

    async fn invoke_engine(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> std::result::Result<String, InferenceError> {
        let timeout = self.settings.request_timeout;
        let started = Instant::now();

        let outcome = tokio::time::timeout(timeout, async {
            let _permit = self
                .limiter
                .acquire()
                .await
                .map_err(|_| InferenceError::Unavailable("generation limiter closed".to_string()))?;
            self.publish_in_flight();
            debug!("Invoking inference engine ({} chars)", prompt.len());
            self.engine.generate(prompt, params).await
        })
        .await
        .unwrap_or_else(|_| Err(InferenceError::Timeout(timeout)));

        self.publish_in_flight();
        metrics::record_engine_call(outcome.is_ok(), started.elapsed().as_secs_f64());
        outcome
    }

    fn publish_in_flight(&self) {
        let in_flight = self.settings.max_concurrent.max(1) - self.limiter.available_permits();
        metrics::update_engine_in_flight(self.engine.name(), in_flight);
    }
}
