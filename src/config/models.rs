//! Configuration data structures for the promptcache service.
//!
//! This module defines the schema for the application settings: server
//! binding, generation defaults, cache backend selection, the upstream
//! inference engine and performance limits.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings (host, port, body limit).
    #[serde(default)]
    pub server: ServerConfig,

    /// Model identity and generation defaults.
    #[serde(default)]
    pub model: ModelConfig,

    /// Response cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Upstream inference engine settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Concurrency and sampling settings.
    #[serde(default)]
    pub performance: PerformanceConfig,
}

/// Settings for the built-in HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The IP address or hostname the server should bind to.
    /// Default: `0.0.0.0`
    #[serde(default = "default_host")]
    pub host: String,

    /// The port number the server should listen on.
    /// Default: `8000`
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request body in bytes.
    /// Default: `1048576` (1 MiB)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Model identity and the defaults applied to `/generate` requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Identifier reported by `/health`.
    /// Default: `microsoft/DialoGPT-small`
    #[serde(default = "default_model_name")]
    pub name: String,

    /// Default `max_length` when a request omits it.
    /// Default: `100`
    #[serde(default = "default_max_length")]
    pub max_length: u32,

    /// Default sampling temperature when a request omits it.
    /// Default: `0.7`
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// Which cache backend serves the process. Fixed for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    /// Unbounded in-process map, lost on restart.
    #[default]
    Memory,
    /// Remote Redis instance with per-entry TTL.
    Redis,
}

impl CacheBackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheBackendKind::Memory => "memory",
            CacheBackendKind::Redis => "redis",
        }
    }
}

impl fmt::Display for CacheBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for the response cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Backend selection.
    /// Default: `memory`
    #[serde(default)]
    pub backend: CacheBackendKind,

    /// Connection URL for the Redis backend.
    /// Default: `redis://localhost:6379`
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Time-to-live for Redis entries in seconds.
    /// Default: `3600` (1 hour)
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,

    /// Upper bound on a single Redis round-trip before it counts as a miss.
    /// Default: `500`
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
}

/// Settings for the upstream text-generation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base URL of the text-generation service.
    /// Default: `http://127.0.0.1:8080`
    #[serde(default = "default_engine_endpoint")]
    pub endpoint: String,

    /// Whether the engine returns the prompt as a prefix of its output.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub echoes_prompt: bool,

    /// Upper bound on newly generated tokens per call.
    /// Default: `50`
    #[serde(default = "default_max_new_tokens_cap")]
    pub max_new_tokens_cap: u32,

    /// HTTP timeout for a single engine call in seconds.
    /// Default: `120`
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`, `compact`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Settings for tuning application performance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Maximum number of generation calls in flight at once.
    /// Default: `10`
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Deadline for a generation call, including time queued for a slot.
    /// Default: `120`
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,

    /// Refresh interval of the background host resource sampler.
    /// Default: `1000`
    #[serde(default = "default_sampler_interval_ms")]
    pub sampler_interval_ms: u64,
}

// Default trait implementations linking to custom logic

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            max_length: default_max_length(),
            temperature: default_temperature(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackendKind::default(),
            redis_url: default_redis_url(),
            ttl_seconds: default_ttl_seconds(),
            operation_timeout_ms: default_operation_timeout_ms(),
        }
    }
}

impl CacheConfig {
    /// Entry time-to-live as a duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            endpoint: default_engine_endpoint(),
            echoes_prompt: true,
            max_new_tokens_cap: default_max_new_tokens_cap(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: default_max_concurrent_requests(),
            request_timeout_seconds: default_timeout(),
            sampler_interval_ms: default_sampler_interval_ms(),
        }
    }
}

// Helper functions for serde defaults and shared constants
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_model_name() -> String {
    "microsoft/DialoGPT-small".to_string()
}

fn default_max_length() -> u32 {
    100
}

fn default_temperature() -> f32 {
    0.7
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_ttl_seconds() -> u64 {
    3600 // 1 hour
}

fn default_operation_timeout_ms() -> u64 {
    500
}

fn default_engine_endpoint() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_new_tokens_cap() -> u32 {
    50
}

fn default_timeout() -> u64 {
    120
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_max_concurrent_requests() -> usize {
    10
}

fn default_sampler_interval_ms() -> u64 {
    1000
}
