// Prometheus metrics registry and collectors
// Author: kelexine (https://github.com/kelexine)

use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramVec, Opts, Registry, TextEncoder,
    register_counter_vec_with_registry, register_gauge_vec_with_registry,
    register_histogram_vec_with_registry,
};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // REQUEST METRICS
    // ============================================================================

    /// Total number of HTTP requests
    pub static ref REQUESTS_TOTAL: CounterVec = register_counter_vec_with_registry!(
        Opts::new("requests_total", "Total number of API requests"),
        &["endpoint", "status_code"],
        REGISTRY
    ).unwrap();

    /// Request duration histogram
    pub static ref REQUEST_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new("request_duration_seconds", "Request duration in seconds")
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["endpoint", "cached"],
        REGISTRY
    ).unwrap();

    // ============================================================================
    // ENGINE METRICS
    // ============================================================================

    /// Inference engine call duration
    pub static ref ENGINE_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new("engine_call_duration_seconds", "Inference engine call duration")
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["outcome"], // outcome: success, failure
        REGISTRY
    ).unwrap();

    /// Inference engine failures by kind
    pub static ref ENGINE_FAILURES: CounterVec = register_counter_vec_with_registry!(
        Opts::new("engine_failures_total", "Total inference engine failures"),
        &["kind"],
        REGISTRY
    ).unwrap();

    /// Generation slots currently held
    pub static ref ENGINE_IN_FLIGHT: GaugeVec = register_gauge_vec_with_registry!(
        Opts::new("engine_in_flight", "Generation calls currently holding a concurrency slot"),
        &["engine"],
        REGISTRY
    ).unwrap();

    // ============================================================================
    // CACHE METRICS
    // ============================================================================

    /// Cache operations
    pub static ref CACHE_OPERATIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("cache_operations_total", "Total cache operations"),
        &["backend", "operation"], // operation: hit, miss, store, error
        REGISTRY
    ).unwrap();

    // ============================================================================
    // HOST METRICS
    // ============================================================================

    /// Latest host resource sample
    pub static ref HOST_UTILIZATION: GaugeVec = register_gauge_vec_with_registry!(
        Opts::new("host_utilization_percent", "Latest sampled host utilization"),
        &["resource"], // resource: memory, cpu
        REGISTRY
    ).unwrap();
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode Prometheus metrics: {}", e);
        return String::new();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
