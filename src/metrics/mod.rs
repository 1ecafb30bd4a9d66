// Request metrics: bounded history, rolling stats and Prometheus collectors
// Author: kelexine (https://github.com/kelexine)

pub mod recorder;
mod registry;
pub mod sampler;
pub mod stats;

pub use recorder::{MetricsRecorder, RequestObservation, HISTORY_CAPACITY};
pub use registry::{
    gather_metrics,
    CACHE_OPERATIONS,
    ENGINE_DURATION,
    ENGINE_FAILURES,
    ENGINE_IN_FLIGHT,
    HOST_UTILIZATION,
    REQUESTS_TOTAL,
    REQUEST_DURATION,
};
pub use sampler::{HostSample, ResourceSampler, StaticSampler, SystemSampler};
pub use stats::{StatsSnapshot, StatsSummary, NO_DATA_MESSAGE, STATS_WINDOW};

/// Helper to record HTTP request metrics
pub fn record_request(endpoint: &str, status_code: u16, cached: bool, duration_secs: f64) {
    REQUESTS_TOTAL
        .with_label_values(&[endpoint, &status_code.to_string()])
        .inc();

    REQUEST_DURATION
        .with_label_values(&[endpoint, &cached.to_string()])
        .observe(duration_secs);
}

/// Helper to record an inference engine call
pub fn record_engine_call(success: bool, duration_secs: f64) {
    let outcome = if success { "success" } else { "failure" };
    ENGINE_DURATION
        .with_label_values(&[outcome])
        .observe(duration_secs);
}

pub fn record_engine_failure(kind: &str) {
    ENGINE_FAILURES.with_label_values(&[kind]).inc();
}

pub fn update_engine_in_flight(engine: &str, in_flight: usize) {
    ENGINE_IN_FLIGHT
        .with_label_values(&[engine])
        .set(in_flight as f64);
}

/// Helper to record cache operations (hit, miss, store, error)
pub fn record_cache_operation(backend: &str, operation: &str) {
    CACHE_OPERATIONS.with_label_values(&[backend, operation]).inc();
}

/// Helper to publish the latest host sample
pub fn update_host_utilization(sample: HostSample) {
    HOST_UTILIZATION
        .with_label_values(&["memory"])
        .set(sample.memory_percent);
    HOST_UTILIZATION
        .with_label_values(&["cpu"])
        .set(sample.cpu_percent);
}
