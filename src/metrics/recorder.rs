// Bounded request history
// Author: kelexine (https://github.com/kelexine)

use super::sampler::ResourceSampler;
use super::stats::{summarize, StatsSnapshot, STATS_WINDOW};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Number of observations retained; older ones are evicted first.
pub const HISTORY_CAPACITY: usize = 1000;

/// One served request. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestObservation {
    /// Seconds since the Unix epoch at recording time.
    pub timestamp: f64,
    /// End-to-end response time in seconds.
    pub response_time: f64,
    /// Prompt length in characters.
    pub input_length: usize,
    /// Completion length in characters.
    pub output_length: usize,
    pub cache_hit: bool,
    /// Host memory utilization (%) sampled at recording time.
    pub memory_usage: f64,
    /// Host CPU utilization (%) sampled at recording time.
    pub cpu_usage: f64,
}

/// Append-only history of request observations, shared across requests.
pub struct MetricsRecorder {
    history: Mutex<VecDeque<RequestObservation>>,
    capacity: usize,
    sampler: Arc<dyn ResourceSampler>,
}

impl MetricsRecorder {
    pub fn new(sampler: Arc<dyn ResourceSampler>) -> Self {
        Self::with_capacity(sampler, HISTORY_CAPACITY)
    }

    pub fn with_capacity(sampler: Arc<dyn ResourceSampler>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            sampler,
        }
    }

    /// Build an observation for a served request, sampling host load now.
    pub fn observe(
        &self,
        response_time: Duration,
        input: &str,
        output: &str,
        cache_hit: bool,
    ) -> RequestObservation {
        let host = self.sampler.sample();
        let observation = RequestObservation {
            timestamp: chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0,
            response_time: response_time.as_secs_f64(),
            input_length: input.chars().count(),
            output_length: output.chars().count(),
            cache_hit,
            memory_usage: host.memory_percent,
            cpu_usage: host.cpu_percent,
        };
        self.record(observation.clone());
        observation
    }

    /// Append an observation, evicting the oldest when over capacity.
    pub fn record(&self, observation: RequestObservation) {
        let mut history = self.history.lock();
        history.push_back(observation);
        while history.len() > self.capacity {
            history.pop_front();
        }
    }

    /// Rolling statistics over the most recent observations.
    pub fn snapshot(&self) -> StatsSnapshot {
        summarize(&self.history.lock(), STATS_WINDOW)
    }

    /// Copy of the retained history, oldest first.
    pub fn history(&self) -> Vec<RequestObservation> {
        self.history.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.history.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
