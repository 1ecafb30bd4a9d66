// Rolling statistics over the request history
// Author: kelexine (https://github.com/kelexine)

use super::recorder::RequestObservation;
use serde::Serialize;
use std::collections::VecDeque;

/// Number of most recent observations averaged by a snapshot.
pub const STATS_WINDOW: usize = 100;

/// Message returned when nothing has been recorded yet.
pub const NO_DATA_MESSAGE: &str = "No requests recorded";

/// Result of a stats request. Serializes to the summary object, or to
/// `{"message": "No requests recorded"}` when the history is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatsSnapshot {
    Summary(StatsSummary),
    NoData { message: String },
}

/// Averages over the rolling window plus the all-time count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    /// Size of the whole retained history, not just the window.
    pub total_requests: usize,
    pub avg_response_time: f64,
    pub cache_hit_rate: f64,
    pub avg_memory_usage: f64,
    pub avg_cpu_usage: f64,
    pub latest_request: RequestObservation,
}

impl StatsSnapshot {
    pub fn no_data() -> Self {
        StatsSnapshot::NoData {
            message: NO_DATA_MESSAGE.to_string(),
        }
    }

    pub fn summary(&self) -> Option<&StatsSummary> {
        match self {
            StatsSnapshot::Summary(summary) => Some(summary),
            StatsSnapshot::NoData { .. } => None,
        }
    }
}

/// Summarize the last `min(window, history.len())` observations.
pub fn summarize(history: &VecDeque<RequestObservation>, window: usize) -> StatsSnapshot {
    let Some(latest) = history.back() else {
        return StatsSnapshot::no_data();
    };

    let size = window.clamp(1, history.len());
    let recent = history.iter().skip(history.len() - size);

    let mut response_time = 0.0;
    let mut memory = 0.0;
    let mut cpu = 0.0;
    let mut hits = 0usize;
    for observation in recent {
        response_time += observation.response_time;
        memory += observation.memory_usage;
        cpu += observation.cpu_usage;
        if observation.cache_hit {
            hits += 1;
        }
    }

    let n = size as f64;
    StatsSnapshot::Summary(StatsSummary {
        total_requests: history.len(),
        avg_response_time: response_time / n,
        cache_hit_rate: hits as f64 / n,
        avg_memory_usage: memory / n,
        avg_cpu_usage: cpu / n,
        latest_request: latest.clone(),
    })
}
