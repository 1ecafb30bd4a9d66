//! Host resource sampling.
//!
//! Reading memory and CPU utilization costs a few syscalls and, for CPU, two
//! readings separated in time. [`SystemSampler`] keeps that off the request
//! path: a background task refreshes a shared reading and [`ResourceSampler::sample`]
//! only copies the latest value.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use parking_lot::RwLock;
use serde::Serialize;
use std::sync::{Arc, Weak};
use std::time::Duration;
use sysinfo::System;
use tracing::{debug, warn};

/// Ambient host load at one instant, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HostSample {
    pub memory_percent: f64,
    pub cpu_percent: f64,
}

impl HostSample {
    /// Substituted whenever a real reading is not available.
    pub const UNAVAILABLE: HostSample = HostSample {
        memory_percent: 0.0,
        cpu_percent: 0.0,
    };
}

/// Source of host utilization readings. Must never fail.
pub trait ResourceSampler: Send + Sync {
    fn sample(&self) -> HostSample;
}

/// Sampler returning a fixed reading.
#[derive(Debug, Clone, Copy)]
pub struct StaticSampler(pub HostSample);

impl ResourceSampler for StaticSampler {
    fn sample(&self) -> HostSample {
        self.0
    }
}

/// Sampler backed by `sysinfo`, refreshed on a background task.
#[derive(Debug)]
pub struct SystemSampler {
    latest: Arc<RwLock<HostSample>>,
}

impl SystemSampler {
    /// Start the refresh task on the current tokio runtime.
    ///
    /// The task stops on its own once the returned sampler is dropped.
    pub fn spawn(interval: Duration) -> Arc<Self> {
        let latest = Arc::new(RwLock::new(HostSample::UNAVAILABLE));
        let slot = Arc::downgrade(&latest);
        tokio::spawn(refresh_loop(slot, interval));
        Arc::new(Self { latest })
    }
}

impl ResourceSampler for SystemSampler {
    fn sample(&self) -> HostSample {
        *self.latest.read()
    }
}

async fn refresh_loop(slot: Weak<RwLock<HostSample>>, interval: Duration) {
    // CPU usage is a delta between refreshes; never tick faster than sysinfo can measure
    let interval = interval.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
    let mut ticker = tokio::time::interval(interval);
    let mut system = System::new();
    let mut warned = false;

    loop {
        ticker.tick().await;

        let Some(latest) = slot.upgrade() else {
            debug!("Resource sampler dropped, stopping refresh task");
            break;
        };

        system.refresh_memory();
        system.refresh_cpu();

        match read_sample(&system) {
            Some(sample) => {
                *latest.write() = sample;
                crate::metrics::update_host_utilization(sample);
            }
            None if !warned => {
                warn!("Host resource readings unavailable, reporting sentinel values");
                warned = true;
            }
            None => {}
        }
    }
}

fn read_sample(system: &System) -> Option<HostSample> {
    let total = system.total_memory();
    if total == 0 {
        return None;
    }
    let memory_percent = system.used_memory() as f64 / total as f64 * 100.0;
    let cpu_percent = f64::from(system.global_cpu_info().cpu_usage());
    Some(HostSample {
        memory_percent: sanitize_percent(memory_percent),
        cpu_percent: sanitize_percent(cpu_percent),
    })
}

fn sanitize_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_percent() {
        assert_eq!(sanitize_percent(f64::NAN), 0.0);
        assert_eq!(sanitize_percent(140.0), 100.0);
        assert_eq!(sanitize_percent(42.5), 42.5);
    }

    #[test]
    fn test_static_sampler() {
        let sample = HostSample {
            memory_percent: 12.0,
            cpu_percent: 3.5,
        };
        assert_eq!(StaticSampler(sample).sample(), sample);
    }

    #[tokio::test]
    async fn test_system_sampler_starts_with_sentinel_then_refreshes() {
        let sampler = SystemSampler::spawn(Duration::from_millis(10));
        // The refresh task has not been polled yet on a current-thread runtime
        assert_eq!(sampler.sample(), HostSample::UNAVAILABLE);

        tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL * 2).await;
        let later = sampler.sample();
        assert!(later.memory_percent > 0.0 && later.memory_percent <= 100.0);
        assert!(later.cpu_percent >= 0.0 && later.cpu_percent <= 100.0);
    }
}
