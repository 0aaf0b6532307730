//! Rolling Latency Window
//!
//! Bounded FIFO of recent per-detection latencies. When full, the oldest
//! sample is evicted to make room for the newest.

use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;

/// Default number of retained samples
pub const DEFAULT_WINDOW_CAPACITY: usize = 30;

/// Throughput summary computed from a window
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThroughputReport {
    /// Detections per second over the reporting interval
    pub detections_per_sec: f64,
    /// Mean latency of the retained samples (seconds)
    pub avg_latency_secs: f64,
    /// Samples the report was computed from
    pub samples: usize,
}

/// Bounded window of latency samples
#[derive(Debug, Clone)]
pub struct LatencyWindow {
    samples: VecDeque<Duration>,
    capacity: usize,
}

impl LatencyWindow {
    /// Create a window holding at most `capacity` samples (at least 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest when full
    pub fn push(&mut self, latency: Duration) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(latency);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Mean of the retained samples
    pub fn average(&self) -> Option<Duration> {
        if self.samples.is_empty() {
            return None;
        }
        let total: Duration = self.samples.iter().sum();
        Some(total / self.samples.len() as u32)
    }

    /// Summarize the window over an interval of length `elapsed`
    pub fn report(&self, elapsed: Duration) -> Option<ThroughputReport> {
        let secs = elapsed.as_secs_f64();
        if secs <= 0.0 {
            return None;
        }
        let avg = self.average()?;
        Some(ThroughputReport {
            detections_per_sec: self.samples.len() as f64 / secs,
            avg_latency_secs: avg.as_secs_f64(),
            samples: self.samples.len(),
        })
    }
}

impl Default for LatencyWindow {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_WINDOW_CAPACITY)
    }
}
