// src/pipeline/metrics.rs
//
// Session counters. Handles are cheap to clone so a host can watch a run
// from another thread while it is in progress.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct SessionMetrics {
    pub total_frames: Arc<AtomicU64>,
    pub frames_with_ball: Arc<AtomicU64>,
    pub frames_with_holder: Arc<AtomicU64>,
    pub aggregated_states: Arc<AtomicU64>,
    pub events_emitted: Arc<AtomicU64>,
    pub shot_attempts: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self {
            total_frames: Arc::new(AtomicU64::new(0)),
            frames_with_ball: Arc::new(AtomicU64::new(0)),
            frames_with_holder: Arc::new(AtomicU64::new(0)),
            aggregated_states: Arc::new(AtomicU64::new(0)),
            events_emitted: Arc::new(AtomicU64::new(0)),
            shot_attempts: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }

    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    /// Processing rate in frames per wall-clock second
    pub fn fps(&self) -> f64 {
        let frames = self.total_frames.load(Ordering::Relaxed);
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            frames as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_frames: self.total_frames.load(Ordering::Relaxed),
            frames_with_ball: self.frames_with_ball.load(Ordering::Relaxed),
            frames_with_holder: self.frames_with_holder.load(Ordering::Relaxed),
            aggregated_states: self.aggregated_states.load(Ordering::Relaxed),
            events_emitted: self.events_emitted.load(Ordering::Relaxed),
            shot_attempts: self.shot_attempts.load(Ordering::Relaxed),
            fps: self.fps(),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub total_frames: u64,
    pub frames_with_ball: u64,
    pub frames_with_holder: u64,
    pub aggregated_states: u64,
    pub events_emitted: u64,
    pub shot_attempts: u64,
    pub fps: f64,
    pub elapsed_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloned_handles_share_counters() {
        let metrics = SessionMetrics::new();
        let watcher = metrics.clone();
        metrics.inc(&metrics.total_frames);
        metrics.add(&metrics.events_emitted, 3);
        let summary = watcher.summary();
        assert_eq!(summary.total_frames, 1);
        assert_eq!(summary.events_emitted, 3);
    }
}
