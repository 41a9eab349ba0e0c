// src/pipeline/frame_context.rs
//
// Everything the session knows about one input frame. Built once per
// frame; downstream stages read from it instead of re-deriving.

use crate::analysis::observation::{Observation, Observer};
use crate::types::FrameState;

#[derive(Debug, Clone)]
pub struct FrameContext {
    pub frame_index: u64,
    /// frame_index / frame_rate, seconds
    pub timestamp: f64,
    pub detection_count: usize,
    pub observation: Observation,
}

impl FrameContext {
    pub fn new(frame_index: u64, frame_rate: f64, frame: &FrameState, observer: &Observer) -> Self {
        Self {
            frame_index,
            timestamp: frame_index as f64 / frame_rate,
            detection_count: frame.detection_count(),
            observation: observer.observe(frame),
        }
    }

    pub fn has_ball(&self) -> bool {
        self.observation.ball.is_some()
    }
}
