// src/analysis/window.rs

use super::observation::{Observation, RimContact};
use super::possession::PossessionCandidate;
use crate::types::{PlayerId, Point};
use std::collections::{HashMap, VecDeque};

/// Sliding window over the last N observations
///
/// Nothing is emitted until the window has filled once, so a session with
/// fewer frames than the window produces no aggregated states at all.
/// With N = 1 every observation passes through unchanged.
pub struct WindowAggregator {
    history: VecDeque<Observation>,
    window_size: usize,
}

impl WindowAggregator {
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            history: VecDeque::with_capacity(window_size),
            window_size,
        }
    }

    /// Aggregation rules:
    /// - Ball: most recent frame
    /// - Possession candidate: most frequent non-empty candidate, ties go
    ///   to the most recent; empty only when no frame had one
    /// - Rim contact: strongest contact anywhere in the window
    pub fn push(&mut self, observation: Observation) -> Option<Observation> {
        self.history.push_back(observation);
        if self.history.len() > self.window_size {
            self.history.pop_front();
        }

        if self.history.len() < self.window_size {
            return None;
        }
        if self.window_size == 1 {
            return self.history.back().cloned();
        }

        let latest = self.history.back()?;
        let (rim_contact, rim_center) = self.strongest_contact();

        Some(Observation {
            ball: latest.ball,
            candidate: self.mode_candidate(),
            rim_contact,
            rim_center,
        })
    }

    fn mode_candidate(&self) -> Option<PossessionCandidate> {
        // value -> (count, index of most recent occurrence)
        let mut counts: HashMap<PlayerId, (usize, usize)> = HashMap::new();
        for (idx, obs) in self.history.iter().enumerate() {
            if let Some(c) = obs.candidate {
                let entry = counts.entry(c.player_id).or_insert((0, idx));
                entry.0 += 1;
                entry.1 = idx;
            }
        }

        let (winner, _) = counts
            .into_iter()
            .max_by_key(|(_, (count, last_idx))| (*count, *last_idx))?;

        self.history
            .iter()
            .rev()
            .filter_map(|obs| obs.candidate)
            .find(|c| c.player_id == winner)
    }

    fn strongest_contact(&self) -> (RimContact, Option<Point>) {
        let mut best = (RimContact::Away, None);
        for obs in &self.history {
            if obs.rim_contact >= best.0 && obs.rim_contact != RimContact::Away {
                best = (obs.rim_contact, obs.rim_center);
            }
        }
        best
    }

    pub fn history_size(&self) -> usize {
        self.history.len()
    }
}
