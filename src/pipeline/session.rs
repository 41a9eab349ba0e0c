// src/pipeline/session.rs
//
// Game session driver. Owns every piece of mutable state for one run
// (possession, event machine, stats ledger, event log) and advances it one
// frame at a time in strict temporal order.
//
// Per frame:
//   1. observe the FrameState (ball, nearest player, rim contact)
//   2. aggregate over the window; nothing happens until it is full
//   3. shot phase (may release the holder or resolve an attempt)
//   4. possession phase (resolver commit, then transition events)
//   5. apply emitted events to the ledger and append them to the log

use super::event_log::EventLog;
use super::frame_context::FrameContext;
use super::metrics::SessionMetrics;
use crate::analysis::event_machine::EventStateMachine;
use crate::analysis::observation::Observer;
use crate::analysis::possession::{PossessionResolver, PossessionState};
use crate::analysis::teams::{team_lookup, TeamLookup};
use crate::analysis::window::WindowAggregator;
use crate::detection::FrameSource;
use crate::error::AnalysisError;
use crate::events::{EventType, GameEvent};
use crate::report::GameReport;
use crate::stats::StatsLedger;
use crate::types::{Config, FrameState};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct GameSession {
    frame_rate: f64,
    window_size: usize,
    progress_log_interval: u64,

    observer: Observer,
    window: WindowAggregator,
    resolver: PossessionResolver,
    possession: PossessionState,
    machine: EventStateMachine,
    teams: Arc<dyn TeamLookup>,

    ledger: StatsLedger,
    log: EventLog,
    metrics: SessionMetrics,
    frames_processed: u64,
}

impl GameSession {
    /// Team membership comes from `config.teams`
    pub fn new(config: &Config) -> Self {
        Self::with_teams(config, team_lookup(&config.teams))
    }

    pub fn with_teams(config: &Config, teams: Arc<dyn TeamLookup>) -> Self {
        Self {
            frame_rate: config.video.frame_rate,
            window_size: config.video.window_size.max(1),
            progress_log_interval: config.video.progress_log_interval,
            observer: Observer::new(config),
            window: WindowAggregator::new(config.video.window_size),
            resolver: PossessionResolver::new(config.possession.clone()),
            possession: PossessionState::new(),
            machine: EventStateMachine::new(&config.events, teams.clone()),
            teams,
            ledger: StatsLedger::new(),
            log: EventLog::new(),
            metrics: SessionMetrics::new(),
            frames_processed: 0,
        }
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn possession(&self) -> &PossessionState {
        &self.possession
    }

    pub fn events(&self) -> &[GameEvent] {
        self.log.events()
    }

    pub fn stats(&self) -> &StatsLedger {
        &self.ledger
    }

    pub fn metrics(&self) -> SessionMetrics {
        self.metrics.clone()
    }

    /// Advances the session by one frame and returns the events it produced
    pub fn process_frame(&mut self, frame: &FrameState) -> Vec<GameEvent> {
        let ctx = FrameContext::new(self.frames_processed, self.frame_rate, frame, &self.observer);
        self.frames_processed += 1;

        self.metrics.inc(&self.metrics.total_frames);
        if ctx.has_ball() {
            self.metrics.inc(&self.metrics.frames_with_ball);
        }

        let Some(obs) = self.window.push(ctx.observation) else {
            return Vec::new();
        };
        self.metrics.inc(&self.metrics.aggregated_states);
        let now = ctx.timestamp;

        let mut emitted = self
            .machine
            .track_shot(&obs, now, &self.resolver, &mut self.possession);
        if self.machine.ball_at_rim() {
            debug!("Frame {}: ball at the rim, possession frozen", ctx.frame_index);
        }

        let candidate = if self.machine.ball_at_rim() {
            None
        } else {
            obs.candidate.as_ref()
        };
        let snapshot = self.resolver.update(&mut self.possession, candidate, now);
        if snapshot.current.is_some() {
            self.metrics.inc(&self.metrics.frames_with_holder);
        }
        emitted.extend(self.machine.track_possession(&snapshot, now));

        for event in &emitted {
            if event.event_type == EventType::Shot {
                self.metrics.inc(&self.metrics.shot_attempts);
            }
            info!("{}", event);
            self.ledger.apply(event);
            self.log.append(event.clone());
        }
        self.metrics
            .add(&self.metrics.events_emitted, emitted.len() as u64);

        emitted
    }

    /// Drains `source` through the session.
    ///
    /// `cancel` is checked between frames; a set flag aborts with
    /// `AnalysisError::Cancelled`. An upstream error aborts immediately.
    pub fn run<S>(&mut self, source: &mut S, cancel: &AtomicBool) -> Result<(), AnalysisError>
    where
        S: FrameSource + ?Sized,
    {
        // Only a fresh session adopts the source's rate
        match source.frame_rate() {
            Some(rate) if rate.is_finite() && rate > 0.0 => {
                if self.frames_processed == 0 {
                    self.frame_rate = rate;
                }
            }
            Some(rate) => warn!("Ignoring invalid source frame rate {}", rate),
            None => {}
        }

        info!(
            "▶️  Processing {} at {:.1} fps (window {})",
            source.describe(),
            self.frame_rate,
            self.window_size
        );

        loop {
            if cancel.load(Ordering::Relaxed) {
                warn!(
                    "Run over {} cancelled after {} frames",
                    source.describe(),
                    self.frames_processed
                );
                return Err(AnalysisError::Cancelled {
                    frames_processed: self.frames_processed,
                });
            }

            let Some(frame) = source.next_frame()? else {
                break;
            };
            self.process_frame(&frame);

            if self.progress_log_interval > 0
                && self.frames_processed % self.progress_log_interval == 0
            {
                info!(
                    "Progress: {} frames ({:.1}s of video), {} events, {:.0} fps",
                    self.frames_processed,
                    self.duration_secs(),
                    self.log.len(),
                    self.metrics.fps()
                );
            }
        }

        info!(
            "✅ Finished {}: {} frames, {} events, {} players",
            source.describe(),
            self.frames_processed,
            self.log.len(),
            self.ledger.len()
        );
        Ok(())
    }

    /// Video time covered so far
    pub fn duration_secs(&self) -> f64 {
        self.frames_processed as f64 / self.frame_rate
    }

    /// Consumes the session into its final report
    pub fn finish(self, source: impl Into<String>) -> GameReport {
        GameReport {
            session_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            source: source.into(),
            frame_rate: self.frame_rate,
            window_size: self.window_size,
            frames_processed: self.frames_processed,
            duration_secs: self.duration_secs(),
            team_totals: self.ledger.team_totals(self.teams.as_ref()),
            stats: self.ledger.snapshot(),
            metrics: self.metrics.summary(),
            events: self.log.into_events(),
        }
    }
}
