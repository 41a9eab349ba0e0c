// src/analysis/event_machine.rs
//
// Turns possession transitions and shot resolutions into game events.
//
// Possession transitions (previous holder → current holder):
//
//   A → B, teammates        pass { from: A, to: B }
//   A → B, opponents        steal { gained_by: B } + turnover { lost_by: A }
//   A → none (timeout)      turnover { lost_by: A }
//   none → B, after a miss  rebound { player: B, type }
//   none → B, after a make  nothing (inbound)
//   none → B, otherwise     steal { gained_by: B }
//   A → A                   dribble { player: A } once per dribble interval
//
// A shot release clears the tracked holder without emitting anything, so
// the ball leaving the shooter's hands is never read as a turnover.

use super::observation::Observation;
use super::possession::{PossessionResolver, PossessionSnapshot, PossessionState};
use super::shot_tracker::{ShotResolution, ShotTracker};
use super::teams::TeamLookup;
use crate::events::{GameEvent, ReboundType};
use crate::types::{EventConfig, PlayerId};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq)]
struct MissedShot {
    shooter: Option<PlayerId>,
    missed_at: f64,
}

pub struct EventStateMachine {
    teams: Arc<dyn TeamLookup>,
    shots: ShotTracker,
    dribble_interval: f64,
    rebound_window: f64,
    last_holder: Option<PlayerId>,
    dribble_anchor: f64,
    pending_rebound: Option<MissedShot>,
    /// Next acquisition from "no holder" is uncontested (tip-off, inbound)
    uncontested_gain: bool,
}

impl EventStateMachine {
    pub fn new(config: &EventConfig, teams: Arc<dyn TeamLookup>) -> Self {
        Self {
            teams,
            shots: ShotTracker::new(config),
            dribble_interval: config.dribble_interval_secs,
            rebound_window: config.rebound_window_secs,
            last_holder: None,
            dribble_anchor: 0.0,
            pending_rebound: None,
            uncontested_gain: true,
        }
    }

    pub fn last_holder(&self) -> Option<PlayerId> {
        self.last_holder
    }

    /// A miss is waiting to be rebounded
    pub fn shot_attempted(&self) -> bool {
        self.pending_rebound.is_some()
    }

    /// Ball is at the rim; possession candidates are ignored
    pub fn ball_at_rim(&self) -> bool {
        self.shots.is_active()
    }

    /// Shot phase. Runs before the resolver sees the frame.
    pub fn track_shot(
        &mut self,
        obs: &Observation,
        now: f64,
        resolver: &PossessionResolver,
        possession: &mut PossessionState,
    ) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let step = self.shots.update(obs, now, possession);

        if step.opened.is_some() {
            resolver.release(possession, now);
            self.last_holder = None;
            self.pending_rebound = None;
        }

        match step.resolved {
            Some(ShotResolution::Made { shooter, points }) => {
                events.push(GameEvent::shot_made(now, shooter, points));
                resolver.clear_after_make(possession);
                self.uncontested_gain = true;
            }
            Some(ShotResolution::Missed {
                shooter,
                three_point,
            }) => {
                events.push(GameEvent::shot_missed(now, shooter, three_point));
                self.pending_rebound = Some(MissedShot {
                    shooter,
                    missed_at: now,
                });
            }
            None => {}
        }

        events
    }

    /// Possession phase. Runs after the resolver has committed this frame.
    pub fn track_possession(&mut self, snapshot: &PossessionSnapshot, now: f64) -> Vec<GameEvent> {
        let mut events = Vec::new();

        if let Some(miss) = self.pending_rebound {
            if now - miss.missed_at > self.rebound_window {
                debug!("Rebound window closed at {:.2}s", now);
                self.pending_rebound = None;
            }
        }

        match (self.last_holder, snapshot.current) {
            (Some(from), Some(to)) if from != to => {
                if self.teams.are_teammates(from, to) {
                    events.push(GameEvent::pass(now, from, to));
                } else {
                    events.push(GameEvent::steal(now, to));
                    events.push(GameEvent::turnover(now, from));
                }
                self.dribble_anchor = now;
            }
            (Some(holder), Some(_)) => {
                if now - self.dribble_anchor >= self.dribble_interval {
                    events.push(GameEvent::dribble(now, holder));
                    self.dribble_anchor = now;
                }
            }
            (Some(from), None) => {
                events.push(GameEvent::turnover(now, from));
            }
            (None, Some(to)) => {
                if let Some(miss) = self.pending_rebound.take() {
                    let offensive = miss
                        .shooter
                        .map_or(false, |shooter| self.teams.are_teammates(shooter, to));
                    let rebound_type = if offensive {
                        ReboundType::Offensive
                    } else {
                        ReboundType::Defensive
                    };
                    events.push(GameEvent::rebound(now, to, rebound_type));
                } else if self.uncontested_gain {
                    info!("Player {} takes uncontested possession at {:.2}s", to, now);
                } else {
                    events.push(GameEvent::steal(now, to));
                }
                self.uncontested_gain = false;
                self.dribble_anchor = now;
            }
            (None, None) => {}
        }

        self.last_holder = snapshot.current;
        events
    }
}
