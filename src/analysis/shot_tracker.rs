// src/analysis/shot_tracker.rs
//
// Shot attempt lifecycle:
//
//   Idle ──ball near/inside rim──▶ InProgress ──ball inside rim──▶ Made ─▶ Latched
//                                      │
//                                      ├─ball leaves rim zone──▶ Missed ─▶ Idle
//                                      └─ball unseen > timeout─▶ Missed ─▶ Idle
//
// Latched holds until the ball is out of the rim zone so one make is not
// counted twice while the ball drops through the net.

use super::observation::{Observation, RimContact};
use super::possession::PossessionState;
use crate::geometry::distance;
use crate::types::{EventConfig, PlayerId, Point};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct ShotAttempt {
    pub shooter: Option<PlayerId>,
    /// Where the shooter was last seen holding the ball
    pub origin: Option<Point>,
    /// Fixed reference, or the rim centre seen when the attempt opened
    pub basket: Option<Point>,
    pub opened_at: f64,
    last_contact: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShotResolution {
    Made {
        shooter: Option<PlayerId>,
        points: u32,
    },
    Missed {
        shooter: Option<PlayerId>,
        three_point: bool,
    },
}

/// Result of one tracker step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShotStep {
    /// Set on the frame an attempt opens
    pub opened: Option<ShotAttempt>,
    pub resolved: Option<ShotResolution>,
}

#[derive(Debug, Clone, PartialEq)]
enum ShotState {
    Idle,
    InProgress(ShotAttempt),
    Latched,
}

pub struct ShotTracker {
    state: ShotState,
    resolution_timeout: f64,
    three_point_distance: f32,
    basket_reference: Option<Point>,
}

impl ShotTracker {
    pub fn new(config: &EventConfig) -> Self {
        Self {
            state: ShotState::Idle,
            resolution_timeout: config.shot_resolution_timeout_secs,
            three_point_distance: config.three_point_distance,
            basket_reference: config.basket_reference,
        }
    }

    /// True while an attempt is open or a make has not cleared the rim.
    /// Possession is not assigned during that time.
    pub fn is_active(&self) -> bool {
        self.state != ShotState::Idle
    }

    pub fn update(&mut self, obs: &Observation, now: f64, possession: &PossessionState) -> ShotStep {
        let mut step = ShotStep::default();
        let ball_visible = obs.ball.is_some();

        match &mut self.state {
            ShotState::Idle => {
                if !(ball_visible && obs.rim_contact.in_zone()) {
                    return step;
                }
                let attempt = ShotAttempt {
                    shooter: possession.current_holder().or(possession.last_holder()),
                    origin: possession.last_known_position(),
                    basket: self.basket_reference.or(obs.rim_center),
                    opened_at: now,
                    last_contact: now,
                };
                info!("🏀 Shot attempt by {:?} at {:.2}s", attempt.shooter, now);
                step.opened = Some(attempt.clone());

                if obs.rim_contact == RimContact::Inside {
                    step.resolved = Some(self.made(&attempt, now));
                    self.state = ShotState::Latched;
                } else {
                    self.state = ShotState::InProgress(attempt);
                }
            }

            ShotState::InProgress(attempt) => {
                if ball_visible {
                    match obs.rim_contact {
                        RimContact::Near => attempt.last_contact = now,
                        RimContact::Inside => {
                            let attempt = attempt.clone();
                            step.resolved = Some(self.made(&attempt, now));
                            self.state = ShotState::Latched;
                        }
                        RimContact::Away => {
                            let attempt = attempt.clone();
                            step.resolved = Some(self.missed(&attempt, now, "ball left the rim"));
                            self.state = ShotState::Idle;
                        }
                    }
                } else if now - attempt.last_contact > self.resolution_timeout {
                    let attempt = attempt.clone();
                    step.resolved = Some(self.missed(&attempt, now, "ball lost from view"));
                    self.state = ShotState::Idle;
                }
            }

            ShotState::Latched => {
                if !(ball_visible && obs.rim_contact.in_zone()) {
                    debug!("Ball cleared the rim at {:.2}s", now);
                    self.state = ShotState::Idle;
                }
            }
        }

        step
    }

    fn is_three(&self, attempt: &ShotAttempt) -> bool {
        match (attempt.origin, attempt.basket) {
            (Some(origin), Some(basket)) => distance(origin, basket) > self.three_point_distance,
            _ => false,
        }
    }

    fn made(&self, attempt: &ShotAttempt, now: f64) -> ShotResolution {
        let points = if self.is_three(attempt) { 3 } else { 2 };
        info!(
            "✅ Shot made by {:?} at {:.2}s ({} pts)",
            attempt.shooter, now, points
        );
        ShotResolution::Made {
            shooter: attempt.shooter,
            points,
        }
    }

    fn missed(&self, attempt: &ShotAttempt, now: f64, reason: &str) -> ShotResolution {
        info!(
            "❌ Shot missed by {:?} at {:.2}s ({})",
            attempt.shooter, now, reason
        );
        ShotResolution::Missed {
            shooter: attempt.shooter,
            three_point: self.is_three(attempt),
        }
    }
}
