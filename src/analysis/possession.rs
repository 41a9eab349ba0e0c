// src/analysis/possession.rs
//
// Decides, frame by frame, which player holds the ball.
//
// Raw matching is nearest player centre to ball centre inside a radius.
// On top of that the resolver debounces detector jitter:
//   - a new holder is committed only after the challenger has been the
//     candidate for POSSESSION_CHANGE_THRESHOLD and the current holder has
//     held for at least as long
//   - while a challenge is pending only the "last seen" timestamp moves
//   - no possessor for NO_POSSESSION_TIMEOUT clears the holder
//   - the previous holder is forgotten after PREV_POSSESSION_LIFETIME
//   - the last committed holder survives timeouts and releases and is
//     only forgotten after a made basket
//
// All times are video time (frame_index / frame_rate), never wall clock.

use crate::geometry::distance;
use crate::types::{BoundingBox, FrameState, Point, PossessionConfig, PlayerId};
use serde::Serialize;
use tracing::{debug, info};

pub const POSSESSION_MATCH_RADIUS: f32 = 100.0;
pub const POSSESSION_CHANGE_THRESHOLD: f64 = 0.5;
pub const NO_POSSESSION_TIMEOUT: f64 = 2.0;
pub const PREV_POSSESSION_LIFETIME: f64 = 4.0;

/// Absorbs float error in frame_index / frame_rate arithmetic
const TIME_EPSILON: f64 = 1e-6;

// ============================================================================
// CANDIDATE MATCHING
// ============================================================================

/// Closest identified player to the ball in a single frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PossessionCandidate {
    pub player_id: PlayerId,
    /// Ball centre to player centre, px
    pub distance: f32,
    /// Player box centre
    pub position: Point,
}

/// Nearest identified player within `match_radius` of the ball.
///
/// Players without an id cannot be credited and are skipped. Ties keep the
/// earlier detection.
pub fn find_possessor(
    ball: &BoundingBox,
    frame: &FrameState,
    match_radius: f32,
) -> Option<PossessionCandidate> {
    let ball_center = ball.center();
    let mut best: Option<PossessionCandidate> = None;

    for player in &frame.players {
        let Some(player_id) = player.player_id else {
            continue;
        };
        let position = player.bbox.center();
        let d = distance(ball_center, position);
        if best.map_or(true, |b| d < b.distance) {
            best = Some(PossessionCandidate {
                player_id,
                distance: d,
                position,
            });
        }
    }

    best.filter(|b| b.distance < match_radius)
}

// ============================================================================
// STATE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
struct Challenger {
    player_id: PlayerId,
    since: f64,
}

/// Possession bookkeeping for one session. Only `PossessionResolver`
/// mutates it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PossessionState {
    current_holder: Option<PlayerId>,
    previous_holder: Option<PlayerId>,
    previous_holder_timestamp: Option<f64>,
    last_holder: Option<PlayerId>,
    last_known_position: Option<Point>,
    holder_since: f64,
    last_seen: Option<f64>,
    challenger: Option<Challenger>,
}

impl PossessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_holder(&self) -> Option<PlayerId> {
        self.current_holder
    }

    pub fn previous_holder(&self) -> Option<PlayerId> {
        self.previous_holder
    }

    pub fn previous_holder_timestamp(&self) -> Option<f64> {
        self.previous_holder_timestamp
    }

    /// Most recent committed holder, kept after a timeout clears
    /// `current_holder`
    pub fn last_holder(&self) -> Option<PlayerId> {
        self.last_holder
    }

    /// Position of the most recent possessor, used as the shot origin
    pub fn last_known_position(&self) -> Option<Point> {
        self.last_known_position
    }

    pub fn pending_challenger(&self) -> Option<PlayerId> {
        self.challenger.map(|c| c.player_id)
    }

    pub fn snapshot(&self) -> PossessionSnapshot {
        PossessionSnapshot {
            current: self.current_holder,
            previous: self.previous_holder,
        }
    }
}

/// What the event machine sees after each resolver step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PossessionSnapshot {
    pub current: Option<PlayerId>,
    pub previous: Option<PlayerId>,
}

// ============================================================================
// RESOLVER
// ============================================================================

#[derive(Debug, Clone)]
pub struct PossessionResolver {
    config: PossessionConfig,
}

impl PossessionResolver {
    pub fn new(config: PossessionConfig) -> Self {
        Self { config }
    }

    pub fn update(
        &self,
        state: &mut PossessionState,
        candidate: Option<&PossessionCandidate>,
        now: f64,
    ) -> PossessionSnapshot {
        self.expire_previous(state, now);

        match candidate {
            Some(candidate) => self.observe(state, candidate, now),
            None => self.observe_absence(state, now),
        }

        state.snapshot()
    }

    /// Ball left the holder's hands for a shot. Not a turnover.
    pub fn release(&self, state: &mut PossessionState, now: f64) -> Option<PlayerId> {
        let released = state.current_holder.take();
        if let Some(holder) = released {
            state.previous_holder = Some(holder);
            state.previous_holder_timestamp = Some(now);
            debug!("Player {} released the ball at {:.2}s", holder, now);
        }
        state.challenger = None;
        released
    }

    pub fn clear_previous(&self, state: &mut PossessionState) {
        state.previous_holder = None;
        state.previous_holder_timestamp = None;
    }

    /// Ball went through the hoop; nobody carries over into the inbound
    pub fn clear_after_make(&self, state: &mut PossessionState) {
        self.clear_previous(state);
        state.last_holder = None;
    }

    fn expire_previous(&self, state: &mut PossessionState, now: f64) {
        if let (Some(prev), Some(ts)) = (state.previous_holder, state.previous_holder_timestamp) {
            if now - ts > self.config.prev_possession_lifetime_secs {
                debug!("Previous holder {} expired after {:.1}s", prev, now - ts);
                self.clear_previous(state);
            }
        }
    }

    fn observe(&self, state: &mut PossessionState, candidate: &PossessionCandidate, now: f64) {
        state.last_seen = Some(now);

        if state.current_holder == Some(candidate.player_id) {
            state.challenger = None;
            state.last_known_position = Some(candidate.position);
            return;
        }

        let challenge_since = match state.challenger {
            Some(c) if c.player_id == candidate.player_id => c.since,
            _ => {
                state.challenger = Some(Challenger {
                    player_id: candidate.player_id,
                    since: now,
                });
                now
            }
        };

        let threshold = self.config.change_threshold_secs - TIME_EPSILON;
        let challenger_ready = now - challenge_since >= threshold;
        let holder_ready = match state.current_holder {
            Some(_) => now - state.holder_since >= threshold,
            None => true,
        };

        if challenger_ready && holder_ready {
            self.commit(state, candidate, now);
        } else {
            debug!(
                "Possession jitter: player {} challenging {:?} for {:.2}s",
                candidate.player_id,
                state.current_holder,
                now - challenge_since
            );
        }
    }

    fn commit(&self, state: &mut PossessionState, candidate: &PossessionCandidate, now: f64) {
        if let Some(holder) = state.current_holder {
            state.previous_holder = Some(holder);
            state.previous_holder_timestamp = Some(now);
        }
        info!(
            "🏀 Possession: {:?} → {} at {:.2}s",
            state.current_holder, candidate.player_id, now
        );
        state.current_holder = Some(candidate.player_id);
        state.last_holder = Some(candidate.player_id);
        state.holder_since = now;
        state.challenger = None;
        state.last_known_position = Some(candidate.position);
    }

    fn observe_absence(&self, state: &mut PossessionState, now: f64) {
        let Some(holder) = state.current_holder else {
            return;
        };
        let last_seen = state.last_seen.unwrap_or(state.holder_since);
        if now - last_seen > self.config.no_possession_timeout_secs {
            info!(
                "⏰ Possession timeout: player {} unseen for {:.1}s",
                holder,
                now - last_seen
            );
            state.current_holder = None;
            state.challenger = None;
        }
    }
}
