// src/analysis/observation.rs
//
// Reduces one FrameState to the few facts the event logic needs: where the
// ball is, who is closest to it, and whether it is at the rim.

use super::possession::{find_possessor, PossessionCandidate};
use crate::geometry::{contains_point, is_near};
use crate::types::{BallSelection, BoundingBox, Config, Detection, FrameState, Point};
use serde::Serialize;

/// How close the ball is to a rim. Ordered weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RimContact {
    Away,
    /// Centres within the proximity threshold
    Near,
    /// Ball centre inside the rim box
    Inside,
}

impl RimContact {
    /// Near or inside: a shot is in the air or at the basket
    pub fn in_zone(&self) -> bool {
        *self != RimContact::Away
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub ball: Option<BoundingBox>,
    pub candidate: Option<PossessionCandidate>,
    pub rim_contact: RimContact,
    /// Centre of the rim the contact refers to
    pub rim_center: Option<Point>,
}

impl Observation {
    pub fn empty() -> Self {
        Self {
            ball: None,
            candidate: None,
            rim_contact: RimContact::Away,
            rim_center: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Observer {
    ball_selection: BallSelection,
    match_radius: f32,
    near_threshold: f32,
}

impl Observer {
    pub fn new(config: &Config) -> Self {
        Self {
            ball_selection: config.detection.ball_selection,
            match_radius: config.possession.match_radius,
            near_threshold: config.proximity.near_threshold,
        }
    }

    pub fn observe(&self, frame: &FrameState) -> Observation {
        let Some(ball) = self.select_ball(&frame.balls) else {
            return Observation::empty();
        };
        let ball = ball.bbox;

        let candidate = find_possessor(&ball, frame, self.match_radius);

        let ball_center = ball.center();
        let mut rim_contact = RimContact::Away;
        let mut rim_center = None;
        for rim in &frame.rims {
            let contact = if contains_point(&rim.bbox, ball_center) {
                RimContact::Inside
            } else if is_near(&ball, &rim.bbox, self.near_threshold) {
                RimContact::Near
            } else {
                RimContact::Away
            };
            if contact > rim_contact {
                rim_contact = contact;
                rim_center = Some(rim.bbox.center());
            }
        }

        Observation {
            ball: Some(ball),
            candidate,
            rim_contact,
            rim_center,
        }
    }

    fn select_ball<'a>(&self, balls: &'a [Detection]) -> Option<&'a Detection> {
        match self.ball_selection {
            BallSelection::First => balls.first(),
            BallSelection::HighestConfidence => balls.iter().fold(None, |best, b| match best {
                Some(best) if best.confidence >= b.confidence => Some(best),
                _ => Some(b),
            }),
        }
    }
}
