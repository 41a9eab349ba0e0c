// src/events.rs
//
// The game event record. Events are created once by the state machine,
// appended to the session log, and never mutated afterwards.

use crate::types::PlayerId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Pass,
    Shot,
    Turnover,
    Steal,
    Dribble,
    Rebound,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Shot => "shot",
            Self::Turnover => "turnover",
            Self::Steal => "steal",
            Self::Dribble => "dribble",
            Self::Rebound => "rebound",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotResult {
    Made,
    Miss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReboundType {
    Offensive,
    Defensive,
}

impl ReboundType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Offensive => "offensive",
            Self::Defensive => "defensive",
        }
    }
}

/// Event payload. Field names are the serialized keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventDetails {
    Pass {
        from: PlayerId,
        to: PlayerId,
    },
    /// `points` is 0 for a miss
    Shot {
        shooter: Option<PlayerId>,
        result: ShotResult,
        points: u32,
        three_point: bool,
    },
    Rebound {
        player: PlayerId,
        #[serde(rename = "type")]
        rebound_type: ReboundType,
    },
    Steal {
        gained_by: PlayerId,
    },
    Turnover {
        lost_by: PlayerId,
    },
    Dribble {
        player: PlayerId,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub event_type: EventType,
    /// Video time in seconds
    pub time: f64,
    pub details: EventDetails,
}

impl GameEvent {
    pub fn pass(time: f64, from: PlayerId, to: PlayerId) -> Self {
        Self {
            event_type: EventType::Pass,
            time,
            details: EventDetails::Pass { from, to },
        }
    }

    pub fn shot_made(time: f64, shooter: Option<PlayerId>, points: u32) -> Self {
        Self {
            event_type: EventType::Shot,
            time,
            details: EventDetails::Shot {
                shooter,
                result: ShotResult::Made,
                points,
                three_point: points == 3,
            },
        }
    }

    pub fn shot_missed(time: f64, shooter: Option<PlayerId>, three_point: bool) -> Self {
        Self {
            event_type: EventType::Shot,
            time,
            details: EventDetails::Shot {
                shooter,
                result: ShotResult::Miss,
                points: 0,
                three_point,
            },
        }
    }

    pub fn rebound(time: f64, player: PlayerId, rebound_type: ReboundType) -> Self {
        Self {
            event_type: EventType::Rebound,
            time,
            details: EventDetails::Rebound {
                player,
                rebound_type,
            },
        }
    }

    pub fn steal(time: f64, gained_by: PlayerId) -> Self {
        Self {
            event_type: EventType::Steal,
            time,
            details: EventDetails::Steal { gained_by },
        }
    }

    pub fn turnover(time: f64, lost_by: PlayerId) -> Self {
        Self {
            event_type: EventType::Turnover,
            time,
            details: EventDetails::Turnover { lost_by },
        }
    }

    pub fn dribble(time: f64, player: PlayerId) -> Self {
        Self {
            event_type: EventType::Dribble,
            time,
            details: EventDetails::Dribble { player },
        }
    }
}

/// One line of play-by-play narration
impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:>7.2}s] ", self.time)?;
        match &self.details {
            EventDetails::Pass { from, to } => {
                write!(f, "Player {} passes to player {}", from, to)
            }
            EventDetails::Shot {
                shooter,
                result,
                points,
                three_point,
            } => {
                let who = match shooter {
                    Some(id) => format!("Player {}", id),
                    None => "Unknown shooter".to_string(),
                };
                let range = if *three_point { "three" } else { "two" };
                match result {
                    ShotResult::Made => write!(f, "{} scores a {} for {} points", who, range, points),
                    ShotResult::Miss => write!(f, "{} misses a {}", who, range),
                }
            }
            EventDetails::Rebound {
                player,
                rebound_type,
            } => write!(
                f,
                "Player {} grabs the {} rebound",
                player,
                rebound_type.as_str()
            ),
            EventDetails::Steal { gained_by } => write!(f, "Player {} steals the ball", gained_by),
            EventDetails::Turnover { lost_by } => write!(f, "Player {} turns it over", lost_by),
            EventDetails::Dribble { player } => write!(f, "Player {} dribbles", player),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape() {
        let pass = serde_json::to_value(GameEvent::pass(1.5, 2, 4)).unwrap();
        assert_eq!(pass["event_type"], "pass");
        assert_eq!(pass["details"]["from"], 2);
        assert_eq!(pass["details"]["to"], 4);

        let rebound = serde_json::to_value(GameEvent::rebound(3.0, 7, ReboundType::Offensive)).unwrap();
        assert_eq!(rebound["details"]["type"], "offensive");

        let miss = serde_json::to_value(GameEvent::shot_missed(2.0, None, false)).unwrap();
        assert_eq!(miss["details"]["result"], "miss");
        assert!(miss["details"]["shooter"].is_null());
    }

    #[test]
    fn test_details_deserialize_to_matching_variant() {
        let events = vec![
            GameEvent::pass(0.1, 1, 3),
            GameEvent::shot_made(0.2, Some(3), 3),
            GameEvent::rebound(0.3, 2, ReboundType::Defensive),
            GameEvent::steal(0.4, 5),
            GameEvent::turnover(0.4, 6),
            GameEvent::dribble(0.5, 5),
        ];
        let json = serde_json::to_string(&events).unwrap();
        let back: Vec<GameEvent> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, events);
    }

    #[test]
    fn test_three_point_flag_follows_points() {
        match GameEvent::shot_made(1.0, Some(1), 3).details {
            EventDetails::Shot { three_point, .. } => assert!(three_point),
            other => panic!("unexpected details {:?}", other),
        }
    }

    #[test]
    fn test_narration() {
        assert_eq!(
            GameEvent::pass(5.25, 2, 4).to_string(),
            "[   5.25s] Player 2 passes to player 4"
        );
        assert_eq!(
            GameEvent::shot_made(10.0, Some(8), 2).to_string(),
            "[  10.00s] Player 8 scores a two for 2 points"
        );
    }
}
