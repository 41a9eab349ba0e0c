// src/types.rs

use serde::{Deserialize, Serialize};

/// Identity assigned to a player box by the upstream classifier.
pub type PlayerId = u32;

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub detection: DetectionConfig,
    pub proximity: ProximityConfig,
    pub possession: PossessionConfig,
    pub events: EventConfig,
    pub teams: TeamsConfig,
    pub video: VideoConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Detections below this confidence are discarded by the adapter
    pub min_confidence: f32,
    /// Which ball to use when the detector reports more than one
    pub ball_selection: BallSelection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BallSelection {
    /// First ball in detection order
    First,
    HighestConfidence,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    /// Centre-distance (px) under which two boxes count as "near"
    pub near_threshold: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PossessionConfig {
    /// Max ball-centre to player-centre distance (px) for a possession match
    pub match_radius: f32,
    /// Minimum hold time before a change of holder is committed
    pub change_threshold_secs: f64,
    /// Holder is cleared after this long without any possessor detected
    pub no_possession_timeout_secs: f64,
    /// Previous holder is forgotten after this long
    pub prev_possession_lifetime_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// One dribble event per this much uninterrupted possession
    pub dribble_interval_secs: f64,
    /// A recovery this soon after a miss is a rebound
    pub rebound_window_secs: f64,
    /// Ball lost from view this long during an attempt resolves a miss
    pub shot_resolution_timeout_secs: f64,
    /// Shooter-to-basket distance (px) above which a make is worth three
    pub three_point_distance: f32,
    /// Fixed basket position; `None` uses the centre of the rim box
    pub basket_reference: Option<Point>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamsConfig {
    pub mode: TeamMode,
    pub home: Vec<PlayerId>,
    pub away: Vec<PlayerId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamMode {
    /// Even ids play for home, odd ids for away
    Parity,
    Roster,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub input_dir: String,
    pub output_dir: String,
    /// Used when the detection log does not carry its own rate
    pub frame_rate: f64,
    /// Frames per aggregated state; 1 = per-frame resolution
    pub window_size: usize,
    pub progress_log_interval: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

// ============================================================================
// GEOMETRY PRIMITIVES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box in frame pixel coordinates.
///
/// Always satisfies `x_min <= x_max` and `y_min <= y_max`; constructors
/// swap inverted corners rather than rejecting them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x_min: x1.min(x2),
            y_min: y1.min(y2),
            x_max: x1.max(x2),
            y_max: y1.max(y2),
        }
    }

    /// `[x1, y1, x2, y2]`, the detector's wire layout
    pub fn from_corners(corners: [f32; 4]) -> Self {
        Self::new(corners[0], corners[1], corners[2], corners[3])
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.x_min + self.x_max) * 0.5,
            (self.y_min + self.y_max) * 0.5,
        )
    }

    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    pub fn is_finite(&self) -> bool {
        self.x_min.is_finite()
            && self.y_min.is_finite()
            && self.x_max.is_finite()
            && self.y_max.is_finite()
    }
}

// ============================================================================
// DETECTIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Ball,
    Rim,
    Player,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ball => "ball",
            Self::Rim => "rim",
            Self::Player => "player",
        }
    }

    /// Maps detector class names, including the legacy aliases, to a type.
    /// Unknown classes return `None` and are ignored downstream.
    pub fn from_class_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "ball" | "basketball" => Some(Self::Ball),
            "rim" | "rink" | "hoop" => Some(Self::Rim),
            "player" | "person" | "user_id" => Some(Self::Player),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub object_type: ObjectType,
    pub bbox: BoundingBox,
    pub confidence: f32,
    /// Only meaningful for players; not stable across frames
    pub player_id: Option<PlayerId>,
}

impl Detection {
    pub fn new(object_type: ObjectType, bbox: BoundingBox, confidence: f32) -> Self {
        Self {
            object_type,
            bbox,
            confidence,
            player_id: None,
        }
    }

    pub fn player(bbox: BoundingBox, confidence: f32, player_id: PlayerId) -> Self {
        Self {
            object_type: ObjectType::Player,
            bbox,
            confidence,
            player_id: Some(player_id),
        }
    }
}

/// Every classified box seen in one frame. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameState {
    pub balls: Vec<Detection>,
    pub rims: Vec<Detection>,
    pub players: Vec<Detection>,
}

impl FrameState {
    pub fn is_empty(&self) -> bool {
        self.balls.is_empty() && self.rims.is_empty() && self.players.is_empty()
    }

    pub fn detection_count(&self) -> usize {
        self.balls.len() + self.rims.len() + self.players.len()
    }
}
