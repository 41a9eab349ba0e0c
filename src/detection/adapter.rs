// src/detection/adapter.rs
//
// Normalizes raw detector output into a FrameState.
//
// Two record shapes are accepted:
//   keyed: {"ball": [...], "rim": [...], "player": [...]}
//          ("rink" and "user_id" are accepted as legacy keys)
//   flat:  {"detections": [{"class": "ball", "bounding_box": [...], ...}]}
//
// Nothing in here fails once the record is valid JSON. Each box is parsed
// on its own: a box that does not parse, has the wrong arity or carries
// non-finite coordinates is dropped with a warning, unknown classes are
// ignored, and a frame with nothing usable is simply an empty FrameState.

use crate::types::{BoundingBox, Detection, DetectionConfig, FrameState, ObjectType, PlayerId};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, warn};

// ============================================================================
// WIRE TYPES
// ============================================================================

/// One box as emitted by the detector
#[derive(Debug, Clone, Deserialize)]
pub struct RawBox {
    #[serde(alias = "bbox", alias = "box")]
    pub bounding_box: Vec<f32>,
    #[serde(default)]
    pub confidence: Option<f32>,
    /// Integer or numeric string; anything else leaves the player anonymous
    #[serde(default, alias = "user_id", alias = "id")]
    pub player_id: Option<Value>,
    #[serde(default, rename = "class", alias = "object_type", alias = "label")]
    pub class: Option<String>,
}

impl RawBox {
    fn player_id(&self) -> Option<i64> {
        match self.player_id.as_ref()? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Accepts an array, a single object or null. Entries stay untyped until
/// the adapter parses them one by one.
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeyedFrame {
    #[serde(default, alias = "balls", deserialize_with = "lenient_list")]
    pub ball: Vec<Value>,
    #[serde(default, alias = "rink", alias = "rims", deserialize_with = "lenient_list")]
    pub rim: Vec<Value>,
    #[serde(
        default,
        alias = "user_id",
        alias = "players",
        deserialize_with = "lenient_list"
    )]
    pub player: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawFrame {
    Flat {
        #[serde(deserialize_with = "lenient_list")]
        detections: Vec<Value>,
    },
    Keyed(KeyedFrame),
    /// Valid JSON that is not a frame object
    Unrecognized(Value),
}

impl Default for RawFrame {
    fn default() -> Self {
        RawFrame::Keyed(KeyedFrame::default())
    }
}

// ============================================================================
// ADAPTER
// ============================================================================

#[derive(Debug, Clone)]
pub struct DetectionAdapter {
    min_confidence: f32,
}

impl DetectionAdapter {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            min_confidence: config.min_confidence,
        }
    }

    pub fn adapt(&self, raw: &RawFrame) -> FrameState {
        let mut frame = FrameState::default();

        match raw {
            RawFrame::Keyed(keyed) => {
                for b in &keyed.ball {
                    self.push(&mut frame, Some(ObjectType::Ball), b);
                }
                for r in &keyed.rim {
                    self.push(&mut frame, Some(ObjectType::Rim), r);
                }
                for p in &keyed.player {
                    self.push(&mut frame, Some(ObjectType::Player), p);
                }
            }
            RawFrame::Flat { detections } => {
                for det in detections {
                    self.push(&mut frame, None, det);
                }
            }
            RawFrame::Unrecognized(value) => {
                warn!("Treating non-object frame record as empty: {}", value);
            }
        }

        frame
    }

    /// Parses one entry. `object_type` comes from the record key, or from
    /// the entry's own class in flat records.
    fn push(&self, frame: &mut FrameState, object_type: Option<ObjectType>, entry: &Value) {
        let raw = match RawBox::deserialize(entry) {
            Ok(raw) => raw,
            Err(e) => {
                let kind = object_type.map_or("unclassified", |t| t.as_str());
                warn!("Dropping malformed {} detection: {}", kind, e);
                return;
            }
        };
        let object_type = match object_type {
            Some(t) => t,
            None => match raw.class.as_deref().and_then(ObjectType::from_class_name) {
                Some(t) => t,
                None => {
                    debug!("Ignoring detection with class {:?}", raw.class);
                    return;
                }
            },
        };
        let Some(det) = self.convert(object_type, &raw) else {
            return;
        };
        match object_type {
            ObjectType::Ball => frame.balls.push(det),
            ObjectType::Rim => frame.rims.push(det),
            ObjectType::Player => frame.players.push(det),
        }
    }

    fn convert(&self, object_type: ObjectType, raw: &RawBox) -> Option<Detection> {
        let corners: [f32; 4] = match raw.bounding_box.as_slice().try_into() {
            Ok(c) => c,
            Err(_) => {
                warn!(
                    "Dropping {} box with {} coordinates",
                    object_type.as_str(),
                    raw.bounding_box.len()
                );
                return None;
            }
        };

        let bbox = BoundingBox::from_corners(corners);
        if !bbox.is_finite() {
            warn!("Dropping {} box with non-finite coordinates", object_type.as_str());
            return None;
        }

        let confidence = match raw.confidence {
            Some(c) if c.is_finite() => c.clamp(0.0, 1.0),
            Some(_) => 0.0,
            None => 1.0,
        };
        if confidence < self.min_confidence {
            debug!(
                "Dropping {} box below confidence floor ({:.2} < {:.2})",
                object_type.as_str(),
                confidence,
                self.min_confidence
            );
            return None;
        }

        let player_id = match (object_type, raw.player_id()) {
            (ObjectType::Player, Some(id)) => match PlayerId::try_from(id) {
                Ok(id) => Some(id),
                Err(_) => {
                    warn!("Ignoring out-of-range player id {}", id);
                    None
                }
            },
            (ObjectType::Player, None) if raw.player_id.is_some() => {
                warn!("Ignoring unreadable player id {:?}", raw.player_id);
                None
            }
            _ => None,
        };

        Some(Detection {
            object_type,
            bbox,
            confidence,
            player_id,
        })
    }
}
