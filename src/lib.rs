//! Possession tracking and game-event inference for basketball video.
//!
//! Per-frame detections (ball, rim, players) go in; an ordered log of game
//! events (passes, shots, steals, turnovers, rebounds, dribbles) and running
//! per-player stats come out. Frame decoding and object detection are
//! upstream collaborators behind [`detection::FrameSource`].
//!
//! ```no_run
//! use courtside_events::{Config, DetectionAdapter, DetectionLog, GameSession};
//! use std::sync::atomic::AtomicBool;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let mut log = DetectionLog::open(
//!     "input/game.jsonl".as_ref(),
//!     DetectionAdapter::new(&config.detection),
//! )?;
//! let mut session = GameSession::new(&config);
//! session.run(&mut log, &AtomicBool::new(false))?;
//! let report = session.finish("game");
//! println!("{} events", report.events.len());
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod config;
pub mod detection;
pub mod error;
pub mod events;
pub mod geometry;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod types;

pub use analysis::{ParityTeams, RosterTeams, Team, TeamLookup};
pub use detection::{find_detection_files, DetectionAdapter, DetectionLog, FrameSource, InMemorySource};
pub use error::AnalysisError;
pub use events::{EventDetails, EventType, GameEvent, ReboundType, ShotResult};
pub use pipeline::GameSession;
pub use report::GameReport;
pub use stats::{PlayerStats, StatsLedger, TeamTotals};
pub use types::{BoundingBox, Config, Detection, FrameState, ObjectType, PlayerId, Point};
