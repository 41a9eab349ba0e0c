// src/config.rs

use crate::analysis::possession::{
    NO_POSSESSION_TIMEOUT, POSSESSION_CHANGE_THRESHOLD, POSSESSION_MATCH_RADIUS,
    PREV_POSSESSION_LIFETIME,
};
use crate::error::AnalysisError;
use crate::types::{
    BallSelection, Config, DetectionConfig, EventConfig, LoggingConfig, PossessionConfig,
    ProximityConfig, TeamMode, TeamsConfig, VideoConfig,
};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        let invalid = |msg: String| Err(AnalysisError::InvalidConfig(msg));

        if !(self.video.frame_rate.is_finite() && self.video.frame_rate > 0.0) {
            return invalid(format!(
                "video.frame_rate must be positive, got {}",
                self.video.frame_rate
            ));
        }
        if self.video.window_size == 0 {
            return invalid("video.window_size must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.detection.min_confidence) {
            return invalid(format!(
                "detection.min_confidence must be in [0, 1], got {}",
                self.detection.min_confidence
            ));
        }

        let distances = [
            ("proximity.near_threshold", self.proximity.near_threshold),
            ("possession.match_radius", self.possession.match_radius),
            ("events.three_point_distance", self.events.three_point_distance),
        ];
        for (name, value) in distances {
            if !(value.is_finite() && value >= 0.0) {
                return invalid(format!("{} must be non-negative, got {}", name, value));
            }
        }

        let durations = [
            (
                "possession.change_threshold_secs",
                self.possession.change_threshold_secs,
            ),
            (
                "possession.no_possession_timeout_secs",
                self.possession.no_possession_timeout_secs,
            ),
            (
                "possession.prev_possession_lifetime_secs",
                self.possession.prev_possession_lifetime_secs,
            ),
            ("events.dribble_interval_secs", self.events.dribble_interval_secs),
            ("events.rebound_window_secs", self.events.rebound_window_secs),
            (
                "events.shot_resolution_timeout_secs",
                self.events.shot_resolution_timeout_secs,
            ),
        ];
        for (name, value) in durations {
            if !(value.is_finite() && value >= 0.0) {
                return invalid(format!("{} must be non-negative, got {}", name, value));
            }
        }

        if self.teams.mode == TeamMode::Roster
            && self.teams.home.is_empty()
            && self.teams.away.is_empty()
        {
            return invalid("teams.mode is roster but no players are listed".to_string());
        }

        Ok(())
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.1,
            ball_selection: BallSelection::First,
        }
    }
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            near_threshold: 50.0,
        }
    }
}

impl Default for PossessionConfig {
    fn default() -> Self {
        Self {
            match_radius: POSSESSION_MATCH_RADIUS,
            change_threshold_secs: POSSESSION_CHANGE_THRESHOLD,
            no_possession_timeout_secs: NO_POSSESSION_TIMEOUT,
            prev_possession_lifetime_secs: PREV_POSSESSION_LIFETIME,
        }
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            dribble_interval_secs: 1.0,
            rebound_window_secs: 3.0,
            shot_resolution_timeout_secs: 1.0,
            three_point_distance: 200.0,
            basket_reference: None,
        }
    }
}

impl Default for TeamsConfig {
    fn default() -> Self {
        Self {
            mode: TeamMode::Parity,
            home: Vec::new(),
            away: Vec::new(),
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            input_dir: "input".to_string(),
            output_dir: "output".to_string(),
            frame_rate: 30.0,
            window_size: 1,
            progress_log_interval: 300,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "courtside_events=info".to_string(),
        }
    }
}
