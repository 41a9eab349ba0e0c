// src/report.rs

use crate::analysis::teams::Team;
use crate::error::AnalysisError;
use crate::events::{EventType, GameEvent};
use crate::pipeline::metrics::MetricsSummary;
use crate::stats::{PlayerStats, TeamTotals};
use crate::types::PlayerId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// Final output of one processing run
#[derive(Debug, Clone, Serialize)]
pub struct GameReport {
    pub session_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub frame_rate: f64,
    pub window_size: usize,
    pub frames_processed: u64,
    /// Video time covered, seconds
    pub duration_secs: f64,
    pub events: Vec<GameEvent>,
    pub stats: BTreeMap<PlayerId, PlayerStats>,
    pub team_totals: BTreeMap<Team, TeamTotals>,
    pub metrics: MetricsSummary,
}

impl GameReport {
    pub fn count_of(&self, event_type: EventType) -> usize {
        self.events
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }

    pub fn score(&self, team: Team) -> u32 {
        self.team_totals.get(&team).map_or(0, |t| t.score)
    }

    /// Top scorers first, ties broken by player id
    pub fn leaders(&self, limit: usize) -> Vec<&PlayerStats> {
        let mut players: Vec<&PlayerStats> = self.stats.values().collect();
        players.sort_by(|a, b| b.points.cmp(&a.points).then(a.player_id.cmp(&b.player_id)));
        players.truncate(limit);
        players
    }

    /// Writes `<output_dir>/<stem>_report.json` and returns its path
    pub fn write_json(&self, output_dir: &Path, stem: &str) -> Result<PathBuf, AnalysisError> {
        fs::create_dir_all(output_dir).map_err(|e| AnalysisError::io(output_dir, e))?;
        let path = output_dir.join(format!("{}_report.json", stem));

        let json = serde_json::to_string_pretty(self).map_err(|source| AnalysisError::Report {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|e| AnalysisError::io(&path, e))?;

        info!("💾 Report saved: {}", path.display());
        Ok(path)
    }
}
