// src/analysis/teams.rs

use crate::types::{PlayerId, TeamMode, TeamsConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Home,
    Away,
}

impl Team {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Away => "away",
        }
    }
}

/// Maps a player identity to a team.
///
/// Pass/steal classification and rebound typing only ever ask
/// `are_teammates`, so alternative schemes plug in here.
pub trait TeamLookup: Send + Sync {
    fn team_of(&self, player: PlayerId) -> Option<Team>;

    /// A player is always their own teammate. Unknown players have no
    /// teammates.
    fn are_teammates(&self, a: PlayerId, b: PlayerId) -> bool {
        if a == b {
            return true;
        }
        match (self.team_of(a), self.team_of(b)) {
            (Some(ta), Some(tb)) => ta == tb,
            _ => false,
        }
    }
}

/// Even ids are home, odd ids are away
#[derive(Debug, Clone, Copy, Default)]
pub struct ParityTeams;

impl TeamLookup for ParityTeams {
    fn team_of(&self, player: PlayerId) -> Option<Team> {
        Some(if player % 2 == 0 { Team::Home } else { Team::Away })
    }
}

/// Explicit home/away lists
#[derive(Debug, Clone, Default)]
pub struct RosterTeams {
    teams: HashMap<PlayerId, Team>,
}

impl RosterTeams {
    pub fn new(home: &[PlayerId], away: &[PlayerId]) -> Self {
        let mut teams = HashMap::new();
        for &id in home {
            teams.insert(id, Team::Home);
        }
        for &id in away {
            if teams.insert(id, Team::Away).is_some() {
                warn!("Player {} listed on both rosters, treating as away", id);
            }
        }
        Self { teams }
    }
}

impl TeamLookup for RosterTeams {
    fn team_of(&self, player: PlayerId) -> Option<Team> {
        self.teams.get(&player).copied()
    }
}

pub fn team_lookup(config: &TeamsConfig) -> Arc<dyn TeamLookup> {
    match config.mode {
        TeamMode::Parity => Arc::new(ParityTeams),
        TeamMode::Roster => Arc::new(RosterTeams::new(&config.home, &config.away)),
    }
}
