// src/stats.rs

use crate::analysis::teams::{Team, TeamLookup};
use crate::events::{EventDetails, GameEvent, ReboundType, ShotResult};
use crate::types::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Box-score counters for one player. Counters only ever go up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub player_id: PlayerId,
    pub points: u32,
    pub assists: u32,
    pub steals: u32,
    pub turnovers: u32,
    pub offensive_rebounds: u32,
    pub defensive_rebounds: u32,
    pub field_goal_attempts: u32,
    pub field_goals_made: u32,
    pub three_point_attempts: u32,
    pub three_pointers_made: u32,
}

impl PlayerStats {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            ..Default::default()
        }
    }

    pub fn rebounds(&self) -> u32 {
        self.offensive_rebounds + self.defensive_rebounds
    }
}

/// Per-team sums of the player counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamTotals {
    pub score: u32,
    pub assists: u32,
    pub steals: u32,
    pub turnovers: u32,
    pub rebounds: u32,
    pub field_goal_attempts: u32,
    pub field_goals_made: u32,
    pub three_point_attempts: u32,
    pub three_pointers_made: u32,
}

impl TeamTotals {
    fn add(&mut self, p: &PlayerStats) {
        self.score += p.points;
        self.assists += p.assists;
        self.steals += p.steals;
        self.turnovers += p.turnovers;
        self.rebounds += p.rebounds();
        self.field_goal_attempts += p.field_goal_attempts;
        self.field_goals_made += p.field_goals_made;
        self.three_point_attempts += p.three_point_attempts;
        self.three_pointers_made += p.three_pointers_made;
    }
}

/// Running stats for every player referenced by an event.
///
/// A player gets an entry the first time any event names them.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct StatsLedger {
    players: BTreeMap<PlayerId, PlayerStats>,
}

impl StatsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, player: PlayerId) -> &mut PlayerStats {
        self.players
            .entry(player)
            .or_insert_with(|| PlayerStats::new(player))
    }

    pub fn apply(&mut self, event: &GameEvent) {
        match &event.details {
            // A completed pass is credited as an assist for the passer
            EventDetails::Pass { from, to } => {
                self.entry(*from).assists += 1;
                self.entry(*to);
            }
            EventDetails::Steal { gained_by } => self.entry(*gained_by).steals += 1,
            EventDetails::Turnover { lost_by } => self.entry(*lost_by).turnovers += 1,
            EventDetails::Shot {
                shooter,
                result,
                points,
                three_point,
            } => {
                let Some(shooter) = shooter else {
                    debug!("Shot at {:.2}s has no shooter, not credited", event.time);
                    return;
                };
                let stats = self.entry(*shooter);
                stats.field_goal_attempts += 1;
                if *three_point {
                    stats.three_point_attempts += 1;
                }
                if *result == ShotResult::Made {
                    stats.points += *points;
                    stats.field_goals_made += 1;
                    if *three_point {
                        stats.three_pointers_made += 1;
                    }
                }
            }
            EventDetails::Rebound {
                player,
                rebound_type,
            } => {
                let stats = self.entry(*player);
                match rebound_type {
                    ReboundType::Offensive => stats.offensive_rebounds += 1,
                    ReboundType::Defensive => stats.defensive_rebounds += 1,
                }
            }
            EventDetails::Dribble { player } => {
                self.entry(*player);
            }
        }
    }

    pub fn get(&self, player: PlayerId) -> Option<&PlayerStats> {
        self.players.get(&player)
    }

    pub fn players(&self) -> impl Iterator<Item = &PlayerStats> {
        self.players.values()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn snapshot(&self) -> BTreeMap<PlayerId, PlayerStats> {
        self.players.clone()
    }

    /// Players the lookup cannot place are left out of the totals
    pub fn team_totals(&self, teams: &dyn TeamLookup) -> BTreeMap<Team, TeamTotals> {
        let mut totals: BTreeMap<Team, TeamTotals> = BTreeMap::new();
        for stats in self.players.values() {
            if let Some(team) = teams.team_of(stats.player_id) {
                totals.entry(team).or_default().add(stats);
            }
        }
        totals
    }
}
