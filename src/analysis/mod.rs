// src/analysis/mod.rs
//
// Game analysis modules.
//
// Signal flow per frame:
//   FrameState → observation ─→ window ─→ shot_tracker ─┐
//                                      └→ possession ───┼→ event_machine → GameEvent
//   teams (TeamLookup) ─────────────────────────────────┘
//
// Orchestrated by pipeline::session::GameSession.

pub mod event_machine;
pub mod observation;
pub mod possession;
pub mod shot_tracker;
pub mod teams;
pub mod window;

pub use event_machine::EventStateMachine;
pub use observation::{Observation, Observer, RimContact};
pub use possession::{
    find_possessor, PossessionCandidate, PossessionResolver, PossessionSnapshot, PossessionState,
};
pub use shot_tracker::{ShotAttempt, ShotResolution, ShotTracker};
pub use teams::{team_lookup, ParityTeams, RosterTeams, Team, TeamLookup};
pub use window::WindowAggregator;
