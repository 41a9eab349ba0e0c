// src/pipeline/event_log.rs
//
// Append-only, time-ordered record of every event a session emitted.
// Unlike a bounded bus nothing is ever dropped; the log is the session
// output.

use crate::events::GameEvent;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<GameEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, event: GameEvent) {
        if let Some(last) = self.events.last() {
            if event.time < last.time {
                warn!(
                    "Event at {:.2}s appended after {:.2}s",
                    event.time, last.time
                );
            }
        }
        self.events.push(event);
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_events(self) -> Vec<GameEvent> {
        self.events
    }
}
