//! Score and kill-counter bookkeeping
//!
//! The in-core feed for the persistence collaborator: consumes drained
//! `GameEvent`s and keeps the running score plus per-archetype kill counts.
//! Whatever saves to disk reads from here; nothing here touches storage.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::sim::GameEvent;

/// Running score and kill tally for one session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scoreboard {
    pub score: u64,
    /// Kill count per foe archetype name
    pub kills: HashMap<String, u32>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one frame's events into the tally. `FoeKilled` arrives exactly
    /// once per death, so plain accumulation is correct.
    pub fn record(&mut self, events: &[GameEvent]) {
        for event in events {
            if let GameEvent::FoeKilled { name, score } = event {
                self.score += u64::from(*score);
                *self.kills.entry(name.clone()).or_insert(0) += 1;
            }
        }
    }

    /// Total kills across every archetype
    pub fn total_kills(&self) -> u32 {
        self.kills.values().sum()
    }

    pub fn kills_of(&self, name: &str) -> u32 {
        self.kills.get(name).copied().unwrap_or(0)
    }
}
