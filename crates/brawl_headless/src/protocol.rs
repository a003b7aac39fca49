//! JSON-lines output protocol.
//!
//! `run --json` writes one JSON object per line to stdout:
//!
//! 1. `{"type":"ready",...}` with the spawned fighters
//! 2. `{"type":"events","tick":N,"events":[...]}` for every tick that
//!    produced events (quiet ticks are skipped)
//! 3. `{"type":"match_over",...}` with the run summary
//!
//! Logs never go to stdout.
//!
//! # Example
//!
//! ```text
//! <- {"type":"ready","version":"1.0","scenario":"jab_pressure","fighters":[...]}
//! <- {"type":"events","tick":0,"events":[{"RoundStarted":{"round":1}}]}
//! <- {"type":"events","tick":4,"events":[{"MoveStarted":{"fighter":0,"move_id":0}}]}
//! <- {"type":"match_over","scenario":"jab_pressure","ticks":812,...}
//! ```

use brawl_core::events::{CombatEvent, TickEvents};
use brawl_core::simulation::FighterSnapshot;
use serde::{Deserialize, Serialize};

use crate::runner::RunReport;

/// Protocol version written in the ready line.
pub const PROTOCOL_VERSION: &str = "1.0";

/// A line of runner output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// The match is set up and about to start.
    Ready {
        /// Protocol version.
        version: String,
        /// Scenario name.
        scenario: String,
        /// Fighters as spawned.
        fighters: Vec<FighterSnapshot>,
    },
    /// Everything that happened on one tick.
    Events {
        /// Tick number.
        tick: u64,
        /// Events in emission order.
        events: Vec<CombatEvent>,
    },
    /// The run is over.
    MatchOver(RunReport),
}

impl Response {
    /// Ready line for a freshly prepared match.
    #[must_use]
    pub fn ready(scenario: &str, fighters: Vec<FighterSnapshot>) -> Self {
        Response::Ready {
            version: PROTOCOL_VERSION.to_string(),
            scenario: scenario.to_string(),
            fighters,
        }
    }

    /// Events line, or `None` for a quiet tick.
    #[must_use]
    pub fn events(tick: &TickEvents) -> Option<Self> {
        (!tick.is_empty()).then(|| Response::Events {
            tick: tick.tick,
            events: tick.events.clone(),
        })
    }

    /// Serialize to a single JSON line (no trailing newline).
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
