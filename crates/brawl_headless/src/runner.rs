//! Scripted match runner.
//!
//! Drives a [`Match`] from a [`Scenario`]'s input script until the match
//! ends or the tick limit is reached, optionally recording a replay.

use brawl_core::events::{CombatEvent, TickEvents};
use brawl_core::fighter::FighterId;
use brawl_core::replay::Replay;
use brawl_core::round::{Match, MatchStatus, RoundRecord};
use brawl_core::simulation::FighterSnapshot;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::scenario::{PreparedMatch, Scenario, ScenarioError};

/// Runner options from the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Overrides the scenario's tick limit.
    pub max_ticks: Option<u64>,
    /// Record a replay while running.
    pub record: bool,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Scenario name.
    pub scenario: String,
    /// Ticks simulated.
    pub ticks: u64,
    /// Match status when the run stopped.
    pub status: MatchStatus,
    /// Finished rounds.
    pub rounds: Vec<RoundRecord>,
    /// Round wins per fighter, in slot order.
    pub wins: Vec<(FighterId, u32)>,
    /// Final fighter state.
    pub fighters: Vec<FighterSnapshot>,
    /// Events emitted over the whole run.
    pub event_count: usize,
    /// Final state hash.
    pub final_hash: u64,
}

impl RunReport {
    /// Whether the run stopped on the tick limit rather than a result.
    #[must_use]
    pub fn timed_out(&self) -> bool {
        self.status == MatchStatus::InProgress
    }
}

/// Runs one scenario.
#[derive(Debug)]
pub struct MatchRunner {
    scenario: Scenario,
    game: Match,
    slots: Vec<FighterId>,
    tick: u64,
    max_ticks: u64,
    event_count: usize,
    replay: Option<Replay>,
}

impl MatchRunner {
    /// Prepare the scenario's match.
    pub fn new(scenario: Scenario, options: &RunOptions) -> Result<Self, ScenarioError> {
        let PreparedMatch { game, slots } = scenario.prepare()?;
        let replay = if options.record {
            Some(Replay::new(scenario.name.clone(), &game)?)
        } else {
            None
        };
        let max_ticks = options.max_ticks.unwrap_or(scenario.max_ticks);
        info!(
            scenario = %scenario.name,
            fighters = slots.len(),
            max_ticks,
            recording = replay.is_some(),
            "match ready"
        );
        Ok(Self {
            scenario,
            game,
            slots,
            tick: 0,
            max_ticks,
            event_count: 0,
            replay,
        })
    }

    /// The match being run.
    #[must_use]
    pub const fn game(&self) -> &Match {
        &self.game
    }

    /// Runtime id of each scenario slot.
    #[must_use]
    pub fn slots(&self) -> &[FighterId] {
        &self.slots
    }

    /// Scenario being run.
    #[must_use]
    pub const fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Ticks simulated so far.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Whether the match is decided or the tick limit is reached.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.game.is_finished() || self.tick >= self.max_ticks
    }

    /// Advance one tick with the scripted inputs.
    pub fn step(&mut self) -> TickEvents {
        let inputs = self.scenario.inputs_at(self.tick, &self.slots);
        if let Some(replay) = &mut self.replay {
            replay.record_inputs(self.tick, &inputs);
        }
        let events = self.game.tick(&inputs);
        self.event_count += events.events.len();

        for event in &events {
            if let CombatEvent::RoundEnded {
                round,
                winner,
                reason,
            } = event
            {
                debug!(tick = self.tick, round, ?winner, ?reason, "round ended");
            }
        }
        trace!(tick = self.tick, hash = self.game.state_hash(), "tick");

        self.tick += 1;
        events
    }

    /// Run to completion, handing every tick's events to `on_tick`.
    pub fn run_with(&mut self, mut on_tick: impl FnMut(&TickEvents)) -> RunReport {
        while !self.is_done() {
            let events = self.step();
            on_tick(&events);
        }
        let report = self.report();
        info!(
            scenario = %report.scenario,
            ticks = report.ticks,
            status = ?report.status,
            "run finished"
        );
        report
    }

    /// Run to completion.
    pub fn run(&mut self) -> RunReport {
        self.run_with(|_| {})
    }

    /// Summary of the run so far.
    #[must_use]
    pub fn report(&self) -> RunReport {
        RunReport {
            scenario: self.scenario.name.clone(),
            ticks: self.tick,
            status: self.game.status(),
            rounds: self.game.history().to_vec(),
            wins: self
                .slots
                .iter()
                .map(|id| (*id, self.game.wins(*id)))
                .collect(),
            fighters: self.game.simulation().snapshot(),
            event_count: self.event_count,
            final_hash: self.game.state_hash(),
        }
    }

    /// Finish recording and hand back the replay, if one was recorded.
    #[must_use]
    pub fn into_replay(self) -> Option<Replay> {
        let final_hash = self.game.state_hash();
        let tick = self.tick;
        self.replay.map(|mut replay| {
            replay.finalize(tick, final_hash);
            replay
        })
    }
}
