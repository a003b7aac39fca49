//! Rounds and matches on top of a [`Simulation`].
//!
//! A round ends on a knockout (the last fighter standing wins, a double
//! knockout is a draw) or when its timer runs out (highest remaining health
//! fraction wins, ties are draws). Draws award no win. The match ends when
//! a fighter reaches the required number of round wins, or after
//! `2 × rounds_to_win + 1` rounds, whichever comes first.
//!
//! Each round start fires the roster's round-start condition triggers, and
//! the first also fires match-start ones.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{BrawlError, Result};
use crate::events::{CombatEvent, EventSink, RoundEndReason, TickEvents};
use crate::fighter::FighterId;
use crate::input::InputEvent;
use crate::math::Fixed;
use crate::simulation::Simulation;

/// Outcome of a finished round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// One-based round number.
    pub round: u32,
    /// Winner, `None` for a draw.
    pub winner: Option<FighterId>,
    /// How the round ended.
    pub reason: RoundEndReason,
    /// Ticks the round lasted.
    pub ticks: u32,
}

/// Where a match stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    /// Rounds are still being fought.
    InProgress,
    /// The match is over.
    Finished {
        /// Winner, `None` for a draw.
        winner: Option<FighterId>,
    },
}

/// A best-of-N match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    simulation: Simulation,
    rounds_to_win: u32,
    round_ticks: u32,
    round: u32,
    round_elapsed: u32,
    round_announced: bool,
    wins: BTreeMap<FighterId, u32>,
    history: Vec<RoundRecord>,
    status: MatchStatus,
}

impl Match {
    /// Start a match with the fighters already spawned in `simulation`.
    #[must_use]
    pub fn new(simulation: Simulation) -> Self {
        let config = simulation.config();
        let rounds_to_win = config.rounds_to_win.max(1);
        let round_ticks = config.round_ticks();
        let wins = simulation
            .fighter_ids()
            .into_iter()
            .map(|id| (id, 0))
            .collect();
        Self {
            simulation,
            rounds_to_win,
            round_ticks,
            round: 1,
            round_elapsed: 0,
            round_announced: false,
            wins,
            history: Vec::new(),
            status: MatchStatus::InProgress,
        }
    }

    /// Underlying simulation.
    #[must_use]
    pub const fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Current one-based round number.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Ticks left on the round timer.
    #[must_use]
    pub const fn remaining_ticks(&self) -> u32 {
        self.round_ticks.saturating_sub(self.round_elapsed)
    }

    /// Rounds won by `fighter`.
    #[must_use]
    pub fn wins(&self, fighter: FighterId) -> u32 {
        self.wins.get(&fighter).copied().unwrap_or(0)
    }

    /// Finished rounds in order.
    #[must_use]
    pub fn history(&self) -> &[RoundRecord] {
        &self.history
    }

    /// Match status.
    #[must_use]
    pub const fn status(&self) -> MatchStatus {
        self.status
    }

    /// Whether the match is over.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self.status, MatchStatus::Finished { .. })
    }

    /// Most rounds that will be played.
    #[must_use]
    pub const fn max_rounds(&self) -> u32 {
        2 * self.rounds_to_win + 1
    }

    /// Hash of the simulation plus round progress.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.simulation.state_hash().hash(&mut hasher);
        self.round.hash(&mut hasher);
        self.round_elapsed.hash(&mut hasher);
        for (fighter, wins) in &self.wins {
            fighter.hash(&mut hasher);
            wins.hash(&mut hasher);
        }
        self.is_finished().hash(&mut hasher);
        hasher.finish()
    }

    /// Serialize match state to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| BrawlError::InvalidState(format!("Failed to serialize match: {e}")))
    }

    /// Deserialize match state from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| BrawlError::InvalidState(format!("Failed to deserialize match: {e}")))
    }

    /// Run one tick of the current round.
    ///
    /// Does nothing once the match is finished.
    pub fn tick(&mut self, inputs: &[InputEvent]) -> TickEvents {
        let mut events = TickEvents::new(self.simulation.get_tick());
        if self.is_finished() {
            return events;
        }

        if !self.round_announced {
            self.round_announced = true;
            events.emit(CombatEvent::RoundStarted { round: self.round });
            self.simulation.begin_round(self.round == 1, &mut events);
        }

        self.simulation.tick_into(inputs, &mut events);
        self.round_elapsed += 1;

        if let Some((winner, reason)) = self.decide_round() {
            self.end_round(winner, reason, &mut events);
        }
        events
    }

    fn decide_round(&self) -> Option<(Option<FighterId>, RoundEndReason)> {
        let snapshot = self.simulation.snapshot();
        let standing: Vec<FighterId> = snapshot
            .iter()
            .filter(|f| !f.knocked_out)
            .map(|f| f.id)
            .collect();

        if standing.len() < snapshot.len() && standing.len() <= 1 {
            return Some((standing.first().copied(), RoundEndReason::KnockOut));
        }

        if self.round_elapsed >= self.round_ticks {
            let mut best: Option<(FighterId, Fixed)> = None;
            let mut tied = false;
            for fighter in &snapshot {
                let fraction = if fighter.max_health > Fixed::ZERO {
                    fighter.health / fighter.max_health
                } else {
                    Fixed::ZERO
                };
                match best {
                    Some((_, top)) if fraction == top => tied = true,
                    Some((_, top)) if fraction < top => {}
                    _ => {
                        best = Some((fighter.id, fraction));
                        tied = false;
                    }
                }
            }
            let winner = if tied { None } else { best.map(|(id, _)| id) };
            return Some((winner, RoundEndReason::TimeOut));
        }

        None
    }

    fn end_round(
        &mut self,
        winner: Option<FighterId>,
        reason: RoundEndReason,
        events: &mut TickEvents,
    ) {
        info!(round = self.round, ?winner, ?reason, "round over");
        events.emit(CombatEvent::RoundEnded {
            round: self.round,
            winner,
            reason,
        });
        self.history.push(RoundRecord {
            round: self.round,
            winner,
            reason,
            ticks: self.round_elapsed,
        });
        if let Some(winner) = winner {
            *self.wins.entry(winner).or_insert(0) += 1;
        }

        if let Some(champion) = winner.filter(|w| self.wins(*w) >= self.rounds_to_win) {
            self.finish(Some(champion), events);
            return;
        }
        if self.round >= self.max_rounds() {
            let leader = self.leader();
            self.finish(leader, events);
            return;
        }

        self.round += 1;
        self.round_elapsed = 0;
        self.round_announced = false;
        self.simulation.reset_fighters();
    }

    /// Fighter with strictly the most round wins.
    fn leader(&self) -> Option<FighterId> {
        let top = self.wins.values().copied().max()?;
        let mut leaders = self.wins.iter().filter(|(_, wins)| **wins == top);
        let (first, _) = leaders.next()?;
        leaders.next().is_none().then_some(*first)
    }

    fn finish(&mut self, winner: Option<FighterId>, events: &mut TickEvents) {
        info!(?winner, rounds = self.round, "match over");
        self.status = MatchStatus::Finished { winner };
        events.emit(CombatEvent::MatchEnded { winner });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CombatConfig;
    use crate::data::{
        ConditionDefinition, ConditionKind, FighterDefinition, HitboxSpec, MoveCategory,
        MoveDefinition, Roster, RosterData, StatusDuration, TriggerKind,
    };
    use crate::fighter::Facing;
    use crate::input::Intent;
    use crate::math::Vec2Fixed;

    fn setup(round_seconds: i32) -> (Match, FighterId, FighterId) {
        setup_with(round_seconds, vec![])
    }

    fn setup_with(
        round_seconds: i32,
        conditions: Vec<ConditionDefinition>,
    ) -> (Match, FighterId, FighterId) {
        let roster = Roster::load(RosterData {
            moves: vec![
                MoveDefinition::new("finisher", MoveCategory::LightAttack)
                    .with_frames(1, 2, 2)
                    .with_damage(Fixed::from_num(200))
                    .with_hitbox(HitboxSpec {
                        offset: Vec2Fixed::from_ints(1, 1),
                        ..HitboxSpec::default()
                    }),
                MoveDefinition::new("tap", MoveCategory::HeavyAttack)
                    .with_frames(1, 2, 2)
                    .with_damage(Fixed::from_num(5))
                    .with_hitbox(HitboxSpec {
                        offset: Vec2Fixed::from_ints(1, 1),
                        ..HitboxSpec::default()
                    }),
            ],
            statuses: vec![],
            fighters: vec![FighterDefinition::new("striker", "finisher", "tap")],
            conditions,
        })
        .unwrap();
        let striker = roster.fighter_id("striker").unwrap();
        let config = CombatConfig {
            round_duration_seconds: Fixed::from_num(round_seconds),
            ..CombatConfig::default()
        };
        let mut sim = Simulation::new(roster, config);
        let a = sim
            .spawn_fighter(striker, Vec2Fixed::ZERO, Facing::Right)
            .unwrap();
        let b = sim
            .spawn_fighter(striker, Vec2Fixed::from_ints(1, 0), Facing::Left)
            .unwrap();
        (Match::new(sim), a, b)
    }

    fn play_round(game: &mut Match, first: Vec<InputEvent>) -> Vec<CombatEvent> {
        let round = game.round();
        let mut events = game.tick(&first).events;
        while game.round() == round && !game.is_finished() {
            events.extend(game.tick(&[]).events);
        }
        events
    }

    #[test]
    fn test_knockout_wins_round_and_match() {
        let (mut game, a, b) = setup(99);
        let events = play_round(&mut game, vec![InputEvent::new(a, Intent::LightAttack)]);
        assert_eq!(events[0], CombatEvent::RoundStarted { round: 1 });
        assert!(events.contains(&CombatEvent::RoundEnded {
            round: 1,
            winner: Some(a),
            reason: RoundEndReason::KnockOut,
        }));
        assert_eq!(game.wins(a), 1);
        assert_eq!(game.wins(b), 0);

        // Fighters are back at full health for round two
        let snapshot = game.simulation().snapshot();
        assert!(snapshot.iter().all(|f| f.health == f.max_health));

        let events = play_round(&mut game, vec![InputEvent::new(a, Intent::LightAttack)]);
        assert!(events.contains(&CombatEvent::MatchEnded { winner: Some(a) }));
        assert_eq!(game.status(), MatchStatus::Finished { winner: Some(a) });
        assert_eq!(game.history().len(), 2);

        assert!(game.tick(&[]).is_empty());
    }

    #[test]
    fn test_timeout_decided_on_health() {
        let (mut game, a, _) = setup(1);
        let events = play_round(&mut game, vec![InputEvent::new(a, Intent::HeavyAttack)]);
        assert!(events.contains(&CombatEvent::RoundEnded {
            round: 1,
            winner: Some(a),
            reason: RoundEndReason::TimeOut,
        }));
        assert_eq!(game.history()[0].ticks, 60);
    }

    #[test]
    fn test_timeout_draw_awards_nothing() {
        let (mut game, a, b) = setup(1);
        play_round(&mut game, vec![]);
        assert_eq!(game.history()[0].winner, None);
        assert_eq!(game.wins(a) + game.wins(b), 0);
        assert_eq!(game.round(), 2);
    }

    #[test]
    fn test_all_draws_end_in_draw() {
        let (mut game, _, _) = setup(1);
        while !game.is_finished() {
            game.tick(&[]);
        }
        assert_eq!(game.history().len() as u32, game.max_rounds());
        assert_eq!(game.status(), MatchStatus::Finished { winner: None });
    }

    #[test]
    fn test_round_flow_fires_condition_triggers() {
        let (mut game, _, _) = setup_with(
            1,
            vec![
                ConditionDefinition::new("storm", ConditionKind::Weather)
                    .with_duration(StatusDuration::Permanent)
                    .with_trigger(TriggerKind::MatchStart, false),
                ConditionDefinition::new("fresh_legs", ConditionKind::RoundState)
                    .with_duration(StatusDuration::Permanent)
                    .with_trigger(TriggerKind::RoundStart, false),
            ],
        );
        let roster = game.simulation().roster();
        let storm = roster.condition_id("storm").unwrap();
        let legs = roster.condition_id("fresh_legs").unwrap();

        let events = play_round(&mut game, vec![]);
        assert_eq!(events[0], CombatEvent::RoundStarted { round: 1 });
        assert!(matches!(
            events[1],
            CombatEvent::ConditionActivated { condition, .. } if condition == storm
        ));
        assert!(matches!(
            events[2],
            CombatEvent::ConditionActivated { condition, .. } if condition == legs
        ));

        let events = play_round(&mut game, vec![]);
        assert_eq!(
            events[..3],
            [
                CombatEvent::RoundStarted { round: 2 },
                CombatEvent::ConditionEnded { condition: legs },
                CombatEvent::ConditionActivated {
                    condition: legs,
                    banner: Some("fresh_legs".to_string()),
                },
            ]
        );
        assert!(game.simulation().conditions().is_active(storm));
    }
}
