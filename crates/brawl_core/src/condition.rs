//! Adaptive conditions at runtime.
//!
//! A [`ConditionTracker`] holds the match's active conditions, counts down
//! their durations and fires their triggers. While a condition is active
//! its modifiers apply:
//! - global modifiers reshape the [`CombatConfig`] used for the tick;
//! - stat modifiers join the status fold (see [`crate::status`]) for the
//!   targeted fighters, ahead of their statuses;
//! - move modifiers scale damage and add armor frames to targeted moves.
//!
//! Round-scoped triggers are driven from outside: call
//! [`ConditionTracker::begin_round`] when a round starts. Health and time
//! triggers are evaluated every tick by [`ConditionTracker::evaluate`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::CombatConfig;
use crate::data::{
    ConditionDefinition, ConditionId, ConditionTrigger, FighterModifier, GlobalProperty, Roster,
    StatKind, TriggerKind,
};
use crate::events::{CombatEvent, EventSink};
use crate::fighter::FighterRuntimeState;
use crate::math::{seconds_to_ticks, Fixed};
use crate::status::StatFold;

/// A condition currently in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActiveCondition {
    /// Condition definition.
    pub condition: ConditionId,
    /// Ticks left, or `None` when permanent.
    pub remaining_ticks: Option<u32>,
}

/// Triggers fired by round flow rather than by tick evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoundTrigger {
    MatchStart,
    RoundStart,
}

impl RoundTrigger {
    const fn matches(self, on: TriggerKind) -> bool {
        matches!(
            (self, on),
            (RoundTrigger::MatchStart, TriggerKind::MatchStart)
                | (RoundTrigger::RoundStart, TriggerKind::RoundStart)
        )
    }
}

/// Active conditions and trigger bookkeeping for one match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConditionTracker {
    /// In activation order.
    active: Vec<ActiveCondition>,
    /// Once-only triggers that have fired, as (condition, trigger index).
    spent: BTreeSet<(ConditionId, usize)>,
    /// Health triggers whose threshold is currently crossed.
    holding: BTreeSet<(ConditionId, usize)>,
}

impl ConditionTracker {
    /// Create a tracker with nothing active.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            active: Vec::new(),
            spent: BTreeSet::new(),
            holding: BTreeSet::new(),
        }
    }

    /// Active conditions in activation order.
    #[must_use]
    pub fn active(&self) -> &[ActiveCondition] {
        &self.active
    }

    /// Whether a condition is in effect.
    #[must_use]
    pub fn is_active(&self, condition: ConditionId) -> bool {
        self.active.iter().any(|a| a.condition == condition)
    }

    /// Switch a condition on.
    ///
    /// An already active condition has its duration restarted and emits
    /// nothing. Returns whether the condition was newly activated.
    pub fn activate(
        &mut self,
        condition: ConditionId,
        definition: &ConditionDefinition,
        tick_rate: u32,
        sink: &mut dyn EventSink,
    ) -> bool {
        let remaining_ticks = definition.duration.to_ticks(tick_rate);
        if let Some(active) = self.active.iter_mut().find(|a| a.condition == condition) {
            active.remaining_ticks = remaining_ticks;
            trace!(%condition, "condition refreshed");
            return false;
        }

        self.active.push(ActiveCondition {
            condition,
            remaining_ticks,
        });
        sink.emit(CombatEvent::ConditionActivated {
            condition,
            banner: definition.banner().map(str::to_string),
        });
        debug!(%condition, name = %definition.name, ?remaining_ticks, "condition activated");
        true
    }

    /// Switch a condition off. Returns whether it was active.
    pub fn deactivate(&mut self, condition: ConditionId, sink: &mut dyn EventSink) -> bool {
        let before = self.active.len();
        self.active.retain(|a| a.condition != condition);
        if self.active.len() == before {
            return false;
        }
        sink.emit(CombatEvent::ConditionEnded { condition });
        true
    }

    /// Count every timed condition down by one tick, ending those that run out.
    pub fn tick(&mut self, sink: &mut dyn EventSink) {
        let mut index = 0;
        while index < self.active.len() {
            if let Some(remaining) = self.active[index].remaining_ticks.as_mut() {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    let ended = self.active.remove(index);
                    sink.emit(CombatEvent::ConditionEnded {
                        condition: ended.condition,
                    });
                    debug!(condition = %ended.condition, "condition expired");
                    continue;
                }
            }
            index += 1;
        }
    }

    /// Start a round: end round-scoped conditions from the previous round,
    /// re-arm health triggers, then fire match-start (on the first round)
    /// and round-start triggers.
    pub fn begin_round(
        &mut self,
        first: bool,
        roster: &Roster,
        tick_rate: u32,
        sink: &mut dyn EventSink,
    ) {
        if !first {
            let ending: Vec<ConditionId> = self
                .active
                .iter()
                .map(|a| a.condition)
                .filter(|&id| {
                    roster
                        .condition_def(id)
                        .is_some_and(|d| d.kind.clears_between_rounds())
                })
                .collect();
            for condition in ending {
                self.deactivate(condition, sink);
            }
        }
        self.holding.clear();

        if first {
            self.fire_round_trigger(RoundTrigger::MatchStart, roster, tick_rate, sink);
        }
        self.fire_round_trigger(RoundTrigger::RoundStart, roster, tick_rate, sink);
    }

    fn fire_round_trigger(
        &mut self,
        event: RoundTrigger,
        roster: &Roster,
        tick_rate: u32,
        sink: &mut dyn EventSink,
    ) {
        for (id, definition) in roster.conditions() {
            for (index, trigger) in definition.triggers.iter().enumerate() {
                if event.matches(trigger.on) {
                    self.fire(id, index, trigger, definition, tick_rate, sink);
                }
            }
        }
    }

    /// Evaluate health and time triggers.
    ///
    /// `round_ticks` is the number of ticks the current round has run,
    /// including this one. `lowest_health` is the smallest health fraction
    /// among the fighters. Health triggers fire when the threshold is
    /// crossed, not on every tick below it.
    pub fn evaluate(
        &mut self,
        roster: &Roster,
        tick_rate: u32,
        round_ticks: u64,
        lowest_health: Fixed,
        sink: &mut dyn EventSink,
    ) {
        for (id, definition) in roster.conditions() {
            for (index, trigger) in definition.triggers.iter().enumerate() {
                match trigger.on {
                    TriggerKind::HealthBelow(threshold) => {
                        if lowest_health >= threshold {
                            self.holding.remove(&(id, index));
                        } else if self.holding.insert((id, index)) {
                            self.fire(id, index, trigger, definition, tick_rate, sink);
                        }
                    }
                    TriggerKind::TimeElapsed(seconds) => {
                        let at = u64::from(seconds_to_ticks(seconds, tick_rate).max(1));
                        if round_ticks == at {
                            self.fire(id, index, trigger, definition, tick_rate, sink);
                        }
                    }
                    TriggerKind::MatchStart | TriggerKind::RoundStart => {}
                }
            }
        }
    }

    fn fire(
        &mut self,
        condition: ConditionId,
        index: usize,
        trigger: &ConditionTrigger,
        definition: &ConditionDefinition,
        tick_rate: u32,
        sink: &mut dyn EventSink,
    ) {
        if trigger.once && !self.spent.insert((condition, index)) {
            return;
        }
        trace!(%condition, trigger = ?trigger.on, "condition triggered");
        self.activate(condition, definition, tick_rate, sink);
    }

    /// Fighter modifiers of active conditions that target `fighter`.
    fn fighter_modifiers<'a>(
        &'a self,
        fighter: &'a str,
        roster: &'a Roster,
    ) -> impl Iterator<Item = &'a FighterModifier> + 'a {
        self.active
            .iter()
            .filter_map(|a| roster.condition_def(a.condition))
            .flat_map(|d| &d.fighter_modifiers)
            .filter(move |m| m.fighter.matches(fighter))
    }

    /// Push the `stat` modifiers that target `fighter` into `fold`.
    pub fn fold_stat(&self, stat: StatKind, fighter: &str, roster: &Roster, fold: &mut StatFold) {
        for modifier in self
            .fighter_modifiers(fighter, roster)
            .flat_map(|m| &m.stat_modifiers)
            .filter(|m| m.stat == stat)
        {
            fold.push(modifier.operation, modifier.value, 1);
        }
    }

    /// Value of `stat` for a fighter, with active conditions and then the
    /// fighter's statuses folded onto `base`.
    #[must_use]
    pub fn stat_value(
        &self,
        stat: StatKind,
        base: Fixed,
        fighter: &FighterRuntimeState,
        roster: &Roster,
    ) -> Fixed {
        let mut fold = StatFold::new();
        if let Some(definition) = roster.fighter_def(fighter.definition) {
            self.fold_stat(stat, &definition.name, roster, &mut fold);
        }
        fighter.statuses.fold_stat(stat, roster, &mut fold);
        fold.resolve(base)
    }

    /// Combined damage multiplier on `move_name` when used by `fighter`.
    #[must_use]
    pub fn move_damage_multiplier(&self, fighter: &str, move_name: &str, roster: &Roster) -> Fixed {
        self.fighter_modifiers(fighter, roster)
            .flat_map(|m| &m.move_modifiers)
            .filter(|m| m.moves.matches(move_name))
            .fold(Fixed::ONE, |acc, m| acc.saturating_mul(m.damage_multiplier))
    }

    /// Armor frames added to `move_name` when started by `fighter`.
    #[must_use]
    pub fn extra_armor_frames(&self, fighter: &str, move_name: &str, roster: &Roster) -> u32 {
        self.fighter_modifiers(fighter, roster)
            .flat_map(|m| &m.move_modifiers)
            .filter(|m| m.moves.matches(move_name))
            .fold(0u32, |acc, m| acc.saturating_add(m.additional_armor_frames))
    }

    /// `config` with the global modifiers of every active condition applied.
    #[must_use]
    pub fn adjust_config(&self, config: &CombatConfig, roster: &Roster) -> CombatConfig {
        let mut adjusted = config.clone();
        if self.active.is_empty() {
            return adjusted;
        }

        let globals: Vec<_> = self
            .active
            .iter()
            .filter_map(|a| roster.condition_def(a.condition))
            .flat_map(|d| &d.global_modifiers)
            .collect();
        let folded = |property: GlobalProperty, base: Fixed| {
            let mut fold = StatFold::new();
            for modifier in globals.iter().filter(|m| m.property == property) {
                fold.push(modifier.operation, modifier.value, 1);
            }
            fold.resolve(base)
        };

        adjusted.gravity = folded(GlobalProperty::Gravity, config.gravity);
        adjusted.friction = folded(GlobalProperty::Friction, config.friction);
        adjusted.air_control = folded(GlobalProperty::AirControl, config.air_control);
        adjusted.max_fall_speed = folded(GlobalProperty::MaxFallSpeed, config.max_fall_speed);
        adjusted.chip_damage_fraction =
            folded(GlobalProperty::ChipDamage, config.chip_damage_fraction);
        adjusted.block_knockback_factor =
            folded(GlobalProperty::BlockKnockback, config.block_knockback_factor);
        adjusted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{
        ConditionKind, FighterDefinition, HitboxSpec, ModifierOp, MoveCategory, MoveDefinition,
        MoveModifier, RosterData, StatusDefinition, StatusDuration, StatusKind, Target,
    };
    use crate::fighter::{Facing, FighterId};
    use crate::math::Vec2Fixed;
    use crate::status::StatusEffectTracker;

    fn roster(conditions: Vec<ConditionDefinition>) -> Roster {
        Roster::load(RosterData {
            moves: vec![
                MoveDefinition::new("jab", MoveCategory::LightAttack)
                    .with_hitbox(HitboxSpec::default()),
                MoveDefinition::new("haymaker", MoveCategory::HeavyAttack)
                    .with_hitbox(HitboxSpec::default()),
            ],
            statuses: vec![StatusDefinition::new("rage", StatusKind::Buff).with_modifier(
                StatKind::Damage,
                ModifierOp::Multiply,
                Fixed::from_num(1.5),
            )],
            fighters: vec![
                FighterDefinition::new("striker", "jab", "haymaker"),
                FighterDefinition::new("tank", "jab", "haymaker"),
            ],
            conditions,
        })
        .unwrap()
    }

    fn activated(events: &[CombatEvent]) -> Vec<ConditionId> {
        events
            .iter()
            .filter_map(|e| match e {
                CombatEvent::ConditionActivated { condition, .. } => Some(*condition),
                _ => None,
            })
            .collect()
    }

    // =========================================================================
    // Triggers
    // =========================================================================

    #[test]
    fn test_match_and_round_start_triggers() {
        let roster = roster(vec![
            ConditionDefinition::new("storm", ConditionKind::Weather)
                .with_duration(StatusDuration::Permanent)
                .with_trigger(TriggerKind::MatchStart, false),
            ConditionDefinition::new("fresh_legs", ConditionKind::RoundState)
                .with_duration(StatusDuration::Permanent)
                .with_trigger(TriggerKind::RoundStart, false),
        ]);
        let storm = roster.condition_id("storm").unwrap();
        let legs = roster.condition_id("fresh_legs").unwrap();
        let mut tracker = ConditionTracker::new();
        let mut events = Vec::new();

        tracker.begin_round(true, &roster, 60, &mut events);
        assert_eq!(activated(&events), vec![storm, legs]);
        assert_eq!(
            events[0],
            CombatEvent::ConditionActivated {
                condition: storm,
                banner: Some("storm".to_string()),
            }
        );

        events.clear();
        tracker.begin_round(false, &roster, 60, &mut events);
        // Round-scoped conditions restart; match-wide ones carry over
        assert_eq!(
            events,
            vec![
                CombatEvent::ConditionEnded { condition: legs },
                CombatEvent::ConditionActivated {
                    condition: legs,
                    banner: Some("fresh_legs".to_string()),
                },
            ]
        );
        assert!(tracker.is_active(storm));
    }

    #[test]
    fn test_health_trigger_fires_on_crossing() {
        let roster = roster(vec![ConditionDefinition::new(
            "frenzy",
            ConditionKind::RoundState,
        )
        .with_trigger(TriggerKind::HealthBelow(Fixed::from_num(0.5)), false)]);
        let frenzy = roster.condition_id("frenzy").unwrap();
        let mut tracker = ConditionTracker::new();
        let mut events = Vec::new();

        tracker.evaluate(&roster, 60, 1, Fixed::from_num(0.8), &mut events);
        assert!(!tracker.is_active(frenzy));

        tracker.evaluate(&roster, 60, 2, Fixed::from_num(0.4), &mut events);
        assert!(tracker.is_active(frenzy));

        // Staying below does not re-fire after a manual switch-off
        tracker.deactivate(frenzy, &mut events);
        tracker.evaluate(&roster, 60, 3, Fixed::from_num(0.3), &mut events);
        assert!(!tracker.is_active(frenzy));

        // A new round re-arms it
        tracker.begin_round(false, &roster, 60, &mut events);
        tracker.evaluate(&roster, 60, 1, Fixed::from_num(0.3), &mut events);
        assert!(tracker.is_active(frenzy));
        assert_eq!(activated(&events), vec![frenzy, frenzy]);
    }

    #[test]
    fn test_once_trigger_fires_once_per_match() {
        let roster = roster(vec![ConditionDefinition::new(
            "last_stand",
            ConditionKind::RoundState,
        )
        .with_trigger(TriggerKind::HealthBelow(Fixed::from_num(0.25)), true)]);
        let mut tracker = ConditionTracker::new();
        let mut events = Vec::new();

        tracker.evaluate(&roster, 60, 1, Fixed::from_num(0.1), &mut events);
        tracker.begin_round(false, &roster, 60, &mut events);
        tracker.evaluate(&roster, 60, 1, Fixed::from_num(0.1), &mut events);

        assert_eq!(activated(&events).len(), 1);
        assert!(tracker.active().is_empty());
    }

    #[test]
    fn test_time_trigger() {
        let roster = roster(vec![ConditionDefinition::new(
            "sudden_death",
            ConditionKind::MatchModifier,
        )
        .with_trigger(TriggerKind::TimeElapsed(Fixed::from_num(0.5)), false)]);
        let id = roster.condition_id("sudden_death").unwrap();
        let mut tracker = ConditionTracker::new();
        let mut events = Vec::new();

        tracker.evaluate(&roster, 60, 29, Fixed::ONE, &mut events);
        assert!(!tracker.is_active(id));
        tracker.evaluate(&roster, 60, 30, Fixed::ONE, &mut events);
        assert!(tracker.is_active(id));
        tracker.evaluate(&roster, 60, 31, Fixed::ONE, &mut events);
        assert_eq!(activated(&events), vec![id]);
    }

    // =========================================================================
    // Duration
    // =========================================================================

    #[test]
    fn test_timed_condition_expires() {
        let roster = roster(vec![ConditionDefinition::new("flash", ConditionKind::Weather)
            .with_duration(StatusDuration::Seconds(Fixed::from_num(0.05)))]);
        let id = roster.condition_id("flash").unwrap();
        let definition = roster.condition_def(id).unwrap();
        let mut tracker = ConditionTracker::new();
        let mut events = Vec::new();

        // 0.05 s = 3 ticks
        assert!(tracker.activate(id, definition, 60, &mut events));
        tracker.tick(&mut events);
        tracker.tick(&mut events);
        assert!(tracker.is_active(id));

        tracker.tick(&mut events);
        assert!(!tracker.is_active(id));
        assert_eq!(
            events.last(),
            Some(&CombatEvent::ConditionEnded { condition: id })
        );
    }

    #[test]
    fn test_reactivation_restarts_duration() {
        let roster = roster(vec![ConditionDefinition::new("fog", ConditionKind::Weather)
            .with_duration(StatusDuration::Seconds(Fixed::ONE))]);
        let id = roster.condition_id("fog").unwrap();
        let definition = roster.condition_def(id).unwrap();
        let mut tracker = ConditionTracker::new();
        let mut events = Vec::new();

        tracker.activate(id, definition, 60, &mut events);
        for _ in 0..40 {
            tracker.tick(&mut events);
        }
        assert_eq!(tracker.active()[0].remaining_ticks, Some(20));

        assert!(!tracker.activate(id, definition, 60, &mut events));
        assert_eq!(tracker.active()[0].remaining_ticks, Some(60));
        assert_eq!(events.len(), 1);
        assert!(!tracker.deactivate(ConditionId(9), &mut events));
    }

    // =========================================================================
    // Modifiers
    // =========================================================================

    #[test]
    fn test_stat_fold_with_statuses() {
        let roster = roster(vec![
            ConditionDefinition::new("blood_moon", ConditionKind::MatchModifier)
                .with_fighter_modifier(FighterModifier::new(Target::All).with_stat(
                    StatKind::Damage,
                    ModifierOp::Multiply,
                    Fixed::from_num(2),
                )),
            ConditionDefinition::new("underdog", ConditionKind::RoundState)
                .with_fighter_modifier(
                    FighterModifier::new(Target::Named("tank".to_string())).with_stat(
                        StatKind::Damage,
                        ModifierOp::Add,
                        Fixed::from_num(0.5),
                    ),
                ),
        ]);
        let mut tracker = ConditionTracker::new();
        let mut events = Vec::new();
        for (id, definition) in roster.conditions() {
            tracker.activate(id, definition, 60, &mut events);
        }

        let striker_def = roster.fighter_id("striker").unwrap();
        let tank_def = roster.fighter_id("tank").unwrap();
        let mut striker = FighterRuntimeState::new(
            FighterId(0),
            striker_def,
            roster.fighter_def(striker_def).unwrap(),
            Vec2Fixed::ZERO,
            Facing::Right,
        );
        let tank = FighterRuntimeState::new(
            FighterId(1),
            tank_def,
            roster.fighter_def(tank_def).unwrap(),
            Vec2Fixed::ZERO,
            Facing::Left,
        );

        assert_eq!(
            tracker.stat_value(StatKind::Damage, Fixed::ONE, &striker, &roster),
            Fixed::from_num(2)
        );
        // 1 × 2 + 0.5
        assert_eq!(
            tracker.stat_value(StatKind::Damage, Fixed::ONE, &tank, &roster),
            Fixed::from_num(2.5)
        );
        assert_eq!(
            tracker.stat_value(StatKind::Speed, Fixed::ONE, &tank, &roster),
            Fixed::ONE
        );

        // Statuses fold on top: 1 × 2 × 1.5
        let rage = roster.status_id("rage").unwrap();
        striker.statuses.apply(
            FighterId(0),
            rage,
            roster.status_def(rage).unwrap(),
            1,
            None,
            60,
            &mut events,
        );
        assert_eq!(
            tracker.stat_value(StatKind::Damage, Fixed::ONE, &striker, &roster),
            Fixed::from_num(3)
        );
    }

    #[test]
    fn test_status_set_overrides_condition() {
        let roster = roster(vec![ConditionDefinition::new(
            "glass_cannon",
            ConditionKind::MatchModifier,
        )
        .with_fighter_modifier(FighterModifier::new(Target::All).with_stat(
            StatKind::Defense,
            ModifierOp::Set,
            Fixed::from_num(2),
        ))]);
        let mut tracker = ConditionTracker::new();
        let mut events = Vec::new();
        let id = roster.condition_id("glass_cannon").unwrap();
        tracker.activate(id, roster.condition_def(id).unwrap(), 60, &mut events);

        let mut fold = StatFold::new();
        tracker.fold_stat(StatKind::Defense, "striker", &roster, &mut fold);
        StatusEffectTracker::new().fold_stat(StatKind::Defense, &roster, &mut fold);
        assert_eq!(fold.resolve(Fixed::ONE), Fixed::from_num(2));

        fold.push(ModifierOp::Set, Fixed::from_num(0.5), 1);
        assert_eq!(fold.resolve(Fixed::ONE), Fixed::from_num(0.5));
    }

    #[test]
    fn test_move_modifiers() {
        let roster = roster(vec![
            ConditionDefinition::new("iron_skin", ConditionKind::StageEnvironment)
                .with_fighter_modifier(
                    FighterModifier::new(Target::Named("tank".to_string())).with_move(
                        MoveModifier::new(Target::Named("haymaker".to_string()))
                            .with_armor(6)
                            .with_damage(Fixed::from_num(1.5)),
                    ),
                ),
            ConditionDefinition::new("soft_hands", ConditionKind::Weather).with_fighter_modifier(
                FighterModifier::new(Target::All)
                    .with_move(MoveModifier::new(Target::All).with_damage(Fixed::from_num(0.5))),
            ),
        ]);
        let mut tracker = ConditionTracker::new();
        let mut events = Vec::new();

        // Nothing applies while inactive
        assert_eq!(
            tracker.move_damage_multiplier("tank", "haymaker", &roster),
            Fixed::ONE
        );

        for (id, definition) in roster.conditions() {
            tracker.activate(id, definition, 60, &mut events);
        }
        assert_eq!(
            tracker.move_damage_multiplier("tank", "haymaker", &roster),
            Fixed::from_num(0.75)
        );
        assert_eq!(
            tracker.move_damage_multiplier("striker", "haymaker", &roster),
            Fixed::from_num(0.5)
        );
        assert_eq!(tracker.extra_armor_frames("tank", "haymaker", &roster), 6);
        assert_eq!(tracker.extra_armor_frames("tank", "jab", &roster), 0);
        assert_eq!(tracker.extra_armor_frames("striker", "haymaker", &roster), 0);
    }

    #[test]
    fn test_global_modifiers_adjust_config() {
        let roster = roster(vec![ConditionDefinition::new("ice", ConditionKind::StageEnvironment)
            .with_global(GlobalProperty::Friction, ModifierOp::Set, Fixed::from_num(0.98))
            .with_global(GlobalProperty::Gravity, ModifierOp::Multiply, Fixed::from_num(0.5))
            .with_global(GlobalProperty::ChipDamage, ModifierOp::Add, Fixed::from_num(0.1))]);
        let config = CombatConfig::default();
        let mut tracker = ConditionTracker::new();
        let mut events = Vec::new();

        assert_eq!(tracker.adjust_config(&config, &roster), config);

        let ice = roster.condition_id("ice").unwrap();
        tracker.activate(ice, roster.condition_def(ice).unwrap(), 60, &mut events);
        let adjusted = tracker.adjust_config(&config, &roster);
        assert_eq!(adjusted.friction, Fixed::from_num(0.98));
        assert_eq!(
            adjusted.gravity,
            config.gravity.saturating_mul(Fixed::from_num(0.5))
        );
        assert_eq!(
            adjusted.chip_damage_fraction,
            config.chip_damage_fraction + Fixed::from_num(0.1)
        );
        assert_eq!(adjusted.air_control, config.air_control);
        assert_eq!(adjusted.tick_rate, config.tick_rate);
    }
}
