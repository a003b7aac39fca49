//! Timed, stacking status effects and the stat multipliers they feed.
//!
//! Effects are kept in application order. That order matters in one
//! place: when several active statuses `Set` the same stat, the most
//! recently applied one wins.
//!
//! # Modifier precedence
//!
//! For a stat with base value `b`:
//! - if any active modifier uses [`ModifierOp::Set`], the value is that of
//!   the last one applied, and nothing else contributes;
//! - otherwise the value is `b × Π(multiplyᵏ) + Σ(add × k)`, where `k` is
//!   the owning status' stack count.
//!
//! Active adaptive conditions feed the same [`StatFold`], ahead of the
//! statuses, with a stack count of one.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::data::{ModifierOp, Roster, StatKind, StatusDefinition, StatusDuration, StatusId};
use crate::events::{CombatEvent, EventSink};
use crate::fighter::{FighterId, Health};
use crate::math::{fixed_serde, Fixed};

/// A status currently affecting a fighter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveStatusEffect {
    /// Status definition.
    pub status: StatusId,
    /// Current stacks, `1..=max_stacks`.
    pub stacks: u32,
    /// Ticks left, or `None` when permanent.
    pub remaining_ticks: Option<u32>,
    /// Ticks until the next damage-over-time pulse.
    pub dot_countdown: u32,
}

impl ActiveStatusEffect {
    /// Whether the effect never expires on its own.
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        self.remaining_ticks.is_none()
    }
}

/// Outcome of a single status tick for one fighter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTickReport {
    /// Damage dealt to the owner by damage-over-time.
    #[serde(with = "fixed_serde")]
    pub damage: Fixed,
    /// Number of statuses that expired.
    pub expired: u32,
}

/// Accumulator for `Set`/`Multiply`/`Add` modifiers on one stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatFold {
    set_value: Option<Fixed>,
    multiplier: Fixed,
    additive: Fixed,
}

impl Default for StatFold {
    fn default() -> Self {
        Self::new()
    }
}

impl StatFold {
    /// A fold with no modifiers.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            set_value: None,
            multiplier: Fixed::ONE,
            additive: Fixed::ZERO,
        }
    }

    /// Add one modifier applied `stacks` times.
    pub fn push(&mut self, operation: ModifierOp, value: Fixed, stacks: u32) {
        match operation {
            ModifierOp::Set => self.set_value = Some(value),
            ModifierOp::Multiply => {
                for _ in 0..stacks {
                    self.multiplier = self.multiplier.saturating_mul(value);
                }
            }
            ModifierOp::Add => {
                self.additive = self
                    .additive
                    .saturating_add(value.saturating_mul(Fixed::saturating_from_num(stacks)));
            }
        }
    }

    /// The folded value for `base`.
    #[must_use]
    pub fn resolve(&self, base: Fixed) -> Fixed {
        self.set_value.unwrap_or_else(|| {
            base.saturating_mul(self.multiplier)
                .saturating_add(self.additive)
        })
    }
}

/// All statuses on one fighter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffectTracker {
    effects: Vec<ActiveStatusEffect>,
}

impl StatusEffectTracker {
    /// Create an empty tracker.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            effects: Vec::new(),
        }
    }

    /// Active effects in application order.
    #[must_use]
    pub fn effects(&self) -> &[ActiveStatusEffect] {
        &self.effects
    }

    /// Look up an active status.
    #[must_use]
    pub fn get(&self, status: StatusId) -> Option<&ActiveStatusEffect> {
        self.effects.iter().find(|effect| effect.status == status)
    }

    /// Current stacks of a status, zero when absent.
    #[must_use]
    pub fn stacks(&self, status: StatusId) -> u32 {
        self.get(status).map_or(0, |effect| effect.stacks)
    }

    /// Whether nothing is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Apply `stacks` of a status.
    ///
    /// A new status starts with `min(stacks, max_stacks)` stacks and the
    /// override duration if given, the base duration otherwise. An existing
    /// status gains stacks (up to the cap) only if it can stack, and has its
    /// countdown reset only if it refreshes on reapply.
    ///
    /// Returns the stack count after application.
    pub fn apply(
        &mut self,
        owner: FighterId,
        status: StatusId,
        definition: &StatusDefinition,
        stacks: u32,
        duration_override: Option<StatusDuration>,
        tick_rate: u32,
        sink: &mut dyn EventSink,
    ) -> u32 {
        let max_stacks = definition.max_stacks.max(1);
        let duration = duration_override
            .unwrap_or(definition.base_duration)
            .to_ticks(tick_rate);

        if let Some(effect) = self.effects.iter_mut().find(|e| e.status == status) {
            if definition.can_stack {
                let stacked = effect.stacks.saturating_add(stacks).min(max_stacks);
                if stacked != effect.stacks {
                    effect.stacks = stacked;
                    sink.emit(CombatEvent::StatusStacksChanged {
                        fighter: owner,
                        status,
                        stacks: stacked,
                    });
                }
            }
            if definition.refresh_on_reapply {
                effect.remaining_ticks = duration;
            }
            trace!(%owner, %status, stacks = effect.stacks, "status reapplied");
            return effect.stacks;
        }

        let initial = stacks.clamp(1, max_stacks);
        self.effects.push(ActiveStatusEffect {
            status,
            stacks: initial,
            remaining_ticks: duration,
            dot_countdown: 0,
        });
        sink.emit(CombatEvent::StatusApplied {
            fighter: owner,
            status,
            stacks: initial,
        });
        initial
    }

    /// Remove a status. Returns whether it was active.
    pub fn remove(&mut self, owner: FighterId, status: StatusId, sink: &mut dyn EventSink) -> bool {
        let Some(index) = self.effects.iter().position(|e| e.status == status) else {
            return false;
        };
        let removed = self.effects.remove(index);
        sink.emit(CombatEvent::StatusRemoved {
            fighter: owner,
            status,
            stacks: removed.stacks,
        });
        true
    }

    /// Remove every status without emitting events.
    pub fn clear(&mut self) {
        self.effects.clear();
    }

    /// Advance every status by one tick.
    ///
    /// Countdowns are decremented first; an effect that expires is removed
    /// and deals no damage that tick. Surviving damage-over-time effects
    /// pulse when their countdown is zero (so the first pulse lands on the
    /// first tick) and then wait `tick_interval` before the next one.
    pub fn tick(
        &mut self,
        owner: FighterId,
        roster: &Roster,
        tick_rate: u32,
        health: &mut Health,
        sink: &mut dyn EventSink,
    ) -> StatusTickReport {
        let mut report = StatusTickReport::default();
        let mut index = 0;

        while index < self.effects.len() {
            let effect = &mut self.effects[index];

            if let Some(remaining) = effect.remaining_ticks.as_mut() {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    let expired = self.effects.remove(index);
                    report.expired += 1;
                    sink.emit(CombatEvent::StatusRemoved {
                        fighter: owner,
                        status: expired.status,
                        stacks: expired.stacks,
                    });
                    continue;
                }
            }

            let dot = roster
                .status_def(effect.status)
                .and_then(|definition| definition.damage_over_time);
            if let Some(dot) = dot {
                if effect.dot_countdown == 0 {
                    let damage = dot
                        .damage_per_tick
                        .saturating_mul(Fixed::saturating_from_num(effect.stacks));
                    effect.dot_countdown = dot.interval_ticks(tick_rate);
                    let status = effect.status;
                    if !health.is_dead() && damage > Fixed::ZERO {
                        let change = health.apply_damage(damage);
                        report.damage += change.dealt;
                        sink.emit(CombatEvent::DamageOverTime {
                            fighter: owner,
                            status,
                            damage: change.dealt,
                        });
                        change.emit(owner, sink);
                    }
                }
                let effect = &mut self.effects[index];
                effect.dot_countdown = effect.dot_countdown.saturating_sub(1);
            }

            index += 1;
        }

        report
    }

    /// Push the `stat` modifiers of every active status into `fold`.
    pub fn fold_stat(&self, stat: StatKind, roster: &Roster, fold: &mut StatFold) {
        for effect in &self.effects {
            let Some(definition) = roster.status_def(effect.status) else {
                continue;
            };
            for modifier in definition.stat_modifiers.iter().filter(|m| m.stat == stat) {
                fold.push(modifier.operation, modifier.value, effect.stacks);
            }
        }
    }

    /// Fold the modifiers of every active status onto `base` for `stat`.
    #[must_use]
    pub fn stat_value(&self, stat: StatKind, base: Fixed, roster: &Roster) -> Fixed {
        let mut fold = StatFold::new();
        self.fold_stat(stat, roster, &mut fold);
        fold.resolve(base)
    }

    /// Whether an active status forbids starting moves.
    #[must_use]
    pub fn prevents_action(&self, roster: &Roster) -> bool {
        self.effects.iter().any(|effect| {
            roster
                .status_def(effect.status)
                .is_some_and(|definition| definition.kind.prevents_action())
        })
    }
}
