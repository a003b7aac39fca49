//! Runtime state of a fighter in a match.
//!
//! Definitions in [`crate::data`] never change during a match; everything
//! here does.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::combat_state::{CombatState, CombatStateMachine};
use crate::data::{FighterDefId, FighterDefinition};
use crate::events::{CombatEvent, EventSink};
use crate::hitbox::{HitboxSet, HurtboxInstance};
use crate::math::{fixed_serde, Fixed, Vec2Fixed};
use crate::movement::Body;
use crate::status::StatusEffectTracker;

/// Identifier of a fighter in a simulation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct FighterId(pub u32);

impl fmt::Display for FighterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fighter#{}", self.0)
    }
}

/// Which way a fighter faces. Definitions are authored facing right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Facing {
    /// +X.
    #[default]
    Right,
    /// -X.
    Left,
}

impl Facing {
    /// `1` facing right, `-1` facing left.
    #[must_use]
    pub fn sign(self) -> Fixed {
        match self {
            Facing::Right => Fixed::ONE,
            Facing::Left => -Fixed::ONE,
        }
    }

    /// Opposite direction.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Facing::Right => Facing::Left,
            Facing::Left => Facing::Right,
        }
    }
}

/// Fighter health. Never drops below zero; dies at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    #[serde(with = "fixed_serde")]
    current: Fixed,
    #[serde(with = "fixed_serde")]
    max: Fixed,
    dead: bool,
}

/// Result of [`Health::apply_damage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthChange {
    /// Health before.
    pub previous: Fixed,
    /// Health after.
    pub current: Fixed,
    /// Maximum health.
    pub max: Fixed,
    /// Damage actually removed.
    pub dealt: Fixed,
    /// This change was the killing blow.
    pub knocked_out: bool,
}

impl HealthChange {
    /// Emit `HealthChanged` (when anything changed) and `KnockedOut`.
    pub fn emit(&self, owner: FighterId, sink: &mut dyn EventSink) {
        if self.dealt != Fixed::ZERO {
            sink.emit(CombatEvent::HealthChanged {
                fighter: owner,
                previous: self.previous,
                current: self.current,
                max: self.max,
            });
        }
        if self.knocked_out {
            sink.emit(CombatEvent::KnockedOut { fighter: owner });
        }
    }
}

impl Health {
    /// Full health.
    #[must_use]
    pub const fn new(max: Fixed) -> Self {
        Self {
            current: max,
            max,
            dead: false,
        }
    }

    /// Current health.
    #[must_use]
    pub const fn current(&self) -> Fixed {
        self.current
    }

    /// Maximum health.
    #[must_use]
    pub const fn max(&self) -> Fixed {
        self.max
    }

    /// Current over maximum, in `[0, 1]`.
    #[must_use]
    pub fn fraction(&self) -> Fixed {
        if self.max <= Fixed::ZERO {
            return Fixed::ZERO;
        }
        self.current / self.max
    }

    /// Whether the fighter has been knocked out.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.dead
    }

    /// Remove up to `amount` health. Negative amounts are ignored.
    pub fn apply_damage(&mut self, amount: Fixed) -> HealthChange {
        let previous = self.current;
        if self.dead || amount <= Fixed::ZERO {
            return HealthChange {
                previous,
                current: previous,
                max: self.max,
                dealt: Fixed::ZERO,
                knocked_out: false,
            };
        }

        let dealt = amount.min(self.current);
        self.current -= dealt;
        let knocked_out = self.current <= Fixed::ZERO;
        if knocked_out {
            self.current = Fixed::ZERO;
            self.dead = true;
        }
        HealthChange {
            previous,
            current: self.current,
            max: self.max,
            dealt,
            knocked_out,
        }
    }

    /// Back to full health and alive.
    pub fn reset(&mut self) {
        *self = Self::new(self.max);
    }
}

/// Everything that changes about a fighter during a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterRuntimeState {
    /// Fighter id.
    pub id: FighterId,
    /// Definition the fighter was spawned from.
    pub definition: FighterDefId,
    /// Health.
    pub health: Health,
    /// Current facing.
    pub facing: Facing,
    /// Position and velocity.
    pub body: Body,
    /// Move execution and stun states.
    pub combat: CombatStateMachine,
    /// Active statuses.
    pub statuses: StatusEffectTracker,
    /// Hurtboxes in world space.
    pub hurtboxes: Vec<HurtboxInstance>,
    /// Hitboxes of the current move.
    pub hitboxes: HitboxSet,
    /// Frozen ticks left.
    pub hitstop: u32,
    /// Horizontal movement axis in `[-1, 1]`.
    #[serde(with = "fixed_serde")]
    pub move_input: Fixed,
    /// Jump requested this tick.
    pub jump_requested: bool,
    spawn_position: Vec2Fixed,
    spawn_facing: Facing,
}

impl FighterRuntimeState {
    /// Fresh fighter at full health.
    #[must_use]
    pub fn new(
        id: FighterId,
        definition_id: FighterDefId,
        definition: &FighterDefinition,
        position: Vec2Fixed,
        facing: Facing,
    ) -> Self {
        Self {
            id,
            definition: definition_id,
            health: Health::new(definition.max_health),
            facing,
            body: Body::at(position),
            combat: CombatStateMachine::new(id),
            statuses: StatusEffectTracker::new(),
            hurtboxes: HurtboxInstance::from_specs(&definition.hurtboxes, position, facing),
            hitboxes: HitboxSet::new(),
            hitstop: 0,
            move_input: Fixed::ZERO,
            jump_requested: false,
            spawn_position: position,
            spawn_facing: facing,
        }
    }

    /// Current combat state.
    #[must_use]
    pub const fn state(&self) -> CombatState {
        self.combat.state()
    }

    /// Whether hitboxes can currently strike this fighter.
    #[must_use]
    pub fn is_vulnerable(&self) -> bool {
        !self.health.is_dead() && !self.combat.is_invincible()
    }

    /// Whether the fighter is frozen by hitstop.
    #[must_use]
    pub const fn in_hitstop(&self) -> bool {
        self.hitstop > 0
    }

    /// Freeze for `frames` ticks. Longer freezes win.
    pub fn add_hitstop(&mut self, frames: u32) {
        self.hitstop = self.hitstop.max(frames);
    }

    /// Move hurtboxes with the body.
    pub fn sync_hurtboxes(&mut self) {
        for hurtbox in &mut self.hurtboxes {
            hurtbox.follow(self.body.position, self.facing);
        }
    }

    /// Back to spawn state for a new round.
    pub fn reset(&mut self) {
        self.health.reset();
        self.facing = self.spawn_facing;
        self.body = Body::at(self.spawn_position);
        self.combat.reset();
        self.statuses.clear();
        self.hitboxes.clear();
        self.hitstop = 0;
        self.move_input = Fixed::ZERO;
        self.jump_requested = false;
        self.sync_hurtboxes();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_floor_and_single_knockout() {
        let mut health = Health::new(Fixed::from_num(10));
        let first = health.apply_damage(Fixed::from_num(25));
        assert_eq!(first.dealt, Fixed::from_num(10));
        assert!(first.knocked_out);
        assert_eq!(health.current(), Fixed::ZERO);

        let second = health.apply_damage(Fixed::from_num(5));
        assert!(!second.knocked_out);
        assert_eq!(second.dealt, Fixed::ZERO);
        assert_eq!(health.current(), Fixed::ZERO);
    }

    #[test]
    fn test_health_change_events() {
        let mut health = Health::new(Fixed::from_num(10));
        let mut events = Vec::new();
        health.apply_damage(Fixed::from_num(4)).emit(FighterId(1), &mut events);
        assert_eq!(
            events,
            vec![CombatEvent::HealthChanged {
                fighter: FighterId(1),
                previous: Fixed::from_num(10),
                current: Fixed::from_num(6),
                max: Fixed::from_num(10),
            }]
        );

        health.apply_damage(Fixed::from_num(6)).emit(FighterId(1), &mut events);
        assert_eq!(events.len(), 3);
        assert_eq!(events[2], CombatEvent::KnockedOut { fighter: FighterId(1) });

        health.apply_damage(Fixed::from_num(6)).emit(FighterId(1), &mut events);
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn test_fraction_and_reset() {
        let mut health = Health::new(Fixed::from_num(100));
        health.apply_damage(Fixed::from_num(40));
        assert_eq!(health.fraction(), Fixed::from_num(0.6));

        health.apply_damage(Fixed::from_num(100));
        assert_eq!(health.fraction(), Fixed::ZERO);
        health.reset();
        assert!(!health.is_dead());
        assert_eq!(health.fraction(), Fixed::ONE);
    }

    #[test]
    fn test_facing() {
        assert_eq!(Facing::Right.sign(), Fixed::ONE);
        assert_eq!(Facing::Left.sign(), -Fixed::ONE);
        assert_eq!(Facing::Left.flipped(), Facing::Right);
    }

    #[test]
    fn test_reset_restores_spawn() {
        let definition = FighterDefinition::new("dummy", "jab", "haymaker");
        let mut fighter = FighterRuntimeState::new(
            FighterId(0),
            FighterDefId(0),
            &definition,
            Vec2Fixed::from_ints(-3, 0),
            Facing::Right,
        );
        fighter.body.position = Vec2Fixed::from_ints(4, 2);
        fighter.facing = Facing::Left;
        fighter.health.apply_damage(Fixed::from_num(30));
        fighter.hitstop = 4;

        fighter.reset();
        assert_eq!(fighter.body.position, Vec2Fixed::from_ints(-3, 0));
        assert_eq!(fighter.facing, Facing::Right);
        assert_eq!(fighter.health.current(), definition.max_health);
        assert_eq!(fighter.hurtboxes[0].bounds.center, Vec2Fixed::from_ints(-3, 1));
        assert!(!fighter.in_hitstop());
    }
}
