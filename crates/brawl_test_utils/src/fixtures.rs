//! Test fixtures and helpers.
//!
//! A small reference roster plus pre-built duels, so tests across crates
//! fight with the same frame data.
//!
//! Geometry: the default body hurtbox spans `x ± 0.5` and the reference
//! attacks reach `x + 0.5 .. x + 1.5`, so two fighters [`CLOSE`] apart are in
//! range and two fighters [`FAR`] apart are not.

use brawl_core::config::CombatConfig;
use brawl_core::data::{
    CancelRules, CancelWindow, FighterDefId, FighterDefinition, HitboxSpec, HurtboxSpec,
    ModifierOp, MoveCategory, MoveDefinition, Roster, RosterData, StatKind, StatusApplication,
    StatusDefinition, StatusDuration, StatusKind,
};
use brawl_core::fighter::{Facing, FighterId};
use brawl_core::math::{Fixed, Vec2Fixed};
use brawl_core::round::Match;
use brawl_core::simulation::Simulation;
use fixed::types::I32F32;

/// Gap at which reference attacks connect.
pub const CLOSE: i32 = 1;

/// Gap at which nothing connects.
pub const FAR: i32 = 4;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

fn reach() -> HitboxSpec {
    HitboxSpec {
        offset: Vec2Fixed::from_ints(1, 1),
        size: Vec2Fixed::from_ints(1, 1),
        ..HitboxSpec::default()
    }
}

/// Reference moves.
///
/// - `jab`: light, 4/2/8, 10 damage, 12 hitstun, 6 blockstun, 2 hitstop
/// - `kick`: heavy, 8/3/14, 20 damage, knockback
/// - `flurry`: special, 2/6/6 with two overlapping hitboxes, the second live on active frames `[3, 5)`
/// - `chain`: light, 4/10/8, cancellable into anything on frames 6..=12
/// - `venom`: special, 3/2/10, poisons on hit
/// - `bulwark`: heavy, 10/2/10 with armor on its first 12 frames
/// - `war_cry`: special, 1/1/4, enrages the user; its hitbox is far overhead
#[must_use]
pub fn reference_moves() -> Vec<MoveDefinition> {
    vec![
        MoveDefinition::new("jab", MoveCategory::LightAttack)
            .with_frames(4, 2, 8)
            .with_damage(fixed(10))
            .with_stun(2, 12, 6)
            .with_hitbox(reach()),
        MoveDefinition::new("kick", MoveCategory::HeavyAttack)
            .with_frames(8, 3, 14)
            .with_damage(fixed(20))
            .with_knockback(fixed(4), Vec2Fixed::new(Fixed::ONE, fixed_f(0.5)))
            .with_stun(4, 18, 10)
            .with_hitbox(reach()),
        MoveDefinition::new("flurry", MoveCategory::Special)
            .with_frames(2, 6, 6)
            .with_damage(fixed(6))
            .with_stun(0, 10, 4)
            .with_hitbox(HitboxSpec {
                name: "inner".to_string(),
                ..reach()
            })
            .with_hitbox(HitboxSpec {
                name: "outer".to_string(),
                active_start_frame: 3,
                active_end_frame: Some(5),
                ..reach()
            }),
        MoveDefinition::new("chain", MoveCategory::LightAttack)
            .with_frames(4, 10, 8)
            .with_damage(fixed(8))
            .with_stun(0, 12, 6)
            .with_cancel(
                CancelWindow::new(6, 12),
                CancelRules {
                    into_other: true,
                    ..CancelRules::default()
                },
            )
            .with_hitbox(reach()),
        MoveDefinition::new("venom", MoveCategory::Special)
            .with_frames(3, 2, 10)
            .with_damage(fixed(2))
            .with_stun(0, 8, 4)
            .with_status_on_hit(StatusApplication::new("poison", 1))
            .with_hitbox(reach()),
        MoveDefinition::new("bulwark", MoveCategory::HeavyAttack)
            .with_frames(10, 2, 10)
            .with_damage(fixed(25))
            .with_stun(4, 20, 10)
            .with_protection(12, 0)
            .with_hitbox(reach()),
        MoveDefinition::new("war_cry", MoveCategory::Special)
            .with_frames(1, 1, 4)
            .with_status_on_self(StatusApplication::new("rage", 1))
            .with_hitbox(HitboxSpec {
                offset: Vec2Fixed::from_ints(0, 8),
                ..HitboxSpec::default()
            }),
    ]
}

/// Reference statuses: stacking `poison` (max 3, 1 damage per stack every
/// half second, 4 s) and `rage` (+50 % damage, 3 s).
#[must_use]
pub fn reference_statuses() -> Vec<StatusDefinition> {
    vec![
        StatusDefinition::new("poison", StatusKind::Poison)
            .with_stacking(3)
            .with_duration(StatusDuration::Seconds(fixed(4)))
            .with_dot(Fixed::ONE, fixed_f(0.5)),
        StatusDefinition::new("rage", StatusKind::Buff)
            .with_duration(StatusDuration::Seconds(fixed(3)))
            .with_modifier(StatKind::Damage, ModifierOp::Multiply, fixed_f(1.5)),
    ]
}

/// Reference fighters: an all-rounder `striker` and a heavy `tank` with a
/// padded head hurtbox that takes 20 % extra damage.
#[must_use]
pub fn reference_fighters() -> Vec<FighterDefinition> {
    vec![
        FighterDefinition::new("striker", "jab", "kick")
            .with_special("flurry")
            .with_special("venom")
            .with_special("war_cry")
            .with_special("chain"),
        FighterDefinition::new("tank", "jab", "bulwark")
            .with_max_health(fixed(150))
            .with_weight(fixed(2))
            .with_hurtboxes(vec![
                HurtboxSpec::new("body", Vec2Fixed::from_ints(0, 1), Vec2Fixed::from_ints(1, 2)),
                HurtboxSpec::new("head", Vec2Fixed::from_ints(0, 3), Vec2Fixed::from_ints(1, 1))
                    .with_damage_multiplier(fixed_f(1.2)),
            ]),
    ]
}

/// Authored form of the reference roster.
#[must_use]
pub fn reference_roster_data() -> RosterData {
    RosterData {
        moves: reference_moves(),
        statuses: reference_statuses(),
        fighters: reference_fighters(),
        conditions: vec![],
    }
}

/// The reference roster, validated.
///
/// # Panics
///
/// Panics if the reference data fails validation.
#[must_use]
pub fn reference_roster() -> Roster {
    Roster::load(reference_roster_data()).expect("reference roster is valid")
}

/// The reference roster written out as RON, the way a designer would
/// author it on disk.
///
/// # Panics
///
/// Panics if the roster cannot be serialized.
#[must_use]
pub fn reference_roster_ron() -> String {
    ron::ser::to_string_pretty(&reference_roster_data(), ron::ser::PrettyConfig::default())
        .expect("reference roster serializes")
}

/// Look up a reference fighter definition by name.
///
/// # Panics
///
/// Panics if no such fighter exists.
#[must_use]
pub fn fighter_def(roster: &Roster, name: &str) -> FighterDefId {
    roster
        .fighter_id(name)
        .unwrap_or_else(|| panic!("no fighter named {name}"))
}

/// Two fighters facing each other `gap` units apart on the ground.
#[derive(Debug, Clone)]
pub struct Duel {
    /// The simulation.
    pub sim: Simulation,
    /// Fighter on the left, facing right.
    pub left: FighterId,
    /// Fighter on the right, facing left.
    pub right: FighterId,
}

impl Duel {
    /// Two strikers with the default config.
    #[must_use]
    pub fn new(gap: i32) -> Self {
        Self::with_config(gap, CombatConfig::default())
    }

    /// Two strikers with a custom config.
    #[must_use]
    pub fn with_config(gap: i32, config: CombatConfig) -> Self {
        Self::between("striker", "striker", gap, config)
    }

    /// Two named reference fighters.
    ///
    /// # Panics
    ///
    /// Panics if either name is not a reference fighter.
    #[must_use]
    pub fn between(left: &str, right: &str, gap: i32, config: CombatConfig) -> Self {
        let roster = reference_roster();
        let left_def = fighter_def(&roster, left);
        let right_def = fighter_def(&roster, right);
        let mut sim = Simulation::new(roster, config);
        let left = sim
            .spawn_fighter(left_def, Vec2Fixed::ZERO, Facing::Right)
            .expect("reference fighter spawns");
        let right = sim
            .spawn_fighter(right_def, Vec2Fixed::from_ints(gap, 0), Facing::Left)
            .expect("reference fighter spawns");
        Self { sim, left, right }
    }

    /// Wrap the simulation in a match.
    #[must_use]
    pub fn into_match(self) -> (Match, FighterId, FighterId) {
        (Match::new(self.sim), self.left, self.right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_roster_loads() {
        let roster = reference_roster();
        assert_eq!(roster.fighter_count(), 2);
        assert!(roster.move_id("flurry").is_some());
        assert!(roster.status_id("poison").is_some());
    }

    #[test]
    fn test_reference_roster_ron_loads() {
        let roster = Roster::from_ron_str(&reference_roster_ron(), "reference.ron").unwrap();
        assert_eq!(roster.fighter_count(), 2);
        assert!(roster.move_id("war_cry").is_some());
    }

    #[test]
    fn test_duel_layout() {
        let duel = Duel::new(CLOSE);
        assert_eq!(duel.sim.fighter_count(), 2);
        let right = duel.sim.fighter(duel.right).unwrap();
        assert_eq!(right.body.position.x, fixed(CLOSE));
        assert_eq!(right.facing, Facing::Left);
    }
}
