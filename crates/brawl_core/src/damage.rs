//! Damage, knockback and the consequences of a landed hit.
//!
//! A contact found by [`crate::hitbox::HitboxResolver`] is routed by the
//! target's state:
//! - `Parrying`: no damage; the attacker is staggered.
//! - `Blocking`: blockstun, reduced knockback, optional chip damage.
//! - anything else: full damage, knockback, hitstun, on-hit statuses,
//!   with armor able to absorb the stun.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::combat_state::CombatState;
use crate::condition::ConditionTracker;
use crate::config::CombatConfig;
use crate::data::{
    FighterDefinition, HitboxSpec, MoveCategory, MoveDefinition, Roster, StatKind,
    StatusApplication,
};
use crate::events::{CombatEvent, EventSink};
use crate::fighter::FighterRuntimeState;
use crate::hitbox::Contact;
use crate::math::{fixed_serde, Fixed, Vec2Fixed};

/// Calculate the damage of a hit.
///
/// `move.damage × hitbox × attacker base × hurtbox × attacker modifiers`,
/// then scaled by the target's incoming damage multiplier. Attacker
/// modifiers are the folded damage stat times any condition move multiplier.
#[must_use]
pub fn calculate_damage(
    definition: &MoveDefinition,
    hitbox: &HitboxSpec,
    attacker: &FighterDefinition,
    hurtbox_multiplier: Fixed,
    attacker_multiplier: Fixed,
    incoming_multiplier: Fixed,
) -> Fixed {
    // Step 1: Authored damage of this hitbox
    let base = definition.damage.saturating_mul(hitbox.damage_multiplier);

    // Step 2: Attacker multipliers
    let outgoing = base
        .saturating_mul(attacker.base_damage_multiplier)
        .saturating_mul(attacker_multiplier);

    // Step 3: Where it landed and who took it
    let damage = outgoing
        .saturating_mul(hurtbox_multiplier)
        .saturating_mul(incoming_multiplier);

    damage.max(Fixed::ZERO)
}

/// Calculate the knockback impulse of a hit.
///
/// Directions are authored for a right-facing attacker and mirrored so the
/// target is always pushed away. Heavier targets move less.
#[must_use]
pub fn calculate_knockback(
    definition: &MoveDefinition,
    hitbox: &HitboxSpec,
    attacker_x: Fixed,
    target_x: Fixed,
    attacker_facing_sign: Fixed,
    target_weight: Fixed,
) -> Vec2Fixed {
    // Step 1: Direction, overridable per hitbox
    let direction = hitbox
        .knockback_direction_override
        .unwrap_or(definition.knockback_direction);

    // Step 2: Magnitude
    let impulse = direction.scale(
        definition
            .knockback_force
            .saturating_mul(hitbox.knockback_multiplier),
    );

    // Step 3: Push away from the attacker
    let pushes_left = if attacker_x == target_x {
        attacker_facing_sign < Fixed::ZERO
    } else {
        attacker_x > target_x
    };
    let impulse = if pushes_left {
        impulse.mirror_x()
    } else {
        impulse
    };

    // Step 4: Weight
    impulse.div_scalar(target_weight)
}

/// How a contact was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitOutcome {
    /// The hit landed.
    Hit {
        /// Damage dealt.
        #[serde(with = "fixed_serde")]
        damage: Fixed,
        /// The hit absorbed by armor rather than stunning.
        armored: bool,
        /// The target was knocked out.
        knocked_out: bool,
    },
    /// The target blocked.
    Blocked {
        /// Damage dealt through the block.
        #[serde(with = "fixed_serde")]
        chip_damage: Fixed,
        /// The chip damage knocked the target out.
        knocked_out: bool,
    },
    /// The target parried; the attacker is staggered.
    Parried,
}

/// Applies the consequences of contacts.
pub struct DamageResolver<'a> {
    roster: &'a Roster,
    config: &'a CombatConfig,
    conditions: &'a ConditionTracker,
}

impl<'a> DamageResolver<'a> {
    /// Create a resolver over a loaded roster.
    #[must_use]
    pub const fn new(
        roster: &'a Roster,
        config: &'a CombatConfig,
        conditions: &'a ConditionTracker,
    ) -> Self {
        Self {
            roster,
            config,
            conditions,
        }
    }

    /// Resolve one contact.
    ///
    /// Returns `None` and emits a diagnostic when the contact refers to a
    /// move, hitbox, hurtbox or fighter definition that does not exist.
    pub fn resolve(
        &self,
        contact: &Contact,
        attacker: &mut FighterRuntimeState,
        target: &mut FighterRuntimeState,
        sink: &mut dyn EventSink,
    ) -> Option<HitOutcome> {
        let Some(definition) = self.roster.move_def(contact.move_id) else {
            diagnostic(sink, attacker, format!("unknown move {}", contact.move_id));
            return None;
        };
        let Some(hitbox) = definition.hitboxes.get(contact.hitbox_index) else {
            diagnostic(
                sink,
                attacker,
                format!("{} has no hitbox {}", definition.name, contact.hitbox_index),
            );
            return None;
        };
        let (Some(attacker_def), Some(target_def)) = (
            self.roster.fighter_def(attacker.definition),
            self.roster.fighter_def(target.definition),
        ) else {
            diagnostic(sink, attacker, "unknown fighter definition".to_string());
            return None;
        };
        let Some(hurtbox) = target.hurtboxes.get(contact.hurtbox_index) else {
            diagnostic(
                sink,
                target,
                format!("no hurtbox {}", contact.hurtbox_index),
            );
            return None;
        };
        let hurtbox_name = hurtbox.name.clone();
        let hurtbox_multiplier = hurtbox.damage_multiplier;

        let attacker_multiplier = self
            .conditions
            .stat_value(StatKind::Damage, Fixed::ONE, attacker, self.roster)
            .saturating_mul(self.conditions.move_damage_multiplier(
                &attacker_def.name,
                &definition.name,
                self.roster,
            ));
        let incoming_multiplier = self
            .conditions
            .stat_value(
                StatKind::Defense,
                target_def.base_defense_multiplier,
                target,
                self.roster,
            );
        let damage = calculate_damage(
            definition,
            hitbox,
            attacker_def,
            hurtbox_multiplier,
            attacker_multiplier,
            incoming_multiplier,
        );
        let knockback = calculate_knockback(
            definition,
            hitbox,
            attacker.body.position.x,
            target.body.position.x,
            attacker.facing.sign(),
            target_def.weight,
        );

        let outcome = match target.state() {
            CombatState::Parrying => self.parry(contact, attacker, target, sink),
            CombatState::Blocking => {
                self.block(contact, definition, damage, knockback, target, sink)
            }
            _ => self.hit(
                contact,
                definition,
                target_def,
                damage,
                knockback,
                hurtbox_name,
                target,
                sink,
            ),
        };

        if !matches!(outcome, HitOutcome::Parried) && definition.hitstop_frames > 0 {
            attacker.add_hitstop(definition.hitstop_frames);
            target.add_hitstop(definition.hitstop_frames);
            sink.emit(CombatEvent::HitstopStarted {
                attacker: attacker.id,
                target: target.id,
                frames: definition.hitstop_frames,
            });
        }

        debug!(
            attacker = %attacker.id,
            target = %target.id,
            move_name = %definition.name,
            ?outcome,
            "contact resolved"
        );
        Some(outcome)
    }

    fn parry(
        &self,
        contact: &Contact,
        attacker: &mut FighterRuntimeState,
        target: &FighterRuntimeState,
        sink: &mut dyn EventSink,
    ) -> HitOutcome {
        sink.emit(CombatEvent::Parried {
            attacker: attacker.id,
            defender: target.id,
            move_id: contact.move_id,
        });
        if attacker
            .combat
            .enter_stagger(self.config.parry_stagger_frames, sink)
            .is_some()
        {
            attacker.hitboxes.deactivate(attacker.id, sink);
        }
        HitOutcome::Parried
    }

    fn block(
        &self,
        contact: &Contact,
        definition: &MoveDefinition,
        damage: Fixed,
        knockback: Vec2Fixed,
        target: &mut FighterRuntimeState,
        sink: &mut dyn EventSink,
    ) -> HitOutcome {
        let chip_damage = damage.saturating_mul(self.config.chip_damage_fraction);
        let change = target.health.apply_damage(chip_damage);
        target
            .body
            .apply_impulse(knockback.scale(self.config.block_knockback_factor));

        sink.emit(CombatEvent::Blocked {
            attacker: contact.attacker,
            target: target.id,
            move_id: contact.move_id,
            chip_damage: change.dealt,
        });
        change.emit(target.id, sink);

        if change.knocked_out {
            target.combat.halt(sink);
            target.hitboxes.deactivate(target.id, sink);
        } else {
            target.combat.enter_stun(definition.blockstun_frames, sink);
        }

        HitOutcome::Blocked {
            chip_damage: change.dealt,
            knocked_out: change.knocked_out,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn hit(
        &self,
        contact: &Contact,
        definition: &MoveDefinition,
        target_def: &FighterDefinition,
        damage: Fixed,
        knockback: Vec2Fixed,
        hurtbox: String,
        target: &mut FighterRuntimeState,
        sink: &mut dyn EventSink,
    ) -> HitOutcome {
        let state_before = target.state();
        let armored = target.combat.is_armored();
        let armor_breakable = target.combat.current_move().is_some_and(|current| {
            current.armor_frames > 0
                && self
                    .roster
                    .move_def(current.move_id)
                    .map_or(true, |m| m.armor_breaks_on_heavy)
        });

        let change = target.health.apply_damage(damage);
        target.body.apply_impulse(knockback);
        sink.emit(CombatEvent::DamageDealt {
            attacker: contact.attacker,
            target: target.id,
            move_id: contact.move_id,
            hitbox: contact.hitbox_index,
            hurtbox,
            damage: change.dealt,
            knockback,
        });
        change.emit(target.id, sink);

        if change.knocked_out {
            target.combat.halt(sink);
            target.hitboxes.deactivate(target.id, sink);
            return HitOutcome::Hit {
                damage: change.dealt,
                armored: false,
                knocked_out: true,
            };
        }

        let mut absorbed = false;
        let interrupted = if definition.category == MoveCategory::HeavyAttack
            && state_before == CombatState::Active
            && armor_breakable
        {
            target
                .combat
                .enter_armor_broken(self.config.armor_break_frames, sink)
        } else if armored {
            absorbed = true;
            let hits = target.combat.record_armor_hit();
            sink.emit(CombatEvent::ArmorAbsorbed {
                attacker: contact.attacker,
                defender: target.id,
                hits,
            });
            if hits >= target_def.armor_break_threshold {
                target
                    .combat
                    .enter_armor_broken(self.config.armor_break_frames, sink)
            } else {
                None
            }
        } else {
            target.combat.enter_stun(definition.hitstun_frames, sink)
        };
        if interrupted.is_some() {
            target.hitboxes.deactivate(target.id, sink);
        }

        apply_statuses(
            target,
            &definition.status_effects_on_hit,
            self.roster,
            self.config,
            sink,
        );

        HitOutcome::Hit {
            damage: change.dealt,
            armored: absorbed,
            knocked_out: false,
        }
    }
}

/// Apply a list of authored status applications to `fighter`.
///
/// Unknown status names are skipped with a diagnostic.
pub fn apply_statuses(
    fighter: &mut FighterRuntimeState,
    applications: &[StatusApplication],
    roster: &Roster,
    config: &CombatConfig,
    sink: &mut dyn EventSink,
) {
    if fighter.health.is_dead() {
        return;
    }
    for application in applications {
        let resolved = roster
            .status_id(&application.status)
            .and_then(|id| roster.status_def(id).map(|definition| (id, definition)));
        let Some((status, definition)) = resolved else {
            diagnostic(
                sink,
                fighter,
                format!("unknown status {}", application.status),
            );
            continue;
        };
        fighter.statuses.apply(
            fighter.id,
            status,
            definition,
            application.stacks,
            application.duration,
            config.tick_rate,
            sink,
        );
    }
}

fn diagnostic(sink: &mut dyn EventSink, fighter: &FighterRuntimeState, reason: String) {
    warn!(fighter = %fighter.id, %reason, "combat operation rejected");
    sink.emit(CombatEvent::Diagnostic {
        fighter: Some(fighter.id),
        reason,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{
        ConditionDefinition, ConditionKind, FighterDefId, FighterModifier, HurtboxSpec, ModifierOp,
        MoveModifier, RosterData, StatusDefinition, StatusKind, Target,
    };
    use crate::fighter::{Facing, FighterId};

    const ATTACKER: FighterId = FighterId(0);
    const TARGET: FighterId = FighterId(1);

    fn jab() -> MoveDefinition {
        MoveDefinition::new("jab", MoveCategory::LightAttack)
            .with_frames(4, 2, 8)
            .with_damage(Fixed::from_num(10))
            .with_knockback(Fixed::from_num(4), Vec2Fixed::RIGHT)
            .with_stun(0, 12, 6)
            .with_hitbox(HitboxSpec {
                offset: Vec2Fixed::from_ints(1, 1),
                damage_multiplier: Fixed::from_num(1.5),
                ..HitboxSpec::default()
            })
            .with_status_on_hit(StatusApplication::new("bleed", 1))
    }

    fn haymaker() -> MoveDefinition {
        MoveDefinition::new("haymaker", MoveCategory::HeavyAttack)
            .with_frames(8, 3, 14)
            .with_damage(Fixed::from_num(20))
            .with_stun(4, 20, 10)
            .with_hitbox(HitboxSpec::default())
    }

    fn armored_charge() -> MoveDefinition {
        MoveDefinition::new("charge", MoveCategory::Special)
            .with_frames(6, 6, 10)
            .with_damage(Fixed::from_num(8))
            .with_protection(12, 0)
            .with_hitbox(HitboxSpec::default())
    }

    fn roster() -> Roster {
        Roster::load(RosterData {
            moves: vec![jab(), haymaker(), armored_charge()],
            statuses: vec![StatusDefinition::new("bleed", StatusKind::Debuff)],
            fighters: vec![FighterDefinition::new("brawler", "jab", "haymaker")
                .with_special("charge")
                .with_hurtboxes(vec![HurtboxSpec::new(
                    "head",
                    Vec2Fixed::from_ints(0, 2),
                    Vec2Fixed::from_ints(1, 1),
                )
                .with_damage_multiplier(Fixed::from_num(1.2))])],
            conditions: vec![ConditionDefinition::new("blood_moon", ConditionKind::MatchModifier)
                .with_fighter_modifier(
                    FighterModifier::new(Target::All)
                        .with_stat(StatKind::Damage, ModifierOp::Multiply, Fixed::from_num(2))
                        .with_move(
                            MoveModifier::new(Target::Named("jab".to_string()))
                                .with_damage(Fixed::from_num(1.5)),
                        ),
                )],
        })
        .unwrap()
    }

    fn fighters() -> (FighterRuntimeState, FighterRuntimeState) {
        let roster = roster();
        let definition = roster.fighter_def(FighterDefId(0)).unwrap();
        (
            FighterRuntimeState::new(
                ATTACKER,
                FighterDefId(0),
                definition,
                Vec2Fixed::ZERO,
                Facing::Right,
            ),
            FighterRuntimeState::new(
                TARGET,
                FighterDefId(0),
                definition,
                Vec2Fixed::from_ints(1, 0),
                Facing::Left,
            ),
        )
    }

    fn contact(roster: &Roster, name: &str) -> Contact {
        Contact {
            attacker: ATTACKER,
            target: TARGET,
            move_id: roster.move_id(name).unwrap(),
            hitbox_index: 0,
            hurtbox_index: 0,
        }
    }

    fn start(fighter: &mut FighterRuntimeState, roster: &Roster, name: &str, frames: u32) {
        let id = roster.move_id(name).unwrap();
        let mut events = Vec::new();
        fighter
            .combat
            .start_move(id, roster.move_def(id).unwrap(), &mut events);
        for _ in 0..frames {
            fighter.combat.advance(&mut events);
        }
    }

    #[test]
    fn test_damage_formula() {
        let roster = roster();
        let jab = roster.move_def(roster.move_id("jab").unwrap()).unwrap();
        let attacker = roster.fighter_def(FighterDefId(0)).unwrap();
        let damage = calculate_damage(
            jab,
            &jab.hitboxes[0],
            attacker,
            Fixed::from_num(1.2),
            Fixed::ONE,
            Fixed::ONE,
        );
        // 10 × 1.5 × 1.0 × 1.2 = 18
        assert!((damage - Fixed::from_num(18)).abs() < Fixed::from_num(0.0001));
    }

    #[test]
    fn test_knockback_pushes_away_and_scales_by_weight() {
        let jab = jab();
        let toward_right = calculate_knockback(
            &jab,
            &jab.hitboxes[0],
            Fixed::ZERO,
            Fixed::ONE,
            Fixed::ONE,
            Fixed::from_num(2),
        );
        assert_eq!(toward_right, Vec2Fixed::from_ints(2, 0));

        let toward_left = calculate_knockback(
            &jab,
            &jab.hitboxes[0],
            Fixed::from_num(3),
            Fixed::ONE,
            Fixed::ONE,
            Fixed::ONE,
        );
        assert_eq!(toward_left, Vec2Fixed::from_ints(-4, 0));
    }

    #[test]
    fn test_extreme_knockback_saturates() {
        let launcher = jab().with_knockback(Fixed::from_num(60_000), Vec2Fixed::RIGHT);
        let mut hitbox = launcher.hitboxes[0].clone();
        hitbox.knockback_multiplier = Fixed::from_num(60_000);

        let away = calculate_knockback(
            &launcher,
            &hitbox,
            Fixed::from_num(3),
            Fixed::ONE,
            Fixed::ONE,
            Fixed::from_num(0.5),
        );
        assert_eq!(away.x, Fixed::MIN);
        assert_eq!(away.y, Fixed::ZERO);

        let mut target = fighters().1;
        target.body.apply_impulse(away);
        target.body.apply_impulse(away);
        assert_eq!(target.body.velocity.x, Fixed::MIN);
    }

    #[test]
    fn test_hit_stuns_and_applies_status() {
        let roster = roster();
        let config = CombatConfig::default();
        let (mut attacker, mut target) = fighters();
        let mut events = Vec::new();

        let outcome = DamageResolver::new(&roster, &config, &ConditionTracker::new())
            .resolve(&contact(&roster, "jab"), &mut attacker, &mut target, &mut events)
            .unwrap();

        assert!(matches!(outcome, HitOutcome::Hit { knocked_out: false, .. }));
        assert_eq!(target.state(), CombatState::Stunned);
        assert_eq!(target.combat.countdown(), 12);
        assert!(target.body.velocity.x > Fixed::ZERO);
        assert_eq!(target.statuses.effects().len(), 1);
        assert!(!attacker.in_hitstop());
    }

    #[test]
    fn test_condition_modifiers_scale_hit() {
        let roster = roster();
        let config = CombatConfig::default();
        let (mut attacker, mut target) = fighters();
        let mut conditions = ConditionTracker::new();
        let mut events = Vec::new();
        let moon = roster.condition_id("blood_moon").unwrap();
        conditions.activate(moon, roster.condition_def(moon).unwrap(), 60, &mut events);

        let outcome = DamageResolver::new(&roster, &config, &conditions)
            .resolve(&contact(&roster, "jab"), &mut attacker, &mut target, &mut events)
            .unwrap();

        // 18 base, × 2 damage stat, × 1.5 on the jab
        let HitOutcome::Hit { damage, .. } = outcome else {
            panic!("expected a hit, got {outcome:?}");
        };
        assert!((damage - Fixed::from_num(54)).abs() < Fixed::from_num(0.0001));

        // Moves the condition does not name only get the stat
        let (mut attacker, mut target) = fighters();
        let HitOutcome::Hit { damage, .. } = DamageResolver::new(&roster, &config, &conditions)
            .resolve(&contact(&roster, "haymaker"), &mut attacker, &mut target, &mut events)
            .unwrap()
        else {
            panic!("expected a hit");
        };
        // 20 × 1.2 × 2
        assert!((damage - Fixed::from_num(48)).abs() < Fixed::from_num(0.0001));
    }

    #[test]
    fn test_block_route() {
        let roster = roster();
        let config = CombatConfig {
            chip_damage_fraction: Fixed::from_num(0.25),
            ..CombatConfig::default()
        };
        let (mut attacker, mut target) = fighters();
        let block = roster.move_id(crate::data::STANDARD_BLOCK).unwrap();
        target.combat.set_block_held(true);
        let mut events = Vec::new();
        target
            .combat
            .start_move(block, roster.move_def(block).unwrap(), &mut events);
        target.combat.advance(&mut events);
        assert_eq!(target.state(), CombatState::Blocking);

        let outcome = DamageResolver::new(&roster, &config, &ConditionTracker::new())
            .resolve(&contact(&roster, "jab"), &mut attacker, &mut target, &mut events)
            .unwrap();

        let HitOutcome::Blocked { chip_damage, .. } = outcome else {
            panic!("expected block, got {outcome:?}");
        };
        // 18 × 0.25
        assert!((chip_damage - Fixed::from_num(4.5)).abs() < Fixed::from_num(0.0001));
        assert_eq!(target.state(), CombatState::Stunned);
        assert_eq!(target.combat.countdown(), 6);
        assert!(target.statuses.is_empty());
        assert!(target.body.velocity.x < Fixed::from_num(4));
    }

    #[test]
    fn test_parry_staggers_attacker() {
        let roster = roster();
        let config = CombatConfig::default();
        let (mut attacker, mut target) = fighters();
        start(&mut attacker, &roster, "jab", 5);
        start(&mut target, &roster, crate::data::STANDARD_PARRY, 3);
        assert_eq!(target.state(), CombatState::Parrying);
        let mut events = Vec::new();

        let outcome = DamageResolver::new(&roster, &config, &ConditionTracker::new())
            .resolve(&contact(&roster, "jab"), &mut attacker, &mut target, &mut events)
            .unwrap();

        assert_eq!(outcome, HitOutcome::Parried);
        assert_eq!(attacker.state(), CombatState::Staggered);
        assert_eq!(attacker.combat.countdown(), config.parry_stagger_frames);
        assert_eq!(target.health.current(), target.health.max());
    }

    #[test]
    fn test_armor_absorbs_then_breaks() {
        let roster = roster();
        let config = CombatConfig::default();
        let (mut attacker, mut target) = fighters();
        start(&mut target, &roster, "charge", 2);
        let mut events = Vec::new();
        let conditions = ConditionTracker::new();
        let resolver = DamageResolver::new(&roster, &config, &conditions);

        for expected_hits in 1..=2 {
            let outcome = resolver
                .resolve(&contact(&roster, "jab"), &mut attacker, &mut target, &mut events)
                .unwrap();
            assert!(matches!(outcome, HitOutcome::Hit { armored: true, .. }));
            assert_eq!(target.state(), CombatState::Startup);
            assert_eq!(
                target.combat.current_move().unwrap().armor_hits,
                expected_hits
            );
        }

        // Third hit reaches the default threshold of 3
        resolver.resolve(&contact(&roster, "jab"), &mut attacker, &mut target, &mut events);
        assert_eq!(target.state(), CombatState::ArmorBroken);
        assert_eq!(target.combat.countdown(), config.armor_break_frames);
    }

    #[test]
    fn test_heavy_breaks_active_armor() {
        let roster = roster();
        let config = CombatConfig::default();
        let (mut attacker, mut target) = fighters();
        start(&mut target, &roster, "charge", 7);
        assert_eq!(target.state(), CombatState::Active);
        let mut events = Vec::new();

        DamageResolver::new(&roster, &config, &ConditionTracker::new()).resolve(
            &contact(&roster, "haymaker"),
            &mut attacker,
            &mut target,
            &mut events,
        );
        assert_eq!(target.state(), CombatState::ArmorBroken);
        assert!(attacker.in_hitstop());
        assert!(target.in_hitstop());
        assert!(events
            .iter()
            .any(|e| matches!(e, CombatEvent::HitstopStarted { frames: 4, .. })));
    }

    #[test]
    fn test_knockout_halts_target() {
        let roster = roster();
        let config = CombatConfig::default();
        let (mut attacker, mut target) = fighters();
        target.health.apply_damage(Fixed::from_num(95));
        start(&mut target, &roster, "jab", 1);
        let mut events = Vec::new();

        let outcome = DamageResolver::new(&roster, &config, &ConditionTracker::new())
            .resolve(&contact(&roster, "jab"), &mut attacker, &mut target, &mut events)
            .unwrap();

        assert!(matches!(outcome, HitOutcome::Hit { knocked_out: true, .. }));
        assert_eq!(target.state(), CombatState::Idle);
        assert!(target.health.is_dead());
        assert!(target.statuses.is_empty());
        let knockouts = events
            .iter()
            .filter(|e| matches!(e, CombatEvent::KnockedOut { .. }))
            .count();
        assert_eq!(knockouts, 1);
    }

    #[test]
    fn test_unknown_hitbox_is_diagnosed() {
        let roster = roster();
        let config = CombatConfig::default();
        let (mut attacker, mut target) = fighters();
        let mut events = Vec::new();
        let bad = Contact {
            hitbox_index: 9,
            ..contact(&roster, "jab")
        };
        assert!(DamageResolver::new(&roster, &config, &ConditionTracker::new())
            .resolve(&bad, &mut attacker, &mut target, &mut events)
            .is_none());
        assert!(matches!(events[0], CombatEvent::Diagnostic { .. }));
    }
}
