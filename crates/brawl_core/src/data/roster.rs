//! Roster loading: validation and name resolution.
//!
//! A [`RosterData`] is what designers author: moves, statuses, fighters and
//! adaptive conditions that refer to each other by name. [`Roster::load`] checks every
//! invariant, resolves every name to a typed id, and rejects the whole
//! roster if anything is wrong. After loading, definitions never change.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::condition_data::ConditionDefinition;
use super::fighter_data::FighterDefinition;
use super::move_data::{MoveCategory, MoveDefinition, StatusApplication};
use super::status_data::StatusDefinition;
use crate::error::{BrawlError, Result};
use crate::math::Fixed;

/// Name of the block used by fighters that do not author one.
pub const STANDARD_BLOCK: &str = "standard_block";
/// Name of the parry used by fighters that do not author one.
pub const STANDARD_PARRY: &str = "standard_parry";
/// Name of the dodge used by fighters that do not author one.
pub const STANDARD_DODGE: &str = "standard_dodge";

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Index of a move in a loaded roster.
    MoveId,
    "move"
);
define_id!(
    /// Index of a status definition in a loaded roster.
    StatusId,
    "status"
);
define_id!(
    /// Index of a fighter definition in a loaded roster.
    FighterDefId,
    "fighter-def"
);
define_id!(
    /// Index of a condition definition in a loaded roster.
    ConditionId,
    "condition"
);

/// Authored roster, as read from a RON file.
///
/// # Example RON
///
/// ```ron
/// RosterData(
///     moves: [MoveDefinition(name: "jab", category: LightAttack, ...)],
///     statuses: [StatusDefinition(name: "poison", kind: Poison)],
///     fighters: [FighterDefinition(name: "striker", light_attack: "jab", ...)],
///     conditions: [ConditionDefinition(name: "fog", kind: Weather, ...)],
/// )
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterData {
    /// Move definitions.
    #[serde(default)]
    pub moves: Vec<MoveDefinition>,
    /// Status definitions.
    #[serde(default)]
    pub statuses: Vec<StatusDefinition>,
    /// Fighter definitions.
    #[serde(default)]
    pub fighters: Vec<FighterDefinition>,
    /// Adaptive condition definitions.
    #[serde(default)]
    pub conditions: Vec<ConditionDefinition>,
}

impl RosterData {
    /// Parse authored roster data from RON text.
    ///
    /// # Errors
    ///
    /// Returns [`BrawlError::DataParseError`] if the text is not a valid roster.
    pub fn from_ron_str(source: &str, path: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| BrawlError::DataParseError {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}

/// Moves a fighter can perform, resolved to ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSet {
    /// Light attack.
    pub light_attack: MoveId,
    /// Heavy attack.
    pub heavy_attack: MoveId,
    /// Specials, in authored order.
    pub specials: Vec<MoveId>,
    /// Block.
    pub block: MoveId,
    /// Parry.
    pub parry: MoveId,
    /// Dodge.
    pub dodge: MoveId,
}

/// Validated, immutable definitions for a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    moves: Vec<MoveDefinition>,
    statuses: Vec<StatusDefinition>,
    fighters: Vec<FighterDefinition>,
    conditions: Vec<ConditionDefinition>,
    move_sets: Vec<MoveSet>,
    move_names: BTreeMap<String, MoveId>,
    status_names: BTreeMap<String, StatusId>,
    fighter_names: BTreeMap<String, FighterDefId>,
    condition_names: BTreeMap<String, ConditionId>,
}

/// Standard held block: no startup, holds while the input is down.
#[must_use]
pub fn standard_block() -> MoveDefinition {
    MoveDefinition::new(STANDARD_BLOCK, MoveCategory::Block).with_frames(0, 999, 5)
}

/// Standard parry: 2 startup, 12 active, 10 recovery.
#[must_use]
pub fn standard_parry() -> MoveDefinition {
    MoveDefinition::new(STANDARD_PARRY, MoveCategory::Parry).with_frames(2, 12, 10)
}

/// Standard dodge: invincible for its whole active window.
#[must_use]
pub fn standard_dodge() -> MoveDefinition {
    MoveDefinition::new(STANDARD_DODGE, MoveCategory::Dodge)
        .with_frames(2, 8, 5)
        .with_protection(0, 8)
}

fn check_duplicates<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a str>,
    errors: &mut Vec<BrawlError>,
) {
    let mut seen = BTreeMap::new();
    for name in names {
        let count = seen.entry(name).or_insert(0u32);
        *count += 1;
        if *count == 2 {
            errors.push(BrawlError::DuplicateDefinition {
                kind,
                name: name.to_string(),
            });
        }
    }
}

impl Roster {
    /// Validate authored data and resolve every reference.
    ///
    /// # Errors
    ///
    /// Returns [`BrawlError::RosterRejected`] listing every violation:
    /// invalid definitions, duplicate names, unresolved move, status or
    /// fighter references, and move references of the wrong category.
    pub fn load(data: RosterData) -> Result<Self> {
        let RosterData {
            mut moves,
            statuses,
            fighters,
            conditions,
        } = data;
        let mut errors = Vec::new();

        for builtin in [standard_block(), standard_parry(), standard_dodge()] {
            if !moves.iter().any(|m| m.name == builtin.name) {
                moves.push(builtin);
            }
        }

        check_duplicates("move", moves.iter().map(|m| m.name.as_str()), &mut errors);
        check_duplicates(
            "status",
            statuses.iter().map(|s| s.name.as_str()),
            &mut errors,
        );
        check_duplicates(
            "fighter",
            fighters.iter().map(|f| f.name.as_str()),
            &mut errors,
        );
        check_duplicates(
            "condition",
            conditions.iter().map(|c| c.name.as_str()),
            &mut errors,
        );

        for definition in &moves {
            errors.extend(definition.validate());
        }
        for definition in &statuses {
            errors.extend(definition.validate());
        }
        for definition in &fighters {
            errors.extend(definition.validate());
        }
        for definition in &conditions {
            errors.extend(definition.validate());
        }

        for definition in &mut moves {
            definition.normalize();
        }

        let mut move_names = BTreeMap::new();
        for (index, definition) in moves.iter().enumerate() {
            move_names
                .entry(definition.name.clone())
                .or_insert(MoveId(index as u32));
        }
        let mut status_names = BTreeMap::new();
        for (index, definition) in statuses.iter().enumerate() {
            status_names
                .entry(definition.name.clone())
                .or_insert(StatusId(index as u32));
        }
        let mut fighter_names = BTreeMap::new();
        for (index, definition) in fighters.iter().enumerate() {
            fighter_names
                .entry(definition.name.clone())
                .or_insert(FighterDefId(index as u32));
        }
        let mut condition_names = BTreeMap::new();
        for (index, definition) in conditions.iter().enumerate() {
            condition_names
                .entry(definition.name.clone())
                .or_insert(ConditionId(index as u32));
        }

        for definition in &moves {
            for StatusApplication { status, .. } in definition
                .status_effects_on_hit
                .iter()
                .chain(&definition.status_effects_on_self)
            {
                if !status_names.contains_key(status) {
                    errors.push(BrawlError::UnknownStatus(format!(
                        "'{status}' referenced by move '{}'",
                        definition.name
                    )));
                }
            }
        }

        for condition in &conditions {
            for modifier in &condition.fighter_modifiers {
                if let Some(fighter) = modifier.fighter.name() {
                    if !fighter_names.contains_key(fighter) {
                        errors.push(BrawlError::UnknownFighter(format!(
                            "'{fighter}' targeted by condition '{}'",
                            condition.name
                        )));
                    }
                }
                for name in modifier
                    .move_modifiers
                    .iter()
                    .filter_map(|m| m.moves.name())
                {
                    if !move_names.contains_key(name) {
                        errors.push(BrawlError::UnknownMove(format!(
                            "'{name}' targeted by condition '{}'",
                            condition.name
                        )));
                    }
                }
            }
        }

        let resolve = |fighter: &str,
                       slot: &str,
                       name: &str,
                       expected: &[MoveCategory],
                       errors: &mut Vec<BrawlError>|
         -> MoveId {
            let Some(&id) = move_names.get(name) else {
                errors.push(BrawlError::UnknownMove(format!(
                    "'{name}' referenced as {slot} of fighter '{fighter}'"
                )));
                return MoveId(0);
            };
            let category = moves[id.0 as usize].category;
            if !expected.contains(&category) {
                errors.push(BrawlError::InvalidDefinition {
                    kind: "fighter",
                    name: fighter.to_string(),
                    reason: format!("{slot} '{name}' is a {category:?} move"),
                });
            }
            id
        };

        let attacks = [
            MoveCategory::LightAttack,
            MoveCategory::HeavyAttack,
            MoveCategory::Special,
        ];
        let mut move_sets = Vec::with_capacity(fighters.len());
        for fighter in &fighters {
            let name = fighter.name.as_str();
            let specials = fighter
                .special_moves
                .iter()
                .map(|special| {
                    resolve(
                        name,
                        "special",
                        special,
                        &[
                            MoveCategory::LightAttack,
                            MoveCategory::HeavyAttack,
                            MoveCategory::Special,
                            MoveCategory::Dash,
                        ],
                        &mut errors,
                    )
                })
                .collect();
            move_sets.push(MoveSet {
                light_attack: resolve(
                    name,
                    "light attack",
                    &fighter.light_attack,
                    &attacks,
                    &mut errors,
                ),
                heavy_attack: resolve(
                    name,
                    "heavy attack",
                    &fighter.heavy_attack,
                    &attacks,
                    &mut errors,
                ),
                specials,
                block: resolve(
                    name,
                    "block",
                    fighter.block_move.as_deref().unwrap_or(STANDARD_BLOCK),
                    &[MoveCategory::Block],
                    &mut errors,
                ),
                parry: resolve(
                    name,
                    "parry",
                    fighter.parry_move.as_deref().unwrap_or(STANDARD_PARRY),
                    &[MoveCategory::Parry],
                    &mut errors,
                ),
                dodge: resolve(
                    name,
                    "dodge",
                    fighter.dodge_move.as_deref().unwrap_or(STANDARD_DODGE),
                    &[MoveCategory::Dodge, MoveCategory::Dash],
                    &mut errors,
                ),
            });
        }

        if !errors.is_empty() {
            return Err(BrawlError::RosterRejected(errors));
        }

        debug!(
            moves = moves.len(),
            statuses = statuses.len(),
            fighters = fighters.len(),
            conditions = conditions.len(),
            "roster loaded"
        );

        Ok(Self {
            moves,
            statuses,
            fighters,
            conditions,
            move_sets,
            move_names,
            status_names,
            fighter_names,
            condition_names,
        })
    }

    /// Parse and load a roster from RON text.
    ///
    /// # Errors
    ///
    /// Returns a parse error or the load-time rejection.
    pub fn from_ron_str(source: &str, path: &str) -> Result<Self> {
        Self::load(RosterData::from_ron_str(source, path)?)
    }

    /// Look up a move definition.
    #[must_use]
    pub fn move_def(&self, id: MoveId) -> Option<&MoveDefinition> {
        self.moves.get(id.0 as usize)
    }

    /// Look up a status definition.
    #[must_use]
    pub fn status_def(&self, id: StatusId) -> Option<&StatusDefinition> {
        self.statuses.get(id.0 as usize)
    }

    /// Look up a fighter definition.
    #[must_use]
    pub fn fighter_def(&self, id: FighterDefId) -> Option<&FighterDefinition> {
        self.fighters.get(id.0 as usize)
    }

    /// Look up a condition definition.
    #[must_use]
    pub fn condition_def(&self, id: ConditionId) -> Option<&ConditionDefinition> {
        self.conditions.get(id.0 as usize)
    }

    /// Look up a fighter's resolved move set.
    #[must_use]
    pub fn move_set(&self, id: FighterDefId) -> Option<&MoveSet> {
        self.move_sets.get(id.0 as usize)
    }

    /// Resolve a move name.
    #[must_use]
    pub fn move_id(&self, name: &str) -> Option<MoveId> {
        self.move_names.get(name).copied()
    }

    /// Resolve a status name.
    #[must_use]
    pub fn status_id(&self, name: &str) -> Option<StatusId> {
        self.status_names.get(name).copied()
    }

    /// Resolve a fighter name.
    #[must_use]
    pub fn fighter_id(&self, name: &str) -> Option<FighterDefId> {
        self.fighter_names.get(name).copied()
    }

    /// Resolve a condition name.
    #[must_use]
    pub fn condition_id(&self, name: &str) -> Option<ConditionId> {
        self.condition_names.get(name).copied()
    }

    /// Number of fighter definitions.
    #[must_use]
    pub fn fighter_count(&self) -> usize {
        self.fighters.len()
    }

    /// Iterate over all moves with their ids.
    pub fn moves(&self) -> impl Iterator<Item = (MoveId, &MoveDefinition)> {
        self.moves
            .iter()
            .enumerate()
            .map(|(index, definition)| (MoveId(index as u32), definition))
    }

    /// Iterate over all conditions with their ids.
    pub fn conditions(&self) -> impl Iterator<Item = (ConditionId, &ConditionDefinition)> {
        self.conditions
            .iter()
            .enumerate()
            .map(|(index, definition)| (ConditionId(index as u32), definition))
    }

    /// Heaviest-hitting base damage on the roster, useful for sanity reports.
    #[must_use]
    pub fn max_move_damage(&self) -> Fixed {
        self.moves
            .iter()
            .map(|m| m.damage)
            .max()
            .unwrap_or(Fixed::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::condition_data::{
        ConditionKind, FighterModifier, MoveModifier, Target, TriggerKind,
    };
    use crate::data::move_data::HitboxSpec;
    use crate::data::status_data::StatusKind;

    fn jab() -> MoveDefinition {
        MoveDefinition::new("jab", MoveCategory::LightAttack)
            .with_frames(4, 2, 8)
            .with_hitbox(HitboxSpec::default())
    }

    fn haymaker() -> MoveDefinition {
        MoveDefinition::new("haymaker", MoveCategory::HeavyAttack).with_hitbox(HitboxSpec::default())
    }

    fn data() -> RosterData {
        RosterData {
            moves: vec![jab(), haymaker()],
            statuses: vec![StatusDefinition::new("poison", StatusKind::Poison)],
            fighters: vec![FighterDefinition::new("dummy", "jab", "haymaker")],
            conditions: vec![ConditionDefinition::new("fog", ConditionKind::Weather)
                .with_trigger(TriggerKind::RoundStart, false)],
        }
    }

    #[test]
    fn test_load_resolves_names_and_builtins() {
        let roster = Roster::load(data()).unwrap();
        let fighter = roster.fighter_id("dummy").unwrap();
        let set = roster.move_set(fighter).unwrap();

        assert_eq!(set.light_attack, roster.move_id("jab").unwrap());
        assert_eq!(set.block, roster.move_id(STANDARD_BLOCK).unwrap());
        assert_eq!(
            roster.move_def(set.parry).unwrap().category,
            MoveCategory::Parry
        );
        assert_eq!(roster.move_def(set.dodge).unwrap().invincibility_frames, 8);
        assert!(roster.status_id("poison").is_some());
        let fog = roster.condition_id("fog").unwrap();
        assert_eq!(
            roster.condition_def(fog).unwrap().kind,
            ConditionKind::Weather
        );
        assert_eq!(roster.conditions().count(), 1);
    }

    #[test]
    fn test_authored_builtin_is_not_replaced() {
        let mut data = data();
        data.moves
            .push(MoveDefinition::new(STANDARD_BLOCK, MoveCategory::Block).with_frames(1, 30, 3));
        let roster = Roster::load(data).unwrap();
        let block = roster.move_id(STANDARD_BLOCK).unwrap();
        assert_eq!(roster.move_def(block).unwrap().startup_frames, 1);
    }

    #[test]
    fn test_load_collects_every_violation() {
        let mut data = data();
        data.moves.push(jab());
        data.fighters
            .push(FighterDefinition::new("ghost", "missing", "haymaker").with_special("jab"));
        data.moves[1].status_effects_on_hit.push(StatusApplication {
            status: "burn".to_string(),
            stacks: 1,
            duration: None,
        });

        let err = Roster::load(data).unwrap_err();
        let violations = err.into_violations();
        assert_eq!(violations.len(), 3, "{violations:?}");
        assert!(violations
            .iter()
            .any(|e| matches!(e, BrawlError::DuplicateDefinition { kind: "move", .. })));
        assert!(violations
            .iter()
            .any(|e| matches!(e, BrawlError::UnknownMove(_))));
        assert!(violations
            .iter()
            .any(|e| matches!(e, BrawlError::UnknownStatus(_))));
    }

    #[test]
    fn test_wrong_category_reference_rejected() {
        let mut data = data();
        data.fighters[0].block_move = Some("jab".to_string());
        let violations = Roster::load(data).unwrap_err().into_violations();
        assert_eq!(violations.len(), 1);
        assert!(matches!(
            violations[0],
            BrawlError::InvalidDefinition { kind: "fighter", .. }
        ));
    }

    #[test]
    fn test_condition_targets_resolved() {
        let mut data = data();
        data.conditions.push(
            ConditionDefinition::new("sleet", ConditionKind::Weather)
                .with_fighter_modifier(
                    FighterModifier::new(Target::Named("nobody".to_string())).with_move(
                        MoveModifier::new(Target::Named("uppercut".to_string())).with_armor(3),
                    ),
                ),
        );
        data.conditions
            .push(ConditionDefinition::new("fog", ConditionKind::StageEnvironment));

        let violations = Roster::load(data).unwrap_err().into_violations();
        assert_eq!(violations.len(), 3, "{violations:?}");
        assert!(violations
            .iter()
            .any(|e| matches!(e, BrawlError::UnknownFighter(_))));
        assert!(violations
            .iter()
            .any(|e| matches!(e, BrawlError::UnknownMove(_))));
        assert!(violations
            .iter()
            .any(|e| matches!(e, BrawlError::DuplicateDefinition { kind: "condition", .. })));
    }

    #[test]
    fn test_lookup_out_of_range_is_none() {
        let roster = Roster::load(data()).unwrap();
        assert!(roster.move_def(MoveId(999)).is_none());
        assert!(roster.status_def(StatusId(5)).is_none());
        assert!(roster.fighter_def(FighterDefId(3)).is_none());
        assert!(roster.condition_def(ConditionId(7)).is_none());
        assert_eq!(MoveId(2).to_string(), "move#2");
    }
}
