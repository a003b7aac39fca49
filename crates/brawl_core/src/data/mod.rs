//! Immutable definition data: moves, fighters, status effects, conditions.
//!
//! All structs are designed to be deserialized from RON files. Designers
//! write decimals; they become fixed-point once, at load time.
//!
//! **Note:** This module contains no IO - it only defines data types.
//! Reading files is left to the caller.

mod condition_data;
mod fighter_data;
mod move_data;
mod roster;
mod status_data;

pub use condition_data::{
    ConditionDefinition, ConditionKind, ConditionTrigger, FighterModifier, GlobalModifier,
    GlobalProperty, MoveModifier, Target, TriggerKind,
};
pub use fighter_data::{FighterDefinition, HurtboxSpec};
pub use move_data::{
    CancelRules, CancelWindow, HitboxSpec, MoveCategory, MoveDefinition, StatusApplication,
};
pub use roster::{
    standard_block, standard_dodge, standard_parry, ConditionId, FighterDefId, MoveId, MoveSet, Roster,
    RosterData, StatusId, STANDARD_BLOCK, STANDARD_DODGE, STANDARD_PARRY,
};
pub use status_data::{
    DamageOverTime, ModifierOp, StatKind, StatModifier, StatusDefinition, StatusDuration,
    StatusKind,
};
