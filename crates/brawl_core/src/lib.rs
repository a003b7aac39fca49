//! # Brawl Core
//!
//! Deterministic combat core for a 2D fighting game.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO beyond replay files
//! - No system randomness
//! - No floating-point math inside a tick (uses fixed-point)
//!
//! This separation enables:
//! - Rollback and lockstep netcode on top of identical simulations
//! - Headless balance runs
//! - Replay systems
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`data`] - Immutable move, fighter and status definitions
//! - [`combat_state`] - Per-fighter frame-data state machine
//! - [`hitbox`] - Hitbox and hurtbox collision
//! - [`damage`] - Damage, knockback, block, parry and armor
//! - [`status`] - Timed, stacking status effects
//! - [`condition`] - Adaptive stage, weather and match conditions
//! - [`simulation`] - Core simulation loop
//! - [`round`] - Rounds and matches
//! - [`replay`] - Recording and verified playback
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod combat_state;
pub mod condition;
pub mod config;
pub mod damage;
pub mod data;
pub mod error;
pub mod events;
pub mod fighter;
pub mod hitbox;
pub mod input;
pub mod math;
pub mod movement;
pub mod replay;
pub mod round;
pub mod simulation;
pub mod status;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::combat_state::{CombatState, CombatStateMachine, MovePhase};
    pub use crate::condition::ConditionTracker;
    pub use crate::config::{CombatConfig, TICK_RATE};
    pub use crate::data::{
        ConditionDefinition, ConditionId, FighterDefId, FighterDefinition, HitboxSpec,
        HurtboxSpec, MoveCategory, MoveDefinition, MoveId, Roster, RosterData, StatusDefinition,
        StatusId,
    };
    pub use crate::error::{BrawlError, Result};
    pub use crate::events::{CombatEvent, EventSink, RoundEndReason, TickEvents};
    pub use crate::fighter::{Facing, FighterId, FighterRuntimeState, Health};
    pub use crate::input::{InputEvent, Intent};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::replay::{Replay, ReplayPlayer};
    pub use crate::round::{Match, MatchStatus};
    pub use crate::simulation::{FighterSnapshot, Simulation};
}
