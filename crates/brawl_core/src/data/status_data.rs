//! Status effect definitions.

use serde::{Deserialize, Serialize};

use crate::error::BrawlError;
use crate::math::{decimal_serde, seconds_to_ticks, Fixed};

/// Broad kind of a status effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    /// Damage over time.
    Poison,
    /// Slowed movement while committing to a heavy attack.
    HeavyAttackState,
    /// Enhanced abilities at low health.
    LowHpState,
    /// The owner cannot start moves while the status is active.
    Stagger,
    /// Marker applied while armor is broken.
    ArmorBreak,
    /// Generic positive effect.
    Buff,
    /// Generic negative effect.
    Debuff,
}

impl StatusKind {
    /// Whether an active status of this kind stops its owner from acting.
    #[must_use]
    pub const fn prevents_action(self) -> bool {
        matches!(self, StatusKind::Stagger)
    }
}

/// How long a status lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusDuration {
    /// Expires after this many seconds.
    Seconds(#[serde(with = "decimal_serde")] Fixed),
    /// Never expires on its own.
    Permanent,
}

impl StatusDuration {
    /// Remaining ticks, or `None` for a permanent status.
    #[must_use]
    pub fn to_ticks(self, tick_rate: u32) -> Option<u32> {
        match self {
            StatusDuration::Seconds(seconds) => Some(seconds_to_ticks(seconds, tick_rate)),
            StatusDuration::Permanent => None,
        }
    }
}

/// Stat a modifier acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    /// Outgoing damage multiplier.
    Damage,
    /// Incoming damage multiplier.
    Defense,
    /// Walk and dash speed multiplier.
    Speed,
}

/// How a modifier combines with the base value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierOp {
    /// Added once per stack.
    Add,
    /// Multiplied once per stack.
    Multiply,
    /// Replaces the value outright.
    Set,
}

/// A single stat modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatModifier {
    /// Affected stat.
    pub stat: StatKind,
    /// Combination rule.
    pub operation: ModifierOp,
    /// Operand.
    #[serde(with = "decimal_serde")]
    pub value: Fixed,
}

/// Periodic damage dealt to the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DamageOverTime {
    /// Damage per stack per pulse.
    #[serde(with = "decimal_serde")]
    pub damage_per_tick: Fixed,
    /// Seconds between pulses.
    #[serde(default = "default_dot_interval", with = "decimal_serde")]
    pub tick_interval: Fixed,
}

fn default_dot_interval() -> Fixed {
    Fixed::ONE / Fixed::from_num(2)
}

impl DamageOverTime {
    /// Ticks between pulses, never less than one.
    #[must_use]
    pub fn interval_ticks(&self, tick_rate: u32) -> u32 {
        seconds_to_ticks(self.tick_interval, tick_rate).max(1)
    }
}

/// Immutable definition of a status effect.
///
/// # Example RON
///
/// ```ron
/// StatusDefinition(
///     name: "poison",
///     kind: Poison,
///     can_stack: true,
///     max_stacks: 3,
///     base_duration: Seconds(4.0),
///     damage_over_time: Some(DamageOverTime(damage_per_tick: 2.0, tick_interval: 0.5)),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDefinition {
    /// Unique status name.
    pub name: String,

    /// Status kind.
    pub kind: StatusKind,

    /// Whether reapplying adds stacks.
    #[serde(default)]
    pub can_stack: bool,

    /// Upper bound on stacks.
    #[serde(default = "default_max_stacks")]
    pub max_stacks: u32,

    /// Duration used when an application does not override it.
    #[serde(default = "default_base_duration")]
    pub base_duration: StatusDuration,

    /// Whether reapplying resets the countdown.
    #[serde(default = "default_refresh")]
    pub refresh_on_reapply: bool,

    /// Stat modifiers contributed per stack.
    #[serde(default)]
    pub stat_modifiers: Vec<StatModifier>,

    /// Optional damage over time.
    #[serde(default)]
    pub damage_over_time: Option<DamageOverTime>,
}

const fn default_max_stacks() -> u32 {
    1
}

fn default_base_duration() -> StatusDuration {
    StatusDuration::Seconds(Fixed::from_num(5))
}

const fn default_refresh() -> bool {
    true
}

impl StatusDefinition {
    /// Create a non-stacking status with default duration and no effects.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: StatusKind) -> Self {
        Self {
            name: name.into(),
            kind,
            can_stack: false,
            max_stacks: default_max_stacks(),
            base_duration: default_base_duration(),
            refresh_on_reapply: default_refresh(),
            stat_modifiers: Vec::new(),
            damage_over_time: None,
        }
    }

    /// Builder method to allow stacking up to `max_stacks`.
    #[must_use]
    pub fn with_stacking(mut self, max_stacks: u32) -> Self {
        self.can_stack = true;
        self.max_stacks = max_stacks;
        self
    }

    /// Builder method to set the base duration.
    #[must_use]
    pub fn with_duration(mut self, duration: StatusDuration) -> Self {
        self.base_duration = duration;
        self
    }

    /// Builder method to add a stat modifier.
    #[must_use]
    pub fn with_modifier(mut self, stat: StatKind, operation: ModifierOp, value: Fixed) -> Self {
        self.stat_modifiers.push(StatModifier {
            stat,
            operation,
            value,
        });
        self
    }

    /// Builder method to add damage over time.
    #[must_use]
    pub fn with_dot(mut self, damage_per_tick: Fixed, tick_interval: Fixed) -> Self {
        self.damage_over_time = Some(DamageOverTime {
            damage_per_tick,
            tick_interval,
        });
        self
    }

    /// Check this status' data invariants.
    #[must_use]
    pub fn validate(&self) -> Vec<BrawlError> {
        let mut errors = Vec::new();
        let mut invalid = |reason: String| {
            errors.push(BrawlError::InvalidDefinition {
                kind: "status",
                name: self.name.clone(),
                reason,
            });
        };

        if self.name.is_empty() {
            invalid("name must not be empty".to_string());
        }
        if self.max_stacks == 0 {
            invalid("max stacks must be at least 1".to_string());
        }
        if let StatusDuration::Seconds(seconds) = self.base_duration {
            if seconds <= Fixed::ZERO {
                invalid(format!("base duration {seconds} is not positive"));
            }
        }
        if let Some(dot) = &self.damage_over_time {
            if dot.tick_interval <= Fixed::ZERO {
                invalid("damage-over-time interval is not positive".to_string());
            }
            if dot.damage_per_tick < Fixed::ZERO {
                invalid("damage-over-time damage is negative".to_string());
            }
        }

        errors
    }
}
