//! Fighter definitions: stats, hurtboxes and move references.

use serde::{Deserialize, Serialize};

use crate::error::BrawlError;
use crate::math::{decimal_serde, decimal_vec_serde, Fixed, Vec2Fixed};

/// A named region of a fighter that can be hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HurtboxSpec {
    /// Region name ("body", "head", ...).
    pub name: String,

    /// Offset from the fighter's position, for a fighter facing right.
    #[serde(default, with = "decimal_vec_serde")]
    pub offset: Vec2Fixed,

    /// Full width and height.
    #[serde(with = "decimal_vec_serde")]
    pub size: Vec2Fixed,

    /// Disabled hurtboxes are ignored by collision.
    #[serde(default = "default_true")]
    pub active: bool,

    /// Multiplier on damage taken through this region.
    #[serde(default = "default_multiplier", with = "decimal_serde")]
    pub damage_multiplier: Fixed,
}

impl HurtboxSpec {
    /// Create an active hurtbox with a neutral damage multiplier.
    #[must_use]
    pub fn new(name: impl Into<String>, offset: Vec2Fixed, size: Vec2Fixed) -> Self {
        Self {
            name: name.into(),
            offset,
            size,
            active: true,
            damage_multiplier: Fixed::ONE,
        }
    }

    /// Builder method to set the damage multiplier.
    #[must_use]
    pub fn with_damage_multiplier(mut self, multiplier: Fixed) -> Self {
        self.damage_multiplier = multiplier;
        self
    }
}

const fn default_true() -> bool {
    true
}

fn default_multiplier() -> Fixed {
    Fixed::ONE
}

fn default_hurtboxes() -> Vec<HurtboxSpec> {
    vec![HurtboxSpec::new(
        "body",
        Vec2Fixed::from_ints(0, 1),
        Vec2Fixed::from_ints(1, 2),
    )]
}

/// Immutable definition of a fighter.
///
/// Move references are by name and resolved when the roster loads.
/// Defensive moves fall back to the standard block, parry and dodge
/// when omitted.
///
/// # Example RON
///
/// ```ron
/// FighterDefinition(
///     name: "striker",
///     max_health: 100.0,
///     move_speed: 6.0,
///     weight: 1.2,
///     base_damage_multiplier: 1.1,
///     light_attack: "striker_jab",
///     heavy_attack: "striker_haymaker",
///     special_moves: ["striker_rush"],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterDefinition {
    /// Unique fighter name.
    pub name: String,

    /// Starting and maximum health.
    #[serde(default = "default_max_health", with = "decimal_serde")]
    pub max_health: Fixed,

    /// Walk speed in units per second.
    #[serde(default = "default_move_speed", with = "decimal_serde")]
    pub move_speed: Fixed,

    /// Upward velocity of a jump.
    #[serde(default = "default_jump_force", with = "decimal_serde")]
    pub jump_force: Fixed,

    /// Horizontal speed during dashes and dodges.
    #[serde(default = "default_dash_speed", with = "decimal_serde")]
    pub dash_speed: Fixed,

    /// Dash length in seconds.
    #[serde(default = "default_dash_duration", with = "decimal_serde")]
    pub dash_duration: Fixed,

    /// Knockback divisor.
    #[serde(default = "default_multiplier", with = "decimal_serde")]
    pub weight: Fixed,

    /// Multiplier on all outgoing damage.
    #[serde(default = "default_multiplier", with = "decimal_serde")]
    pub base_damage_multiplier: Fixed,

    /// Multiplier on incoming damage (exposed, not applied to damage).
    #[serde(default = "default_multiplier", with = "decimal_serde")]
    pub base_defense_multiplier: Fixed,

    /// Hits absorbed by armor before it breaks.
    #[serde(default = "default_armor_break_threshold")]
    pub armor_break_threshold: u32,

    /// Hurtboxes in collision order.
    #[serde(default = "default_hurtboxes")]
    pub hurtboxes: Vec<HurtboxSpec>,

    /// Light attack move name.
    pub light_attack: String,

    /// Heavy attack move name.
    pub heavy_attack: String,

    /// Special move names, indexed by `Intent::Special`.
    #[serde(default)]
    pub special_moves: Vec<String>,

    /// Block move name; the standard block when absent.
    #[serde(default)]
    pub block_move: Option<String>,

    /// Parry move name; the standard parry when absent.
    #[serde(default)]
    pub parry_move: Option<String>,

    /// Dodge move name; the standard dodge when absent.
    #[serde(default)]
    pub dodge_move: Option<String>,
}

fn default_max_health() -> Fixed {
    Fixed::from_num(100)
}

fn default_move_speed() -> Fixed {
    Fixed::from_num(5)
}

fn default_jump_force() -> Fixed {
    Fixed::from_num(10)
}

fn default_dash_speed() -> Fixed {
    Fixed::from_num(12)
}

fn default_dash_duration() -> Fixed {
    Fixed::from_num(3) / Fixed::from_num(10)
}

const fn default_armor_break_threshold() -> u32 {
    3
}

impl FighterDefinition {
    /// Create a fighter with default stats and a single body hurtbox.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        light_attack: impl Into<String>,
        heavy_attack: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            max_health: default_max_health(),
            move_speed: default_move_speed(),
            jump_force: default_jump_force(),
            dash_speed: default_dash_speed(),
            dash_duration: default_dash_duration(),
            weight: Fixed::ONE,
            base_damage_multiplier: Fixed::ONE,
            base_defense_multiplier: Fixed::ONE,
            armor_break_threshold: default_armor_break_threshold(),
            hurtboxes: default_hurtboxes(),
            light_attack: light_attack.into(),
            heavy_attack: heavy_attack.into(),
            special_moves: Vec::new(),
            block_move: None,
            parry_move: None,
            dodge_move: None,
        }
    }

    /// Builder method to set maximum health.
    #[must_use]
    pub fn with_max_health(mut self, max_health: Fixed) -> Self {
        self.max_health = max_health;
        self
    }

    /// Builder method to set weight.
    #[must_use]
    pub fn with_weight(mut self, weight: Fixed) -> Self {
        self.weight = weight;
        self
    }

    /// Builder method to set the base damage multiplier.
    #[must_use]
    pub fn with_damage_multiplier(mut self, multiplier: Fixed) -> Self {
        self.base_damage_multiplier = multiplier;
        self
    }

    /// Builder method to replace the hurtboxes.
    #[must_use]
    pub fn with_hurtboxes(mut self, hurtboxes: Vec<HurtboxSpec>) -> Self {
        self.hurtboxes = hurtboxes;
        self
    }

    /// Builder method to append a special move reference.
    #[must_use]
    pub fn with_special(mut self, move_name: impl Into<String>) -> Self {
        self.special_moves.push(move_name.into());
        self
    }

    /// Check this fighter's data invariants.
    ///
    /// Move references are resolved by the roster, not here.
    #[must_use]
    pub fn validate(&self) -> Vec<BrawlError> {
        let mut errors = Vec::new();
        let mut invalid = |reason: String| {
            errors.push(BrawlError::InvalidDefinition {
                kind: "fighter",
                name: self.name.clone(),
                reason,
            });
        };

        if self.name.is_empty() {
            invalid("name must not be empty".to_string());
        }
        if self.max_health <= Fixed::ZERO {
            invalid(format!("max health {} is not positive", self.max_health));
        }
        if self.weight <= Fixed::ZERO {
            invalid(format!("weight {} is not positive", self.weight));
        }
        if self.move_speed < Fixed::ZERO || self.dash_speed < Fixed::ZERO {
            invalid("speeds must not be negative".to_string());
        }
        if self.dash_duration < Fixed::ZERO {
            invalid("dash duration is negative".to_string());
        }
        if self.base_damage_multiplier < Fixed::ZERO {
            invalid("base damage multiplier is negative".to_string());
        }
        if self.armor_break_threshold == 0 {
            invalid("armor break threshold must be at least 1".to_string());
        }
        if self.hurtboxes.is_empty() {
            invalid("fighter has no hurtboxes".to_string());
        }

        for (index, hurtbox) in self.hurtboxes.iter().enumerate() {
            if hurtbox.size.x <= Fixed::ZERO || hurtbox.size.y <= Fixed::ZERO {
                invalid(format!("hurtbox '{}' has a non-positive size", hurtbox.name));
            }
            if self.hurtboxes[..index].iter().any(|h| h.name == hurtbox.name) {
                invalid(format!("hurtbox name '{}' is used twice", hurtbox.name));
            }
        }

        errors
    }
}
