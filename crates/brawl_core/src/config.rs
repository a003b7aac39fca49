//! Tunable combat constants.
//!
//! Everything here is global to a match rather than to a single move or
//! fighter. Values are authored as decimals in RON and converted to
//! fixed-point once at load time.
//!
//! # Example RON
//!
//! ```ron
//! CombatConfig(
//!     tick_rate: 60,
//!     block_knockback_factor: 0.3,
//!     chip_damage_fraction: 0.1,
//!     round_duration_seconds: 60.0,
//! )
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{BrawlError, Result};
use crate::math::{decimal_serde, seconds_to_ticks, Fixed};

/// Simulation ticks per second.
pub const TICK_RATE: u32 = 60;

/// Global combat configuration for a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatConfig {
    /// Fixed simulation rate in ticks per second.
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,

    /// Fraction of normal knockback applied to a blocking target.
    #[serde(default = "default_block_knockback", with = "decimal_serde")]
    pub block_knockback_factor: Fixed,

    /// Fraction of hit damage dealt through a block. Zero disables chip damage.
    #[serde(default, with = "decimal_serde")]
    pub chip_damage_fraction: Fixed,

    /// Frames a fighter stays ArmorBroken after its armor is broken.
    #[serde(default = "default_armor_break_frames")]
    pub armor_break_frames: u32,

    /// Frames an attacker stays Staggered after being parried.
    #[serde(default = "default_parry_stagger_frames")]
    pub parry_stagger_frames: u32,

    /// Downward acceleration in units per second squared.
    #[serde(default = "default_gravity", with = "decimal_serde")]
    pub gravity: Fixed,

    /// Height of the floor.
    #[serde(default, with = "decimal_serde")]
    pub ground_level: Fixed,

    /// Per-tick horizontal velocity retention while grounded with no input.
    #[serde(default = "default_friction", with = "decimal_serde")]
    pub friction: Fixed,

    /// Terminal falling speed in units per second.
    #[serde(default = "default_max_fall_speed", with = "decimal_serde")]
    pub max_fall_speed: Fixed,

    /// Fraction of walk speed available while airborne.
    #[serde(default = "default_air_control", with = "decimal_serde")]
    pub air_control: Fixed,

    /// Fighters are kept within `[-stage_half_width, stage_half_width]`.
    #[serde(default = "default_stage_half_width", with = "decimal_serde")]
    pub stage_half_width: Fixed,

    /// Length of a round before it is decided on remaining health.
    #[serde(default = "default_round_duration", with = "decimal_serde")]
    pub round_duration_seconds: Fixed,

    /// Round wins needed to take the match.
    #[serde(default = "default_rounds_to_win")]
    pub rounds_to_win: u32,
}

const fn default_tick_rate() -> u32 {
    TICK_RATE
}

fn default_block_knockback() -> Fixed {
    Fixed::from_num(3) / Fixed::from_num(10)
}

const fn default_armor_break_frames() -> u32 {
    120
}

const fn default_parry_stagger_frames() -> u32 {
    30
}

fn default_gravity() -> Fixed {
    Fixed::from_num(30)
}

fn default_friction() -> Fixed {
    Fixed::from_num(8) / Fixed::from_num(10)
}

fn default_max_fall_speed() -> Fixed {
    Fixed::from_num(20)
}

fn default_air_control() -> Fixed {
    Fixed::from_num(1) / Fixed::from_num(2)
}

fn default_stage_half_width() -> Fixed {
    Fixed::from_num(10)
}

fn default_round_duration() -> Fixed {
    Fixed::from_num(99)
}

const fn default_rounds_to_win() -> u32 {
    2
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            tick_rate: default_tick_rate(),
            block_knockback_factor: default_block_knockback(),
            chip_damage_fraction: Fixed::ZERO,
            armor_break_frames: default_armor_break_frames(),
            parry_stagger_frames: default_parry_stagger_frames(),
            gravity: default_gravity(),
            ground_level: Fixed::ZERO,
            friction: default_friction(),
            max_fall_speed: default_max_fall_speed(),
            air_control: default_air_control(),
            stage_half_width: default_stage_half_width(),
            round_duration_seconds: default_round_duration(),
            rounds_to_win: default_rounds_to_win(),
        }
    }
}

impl CombatConfig {
    /// Parse a configuration from RON text.
    ///
    /// # Errors
    ///
    /// Returns [`BrawlError::DataParseError`] if the text is not valid RON,
    /// or [`BrawlError::InvalidState`] if a value is out of range.
    pub fn from_ron_str(source: &str, path: &str) -> Result<Self> {
        let config: Self = ron::from_str(source).map_err(|e| BrawlError::DataParseError {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable by the simulation.
    ///
    /// # Errors
    ///
    /// Returns [`BrawlError::InvalidState`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.tick_rate == 0 {
            return Err(BrawlError::InvalidState("tick_rate must be positive".into()));
        }
        if self.block_knockback_factor < Fixed::ZERO {
            return Err(BrawlError::InvalidState(
                "block_knockback_factor must not be negative".into(),
            ));
        }
        if self.chip_damage_fraction < Fixed::ZERO || self.chip_damage_fraction > Fixed::ONE {
            return Err(BrawlError::InvalidState(
                "chip_damage_fraction must lie in [0, 1]".into(),
            ));
        }
        if self.friction < Fixed::ZERO || self.friction > Fixed::ONE {
            return Err(BrawlError::InvalidState("friction must lie in [0, 1]".into()));
        }
        if self.stage_half_width <= Fixed::ZERO {
            return Err(BrawlError::InvalidState(
                "stage_half_width must be positive".into(),
            ));
        }
        if self.rounds_to_win == 0 {
            return Err(BrawlError::InvalidState("rounds_to_win must be positive".into()));
        }
        Ok(())
    }

    /// Convert seconds to ticks at this configuration's tick rate.
    #[must_use]
    pub fn ticks(&self, seconds: Fixed) -> u32 {
        seconds_to_ticks(seconds, self.tick_rate)
    }

    /// Length of one tick in seconds.
    #[must_use]
    pub fn tick_seconds(&self) -> Fixed {
        Fixed::ONE / Fixed::from_num(self.tick_rate.max(1))
    }

    /// Round length in ticks.
    #[must_use]
    pub fn round_ticks(&self) -> u32 {
        self.ticks(self.round_duration_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CombatConfig::default();
        assert_eq!(config.tick_rate, 60);
        assert_eq!(config.armor_break_frames, 120);
        assert_eq!(config.chip_damage_fraction, Fixed::ZERO);
        assert_eq!(config.round_ticks(), 99 * 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config =
            CombatConfig::from_ron_str("(chip_damage_fraction: 0.25, rounds_to_win: 3)", "inline")
                .unwrap();
        assert_eq!(config.chip_damage_fraction, Fixed::from_num(0.25));
        assert_eq!(config.rounds_to_win, 3);
        assert_eq!(config.tick_rate, 60);
        assert_eq!(config.block_knockback_factor, default_block_knockback());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = CombatConfig::from_ron_str("(tick_rate: 0)", "inline");
        assert!(matches!(result, Err(BrawlError::InvalidState(_))));

        let result = CombatConfig::from_ron_str("(chip_damage_fraction: 1.5)", "inline");
        assert!(result.is_err());

        let result = CombatConfig::from_ron_str("not ron at all", "bad.ron");
        assert!(matches!(result, Err(BrawlError::DataParseError { .. })));
    }
}
