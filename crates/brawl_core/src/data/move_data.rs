//! Move definitions: frame data, hitboxes, cancel rules.

use serde::{Deserialize, Serialize};

use crate::error::BrawlError;
use crate::math::{
    decimal_serde, decimal_vec_serde, option_decimal_vec_serde, Fixed, Vec2Fixed,
};

use super::status_data::StatusDuration;

/// Broad kind of a move.
///
/// The category decides which cancel rule applies and which combat state
/// the move's active phase reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MoveCategory {
    /// Fast, weak strike.
    LightAttack,
    /// Slow, strong strike. Breaks armor.
    HeavyAttack,
    /// Character-specific attack.
    Special,
    /// Burst of horizontal movement.
    Dash,
    /// Evasive movement with invincibility.
    Dodge,
    /// Held guard.
    Block,
    /// Timed counter that staggers the attacker.
    Parry,
}

impl MoveCategory {
    /// Whether the move activates hitboxes during its active phase.
    #[must_use]
    pub const fn is_attack(self) -> bool {
        matches!(
            self,
            MoveCategory::LightAttack | MoveCategory::HeavyAttack | MoveCategory::Special
        )
    }

    /// Whether the move drives the fighter at dash speed.
    #[must_use]
    pub const fn is_evasive(self) -> bool {
        matches!(self, MoveCategory::Dash | MoveCategory::Dodge)
    }
}

/// One hitbox of a move.
///
/// Frames are counted from the first active frame of the move (frame 0).
/// The hitbox is enabled while that frame lies in
/// `[active_start_frame, active_end_frame)`; an absent end means "until the
/// move's active window closes".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitboxSpec {
    /// Label used in diagnostics.
    #[serde(default = "default_hitbox_name")]
    pub name: String,

    /// Offset from the owner's position, for a fighter facing right.
    #[serde(default, with = "decimal_vec_serde")]
    pub offset: Vec2Fixed,

    /// Full width and height.
    #[serde(default = "default_box_size", with = "decimal_vec_serde")]
    pub size: Vec2Fixed,

    /// First enabled active frame.
    #[serde(default)]
    pub active_start_frame: u32,

    /// First active frame at which the hitbox is disabled again.
    #[serde(default)]
    pub active_end_frame: Option<u32>,

    /// Multiplier on the move's damage (sweetspots use > 1).
    #[serde(default = "default_multiplier", with = "decimal_serde")]
    pub damage_multiplier: Fixed,

    /// Multiplier on the move's knockback force.
    #[serde(default = "default_multiplier", with = "decimal_serde")]
    pub knockback_multiplier: Fixed,

    /// Replaces the move's knockback direction for this hitbox.
    #[serde(default, with = "option_decimal_vec_serde")]
    pub knockback_direction_override: Option<Vec2Fixed>,

    /// Presentation hint; has no effect on the simulation.
    #[serde(default)]
    pub is_sweetspot: bool,
}

fn default_hitbox_name() -> String {
    "hitbox".to_string()
}

fn default_box_size() -> Vec2Fixed {
    Vec2Fixed::from_ints(1, 1)
}

fn default_multiplier() -> Fixed {
    Fixed::ONE
}

impl Default for HitboxSpec {
    fn default() -> Self {
        Self {
            name: default_hitbox_name(),
            offset: Vec2Fixed::ZERO,
            size: default_box_size(),
            active_start_frame: 0,
            active_end_frame: None,
            damage_multiplier: Fixed::ONE,
            knockback_multiplier: Fixed::ONE,
            knockback_direction_override: None,
            is_sweetspot: false,
        }
    }
}

impl HitboxSpec {
    /// Exclusive end frame, resolved against the move's active window.
    #[must_use]
    pub fn active_end(&self, move_active_frames: u32) -> u32 {
        self.active_end_frame
            .map_or(move_active_frames, |end| end.min(move_active_frames))
    }

    /// Whether the hitbox is enabled on the given active frame.
    #[must_use]
    pub fn is_enabled_at(&self, active_frame: u32, move_active_frames: u32) -> bool {
        active_frame >= self.active_start_frame
            && active_frame < self.active_end(move_active_frames)
    }
}

/// Inclusive frame range during which a move may be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CancelWindow {
    /// First cancellable frame.
    pub start: u32,
    /// Last cancellable frame.
    pub end: u32,
}

impl CancelWindow {
    /// Create a window covering `start..=end`.
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Whether `frame` lies inside the window.
    #[must_use]
    pub const fn contains(&self, frame: u32) -> bool {
        frame >= self.start && frame <= self.end
    }
}

/// Which categories of move may cancel this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CancelRules {
    /// Allow cancelling into a Dodge.
    #[serde(default)]
    pub into_dodge: bool,
    /// Allow cancelling into a Block.
    #[serde(default)]
    pub into_block: bool,
    /// Allow cancelling into any other category.
    #[serde(default)]
    pub into_other: bool,
}

impl CancelRules {
    /// Whether a move of `category` is allowed to cancel this one.
    #[must_use]
    pub const fn permits(&self, category: MoveCategory) -> bool {
        match category {
            MoveCategory::Dodge => self.into_dodge,
            MoveCategory::Block => self.into_block,
            _ => self.into_other,
        }
    }
}

/// A status effect a move applies, by status name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusApplication {
    /// Name of the status definition.
    pub status: String,
    /// Stacks to add.
    #[serde(default = "default_stacks")]
    pub stacks: u32,
    /// Replaces the status' base duration when present.
    #[serde(default)]
    pub duration: Option<StatusDuration>,
}

const fn default_stacks() -> u32 {
    1
}

impl StatusApplication {
    /// Apply `stacks` of the named status with its base duration.
    #[must_use]
    pub fn new(status: impl Into<String>, stacks: u32) -> Self {
        Self {
            status: status.into(),
            stacks,
            duration: None,
        }
    }

    /// Builder method to override the status duration.
    #[must_use]
    pub fn with_duration(mut self, duration: StatusDuration) -> Self {
        self.duration = Some(duration);
        self
    }
}

/// Immutable definition of a move.
///
/// # Example RON
///
/// ```ron
/// MoveDefinition(
///     name: "jab",
///     category: LightAttack,
///     startup_frames: 4,
///     active_frames: 2,
///     recovery_frames: 8,
///     damage: 10.0,
///     knockback_force: 3.0,
///     hitboxes: [HitboxSpec(offset: (0.8, 1.0), size: (1.0, 0.5))],
///     cancel_window: Some(CancelWindow(start: 6, end: 12)),
///     cancel_rules: CancelRules(into_other: true),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveDefinition {
    /// Unique move name.
    pub name: String,

    /// Move category.
    pub category: MoveCategory,

    /// Frames before the active window.
    #[serde(default = "default_startup")]
    pub startup_frames: u32,

    /// Frames during which hitboxes (or the defensive state) are live.
    #[serde(default = "default_active")]
    pub active_frames: u32,

    /// Frames after the active window before the fighter is free.
    #[serde(default = "default_recovery")]
    pub recovery_frames: u32,

    /// Base damage before multipliers.
    #[serde(default, with = "decimal_serde")]
    pub damage: Fixed,

    /// Knockback impulse magnitude.
    #[serde(default, with = "decimal_serde")]
    pub knockback_force: Fixed,

    /// Knockback direction for an attacker facing right.
    #[serde(default = "default_knockback_direction", with = "decimal_vec_serde")]
    pub knockback_direction: Vec2Fixed,

    /// Ticks both fighters freeze when the move connects.
    #[serde(default)]
    pub hitstop_frames: u32,

    /// Stun applied to a blocking target.
    #[serde(default)]
    pub blockstun_frames: u32,

    /// Stun applied to a hit target.
    #[serde(default)]
    pub hitstun_frames: u32,

    /// Ordered hitboxes.
    #[serde(default)]
    pub hitboxes: Vec<HitboxSpec>,

    /// Legacy single hitbox; folded into `hitboxes` at load time.
    #[serde(default)]
    pub hitbox: Option<HitboxSpec>,

    /// Frames `1..=armor_frames` absorb hits without interruption.
    #[serde(default)]
    pub armor_frames: u32,

    /// Leading active frames during which the fighter cannot be hit.
    #[serde(default)]
    pub invincibility_frames: u32,

    /// Whether a heavy attack breaks this move's armor outright.
    #[serde(default = "default_true")]
    pub armor_breaks_on_heavy: bool,

    /// Frames during which the move may be cancelled.
    #[serde(default)]
    pub cancel_window: Option<CancelWindow>,

    /// Categories allowed to cancel this move.
    #[serde(default)]
    pub cancel_rules: CancelRules,

    /// How long a rejected request for this move stays buffered, in seconds.
    #[serde(default = "default_buffer_window", with = "decimal_serde")]
    pub input_buffer_window: Fixed,

    /// Statuses applied to the target on hit.
    #[serde(default)]
    pub status_effects_on_hit: Vec<StatusApplication>,

    /// Statuses applied to the user when the move starts.
    #[serde(default)]
    pub status_effects_on_self: Vec<StatusApplication>,
}

const fn default_startup() -> u32 {
    5
}

const fn default_active() -> u32 {
    3
}

const fn default_recovery() -> u32 {
    10
}

const fn default_true() -> bool {
    true
}

fn default_knockback_direction() -> Vec2Fixed {
    Vec2Fixed::RIGHT
}

fn default_buffer_window() -> Fixed {
    Fixed::ONE / Fixed::from_num(10)
}

impl MoveDefinition {
    /// Create a move with default frame data and no hitboxes.
    #[must_use]
    pub fn new(name: impl Into<String>, category: MoveCategory) -> Self {
        Self {
            name: name.into(),
            category,
            startup_frames: default_startup(),
            active_frames: default_active(),
            recovery_frames: default_recovery(),
            damage: Fixed::ZERO,
            knockback_force: Fixed::ZERO,
            knockback_direction: default_knockback_direction(),
            hitstop_frames: 0,
            blockstun_frames: 0,
            hitstun_frames: 0,
            hitboxes: Vec::new(),
            hitbox: None,
            armor_frames: 0,
            invincibility_frames: 0,
            armor_breaks_on_heavy: true,
            cancel_window: None,
            cancel_rules: CancelRules::default(),
            input_buffer_window: default_buffer_window(),
            status_effects_on_hit: Vec::new(),
            status_effects_on_self: Vec::new(),
        }
    }

    /// Builder method to set startup, active and recovery frames.
    #[must_use]
    pub fn with_frames(mut self, startup: u32, active: u32, recovery: u32) -> Self {
        self.startup_frames = startup;
        self.active_frames = active;
        self.recovery_frames = recovery;
        self
    }

    /// Builder method to set base damage.
    #[must_use]
    pub fn with_damage(mut self, damage: Fixed) -> Self {
        self.damage = damage;
        self
    }

    /// Builder method to set knockback force and direction.
    #[must_use]
    pub fn with_knockback(mut self, force: Fixed, direction: Vec2Fixed) -> Self {
        self.knockback_force = force;
        self.knockback_direction = direction;
        self
    }

    /// Builder method to set hitstop, hitstun and blockstun.
    #[must_use]
    pub fn with_stun(mut self, hitstop: u32, hitstun: u32, blockstun: u32) -> Self {
        self.hitstop_frames = hitstop;
        self.hitstun_frames = hitstun;
        self.blockstun_frames = blockstun;
        self
    }

    /// Builder method to append a hitbox.
    #[must_use]
    pub fn with_hitbox(mut self, hitbox: HitboxSpec) -> Self {
        self.hitboxes.push(hitbox);
        self
    }

    /// Builder method to set the cancel window and rules.
    #[must_use]
    pub fn with_cancel(mut self, window: CancelWindow, rules: CancelRules) -> Self {
        self.cancel_window = Some(window);
        self.cancel_rules = rules;
        self
    }

    /// Builder method to set armor and invincibility frames.
    #[must_use]
    pub fn with_protection(mut self, armor: u32, invincibility: u32) -> Self {
        self.armor_frames = armor;
        self.invincibility_frames = invincibility;
        self
    }

    /// Builder method to add an on-hit status.
    #[must_use]
    pub fn with_status_on_hit(mut self, application: StatusApplication) -> Self {
        self.status_effects_on_hit.push(application);
        self
    }

    /// Builder method to add an on-self status.
    #[must_use]
    pub fn with_status_on_self(mut self, application: StatusApplication) -> Self {
        self.status_effects_on_self.push(application);
        self
    }

    /// Total length of the move in frames.
    #[must_use]
    pub const fn total_frames(&self) -> u32 {
        self.startup_frames + self.active_frames + self.recovery_frames
    }

    /// Fold the legacy single hitbox into the hitbox list.
    ///
    /// A legacy hitbox is ignored when the list is already populated.
    pub fn normalize(&mut self) {
        if let Some(legacy) = self.hitbox.take() {
            if self.hitboxes.is_empty() {
                self.hitboxes.push(legacy);
            }
        }
    }

    /// Check this move's data invariants.
    ///
    /// Returns every violation found; an empty list means the move is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<BrawlError> {
        let mut errors = Vec::new();
        let mut invalid = |reason: String| {
            errors.push(BrawlError::InvalidDefinition {
                kind: "move",
                name: self.name.clone(),
                reason,
            });
        };

        if self.name.is_empty() {
            invalid("name must not be empty".to_string());
        }
        if self.damage < Fixed::ZERO {
            invalid(format!("damage {} is negative", self.damage));
        }
        if self.knockback_force < Fixed::ZERO {
            invalid(format!("knockback force {} is negative", self.knockback_force));
        }
        if self.input_buffer_window < Fixed::ZERO {
            invalid("input buffer window is negative".to_string());
        }

        if let Some(window) = self.cancel_window {
            if window.start > window.end {
                invalid(format!(
                    "cancel window start {} is after end {}",
                    window.start, window.end
                ));
            }
            if window.end > self.total_frames() {
                invalid(format!(
                    "cancel window end {} exceeds total frames {}",
                    window.end,
                    self.total_frames()
                ));
            }
        }

        if self.category.is_attack() && self.hitboxes.is_empty() && self.hitbox.is_none() {
            invalid("attacking move has no hitboxes".to_string());
        }

        for hitbox in self.hitboxes.iter().chain(self.hitbox.iter()) {
            if let Some(end) = hitbox.active_end_frame {
                if hitbox.active_start_frame > end {
                    invalid(format!(
                        "hitbox '{}' starts at {} after it ends at {}",
                        hitbox.name, hitbox.active_start_frame, end
                    ));
                }
            }
            if hitbox.size.x <= Fixed::ZERO || hitbox.size.y <= Fixed::ZERO {
                invalid(format!("hitbox '{}' has a non-positive size", hitbox.name));
            }
            if hitbox.damage_multiplier < Fixed::ZERO || hitbox.knockback_multiplier < Fixed::ZERO
            {
                invalid(format!("hitbox '{}' has a negative multiplier", hitbox.name));
            }
        }

        for application in self
            .status_effects_on_hit
            .iter()
            .chain(&self.status_effects_on_self)
        {
            if application.stacks == 0 {
                invalid(format!("status '{}' applied with zero stacks", application.status));
            }
        }

        errors
    }
}
