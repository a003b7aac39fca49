//! Adaptive condition definitions.
//!
//! A condition is a match-wide effect (slippery floor, thick fog, a blood
//! moon, a low-health frenzy) that switches on when one of its triggers
//! fires and reshapes physics, fighter stats and move properties while it
//! lasts.

use serde::{Deserialize, Serialize};

use super::status_data::{ModifierOp, StatKind, StatModifier, StatusDuration};
use crate::error::BrawlError;
use crate::math::{decimal_serde, Fixed};

/// Broad kind of a condition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionKind {
    /// Stage hazards such as a slippery floor.
    StageEnvironment,
    /// Weather such as fog or wind.
    Weather,
    /// Match-wide rule changes.
    #[default]
    MatchModifier,
    /// Tied to the state of the current round; cleared between rounds.
    RoundState,
}

impl ConditionKind {
    /// Whether conditions of this kind end when a new round begins.
    #[must_use]
    pub const fn clears_between_rounds(self) -> bool {
        matches!(self, ConditionKind::RoundState)
    }
}

/// What switches a condition on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerKind {
    /// The first round of the match begins.
    MatchStart,
    /// Any round begins.
    RoundStart,
    /// Some fighter's health fraction drops below the threshold, in `(0, 1]`.
    HealthBelow(#[serde(with = "decimal_serde")] Fixed),
    /// This many seconds of the current round have passed.
    TimeElapsed(#[serde(with = "decimal_serde")] Fixed),
}

/// A trigger and whether it may fire more than once per match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConditionTrigger {
    /// Firing rule.
    pub on: TriggerKind,
    /// Fire at most once per match.
    #[serde(default)]
    pub once: bool,
}

/// Match-wide physics and rule values a condition can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlobalProperty {
    /// Downward acceleration.
    Gravity,
    /// Grounded velocity retention.
    Friction,
    /// Airborne walk speed fraction.
    AirControl,
    /// Terminal falling speed.
    MaxFallSpeed,
    /// Fraction of damage dealt through a block.
    ChipDamage,
    /// Fraction of knockback applied to a blocking target.
    BlockKnockback,
}

/// A change to a [`GlobalProperty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlobalModifier {
    /// Affected property.
    pub property: GlobalProperty,
    /// Combination rule.
    pub operation: ModifierOp,
    /// Operand.
    #[serde(with = "decimal_serde")]
    pub value: Fixed,
}

/// Which fighters or moves a modifier applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// Every fighter or move.
    #[default]
    All,
    /// Only the definition with this name.
    Named(String),
}

impl Target {
    /// Whether a definition called `name` is targeted.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Target::All => true,
            Target::Named(target) => target == name,
        }
    }

    /// The targeted name, `None` for [`Target::All`].
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Target::All => None,
            Target::Named(name) => Some(name),
        }
    }
}

/// Changes to the moves of the targeted fighters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveModifier {
    /// Affected moves.
    #[serde(default)]
    pub moves: Target,
    /// Multiplier on the move's damage.
    #[serde(default = "default_multiplier", with = "decimal_serde")]
    pub damage_multiplier: Fixed,
    /// Armor frames added to the move when it starts.
    #[serde(default)]
    pub additional_armor_frames: u32,
}

fn default_multiplier() -> Fixed {
    Fixed::ONE
}

impl MoveModifier {
    /// A modifier for `moves` that changes nothing yet.
    #[must_use]
    pub fn new(moves: Target) -> Self {
        Self {
            moves,
            damage_multiplier: default_multiplier(),
            additional_armor_frames: 0,
        }
    }

    /// Builder method to set the damage multiplier.
    #[must_use]
    pub fn with_damage(mut self, multiplier: Fixed) -> Self {
        self.damage_multiplier = multiplier;
        self
    }

    /// Builder method to add armor frames.
    #[must_use]
    pub fn with_armor(mut self, frames: u32) -> Self {
        self.additional_armor_frames = frames;
        self
    }
}

/// Stat and move changes for the targeted fighters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FighterModifier {
    /// Affected fighters.
    #[serde(default)]
    pub fighter: Target,
    /// Stat changes, folded together with status modifiers.
    #[serde(default)]
    pub stat_modifiers: Vec<StatModifier>,
    /// Move changes.
    #[serde(default)]
    pub move_modifiers: Vec<MoveModifier>,
}

impl FighterModifier {
    /// A modifier for `fighter` that changes nothing yet.
    #[must_use]
    pub fn new(fighter: Target) -> Self {
        Self {
            fighter,
            ..Self::default()
        }
    }

    /// Builder method to add a stat change.
    #[must_use]
    pub fn with_stat(mut self, stat: StatKind, operation: ModifierOp, value: Fixed) -> Self {
        self.stat_modifiers.push(StatModifier {
            stat,
            operation,
            value,
        });
        self
    }

    /// Builder method to add a move change.
    #[must_use]
    pub fn with_move(mut self, modifier: MoveModifier) -> Self {
        self.move_modifiers.push(modifier);
        self
    }
}

/// Immutable definition of an adaptive condition.
///
/// # Example RON
///
/// ```ron
/// ConditionDefinition(
///     name: "blood_moon",
///     kind: MatchModifier,
///     duration: Seconds(20.0),
///     triggers: [ConditionTrigger(on: HealthBelow(0.3), once: true)],
///     fighter_modifiers: [
///         FighterModifier(
///             stat_modifiers: [StatModifier(stat: Damage, operation: Multiply, value: 1.25)],
///         ),
///     ],
///     banner_text: Some("A blood moon rises"),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionDefinition {
    /// Unique name.
    pub name: String,

    /// Broad kind.
    #[serde(default)]
    pub kind: ConditionKind,

    /// Designer notes.
    #[serde(default)]
    pub description: String,

    /// How long the condition lasts once active.
    #[serde(default = "default_condition_duration")]
    pub duration: StatusDuration,

    /// Physics and rule changes.
    #[serde(default)]
    pub global_modifiers: Vec<GlobalModifier>,

    /// Fighter stat and move changes.
    #[serde(default)]
    pub fighter_modifiers: Vec<FighterModifier>,

    /// What switches the condition on. Empty means scripted activation only.
    #[serde(default)]
    pub triggers: Vec<ConditionTrigger>,

    /// Announce the condition when it activates.
    #[serde(default = "default_show_banner")]
    pub show_banner: bool,

    /// Announcement text; the name is used when absent.
    #[serde(default)]
    pub banner_text: Option<String>,
}

fn default_condition_duration() -> StatusDuration {
    StatusDuration::Seconds(Fixed::from_num(30))
}

const fn default_show_banner() -> bool {
    true
}

impl ConditionDefinition {
    /// Create a condition with the default duration and no effects.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ConditionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: String::new(),
            duration: default_condition_duration(),
            global_modifiers: Vec::new(),
            fighter_modifiers: Vec::new(),
            triggers: Vec::new(),
            show_banner: default_show_banner(),
            banner_text: None,
        }
    }

    /// Builder method to set the duration.
    #[must_use]
    pub fn with_duration(mut self, duration: StatusDuration) -> Self {
        self.duration = duration;
        self
    }

    /// Builder method to add a trigger.
    #[must_use]
    pub fn with_trigger(mut self, on: TriggerKind, once: bool) -> Self {
        self.triggers.push(ConditionTrigger { on, once });
        self
    }

    /// Builder method to add a global modifier.
    #[must_use]
    pub fn with_global(
        mut self,
        property: GlobalProperty,
        operation: ModifierOp,
        value: Fixed,
    ) -> Self {
        self.global_modifiers.push(GlobalModifier {
            property,
            operation,
            value,
        });
        self
    }

    /// Builder method to add a fighter modifier.
    #[must_use]
    pub fn with_fighter_modifier(mut self, modifier: FighterModifier) -> Self {
        self.fighter_modifiers.push(modifier);
        self
    }

    /// Announcement for activation, if the condition shows one.
    #[must_use]
    pub fn banner(&self) -> Option<&str> {
        if !self.show_banner {
            return None;
        }
        Some(self.banner_text.as_deref().unwrap_or(&self.name))
    }

    /// Check this condition's data invariants.
    ///
    /// Name references to fighters and moves are checked by the roster.
    #[must_use]
    pub fn validate(&self) -> Vec<BrawlError> {
        let mut errors = Vec::new();
        let mut invalid = |reason: String| {
            errors.push(BrawlError::InvalidDefinition {
                kind: "condition",
                name: self.name.clone(),
                reason,
            });
        };

        if self.name.is_empty() {
            invalid("name must not be empty".to_string());
        }
        if let StatusDuration::Seconds(seconds) = self.duration {
            if seconds <= Fixed::ZERO {
                invalid(format!("duration {seconds} is not positive"));
            }
        }
        for trigger in &self.triggers {
            match trigger.on {
                TriggerKind::HealthBelow(threshold)
                    if threshold <= Fixed::ZERO || threshold > Fixed::ONE =>
                {
                    invalid(format!("health threshold {threshold} is outside (0, 1]"));
                }
                TriggerKind::TimeElapsed(seconds) if seconds < Fixed::ZERO => {
                    invalid(format!("trigger time {seconds} is negative"));
                }
                _ => {}
            }
        }
        for modifier in self
            .fighter_modifiers
            .iter()
            .flat_map(|fighter| &fighter.move_modifiers)
        {
            if modifier.damage_multiplier < Fixed::ZERO {
                invalid(format!(
                    "move damage multiplier {} is negative",
                    modifier.damage_multiplier
                ));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults_from_ron() {
        let parsed: ConditionDefinition = ron::from_str(
            r#"ConditionDefinition(
                name: "fog",
                triggers: [ConditionTrigger(on: TimeElapsed(10.0))],
                fighter_modifiers: [FighterModifier(
                    move_modifiers: [MoveModifier(moves: Named("jab"), damage_multiplier: 0.5)],
                )],
            )"#,
        )
        .unwrap();

        assert_eq!(parsed.kind, ConditionKind::MatchModifier);
        assert_eq!(parsed.duration, StatusDuration::Seconds(Fixed::from_num(30)));
        assert!(!parsed.triggers[0].once);
        assert_eq!(parsed.banner(), Some("fog"));

        let fighter = &parsed.fighter_modifiers[0];
        assert_eq!(fighter.fighter, Target::All);
        assert_eq!(fighter.move_modifiers[0].moves.name(), Some("jab"));
        assert_eq!(fighter.move_modifiers[0].additional_armor_frames, 0);
    }

    #[test]
    fn test_banner() {
        let mut moon = ConditionDefinition::new("blood_moon", ConditionKind::MatchModifier);
        moon.banner_text = Some("A blood moon rises".to_string());
        assert_eq!(moon.banner(), Some("A blood moon rises"));

        moon.show_banner = false;
        assert_eq!(moon.banner(), None);
    }

    #[test]
    fn test_target_matches() {
        assert!(Target::All.matches("anyone"));
        assert!(Target::Named("tank".to_string()).matches("tank"));
        assert!(!Target::Named("tank".to_string()).matches("striker"));
    }

    #[test]
    fn test_validate() {
        let ok = ConditionDefinition::new("frenzy", ConditionKind::RoundState)
            .with_trigger(TriggerKind::HealthBelow(Fixed::from_num(0.25)), false);
        assert!(ok.validate().is_empty());

        let bad = ConditionDefinition::new("broken", ConditionKind::Weather)
            .with_duration(StatusDuration::Seconds(Fixed::ZERO))
            .with_trigger(TriggerKind::HealthBelow(Fixed::from_num(1.5)), false)
            .with_trigger(TriggerKind::TimeElapsed(Fixed::from_num(-1)), true)
            .with_fighter_modifier(
                FighterModifier::new(Target::All)
                    .with_move(MoveModifier::new(Target::All).with_damage(-Fixed::ONE)),
            );
        assert_eq!(bad.validate().len(), 4);
    }
}
