//! Combat events emitted by the simulation.
//!
//! The simulation never calls back into the outside world. Everything
//! observable about a tick is pushed, in order, into an [`EventSink`];
//! presentation layers, replays and tests read the resulting stream.

use serde::{Deserialize, Serialize};

use crate::combat_state::CombatState;
use crate::data::{ConditionId, MoveId, StatusId};
use crate::fighter::FighterId;
use crate::math::{decimal_serde, decimal_vec_serde, Fixed, Vec2Fixed};

/// Why a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundEndReason {
    /// A fighter's health reached zero.
    KnockOut,
    /// The round timer ran out.
    TimeOut,
}

/// A single observable occurrence during a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// A fighter's combat state changed.
    StateChanged {
        /// Fighter.
        fighter: FighterId,
        /// Previous state.
        from: CombatState,
        /// New state.
        to: CombatState,
    },
    /// A move began executing.
    MoveStarted {
        /// Fighter.
        fighter: FighterId,
        /// Move.
        move_id: MoveId,
    },
    /// A move finished or was interrupted.
    MoveEnded {
        /// Fighter.
        fighter: FighterId,
        /// Move.
        move_id: MoveId,
        /// True when cut short by stun, stagger, armor break or a cancel.
        interrupted: bool,
    },
    /// A move's hitboxes were instantiated.
    HitboxActivated {
        /// Owner.
        fighter: FighterId,
        /// Move.
        move_id: MoveId,
        /// Number of hitboxes.
        count: usize,
    },
    /// A move's hitboxes were removed.
    HitboxDeactivated {
        /// Owner.
        fighter: FighterId,
        /// Move.
        move_id: MoveId,
    },
    /// A hit landed.
    DamageDealt {
        /// Attacker.
        attacker: FighterId,
        /// Target.
        target: FighterId,
        /// Attacking move.
        move_id: MoveId,
        /// Index of the hitbox that connected.
        hitbox: usize,
        /// Name of the hurtbox that was struck.
        hurtbox: String,
        /// Final damage.
        #[serde(with = "decimal_serde")]
        damage: Fixed,
        /// Knockback impulse applied to the target.
        #[serde(with = "decimal_vec_serde")]
        knockback: Vec2Fixed,
    },
    /// A hit was blocked.
    Blocked {
        /// Attacker.
        attacker: FighterId,
        /// Blocking fighter.
        target: FighterId,
        /// Attacking move.
        move_id: MoveId,
        /// Damage dealt through the block.
        #[serde(with = "decimal_serde")]
        chip_damage: Fixed,
    },
    /// A hit was parried and the attacker staggered.
    Parried {
        /// Attacker.
        attacker: FighterId,
        /// Parrying fighter.
        defender: FighterId,
        /// Parried move.
        move_id: MoveId,
    },
    /// A hit landed on armor and did not interrupt.
    ArmorAbsorbed {
        /// Attacker.
        attacker: FighterId,
        /// Armored fighter.
        defender: FighterId,
        /// Hits absorbed by the current armor.
        hits: u32,
    },
    /// Attacker and target froze for hitstop.
    HitstopStarted {
        /// Attacker.
        attacker: FighterId,
        /// Target.
        target: FighterId,
        /// Frozen ticks.
        frames: u32,
    },
    /// A fighter's health changed.
    HealthChanged {
        /// Fighter.
        fighter: FighterId,
        /// Health before.
        #[serde(with = "decimal_serde")]
        previous: Fixed,
        /// Health after.
        #[serde(with = "decimal_serde")]
        current: Fixed,
        /// Maximum health.
        #[serde(with = "decimal_serde")]
        max: Fixed,
    },
    /// A fighter's health reached zero. Emitted once per round.
    KnockedOut {
        /// Fighter.
        fighter: FighterId,
    },
    /// A status was newly applied.
    StatusApplied {
        /// Owner.
        fighter: FighterId,
        /// Status.
        status: StatusId,
        /// Stacks after application.
        stacks: u32,
    },
    /// An existing status gained stacks.
    StatusStacksChanged {
        /// Owner.
        fighter: FighterId,
        /// Status.
        status: StatusId,
        /// New stack count.
        stacks: u32,
    },
    /// A status expired or was removed.
    StatusRemoved {
        /// Owner.
        fighter: FighterId,
        /// Status.
        status: StatusId,
        /// Stacks it had when removed.
        stacks: u32,
    },
    /// A status dealt periodic damage.
    DamageOverTime {
        /// Owner.
        fighter: FighterId,
        /// Status.
        status: StatusId,
        /// Damage dealt.
        #[serde(with = "decimal_serde")]
        damage: Fixed,
    },
    /// An adaptive condition switched on.
    ConditionActivated {
        /// Condition.
        condition: ConditionId,
        /// Announcement, when the condition shows one.
        banner: Option<String>,
    },
    /// An adaptive condition ran out or was switched off.
    ConditionEnded {
        /// Condition.
        condition: ConditionId,
    },
    /// A round began.
    RoundStarted {
        /// One-based round number.
        round: u32,
    },
    /// A round finished.
    RoundEnded {
        /// One-based round number.
        round: u32,
        /// Winner, or `None` for a draw.
        winner: Option<FighterId>,
        /// How the round was decided.
        reason: RoundEndReason,
    },
    /// The match finished.
    MatchEnded {
        /// Winner, or `None` for a draw.
        winner: Option<FighterId>,
    },
    /// An operation was rejected because of a missing reference.
    Diagnostic {
        /// Fighter involved, if any.
        fighter: Option<FighterId>,
        /// Human-readable reason.
        reason: String,
    },
}

/// Receiver of combat events.
pub trait EventSink {
    /// Record one event.
    fn emit(&mut self, event: CombatEvent);
}

impl EventSink for Vec<CombatEvent> {
    fn emit(&mut self, event: CombatEvent) {
        self.push(event);
    }
}

/// Events generated during a simulation tick.
///
/// These events can be used by the presentation layer to trigger effects,
/// sounds, animations, etc.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickEvents {
    /// Tick that produced the events.
    pub tick: u64,
    /// Events in emission order.
    pub events: Vec<CombatEvent>,
}

impl EventSink for TickEvents {
    fn emit(&mut self, event: CombatEvent) {
        self.events.push(event);
    }
}

impl TickEvents {
    /// Create an empty event list for `tick`.
    #[must_use]
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            events: Vec::new(),
        }
    }

    /// Whether nothing happened.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterate over the events.
    pub fn iter(&self) -> impl Iterator<Item = &CombatEvent> {
        self.events.iter()
    }

    /// Total damage dealt by hits this tick.
    #[must_use]
    pub fn total_hit_damage(&self) -> Fixed {
        self.events
            .iter()
            .filter_map(|event| match event {
                CombatEvent::DamageDealt { damage, .. } => Some(*damage),
                _ => None,
            })
            .fold(Fixed::ZERO, |acc, damage| acc + damage)
    }

    /// Fighters knocked out this tick.
    #[must_use]
    pub fn knockouts(&self) -> Vec<FighterId> {
        self.events
            .iter()
            .filter_map(|event| match event {
                CombatEvent::KnockedOut { fighter } => Some(*fighter),
                _ => None,
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a TickEvents {
    type Item = &'a CombatEvent;
    type IntoIter = std::slice::Iter<'a, CombatEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_events_collects_in_order() {
        let mut events = TickEvents::new(7);
        events.emit(CombatEvent::KnockedOut {
            fighter: FighterId(2),
        });
        events.emit(CombatEvent::DamageDealt {
            attacker: FighterId(1),
            target: FighterId(2),
            move_id: MoveId(0),
            hitbox: 0,
            hurtbox: "body".to_string(),
            damage: Fixed::from_num(12),
            knockback: Vec2Fixed::ZERO,
        });

        assert_eq!(events.tick, 7);
        assert_eq!(events.knockouts(), vec![FighterId(2)]);
        assert_eq!(events.total_hit_damage(), Fixed::from_num(12));
        assert_eq!((&events).into_iter().count(), 2);
    }

    #[test]
    fn test_vec_sink() {
        let mut sink: Vec<CombatEvent> = Vec::new();
        sink.emit(CombatEvent::RoundStarted { round: 1 });
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_events_serialize_as_json_decimals() {
        let event = CombatEvent::HealthChanged {
            fighter: FighterId(1),
            previous: Fixed::from_num(100),
            current: Fixed::from_num(82),
            max: Fixed::from_num(100),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"current\":82.0"), "{json}");
        assert!(json.contains("\"max\":100.0"), "{json}");
    }
}
