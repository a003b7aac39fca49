//! Runtime hitboxes and hurtboxes, and overlap detection between them.
//!
//! Each fighter owns one [`HitboxSet`]. Activating a move instantiates one
//! runtime box per [`HitboxSpec`] and clears the set of fighters already
//! hit, so a single activation can strike each target at most once no
//! matter how many of its boxes overlap.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::data::{HitboxSpec, HurtboxSpec, MoveDefinition, MoveId};
use crate::events::{CombatEvent, EventSink};
use crate::fighter::{Facing, FighterId};
use crate::math::{fixed_serde, Aabb, Fixed, Vec2Fixed};

/// Place a box authored for a right-facing fighter in world space.
#[must_use]
pub fn place_box(offset: Vec2Fixed, size: Vec2Fixed, position: Vec2Fixed, facing: Facing) -> Aabb {
    let offset = match facing {
        Facing::Right => offset,
        Facing::Left => offset.mirror_x(),
    };
    Aabb::new(position + offset, size)
}

/// A live hitbox of a move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitboxInstance {
    /// Index into the move's hitbox list.
    pub spec_index: usize,
    /// World-space bounds.
    pub bounds: Aabb,
    /// Whether the hitbox is live on the current frame.
    pub enabled: bool,
}

/// A live hurtbox of a fighter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HurtboxInstance {
    /// Region name.
    pub name: String,
    /// World-space bounds.
    pub bounds: Aabb,
    /// Whether the hurtbox can be struck.
    pub enabled: bool,
    /// Multiplier on damage taken through this region.
    #[serde(with = "fixed_serde")]
    pub damage_multiplier: Fixed,
    offset: Vec2Fixed,
}

impl HurtboxInstance {
    /// Instantiate a fighter's hurtboxes at `position`.
    #[must_use]
    pub fn from_specs(specs: &[HurtboxSpec], position: Vec2Fixed, facing: Facing) -> Vec<Self> {
        specs
            .iter()
            .map(|spec| Self {
                name: spec.name.clone(),
                bounds: place_box(spec.offset, spec.size, position, facing),
                enabled: spec.active,
                damage_multiplier: spec.damage_multiplier,
                offset: spec.offset,
            })
            .collect()
    }

    /// Move the hurtbox with its owner.
    pub fn follow(&mut self, position: Vec2Fixed, facing: Facing) {
        self.bounds = place_box(self.offset, self.bounds.size, position, facing);
    }
}

/// The hitboxes of a fighter's current move, plus who they already hit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitboxSet {
    active_move: Option<MoveId>,
    boxes: Vec<HitboxInstance>,
    hit_targets: BTreeSet<FighterId>,
}

impl HitboxSet {
    /// Create an empty, inactive set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiate the hitboxes of `definition` and forget previous hits.
    pub fn activate(
        &mut self,
        owner: FighterId,
        move_id: MoveId,
        definition: &MoveDefinition,
        position: Vec2Fixed,
        facing: Facing,
        sink: &mut dyn EventSink,
    ) {
        self.hit_targets.clear();
        self.active_move = Some(move_id);
        self.boxes = definition
            .hitboxes
            .iter()
            .enumerate()
            .map(|(spec_index, spec)| HitboxInstance {
                spec_index,
                bounds: place_box(spec.offset, spec.size, position, facing),
                enabled: spec.is_enabled_at(0, definition.active_frames),
            })
            .collect();
        sink.emit(CombatEvent::HitboxActivated {
            fighter: owner,
            move_id,
            count: self.boxes.len(),
        });
    }

    /// Remove all hitboxes. Returns whether any were active.
    pub fn deactivate(&mut self, owner: FighterId, sink: &mut dyn EventSink) -> bool {
        let Some(move_id) = self.active_move.take() else {
            return false;
        };
        self.boxes.clear();
        sink.emit(CombatEvent::HitboxDeactivated {
            fighter: owner,
            move_id,
        });
        true
    }

    /// Drop everything without emitting events.
    pub fn clear(&mut self) {
        self.active_move = None;
        self.boxes.clear();
        self.hit_targets.clear();
    }

    /// Toggle hitboxes for `active_frame` and move them with their owner.
    pub fn update(
        &mut self,
        definition: &MoveDefinition,
        active_frame: u32,
        position: Vec2Fixed,
        facing: Facing,
    ) {
        for instance in &mut self.boxes {
            let Some(spec) = definition.hitboxes.get(instance.spec_index) else {
                instance.enabled = false;
                continue;
            };
            instance.enabled = spec.is_enabled_at(active_frame, definition.active_frames);
            instance.bounds = place_box(spec.offset, spec.size, position, facing);
        }
    }

    /// Move every hitbox with its owner without changing which are enabled.
    pub fn follow(&mut self, definition: &MoveDefinition, position: Vec2Fixed, facing: Facing) {
        for instance in &mut self.boxes {
            if let Some(spec) = definition.hitboxes.get(instance.spec_index) {
                instance.bounds = place_box(spec.offset, spec.size, position, facing);
            }
        }
    }

    /// Move that owns the hitboxes, if active.
    #[must_use]
    pub const fn active_move(&self) -> Option<MoveId> {
        self.active_move
    }

    /// Whether a move's hitboxes are instantiated.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active_move.is_some()
    }

    /// Runtime hitboxes in declaration order.
    #[must_use]
    pub fn boxes(&self) -> &[HitboxInstance] {
        &self.boxes
    }

    /// Whether `target` was already hit by this activation.
    #[must_use]
    pub fn has_hit(&self, target: FighterId) -> bool {
        self.hit_targets.contains(&target)
    }

    /// Record a hit on `target`. Returns false if it was already recorded.
    pub fn mark_hit(&mut self, target: FighterId) -> bool {
        self.hit_targets.insert(target)
    }
}

/// A fighter that hitboxes may strike.
#[derive(Debug, Clone, Copy)]
pub struct TargetView<'a> {
    /// Fighter id.
    pub id: FighterId,
    /// Its hurtboxes, in collision order.
    pub hurtboxes: &'a [HurtboxInstance],
    /// False while invincible or knocked out.
    pub vulnerable: bool,
}

/// First overlap between an attacker's hitbox and a target's hurtbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Contact {
    /// Attacking fighter.
    pub attacker: FighterId,
    /// Struck fighter.
    pub target: FighterId,
    /// Attacking move.
    pub move_id: MoveId,
    /// Index of the hitbox that connected.
    pub hitbox_index: usize,
    /// Index of the hurtbox that was struck.
    pub hurtbox_index: usize,
}

/// Collision between hitboxes and hurtboxes.
pub struct HitboxResolver;

impl HitboxResolver {
    /// Find at most one contact per target for `attacker`'s hitboxes.
    ///
    /// Hitboxes are tried in declaration order, targets in the order given,
    /// hurtboxes in declaration order. Targets already hit by this
    /// activation, or not vulnerable, are skipped.
    #[must_use]
    pub fn detect(attacker: FighterId, set: &HitboxSet, targets: &[TargetView<'_>]) -> Vec<Contact> {
        let mut contacts: Vec<Contact> = Vec::new();
        let Some(move_id) = set.active_move else {
            return contacts;
        };

        for hitbox in set.boxes.iter().filter(|b| b.enabled) {
            for target in targets {
                if target.id == attacker
                    || !target.vulnerable
                    || set.has_hit(target.id)
                    || contacts.iter().any(|c| c.target == target.id)
                {
                    continue;
                }
                let struck = target
                    .hurtboxes
                    .iter()
                    .position(|hurtbox| hurtbox.enabled && hitbox.bounds.overlaps(&hurtbox.bounds));
                if let Some(hurtbox_index) = struck {
                    contacts.push(Contact {
                        attacker,
                        target: target.id,
                        move_id,
                        hitbox_index: hitbox.spec_index,
                        hurtbox_index,
                    });
                }
            }
        }

        contacts
    }
}

/// Active window of `spec` as a half-open range of active frames.
#[must_use]
pub fn hitbox_window(spec: &HitboxSpec, move_active_frames: u32) -> std::ops::Range<u32> {
    spec.active_start_frame..spec.active_end(move_active_frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MoveCategory;

    const ATTACKER: FighterId = FighterId(1);
    const TARGET: FighterId = FighterId(2);

    fn sweep() -> MoveDefinition {
        MoveDefinition::new("sweep", MoveCategory::LightAttack)
            .with_frames(4, 8, 8)
            .with_hitbox(HitboxSpec {
                offset: Vec2Fixed::from_ints(1, 1),
                ..HitboxSpec::default()
            })
            .with_hitbox(HitboxSpec {
                offset: Vec2Fixed::from_ints(1, 1),
                active_start_frame: 3,
                active_end_frame: Some(5),
                damage_multiplier: Fixed::from_num(1.5),
                ..HitboxSpec::default()
            })
    }

    fn body_at(x: i32) -> Vec<HurtboxInstance> {
        HurtboxInstance::from_specs(
            &[HurtboxSpec::new(
                "body",
                Vec2Fixed::from_ints(0, 1),
                Vec2Fixed::from_ints(1, 2),
            )],
            Vec2Fixed::from_ints(x, 0),
            Facing::Left,
        )
    }

    #[test]
    fn test_place_box_mirrors_offset() {
        let size = Vec2Fixed::from_ints(1, 1);
        let right = place_box(Vec2Fixed::from_ints(2, 1), size, Vec2Fixed::ZERO, Facing::Right);
        let left = place_box(Vec2Fixed::from_ints(2, 1), size, Vec2Fixed::ZERO, Facing::Left);
        assert_eq!(right.center, Vec2Fixed::from_ints(2, 1));
        assert_eq!(left.center, Vec2Fixed::from_ints(-2, 1));
    }

    #[test]
    fn test_sub_window_enabled_only_on_its_frames() {
        let definition = sweep();
        let mut set = HitboxSet::new();
        let mut events = Vec::new();
        set.activate(ATTACKER, MoveId(0), &definition, Vec2Fixed::ZERO, Facing::Right, &mut events);

        let mut enabled_frames = Vec::new();
        for frame in 0..definition.active_frames {
            set.update(&definition, frame, Vec2Fixed::ZERO, Facing::Right);
            if set.boxes()[1].enabled {
                enabled_frames.push(frame);
            }
            assert!(set.boxes()[0].enabled);
        }
        assert_eq!(enabled_frames, vec![3, 4]);
        assert_eq!(hitbox_window(&definition.hitboxes[1], 8), 3..5);
    }

    #[test]
    fn test_one_contact_per_target_per_activation() {
        let definition = sweep();
        let mut set = HitboxSet::new();
        let mut events = Vec::new();
        set.activate(ATTACKER, MoveId(0), &definition, Vec2Fixed::ZERO, Facing::Right, &mut events);
        set.update(&definition, 3, Vec2Fixed::ZERO, Facing::Right);
        assert!(set.boxes().iter().all(|b| b.enabled));

        let hurtboxes = body_at(1);
        let targets = [TargetView {
            id: TARGET,
            hurtboxes: &hurtboxes,
            vulnerable: true,
        }];

        // Both hitboxes overlap; only the first in declaration order counts
        let contacts = HitboxResolver::detect(ATTACKER, &set, &targets);
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].hitbox_index, 0);

        assert!(set.mark_hit(TARGET));
        assert!(HitboxResolver::detect(ATTACKER, &set, &targets).is_empty());

        // Reactivation clears the hit set
        set.activate(ATTACKER, MoveId(0), &definition, Vec2Fixed::ZERO, Facing::Right, &mut events);
        assert!(!set.has_hit(TARGET));
    }

    #[test]
    fn test_invulnerable_and_distant_targets_skipped() {
        let definition = sweep();
        let mut set = HitboxSet::new();
        let mut events = Vec::new();
        set.activate(ATTACKER, MoveId(0), &definition, Vec2Fixed::ZERO, Facing::Right, &mut events);

        let near = body_at(1);
        let far = body_at(6);
        let targets = [
            TargetView {
                id: TARGET,
                hurtboxes: &near,
                vulnerable: false,
            },
            TargetView {
                id: FighterId(3),
                hurtboxes: &far,
                vulnerable: true,
            },
        ];
        assert!(HitboxResolver::detect(ATTACKER, &set, &targets).is_empty());
    }

    #[test]
    fn test_deactivate_emits_once() {
        let definition = sweep();
        let mut set = HitboxSet::new();
        let mut events = Vec::new();
        set.activate(ATTACKER, MoveId(0), &definition, Vec2Fixed::ZERO, Facing::Right, &mut events);
        assert!(set.deactivate(ATTACKER, &mut events));
        assert!(!set.deactivate(ATTACKER, &mut events));
        assert!(!set.is_active());
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_hurtbox_follows_owner() {
        let mut hurtboxes = body_at(0);
        hurtboxes[0].follow(Vec2Fixed::from_ints(3, 0), Facing::Right);
        assert_eq!(hurtboxes[0].bounds.center, Vec2Fixed::from_ints(3, 1));
    }
}
