//! Core simulation loop.
//!
//! The simulation runs at a fixed tick rate and owns every mutable piece of
//! a fight. Outside code feeds it [`InputEvent`]s and reads back
//! [`TickEvents`] and [`FighterSnapshot`]s.
//!
//! # Determinism
//!
//! - No floating-point math inside a tick (uses [`Fixed`])
//! - Fighters are processed in ascending [`FighterId`] order
//! - Inputs are applied in the order given
//! - Same roster, config, spawns and inputs always produce the same fight
//!
//! # Tick phases
//!
//! 0. Active conditions reshape the tick's combat config
//! 1. Inputs: movement axes, jumps, block held, move requests
//! 2. Hitstop: frozen fighters skip phases 3 to 5 and count down
//! 3. State machines advance and hitboxes (de)activate. Buffered inputs
//!    retry; a move started here advances once more, like one from phase 1
//! 4. Hitbox frame windows
//! 5. Facing and movement
//! 6. Collision and damage
//! 7. Status effects
//! 8. Conditions count down, then health and time triggers fire
//! 9. Tick counter
//!
//! # Example
//!
//! ```
//! use brawl_core::config::CombatConfig;
//! use brawl_core::data::{FighterDefinition, HitboxSpec, MoveCategory, MoveDefinition, Roster, RosterData};
//! use brawl_core::fighter::Facing;
//! use brawl_core::input::{InputEvent, Intent};
//! use brawl_core::math::Vec2Fixed;
//! use brawl_core::simulation::Simulation;
//!
//! let roster = Roster::load(RosterData {
//!     moves: vec![
//!         MoveDefinition::new("jab", MoveCategory::LightAttack).with_hitbox(HitboxSpec::default()),
//!         MoveDefinition::new("kick", MoveCategory::HeavyAttack).with_hitbox(HitboxSpec::default()),
//!     ],
//!     statuses: vec![],
//!     fighters: vec![FighterDefinition::new("striker", "jab", "kick")],
//!     conditions: vec![],
//! })
//! .unwrap();
//! let striker = roster.fighter_id("striker").unwrap();
//!
//! let mut sim = Simulation::new(roster, CombatConfig::default());
//! let player = sim.spawn_fighter(striker, Vec2Fixed::from_ints(-2, 0), Facing::Right).unwrap();
//!
//! let events = sim.tick(&[InputEvent::new(player, Intent::LightAttack)]);
//! assert_eq!(events.tick, 0);
//! assert_eq!(sim.get_tick(), 1);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::combat_state::{CombatState, MovePhase};
use crate::condition::ConditionTracker;
use crate::config::CombatConfig;
use crate::damage::{apply_statuses, DamageResolver};
use crate::data::{ConditionId, FighterDefId, MoveDefinition, MoveId, Roster, StatKind, StatusId};
use crate::error::{BrawlError, Result};
use crate::events::{CombatEvent, EventSink, TickEvents};
use crate::fighter::{Facing, FighterId, FighterRuntimeState};
use crate::hitbox::{Contact, HitboxResolver, TargetView};
use crate::input::{InputEvent, Intent};
use crate::math::{decimal_serde, decimal_vec_serde, Fixed, Vec2Fixed};
use crate::movement::{integrate, MovementInput};

/// Read-only view of a fighter after a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterSnapshot {
    /// Fighter id.
    pub id: FighterId,
    /// Definition id.
    pub definition: FighterDefId,
    /// Position.
    #[serde(with = "decimal_vec_serde")]
    pub position: Vec2Fixed,
    /// Velocity.
    #[serde(with = "decimal_vec_serde")]
    pub velocity: Vec2Fixed,
    /// Facing.
    pub facing: Facing,
    /// Current health.
    #[serde(with = "decimal_serde")]
    pub health: Fixed,
    /// Maximum health.
    #[serde(with = "decimal_serde")]
    pub max_health: Fixed,
    /// Knocked out.
    pub knocked_out: bool,
    /// Combat state.
    pub state: CombatState,
    /// Move in progress.
    pub current_move: Option<MoveId>,
    /// Frame of the move in progress.
    pub frame: u32,
    /// Hitstop ticks left.
    pub hitstop: u32,
    /// Active statuses and their stacks.
    pub statuses: Vec<(StatusId, u32)>,
}

impl FighterSnapshot {
    fn of(fighter: &FighterRuntimeState) -> Self {
        Self {
            id: fighter.id,
            definition: fighter.definition,
            position: fighter.body.position,
            velocity: fighter.body.velocity,
            facing: fighter.facing,
            health: fighter.health.current(),
            max_health: fighter.health.max(),
            knocked_out: fighter.health.is_dead(),
            state: fighter.state(),
            current_move: fighter.combat.current_move().map(|m| m.move_id),
            frame: fighter.combat.frame(),
            hitstop: fighter.hitstop,
            statuses: fighter
                .statuses
                .effects()
                .iter()
                .map(|effect| (effect.status, effect.stacks))
                .collect(),
        }
    }
}

/// The deterministic combat simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Simulation {
    tick: u64,
    roster: Roster,
    config: CombatConfig,
    /// Ordered by id.
    fighters: Vec<FighterRuntimeState>,
    next_fighter_id: u32,
    conditions: ConditionTracker,
    /// Ticks run since the current round began.
    round_ticks: u64,
}

impl Simulation {
    /// Create an empty simulation.
    #[must_use]
    pub fn new(roster: Roster, config: CombatConfig) -> Self {
        Self {
            tick: 0,
            roster,
            config,
            fighters: Vec::new(),
            next_fighter_id: 0,
            conditions: ConditionTracker::new(),
            round_ticks: 0,
        }
    }

    /// Get current simulation tick.
    #[must_use]
    pub const fn get_tick(&self) -> u64 {
        self.tick
    }

    /// Loaded definitions.
    #[must_use]
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Combat configuration.
    #[must_use]
    pub const fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Adaptive conditions in effect.
    #[must_use]
    pub const fn conditions(&self) -> &ConditionTracker {
        &self.conditions
    }

    /// Combat configuration with active condition modifiers applied.
    #[must_use]
    pub fn effective_config(&self) -> CombatConfig {
        self.conditions.adjust_config(&self.config, &self.roster)
    }

    /// Ticks run since the current round began.
    #[must_use]
    pub const fn round_ticks(&self) -> u64 {
        self.round_ticks
    }

    /// Start a round: restart the round clock and fire match-start (when
    /// `first`) and round-start condition triggers.
    pub fn begin_round(&mut self, first: bool, sink: &mut dyn EventSink) {
        self.round_ticks = 0;
        self.conditions
            .begin_round(first, &self.roster, self.config.tick_rate, sink);
    }

    /// Switch a condition on outside of its triggers.
    ///
    /// Returns whether it was newly activated; an active one is refreshed.
    pub fn activate_condition(&mut self, condition: ConditionId, sink: &mut dyn EventSink) -> bool {
        let Some(definition) = self.roster.condition_def(condition) else {
            sink.emit(CombatEvent::Diagnostic {
                fighter: None,
                reason: format!("unknown condition {condition}"),
            });
            return false;
        };
        self.conditions
            .activate(condition, definition, self.config.tick_rate, sink)
    }

    /// Switch a condition off. Returns whether it was active.
    pub fn deactivate_condition(
        &mut self,
        condition: ConditionId,
        sink: &mut dyn EventSink,
    ) -> bool {
        self.conditions.deactivate(condition, sink)
    }

    /// Spawn a fighter from a definition.
    ///
    /// # Errors
    ///
    /// Returns [`BrawlError::UnknownFighter`] if the definition does not exist.
    pub fn spawn_fighter(
        &mut self,
        definition: FighterDefId,
        position: Vec2Fixed,
        facing: Facing,
    ) -> Result<FighterId> {
        let Some(fighter_def) = self.roster.fighter_def(definition) else {
            return Err(BrawlError::UnknownFighter(definition.to_string()));
        };
        let id = FighterId(self.next_fighter_id);
        self.next_fighter_id += 1;
        self.fighters.push(FighterRuntimeState::new(
            id,
            definition,
            fighter_def,
            position,
            facing,
        ));
        debug!(%id, name = %fighter_def.name, "fighter spawned");
        Ok(id)
    }

    /// Remove a fighter.
    ///
    /// # Errors
    ///
    /// Returns [`BrawlError::UnknownFighter`] if no such fighter exists.
    pub fn despawn_fighter(&mut self, id: FighterId) -> Result<()> {
        let index = self
            .index_of(id)
            .ok_or_else(|| BrawlError::UnknownFighter(id.to_string()))?;
        self.fighters.remove(index);
        Ok(())
    }

    /// Look up a fighter.
    #[must_use]
    pub fn fighter(&self, id: FighterId) -> Option<&FighterRuntimeState> {
        self.index_of(id).map(|index| &self.fighters[index])
    }

    /// Look up a fighter mutably.
    pub fn fighter_mut(&mut self, id: FighterId) -> Option<&mut FighterRuntimeState> {
        self.index_of(id).map(|index| &mut self.fighters[index])
    }

    /// Fighter ids in ascending order.
    #[must_use]
    pub fn fighter_ids(&self) -> Vec<FighterId> {
        self.fighters.iter().map(|f| f.id).collect()
    }

    /// Number of fighters.
    #[must_use]
    pub fn fighter_count(&self) -> usize {
        self.fighters.len()
    }

    /// Read-only view of every fighter.
    #[must_use]
    pub fn snapshot(&self) -> Vec<FighterSnapshot> {
        self.fighters.iter().map(FighterSnapshot::of).collect()
    }

    /// Request a move for a fighter outside of the input stream.
    ///
    /// Returns whether the move started. Rejected requests are buffered.
    pub fn try_start_move(
        &mut self,
        fighter: FighterId,
        move_id: MoveId,
        sink: &mut dyn EventSink,
    ) -> bool {
        let Some(index) = self.index_of(fighter) else {
            unknown_fighter(sink, fighter);
            return false;
        };
        if self.fighters[index].health.is_dead() {
            return false;
        }
        request_move(
            &self.roster,
            &self.config,
            &self.conditions,
            self.tick,
            &mut self.fighters[index],
            move_id,
            sink,
        )
    }

    /// Run one tick and collect its events.
    pub fn tick(&mut self, inputs: &[InputEvent]) -> TickEvents {
        let mut events = TickEvents::new(self.tick);
        self.tick_into(inputs, &mut events);
        events
    }

    /// Run one tick, emitting events into `sink`.
    pub fn tick_into(&mut self, inputs: &[InputEvent], sink: &mut dyn EventSink) {
        let config = self.effective_config();

        // Phase 1: inputs
        for input in inputs {
            self.apply_input(&config, input, sink);
        }

        // Phase 2: hitstop
        let frozen: Vec<bool> = self
            .fighters
            .iter_mut()
            .map(|fighter| {
                if fighter.hitstop > 0 {
                    fighter.hitstop -= 1;
                    true
                } else {
                    false
                }
            })
            .collect();

        // Phase 3: state machines and buffered inputs
        for (fighter, _) in self
            .fighters
            .iter_mut()
            .zip(&frozen)
            .filter(|(f, frozen)| !**frozen && !f.health.is_dead())
        {
            advance_fighter(
                &self.roster,
                &config,
                &self.conditions,
                self.tick,
                fighter,
                sink,
            );
        }

        // Phase 4: hitbox windows
        for fighter in &mut self.fighters {
            update_hitbox_windows(&self.roster, fighter);
        }

        // Phase 5: facing and movement
        for (fighter, _) in self
            .fighters
            .iter_mut()
            .zip(&frozen)
            .filter(|(_, frozen)| !**frozen)
        {
            move_fighter(&self.roster, &config, &self.conditions, fighter);
        }

        // Phase 6: collision and damage
        self.resolve_collisions(&config, &frozen, sink);

        // Phase 7: statuses
        for fighter in self.fighters.iter_mut().filter(|f| !f.health.is_dead()) {
            fighter.statuses.tick(
                fighter.id,
                &self.roster,
                self.config.tick_rate,
                &mut fighter.health,
                sink,
            );
            if fighter.health.is_dead() {
                fighter.combat.halt(sink);
                fighter.hitboxes.deactivate(fighter.id, sink);
            }
        }

        // Phase 8: conditions
        self.round_ticks += 1;
        let lowest_health = self
            .fighters
            .iter()
            .map(|fighter| fighter.health.fraction())
            .min()
            .unwrap_or(Fixed::ONE);
        self.conditions.tick(sink);
        self.conditions.evaluate(
            &self.roster,
            self.config.tick_rate,
            self.round_ticks,
            lowest_health,
            sink,
        );

        // Phase 9: advance tick counter
        self.tick += 1;

        #[cfg(debug_assertions)]
        trace!(tick = self.tick, hash = self.state_hash(), "tick complete");
    }

    /// Put every fighter back in its spawn state. The tick counter keeps running.
    pub fn reset_fighters(&mut self) {
        for fighter in &mut self.fighters {
            fighter.reset();
        }
    }

    /// Compute a hash of the current simulation state.
    ///
    /// Two simulations fed the same spawns and inputs hash identically.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tick.hash(&mut hasher);
        self.fighters.len().hash(&mut hasher);

        for fighter in &self.fighters {
            fighter.id.hash(&mut hasher);

            // Hash body
            fighter.body.position.x.to_bits().hash(&mut hasher);
            fighter.body.position.y.to_bits().hash(&mut hasher);
            fighter.body.velocity.x.to_bits().hash(&mut hasher);
            fighter.body.velocity.y.to_bits().hash(&mut hasher);
            fighter.body.dash_ticks.hash(&mut hasher);
            fighter.facing.hash(&mut hasher);

            // Hash health
            fighter.health.current().to_bits().hash(&mut hasher);
            fighter.health.is_dead().hash(&mut hasher);

            // Hash combat state
            fighter.state().hash(&mut hasher);
            fighter.combat.current_move().map(|m| m.move_id).hash(&mut hasher);
            fighter.combat.frame().hash(&mut hasher);
            fighter.combat.countdown().hash(&mut hasher);
            fighter.combat.input_buffer().peek().hash(&mut hasher);
            fighter.hitstop.hash(&mut hasher);

            // Hash statuses
            for effect in fighter.statuses.effects() {
                effect.status.hash(&mut hasher);
                effect.stacks.hash(&mut hasher);
                effect.remaining_ticks.hash(&mut hasher);
                effect.dot_countdown.hash(&mut hasher);
            }
        }

        self.round_ticks.hash(&mut hasher);
        self.conditions.hash(&mut hasher);

        hasher.finish()
    }

    /// Serialize simulation state to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| BrawlError::InvalidState(format!("Failed to serialize simulation: {e}")))
    }

    /// Deserialize simulation state from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data).map_err(|e| {
            BrawlError::InvalidState(format!("Failed to deserialize simulation: {e}"))
        })
    }

    fn index_of(&self, id: FighterId) -> Option<usize> {
        self.fighters.binary_search_by_key(&id, |f| f.id).ok()
    }

    fn apply_input(&mut self, config: &CombatConfig, input: &InputEvent, sink: &mut dyn EventSink) {
        let Some(index) = self.index_of(input.fighter) else {
            unknown_fighter(sink, input.fighter);
            return;
        };
        let fighter = &mut self.fighters[index];
        if fighter.health.is_dead() {
            return;
        }
        let Some(moves) = self.roster.move_set(fighter.definition) else {
            return;
        };

        let requested = match input.intent {
            Intent::Move(axis) => {
                fighter.move_input = axis.clamp(-Fixed::ONE, Fixed::ONE);
                None
            }
            Intent::Jump => {
                fighter.jump_requested = true;
                None
            }
            Intent::Block(held) => {
                fighter.combat.set_block_held(held);
                held.then_some(moves.block)
            }
            Intent::LightAttack => Some(moves.light_attack),
            Intent::HeavyAttack => Some(moves.heavy_attack),
            Intent::Special(slot) => {
                let special = moves.specials.get(usize::from(slot)).copied();
                if special.is_none() {
                    diagnostic(
                        sink,
                        fighter.id,
                        format!("no special move in slot {slot}"),
                    );
                }
                special
            }
            Intent::Parry => Some(moves.parry),
            Intent::Dodge => Some(moves.dodge),
        };

        if let Some(move_id) = requested {
            request_move(
                &self.roster,
                config,
                &self.conditions,
                self.tick,
                fighter,
                move_id,
                sink,
            );
        }
    }

    fn resolve_collisions(
        &mut self,
        config: &CombatConfig,
        frozen: &[bool],
        sink: &mut dyn EventSink,
    ) {
        // Detect every contact before resolving any, so simultaneous hits trade
        let contacts: Vec<(usize, usize, Contact)> = {
            let targets: Vec<TargetView<'_>> = self
                .fighters
                .iter()
                .map(|fighter| TargetView {
                    id: fighter.id,
                    hurtboxes: &fighter.hurtboxes,
                    vulnerable: fighter.is_vulnerable(),
                })
                .collect();

            self.fighters
                .iter()
                .enumerate()
                .filter(|(index, fighter)| {
                    !frozen[*index] && !fighter.health.is_dead() && fighter.hitboxes.is_active()
                })
                .flat_map(|(attacker_index, fighter)| {
                    HitboxResolver::detect(fighter.id, &fighter.hitboxes, &targets)
                        .into_iter()
                        .filter_map(|contact| {
                            let target_index = targets.iter().position(|t| t.id == contact.target)?;
                            Some((attacker_index, target_index, contact))
                        })
                        .collect::<Vec<_>>()
                })
                .collect()
        };

        for (attacker_index, _, contact) in &contacts {
            self.fighters[*attacker_index].hitboxes.mark_hit(contact.target);
        }

        let resolver = DamageResolver::new(&self.roster, config, &self.conditions);
        for (attacker_index, target_index, contact) in contacts {
            let Some((attacker, target)) = pair_mut(&mut self.fighters, attacker_index, target_index)
            else {
                continue;
            };
            if target.health.is_dead() {
                continue;
            }
            resolver.resolve(&contact, attacker, target, sink);
        }
    }
}

/// Start or buffer `move_id` for `fighter`.
fn request_move(
    roster: &Roster,
    config: &CombatConfig,
    conditions: &ConditionTracker,
    now: u64,
    fighter: &mut FighterRuntimeState,
    move_id: MoveId,
    sink: &mut dyn EventSink,
) -> bool {
    let Some(definition) = roster.move_def(move_id) else {
        diagnostic(sink, fighter.id, format!("unknown move {move_id}"));
        return false;
    };
    let buffer_ticks = config.ticks(definition.input_buffer_window);

    if fighter.in_hitstop() || fighter.statuses.prevents_action(roster) {
        fighter
            .combat
            .input_buffer_mut()
            .buffer(move_id, now, buffer_ticks);
        return false;
    }

    if fighter
        .combat
        .try_start_move(move_id, definition, now, buffer_ticks, sink)
    {
        on_move_started(roster, config, conditions, fighter, definition, sink);
        return true;
    }
    false
}

fn on_move_started(
    roster: &Roster,
    config: &CombatConfig,
    conditions: &ConditionTracker,
    fighter: &mut FighterRuntimeState,
    definition: &MoveDefinition,
    sink: &mut dyn EventSink,
) {
    fighter.hitboxes.deactivate(fighter.id, sink);
    if let Some(fighter_def) = roster.fighter_def(fighter.definition) {
        fighter.combat.extend_armor(conditions.extra_armor_frames(
            &fighter_def.name,
            &definition.name,
            roster,
        ));
        if definition.category.is_evasive() {
            let ticks = config.ticks(fighter_def.dash_duration);
            fighter
                .body
                .start_dash(fighter.move_input, fighter.facing, ticks);
        }
    }
    apply_statuses(
        fighter,
        &definition.status_effects_on_self,
        roster,
        config,
        sink,
    );
}

fn advance_fighter(
    roster: &Roster,
    config: &CombatConfig,
    conditions: &ConditionTracker,
    now: u64,
    fighter: &mut FighterRuntimeState,
    sink: &mut dyn EventSink,
) {
    step_combat(roster, fighter, sink);

    // Buffered request, offered once per tick after the transition
    if let Some(expired) = fighter.combat.input_buffer_mut().discard_expired(now) {
        trace!(fighter = %fighter.id, move_id = %expired.move_id, "buffered input expired");
    }
    let mut started = false;
    let pending = fighter.combat.input_buffer().peek().copied();
    if let Some(pending) = pending {
        if let Some(definition) = roster.move_def(pending.move_id) {
            if fighter.combat.can_start(definition.category) && !fighter.statuses.prevents_action(roster)
            {
                fighter.combat.input_buffer_mut().take();
                fighter.combat.start_move(pending.move_id, definition, sink);
                on_move_started(roster, config, conditions, fighter, definition, sink);
                started = true;
            }
        } else {
            fighter.combat.input_buffer_mut().take();
        }
    }

    // Held block comes back up as soon as the fighter is free
    if !started && fighter.combat.block_held() && fighter.state() == CombatState::Idle {
        if let Some(block) = roster.move_set(fighter.definition).map(|moves| moves.block) {
            started = request_move(roster, config, conditions, now, fighter, block, sink);
        }
    }

    // Same frame schedule as a move started from input
    if started {
        step_combat(roster, fighter, sink);
    }
}

/// Advance the state machine one tick and follow its hitbox transitions.
fn step_combat(roster: &Roster, fighter: &mut FighterRuntimeState, sink: &mut dyn EventSink) {
    let changes = fighter.combat.advance(sink);

    if changes.left_active || changes.ended.is_some() {
        fighter.hitboxes.deactivate(fighter.id, sink);
    }
    if changes.entered_active {
        let attacking = fighter
            .combat
            .current_move()
            .filter(|current| current.category.is_attack())
            .map(|current| current.move_id);
        if let Some((move_id, definition)) =
            attacking.and_then(|id| roster.move_def(id).map(|definition| (id, definition)))
        {
            fighter.hitboxes.activate(
                fighter.id,
                move_id,
                definition,
                fighter.body.position,
                fighter.facing,
                sink,
            );
        }
    }
}

fn update_hitbox_windows(roster: &Roster, fighter: &mut FighterRuntimeState) {
    let Some(move_id) = fighter.hitboxes.active_move() else {
        return;
    };
    let Some(current) = fighter.combat.current_move() else {
        return;
    };
    if current.move_id != move_id || current.phase() != Some(MovePhase::Active) {
        return;
    }
    let active_frame = current.active_frame().unwrap_or(0);
    if let Some(definition) = roster.move_def(move_id) {
        fighter.hitboxes.update(
            definition,
            active_frame,
            fighter.body.position,
            fighter.facing,
        );
    }
}

fn move_fighter(
    roster: &Roster,
    config: &CombatConfig,
    conditions: &ConditionTracker,
    fighter: &mut FighterRuntimeState,
) {
    let Some(definition) = roster.fighter_def(fighter.definition) else {
        return;
    };
    let can_act = !fighter.health.is_dead()
        && fighter.combat.can_act()
        && !fighter.statuses.prevents_action(roster);

    if can_act {
        if fighter.move_input > Fixed::ZERO {
            fighter.facing = Facing::Right;
        } else if fighter.move_input < Fixed::ZERO {
            fighter.facing = Facing::Left;
        }
    }

    let speed_multiplier = conditions.stat_value(StatKind::Speed, Fixed::ONE, fighter, roster);
    integrate(
        &mut fighter.body,
        MovementInput {
            axis: fighter.move_input,
            jump: fighter.jump_requested,
            can_act,
            speed_multiplier,
        },
        definition,
        config,
    );
    fighter.jump_requested = false;

    fighter.sync_hurtboxes();
    if let Some(move_definition) = fighter
        .hitboxes
        .active_move()
        .and_then(|id| roster.move_def(id))
    {
        fighter
            .hitboxes
            .follow(move_definition, fighter.body.position, fighter.facing);
    }
}

fn pair_mut(
    fighters: &mut [FighterRuntimeState],
    a: usize,
    b: usize,
) -> Option<(&mut FighterRuntimeState, &mut FighterRuntimeState)> {
    if a == b || a.max(b) >= fighters.len() {
        return None;
    }
    if a < b {
        let (left, right) = fighters.split_at_mut(b);
        Some((&mut left[a], &mut right[0]))
    } else {
        let (left, right) = fighters.split_at_mut(a);
        Some((&mut right[0], &mut left[b]))
    }
}

fn unknown_fighter(sink: &mut dyn EventSink, fighter: FighterId) {
    warn!(%fighter, "input for unknown fighter");
    sink.emit(CombatEvent::Diagnostic {
        fighter: Some(fighter),
        reason: format!("unknown fighter {fighter}"),
    });
}

fn diagnostic(sink: &mut dyn EventSink, fighter: FighterId, reason: String) {
    warn!(%fighter, %reason, "request rejected");
    sink.emit(CombatEvent::Diagnostic {
        fighter: Some(fighter),
        reason,
    });
}
