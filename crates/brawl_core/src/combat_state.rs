//! Per-fighter combat state machine.
//!
//! A fighter is either free (`Idle`), executing a move (`Startup`,
//! `Active`, `Recovery`, or the defensive active states `Blocking`,
//! `Parrying`, `Dodging`), or locked in a timed state (`Stunned`,
//! `Staggered`, `ArmorBroken`) that counts down once per tick.
//!
//! # Frame counting
//!
//! Starting a move sets its frame to 0. Each [`CombatStateMachine::advance`]
//! adds one. With `startup = s`, `active = a`, `recovery = r`:
//!
//! | frame              | phase    |
//! |--------------------|----------|
//! | `0..=s`            | Startup  |
//! | `s+1..=s+a`        | Active   |
//! | `s+a+1..=s+a+r`    | Recovery |
//! | `> s+a+r`          | Idle     |

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::{CancelRules, CancelWindow, MoveCategory, MoveDefinition, MoveId};
use crate::events::{CombatEvent, EventSink};
use crate::fighter::FighterId;
use crate::input::InputBuffer;

/// Observable combat state of a fighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CombatState {
    /// Free to act.
    #[default]
    Idle,
    /// Move wind-up.
    Startup,
    /// Attacking move's live window.
    Active,
    /// Move wind-down; new moves are accepted.
    Recovery,
    /// Block move's active window.
    Blocking,
    /// Parry move's active window.
    Parrying,
    /// Dodge move's active window.
    Dodging,
    /// Hit or block stun.
    Stunned,
    /// Parried; cannot act.
    Staggered,
    /// Armor was broken; cannot act.
    ArmorBroken,
}

impl CombatState {
    /// Whether this state counts down and returns to `Idle` on its own.
    #[must_use]
    pub const fn is_timed(self) -> bool {
        matches!(
            self,
            CombatState::Stunned | CombatState::Staggered | CombatState::ArmorBroken
        )
    }

    /// Whether this state belongs to a move in progress.
    #[must_use]
    pub const fn is_move_state(self) -> bool {
        matches!(
            self,
            CombatState::Startup
                | CombatState::Active
                | CombatState::Recovery
                | CombatState::Blocking
                | CombatState::Parrying
                | CombatState::Dodging
        )
    }
}

/// Phase of a move in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovePhase {
    /// Wind-up.
    Startup,
    /// Live window.
    Active,
    /// Wind-down.
    Recovery,
}

/// A move being executed. Created when the move starts, discarded when it
/// ends or is interrupted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveInProgress {
    /// Executing move.
    pub move_id: MoveId,
    /// Its category.
    pub category: MoveCategory,
    /// Startup frames.
    pub startup_frames: u32,
    /// Active frames.
    pub active_frames: u32,
    /// Recovery frames.
    pub recovery_frames: u32,
    /// Current frame.
    pub frame: u32,
    /// Cancel window, if any.
    pub cancel_window: Option<CancelWindow>,
    /// Cancel permissions.
    pub cancel_rules: CancelRules,
    /// Armored frames `1..=armor_frames`.
    pub armor_frames: u32,
    /// Invincible leading active frames.
    pub invincibility_frames: u32,
    /// Hits absorbed by armor during this move.
    pub armor_hits: u32,
}

impl MoveInProgress {
    /// Begin executing `definition` at frame 0.
    #[must_use]
    pub fn new(move_id: MoveId, definition: &MoveDefinition) -> Self {
        Self {
            move_id,
            category: definition.category,
            startup_frames: definition.startup_frames,
            active_frames: definition.active_frames,
            recovery_frames: definition.recovery_frames,
            frame: 0,
            cancel_window: definition.cancel_window,
            cancel_rules: definition.cancel_rules,
            armor_frames: definition.armor_frames,
            invincibility_frames: definition.invincibility_frames,
            armor_hits: 0,
        }
    }

    /// Total frames.
    #[must_use]
    pub const fn total_frames(&self) -> u32 {
        self.startup_frames + self.active_frames + self.recovery_frames
    }

    /// Phase at the current frame, `None` once the move is over.
    #[must_use]
    pub const fn phase(&self) -> Option<MovePhase> {
        if self.frame <= self.startup_frames {
            Some(MovePhase::Startup)
        } else if self.frame <= self.startup_frames + self.active_frames {
            Some(MovePhase::Active)
        } else if self.frame <= self.total_frames() {
            Some(MovePhase::Recovery)
        } else {
            None
        }
    }

    /// Frame within the active window (0 on the first active frame).
    #[must_use]
    pub fn active_frame(&self) -> Option<u32> {
        match self.phase() {
            Some(MovePhase::Active) => Some(self.frame - self.startup_frames - 1),
            _ => None,
        }
    }

    /// Whether the current frame is inside the cancel window.
    #[must_use]
    pub fn in_cancel_window(&self) -> bool {
        self.cancel_window
            .is_some_and(|window| window.contains(self.frame))
    }

    /// Whether hits are currently ignored.
    #[must_use]
    pub fn is_invincible(&self) -> bool {
        self.active_frame()
            .is_some_and(|frame| frame < self.invincibility_frames)
    }

    /// Whether hits are currently absorbed by armor.
    #[must_use]
    pub const fn is_armored(&self) -> bool {
        self.frame >= 1 && self.frame <= self.armor_frames
    }

    /// State reported for the current phase.
    #[must_use]
    pub fn reported_state(&self) -> CombatState {
        match self.phase() {
            Some(MovePhase::Startup) => CombatState::Startup,
            Some(MovePhase::Active) => match self.category {
                MoveCategory::Block => CombatState::Blocking,
                MoveCategory::Parry => CombatState::Parrying,
                MoveCategory::Dodge => CombatState::Dodging,
                _ => CombatState::Active,
            },
            Some(MovePhase::Recovery) => CombatState::Recovery,
            None => CombatState::Idle,
        }
    }
}

/// What changed during one [`CombatStateMachine::advance`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseChanges {
    /// The move entered its active window this tick.
    pub entered_active: bool,
    /// The move left its active window this tick.
    pub left_active: bool,
    /// The move completed this tick.
    pub ended: Option<MoveId>,
    /// A timed state ran out this tick.
    pub recovered: bool,
}

/// Per-fighter move execution, stun states and cancels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStateMachine {
    owner: FighterId,
    state: CombatState,
    current: Option<MoveInProgress>,
    countdown: u32,
    in_cancel_window: bool,
    block_held: bool,
    buffer: InputBuffer,
}

impl CombatStateMachine {
    /// Create an idle state machine for `owner`.
    #[must_use]
    pub const fn new(owner: FighterId) -> Self {
        Self {
            owner,
            state: CombatState::Idle,
            current: None,
            countdown: 0,
            in_cancel_window: false,
            block_held: false,
            buffer: InputBuffer::new(),
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> CombatState {
        self.state
    }

    /// Move in progress.
    #[must_use]
    pub const fn current_move(&self) -> Option<&MoveInProgress> {
        self.current.as_ref()
    }

    /// Current move frame, zero when idle.
    #[must_use]
    pub fn frame(&self) -> u32 {
        self.current.as_ref().map_or(0, |m| m.frame)
    }

    /// Ticks left in a timed state.
    #[must_use]
    pub const fn countdown(&self) -> u32 {
        self.countdown
    }

    /// Whether the current move is cancellable as of the last advance.
    #[must_use]
    pub const fn in_cancel_window(&self) -> bool {
        self.in_cancel_window
    }

    /// Whether the block input is held.
    #[must_use]
    pub const fn block_held(&self) -> bool {
        self.block_held
    }

    /// Pending buffered request.
    #[must_use]
    pub const fn input_buffer(&self) -> &InputBuffer {
        &self.buffer
    }

    /// Mutable access to the buffered request.
    pub fn input_buffer_mut(&mut self) -> &mut InputBuffer {
        &mut self.buffer
    }

    /// Whether the fighter may act now.
    #[must_use]
    pub fn can_act(&self) -> bool {
        matches!(self.state, CombatState::Idle | CombatState::Recovery)
            || (self.in_cancel_window && self.current.is_some())
    }

    /// Whether a move of `category` would be accepted right now.
    #[must_use]
    pub fn can_start(&self, category: MoveCategory) -> bool {
        match self.state {
            CombatState::Stunned | CombatState::Staggered | CombatState::ArmorBroken => false,
            CombatState::Idle | CombatState::Recovery => true,
            _ => self
                .current
                .as_ref()
                .is_some_and(|m| m.in_cancel_window() && m.cancel_rules.permits(category)),
        }
    }

    /// Whether hits are currently ignored.
    #[must_use]
    pub fn is_invincible(&self) -> bool {
        self.current.as_ref().is_some_and(MoveInProgress::is_invincible)
    }

    /// Whether hits are currently absorbed by armor.
    #[must_use]
    pub fn is_armored(&self) -> bool {
        self.current.as_ref().is_some_and(MoveInProgress::is_armored)
    }

    /// Start `definition` if legal, otherwise buffer it.
    ///
    /// A buffered request overwrites any earlier one and lapses after
    /// `buffer_ticks`. Returns whether the move started.
    pub fn try_start_move(
        &mut self,
        move_id: MoveId,
        definition: &MoveDefinition,
        now: u64,
        buffer_ticks: u32,
        sink: &mut dyn EventSink,
    ) -> bool {
        if self.can_start(definition.category) {
            self.start_move(move_id, definition, sink);
            return true;
        }

        debug!(
            fighter = %self.owner,
            %move_id,
            state = ?self.state,
            frame = self.frame(),
            "move rejected, buffered"
        );
        self.buffer.buffer(move_id, now, buffer_ticks);
        false
    }

    /// Start `definition` unconditionally, interrupting any move in progress.
    pub fn start_move(
        &mut self,
        move_id: MoveId,
        definition: &MoveDefinition,
        sink: &mut dyn EventSink,
    ) {
        self.end_current(true, sink);
        let next = MoveInProgress::new(move_id, definition);
        self.in_cancel_window = next.in_cancel_window();
        self.current = Some(next);
        self.countdown = 0;
        self.set_state(CombatState::Startup, sink);
        sink.emit(CombatEvent::MoveStarted {
            fighter: self.owner,
            move_id,
        });
    }

    /// Advance one tick.
    pub fn advance(&mut self, sink: &mut dyn EventSink) -> PhaseChanges {
        let mut changes = PhaseChanges::default();

        if self.state.is_timed() {
            self.countdown = self.countdown.saturating_sub(1);
            if self.countdown == 0 {
                self.set_state(CombatState::Idle, sink);
                changes.recovered = true;
            }
            return changes;
        }

        let holding_block = self.state == CombatState::Blocking && self.block_held;
        let releasing_block = self.state == CombatState::Blocking && !self.block_held;

        let Some(current) = self.current.as_mut() else {
            return changes;
        };

        let previous = current.phase();
        if releasing_block {
            current.frame = current.startup_frames + current.active_frames + 1;
        } else if !holding_block {
            current.frame += 1;
        }
        let next = current.phase();
        let reported = current.reported_state();
        let move_id = current.move_id;
        self.in_cancel_window = current.in_cancel_window();

        let was_active = previous == Some(MovePhase::Active);
        let is_active = next == Some(MovePhase::Active);
        changes.entered_active = !was_active && is_active;
        changes.left_active = was_active && !is_active;

        if next.is_none() {
            self.current = None;
            self.in_cancel_window = false;
            sink.emit(CombatEvent::MoveEnded {
                fighter: self.owner,
                move_id,
                interrupted: false,
            });
            changes.ended = Some(move_id);
        }
        self.set_state(reported, sink);

        changes
    }

    /// Enter hit or block stun for `frames` ticks, interrupting any move.
    ///
    /// A new stun replaces the remaining countdown. Returns the interrupted
    /// move, if any.
    pub fn enter_stun(&mut self, frames: u32, sink: &mut dyn EventSink) -> Option<MoveId> {
        self.enter_timed(CombatState::Stunned, frames, sink)
    }

    /// Enter the staggered state for `frames` ticks.
    pub fn enter_stagger(&mut self, frames: u32, sink: &mut dyn EventSink) -> Option<MoveId> {
        self.enter_timed(CombatState::Staggered, frames, sink)
    }

    /// Enter the armor-broken state for `frames` ticks.
    pub fn enter_armor_broken(&mut self, frames: u32, sink: &mut dyn EventSink) -> Option<MoveId> {
        self.enter_timed(CombatState::ArmorBroken, frames, sink)
    }

    /// Add armor frames to the move in progress.
    pub fn extend_armor(&mut self, frames: u32) {
        if let Some(current) = self.current.as_mut() {
            current.armor_frames = current.armor_frames.saturating_add(frames);
        }
    }

    /// Count a hit absorbed by armor. Returns hits absorbed so far.
    pub fn record_armor_hit(&mut self) -> u32 {
        match self.current.as_mut() {
            Some(current) => {
                current.armor_hits += 1;
                current.armor_hits
            }
            None => 0,
        }
    }

    /// Set whether the block input is held.
    pub fn set_block_held(&mut self, held: bool) {
        self.block_held = held;
    }

    /// Stop everything and return to `Idle`. Used when a fighter is knocked out.
    pub fn halt(&mut self, sink: &mut dyn EventSink) -> Option<MoveId> {
        let interrupted = self.end_current(true, sink);
        self.countdown = 0;
        self.buffer.clear();
        self.set_state(CombatState::Idle, sink);
        interrupted
    }

    /// Return to a fresh idle state without emitting events.
    pub fn reset(&mut self) {
        *self = Self::new(self.owner);
    }

    fn enter_timed(
        &mut self,
        state: CombatState,
        frames: u32,
        sink: &mut dyn EventSink,
    ) -> Option<MoveId> {
        let interrupted = self.end_current(true, sink);
        self.countdown = frames;
        self.set_state(state, sink);
        interrupted
    }

    fn end_current(&mut self, interrupted: bool, sink: &mut dyn EventSink) -> Option<MoveId> {
        let current = self.current.take()?;
        self.in_cancel_window = false;
        sink.emit(CombatEvent::MoveEnded {
            fighter: self.owner,
            move_id: current.move_id,
            interrupted,
        });
        Some(current.move_id)
    }

    fn set_state(&mut self, state: CombatState, sink: &mut dyn EventSink) {
        if self.state == state {
            return;
        }
        debug!(fighter = %self.owner, from = ?self.state, to = ?state, "state changed");
        sink.emit(CombatEvent::StateChanged {
            fighter: self.owner,
            from: self.state,
            to: state,
        });
        self.state = state;
    }
}
