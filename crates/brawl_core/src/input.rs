//! Player intents and the per-fighter input buffer.

use serde::{Deserialize, Serialize};

use crate::data::MoveId;
use crate::fighter::FighterId;
use crate::math::{decimal_serde, Fixed};

/// What a player wants their fighter to do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    /// Horizontal movement axis in `[-1, 1]`; zero releases.
    Move(#[serde(with = "decimal_serde")] Fixed),
    /// Jump if grounded.
    Jump,
    /// Light attack.
    LightAttack,
    /// Heavy attack.
    HeavyAttack,
    /// Special move by index into the fighter's specials.
    Special(u8),
    /// Block pressed (`true`) or released (`false`).
    Block(bool),
    /// Parry.
    Parry,
    /// Dodge.
    Dodge,
}

/// An intent addressed to a fighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputEvent {
    /// Target fighter.
    pub fighter: FighterId,
    /// Requested action.
    pub intent: Intent,
}

impl InputEvent {
    /// Create an input event.
    #[must_use]
    pub const fn new(fighter: FighterId, intent: Intent) -> Self {
        Self { fighter, intent }
    }
}

/// A move request waiting for the fighter to become free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BufferedMove {
    /// Requested move.
    pub move_id: MoveId,
    /// Tick the request was made.
    pub issued_tick: u64,
    /// Ticks the request stays valid after `issued_tick`.
    pub window_ticks: u32,
}

impl BufferedMove {
    /// Last tick at which the request may still be honoured.
    #[must_use]
    pub const fn expires_at(&self) -> u64 {
        self.issued_tick + self.window_ticks as u64
    }

    /// Whether the request has lapsed at `now`.
    #[must_use]
    pub const fn is_expired(&self, now: u64) -> bool {
        now > self.expires_at()
    }
}

/// Holds at most one pending move request.
///
/// A new request always overwrites the previous one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputBuffer {
    pending: Option<BufferedMove>,
}

impl InputBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self { pending: None }
    }

    /// Buffer a request, returning the one it replaced.
    pub fn buffer(&mut self, move_id: MoveId, now: u64, window_ticks: u32) -> Option<BufferedMove> {
        self.pending.replace(BufferedMove {
            move_id,
            issued_tick: now,
            window_ticks,
        })
    }

    /// The pending request, if any.
    #[must_use]
    pub const fn peek(&self) -> Option<&BufferedMove> {
        self.pending.as_ref()
    }

    /// Remove and return the pending request.
    pub fn take(&mut self) -> Option<BufferedMove> {
        self.pending.take()
    }

    /// Drop the pending request if it has expired, returning it.
    pub fn discard_expired(&mut self, now: u64) -> Option<BufferedMove> {
        if self.pending.is_some_and(|pending| pending.is_expired(now)) {
            return self.pending.take();
        }
        None
    }

    /// Forget any pending request.
    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Whether nothing is pending.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pending.is_none()
    }
}
