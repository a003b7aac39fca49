//! Replay system for recording and playing back matches.
//!
//! Replays store the initial match state and the stream of inputs fed to
//! it. Playback runs the inputs through a fresh copy of the match and
//! checks that it ends in the recorded state.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{BrawlError, Result};
use crate::input::InputEvent;
use crate::round::Match;

/// A single input record for replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayInput {
    /// Match tick (zero-based) the input was fed on.
    pub tick: u64,
    /// The input.
    pub input: InputEvent,
}

/// Replay file format version for compatibility.
pub const REPLAY_VERSION: u32 = 1;

/// Complete replay data structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replay {
    /// Replay format version.
    pub version: u32,
    /// Scenario identifier or name.
    pub scenario_id: String,
    /// Serialized initial match state, including roster and config.
    pub initial_state: Vec<u8>,
    /// Inputs in tick order.
    pub inputs: Vec<ReplayInput>,
    /// Ticks played.
    pub final_tick: u64,
    /// Final state hash for verification.
    pub final_hash: u64,
}

impl Replay {
    /// Create a new replay from a match's initial state.
    ///
    /// # Errors
    /// Returns an error if the match cannot be serialized.
    pub fn new(scenario_id: impl Into<String>, initial_state: &Match) -> Result<Self> {
        Ok(Self {
            version: REPLAY_VERSION,
            scenario_id: scenario_id.into(),
            initial_state: initial_state.serialize()?,
            inputs: Vec::new(),
            final_tick: 0,
            final_hash: 0,
        })
    }

    /// Record the inputs fed on `tick`.
    pub fn record_inputs(&mut self, tick: u64, inputs: &[InputEvent]) {
        self.inputs
            .extend(inputs.iter().map(|&input| ReplayInput { tick, input }));
    }

    /// Finalize the replay with end-of-match state.
    pub fn finalize(&mut self, final_tick: u64, final_hash: u64) {
        self.final_tick = final_tick;
        self.final_hash = final_hash;
    }

    /// Save the replay to a file.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(self)
            .map_err(|e| BrawlError::InvalidState(format!("Failed to serialize replay: {e}")))?;
        std::fs::write(path.as_ref(), bytes)
            .map_err(|e| BrawlError::InvalidState(format!("Failed to write replay file: {e}")))?;
        Ok(())
    }

    /// Load a replay from a file.
    ///
    /// # Errors
    /// Returns an error if file reading or deserialization fails, or the
    /// replay was written by a different format version.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())
            .map_err(|e| BrawlError::InvalidState(format!("Failed to read replay file: {e}")))?;
        let replay: Self = bincode::deserialize(&bytes)
            .map_err(|e| BrawlError::InvalidState(format!("Failed to deserialize replay: {e}")))?;

        // Version check
        if replay.version != REPLAY_VERSION {
            return Err(BrawlError::InvalidState(format!(
                "Replay version mismatch: expected {REPLAY_VERSION}, got {}",
                replay.version
            )));
        }

        Ok(replay)
    }

    /// Get the initial match state for playback.
    ///
    /// # Errors
    /// Returns an error if state deserialization fails.
    pub fn restore_initial_state(&self) -> Result<Match> {
        Match::deserialize(&self.initial_state)
    }

    /// Inputs fed on a specific tick.
    #[must_use]
    pub fn inputs_at_tick(&self, tick: u64) -> Vec<InputEvent> {
        self.inputs
            .iter()
            .filter(|record| record.tick == tick)
            .map(|record| record.input)
            .collect()
    }

    /// Get the total duration of the replay in ticks.
    #[must_use]
    pub const fn duration(&self) -> u64 {
        self.final_tick
    }

    /// Get the total number of recorded inputs.
    #[must_use]
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }
}

/// Replay playback controller.
#[derive(Debug)]
pub struct ReplayPlayer {
    replay: Replay,
    game: Match,
    current_tick: u64,
    input_index: usize,
}

impl ReplayPlayer {
    /// Create a new replay player from a replay.
    ///
    /// # Errors
    /// Returns an error if the initial state cannot be restored.
    pub fn new(replay: Replay) -> Result<Self> {
        let game = replay.restore_initial_state()?;
        Ok(Self {
            replay,
            game,
            current_tick: 0,
            input_index: 0,
        })
    }

    /// Advance the replay by one tick.
    ///
    /// Returns true if there are more ticks to play.
    pub fn advance(&mut self) -> bool {
        if self.current_tick >= self.replay.final_tick {
            return false;
        }
        self.step();
        self.current_tick < self.replay.final_tick
    }

    /// Seek to a specific tick.
    ///
    /// # Errors
    /// Returns an error if state restoration fails.
    pub fn seek(&mut self, target_tick: u64) -> Result<()> {
        // Reset to initial state
        self.game = self.replay.restore_initial_state()?;
        self.current_tick = 0;
        self.input_index = 0;

        while self.current_tick < target_tick && self.current_tick < self.replay.final_tick {
            self.step();
        }

        Ok(())
    }

    /// Get the current tick.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.current_tick
    }

    /// Get the match as of the current tick.
    #[must_use]
    pub const fn game(&self) -> &Match {
        &self.game
    }

    /// Get the replay being played.
    #[must_use]
    pub const fn replay(&self) -> &Replay {
        &self.replay
    }

    /// Check if the replay has finished.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.current_tick >= self.replay.final_tick
    }

    /// Play the whole replay and compare the final state hash.
    ///
    /// # Errors
    /// Returns [`BrawlError::DesyncDetected`] if playback ends in a different
    /// state than was recorded, or an error if state restoration fails.
    pub fn verify(&mut self) -> Result<()> {
        self.seek(self.replay.final_tick)?;
        let local_hash = self.game.state_hash();
        if local_hash != self.replay.final_hash {
            warn!(
                tick = self.current_tick,
                local_hash,
                recorded_hash = self.replay.final_hash,
                "replay desync"
            );
            return Err(BrawlError::DesyncDetected {
                tick: self.current_tick,
                local_hash,
                remote_hash: self.replay.final_hash,
            });
        }
        debug!(ticks = self.current_tick, "replay verified");
        Ok(())
    }

    /// Get progress as a percentage (0-100).
    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        if self.replay.final_tick == 0 {
            100.0
        } else {
            (self.current_tick as f64 / self.replay.final_tick as f64) * 100.0
        }
    }

    fn step(&mut self) {
        let mut inputs = Vec::new();
        while let Some(record) = self.replay.inputs.get(self.input_index) {
            if record.tick > self.current_tick {
                break;
            }
            if record.tick == self.current_tick {
                inputs.push(record.input);
            }
            self.input_index += 1;
        }
        self.game.tick(&inputs);
        self.current_tick += 1;
    }
}
