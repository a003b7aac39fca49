//! Error types for the combat simulation.

use thiserror::Error;

/// Result type alias using [`BrawlError`].
pub type Result<T> = std::result::Result<T, BrawlError>;

/// Top-level error type for all combat simulation errors.
///
/// Only load-time and API-misuse failures are errors. Illegal combat
/// transitions (starting a move while stunned, for instance) are plain
/// boolean rejections and never produce a `BrawlError`.
#[derive(Debug, Error)]
pub enum BrawlError {
    /// A definition violates one of its data invariants.
    #[error("Invalid {kind} definition '{name}': {reason}")]
    InvalidDefinition {
        /// Kind of definition ("move", "fighter", "status").
        kind: &'static str,
        /// Name of the offending definition.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A move name could not be resolved.
    #[error("Unknown move: {0}")]
    UnknownMove(String),

    /// A status effect name could not be resolved.
    #[error("Unknown status effect: {0}")]
    UnknownStatus(String),

    /// A fighter definition or runtime fighter could not be found.
    #[error("Unknown fighter: {0}")]
    UnknownFighter(String),

    /// Two definitions of the same kind share a name.
    #[error("Duplicate {kind} definition: {name}")]
    DuplicateDefinition {
        /// Kind of definition.
        kind: &'static str,
        /// Name that appears more than once.
        name: String,
    },

    /// The roster failed validation; every violation is listed.
    #[error("Roster rejected with {} error(s)", .0.len())]
    RosterRejected(Vec<BrawlError>),

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Invalid simulation state.
    #[error("Invalid simulation state: {0}")]
    InvalidState(String),

    /// Replay or peer state diverged.
    #[error("Desync detected at tick {tick}: local hash {local_hash}, remote hash {remote_hash}")]
    DesyncDetected {
        /// Tick where desync occurred.
        tick: u64,
        /// Local simulation hash.
        local_hash: u64,
        /// Expected (recorded or remote) hash.
        remote_hash: u64,
    },
}

impl BrawlError {
    /// Flatten a roster rejection into its individual violations.
    ///
    /// Any other error is returned as a single-element list.
    #[must_use]
    pub fn into_violations(self) -> Vec<BrawlError> {
        match self {
            BrawlError::RosterRejected(errors) => errors,
            other => vec![other],
        }
    }
}
