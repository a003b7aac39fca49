//! # Brawl Headless
//!
//! Headless match runner for scripted fights, roster validation and
//! replay verification. Used by CI and balance tooling.
//!
//! Output (stdout): JSON lines (see [`protocol`]) or a text summary
//! Logs (stderr): `tracing` output, filtered by `RUST_LOG`

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod protocol;
pub mod runner;
pub mod scenario;

pub use protocol::Response;
pub use runner::{MatchRunner, RunOptions, RunReport};
pub use scenario::{load_roster, Scenario, ScenarioError};
