//! Scenario loading and configuration.
//!
//! A scenario names a roster, an optional combat config, the fighters to
//! spawn and a script of inputs keyed by tick. Fighters in the script are
//! addressed by their slot in the `fighters` list, not by runtime id.
//!
//! # Example RON
//!
//! ```ron
//! Scenario(
//!     name: "jab_pressure",
//!     roster: File("roster.ron"),
//!     fighters: [
//!         (fighter: "striker", position: (0.0, 0.0), facing: Right),
//!         (fighter: "tank", position: (1.0, 0.0), facing: Left),
//!     ],
//!     script: [
//!         (tick: 0, slot: 0, intent: LightAttack, every: Some(20)),
//!     ],
//!     max_ticks: 3600,
//! )
//! ```

use std::path::{Path, PathBuf};

use brawl_core::config::CombatConfig;
use brawl_core::data::{Roster, RosterData};
use brawl_core::error::BrawlError;
use brawl_core::fighter::{Facing, FighterId};
use brawl_core::input::{InputEvent, Intent};
use brawl_core::math::{decimal_vec_serde, Vec2Fixed};
use brawl_core::round::Match;
use brawl_core::simulation::Simulation;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// The roster, config or a spawn was rejected by the combat core.
    #[error(transparent)]
    Combat(#[from] BrawlError),
    /// The scenario has nobody to fight.
    #[error("Scenario '{0}' spawns fewer than two fighters")]
    NotEnoughFighters(String),
    /// A scripted input addresses a slot with no fighter in it.
    #[error("Scripted input at tick {tick} targets slot {slot}, but only {fighters} fighter(s) spawn")]
    UnknownSlot {
        /// Tick of the offending input.
        tick: u64,
        /// Requested slot.
        slot: usize,
        /// Fighters in the scenario.
        fighters: usize,
    },
    /// A repeating input with a zero period.
    #[error("Scripted input at tick {0} repeats every 0 ticks")]
    ZeroPeriod(u64),
}

/// Where a scenario's roster comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RosterSource {
    /// A RON roster file, relative to the scenario file.
    File(PathBuf),
    /// A roster written directly into the scenario.
    Inline(RosterData),
}

/// One fighter to spawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterSetup {
    /// Fighter definition name.
    pub fighter: String,
    /// Spawn position.
    #[serde(default, with = "decimal_vec_serde")]
    pub position: Vec2Fixed,
    /// Initial facing.
    #[serde(default)]
    pub facing: Facing,
}

/// A scripted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedInput {
    /// First tick the input is sent.
    pub tick: u64,
    /// Index into the scenario's fighters.
    pub slot: usize,
    /// What the fighter is told to do.
    pub intent: Intent,
    /// Resend every this many ticks.
    #[serde(default)]
    pub every: Option<u64>,
    /// Last tick a repeating input may fire on (inclusive).
    #[serde(default)]
    pub until: Option<u64>,
}

impl ScriptedInput {
    /// Whether this input fires on `tick`.
    #[must_use]
    pub fn fires_at(&self, tick: u64) -> bool {
        if tick < self.tick || self.until.is_some_and(|last| tick > last) {
            return false;
        }
        match self.every {
            Some(period) if period > 0 => (tick - self.tick) % period == 0,
            _ => tick == self.tick,
        }
    }
}

/// A complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Move, status and fighter definitions.
    pub roster: RosterSource,
    /// Combat config; defaults apply when absent.
    #[serde(default)]
    pub config: Option<CombatConfig>,
    /// Fighters in spawn order.
    pub fighters: Vec<FighterSetup>,
    /// Scripted inputs.
    #[serde(default)]
    pub script: Vec<ScriptedInput>,
    /// Tick limit for a run.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
}

/// Ten minutes of simulated time.
const fn default_max_ticks() -> u64 {
    60 * 60 * 10
}

/// A scenario turned into a live match.
#[derive(Debug, Clone)]
pub struct PreparedMatch {
    /// The match, round one about to start.
    pub game: Match,
    /// Runtime id of each scenario slot.
    pub slots: Vec<FighterId>,
}

impl Scenario {
    /// Load a scenario from a RON file.
    ///
    /// A `File` roster path is resolved against the scenario's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let mut scenario = Self::from_ron_str(&contents)?;
        if let RosterSource::File(roster) = &mut scenario.roster {
            if roster.is_relative() {
                if let Some(dir) = path.parent() {
                    *roster = dir.join(&*roster);
                }
            }
        }
        info!(name = %scenario.name, path = %path.display(), "loaded scenario");
        Ok(scenario)
    }

    /// Parse a scenario from RON text.
    pub fn from_ron_str(source: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(source)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Check the parts of the scenario that do not need the roster.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.fighters.len() < 2 {
            return Err(ScenarioError::NotEnoughFighters(self.name.clone()));
        }
        for input in &self.script {
            if input.slot >= self.fighters.len() {
                return Err(ScenarioError::UnknownSlot {
                    tick: input.tick,
                    slot: input.slot,
                    fighters: self.fighters.len(),
                });
            }
            if input.every == Some(0) {
                return Err(ScenarioError::ZeroPeriod(input.tick));
            }
        }
        if let Some(config) = &self.config {
            config.validate()?;
        }
        Ok(())
    }

    /// Load and validate the roster.
    pub fn load_roster(&self) -> Result<Roster, ScenarioError> {
        match &self.roster {
            RosterSource::File(path) => load_roster(path),
            RosterSource::Inline(data) => Ok(Roster::load(data.clone())?),
        }
    }

    /// Build the simulation, spawn every fighter and wrap it in a match.
    pub fn prepare(&self) -> Result<PreparedMatch, ScenarioError> {
        self.validate()?;
        let roster = self.load_roster()?;
        let definitions = self
            .fighters
            .iter()
            .map(|setup| {
                roster
                    .fighter_id(&setup.fighter)
                    .ok_or_else(|| BrawlError::UnknownFighter(setup.fighter.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let config = self.config.clone().unwrap_or_default();
        let mut sim = Simulation::new(roster, config);
        let mut slots = Vec::with_capacity(self.fighters.len());
        for (setup, definition) in self.fighters.iter().zip(definitions) {
            let id = sim.spawn_fighter(definition, setup.position, setup.facing)?;
            debug!(slot = slots.len(), %id, fighter = %setup.fighter, "spawned");
            slots.push(id);
        }

        Ok(PreparedMatch {
            game: Match::new(sim),
            slots,
        })
    }

    /// Inputs the script sends on `tick`, in script order.
    #[must_use]
    pub fn inputs_at(&self, tick: u64, slots: &[FighterId]) -> Vec<InputEvent> {
        self.script
            .iter()
            .filter(|input| input.fires_at(tick))
            .filter_map(|input| {
                slots
                    .get(input.slot)
                    .map(|id| InputEvent::new(*id, input.intent))
            })
            .collect()
    }
}

/// Load and validate a RON roster file.
pub fn load_roster<P: AsRef<Path>>(path: P) -> Result<Roster, ScenarioError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ScenarioError::FileNotFound(path.display().to_string()));
    }
    let contents = std::fs::read_to_string(path)?;
    let roster = Roster::from_ron_str(&contents, &path.display().to_string())?;
    info!(
        path = %path.display(),
        fighters = roster.fighter_count(),
        "loaded roster"
    );
    Ok(roster)
}
