//! Headless fighting-game runner.
//!
//! Runs scripted matches without graphics, validates roster files and
//! verifies recorded replays.
//!
//! # Usage
//!
//! ```bash
//! # Run a scenario, printing a text summary
//! cargo run -p brawl_headless -- run --scenario scenarios/jab_pressure.ron
//!
//! # Stream events as JSON lines and record a replay
//! cargo run -p brawl_headless -- run --scenario scenarios/jab_pressure.ron --json --record out.replay
//!
//! # Validate a roster
//! cargo run -p brawl_headless -- validate scenarios/roster.ron
//!
//! # Verify a replay
//! cargo run -p brawl_headless -- replay out.replay
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use brawl_core::replay::{Replay, ReplayPlayer};
use brawl_core::round::MatchStatus;
use brawl_headless::{load_roster, MatchRunner, Response, RunOptions, RunReport, Scenario};

#[derive(Parser)]
#[command(name = "brawl_headless")]
#[command(about = "Headless fighting-game runner for scripted matches and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted match
    Run {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: PathBuf,

        /// Tick limit (overrides the scenario's)
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Print events as JSON lines instead of a text summary
        #[arg(long)]
        json: bool,

        /// Save a replay of the run
        #[arg(long)]
        record: Option<PathBuf>,
    },

    /// Load and validate a roster file
    Validate {
        /// Roster RON file
        roster: PathBuf,
    },

    /// Verify a recorded replay
    Replay {
        /// Replay file
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout is for protocol output
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            ticks,
            json,
            record,
        } => cmd_run(&scenario, ticks, json, record),
        Commands::Validate { roster } => cmd_validate(&roster),
        Commands::Replay { file } => cmd_replay(&file),
    }
}

/// Run a scenario to completion
fn cmd_run(path: &Path, ticks: Option<u64>, json: bool, record: Option<PathBuf>) -> ExitCode {
    tracing::info!("Running scenario: {}", path.display());

    let scenario = match Scenario::load(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to load scenario: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let options = RunOptions {
        max_ticks: ticks,
        record: record.is_some(),
    };
    let mut runner = match MatchRunner::new(scenario, &options) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to set up match: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = if json {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let mut write_failed = false;
        let mut emit = |response: &Response| match response.to_json_line() {
            Ok(line) => {
                if writeln!(out, "{line}").is_err() {
                    write_failed = true;
                }
            }
            Err(e) => tracing::error!("Failed to encode output: {}", e),
        };

        emit(&Response::ready(
            &runner.scenario().name,
            runner.game().simulation().snapshot(),
        ));
        let report = runner.run_with(|tick| {
            if let Some(response) = Response::events(tick) {
                emit(&response);
            }
        });
        emit(&Response::MatchOver(report.clone()));
        if write_failed {
            eprintln!("Failed to write to stdout");
            return ExitCode::FAILURE;
        }
        report
    } else {
        let report = runner.run();
        print_summary(&report);
        report
    };

    if let Some(path) = record {
        let Some(replay) = runner.into_replay() else {
            return ExitCode::FAILURE;
        };
        if let Err(e) = replay.save(&path) {
            eprintln!("Failed to save replay: {}", e);
            return ExitCode::FAILURE;
        }
        eprintln!("Replay saved to: {}", path.display());
    }

    if report.timed_out() {
        tracing::warn!("Tick limit reached before the match was decided");
    }
    ExitCode::SUCCESS
}

fn print_summary(report: &RunReport) {
    println!("{}", "=".repeat(50));
    println!("MATCH COMPLETE: {}", report.scenario);
    println!("{}", "=".repeat(50));
    println!("Ticks: {}", report.ticks);
    match report.status {
        MatchStatus::Finished { winner: Some(id) } => println!("Winner: {}", id),
        MatchStatus::Finished { winner: None } => println!("Result: draw"),
        MatchStatus::InProgress => println!("Result: undecided (tick limit)"),
    }

    println!("\nRounds:");
    for round in &report.rounds {
        let winner = round
            .winner
            .map_or_else(|| "draw".to_string(), |id| id.to_string());
        println!(
            "  {}: {} by {:?} after {} ticks",
            round.round, winner, round.reason, round.ticks
        );
    }

    println!("\nFighters:");
    for fighter in &report.fighters {
        println!(
            "  {}: {:.1}/{:.1} hp, {:?}{}",
            fighter.id,
            fighter.health.to_num::<f64>(),
            fighter.max_health.to_num::<f64>(),
            fighter.state,
            if fighter.knocked_out { " (KO)" } else { "" }
        );
    }
    println!("\nEvents: {}", report.event_count);
    println!("State hash: {:016x}", report.final_hash);
}

/// Validate a roster file
fn cmd_validate(path: &Path) -> ExitCode {
    tracing::info!("Validating roster: {}", path.display());

    match load_roster(path) {
        Ok(roster) => {
            eprintln!("PASS: {} is valid", path.display());
            eprintln!("  Fighters: {}", roster.fighter_count());
            eprintln!("  Moves: {}", roster.moves().count());
            eprintln!("  Conditions: {}", roster.conditions().count());
            eprintln!(
                "  Heaviest hit: {:.1}",
                roster.max_move_damage().to_num::<f64>()
            );
            ExitCode::SUCCESS
        }
        Err(brawl_headless::ScenarioError::Combat(e)) => {
            eprintln!("FAIL: {} is invalid", path.display());
            for violation in e.into_violations() {
                eprintln!("  - {}", violation);
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("FAIL: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Verify a recorded replay
fn cmd_replay(file: &Path) -> ExitCode {
    tracing::info!("Verifying replay: {}", file.display());

    let replay = match Replay::load(file) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to load replay: {}", e);
            return ExitCode::FAILURE;
        }
    };

    eprintln!("Loaded replay:");
    eprintln!("  Scenario: {}", replay.scenario_id);
    eprintln!("  Inputs: {}", replay.input_count());
    eprintln!("  Duration: {} ticks", replay.duration());

    let mut player = match ReplayPlayer::new(replay) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to create replay player: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match player.verify() {
        Ok(()) => {
            eprintln!("PASS: Replay verification successful");
            eprintln!("  Expected hash: {:016x}", player.replay().final_hash);
            eprintln!("  Actual hash:   {:016x}", player.game().state_hash());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("FAIL: {}", e);
            eprintln!("  Expected: {:016x}", player.replay().final_hash);
            eprintln!("  Actual:   {:016x}", player.game().state_hash());
            ExitCode::FAILURE
        }
    }
}
