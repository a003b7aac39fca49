//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation
//! produces identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Fights must be 100% deterministic for rollback, lockstep and replays.
//! Sources of non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   We use fixed-point arithmetic via [`brawl_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Fighters are kept sorted by id and definitions live in ordered maps.
//!
//! - **System randomness**: The core has none.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual module determinism (frame data, statuses, etc.)
//! 2. **Property tests**: Random input scripts must still produce deterministic outputs
//! 3. **Integration tests**: Full matches are reproducible
//! 4. **Parallel tests**: Running N simulations on N threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use brawl_core::input::InputEvent;
use brawl_core::simulation::Simulation;
use tracing::debug;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance by one tick, given the tick index
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```ignore
/// use brawl_test_utils::determinism::verify_determinism;
/// use brawl_test_utils::fixtures::Duel;
///
/// let result = verify_determinism(
///     5,   // Run 5 times
///     300, // 300 ticks each
///     || Duel::new(1),
///     |duel, tick| { duel.sim.tick(&script(duel, tick)); },
///     |duel| duel.sim.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S, u64),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for tick in 0..ticks {
            step(&mut state, tick);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run a scripted fight twice and compare final state hashes.
///
/// `script` returns the inputs for a given tick.
pub fn verify_simulation_determinism<F, Script>(
    setup_fn: F,
    script: Script,
    num_ticks: u64,
) -> bool
where
    F: Fn() -> Simulation,
    Script: Fn(u64) -> Vec<InputEvent>,
{
    let result = verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |sim, tick| {
            sim.tick(&script(tick));
        },
        |sim| sim.state_hash(),
    );
    result.is_deterministic
}

/// Result of parallel simulation runs.
#[derive(Debug, Clone)]
pub struct ParallelSimResult {
    /// Final state hash from each simulation.
    pub hashes: Vec<u64>,
    /// Number of ticks each simulation ran.
    pub ticks: u64,
    /// Number of simulations run.
    pub num_sims: usize,
}

impl ParallelSimResult {
    /// Check if all simulations produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all simulations matched.
    ///
    /// # Panics
    ///
    /// Panics if simulations produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel simulations diverged!\n\
                 Simulations: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_sims,
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run N scripted simulations on scoped threads and collect final hashes.
///
/// Catches non-determinism that only shows up under thread scheduling or
/// memory layout differences.
///
/// # Panics
///
/// Panics if a simulation thread panics.
pub fn run_parallel_simulations<F, Script>(
    setup_fn: F,
    script: Script,
    num_sims: usize,
    num_ticks: u64,
) -> ParallelSimResult
where
    F: Fn() -> Simulation + Sync,
    Script: Fn(u64) -> Vec<InputEvent> + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    for tick in 0..num_ticks {
                        sim.tick(&script(tick));
                    }
                    sim.state_hash()
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    ParallelSimResult {
        hashes,
        ticks: num_ticks,
        num_sims,
    }
}

/// Compare two scripted runs tick-by-tick, finding first divergence.
///
/// # Returns
///
/// `None` if the runs agree throughout, `Some(tick)` for the first tick
/// after which their hashes differ (0 means the setups already differ).
pub fn find_first_divergence<F, Script>(setup_fn: F, script: Script, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Simulation,
    Script: Fn(u64) -> Vec<InputEvent>,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    // Check initial state
    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for tick in 0..num_ticks {
        let inputs = script(tick);
        sim1.tick(&inputs);
        sim2.tick(&inputs);

        if sim1.state_hash() != sim2.state_hash() {
            debug!(tick = tick + 1, "simulations diverged");
            return Some(tick + 1);
        }
    }

    None
}

/// Verify that a save/load round-trip mid-fight changes nothing.
///
/// Runs `split` ticks, serializes, restores, and runs both copies to
/// `num_ticks`; the final hashes must match.
pub fn verify_serialization_determinism<F, Script>(
    setup_fn: F,
    script: Script,
    split: u64,
    num_ticks: u64,
) -> bool
where
    F: Fn() -> Simulation,
    Script: Fn(u64) -> Vec<InputEvent>,
{
    let mut sim = setup_fn();

    for tick in 0..split {
        sim.tick(&script(tick));
    }

    // Serialize and deserialize
    let Ok(bytes) = sim.serialize() else {
        return false;
    };
    let Ok(mut restored) = Simulation::deserialize(&bytes) else {
        return false;
    };
    if restored.state_hash() != sim.state_hash() {
        return false;
    }

    for tick in split..num_ticks {
        let inputs = script(tick);
        sim.tick(&inputs);
        restored.tick(&inputs);
    }

    sim.state_hash() == restored.state_hash()
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for determinism testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of the simulation.
pub mod strategies {
    use brawl_core::fighter::FighterId;
    use brawl_core::input::{InputEvent, Intent};
    use brawl_core::math::Fixed;
    use proptest::prelude::*;

    /// Generate a movement axis in `[-1, 1]`, in quarter steps.
    pub fn arb_axis() -> impl Strategy<Value = Fixed> {
        (-4i32..=4i32).prop_map(|quarters| Fixed::from_num(quarters) / Fixed::from_num(4))
    }

    /// Generate any intent. Special slots go one past the reference
    /// striker's specials so unknown slots are exercised too.
    pub fn arb_intent() -> impl Strategy<Value = Intent> {
        prop_oneof![
            arb_axis().prop_map(Intent::Move),
            Just(Intent::Jump),
            Just(Intent::LightAttack),
            Just(Intent::HeavyAttack),
            (0u8..5u8).prop_map(Intent::Special),
            any::<bool>().prop_map(Intent::Block),
            Just(Intent::Parry),
            Just(Intent::Dodge),
        ]
    }

    /// Generate an input for one of the first `fighters` fighters.
    pub fn arb_input(fighters: u32) -> impl Strategy<Value = InputEvent> {
        (0..fighters.max(1), arb_intent())
            .prop_map(|(fighter, intent)| InputEvent::new(FighterId(fighter), intent))
    }

    /// Generate a script: for each tick, the inputs fed on it.
    pub fn arb_script(fighters: u32, max_ticks: usize) -> impl Strategy<Value = Vec<Vec<InputEvent>>> {
        proptest::collection::vec(
            proptest::collection::vec(arb_input(fighters), 0..3),
            1..max_ticks,
        )
    }

    /// Generate damage values (1-100).
    pub fn arb_damage() -> impl Strategy<Value = Fixed> {
        (1i32..100i32).prop_map(Fixed::from_num)
    }

    /// Generate stack counts as authored (1-10).
    pub fn arb_stacks() -> impl Strategy<Value = u32> {
        1u32..10u32
    }
}

#[cfg(test)]
mod tests {
    use super::strategies::arb_script;
    use super::*;
    use crate::fixtures::{Duel, CLOSE};
    use brawl_core::input::Intent;
    use proptest::prelude::*;

    fn exchange(duel: &Duel) -> impl Fn(u64) -> Vec<InputEvent> {
        let (left, right) = (duel.left, duel.right);
        move |tick| match tick % 40 {
            0 => vec![InputEvent::new(left, Intent::LightAttack)],
            7 => vec![InputEvent::new(right, Intent::Block(true))],
            20 => vec![
                InputEvent::new(right, Intent::Block(false)),
                InputEvent::new(right, Intent::Special(1)),
            ],
            30 => vec![InputEvent::new(left, Intent::HeavyAttack)],
            _ => Vec::new(),
        }
    }

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 100, || 0u64, |n, _| *n += 1, |n| *n);

        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![100, 100, 100]);
    }

    #[test]
    fn test_scripted_duel_is_deterministic() {
        let script = exchange(&Duel::new(CLOSE));
        assert!(verify_simulation_determinism(
            || Duel::new(CLOSE).sim,
            &script,
            400
        ));
    }

    #[test]
    fn test_no_divergence() {
        let script = exchange(&Duel::new(CLOSE));
        assert_eq!(
            find_first_divergence(|| Duel::new(CLOSE).sim, &script, 200),
            None
        );
    }

    #[test]
    fn test_serialization_mid_fight() {
        let script = exchange(&Duel::new(CLOSE));
        assert!(verify_serialization_determinism(
            || Duel::new(CLOSE).sim,
            &script,
            37,
            240
        ));
    }

    #[test]
    fn test_parallel_duels() {
        let script = exchange(&Duel::new(CLOSE));
        let result = run_parallel_simulations(|| Duel::new(CLOSE).sim, &script, 4, 300);
        result.assert_deterministic();
    }

    #[test]
    fn test_compute_hash_stable() {
        assert_eq!(compute_hash(&(1u32, "jab")), compute_hash(&(1u32, "jab")));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_random_scripts_are_deterministic(script in arb_script(2, 120)) {
            let result = verify_determinism(
                2,
                script.len() as u64,
                || Duel::new(CLOSE).sim,
                |sim: &mut Simulation, tick: u64| {
                    sim.tick(&script[tick as usize]);
                },
                |sim: &Simulation| sim.state_hash(),
            );
            prop_assert!(result.is_deterministic);
        }
    }
}
