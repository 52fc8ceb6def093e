//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a battle produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! A battle is only guaranteed to be reproducible within a single build
//! and machine, but inside that scope it must be exact. Sources of
//! non-determinism to watch for:
//!
//! - **Floating-point math**: The simulation uses fixed-point arithmetic
//!   via [`arena_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   The registry is a `BTreeMap` keyed by insertion id.
//!
//! - **Wall clock**: Simulated time is always supplied by the caller.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual behaviors (targeting, movement, spells)
//! 2. **Property tests**: Random deploy scripts still replay identically
//! 3. **Integration tests**: Full matches are reproducible
//! 4. **Parallel tests**: Running N battles on threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use arena_core::simulation::Battle;

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
    /// Get all unique hashes (should be 1 for a deterministic battle).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the battle was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Battle is non-deterministic!\n\
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
/// * `ticks` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute a state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
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

/// Advance a battle by one fixed step, deriving the timestamp from the
/// battle's own elapsed time.
pub fn step_battle(battle: &mut Battle, step_ms: u64) {
    let time_ms = battle.state().elapsed_ms + step_ms;
    battle.tick(time_ms, step_ms);
}

/// Run the same battle setup twice for `num_ticks` fixed steps and
/// compare the final state hashes.
///
/// # Example
///
/// ```
/// use arena_test_utils::determinism::verify_battle_determinism;
/// use arena_test_utils::fixtures::standard_battle;
///
/// let result = verify_battle_determinism(standard_battle, 50, 33);
/// result.assert_deterministic();
/// ```
pub fn verify_battle_determinism<F>(setup_fn: F, num_ticks: u64, step_ms: u64) -> DeterminismResult
where
    F: Fn() -> Battle,
{
    verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |battle| step_battle(battle, step_ms),
        Battle::state_hash,
    )
}

/// Run N battles on scoped threads and collect their final hashes.
pub fn run_parallel_battles<F>(
    setup_fn: F,
    num_battles: usize,
    num_ticks: u64,
    step_ms: u64,
) -> DeterminismResult
where
    F: Fn() -> Battle + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_battles)
            .map(|_| {
                s.spawn(|| {
                    let mut battle = setup_fn();
                    for _ in 0..num_ticks {
                        step_battle(&mut battle, step_ms);
                    }
                    battle.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("battle thread panicked"))
            .collect()
    });

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    DeterminismResult {
        is_deterministic,
        hashes,
        ticks: num_ticks,
    }
}

/// Compare two runs step by step, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs agree throughout, `Some(tick)` at the first step
/// whose hashes differ (0 means the setups already differ).
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64, step_ms: u64) -> Option<u64>
where
    F: Fn() -> Battle,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        step_battle(&mut first, step_ms);
        step_battle(&mut second, step_ms);

        if first.state_hash() != second.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for battle inputs.
pub mod strategies {
    use arena_core::components::Side;
    use arena_core::math::{Fixed, Vec2Fixed};
    use proptest::prelude::*;

    /// Card ids the shipped table and constructor table know about.
    pub const DECK: [&str; 9] = [
        "Archers",
        "Barbarians",
        "Giant",
        "MiniPEKKA",
        "Valkyrie",
        "Wizard",
        "BabyDragon",
        "InfernoTower",
        "Arrows",
    ];

    /// One scripted deploy.
    #[derive(Debug, Clone)]
    pub struct DeployCommand {
        /// Card id.
        pub card: &'static str,
        /// Drop point.
        pub position: Vec2Fixed,
        /// Owner id string, `"player"` or `"opponent"`.
        pub owner: &'static str,
        /// Step at which the deploy is issued.
        pub at_tick: u64,
    }

    /// Generate a card id from the deck.
    pub fn arb_card() -> impl Strategy<Value = &'static str> {
        proptest::sample::select(DECK.to_vec())
    }

    /// Generate a side.
    pub fn arb_side() -> impl Strategy<Value = Side> {
        prop_oneof![Just(Side::Player), Just(Side::Opponent)]
    }

    /// Generate a point on the default arena (24 x 45 tiles of 22 units).
    pub fn arb_arena_point() -> impl Strategy<Value = Vec2Fixed> {
        (0i32..528, 0i32..990).prop_map(|(x, y)| Vec2Fixed::from_ints(x, y))
    }

    /// Generate a drop point on `side`'s half of the default arena.
    pub fn arb_point_on_half(side: Side) -> impl Strategy<Value = Vec2Fixed> {
        let rows = match side {
            Side::Player => 506i32..990,
            Side::Opponent => 0i32..484,
        };
        (0i32..528, rows).prop_map(|(x, y)| Vec2Fixed::from_ints(x, y))
    }

    /// Generate a deploy command issued within the first `max_tick` steps.
    pub fn arb_deploy(max_tick: u64) -> impl Strategy<Value = DeployCommand> {
        (arb_card(), arb_side(), 0..max_tick)
            .prop_flat_map(|(card, side, at_tick)| {
                arb_point_on_half(side).prop_map(move |position| DeployCommand {
                    card,
                    position,
                    owner: side.as_str(),
                    at_tick,
                })
            })
    }

    /// Generate a deploy script.
    pub fn arb_deploy_script(
        max_len: usize,
        max_tick: u64,
    ) -> impl Strategy<Value = Vec<DeployCommand>> {
        proptest::collection::vec(arb_deploy(max_tick), 0..max_len)
    }

    /// Generate frame times a host might report (1-100 ms).
    pub fn arb_frame_ms() -> impl Strategy<Value = u64> {
        1u64..100
    }

    /// Generate health values (1-5000).
    pub fn arb_health() -> impl Strategy<Value = u32> {
        1u32..5000
    }

    /// Generate damage values (0-10000).
    pub fn arb_damage() -> impl Strategy<Value = u32> {
        0u32..10_000
    }

    /// Generate a tile size between half and double the reference size.
    pub fn arb_tile_size() -> impl Strategy<Value = Fixed> {
        (11i32..=44).prop_map(Fixed::from_num)
    }
}
