//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a game session produces
//! identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Turn replays and save files only work if the core is deterministic.
//! Sources of non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   We use fixed-point arithmetic via [`hex_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Grid queries and snapshots always iterate in sorted coordinate order.
//!
//! - **Subscriber order**: Tickables run in (priority, registration) order
//!   and turn listeners in registration order.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual modules (tick order, turn bridge, fog)
//! 2. **Property tests**: Random inputs must still produce deterministic outputs
//! 3. **Integration tests**: Full session scenarios are reproducible
//! 4. **Parallel tests**: Running N sessions on N threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use hex_core::data::GameModeKind;
use hex_core::grid::HexGrid;
use hex_core::hex::{HexCoord, HexLayout};
use hex_core::math::Fixed;
use hex_core::session::GameSession;

/// One 60 Hz frame in fixed point.
pub const FRAME_DELTA: Fixed = Fixed::from_bits(71_582_788);

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps simulated.
    pub steps: u64,
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

    /// Assert that the runs matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Session is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `steps` - Number of steps to simulate per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```ignore
/// use hex_test_utils::determinism::{session_hash, standard_step, verify_determinism};
///
/// let result = verify_determinism(
///     5,   // Run 5 times
///     100, // 100 steps each
///     || started_session(GameModeKind::TurnBased, 8, 8),
///     standard_step,
///     session_hash,
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
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

        for _ in 0..steps {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Advance a session by one frame of scripted play.
///
/// Turn-based sessions also end the player's turn. Afterwards one tile,
/// chosen from the tick count, changes owner and reveals its neighbours
/// to player 0, so the grid state depends on the whole history.
pub fn standard_step(session: &mut GameSession) {
    session.update(FRAME_DELTA);
    if session.state().mode().kind() == GameModeKind::TurnBased {
        session.end_player_turn();
    }

    let tick = session.ticks().ticks_processed();
    if let Some(grid) = session.grid_mut() {
        let width = u64::from(grid.width().max(1));
        let height = u64::from(grid.height().max(1));
        let q = i32::try_from(tick % width).unwrap_or(0);
        let r = i32::try_from((tick / width) % height).unwrap_or(0);
        let coord = HexCoord::new(q, r);
        let owner = u32::try_from(tick % 2).unwrap_or(0);
        grid.set_owner(coord, Some(owner));
        grid.reveal_around(0, coord, 1);
        grid.drain_events();
    }
}

/// Hash everything observable about a session.
#[must_use]
pub fn session_hash(session: &GameSession) -> u64 {
    let mut hasher = DefaultHasher::new();

    if let Some(snapshot) = session.save_snapshot(0) {
        match snapshot.to_bytes() {
            Ok(bytes) => bytes.hash(&mut hasher),
            Err(error) => tracing::warn!(%error, "Snapshot encoding failed while hashing"),
        }
    }

    session.phase().hash(&mut hasher);
    let mode = session.state().mode();
    mode.kind().hash(&mut hasher);
    mode.time().total_time().to_bits().hash(&mut hasher);
    mode.turns()
        .map(|turns| (turns.current_turn(), turns.is_turn_in_progress()))
        .hash(&mut hasher);
    session.ticks().ticks_processed().hash(&mut hasher);
    session.buildings().len().hash(&mut hasher);

    hasher.finish()
}

/// Result of parallel session runs.
#[derive(Debug, Clone)]
pub struct ParallelSimResult {
    /// Final state hash from each session.
    pub hashes: Vec<u64>,
    /// Number of steps each session ran.
    pub steps: u64,
    /// Number of sessions run.
    pub num_sims: usize,
}

impl ParallelSimResult {
    /// Check if all sessions produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all sessions matched.
    ///
    /// # Panics
    ///
    /// Panics if sessions produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel sessions diverged!\n\
                 Sessions: {}\n\
                 Steps: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_sims,
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run N sessions on scoped threads with [`standard_step`].
///
/// Sessions are single-threaded; each one is built and dropped on its
/// own thread, so only the setup function has to be shareable.
///
/// # Panics
///
/// Panics if a session thread panics.
pub fn run_parallel_sessions<F>(setup_fn: F, num_sims: usize, steps: u64) -> ParallelSimResult
where
    F: Fn() -> GameSession + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut session = setup_fn();
                    for _ in 0..steps {
                        standard_step(&mut session);
                    }
                    session_hash(&session)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("session thread panicked"))
            .collect()
    });

    ParallelSimResult {
        hashes,
        steps,
        num_sims,
    }
}

/// Compare two session runs step-by-step, finding first divergence.
///
/// # Returns
///
/// `None` if the runs are deterministic, `Some(step)` if they diverge
/// at that step.
pub fn find_first_divergence<F>(setup_fn: F, steps: u64) -> Option<u64>
where
    F: Fn() -> GameSession,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if session_hash(&first) != session_hash(&second) {
        return Some(0);
    }

    for step in 1..=steps {
        standard_step(&mut first);
        standard_step(&mut second);

        if session_hash(&first) != session_hash(&second) {
            return Some(step);
        }
    }

    None
}

/// Verify that a JSON save round-trip preserves the grid exactly.
pub fn verify_snapshot_determinism<F>(setup_fn: F, steps: u64) -> bool
where
    F: Fn() -> GameSession,
{
    let mut session = setup_fn();
    for _ in 0..steps {
        standard_step(&mut session);
    }

    let Some(snapshot) = session.save_snapshot(0) else {
        return false;
    };
    let Ok(json) = snapshot.to_json() else {
        return false;
    };
    let Ok(decoded) = hex_core::snapshot::GridSnapshot::from_json(&json) else {
        return false;
    };
    let Ok(restored) = HexGrid::from_snapshot(&decoded, HexLayout::default()) else {
        return false;
    };

    restored.to_snapshot(0) == snapshot
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for the hex core.
pub mod strategies {
    use proptest::prelude::*;

    use hex_core::data::TerrainType;
    use hex_core::hex::HexCoord;
    use hex_core::math::Fixed;

    /// Generate an axial coordinate with both axes in `-radius..=radius`.
    pub fn arb_hex_coord(radius: i32) -> impl Strategy<Value = HexCoord> {
        (-radius..=radius, -radius..=radius).prop_map(|(q, r)| HexCoord::new(q, r))
    }

    /// Generate a tick priority.
    pub fn arb_priority() -> impl Strategy<Value = i32> {
        -1000i32..1000i32
    }

    /// Generate a list of tick priorities (duplicates likely).
    pub fn arb_priorities(max_len: usize) -> impl Strategy<Value = Vec<i32>> {
        proptest::collection::vec(prop_oneof![arb_priority(), 0i32..4i32], 1..max_len)
    }

    /// Generate a terrain type.
    pub fn arb_terrain() -> impl Strategy<Value = TerrainType> {
        proptest::sample::select(TerrainType::ALL.to_vec())
    }

    /// Generate a time scale from 0 to 4 in steps of 0.25.
    pub fn arb_time_scale() -> impl Strategy<Value = Fixed> {
        (0i32..=16i32).prop_map(|quarters| Fixed::from_num(quarters) / Fixed::from_num(4))
    }

    /// Generate grid dimensions.
    pub fn arb_grid_size() -> impl Strategy<Value = (u32, u32)> {
        (1u32..12u32, 1u32..12u32)
    }
}
