//! Determinism testing utilities.
//!
//! Provides a harness for verifying that hull damage produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! Hull queries run inside a lockstep simulation, so a given sequence of
//! hits must leave every client with the same hull. Sources of
//! non-determinism include:
//!
//! - **Floating-point math**: all coordinates and damage use
//!   [`hull_core::math::Fixed`].
//! - **System randomness**: targeting takes an explicit RNG; tests seed it.
//! - **Iteration order**: grids are dense arrays, never hash maps.

use std::thread;

use hull_core::hull::ShipHull;
use hull_core::math::Fixed;
use hull_core::transform::CELL_SIZE;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::fixtures::{fixed, vec2};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps applied per run.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic run).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Hull damage is non-deterministic!\n\
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

/// Run a setup/step sequence several times and verify the final hashes match.
///
/// # Arguments
///
/// * `runs` - Number of repetitions
/// * `steps` - Number of steps per run
/// * `setup` - Creates the initial state
/// * `step` - Advances the state by one step
/// * `hash` - Computes the state hash
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

/// Fire one pseudo-random volley at a hull.
///
/// Alternates between radial blasts and rays aimed at a random point
/// inside the grid, then trickles some power back into the shields.
///
/// # Panics
///
/// Panics if the ray trace returns a module id the hull does not own.
pub fn random_volley<R: Rng + ?Sized>(hull: &mut ShipHull, rng: &mut R) {
    let width = hull.grid().width() as i32 * CELL_SIZE;
    let height = hull.grid().height() as i32 * CELL_SIZE;
    let local = vec2(rng.gen_range(0..width), rng.gen_range(0..height));
    let target = hull.grid_local_to_world(local);
    let amount = fixed(rng.gen_range(10..120));

    if rng.gen_range(0..2) == 0 {
        let radius = fixed(rng.gen_range(0..32));
        hull.damage_modules_in_range(1, amount, target, radius, false);
    } else {
        let start = target + vec2(rng.gen_range(-400..400), -600);
        if let Some(id) = hull.ray_hit_test_single(start, target, Fixed::ZERO, false) {
            hull.damage_module(id, amount).expect("id came from this hull");
        }
    }
    hull.recharge_shields(fixed(2));
}

/// Apply `volleys` seeded random volleys and return the final state hash.
pub fn barrage_hash<F>(setup_fn: &F, volleys: u64, seed: u64) -> u64
where
    F: Fn() -> ShipHull + ?Sized,
{
    let mut hull = setup_fn();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for _ in 0..volleys {
        random_volley(&mut hull, &mut rng);
    }
    hull.state_hash()
}

/// Run the same seeded barrage twice and compare final hashes.
pub fn verify_hull_determinism<F>(setup_fn: F, volleys: u64, seed: u64) -> bool
where
    F: Fn() -> ShipHull,
{
    barrage_hash(&setup_fn, volleys, seed) == barrage_hash(&setup_fn, volleys, seed)
}

/// Run the same seeded barrage on `num_hulls` hulls, one per thread.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_barrages<F>(setup_fn: F, num_hulls: usize, volleys: u64, seed: u64) -> DeterminismResult
where
    F: Fn() -> ShipHull + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_hulls)
            .map(|_| s.spawn(|| barrage_hash(&setup_fn, volleys, seed)))
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("barrage thread panicked"))
            .collect()
    });

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    DeterminismResult {
        is_deterministic,
        hashes,
        steps: volleys,
    }
}

/// Compare two seeded barrages volley-by-volley, finding the first divergence.
///
/// # Returns
///
/// `None` if the hulls never diverge, `Some(volley)` otherwise.
pub fn find_first_divergence<F>(setup_fn: F, volleys: u64, seed: u64) -> Option<u64>
where
    F: Fn() -> ShipHull,
{
    let mut a = setup_fn();
    let mut b = setup_fn();
    let mut rng_a = ChaCha8Rng::seed_from_u64(seed);
    let mut rng_b = ChaCha8Rng::seed_from_u64(seed);

    if a.state_hash() != b.state_hash() {
        return Some(0);
    }

    for volley in 1..=volleys {
        random_volley(&mut a, &mut rng_a);
        random_volley(&mut b, &mut rng_b);
        if a.state_hash() != b.state_hash() {
            return Some(volley);
        }
    }

    None
}

/// Verify that a snapshot round trip preserves the hull exactly, and that
/// the restored hull keeps reacting to damage identically.
pub fn verify_snapshot_determinism<F>(setup_fn: F, volleys: u64, seed: u64) -> bool
where
    F: Fn() -> ShipHull,
{
    let mut hull = setup_fn();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for _ in 0..volleys {
        random_volley(&mut hull, &mut rng);
    }

    let Ok(bytes) = hull.to_bytes() else {
        return false;
    };
    let Ok(mut restored) = ShipHull::from_bytes(&bytes) else {
        return false;
    };
    if restored.state_hash() != hull.state_hash() {
        return false;
    }

    let mut rng_restored = rng.clone();
    for _ in 0..volleys {
        random_volley(&mut hull, &mut rng);
        random_volley(&mut restored, &mut rng_restored);
    }
    restored.state_hash() == hull.state_hash()
}

/// Proptest strategies for hull layouts and queries.
pub mod strategies {
    use proptest::prelude::*;

    use hull_core::math::{Fixed, Rotation, Vec2Fixed};
    use hull_core::module::{ModuleKind, ShieldGenerator, ShipModule};
    use hull_core::transform::ShipTransform;

    use crate::fixtures::{block_layout, fixed, module_at_cell};

    /// Grid dimensions in cells: 1 to 8 on each axis.
    pub fn arb_dims() -> impl Strategy<Value = (u32, u32)> {
        (1u32..=8, 1u32..=8)
    }

    /// A dense block of 1x1 structure modules.
    pub fn arb_block_layout() -> impl Strategy<Value = Vec<ShipModule>> {
        arb_dims().prop_map(|(w, h)| block_layout(w, h, 100))
    }

    /// Pack modules of random footprints row by row into a `w` x `h` area.
    ///
    /// Each free cell either stays empty or starts a module of up to 3x3
    /// cells, shrunk until it fits in free space. Some modules are
    /// shields. The first cell is always occupied.
    fn pack(w: u32, h: u32, choices: &[(u32, u32, u8)]) -> Vec<ShipModule> {
        let (wi, hi) = (w as i32, h as i32);
        let mut used = vec![false; (w * h) as usize];
        let mut modules = Vec::new();

        for y in 0..hi {
            for x in 0..wi {
                let index = (y * wi + x) as usize;
                if used[index] {
                    continue;
                }
                let (cw, ch, roll) = choices[index % choices.len()];
                if roll < 3 && index != 0 {
                    continue;
                }

                let fits = |fw: i32, fh: i32| {
                    x + fw <= wi
                        && y + fh <= hi
                        && (y..y + fh).all(|yy| (x..x + fw).all(|xx| !used[(yy * wi + xx) as usize]))
                };
                let (mut fw, mut fh) = (cw as i32 + 1, ch as i32 + 1);
                while !fits(fw, fh) {
                    if fw >= fh && fw > 1 {
                        fw -= 1;
                    } else {
                        fh -= 1;
                    }
                }
                for yy in y..y + fh {
                    for xx in x..x + fw {
                        used[(yy * wi + xx) as usize] = true;
                    }
                }

                let kind = if roll == 9 {
                    ModuleKind::Shield(ShieldGenerator::new(fixed(40), fixed(24)))
                } else {
                    ModuleKind::Structure
                };
                modules.push(module_at_cell(kind, (x, y), (fw as u32, fh as u32), (w, h), 50));
            }
        }
        modules
    }

    /// A gappy layout of mixed-size modules.
    pub fn arb_packed_layout() -> impl Strategy<Value = Vec<ShipModule>> {
        arb_dims().prop_flat_map(|(w, h)| {
            proptest::collection::vec((0u32..3, 0u32..3, 0u8..10), (w * h) as usize)
                .prop_map(move |choices| pack(w, h, &choices))
        })
    }

    /// A sequence of module indices to kill or revive (taken modulo the
    /// module count by the caller).
    pub fn arb_toggle_list(max_len: usize) -> impl Strategy<Value = Vec<usize>> {
        proptest::collection::vec(0usize..64, 1..max_len)
    }

    /// A ship transform near the origin with an exact quarter-turn heading.
    pub fn arb_transform() -> impl Strategy<Value = ShipTransform> {
        (-500i32..500, -500i32..500, 0i32..4).prop_map(|(x, y, turns)| {
            ShipTransform::new(
                Vec2Fixed::new(Fixed::from_num(x), Fixed::from_num(y)),
                Rotation::from_quarter_turns(turns),
            )
        })
    }

    /// An offset from a ship center, reaching somewhat past an 8x8 grid.
    pub fn arb_offset() -> impl Strategy<Value = Vec2Fixed> {
        (-90i32..90, -90i32..90).prop_map(|(x, y)| Vec2Fixed::new(Fixed::from_num(x), Fixed::from_num(y)))
    }

    /// Blast radius in world units.
    pub fn arb_radius() -> impl Strategy<Value = Fixed> {
        (0i32..48).prop_map(Fixed::from_num)
    }

    /// Damage amount.
    pub fn arb_damage() -> impl Strategy<Value = Fixed> {
        (1i32..600).prop_map(Fixed::from_num)
    }
}
