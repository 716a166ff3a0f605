//! Seeded damage barrages against many copies of one layout.
//!
//! Each ship gets its own RNG seeded from `seed + index`, so the outcome of
//! a ship depends only on the layout, the seed and its index. Ships run in
//! parallel with rayon.

use hull_core::data::ShipLayoutData;
use hull_core::hull::ShipHull;
use hull_core::math::{Fixed, Vec2Fixed};
use hull_core::targeting::TargetingConfig;
use hull_core::transform::ShipTransform;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;

use crate::Result;

/// Barrage parameters.
#[derive(Debug, Clone, Copy)]
pub struct BarrageConfig {
    /// Number of ships to fire on.
    pub ships: u32,
    /// Volleys per ship.
    pub volleys: u32,
    /// Seed of the first ship.
    pub seed: u64,
}

impl Default for BarrageConfig {
    fn default() -> Self {
        Self {
            ships: 8,
            volleys: 100,
            seed: 1,
        }
    }
}

/// Final state of one ship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShipOutcome {
    /// Ship index.
    pub ship: u32,
    /// Seed the ship ran with.
    pub seed: u64,
    /// Modules destroyed at the end.
    pub destroyed: usize,
    /// External slots left.
    pub external_left: u32,
    /// Damage soaked by shields, whole units.
    pub shield_absorbed: i64,
    /// Damage soaked by modules, whole units.
    pub module_absorbed: i64,
    /// Hull state hash after the last volley.
    pub state_hash: u64,
}

/// Results for all ships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarrageSummary {
    /// Layout name.
    pub layout: String,
    /// Volleys fired per ship.
    pub volleys: u32,
    /// Ships in index order.
    pub ships: Vec<ShipOutcome>,
}

impl BarrageSummary {
    /// Ships with every module destroyed.
    pub fn wrecks(&self) -> usize {
        self.ships.iter().filter(|s| s.external_left == 0).count()
    }
}

/// Range of blast offsets from the ship center, world units.
const SPREAD: i32 = 96;
/// Shield recharge between volleys.
const RECHARGE: i32 = 5;

/// Fire `config.volleys` random volleys at `config.ships` copies of `layout`.
///
/// # Errors
///
/// Returns an error if the layout does not build.
pub fn run_barrage(layout: &ShipLayoutData, config: BarrageConfig) -> Result<BarrageSummary> {
    let template = layout.build_hull(ShipTransform::default())?;
    tracing::info!(
        layout = %layout.name,
        ships = config.ships,
        volleys = config.volleys,
        "Starting barrage"
    );

    let ships: Vec<ShipOutcome> = (0..config.ships)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed.wrapping_add(u64::from(i));
            run_ship(template.clone(), i, seed, config.volleys)
        })
        .collect();

    let summary = BarrageSummary {
        layout: layout.name.clone(),
        volleys: config.volleys,
        ships,
    };
    tracing::info!(wrecks = summary.wrecks(), "Barrage complete");
    Ok(summary)
}

fn run_ship(mut hull: ShipHull, ship: u32, seed: u64, volleys: u32) -> ShipOutcome {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let targeting = TargetingConfig::default();
    let mut shield_absorbed = Fixed::ZERO;
    let mut module_absorbed = Fixed::ZERO;

    for volley in 0..volleys {
        if hull.num_external_slots() == 0 {
            tracing::debug!(ship, volley, "Ship destroyed");
            break;
        }
        let center = hull.transform().position;
        let aim = center + random_offset(&mut rng);
        let amount = Fixed::from_num(rng.gen_range(10..=120_i32));

        match rng.gen_range(0..3) {
            0 => {
                let radius = Fixed::from_num(rng.gen_range(0..=24_i32));
                let report = hull.damage_modules_in_range(seed, amount, aim, radius, false);
                shield_absorbed += report.shield_absorbed;
                module_absorbed += report.module_absorbed;
            }
            1 => {
                let start = center + random_offset(&mut rng) * Fixed::from_num(4);
                if let Some(id) = hull.ray_hit_test_single(start, aim, Fixed::ZERO, false) {
                    if let Some(at) = hull.module_world_center(id) {
                        let report = hull.damage_modules_in_range(seed, amount, at, Fixed::ZERO, false);
                        shield_absorbed += report.shield_absorbed;
                        module_absorbed += report.module_absorbed;
                    }
                }
            }
            _ => {
                let skill = rng.gen_range(0..4);
                let target = hull.random_module_for_projectile(&targeting, aim, skill, &mut rng);
                if let Some(id) = target {
                    let before = hull.module(id).map_or(Fixed::ZERO, |m| m.health());
                    if hull.damage_module(id, amount).is_ok() {
                        let after = hull.module(id).map_or(Fixed::ZERO, |m| m.health());
                        module_absorbed += before - after;
                    }
                }
            }
        }
        hull.recharge_shields(Fixed::from_num(RECHARGE));
    }

    ShipOutcome {
        ship,
        seed,
        destroyed: hull.modules().iter().filter(|m| !m.is_active()).count(),
        external_left: hull.num_external_slots(),
        shield_absorbed: shield_absorbed.to_num(),
        module_absorbed: module_absorbed.to_num(),
        state_hash: hull.state_hash(),
    }
}

fn random_offset<R: Rng>(rng: &mut R) -> Vec2Fixed {
    Vec2Fixed::new(
        Fixed::from_num(rng.gen_range(-SPREAD..=SPREAD)),
        Fixed::from_num(rng.gen_range(-SPREAD..=SPREAD)),
    )
}
