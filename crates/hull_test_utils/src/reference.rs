//! Brute-force reference implementations.
//!
//! Each oracle answers a grid question by scanning every module, with no
//! use of the dense grids or incremental state. Property tests compare the
//! accelerated queries against these.

use hull_core::hull::ShipHull;
use hull_core::math::{Fixed, Vec2Fixed};
use hull_core::module::ModuleId;
use hull_core::transform::GridPoint;

/// Module whose placement covers cell `p`, found by scanning every module.
#[must_use]
pub fn occupant(hull: &ShipHull, p: GridPoint) -> Option<ModuleId> {
    hull.module_ids().find(|&id| {
        hull.grid().placement(id).is_some_and(|pl| {
            p.x >= pl.origin.x && p.x < pl.end_x() && p.y >= pl.origin.y && p.y < pl.end_y()
        })
    })
}

fn is_inactive_at(hull: &ShipHull, p: GridPoint) -> bool {
    occupant(hull, p).map_or(true, |id| !hull.modules()[id.index()].is_active())
}

/// Exposure rule evaluated from scratch for one module.
#[must_use]
pub fn expected_external(hull: &ShipHull, id: ModuleId) -> bool {
    let module = &hull.modules()[id.index()];
    if !module.is_active() {
        return false;
    }
    let Some(pl) = hull.grid().placement(id) else {
        return false;
    };
    let (x0, y0, x1, y1) = (pl.origin.x, pl.origin.y, pl.end_x(), pl.end_y());
    let horizontal = (x0..x1).any(|x| {
        is_inactive_at(hull, GridPoint::new(x, y0 - 1)) || is_inactive_at(hull, GridPoint::new(x, y1))
    });
    let vertical = (y0..y1).any(|y| {
        is_inactive_at(hull, GridPoint::new(x0 - 1, y)) || is_inactive_at(hull, GridPoint::new(x1, y))
    });
    horizontal || vertical
}

/// Modules whose stored exposure disagrees with the rule.
#[must_use]
pub fn exposure_mismatches(hull: &ShipHull) -> Vec<ModuleId> {
    hull.module_ids()
        .filter(|&id| hull.modules()[id.index()].is_external() != expected_external(hull, id))
        .collect()
}

/// Cells where the external grid disagrees with the module states.
///
/// A cell should hold a module exactly when its occupant is active and
/// external.
#[must_use]
pub fn external_grid_mismatches(hull: &ShipHull) -> Vec<GridPoint> {
    let grid = hull.grid();
    let mut bad = Vec::new();
    for y in 0..grid.height() as i32 {
        for x in 0..grid.width() as i32 {
            let p = GridPoint::new(x, y);
            let expected = occupant(hull, p).filter(|id| {
                let m = &hull.modules()[id.index()];
                m.is_active() && m.is_external()
            });
            if grid.external_at(p) != expected {
                bad.push(p);
            }
        }
    }
    bad
}

/// Number of modules the rule classifies external.
#[must_use]
pub fn expected_external_count(hull: &ShipHull) -> u32 {
    hull.module_ids()
        .filter(|&id| expected_external(hull, id))
        .count() as u32
}

/// Every active module whose footprint overlaps a circle, in module order.
#[must_use]
pub fn linear_hit_candidates(hull: &ShipHull, world: Vec2Fixed, radius: Fixed) -> Vec<ModuleId> {
    hull.module_ids()
        .filter(|&id| hull.module_hit_test(id, world, radius))
        .collect()
}

/// First shield in module order whose bubble covers a circle.
#[must_use]
pub fn linear_shield_hit(hull: &ShipHull, world: Vec2Fixed, radius: Fixed) -> Option<ModuleId> {
    hull.module_ids().find(|&id| {
        let module = &hull.modules()[id.index()];
        let (Some(shield), Some(center)) = (module.shield(), hull.module_world_center(id)) else {
            return false;
        };
        let reach = shield.radius + radius;
        module.has_active_shield() && center.distance_squared(world) <= reach * reach
    })
}

/// Total health plus shield power across the hull.
#[must_use]
pub fn total_pool(hull: &ShipHull) -> Fixed {
    hull.modules()
        .iter()
        .map(|m| m.health() + m.shield_power())
        .sum()
}
