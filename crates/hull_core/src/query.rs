//! Spatial queries against a hull.
//!
//! Point and radial queries use an expanding ring search over the dense
//! grids, ray queries walk cells along the segment, and the rare
//! multi-hit ray query falls back to a linear scan.

use std::ops::ControlFlow;

use tracing::trace;

use crate::geometry::segment_touches_circle;
use crate::grid::{expand_rings, trace_cells, CellBounds};
use crate::hull::ShipHull;
use crate::math::{Fixed, Vec2Fixed};
use crate::module::ModuleId;
use crate::transform::GridPoint;

impl ShipHull {
    /// First active shield whose bubble touches a circle at `world`.
    #[must_use]
    pub fn hit_test_shields(&self, world: Vec2Fixed, radius: Fixed) -> Option<ModuleId> {
        self.grid
            .shields()
            .iter()
            .copied()
            .find(|&id| self.shield_covers(id, world, radius))
    }

    /// First active shield whose bubble touches a thick segment.
    #[must_use]
    pub fn ray_hit_test_shields(
        &self,
        start: Vec2Fixed,
        end: Vec2Fixed,
        ray_radius: Fixed,
    ) -> Option<ModuleId> {
        self.grid.shields().iter().copied().find(|&id| {
            let (Some(module), Some(center)) = (self.module(id), self.module_world_center(id))
            else {
                return false;
            };
            match module.shield() {
                Some(shield) if module.has_active_shield() => {
                    segment_touches_circle(start, end, center, shield.radius.saturating_add(ray_radius))
                }
                _ => false,
            }
        })
    }

    /// True if module `id` is alive and its footprint overlaps a circle
    /// at `world`. Shields are not considered.
    #[must_use]
    pub fn module_hit_test(&self, id: ModuleId, world: Vec2Fixed, radius: Fixed) -> bool {
        let local = self.world_to_grid_local(world);
        self.module_overlaps_local(id, local, radius)
    }

    /// First module hit by a circle at `world`.
    ///
    /// Unless `ignore_shields` is set, an active shield covering the point
    /// wins over any hull module. Otherwise the ring search over the full
    /// grid starts at the cell under `world` and is bounded by the cells
    /// the circle can reach.
    #[must_use]
    pub fn hit_test_single(
        &self,
        world: Vec2Fixed,
        radius: Fixed,
        ignore_shields: bool,
    ) -> Option<ModuleId> {
        if self.num_external_slots() == 0 {
            return None;
        }
        if !ignore_shields {
            if let Some(shield) = self.hit_test_shields(world, radius) {
                return Some(shield);
            }
        }

        let local = self.world_to_grid_local(world);
        let (bounds, start) = self.radius_search_area(local, radius);
        expand_rings(bounds, start, |p| match self.grid.module_at(p) {
            Some(id) if self.module_overlaps_local(id, local, radius) => ControlFlow::Break(id),
            _ => ControlFlow::Continue(()),
        })
    }

    /// Nearest-first active external module to `world`, ignoring shields.
    ///
    /// Searches the external grid across the whole hull, so it always
    /// finds something while any external module remains.
    #[must_use]
    pub fn find_closest_unshielded_module(&self, world: Vec2Fixed) -> Option<ModuleId> {
        if self.num_external_slots() == 0 {
            return None;
        }
        let start = self.world_to_grid_cell_clipped(world);
        expand_rings(self.grid.bounds(), start, |p| match self.grid.external_at(p) {
            Some(id) if self.modules[id.index()].is_active() => ControlFlow::Break(id),
            _ => ControlFlow::Continue(()),
        })
    }

    /// First active module along the segment `start..end`.
    ///
    /// Unless `ignore_shields` is set, active shields touched by the thick
    /// ray win. The grid walk itself follows the thin center line:
    /// `ray_radius` only widens the shield test. Segments that miss the
    /// grid rectangle hit nothing.
    #[must_use]
    pub fn ray_hit_test_single(
        &self,
        start: Vec2Fixed,
        end: Vec2Fixed,
        ray_radius: Fixed,
        ignore_shields: bool,
    ) -> Option<ModuleId> {
        if self.num_external_slots() == 0 {
            return None;
        }
        if !ignore_shields {
            if let Some(shield) = self.ray_hit_test_shields(start, end, ray_radius) {
                return Some(shield);
            }
        }

        let frame = self.grid.frame();
        let a = self.world_to_grid_local(start);
        let b = self.world_to_grid_local(end);
        let (a, b) = frame.local_bounds().clip_segment(a, b)?;
        let a = frame.clip(frame.local_to_cell(a));
        let b = frame.clip(frame.local_to_cell(b));

        trace_cells(a, b, |p| match self.grid.module_at(p) {
            Some(id) if self.modules[id.index()].is_active() => ControlFlow::Break(id),
            _ => ControlFlow::Continue(()),
        })
    }

    /// Every active module touched by a thick ray, nearest first.
    ///
    /// The ray runs from `start` along `direction` for `distance` world
    /// units; `direction` should be normalized. Results are ordered by
    /// distance from `start` to each module's center. Linear in the
    /// module count.
    #[must_use]
    pub fn ray_hit_test_modules(
        &self,
        start: Vec2Fixed,
        direction: Vec2Fixed,
        distance: Fixed,
        ray_radius: Fixed,
    ) -> Vec<ModuleId> {
        let end = start + direction * distance;
        let a = self.world_to_grid_local(start);
        let b = self.world_to_grid_local(end);
        let radius_sq = ray_radius.saturating_mul(ray_radius);

        let mut hits: Vec<(Fixed, ModuleId)> = self
            .module_ids()
            .filter(|&id| self.modules[id.index()].is_active())
            .filter_map(|id| {
                let rect = self.grid.module_rect(id)?;
                if rect.segment_distance_squared(a, b) > radius_sq {
                    return None;
                }
                Some((a.distance_squared(rect.center()), id))
            })
            .collect();

        hits.sort_by_key(|&(dist_sq, id)| (dist_sq, id));
        trace!(hits = hits.len(), "Penetrating ray test");
        hits.into_iter().map(|(_, id)| id).collect()
    }

    /// Ring search area for a circle at grid-local `local`: the clipped
    /// cells the circle can reach, and the clipped cell under its center.
    pub(crate) fn radius_search_area(&self, local: Vec2Fixed, radius: Fixed) -> (CellBounds, GridPoint) {
        let frame = self.grid.frame();
        let reach = Vec2Fixed::splat(radius.max(Fixed::ZERO));
        // Footprints are closed: a circle touching a cell's right or bottom
        // edge still overlaps that cell.
        let touch = Vec2Fixed::splat(Fixed::DELTA);
        let bounds = CellBounds::new(
            frame.clip(frame.local_to_cell(local - reach - touch)),
            frame.clip(frame.local_to_cell(local + reach)),
        );
        (bounds, frame.clip(frame.local_to_cell(local)))
    }

    pub(crate) fn module_overlaps_local(&self, id: ModuleId, local: Vec2Fixed, radius: Fixed) -> bool {
        self.modules[id.index()].is_active()
            && self
                .grid
                .module_rect(id)
                .is_some_and(|rect| rect.overlaps_circle(local, radius))
    }

    /// True if shield module `id` is up and its bubble touches a circle at `world`.
    pub(crate) fn shield_covers(&self, id: ModuleId, world: Vec2Fixed, radius: Fixed) -> bool {
        let Some(module) = self.module(id) else {
            return false;
        };
        let Some(shield) = module.shield() else {
            return false;
        };
        if !module.has_active_shield() {
            return false;
        }
        let Some(center) = self.module_world_center(id) else {
            return false;
        };
        let reach = shield.radius.saturating_add(radius);
        center.distance_squared(world) <= reach.saturating_mul(reach)
    }
}
