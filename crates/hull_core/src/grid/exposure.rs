//! Incremental tracking of which modules face open space.
//!
//! A module at `[x, x+w) x [y, y+h)` is external when any cell of the
//! four border strips around it (row `y-1`, column `x-1`, column `x+w`,
//! row `y+h`) is out of bounds, empty, or holds an inactive module.
//!
//! Only cells adjacent to a module that changed state can change their
//! own classification, so activation and deactivation re-check just the
//! changed module and the modules along its border.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{ModuleGrid, EMPTY_CELL};
use crate::math::{Fixed, Vec2Fixed};
use crate::module::{ModuleId, Quadrant, ShipModule};
use crate::transform::GridPoint;

/// A module's active state flipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleEvent {
    /// Health rose above zero.
    Activated(ModuleId),
    /// Health dropped to zero.
    Deactivated(ModuleId),
}

impl ModuleEvent {
    /// Module the event refers to.
    #[must_use]
    pub const fn module(self) -> ModuleId {
        match self {
            Self::Activated(id) | Self::Deactivated(id) => id,
        }
    }
}

impl ModuleGrid {
    /// Classify every module from scratch.
    ///
    /// Row-major scan; once a cell's module is found external the rest
    /// of its footprint row is skipped.
    pub(crate) fn init_exposure(&mut self, modules: &mut [ShipModule]) {
        self.external.fill(EMPTY_CELL);
        self.num_external = 0;
        for module in modules.iter_mut() {
            module.set_exposure(false, Quadrant::Center);
        }

        for y in 0..self.height() as i32 {
            let mut x = 0;
            while x < self.width() as i32 {
                let p = GridPoint::new(x, y);
                if self.external[self.frame.index(p)] == EMPTY_CELL {
                    if let Some(id) = self.module_at(p) {
                        if self.reclassify(modules, id) == Some(true) {
                            x = self.placements[id.index()].end_x();
                            continue;
                        }
                    }
                }
                x += 1;
            }
        }
    }

    /// Apply a module's activation or deactivation.
    ///
    /// Returns every module whose external state flipped, the changed
    /// module first if its own state flipped.
    pub(crate) fn apply_module_event(
        &mut self,
        modules: &mut [ShipModule],
        event: ModuleEvent,
    ) -> Vec<ModuleId> {
        let id = event.module();
        let mut flipped = Vec::new();

        let changed = match event {
            ModuleEvent::Activated(_) => self.reclassify(modules, id).is_some(),
            ModuleEvent::Deactivated(_) => self.remove_external(modules, id),
        };
        if changed {
            flipped.push(id);
        }

        for neighbor in self.border_neighbors(id) {
            if self.reclassify(modules, neighbor).is_some() {
                flipped.push(neighbor);
            }
        }

        trace!(module = %id, ?event, flipped = flipped.len(), "Exposure updated");
        flipped
    }

    /// True if the exposure rule holds for `id` right now.
    pub(crate) fn should_be_external(&self, modules: &[ShipModule], id: ModuleId) -> bool {
        if !modules[id.index()].is_active() {
            return false;
        }
        self.border_cells(id)
            .any(|p| self.is_inactive_at(modules, p))
    }

    /// Re-run the exposure rule for one module.
    ///
    /// Returns `Some(new_state)` if the classification flipped.
    fn reclassify(&mut self, modules: &mut [ShipModule], id: ModuleId) -> Option<bool> {
        let should = self.should_be_external(modules, id);
        if should == modules[id.index()].is_external() {
            return None;
        }
        if should {
            self.add_external(modules, id);
        } else {
            self.remove_external(modules, id);
        }
        Some(should)
    }

    fn add_external(&mut self, modules: &mut [ShipModule], id: ModuleId) -> bool {
        let module = &mut modules[id.index()];
        if module.is_external() {
            return false;
        }
        let placement = self.placements[id.index()];
        module.set_exposure(true, self.quadrant_estimate(placement.center_cell()));
        Self::fill(&mut self.external, &self.frame, &placement, id.raw());
        self.num_external += 1;
        true
    }

    fn remove_external(&mut self, modules: &mut [ShipModule], id: ModuleId) -> bool {
        let module = &mut modules[id.index()];
        if !module.is_external() {
            return false;
        }
        let placement = self.placements[id.index()];
        module.set_exposure(false, Quadrant::Center);
        Self::fill(&mut self.external, &self.frame, &placement, EMPTY_CELL);
        self.num_external -= 1;
        true
    }

    /// Out-of-bounds and empty cells count as inactive.
    fn is_inactive_at(&self, modules: &[ShipModule], p: GridPoint) -> bool {
        self.module_at(p)
            .map_or(true, |other| !modules[other.index()].is_active())
    }

    /// Cells one step outside each side of a module's footprint.
    fn border_cells(&self, id: ModuleId) -> impl Iterator<Item = GridPoint> {
        let p = self.placements[id.index()];
        let (x0, y0, x1, y1) = (p.origin.x, p.origin.y, p.end_x(), p.end_y());
        let top = (x0..x1).map(move |x| GridPoint::new(x, y0 - 1));
        let left = (y0..y1).map(move |y| GridPoint::new(x0 - 1, y));
        let right = (y0..y1).map(move |y| GridPoint::new(x1, y));
        let bottom = (x0..x1).map(move |x| GridPoint::new(x, y1));
        top.chain(left).chain(right).chain(bottom)
    }

    /// Distinct modules touching a module's border, in probe order.
    fn border_neighbors(&self, id: ModuleId) -> Vec<ModuleId> {
        let mut neighbors: Vec<ModuleId> = Vec::with_capacity(4);
        for p in self.border_cells(id) {
            if let Some(other) = self.module_at(p) {
                if other != id && !neighbors.contains(&other) {
                    neighbors.push(other);
                }
            }
        }
        neighbors
    }

    /// Coarse facing of a cell relative to the grid center.
    ///
    /// Cells within one cell of the center on both axes are `Center`.
    /// Otherwise the normalized direction picks a side: mostly
    /// horizontal (`|dir.y| <= 0.5`) means left or right, anything
    /// steeper means top or bottom.
    pub(crate) fn quadrant_estimate(&self, p: GridPoint) -> Quadrant {
        let dx = p.x - self.width() as i32 / 2;
        let dy = p.y - self.height() as i32 / 2;
        if dx.abs() <= 1 && dy.abs() <= 1 {
            return Quadrant::Center;
        }

        let dir = Vec2Fixed::new(Fixed::from_num(dx), Fixed::from_num(dy)).normalize();
        let half = Fixed::ONE / Fixed::from_num(2);
        if dir.y.abs() <= half {
            if dir.x < Fixed::ZERO {
                Quadrant::Left
            } else {
                Quadrant::Right
            }
        } else if dir.y < Fixed::ZERO {
            Quadrant::Top
        } else {
            Quadrant::Bottom
        }
    }
}
