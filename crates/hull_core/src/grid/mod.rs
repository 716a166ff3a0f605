//! Dense per-ship module grid.
//!
//! Two row-major arrays of `width * height` cells:
//! - the full grid, where every cell of a module's footprint holds its
//!   [`ModuleId`] (fixed after construction);
//! - the external grid, holding IDs only for modules that are currently
//!   active and exposed to open space.
//!
//! Cells store raw `u32` indices with [`EMPTY_CELL`] as the sentinel, so
//! the grid never holds references into the module list.

mod exposure;
mod layout;
mod raytrace;
mod ring;

use serde::{Deserialize, Serialize};

use crate::geometry::LocalRect;
use crate::math::Vec2Fixed;
use crate::module::{Footprint, ModuleId};
use crate::transform::{GridFrame, GridPoint};

pub use exposure::ModuleEvent;
pub use layout::MAX_GRID_CELLS;
pub(crate) use raytrace::trace_cells;
pub(crate) use ring::{expand_rings, CellBounds};

/// Sentinel for a cell without a module.
pub const EMPTY_CELL: u32 = u32::MAX;

/// Where a module sits on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    /// Top-left cell.
    pub origin: GridPoint,
    /// Size in cells.
    pub footprint: Footprint,
}

impl Placement {
    /// One past the last column.
    #[must_use]
    pub const fn end_x(&self) -> i32 {
        self.origin.x + self.footprint.width as i32
    }

    /// One past the last row.
    #[must_use]
    pub const fn end_y(&self) -> i32 {
        self.origin.y + self.footprint.height as i32
    }

    /// Every cell covered, row by row.
    pub fn cells(&self) -> impl Iterator<Item = GridPoint> + '_ {
        (self.origin.y..self.end_y())
            .flat_map(move |y| (self.origin.x..self.end_x()).map(move |x| GridPoint::new(x, y)))
    }

    /// Footprint-center cell, used for directional estimates.
    #[must_use]
    pub const fn center_cell(&self) -> GridPoint {
        GridPoint::new(
            self.origin.x + (self.footprint.width as i32) / 2,
            self.origin.y + (self.footprint.height as i32) / 2,
        )
    }
}

/// Spatial index over one ship's modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleGrid {
    frame: GridFrame,
    /// Full grid: module index per cell.
    cells: Vec<u32>,
    /// Active external modules only.
    external: Vec<u32>,
    /// Grid placement of each module, indexed by module ID.
    placements: Vec<Placement>,
    /// Modules with a shield projector.
    shields: Vec<ModuleId>,
    num_external: u32,
}

impl ModuleGrid {
    /// Grid placement within ship-local space.
    #[must_use]
    pub const fn frame(&self) -> &GridFrame {
        &self.frame
    }

    /// Width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.frame.width
    }

    /// Height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.frame.height
    }

    /// Ship-local offset of cell `(0, 0)`.
    #[must_use]
    pub const fn origin(&self) -> Vec2Fixed {
        self.frame.origin
    }

    /// Shield-bearing modules, in module order.
    #[must_use]
    pub fn shields(&self) -> &[ModuleId] {
        &self.shields
    }

    /// Number of modules currently classified external.
    #[must_use]
    pub const fn num_external_slots(&self) -> u32 {
        self.num_external
    }

    /// Module occupying a cell in the full grid, if any.
    #[must_use]
    pub fn module_at(&self, p: GridPoint) -> Option<ModuleId> {
        self.lookup(&self.cells, p)
    }

    /// Module occupying a cell in the external grid, if any.
    #[must_use]
    pub fn external_at(&self, p: GridPoint) -> Option<ModuleId> {
        self.lookup(&self.external, p)
    }

    /// Placement of a module.
    #[must_use]
    pub fn placement(&self, id: ModuleId) -> Option<&Placement> {
        self.placements.get(id.index())
    }

    /// Footprint rectangle of a module in grid-local units.
    #[must_use]
    pub fn module_rect(&self, id: ModuleId) -> Option<LocalRect> {
        self.placement(id).map(|p| {
            let min = self.frame.cell_to_local(p.origin);
            let max = self.frame.cell_to_local(GridPoint::new(p.end_x(), p.end_y()));
            LocalRect::new(min, max)
        })
    }

    /// Bounds covering the whole grid.
    #[must_use]
    pub(crate) fn bounds(&self) -> CellBounds {
        CellBounds::new(
            GridPoint::new(0, 0),
            GridPoint::new(self.width() as i32 - 1, self.height() as i32 - 1),
        )
    }

    #[inline]
    fn lookup(&self, slots: &[u32], p: GridPoint) -> Option<ModuleId> {
        if !self.frame.in_bounds(p) {
            return None;
        }
        match slots[self.frame.index(p)] {
            EMPTY_CELL => None,
            raw => Some(ModuleId::new(raw)),
        }
    }

    fn fill(slots: &mut [u32], frame: &GridFrame, placement: &Placement, value: u32) {
        for cell in placement.cells() {
            slots[frame.index(cell)] = value;
        }
    }
}
