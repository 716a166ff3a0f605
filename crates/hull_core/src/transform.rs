//! Conversions between world space and the ship's cell grid.
//!
//! World space is where projectiles live. Grid-local space is the ship's
//! un-rotated layout space shifted so that the grid origin sits at
//! `(0, 0)`. Grid cells are grid-local space quantized by [`CELL_SIZE`].

use serde::{Deserialize, Serialize};

use crate::geometry::LocalRect;
use crate::math::{Fixed, Rotation, Vec2Fixed};

/// Edge length of one grid cell in world units.
pub const CELL_SIZE: i32 = 16;

/// [`CELL_SIZE`] as a fixed-point value.
#[must_use]
pub fn cell_size() -> Fixed {
    Fixed::from_num(CELL_SIZE)
}

/// World placement of a ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ShipTransform {
    /// Ship center in world space.
    pub position: Vec2Fixed,
    /// Ship heading.
    pub rotation: Rotation,
}

impl ShipTransform {
    /// Create a transform.
    #[must_use]
    pub const fn new(position: Vec2Fixed, rotation: Rotation) -> Self {
        Self { position, rotation }
    }

    /// Unrotated transform at `position`.
    #[must_use]
    pub const fn at(position: Vec2Fixed) -> Self {
        Self {
            position,
            rotation: Rotation::IDENTITY,
        }
    }
}

/// Integer cell coordinates. May lie outside the grid before clipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPoint {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl GridPoint {
    /// Create a grid point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Placement of the grid inside ship-local space, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridFrame {
    /// Ship-local offset of cell `(0, 0)`; usually negative.
    pub origin: Vec2Fixed,
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
}

impl GridFrame {
    /// Create a frame.
    #[must_use]
    pub const fn new(origin: Vec2Fixed, width: u32, height: u32) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    /// Total number of cells.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Check if a cell lies inside the grid.
    #[must_use]
    pub const fn in_bounds(&self, p: GridPoint) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as u32) < self.width && (p.y as u32) < self.height
    }

    /// Row-major index of an in-bounds cell.
    #[inline]
    #[must_use]
    pub const fn index(&self, p: GridPoint) -> usize {
        (p.y as usize) * (self.width as usize) + (p.x as usize)
    }


    /// The whole grid as a rectangle in grid-local units.
    #[must_use]
    pub fn local_bounds(&self) -> LocalRect {
        LocalRect::new(
            Vec2Fixed::ZERO,
            Vec2Fixed::new(
                Fixed::from_num(self.width) * cell_size(),
                Fixed::from_num(self.height) * cell_size(),
            ),
        )
    }

    /// World point to grid-local point: subtract the ship center, undo
    /// the ship rotation, then subtract the grid origin.
    #[must_use]
    pub fn world_to_local(&self, transform: &ShipTransform, world: Vec2Fixed) -> Vec2Fixed {
        let offset = world - transform.position;
        transform.rotation.inverse().rotate(offset) - self.origin
    }

    /// Inverse of [`GridFrame::world_to_local`].
    #[must_use]
    pub fn local_to_world(&self, transform: &ShipTransform, local: Vec2Fixed) -> Vec2Fixed {
        transform.rotation.rotate(self.origin + local) + transform.position
    }

    /// Ship-local layout position to grid-local point.
    #[must_use]
    pub fn ship_local_to_local(&self, ship_local: Vec2Fixed) -> Vec2Fixed {
        ship_local - self.origin
    }

    /// Quantize a grid-local point to the cell containing it.
    #[must_use]
    pub fn local_to_cell(&self, local: Vec2Fixed) -> GridPoint {
        let size = cell_size();
        GridPoint::new(
            (local.x / size).floor().to_num::<i32>(),
            (local.y / size).floor().to_num::<i32>(),
        )
    }

    /// World point to (possibly out-of-bounds) cell.
    #[must_use]
    pub fn world_to_cell(&self, transform: &ShipTransform, world: Vec2Fixed) -> GridPoint {
        self.local_to_cell(self.world_to_local(transform, world))
    }

    /// Clamp a cell into `[0, width-1] x [0, height-1]`.
    #[must_use]
    pub fn clip(&self, p: GridPoint) -> GridPoint {
        GridPoint::new(
            p.x.clamp(0, self.width as i32 - 1),
            p.y.clamp(0, self.height as i32 - 1),
        )
    }

    /// World point to the nearest in-bounds cell.
    #[must_use]
    pub fn world_to_cell_clipped(&self, transform: &ShipTransform, world: Vec2Fixed) -> GridPoint {
        self.clip(self.world_to_cell(transform, world))
    }

    /// Top-left corner of a cell, in grid-local units.
    #[must_use]
    pub fn cell_to_local(&self, p: GridPoint) -> Vec2Fixed {
        Vec2Fixed::new(
            Fixed::from_num(p.x) * cell_size(),
            Fixed::from_num(p.y) * cell_size(),
        )
    }

    /// Top-left corner of a cell, in world space.
    #[must_use]
    pub fn cell_to_world(&self, transform: &ShipTransform, p: GridPoint) -> Vec2Fixed {
        self.local_to_world(transform, self.cell_to_local(p))
    }
}
