//! # Hull Core
//!
//! Per-ship modular hull grid for a deterministic combat simulation.
//!
//! A ship is a set of rectangular modules laid out on a cell grid. This
//! crate maps that layout onto two dense lookup grids, keeps track of
//! which modules face open space as the hull is shot apart, and answers
//! the point, radial and ray queries that projectiles, beams and
//! explosions need.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No system randomness (targeting takes a caller-supplied RNG)
//! - No floating-point math (uses fixed-point)
//!
//! ## Crate Structure
//!
//! - [`transform`] - World, grid-local and cell coordinates
//! - [`grid`] - Grid construction and exposure tracking
//! - [`hull`] - [`ShipHull`](hull::ShipHull), the per-ship owner of modules and grid
//! - [`query`] - Hit tests and ray traces
//! - [`damage`] - Radial damage with a shared budget
//! - [`targeting`] - Guided-munition target selection
//! - [`data`] - RON layout templates
//! - [`math`] - Fixed-point math utilities
//!
//! ## Concurrency
//!
//! A hull is plain owned data (`Send + Sync`). Different ships can be
//! processed on different threads; one ship's queries and mutations
//! must not overlap, which the borrow checker enforces through
//! `&self`/`&mut self`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod damage;
pub mod data;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod hull;
pub mod math;
pub mod module;
pub mod query;
pub mod targeting;
pub mod transform;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::damage::DamageReport;
    pub use crate::data::{ModuleSlotData, ShipLayoutData, SlotKind};
    pub use crate::error::{HullError, Result};
    pub use crate::grid::{ModuleEvent, ModuleGrid};
    pub use crate::hull::ShipHull;
    pub use crate::math::{Fixed, Rotation, Vec2Fixed};
    pub use crate::module::{
        Footprint, ModuleId, ModuleKind, Quadrant, ShieldGenerator, ShipModule,
    };
    pub use crate::targeting::TargetingConfig;
    pub use crate::transform::{GridPoint, ShipTransform, CELL_SIZE};
}
