//! Error types for hull construction and module bookkeeping.
//!
//! Queries never return errors: off-grid coordinates are clipped and an
//! exhausted hull simply yields no result. Errors are reserved for
//! building a hull from bad input and for addressing modules that do
//! not exist.

use thiserror::Error;

/// Result type alias using [`HullError`].
pub type Result<T> = std::result::Result<T, HullError>;

/// Top-level error type for the hull grid.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HullError {
    /// A hull must contain at least one module.
    #[error("Cannot build a hull grid from an empty module list")]
    EmptyLayout,

    /// A module footprint has a zero dimension.
    #[error("Module {index} has an invalid footprint {width}x{height}")]
    InvalidFootprint {
        /// Index of the offending module in the layout.
        index: usize,
        /// Footprint width in cells.
        width: u32,
        /// Footprint height in cells.
        height: u32,
    },

    /// The layout's bounding box spans too many cells.
    #[error("Hull grid {width}x{height} exceeds the cell limit")]
    GridTooLarge {
        /// Width in cells (`u32::MAX` if not representable).
        width: u32,
        /// Height in cells (`u32::MAX` if not representable).
        height: u32,
    },

    /// A layout value does not fit the fixed-point range.
    #[error("Module {index}: {field} value {value} is out of range")]
    ValueOutOfRange {
        /// Index of the offending module in the layout.
        index: usize,
        /// Field name as written in the layout.
        field: &'static str,
        /// Value as written.
        value: u32,
    },

    /// More modules than the grid's cell index type can address.
    #[error("Too many modules for one hull: {0}")]
    TooManyModules(usize),

    /// Module identifier does not belong to this hull.
    #[error("Invalid module ID: {0}")]
    InvalidModuleId(u32),

    /// Two modules claim the same grid cell.
    #[error("Modules {first} and {second} overlap at cell ({}, {})", cell.0, cell.1)]
    OverlappingModules {
        /// Module that claimed the cell first.
        first: u32,
        /// Module that tried to claim it again.
        second: u32,
        /// Grid cell in dispute.
        cell: (u32, u32),
    },

    /// Layout template parsing error.
    #[error("Failed to parse layout '{path}': {message}")]
    LayoutParse {
        /// Path (or label) of the layout source.
        path: String,
        /// Error message.
        message: String,
    },

    /// Snapshot encoding or decoding failed.
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}
