//! Grid construction from a ship's module list.

use tracing::debug;

use super::{ModuleGrid, Placement, EMPTY_CELL};
use crate::error::{HullError, Result};
use crate::math::{Fixed, Vec2Fixed};
use crate::module::{ModuleId, ShipModule};
use crate::transform::{cell_size, GridFrame};

/// Upper bound on `width * height` for one hull grid.
pub const MAX_GRID_CELLS: u64 = 1 << 20;

impl ModuleGrid {
    /// Build the grid for a module list.
    ///
    /// The grid spans the union bounding box of all footprints. Every
    /// footprint cell in the full grid receives its module's ID; the
    /// external grid starts empty until exposure is initialized.
    ///
    /// # Errors
    ///
    /// Fails on an empty list, a zero-sized or unrepresentably large
    /// footprint, a bounding box above [`MAX_GRID_CELLS`], or more modules
    /// than a cell can index. With the `debug-validation` feature, also
    /// fails if two modules claim the same cell.
    pub fn build(modules: &[ShipModule]) -> Result<Self> {
        if modules.is_empty() {
            return Err(HullError::EmptyLayout);
        }
        if modules.len() >= EMPTY_CELL as usize {
            return Err(HullError::TooManyModules(modules.len()));
        }

        let frame = compute_frame(modules)?;

        let mut cells = vec![EMPTY_CELL; frame.cell_count()];
        let mut placements = Vec::with_capacity(modules.len());
        let mut shields = Vec::new();

        for (index, module) in modules.iter().enumerate() {
            let placement = Placement {
                origin: frame.local_to_cell(frame.ship_local_to_local(module.local_position())),
                footprint: module.footprint(),
            };

            #[cfg(feature = "debug-validation")]
            check_overlap(&cells, &frame, &placement, index)?;

            Self::fill(&mut cells, &frame, &placement, index as u32);
            placements.push(placement);

            if module.shield_power_max() > Fixed::ZERO {
                shields.push(ModuleId::new(index as u32));
            }
        }

        debug!(
            width = frame.width,
            height = frame.height,
            modules = modules.len(),
            shields = shields.len(),
            "Built module grid"
        );

        Ok(Self {
            frame,
            external: vec![EMPTY_CELL; cells.len()],
            cells,
            placements,
            shields,
            num_external: 0,
        })
    }
}

/// Bounding box of every footprint, quantized to whole cells.
fn compute_frame(modules: &[ShipModule]) -> Result<GridFrame> {
    let size = cell_size();
    let mut min = Vec2Fixed::splat(Fixed::MAX);
    let mut max = Vec2Fixed::splat(Fixed::MIN);

    for (index, module) in modules.iter().enumerate() {
        let footprint = module.footprint();
        let invalid = HullError::InvalidFootprint {
            index,
            width: footprint.width,
            height: footprint.height,
        };
        if !footprint.is_valid() {
            return Err(invalid);
        }
        let top_left = module.local_position();
        let extent = |cells: u32, start: Fixed| {
            Fixed::checked_from_num(cells)
                .and_then(|n| n.checked_mul(size))
                .and_then(|len| start.checked_add(len))
        };
        let (Some(right), Some(bottom)) = (
            extent(footprint.width, top_left.x),
            extent(footprint.height, top_left.y),
        ) else {
            return Err(invalid);
        };
        min.x = min.x.min(top_left.x);
        min.y = min.y.min(top_left.y);
        max.x = max.x.max(right);
        max.y = max.y.max(bottom);
    }

    let cells = |lo: Fixed, hi: Fixed| {
        hi.checked_sub(lo)
            .map(|span| (span / size).ceil().to_num::<u32>())
    };
    match (cells(min.x, max.x), cells(min.y, max.y)) {
        (Some(width), Some(height))
            if u64::from(width) * u64::from(height) <= MAX_GRID_CELLS =>
        {
            Ok(GridFrame::new(min, width, height))
        }
        (width, height) => Err(HullError::GridTooLarge {
            width: width.unwrap_or(u32::MAX),
            height: height.unwrap_or(u32::MAX),
        }),
    }
}

#[cfg(feature = "debug-validation")]
fn check_overlap(
    cells: &[u32],
    frame: &GridFrame,
    placement: &Placement,
    index: usize,
) -> Result<()> {
    for cell in placement.cells() {
        let existing = cells[frame.index(cell)];
        if existing != EMPTY_CELL {
            return Err(HullError::OverlappingModules {
                first: existing,
                second: index as u32,
                cell: (cell.x as u32, cell.y as u32),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{Footprint, ModuleKind, ShieldGenerator};
    use crate::transform::GridPoint;

    fn v(x: i32, y: i32) -> Vec2Fixed {
        Vec2Fixed::new(Fixed::from_num(x), Fixed::from_num(y))
    }

    fn structure(x: i32, y: i32, w: u32, h: u32) -> ShipModule {
        ShipModule::new(
            ModuleKind::Structure,
            Footprint::new(w, h),
            v(x, y),
            Fixed::from_num(100),
        )
    }

    #[test]
    fn test_empty_layout_rejected() {
        assert_eq!(ModuleGrid::build(&[]), Err(HullError::EmptyLayout));
    }

    #[test]
    fn test_zero_footprint_rejected() {
        let modules = [structure(0, 0, 1, 1), structure(16, 0, 0, 2)];
        assert_eq!(
            ModuleGrid::build(&modules),
            Err(HullError::InvalidFootprint {
                index: 1,
                width: 0,
                height: 2
            })
        );
    }

    #[test]
    fn test_bounds_and_origin() {
        let modules = [structure(-32, -16, 2, 1), structure(0, 0, 1, 2)];
        let grid = ModuleGrid::build(&modules).expect("valid layout");
        assert_eq!(grid.origin(), v(-32, -16));
        assert_eq!((grid.width(), grid.height()), (3, 3));
        assert_eq!(grid.module_at(GridPoint::new(0, 0)), Some(ModuleId::new(0)));
        assert_eq!(grid.module_at(GridPoint::new(1, 0)), Some(ModuleId::new(0)));
        assert_eq!(grid.module_at(GridPoint::new(2, 1)), Some(ModuleId::new(1)));
        assert_eq!(grid.module_at(GridPoint::new(2, 2)), Some(ModuleId::new(1)));
        assert_eq!(grid.module_at(GridPoint::new(0, 2)), None);
        assert_eq!(grid.module_at(GridPoint::new(3, 0)), None);
    }

    #[test]
    fn test_partial_cell_extent_rounds_up() {
        // Offset by half a cell: the footprint spills into a third column.
        let modules = [structure(0, 0, 1, 1), structure(24, 0, 1, 1)];
        let grid = ModuleGrid::build(&modules).expect("valid layout");
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.module_at(GridPoint::new(1, 0)), Some(ModuleId::new(1)));
    }

    #[test]
    fn test_shield_list_collects_shield_modules() {
        let shield = ShipModule::new(
            ModuleKind::Shield(ShieldGenerator::new(Fixed::from_num(50), Fixed::from_num(40))),
            Footprint::SINGLE,
            v(16, 0),
            Fixed::from_num(20),
        );
        let modules = [structure(0, 0, 1, 1), shield, structure(32, 0, 1, 1)];
        let grid = ModuleGrid::build(&modules).expect("valid layout");
        assert_eq!(grid.shields(), &[ModuleId::new(1)]);
        assert_eq!(grid.num_external_slots(), 0);
    }

    #[test]
    fn test_huge_footprint_rejected() {
        let modules = [structure(0, 0, 200_000_000, 1)];
        assert_eq!(
            ModuleGrid::build(&modules),
            Err(HullError::InvalidFootprint {
                index: 0,
                width: 200_000_000,
                height: 1
            })
        );
    }

    #[test]
    fn test_far_apart_modules_exceed_cell_cap() {
        let modules = [structure(-10_000_000, 0, 1, 1), structure(10_000_000, 0, 1, 1)];
        assert!(matches!(
            ModuleGrid::build(&modules),
            Err(HullError::GridTooLarge { width: 1_250_001, height: 1 })
        ));
    }

    #[test]
    fn test_grid_at_cell_cap_builds() {
        // 1024 x 1024 cells from two corner modules.
        let modules = [structure(0, 0, 1, 1), structure(16 * 1023, 16 * 1023, 1, 1)];
        let grid = ModuleGrid::build(&modules).expect("valid layout");
        assert_eq!((grid.width(), grid.height()), (1024, 1024));
    }

    #[cfg(feature = "debug-validation")]
    #[test]
    fn test_overlap_detected() {
        let modules = [structure(0, 0, 2, 2), structure(16, 16, 1, 1)];
        assert_eq!(
            ModuleGrid::build(&modules),
            Err(HullError::OverlappingModules {
                first: 0,
                second: 1,
                cell: (1, 1)
            })
        );
    }
}
