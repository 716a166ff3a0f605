//! Expanding-ring cell search.
//!
//! Starts at one cell and grows a rectangle outward one layer at a time,
//! visiting the newly exposed column or row on each side that has not
//! yet reached its bound. Hits near the start are found first without a
//! sorted spatial structure.

use std::ops::ControlFlow;

use crate::transform::GridPoint;

/// Inclusive cell rectangle limiting a ring search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CellBounds {
    pub min: GridPoint,
    pub max: GridPoint,
}

impl CellBounds {
    pub const fn new(min: GridPoint, max: GridPoint) -> Self {
        Self { min, max }
    }

    fn clamp(&self, p: GridPoint) -> GridPoint {
        GridPoint::new(
            p.x.clamp(self.min.x, self.max.x),
            p.y.clamp(self.min.y, self.max.y),
        )
    }
}

/// Visit cells ring by ring from `start` until `visit` breaks or the
/// bounds are exhausted.
///
/// Each side is tested once per ring: left column, right column, top row,
/// bottom row. Rows span the columns already grown in the same ring, so
/// corner cells are visited exactly once.
pub(crate) fn expand_rings<B>(
    bounds: CellBounds,
    start: GridPoint,
    mut visit: impl FnMut(GridPoint) -> ControlFlow<B>,
) -> Option<B> {
    let start = bounds.clamp(start);
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (start.x, start.y, start.x, start.y);

    if let ControlFlow::Break(found) = visit(start) {
        return Some(found);
    }

    loop {
        let mut did_expand = false;

        if min_x > bounds.min.x {
            min_x -= 1;
            did_expand = true;
            for y in min_y..=max_y {
                if let ControlFlow::Break(found) = visit(GridPoint::new(min_x, y)) {
                    return Some(found);
                }
            }
        }
        if max_x < bounds.max.x {
            max_x += 1;
            did_expand = true;
            for y in min_y..=max_y {
                if let ControlFlow::Break(found) = visit(GridPoint::new(max_x, y)) {
                    return Some(found);
                }
            }
        }
        if min_y > bounds.min.y {
            min_y -= 1;
            did_expand = true;
            for x in min_x..=max_x {
                if let ControlFlow::Break(found) = visit(GridPoint::new(x, min_y)) {
                    return Some(found);
                }
            }
        }
        if max_y < bounds.max.y {
            max_y += 1;
            did_expand = true;
            for x in min_x..=max_x {
                if let ControlFlow::Break(found) = visit(GridPoint::new(x, max_y)) {
                    return Some(found);
                }
            }
        }

        if !did_expand {
            return None;
        }
    }
}
