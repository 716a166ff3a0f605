//! Integer grid walk between two cells.

use std::ops::ControlFlow;

use crate::transform::GridPoint;

/// Walk every cell on the 4-connected line from `a` to `b`, inclusive.
///
/// Each step advances along whichever axis has the larger accumulated
/// error, so exactly `1 + |dx| + |dy|` cells are visited and no cell the
/// line passes through is skipped.
pub(crate) fn trace_cells<B>(
    a: GridPoint,
    b: GridPoint,
    mut visit: impl FnMut(GridPoint) -> ControlFlow<B>,
) -> Option<B> {
    let mut dx = (b.x - a.x).abs();
    let mut dy = (b.y - a.y).abs();
    let kx = if b.x > a.x { 1 } else { -1 };
    let ky = if b.y > a.y { 1 } else { -1 };
    let mut error = dx - dy;
    let steps = 1 + dx + dy;
    dx *= 2;
    dy *= 2;

    let (mut x, mut y) = (a.x, a.y);
    for step in 0..steps {
        if let ControlFlow::Break(found) = visit(GridPoint::new(x, y)) {
            return Some(found);
        }
        if step + 1 == steps {
            break;
        }
        if error > 0 {
            x += kx;
            error -= dy;
        } else {
            y += ky;
            error += dx;
        }
    }
    None
}
