//! ASCII rendering of a hull's grid.

use std::fmt::Write;

use hull_core::hull::ShipHull;
use hull_core::module::ModuleId;
use hull_core::transform::GridPoint;

/// Empty cell.
pub const EMPTY: char = '.';
/// Cell of a destroyed module.
pub const DEAD: char = 'x';
/// Cell of a module with a live shield generator.
pub const SHIELD: char = 'S';
/// Cell of an exposed module.
pub const EXTERNAL: char = 'E';
/// Cell of a covered module.
pub const INTERNAL: char = '#';

/// Key for [`render_ascii`] output.
pub const LEGEND: &str = "# internal  E external  S shield  x destroyed  . empty";

fn symbol(hull: &ShipHull, cell: GridPoint) -> char {
    let Some(id) = hull.grid().module_at(cell) else {
        return EMPTY;
    };
    let Some(module) = hull.module(id) else {
        return EMPTY;
    };
    if !module.is_active() {
        DEAD
    } else if module.has_active_shield() {
        SHIELD
    } else if module.is_external() {
        EXTERNAL
    } else {
        INTERNAL
    }
}

/// Draw the grid one character per cell, row 0 first, followed by a
/// summary line.
#[must_use]
pub fn render_ascii(hull: &ShipHull) -> String {
    let grid = hull.grid();
    let mut out = String::with_capacity(grid.frame().cell_count() + grid.height() as usize + 64);

    for y in 0..grid.height() as i32 {
        for x in 0..grid.width() as i32 {
            out.push(symbol(hull, GridPoint::new(x, y)));
        }
        out.push('\n');
    }

    let active = hull.modules().iter().filter(|m| m.is_active()).count();
    let _ = writeln!(
        out,
        "{}x{} cells, {active}/{} modules active, {} external slots",
        grid.width(),
        grid.height(),
        hull.modules().len(),
        hull.num_external_slots(),
    );
    out
}

/// One line per module: id, kind, health and exposure.
#[must_use]
pub fn module_table(hull: &ShipHull) -> String {
    let mut out = String::new();
    for id in hull.module_ids() {
        let Some(module) = hull.module(id) else { continue };
        let _ = writeln!(
            out,
            "{:>3} {:<24} {:>8.1}/{:<8.1} {:<8} {:?}",
            id.raw(),
            format!("{:?}", module.kind()),
            module.health().to_num::<f64>(),
            module.max_health().to_num::<f64>(),
            if module.is_external() { "external" } else { "internal" },
            module.quadrant(),
        );
    }
    out
}

/// Parse raw module ids, skipping any the hull does not have.
#[must_use]
pub fn known_ids(hull: &ShipHull, raw: &[u32]) -> Vec<ModuleId> {
    raw.iter()
        .map(|&r| ModuleId::new(r))
        .filter(|&id| hull.module(id).is_some())
        .collect()
}
