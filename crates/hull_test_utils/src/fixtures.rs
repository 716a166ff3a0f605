//! Test fixtures and helpers.
//!
//! Pre-built module layouts for consistent testing. Layouts are described
//! in cell units and converted to ship-local positions with the grid
//! centered on the ship origin.

use fixed::types::I32F32;
use hull_core::hull::ShipHull;
use hull_core::math::Vec2Fixed;
use hull_core::module::{Footprint, ModuleKind, ShieldGenerator, ShipModule};
use hull_core::transform::{ShipTransform, CELL_SIZE};

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point vector from integers.
#[must_use]
pub fn vec2(x: i32, y: i32) -> Vec2Fixed {
    Vec2Fixed::new(fixed(x), fixed(y))
}

/// A module placed by cell coordinates on a `grid.0` x `grid.1` layout
/// centered on the ship origin.
#[must_use]
pub fn module_at_cell(
    kind: ModuleKind,
    cell: (i32, i32),
    footprint: (u32, u32),
    grid: (u32, u32),
    health: i32,
) -> ShipModule {
    let half_w = grid.0 as i32 * CELL_SIZE / 2;
    let half_h = grid.1 as i32 * CELL_SIZE / 2;
    ShipModule::new(
        kind,
        Footprint::new(footprint.0, footprint.1),
        vec2(cell.0 * CELL_SIZE - half_w, cell.1 * CELL_SIZE - half_h),
        fixed(health),
    )
}

/// Dense `width` x `height` block of 1x1 structure modules, row-major.
#[must_use]
pub fn block_layout(width: u32, height: u32, health: i32) -> Vec<ShipModule> {
    let mut modules = Vec::with_capacity((width * height) as usize);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            modules.push(module_at_cell(
                ModuleKind::Structure,
                (x, y),
                (1, 1),
                (width, height),
                health,
            ));
        }
    }
    modules
}

/// Hull built from [`block_layout`] at `position`.
///
/// # Panics
///
/// Panics if `width` or `height` is zero.
#[must_use]
pub fn block_hull(width: u32, height: u32, position: Vec2Fixed) -> ShipHull {
    ShipHull::new(block_layout(width, height, 100), ShipTransform::at(position))
        .expect("block layout is valid")
}

/// A single module of the given footprint, alone on its grid.
#[must_use]
pub fn single_module(width: u32, height: u32) -> Vec<ShipModule> {
    vec![module_at_cell(
        ModuleKind::Structure,
        (0, 0),
        (width, height),
        (width, height),
        100,
    )]
}

/// Module IDs of the two shield projectors in [`cruiser_layout`].
pub const CRUISER_SHIELDS: [u32; 2] = [7, 11];

/// Module ID of the command bridge in [`cruiser_layout`].
pub const CRUISER_COMMAND: u32 = 9;

/// An 8x4 cruiser with armor belts, two shields and multi-cell modules.
///
/// ```text
///   A A A A a a a a     A/a armor belts (4x1)
///   E W S C C H s R     S/s shields, C command (2x2)
///   E W P C C H T R     E engine, H hangar, R weapon (1x2)
///   B B B B b b b b     W weapons, P power plant, T structure
/// ```
#[must_use]
pub fn cruiser_layout() -> Vec<ShipModule> {
    let grid = (8, 4);
    let armor = ModuleKind::Armor { resistance: 40 };
    let big_shield = ModuleKind::Shield(ShieldGenerator::new(fixed(100), fixed(64)));
    let small_shield = ModuleKind::Shield(ShieldGenerator::new(fixed(60), fixed(48)));
    vec![
        module_at_cell(armor, (0, 0), (4, 1), grid, 200),
        module_at_cell(armor, (4, 0), (4, 1), grid, 200),
        module_at_cell(armor, (0, 3), (4, 1), grid, 200),
        module_at_cell(armor, (4, 3), (4, 1), grid, 200),
        module_at_cell(ModuleKind::Engine, (0, 1), (1, 2), grid, 80),
        module_at_cell(ModuleKind::Weapon, (1, 1), (1, 1), grid, 50),
        module_at_cell(ModuleKind::Weapon, (1, 2), (1, 1), grid, 50),
        module_at_cell(big_shield, (2, 1), (1, 1), grid, 40),
        module_at_cell(ModuleKind::PowerPlant, (2, 2), (1, 1), grid, 60),
        module_at_cell(ModuleKind::Command, (3, 1), (2, 2), grid, 150),
        module_at_cell(ModuleKind::Hangar, (5, 1), (1, 2), grid, 90),
        module_at_cell(small_shield, (6, 1), (1, 1), grid, 40),
        module_at_cell(ModuleKind::Structure, (6, 2), (1, 1), grid, 60),
        module_at_cell(ModuleKind::Weapon, (7, 1), (1, 2), grid, 70),
    ]
}

/// Hull built from [`cruiser_layout`].
///
/// # Panics
///
/// Panics if the fixture layout fails to build.
#[must_use]
pub fn cruiser_hull(transform: ShipTransform) -> ShipHull {
    ShipHull::new(cruiser_layout(), transform).expect("cruiser layout is valid")
}
