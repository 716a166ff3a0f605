//! Grid construction and exposure tracking checked against brute-force
//! classification.

use hull_core::prelude::*;
use hull_test_utils::determinism::strategies::{
    arb_block_layout, arb_packed_layout, arb_toggle_list, arb_transform,
};
use hull_test_utils::fixtures::{block_hull, single_module, vec2};
use hull_test_utils::reference::{
    expected_external_count, exposure_mismatches, external_grid_mismatches, occupant,
};
use proptest::prelude::*;

/// World point at the middle of a cell.
fn cell_center_world(hull: &ShipHull, p: GridPoint) -> Vec2Fixed {
    let corner = hull.grid().frame().cell_to_local(p);
    hull.grid_local_to_world(corner + vec2(CELL_SIZE / 2, CELL_SIZE / 2))
}

/// Modules occupying the cells just outside `id`'s footprint.
fn border_modules(hull: &ShipHull, id: ModuleId) -> Vec<ModuleId> {
    let pl = *hull.grid().placement(id).expect("placed");
    let mut cells = Vec::new();
    for x in pl.origin.x..pl.end_x() {
        cells.push(GridPoint::new(x, pl.origin.y - 1));
        cells.push(GridPoint::new(x, pl.end_y()));
    }
    for y in pl.origin.y..pl.end_y() {
        cells.push(GridPoint::new(pl.origin.x - 1, y));
        cells.push(GridPoint::new(pl.end_x(), y));
    }
    cells.into_iter().filter_map(|p| occupant(hull, p)).collect()
}

fn assert_consistent(hull: &ShipHull) {
    assert!(exposure_mismatches(hull).is_empty(), "{:?}", exposure_mismatches(hull));
    assert!(external_grid_mismatches(hull).is_empty(), "{:?}", external_grid_mismatches(hull));
    assert_eq!(hull.num_external_slots(), expected_external_count(hull));
}

#[test]
fn test_lone_2x2_module_is_external_on_every_cell() {
    let hull = ShipHull::new(single_module(2, 2), ShipTransform::default()).expect("valid layout");
    assert_eq!((hull.grid().width(), hull.grid().height()), (2, 2));
    for y in 0..2 {
        for x in 0..2 {
            assert_eq!(hull.grid().external_at(GridPoint::new(x, y)), Some(ModuleId::new(0)));
        }
    }
}

#[test]
fn test_surrounded_module_is_internal_until_neighbor_dies() {
    let mut hull = block_hull(3, 3, Vec2Fixed::ZERO);
    let center = ModuleId::new(4);
    assert!(!hull.modules()[center.index()].is_external());

    let before: Vec<bool> = hull.modules().iter().map(ShipModule::is_external).collect();
    hull.destroy_module(ModuleId::new(7)).expect("valid module");
    let after: Vec<bool> = hull.modules().iter().map(ShipModule::is_external).collect();

    assert!(hull.modules()[center.index()].is_external());
    let changed: Vec<usize> = (0..9).filter(|&i| before[i] != after[i]).collect();
    // The bottom-middle module leaves the external set; the center joins it.
    assert_eq!(changed, vec![4, 7]);
    assert_consistent(&hull);
}

#[test]
fn test_quadrants_follow_facing() {
    let hull = block_hull(7, 7, Vec2Fixed::ZERO);
    let at = |x: u32, y: u32| hull.modules()[(y * 7 + x) as usize].quadrant();
    assert_eq!(at(0, 3), Quadrant::Left);
    assert_eq!(at(6, 3), Quadrant::Right);
    assert_eq!(at(3, 0), Quadrant::Top);
    assert_eq!(at(3, 6), Quadrant::Bottom);
    // Internal modules keep the default.
    assert_eq!(at(3, 3), Quadrant::Center);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_every_footprint_cell_resolves_to_its_module(
        layout in arb_packed_layout(),
        transform in arb_transform(),
    ) {
        let hull = ShipHull::new(layout, transform).expect("valid layout");
        for id in hull.module_ids() {
            let pl = *hull.grid().placement(id).expect("placed");
            for cell in pl.cells() {
                prop_assert_eq!(hull.try_get_module(cell_center_world(&hull, cell)), Some(id));
            }
        }
    }

    #[test]
    fn prop_initial_exposure_matches_rule(layout in arb_packed_layout()) {
        let hull = ShipHull::new(layout, ShipTransform::default()).expect("valid layout");
        assert_consistent(&hull);
    }

    #[test]
    fn prop_exposure_stays_correct_under_toggles(
        layout in arb_packed_layout(),
        toggles in arb_toggle_list(24),
    ) {
        let mut hull = ShipHull::new(layout, ShipTransform::default()).expect("valid layout");
        let count = hull.modules().len();
        for raw in toggles {
            let id = ModuleId::new((raw % count) as u32);
            if hull.modules()[id.index()].is_active() {
                hull.destroy_module(id).expect("valid module");
            } else {
                hull.repair_module(id, Fixed::from_num(25)).expect("valid module");
            }
            assert_consistent(&hull);
        }
    }

    #[test]
    fn prop_deactivation_only_touches_neighbors(
        layout in arb_block_layout(),
        victim in 0usize..64,
    ) {
        let mut hull = ShipHull::new(layout, ShipTransform::default()).expect("valid layout");
        let id = ModuleId::new((victim % hull.modules().len()) as u32);
        let neighbors = border_modules(&hull, id);

        let before: Vec<bool> = hull.modules().iter().map(ShipModule::is_external).collect();
        let event = hull.destroy_module(id).expect("valid module");
        prop_assert_eq!(event, Some(ModuleEvent::Deactivated(id)));

        for other in hull.module_ids() {
            let flipped = before[other.index()] != hull.modules()[other.index()].is_external();
            if flipped {
                prop_assert!(other == id || neighbors.contains(&other));
            }
        }
        assert_consistent(&hull);
    }

    #[test]
    fn prop_kill_then_revive_restores_exposure(
        layout in arb_packed_layout(),
        victim in 0usize..64,
    ) {
        let mut hull = ShipHull::new(layout, ShipTransform::default()).expect("valid layout");
        let fresh = hull.clone();
        let id = ModuleId::new((victim % hull.modules().len()) as u32);
        let max = hull.modules()[id.index()].max_health();

        hull.destroy_module(id).expect("valid module");
        hull.repair_module(id, max).expect("valid module");
        prop_assert_eq!(hull, fresh);
    }
}
