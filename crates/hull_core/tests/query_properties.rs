//! Hit tests and ray traces checked against linear scans.

use hull_core::prelude::*;
use hull_test_utils::determinism::strategies::{
    arb_dims, arb_offset, arb_packed_layout, arb_radius, arb_transform,
};
use hull_test_utils::fixtures::{
    block_hull, block_layout, cruiser_hull, fixed, vec2, CRUISER_SHIELDS,
};
use hull_test_utils::reference::{linear_hit_candidates, linear_shield_hit, occupant};
use proptest::prelude::*;

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_hull_is_send_and_sync() {
    assert_send_sync::<ShipHull>();
    assert_send_sync::<ModuleGrid>();
    assert_send_sync::<DamageReport>();
}

#[test]
fn test_cruiser_shield_covers_the_bridge() {
    let hull = cruiser_hull(ShipTransform::default());
    let bridge = hull.module_world_center(ModuleId::new(9)).expect("bridge");
    let hit = hull.hit_test_single(bridge, Fixed::ZERO, false);
    assert_eq!(hit, Some(ModuleId::new(CRUISER_SHIELDS[0])));
    assert_eq!(hull.hit_test_single(bridge, Fixed::ZERO, true), Some(ModuleId::new(9)));
}

#[test]
fn test_ray_through_cruiser_stops_at_armor() {
    let hull = cruiser_hull(ShipTransform::default());
    // Straight down through column 3: top armor belt first.
    let hit = hull.ray_hit_test_single(vec2(-8, -200), vec2(-8, 200), Fixed::ZERO, true);
    assert_eq!(hit, Some(ModuleId::new(0)));
}

#[test]
fn test_penetrating_ray_lists_column_in_order() {
    let hull = cruiser_hull(ShipTransform::default());
    let hits = hull.ray_hit_test_modules(vec2(-8, -200), vec2(0, 1), fixed(400), Fixed::ZERO);
    // Top belt, bridge, bottom belt.
    assert_eq!(hits, vec![ModuleId::new(0), ModuleId::new(9), ModuleId::new(2)]);
}

/// Local point strictly inside a cell: never on a cell edge.
fn arb_interior_local(width: u32, height: u32) -> impl Strategy<Value = Vec2Fixed> {
    (0..width as i32, 1..CELL_SIZE, 0..height as i32, 1..CELL_SIZE).prop_map(|(cx, ox, cy, oy)| {
        vec2(cx * CELL_SIZE + ox, cy * CELL_SIZE + oy)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_ring_search_matches_linear_scan_on_dense_grid(
        (w, h, local) in arb_dims().prop_flat_map(|(w, h)| (Just(w), Just(h), arb_interior_local(w, h))),
        transform in arb_transform(),
    ) {
        let hull = ShipHull::new(block_layout(w, h, 100), transform).expect("valid layout");
        let world = hull.grid_local_to_world(local);
        let candidates = linear_hit_candidates(&hull, world, Fixed::ZERO);
        prop_assert_eq!(candidates.len(), 1);
        prop_assert_eq!(hull.hit_test_single(world, Fixed::ZERO, true), Some(candidates[0]));
    }

    #[test]
    fn prop_radius_hit_is_a_linear_candidate(
        layout in arb_packed_layout(),
        transform in arb_transform(),
        offset in arb_offset(),
        radius in arb_radius(),
    ) {
        let hull = ShipHull::new(layout, transform).expect("valid layout");
        let world = transform.position + offset;
        let candidates = linear_hit_candidates(&hull, world, radius);
        match hull.hit_test_single(world, radius, true) {
            Some(id) => prop_assert!(candidates.contains(&id)),
            None => prop_assert!(candidates.is_empty(), "missed {:?}", candidates),
        }
    }

    #[test]
    fn prop_active_shield_wins(
        layout in arb_packed_layout(),
        offset in arb_offset(),
        radius in arb_radius(),
    ) {
        let hull = ShipHull::new(layout, ShipTransform::default()).expect("valid layout");
        let world = offset;
        if let Some(shield) = linear_shield_hit(&hull, world, radius) {
            prop_assert_eq!(hull.hit_test_single(world, radius, false), Some(shield));
        }
    }

    #[test]
    fn prop_vertical_ray_hits_first_occupied_cell(
        layout in arb_packed_layout(),
        transform in arb_transform(),
        column in 0u32..8,
        reverse in any::<bool>(),
    ) {
        let hull = ShipHull::new(layout, transform).expect("valid layout");
        let (w, h) = (hull.grid().width() as i32, hull.grid().height() as i32);
        let cx = column as i32 % w;
        let x = cx * CELL_SIZE + CELL_SIZE / 2;
        let (mut top, mut bottom) = (vec2(x, -40), vec2(x, h * CELL_SIZE + 40));
        let mut rows: Vec<i32> = (0..h).collect();
        if reverse {
            std::mem::swap(&mut top, &mut bottom);
            rows.reverse();
        }

        let expected = rows.into_iter().find_map(|y| occupant(&hull, GridPoint::new(cx, y)));
        let start = hull.grid_local_to_world(top);
        let end = hull.grid_local_to_world(bottom);
        prop_assert_eq!(hull.ray_hit_test_single(start, end, Fixed::ZERO, true), expected);
    }

    #[test]
    fn prop_ray_beside_the_grid_hits_nothing(
        (w, h) in arb_dims(),
        transform in arb_transform(),
        gap in 1i32..100,
    ) {
        let hull = ShipHull::new(block_layout(w, h, 100), transform).expect("valid layout");
        let x = w as i32 * CELL_SIZE + gap;
        let start = hull.grid_local_to_world(vec2(x, -50));
        let end = hull.grid_local_to_world(vec2(x, h as i32 * CELL_SIZE + 50));
        prop_assert_eq!(hull.ray_hit_test_single(start, end, fixed(4), false), None);
    }

    #[test]
    fn prop_penetrating_ray_is_sorted_and_live(
        layout in arb_packed_layout(),
        offset in arb_offset(),
        radius in arb_radius(),
    ) {
        let hull = ShipHull::new(layout, ShipTransform::default()).expect("valid layout");
        let start = offset - vec2(200, 0);
        let hits = hull.ray_hit_test_modules(start, vec2(1, 0), fixed(400), radius);
        let distances: Vec<Fixed> = hits
            .iter()
            .map(|&id| {
                let center = hull.module_world_center(id).expect("placed");
                center.distance_squared(start)
            })
            .collect();
        prop_assert!(distances.windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(hits.iter().all(|id| hull.modules()[id.index()].is_active()));
    }

    #[test]
    fn prop_closest_unshielded_is_external(
        (w, h) in arb_dims(),
        offset in arb_offset(),
    ) {
        let hull = block_hull(w, h, Vec2Fixed::ZERO);
        let found = hull.find_closest_unshielded_module(offset);
        let id = found.expect("a fresh block always has external modules");
        prop_assert!(hull.modules()[id.index()].is_external());
    }
}
