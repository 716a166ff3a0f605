//! Radial damage with a shared budget.
//!
//! One damage event carries a single budget. Shields covering the impact
//! soak first; whatever is left spreads over hull modules in ring order
//! from the impact cell until it runs out.

use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::grid::{expand_rings, ModuleEvent};
use crate::hull::ShipHull;
use crate::math::{fixed_serde, Fixed, Vec2Fixed};
use crate::module::{Absorption, ModuleId};

/// Outcome of one radial damage event.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DamageReport {
    /// Budget absorbed by shield bubbles.
    #[serde(with = "fixed_serde")]
    pub shield_absorbed: Fixed,
    /// Budget absorbed by hull modules.
    #[serde(with = "fixed_serde")]
    pub module_absorbed: Fixed,
    /// Budget left over when the search ran out of modules.
    #[serde(with = "fixed_serde")]
    pub remaining: Fixed,
    /// Every module that took damage, in the order it was hit.
    pub hits: Vec<ModuleId>,
    /// Modules whose health reached zero during this event.
    pub destroyed: Vec<ModuleId>,
}

impl DamageReport {
    /// Total budget spent.
    #[must_use]
    pub fn total_absorbed(&self) -> Fixed {
        self.shield_absorbed + self.module_absorbed
    }

    /// True if the whole budget was used up.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining <= Fixed::ZERO
    }
}

impl ShipHull {
    /// Apply `amount` of radial damage centered on `world`.
    ///
    /// Unless `ignore_shields` is set, every active shield whose bubble
    /// covers the impact absorbs in turn; if shields use up the budget the
    /// hull is untouched. The rest goes to active modules overlapping the
    /// blast circle, nearest ring first. Each module's absorption decides
    /// how much budget it takes; the search continues until the budget is
    /// gone or every reachable cell has been visited.
    ///
    /// `source` identifies the attacker in logs only.
    pub fn damage_modules_in_range(
        &mut self,
        source: u64,
        amount: Fixed,
        world: Vec2Fixed,
        radius: Fixed,
        ignore_shields: bool,
    ) -> DamageReport {
        let mut report = DamageReport::default();
        let mut budget = amount.max(Fixed::ZERO);

        if !ignore_shields && self.absorb_with_shields(world, radius, &mut budget, &mut report) {
            report.remaining = budget;
            return report;
        }

        let local = self.world_to_grid_local(world);
        let (bounds, start) = self.radius_search_area(local, radius);

        let grid = &self.grid;
        let modules = &mut self.modules;
        let _: Option<()> = expand_rings(bounds, start, |p| {
            let Some(id) = grid.module_at(p) else {
                return ControlFlow::Continue(());
            };
            let module = &mut modules[id.index()];
            if !module.is_active()
                || !grid
                    .module_rect(id)
                    .is_some_and(|rect| rect.overlaps_circle(local, radius))
            {
                return ControlFlow::Continue(());
            }

            let Absorption { consumed, .. } = module.absorb_hull_damage(&mut budget);
            report.module_absorbed += consumed;
            report.hits.push(id);
            if !module.is_active() {
                report.destroyed.push(id);
            }

            if budget <= Fixed::ZERO {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        // The full grid never changes, so exposure can catch up after the walk.
        for &id in &report.destroyed {
            self.on_module_event(ModuleEvent::Deactivated(id));
        }

        report.remaining = budget;
        debug!(
            source,
            hits = report.hits.len(),
            destroyed = report.destroyed.len(),
            absorbed = %report.total_absorbed(),
            "Radial damage applied"
        );
        report
    }

    /// Let every covering shield soak the budget. Returns true once the
    /// budget is exhausted.
    fn absorb_with_shields(
        &mut self,
        world: Vec2Fixed,
        radius: Fixed,
        budget: &mut Fixed,
        report: &mut DamageReport,
    ) -> bool {
        for index in 0..self.grid.shields().len() {
            let id = self.grid.shields()[index];
            if !self.shield_covers(id, world, radius) {
                continue;
            }
            let absorbed = self.modules[id.index()].absorb_shield_damage(budget);
            report.shield_absorbed += absorbed.consumed;
            report.hits.push(id);
            trace!(shield = %id, absorbed = %absorbed.consumed, "Shield absorbed damage");

            if *budget <= Fixed::ZERO {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{Footprint, ModuleKind, ShieldGenerator, ShipModule};
    use crate::transform::ShipTransform;

    fn fixed(n: i32) -> Fixed {
        Fixed::from_num(n)
    }

    fn v(x: i32, y: i32) -> Vec2Fixed {
        Vec2Fixed::new(fixed(x), fixed(y))
    }

    fn block(kind_at: impl Fn(i32, i32) -> ModuleKind) -> ShipHull {
        let mut modules = Vec::new();
        for y in 0..3 {
            for x in 0..3 {
                modules.push(ShipModule::new(
                    kind_at(x, y),
                    Footprint::SINGLE,
                    v(x * 16, y * 16),
                    fixed(10),
                ));
            }
        }
        ShipHull::new(modules, ShipTransform::default()).expect("valid layout")
    }

    #[test]
    fn test_small_blast_stays_in_one_module() {
        let mut hull = block(|_, _| ModuleKind::Structure);
        let report = hull.damage_modules_in_range(1, fixed(4), v(24, 24), fixed(2), false);
        assert_eq!(report.hits, vec![ModuleId::new(4)]);
        assert_eq!(report.module_absorbed, fixed(4));
        assert!(report.is_exhausted());
        assert_eq!(hull.modules()[4].health(), fixed(6));
    }

    #[test]
    fn test_budget_spreads_until_exhausted() {
        let mut hull = block(|_, _| ModuleKind::Structure);
        let report = hull.damage_modules_in_range(1, fixed(25), v(24, 24), fixed(20), false);
        // Two modules die, the third takes the last 5.
        assert_eq!(report.hits.len(), 3);
        assert_eq!(report.destroyed.len(), 2);
        assert_eq!(report.hits[0], ModuleId::new(4));
        assert_eq!(report.total_absorbed(), fixed(25));
        assert_eq!(report.remaining, Fixed::ZERO);
    }

    #[test]
    fn test_leftover_budget_is_reported() {
        let mut hull = block(|_, _| ModuleKind::Structure);
        let report = hull.damage_modules_in_range(1, fixed(1000), v(24, 24), fixed(100), false);
        assert_eq!(report.destroyed.len(), 9);
        assert_eq!(report.module_absorbed, fixed(90));
        assert_eq!(report.remaining, fixed(910));
        assert_eq!(hull.num_external_slots(), 0);
    }

    #[test]
    fn test_destroyed_center_updates_exposure() {
        let mut hull = block(|_, _| ModuleKind::Structure);
        hull.damage_modules_in_range(1, fixed(10), v(0, 0), Fixed::ZERO, true);
        assert!(!hull.modules()[0].is_active());
        // Neighbors of the dead corner were already external; the center was not.
        assert!(!hull.modules()[4].is_external());
        hull.damage_modules_in_range(1, fixed(10), v(24, 8), Fixed::ZERO, true);
        assert!(hull.modules()[4].is_external());
    }

    #[test]
    fn test_shield_soaks_first_and_can_stop_the_blast() {
        let shield = ModuleKind::Shield(ShieldGenerator::new(fixed(50), fixed(40)));
        let mut hull = block(|x, y| if (x, y) == (1, 1) { shield } else { ModuleKind::Structure });

        let report = hull.damage_modules_in_range(1, fixed(30), v(4, 4), fixed(4), false);
        assert_eq!(report.shield_absorbed, fixed(30));
        assert_eq!(report.module_absorbed, Fixed::ZERO);
        assert_eq!(hull.modules()[4].shield_power(), fixed(20));
        assert_eq!(hull.modules()[0].health(), fixed(10));

        // Next hit overflows the remaining 20 power onto the hull.
        let report = hull.damage_modules_in_range(1, fixed(25), v(4, 4), fixed(4), false);
        assert_eq!(report.shield_absorbed, fixed(20));
        assert_eq!(report.module_absorbed, fixed(5));
        assert_eq!(hull.modules()[0].health(), fixed(5));
    }

    #[test]
    fn test_ignore_shields_goes_straight_to_hull() {
        let shield = ModuleKind::Shield(ShieldGenerator::new(fixed(50), fixed(40)));
        let mut hull = block(|x, y| if (x, y) == (1, 1) { shield } else { ModuleKind::Structure });
        let report = hull.damage_modules_in_range(1, fixed(3), v(4, 4), Fixed::ZERO, true);
        assert_eq!(report.shield_absorbed, Fixed::ZERO);
        assert_eq!(report.hits, vec![ModuleId::new(0)]);
        assert_eq!(hull.modules()[4].shield_power(), fixed(50));
    }

    #[test]
    fn test_armor_reduces_health_loss_not_budget() {
        let mut hull = block(|_, _| ModuleKind::Armor { resistance: 50 });
        let report = hull.damage_modules_in_range(1, fixed(8), v(24, 24), Fixed::ZERO, false);
        assert_eq!(report.module_absorbed, fixed(8));
        assert_eq!(hull.modules()[4].health(), fixed(6));
    }

    #[test]
    fn test_blast_outside_hull_hits_nothing() {
        let mut hull = block(|_, _| ModuleKind::Structure);
        let report = hull.damage_modules_in_range(1, fixed(10), v(500, 500), fixed(10), false);
        assert!(report.hits.is_empty());
        assert_eq!(report.remaining, fixed(10));
    }
}
