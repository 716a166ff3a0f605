//! Target selection for guided munitions.
//!
//! Picks a random live module near an aim point. Higher crew skill sorts
//! candidates by targeting value and narrows the pool toward the most
//! valuable ones.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::hull::ShipHull;
use crate::math::{fixed_serde, Fixed, Vec2Fixed};
use crate::module::ModuleId;

/// Tunables for the guided-munition entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetingConfig {
    /// Added to a weapon's range to get its search radius.
    #[serde(with = "fixed_serde")]
    pub weapon_range_margin: Fixed,
    /// Extra reach of a projectile beyond its distance to the ship center.
    #[serde(with = "fixed_serde")]
    pub projectile_visibility_margin: Fixed,
}

impl Default for TargetingConfig {
    fn default() -> Self {
        Self {
            weapon_range_margin: Fixed::from_num(100),
            projectile_visibility_margin: Fixed::from_num(48),
        }
    }
}

impl TargetingConfig {
    /// Builder method to set the weapon range margin.
    #[must_use]
    pub const fn with_weapon_range_margin(mut self, margin: Fixed) -> Self {
        self.weapon_range_margin = margin;
        self
    }

    /// Builder method to set the projectile visibility margin.
    #[must_use]
    pub const fn with_projectile_visibility_margin(mut self, margin: Fixed) -> Self {
        self.projectile_visibility_margin = margin;
        self
    }
}

impl ShipHull {
    /// Pick a random active module whose center lies within `radius` of
    /// `center`.
    ///
    /// With `skill > 1` candidates are ranked by targeting value, highest
    /// first. The pick is uniform over the first `count / (skill + 1)`
    /// candidates (at least one), so skill 0 draws from the whole set and
    /// skill 1 from the first half in module order.
    pub fn random_internal_module<R: Rng + ?Sized>(
        &self,
        center: Vec2Fixed,
        skill: u32,
        radius: Fixed,
        rng: &mut R,
    ) -> Option<ModuleId> {
        self.pick_in_range(center, skill, radius.saturating_mul(radius), rng)
    }

    /// Retarget a guided weapon: the search radius is the weapon range
    /// plus [`TargetingConfig::weapon_range_margin`].
    pub fn random_module_for_weapon<R: Rng + ?Sized>(
        &self,
        config: &TargetingConfig,
        owner_center: Vec2Fixed,
        skill: u32,
        weapon_range: Fixed,
        rng: &mut R,
    ) -> Option<ModuleId> {
        let radius = weapon_range.saturating_add(config.weapon_range_margin);
        self.random_internal_module(owner_center, skill, radius, rng)
    }

    /// Initial guidance for a projectile: only modules no farther than the
    /// ship center plus [`TargetingConfig::projectile_visibility_margin`]
    /// are candidates.
    pub fn random_module_for_projectile<R: Rng + ?Sized>(
        &self,
        config: &TargetingConfig,
        projectile: Vec2Fixed,
        skill: u32,
        rng: &mut R,
    ) -> Option<ModuleId> {
        let margin = config.projectile_visibility_margin;
        let radius_sq = projectile
            .distance_squared(self.transform.position)
            .saturating_add(margin.saturating_mul(margin));
        self.pick_in_range(projectile, skill, radius_sq, rng)
    }

    fn pick_in_range<R: Rng + ?Sized>(
        &self,
        center: Vec2Fixed,
        skill: u32,
        radius_sq: Fixed,
        rng: &mut R,
    ) -> Option<ModuleId> {
        let mut candidates: Vec<ModuleId> = self
            .module_ids()
            .filter(|&id| self.modules[id.index()].is_active())
            .filter(|&id| {
                self.module_world_center(id)
                    .is_some_and(|c| c.distance_squared(center) < radius_sq)
            })
            .collect();
        if candidates.is_empty() {
            return None;
        }

        if skill > 1 {
            // Stable: equal values keep module order.
            candidates.sort_by_key(|id| std::cmp::Reverse(self.modules[id.index()].targeting_value()));
        }

        let divisor = (skill as usize).saturating_add(1);
        let limit = (candidates.len() / divisor).max(1);
        let pick = candidates[rng.gen_range(0..limit)];
        trace!(candidates = candidates.len(), limit, module = %pick, "Picked target module");
        Some(pick)
    }
}
