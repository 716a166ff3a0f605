//! A ship's hull: its module list, grid, and world placement.
//!
//! `ShipHull` owns the modules; the grid only indexes them. All health
//! changes go through the hull so that exposure tracking sees every
//! activation and deactivation.
//!
//! # Example
//!
//! ```
//! use hull_core::prelude::*;
//!
//! let modules = vec![
//!     ShipModule::new(ModuleKind::Structure, Footprint::SINGLE, Vec2Fixed::ZERO, Fixed::from_num(50)),
//!     ShipModule::new(
//!         ModuleKind::Weapon,
//!         Footprint::SINGLE,
//!         Vec2Fixed::new(Fixed::from_num(16), Fixed::ZERO),
//!         Fixed::from_num(30),
//!     ),
//! ];
//! let hull = ShipHull::new(modules, ShipTransform::default()).unwrap();
//!
//! let hit = hull.try_get_module(Vec2Fixed::new(Fixed::from_num(20), Fixed::from_num(4)));
//! assert_eq!(hit, Some(ModuleId::new(1)));
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HullError, Result};
use crate::geometry::LocalRect;
use crate::grid::{ModuleEvent, ModuleGrid};
use crate::math::{Fixed, Vec2Fixed};
use crate::module::{ModuleId, ShipModule};
use crate::transform::{GridPoint, ShipTransform};

/// One ship's modules plus the spatial grid over them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipHull {
    pub(crate) modules: Vec<ShipModule>,
    pub(crate) grid: ModuleGrid,
    pub(crate) transform: ShipTransform,
}

impl ShipHull {
    /// Build the grid for `modules` and classify initial exposure.
    ///
    /// # Errors
    ///
    /// See [`ModuleGrid::build`].
    pub fn new(mut modules: Vec<ShipModule>, transform: ShipTransform) -> Result<Self> {
        let mut grid = ModuleGrid::build(&modules)?;
        grid.init_exposure(&mut modules);
        Ok(Self {
            modules,
            grid,
            transform,
        })
    }

    /// All modules, indexed by [`ModuleId`].
    #[must_use]
    pub fn modules(&self) -> &[ShipModule] {
        &self.modules
    }

    /// Look up a module.
    #[must_use]
    pub fn module(&self, id: ModuleId) -> Option<&ShipModule> {
        self.modules.get(id.index())
    }

    /// IDs of every module, in order.
    pub fn module_ids(&self) -> impl Iterator<Item = ModuleId> {
        (0..self.modules.len() as u32).map(ModuleId::new)
    }

    /// The spatial grid.
    #[must_use]
    pub const fn grid(&self) -> &ModuleGrid {
        &self.grid
    }

    /// Current world placement.
    #[must_use]
    pub const fn transform(&self) -> &ShipTransform {
        &self.transform
    }

    /// Move or rotate the ship.
    pub fn set_transform(&mut self, transform: ShipTransform) {
        self.transform = transform;
    }

    /// Number of modules currently classified external.
    ///
    /// Zero means the hull has nothing left to hit.
    #[must_use]
    pub const fn num_external_slots(&self) -> u32 {
        self.grid.num_external_slots()
    }

    // ------------------------------------------------------------------
    // Coordinate transforms
    // ------------------------------------------------------------------

    /// World point to grid-local point.
    #[must_use]
    pub fn world_to_grid_local(&self, world: Vec2Fixed) -> Vec2Fixed {
        self.grid.frame().world_to_local(&self.transform, world)
    }

    /// Grid-local point to world point.
    #[must_use]
    pub fn grid_local_to_world(&self, local: Vec2Fixed) -> Vec2Fixed {
        self.grid.frame().local_to_world(&self.transform, local)
    }

    /// World point to grid cell (may be out of bounds).
    #[must_use]
    pub fn world_to_grid_cell(&self, world: Vec2Fixed) -> GridPoint {
        self.grid.frame().world_to_cell(&self.transform, world)
    }

    /// World point to the nearest in-bounds grid cell.
    #[must_use]
    pub fn world_to_grid_cell_clipped(&self, world: Vec2Fixed) -> GridPoint {
        self.grid
            .frame()
            .world_to_cell_clipped(&self.transform, world)
    }

    /// Top-left corner of a grid cell in world space.
    #[must_use]
    pub fn grid_cell_to_world(&self, cell: GridPoint) -> Vec2Fixed {
        self.grid.frame().cell_to_world(&self.transform, cell)
    }

    /// Footprint rectangle of a module in grid-local units.
    #[must_use]
    pub fn module_local_rect(&self, id: ModuleId) -> Option<LocalRect> {
        self.grid.module_rect(id)
    }

    /// Footprint center of a module in world space.
    #[must_use]
    pub fn module_world_center(&self, id: ModuleId) -> Option<Vec2Fixed> {
        self.grid
            .module_rect(id)
            .map(|rect| self.grid_local_to_world(rect.center()))
    }

    /// Module whose footprint covers a world point, dead or alive.
    #[must_use]
    pub fn try_get_module(&self, world: Vec2Fixed) -> Option<ModuleId> {
        self.grid.module_at(self.world_to_grid_cell(world))
    }

    // ------------------------------------------------------------------
    // Health changes
    // ------------------------------------------------------------------

    /// Set a module's health, clamped to `[0, max]`.
    ///
    /// Returns the activation change this caused, if any; exposure is
    /// already updated when this returns.
    ///
    /// # Errors
    ///
    /// Returns [`HullError::InvalidModuleId`] for an unknown module.
    pub fn set_module_health(&mut self, id: ModuleId, health: Fixed) -> Result<Option<ModuleEvent>> {
        let module = self
            .modules
            .get_mut(id.index())
            .ok_or(HullError::InvalidModuleId(id.raw()))?;
        let was_active = module.set_health(health);
        let event = match (was_active, module.is_active()) {
            (true, false) => Some(ModuleEvent::Deactivated(id)),
            (false, true) => Some(ModuleEvent::Activated(id)),
            _ => None,
        };
        if let Some(event) = event {
            self.on_module_event(event);
        }
        Ok(event)
    }

    /// Subtract `amount` from a module's health directly, bypassing
    /// shields and armor.
    ///
    /// # Errors
    ///
    /// Returns [`HullError::InvalidModuleId`] for an unknown module.
    pub fn damage_module(&mut self, id: ModuleId, amount: Fixed) -> Result<Option<ModuleEvent>> {
        let health = self.module_health(id)?;
        self.set_module_health(id, health - amount)
    }

    /// Add `amount` to a module's health, resurrecting it if it was dead.
    ///
    /// # Errors
    ///
    /// Returns [`HullError::InvalidModuleId`] for an unknown module.
    pub fn repair_module(&mut self, id: ModuleId, amount: Fixed) -> Result<Option<ModuleEvent>> {
        let health = self.module_health(id)?;
        self.set_module_health(id, health + amount)
    }

    /// Drop a module to zero health.
    ///
    /// # Errors
    ///
    /// Returns [`HullError::InvalidModuleId`] for an unknown module.
    pub fn destroy_module(&mut self, id: ModuleId) -> Result<Option<ModuleEvent>> {
        self.set_module_health(id, Fixed::ZERO)
    }

    /// Restore shield power on every shield module. Returns the total restored.
    pub fn recharge_shields(&mut self, amount: Fixed) -> Fixed {
        let mut restored = Fixed::ZERO;
        for &id in self.grid.shields() {
            if let Some(shield) = self.modules[id.index()].shield_mut() {
                restored += shield.recharge(amount);
            }
        }
        restored
    }

    fn module_health(&self, id: ModuleId) -> Result<Fixed> {
        self.module(id)
            .map(ShipModule::health)
            .ok_or(HullError::InvalidModuleId(id.raw()))
    }

    /// Feed an activation change to the exposure tracker.
    pub(crate) fn on_module_event(&mut self, event: ModuleEvent) -> Vec<ModuleId> {
        if let ModuleEvent::Deactivated(id) = event {
            debug!(module = %id, external_left = self.grid.num_external_slots(), "Module destroyed");
        }
        self.grid.apply_module_event(&mut self.modules, event)
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    /// Hash of all mutable hull state, for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.transform.hash(&mut hasher);
        self.modules.len().hash(&mut hasher);
        for module in &self.modules {
            module.health().to_bits().hash(&mut hasher);
            module.shield_power().to_bits().hash(&mut hasher);
            module.is_external().hash(&mut hasher);
            module.quadrant().hash(&mut hasher);
        }
        self.grid.num_external_slots().hash(&mut hasher);
        hasher.finish()
    }

    /// Encode the hull as bytes.
    ///
    /// # Errors
    ///
    /// Returns [`HullError::Snapshot`] if encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| HullError::Snapshot(format!("Failed to encode hull: {e}")))
    }

    /// Decode a hull produced by [`ShipHull::to_bytes`].
    ///
    /// # Errors
    ///
    /// Returns [`HullError::Snapshot`] if decoding fails.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| HullError::Snapshot(format!("Failed to decode hull: {e}")))
    }
}
