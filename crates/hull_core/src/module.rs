//! Ship module data model.
//!
//! A module is one rectangular hull block. Modules live in a flat,
//! stably-indexed list owned by the ship; everything else (grid cells,
//! shield list, query results) refers to them by [`ModuleId`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed, Vec2Fixed};

/// Maximum armor resistance (75% damage reduction).
pub const MAX_RESISTANCE: u8 = 75;

/// Stable index of a module inside its ship's module list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct ModuleId(u32);

impl ModuleId {
    /// Create an ID from a raw list index.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw index value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Index into the module list.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Size of a module in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
}

impl Footprint {
    /// A single 1x1 cell.
    pub const SINGLE: Self = Self {
        width: 1,
        height: 1,
    };

    /// Create a footprint.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of cells covered.
    #[must_use]
    pub const fn cell_count(self) -> u32 {
        self.width * self.height
    }

    /// True if both dimensions are at least one cell.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Coarse facing of an external module relative to the grid center.
///
/// Targeting heuristics use it to bias hits toward the struck side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Quadrant {
    /// Near the center, or up-left of it.
    #[default]
    Center,
    /// Top facing.
    Top,
    /// Right facing.
    Right,
    /// Bottom facing.
    Bottom,
    /// Left facing.
    Left,
}

/// Shield projector state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShieldGenerator {
    /// Maximum shield power.
    #[serde(with = "fixed_serde")]
    pub power_max: Fixed,
    /// Current shield power.
    #[serde(with = "fixed_serde")]
    pub power: Fixed,
    /// Bubble radius in world units, measured from the module center.
    #[serde(with = "fixed_serde")]
    pub radius: Fixed,
}

impl ShieldGenerator {
    /// Create a fully charged shield.
    #[must_use]
    pub const fn new(power_max: Fixed, radius: Fixed) -> Self {
        Self {
            power_max,
            power: power_max,
            radius,
        }
    }

    /// True while the bubble can absorb anything.
    #[must_use]
    pub fn is_up(&self) -> bool {
        self.power > Fixed::ZERO
    }

    /// Absorb as much of `budget` as shield power allows.
    ///
    /// Returns the amount absorbed; `budget` is reduced by the same amount.
    pub fn absorb(&mut self, budget: &mut Fixed) -> Fixed {
        let absorbed = (*budget).min(self.power).max(Fixed::ZERO);
        self.power -= absorbed;
        *budget -= absorbed;
        absorbed
    }

    /// Restore power, capped at `power_max`. Returns the amount restored.
    pub fn recharge(&mut self, amount: Fixed) -> Fixed {
        let headroom = self.power_max - self.power;
        let restored = amount.min(headroom).max(Fixed::ZERO);
        self.power += restored;
        restored
    }
}

/// What a module does. The grid algorithms are agnostic of the kind;
/// only shields and armor change how damage is absorbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ModuleKind {
    /// Plain hull structure.
    #[default]
    Structure,
    /// Armor plating with percentage damage resistance.
    Armor {
        /// Resistance percentage, capped at [`MAX_RESISTANCE`].
        resistance: u8,
    },
    /// Shield projector.
    Shield(ShieldGenerator),
    /// Weapon mount.
    Weapon,
    /// Power plant.
    PowerPlant,
    /// Engine or thruster.
    Engine,
    /// Hangar bay.
    Hangar,
    /// Command bridge.
    Command,
}

impl ModuleKind {
    /// Default attractiveness of this kind to guided munitions.
    #[must_use]
    pub const fn default_targeting_value(&self) -> i32 {
        match self {
            Self::Structure => 1,
            Self::Armor { .. } => 0,
            Self::Shield(_) => 5,
            Self::Weapon => 4,
            Self::PowerPlant => 6,
            Self::Engine => 2,
            Self::Hangar => 3,
            Self::Command => 8,
        }
    }

    /// Fraction of incoming hull damage that actually reaches health.
    #[must_use]
    pub fn damage_pass_fraction(&self) -> Fixed {
        match self {
            Self::Armor { resistance } => {
                let capped = (*resistance).min(MAX_RESISTANCE);
                Fixed::from_num(100 - capped) / Fixed::from_num(100)
            }
            _ => Fixed::ONE,
        }
    }
}

/// Result of a module soaking up part of a damage budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Absorption {
    /// Budget consumed.
    pub consumed: Fixed,
    /// Health (or shield power) actually lost.
    pub dealt: Fixed,
}

/// One placed hull block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipModule {
    kind: ModuleKind,
    footprint: Footprint,
    /// Top-left corner in ship-local, un-rotated space.
    local_position: Vec2Fixed,
    #[serde(with = "fixed_serde")]
    health: Fixed,
    #[serde(with = "fixed_serde")]
    max_health: Fixed,
    targeting_value: i32,
    is_external: bool,
    quadrant: Quadrant,
}

impl ShipModule {
    /// Create a module at full health.
    #[must_use]
    pub fn new(
        kind: ModuleKind,
        footprint: Footprint,
        local_position: Vec2Fixed,
        max_health: Fixed,
    ) -> Self {
        Self {
            targeting_value: kind.default_targeting_value(),
            kind,
            footprint,
            local_position,
            health: max_health,
            max_health,
            is_external: false,
            quadrant: Quadrant::Center,
        }
    }

    /// Builder method to override the targeting value.
    #[must_use]
    pub fn with_targeting_value(mut self, value: i32) -> Self {
        self.targeting_value = value;
        self
    }

    /// Builder method to start at a given health (clamped to `[0, max]`).
    #[must_use]
    pub fn with_health(mut self, health: Fixed) -> Self {
        self.health = health.clamp(Fixed::ZERO, self.max_health);
        self
    }

    /// Module kind.
    #[must_use]
    pub const fn kind(&self) -> &ModuleKind {
        &self.kind
    }

    /// Footprint in cells.
    #[must_use]
    pub const fn footprint(&self) -> Footprint {
        self.footprint
    }

    /// Top-left corner in ship-local space.
    #[must_use]
    pub const fn local_position(&self) -> Vec2Fixed {
        self.local_position
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> Fixed {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> Fixed {
        self.max_health
    }

    /// A module is active while it has health left.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.health > Fixed::ZERO
    }

    /// True if classified as hull-surface-exposed.
    #[must_use]
    pub const fn is_external(&self) -> bool {
        self.is_external
    }

    /// Facing assigned when the module last became external.
    #[must_use]
    pub const fn quadrant(&self) -> Quadrant {
        self.quadrant
    }

    /// Attractiveness to guided munitions.
    #[must_use]
    pub const fn targeting_value(&self) -> i32 {
        self.targeting_value
    }

    /// Shield projector, if this is a shield module.
    #[must_use]
    pub const fn shield(&self) -> Option<&ShieldGenerator> {
        match &self.kind {
            ModuleKind::Shield(shield) => Some(shield),
            _ => None,
        }
    }

    pub(crate) fn shield_mut(&mut self) -> Option<&mut ShieldGenerator> {
        match &mut self.kind {
            ModuleKind::Shield(shield) => Some(shield),
            _ => None,
        }
    }

    /// Maximum shield power (zero for non-shield modules).
    #[must_use]
    pub fn shield_power_max(&self) -> Fixed {
        self.shield().map_or(Fixed::ZERO, |s| s.power_max)
    }

    /// Current shield power (zero for non-shield modules).
    #[must_use]
    pub fn shield_power(&self) -> Fixed {
        self.shield().map_or(Fixed::ZERO, |s| s.power)
    }

    /// True if this module is alive and projecting a shield with power left.
    #[must_use]
    pub fn has_active_shield(&self) -> bool {
        self.is_active() && self.shield().is_some_and(ShieldGenerator::is_up)
    }

    pub(crate) fn set_exposure(&mut self, is_external: bool, quadrant: Quadrant) {
        self.is_external = is_external;
        self.quadrant = quadrant;
    }

    /// Set health, clamped to `[0, max]`. Returns the previous active state.
    pub(crate) fn set_health(&mut self, health: Fixed) -> bool {
        let was_active = self.is_active();
        self.health = health.clamp(Fixed::ZERO, self.max_health);
        was_active
    }

    /// Soak up hull damage from `budget`.
    ///
    /// Armor lets only part of the consumed budget through to health. The
    /// budget consumed never exceeds what remains.
    pub(crate) fn absorb_hull_damage(&mut self, budget: &mut Fixed) -> Absorption {
        if !self.is_active() || *budget <= Fixed::ZERO {
            return Absorption::default();
        }

        let pass = self.kind.damage_pass_fraction();
        let potential = *budget * pass;
        let absorption = if potential < self.health {
            Absorption {
                consumed: *budget,
                dealt: potential,
            }
        } else {
            Absorption {
                consumed: (self.health / pass).min(*budget),
                dealt: self.health,
            }
        };

        self.health -= absorption.dealt;
        *budget -= absorption.consumed;
        absorption
    }

    /// Soak up damage with the shield bubble, if there is one.
    pub(crate) fn absorb_shield_damage(&mut self, budget: &mut Fixed) -> Absorption {
        let Some(shield) = self.shield_mut() else {
            return Absorption::default();
        };
        let absorbed = shield.absorb(budget);
        Absorption {
            consumed: absorbed,
            dealt: absorbed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(n: i32) -> Fixed {
        Fixed::from_num(n)
    }

    fn module(kind: ModuleKind, health: i32) -> ShipModule {
        ShipModule::new(kind, Footprint::SINGLE, Vec2Fixed::ZERO, fixed(health))
    }

    #[test]
    fn test_hull_absorbs_whole_budget_when_surviving() {
        let mut m = module(ModuleKind::Structure, 100);
        let mut budget = fixed(30);
        let a = m.absorb_hull_damage(&mut budget);
        assert_eq!(a.consumed, fixed(30));
        assert_eq!(budget, Fixed::ZERO);
        assert_eq!(m.health(), fixed(70));
        assert!(m.is_active());
    }

    #[test]
    fn test_hull_passes_remainder_when_destroyed() {
        let mut m = module(ModuleKind::Structure, 20);
        let mut budget = fixed(50);
        let a = m.absorb_hull_damage(&mut budget);
        assert_eq!(a.dealt, fixed(20));
        assert_eq!(budget, fixed(30));
        assert!(!m.is_active());

        // Dead modules soak nothing.
        let again = m.absorb_hull_damage(&mut budget);
        assert_eq!(again, Absorption::default());
        assert_eq!(budget, fixed(30));
    }

    #[test]
    fn test_armor_resistance_reduces_health_loss() {
        let mut m = module(ModuleKind::Armor { resistance: 50 }, 100);
        let mut budget = fixed(40);
        let a = m.absorb_hull_damage(&mut budget);
        assert_eq!(a.consumed, fixed(40));
        assert_eq!(a.dealt, fixed(20));
        assert_eq!(m.health(), fixed(80));
    }

    #[test]
    fn test_armor_resistance_is_capped() {
        let kind = ModuleKind::Armor { resistance: 100 };
        assert_eq!(kind.damage_pass_fraction(), fixed(25) / fixed(100));
    }

    #[test]
    fn test_armor_kill_consumes_scaled_budget() {
        // 50% resistance: 10 health needs 20 budget.
        let mut m = module(ModuleKind::Armor { resistance: 50 }, 10);
        let mut budget = fixed(50);
        let a = m.absorb_hull_damage(&mut budget);
        assert_eq!(a.consumed, fixed(20));
        assert_eq!(budget, fixed(30));
        assert!(!m.is_active());
    }

    #[test]
    fn test_shield_absorb_and_recharge() {
        let mut shield = ShieldGenerator::new(fixed(50), fixed(64));
        let mut budget = fixed(80);
        assert_eq!(shield.absorb(&mut budget), fixed(50));
        assert_eq!(budget, fixed(30));
        assert!(!shield.is_up());
        assert_eq!(shield.recharge(fixed(100)), fixed(50));
        assert!(shield.is_up());
    }

    #[test]
    fn test_set_health_clamps_and_reports_previous_state() {
        let mut m = module(ModuleKind::Weapon, 10);
        assert!(m.set_health(fixed(-5)));
        assert_eq!(m.health(), Fixed::ZERO);
        assert!(!m.set_health(fixed(99)));
        assert_eq!(m.health(), fixed(10));
    }

    #[test]
    fn test_targeting_value_defaults_from_kind() {
        assert_eq!(module(ModuleKind::Command, 1).targeting_value(), 8);
        assert_eq!(
            module(ModuleKind::Command, 1)
                .with_targeting_value(-1)
                .targeting_value(),
            -1
        );
    }
}
