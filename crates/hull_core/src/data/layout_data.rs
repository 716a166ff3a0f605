//! Ship layout template data.

use std::path::Path;

use ron::extensions::Extensions;
use serde::{Deserialize, Serialize};

use crate::error::{HullError, Result};
use crate::hull::ShipHull;
use crate::math::{Fixed, Vec2Fixed};
use crate::module::{Footprint, ModuleKind, ShieldGenerator, ShipModule};
use crate::transform::ShipTransform;

/// Module kind as written in a layout file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotKind {
    /// Plain hull structure.
    Structure,
    /// Armor plating.
    Armor {
        /// Damage resistance percentage.
        resistance: u8,
    },
    /// Shield projector.
    Shield {
        /// Maximum shield power.
        power: u32,
        /// Bubble radius in world units.
        radius: u32,
    },
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

impl SlotKind {
    fn to_module_kind(self, index: usize) -> Result<ModuleKind> {
        Ok(match self {
            Self::Structure => ModuleKind::Structure,
            Self::Armor { resistance } => ModuleKind::Armor { resistance },
            Self::Shield { power, radius } => ModuleKind::Shield(ShieldGenerator::new(
                to_fixed(power, index, "power")?,
                to_fixed(radius, index, "radius")?,
            )),
            Self::Weapon => ModuleKind::Weapon,
            Self::PowerPlant => ModuleKind::PowerPlant,
            Self::Engine => ModuleKind::Engine,
            Self::Hangar => ModuleKind::Hangar,
            Self::Command => ModuleKind::Command,
        })
    }
}

fn to_fixed(value: u32, index: usize, field: &'static str) -> Result<Fixed> {
    Fixed::checked_from_num(value).ok_or(HullError::ValueOutOfRange {
        index,
        field,
        value,
    })
}

/// One module placement in a layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSlotData {
    /// What the module is.
    pub kind: SlotKind,
    /// Top-left X in ship-local world units.
    pub x: i32,
    /// Top-left Y in ship-local world units.
    pub y: i32,
    /// Width in cells.
    #[serde(default = "default_extent")]
    pub width: u32,
    /// Height in cells.
    #[serde(default = "default_extent")]
    pub height: u32,
    /// Maximum health.
    pub health: u32,
    /// Override for the kind's default targeting value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targeting_value: Option<i32>,
}

const fn default_extent() -> u32 {
    1
}

impl ModuleSlotData {
    /// Build the runtime module for the slot at `index` in its layout.
    ///
    /// # Errors
    ///
    /// Returns [`HullError::ValueOutOfRange`] if health, shield power or
    /// shield radius exceeds the fixed-point range.
    pub fn to_module(&self, index: usize) -> Result<ShipModule> {
        let module = ShipModule::new(
            self.kind.to_module_kind(index)?,
            Footprint::new(self.width, self.height),
            Vec2Fixed::new(Fixed::from_num(self.x), Fixed::from_num(self.y)),
            to_fixed(self.health, index, "health")?,
        );
        Ok(match self.targeting_value {
            Some(value) => module.with_targeting_value(value),
            None => module,
        })
    }
}

/// A ship design's module layout.
///
/// # Example RON
///
/// `targeting_value` may be written bare; `Some(..)` is implied.
///
/// ```ron
/// ShipLayoutData(
///     name: "corvette",
///     modules: [
///         (kind: Command, x: -16, y: -16, width: 2, height: 2, health: 120),
///         (kind: Shield(power: 80, radius: 48), x: 16, y: -8, health: 40),
///         (kind: Armor(resistance: 40), x: -32, y: -16, height: 2, health: 60, targeting_value: 3),
///     ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipLayoutData {
    /// Design name.
    pub name: String,
    /// Free-form notes.
    #[serde(default)]
    pub description: String,
    /// Module placements; order defines module IDs.
    pub modules: Vec<ModuleSlotData>,
}

impl ShipLayoutData {
    /// Parse a layout from RON text.
    ///
    /// # Errors
    ///
    /// Returns [`HullError::LayoutParse`] if the text is not a valid layout.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        Self::parse(ron, "<inline>")
    }

    /// Load a layout from a RON file.
    ///
    /// # Errors
    ///
    /// Returns [`HullError::LayoutParse`] if the file cannot be read or parsed.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| HullError::LayoutParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&contents, &path.display().to_string())
    }

    fn parse(ron: &str, label: &str) -> Result<Self> {
        ron::Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .from_str(ron)
            .map_err(|e| HullError::LayoutParse {
                path: label.to_string(),
                message: e.to_string(),
            })
    }

    /// Runtime modules in layout order.
    ///
    /// # Errors
    ///
    /// See [`ModuleSlotData::to_module`].
    pub fn to_modules(&self) -> Result<Vec<ShipModule>> {
        self.modules
            .iter()
            .enumerate()
            .map(|(index, slot)| slot.to_module(index))
            .collect()
    }

    /// Materialize a hull from this layout.
    ///
    /// # Errors
    ///
    /// See [`ModuleSlotData::to_module`] and [`ShipHull::new`].
    pub fn build_hull(&self, transform: ShipTransform) -> Result<ShipHull> {
        ShipHull::new(self.to_modules()?, transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleId;

    const CORVETTE: &str = r#"
        ShipLayoutData(
            name: "corvette",
            modules: [
                (kind: Command, x: -16, y: -16, width: 2, height: 2, health: 120),
                (kind: Shield(power: 80, radius: 48), x: 16, y: -16, health: 40),
                (kind: Armor(resistance: 40), x: -32, y: -16, height: 2, health: 60, targeting_value: 7),
            ],
        )
    "#;

    #[test]
    fn test_parse_layout() {
        let layout = ShipLayoutData::from_ron_str(CORVETTE).expect("valid RON");
        assert_eq!(layout.name, "corvette");
        assert_eq!(layout.modules.len(), 3);
        assert_eq!(layout.modules[1].width, 1);
        assert_eq!(layout.modules[2].height, 2);
        assert_eq!(layout.modules[2].targeting_value, Some(7));
    }

    #[test]
    fn test_slot_conversion() {
        let layout = ShipLayoutData::from_ron_str(CORVETTE).expect("valid RON");
        let modules = layout.to_modules().expect("in range");
        assert_eq!(modules[0].footprint(), Footprint::new(2, 2));
        assert_eq!(modules[0].targeting_value(), 8);
        assert_eq!(modules[1].shield_power_max(), Fixed::from_num(80));
        assert_eq!(modules[2].targeting_value(), 7);
        assert_eq!(
            modules[2].local_position(),
            Vec2Fixed::new(Fixed::from_num(-32), Fixed::from_num(-16))
        );
    }

    #[test]
    fn test_build_hull_from_layout() {
        let layout = ShipLayoutData::from_ron_str(CORVETTE).expect("valid RON");
        let hull = layout.build_hull(ShipTransform::default()).expect("valid layout");
        assert_eq!((hull.grid().width(), hull.grid().height()), (4, 2));
        assert_eq!(hull.grid().shields(), &[ModuleId::new(1)]);
    }

    #[test]
    fn test_wrapped_and_bare_targeting_values_agree() {
        let bare = "(kind: Weapon, x: 0, y: 0, health: 10, targeting_value: 4)";
        let wrapped = "(kind: Weapon, x: 0, y: 0, health: 10, targeting_value: Some(4))";
        let parse = |slot: &str| {
            ShipLayoutData::from_ron_str(&format!("ShipLayoutData(name: \"w\", modules: [{slot}])"))
                .expect("valid RON")
        };
        assert_eq!(parse(bare), parse(wrapped));
        assert_eq!(parse(bare).modules[0].targeting_value, Some(4));
    }

    #[test]
    fn test_oversized_health_is_an_error() {
        let layout = ShipLayoutData::from_ron_str(
            "ShipLayoutData(name: \"tank\", modules: [(kind: Structure, x: 0, y: 0, health: 3000000000)])",
        )
        .expect("valid RON");
        assert_eq!(
            layout.build_hull(ShipTransform::default()),
            Err(HullError::ValueOutOfRange {
                index: 0,
                field: "health",
                value: 3_000_000_000
            })
        );
    }

    #[test]
    fn test_oversized_shield_radius_is_an_error() {
        let slot = ModuleSlotData {
            kind: SlotKind::Shield {
                power: 10,
                radius: u32::MAX,
            },
            x: 0,
            y: 0,
            width: 1,
            height: 1,
            health: 10,
            targeting_value: None,
        };
        assert!(matches!(
            slot.to_module(3),
            Err(HullError::ValueOutOfRange { index: 3, field: "radius", .. })
        ));
    }

    #[test]
    fn test_oversized_width_is_an_error() {
        let layout = ShipLayoutData::from_ron_str(
            "ShipLayoutData(name: \"rail\", modules: [(kind: Structure, x: 0, y: 0, width: 200000000, health: 5)])",
        )
        .expect("valid RON");
        assert!(matches!(
            layout.build_hull(ShipTransform::default()),
            Err(HullError::InvalidFootprint { index: 0, .. })
        ));
    }

    #[test]
    fn test_parse_error_is_layout_parse() {
        let err = ShipLayoutData::from_ron_str("ShipLayoutData(name: 3)").unwrap_err();
        assert!(matches!(err, HullError::LayoutParse { ref path, .. } if path == "<inline>"));
    }

    #[test]
    fn test_missing_file_is_layout_parse() {
        let err = ShipLayoutData::load_file("/nonexistent/layout.ron").unwrap_err();
        assert!(matches!(err, HullError::LayoutParse { .. }));
    }
}
