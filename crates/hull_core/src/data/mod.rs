//! Data structures for ship layout templates.
//!
//! Layouts are authored as RON files in plain integer units and turned
//! into [`ShipModule`](crate::module::ShipModule) lists when a ship is
//! materialized.

mod layout_data;

pub use layout_data::{ModuleSlotData, ShipLayoutData, SlotKind};
