//! Blood inventory domain module.
//!
//! This crate contains the blood type catalog and the rule that turns a finished
//! donation into a stocked unit, implemented purely as deterministic domain logic
//! (no IO, no clock, no storage).

pub mod blood_type;
pub mod unit;

pub use blood_type::{BloodType, BloodTypeCatalog, DEFAULT_SHELF_LIFE_DAYS};
pub use unit::{
    DEFAULT_STORAGE_LOCATION, InventoryEvent, InventoryStatus, InventoryUnit, InventoryUnitId,
    UnitSource, UnitStocked, derive_unit,
};
