use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use hemaflow_core::{DomainError, DomainResult, DonationProcessId, Entity};
use hemaflow_events::Event;

use crate::blood_type::{BloodType, BloodTypeCatalog};

/// Where new units are shelved unless configured otherwise.
pub const DEFAULT_STORAGE_LOCATION: &str = "Main Storage";

/// Inventory unit identifier.
///
/// Chosen by the caller (usually the barcode on the bag), never generated here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryUnitId(String);

impl InventoryUnitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl core::fmt::Display for InventoryUnitId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InventoryUnitId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Lifecycle of a stocked unit. Units enter the inventory as `Available`; the
/// other states are driven by processes outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InventoryStatus {
    Available,
    Reserved,
    Used,
    Expired,
    Discarded,
}

/// Entity: a tracked bag of collected blood.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryUnit {
    id: InventoryUnitId,
    blood_type: BloodType,
    volume_ml: u32,
    collection_date: NaiveDate,
    expiry_date: NaiveDate,
    status: InventoryStatus,
    storage_location: String,
    donation_process_id: DonationProcessId,
}

impl InventoryUnit {
    pub fn id_typed(&self) -> &InventoryUnitId {
        &self.id
    }

    pub fn blood_type(&self) -> BloodType {
        self.blood_type
    }

    pub fn volume_ml(&self) -> u32 {
        self.volume_ml
    }

    pub fn collection_date(&self) -> NaiveDate {
        self.collection_date
    }

    pub fn expiry_date(&self) -> NaiveDate {
        self.expiry_date
    }

    pub fn status(&self) -> InventoryStatus {
        self.status
    }

    pub fn storage_location(&self) -> &str {
        &self.storage_location
    }

    pub fn donation_process_id(&self) -> DonationProcessId {
        self.donation_process_id
    }

    /// A unit is usable through its expiry date inclusive.
    pub fn is_expired_on(&self, date: NaiveDate) -> bool {
        date > self.expiry_date
    }
}

impl Entity for InventoryUnit {
    type Id = InventoryUnitId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// What a finished donation contributes to a new unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSource {
    pub donation_process_id: DonationProcessId,
    pub donor_blood_type: Option<BloodType>,
    pub collected_volume_ml: Option<u32>,
}

/// Derive a new `Available` unit from a donation.
///
/// Checks, in order: donor blood type recorded, collected volume recorded. The
/// uniqueness of `unit_id` needs storage and is checked by the caller first.
pub fn derive_unit(
    unit_id: InventoryUnitId,
    source: &UnitSource,
    catalog: &BloodTypeCatalog,
    collection_date: NaiveDate,
    storage_location: &str,
) -> DomainResult<InventoryUnit> {
    let blood_type = source.donor_blood_type.ok_or_else(|| {
        DomainError::missing_precondition("donor's blood type is not set")
    })?;

    let volume_ml = source.collected_volume_ml.ok_or_else(|| {
        DomainError::missing_precondition(format!(
            "collected volume is not recorded for donation process {}",
            source.donation_process_id
        ))
    })?;

    let shelf_life = catalog.shelf_life_days(blood_type);
    let expiry_date = collection_date
        .checked_add_days(Days::new(u64::from(shelf_life)))
        .ok_or_else(|| {
            DomainError::invalid_argument(format!(
                "expiry date out of range ({collection_date} + {shelf_life} days)"
            ))
        })?;

    Ok(InventoryUnit {
        id: unit_id,
        blood_type,
        volume_ml,
        collection_date,
        expiry_date,
        status: InventoryStatus::Available,
        storage_location: storage_location.to_string(),
        donation_process_id: source.donation_process_id,
    })
}

/// Event: UnitStocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStocked {
    pub unit_id: InventoryUnitId,
    pub donation_process_id: DonationProcessId,
    pub blood_type: BloodType,
    pub volume_ml: u32,
    pub expiry_date: NaiveDate,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryEvent {
    UnitStocked(UnitStocked),
}

impl InventoryEvent {
    pub fn stocked(unit: &InventoryUnit, occurred_at: DateTime<Utc>) -> Self {
        InventoryEvent::UnitStocked(UnitStocked {
            unit_id: unit.id.clone(),
            donation_process_id: unit.donation_process_id,
            blood_type: unit.blood_type,
            volume_ml: unit.volume_ml,
            expiry_date: unit.expiry_date,
            occurred_at,
        })
    }
}

impl Event for InventoryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InventoryEvent::UnitStocked(_) => "inventory.unit.stocked",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InventoryEvent::UnitStocked(e) => e.occurred_at,
        }
    }
}
