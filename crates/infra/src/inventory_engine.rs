//! Stocking of tested units and read access to the inventory.

use std::sync::Arc;

use hemaflow_core::DomainError;
use hemaflow_inventory::{
    BloodTypeCatalog, InventoryUnit, InventoryUnitId, UnitSource, derive_unit,
};

use crate::clock::Clock;
use crate::error::{WorkflowError, WorkflowResult};
use crate::store::InventoryStore;

/// Turns finished donations into `Available` inventory units.
///
/// Unit creation is split in two so the donation workflow can persist the
/// unit together with the process transition: [`prepare_unit`](Self::prepare_unit)
/// runs every check and builds the unit without writing, and
/// [`create_unit`](Self::create_unit) additionally stores it.
pub struct InventoryEngine<I> {
    store: I,
    catalog: BloodTypeCatalog,
    storage_location: String,
    clock: Arc<dyn Clock>,
}

impl<I> InventoryEngine<I>
where
    I: InventoryStore,
{
    pub fn new(
        store: I,
        catalog: BloodTypeCatalog,
        storage_location: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            catalog,
            storage_location: storage_location.into(),
            clock,
        }
    }

    /// Build the unit a donation would contribute, without persisting it.
    ///
    /// Checks, in order: `unit_id` not taken, donor blood type recorded,
    /// collected volume recorded. The collection date is today per the clock.
    pub fn prepare_unit(
        &self,
        source: &UnitSource,
        unit_id: InventoryUnitId,
    ) -> WorkflowResult<InventoryUnit> {
        if self.store.exists_by_id(&unit_id)? {
            return Err(DomainError::duplicate_id(format!(
                "blood unit with id {unit_id} already exists"
            ))
            .into());
        }

        let unit = derive_unit(
            unit_id,
            source,
            &self.catalog,
            self.clock.today(),
            &self.storage_location,
        )?;
        Ok(unit)
    }

    /// Prepare and store a unit. Nothing is written when a check fails.
    pub fn create_unit(
        &self,
        source: &UnitSource,
        unit_id: InventoryUnitId,
    ) -> WorkflowResult<InventoryUnit> {
        let unit = self.prepare_unit(source, unit_id)?;
        self.store.save(&unit)?;

        log_unit_stocked(&unit);
        Ok(unit)
    }

    pub fn list_all(&self) -> WorkflowResult<Vec<InventoryUnit>> {
        let units = self.store.find_all()?;
        tracing::debug!(count = units.len(), "listed inventory");
        Ok(units)
    }

    pub fn find_unit(&self, unit_id: &InventoryUnitId) -> WorkflowResult<InventoryUnit> {
        self.store
            .find_by_id(unit_id)?
            .ok_or_else(|| WorkflowError::NotFound(format!("blood unit not found with id: {unit_id}")))
    }
}

/// Emitted once per unit that reaches storage, whichever path stored it.
pub(crate) fn log_unit_stocked(unit: &InventoryUnit) {
    tracing::info!(
        unit_id = %unit.id_typed(),
        process_id = %unit.donation_process_id(),
        blood_type = %unit.blood_type(),
        volume_ml = unit.volume_ml(),
        expiry_date = %unit.expiry_date(),
        "blood unit stocked"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use hemaflow_core::{DonationProcessId, ErrorKind};
    use hemaflow_inventory::{BloodType, InventoryStatus};

    use crate::clock::FixedClock;
    use crate::store::InMemoryBloodBank;

    fn engine() -> InventoryEngine<Arc<InMemoryBloodBank>> {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 3, 10, 9, 30, 0).unwrap());
        InventoryEngine::new(
            Arc::new(InMemoryBloodBank::new()),
            BloodTypeCatalog::standard(),
            "Main Storage",
            Arc::new(clock),
        )
    }

    fn source(blood_type: Option<BloodType>, volume: Option<u32>) -> UnitSource {
        UnitSource {
            donation_process_id: DonationProcessId::new(),
            donor_blood_type: blood_type,
            collected_volume_ml: volume,
        }
    }

    #[test]
    fn create_unit_stocks_available_unit_dated_today() {
        let engine = engine();
        let unit = engine
            .create_unit(&source(Some(BloodType::OPositive), Some(450)), "U1".into())
            .unwrap();

        assert_eq!(unit.status(), InventoryStatus::Available);
        assert_eq!(unit.collection_date(), NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
        assert_eq!(unit.expiry_date(), NaiveDate::from_ymd_opt(2026, 4, 14).unwrap());
        assert_eq!(engine.find_unit(&"U1".into()).unwrap(), unit);
        assert_eq!(engine.list_all().unwrap().len(), 1);
    }

    #[test]
    fn duplicate_id_leaves_inventory_unchanged() {
        let engine = engine();
        let first = engine
            .create_unit(&source(Some(BloodType::APositive), Some(450)), "U1".into())
            .unwrap();

        let err = engine
            .create_unit(&source(Some(BloodType::BNegative), Some(300)), "U1".into())
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::DuplicateId));
        assert_eq!(engine.list_all().unwrap(), vec![first]);
    }

    #[test]
    fn duplicate_id_is_reported_before_missing_data() {
        let engine = engine();
        engine
            .create_unit(&source(Some(BloodType::APositive), Some(450)), "U1".into())
            .unwrap();

        let err = engine.prepare_unit(&source(None, None), "U1".into()).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::DuplicateId));
    }

    #[test]
    fn missing_donor_data_persists_nothing() {
        let engine = engine();

        let err = engine
            .create_unit(&source(None, Some(450)), "U1".into())
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::MissingPrecondition));

        let err = engine
            .create_unit(&source(Some(BloodType::ONegative), None), "U1".into())
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::MissingPrecondition));

        assert!(engine.list_all().unwrap().is_empty());
    }

    #[test]
    fn prepare_does_not_write() {
        let engine = engine();
        engine
            .prepare_unit(&source(Some(BloodType::AbPositive), Some(500)), "U7".into())
            .unwrap();
        let err = engine.find_unit(&"U7".into()).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
    }
}
