use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use hemaflow_core::{AggregateRoot, DonationProcessId, ExpectedVersion, UserId};
use hemaflow_donation::{DonationProcess, HealthCheckRecord};
use hemaflow_inventory::{InventoryUnit, InventoryUnitId};

use super::r#trait::{
    Commit, HealthCheckStore, InventoryStore, ProcessStore, StoreError, TransactionalStore,
};

#[derive(Debug, Default)]
struct Tables {
    processes: HashMap<DonationProcessId, DonationProcess>,
    /// Insertion order of `processes`, which is the storage order reads return.
    process_order: Vec<DonationProcessId>,
    health_checks: Vec<HealthCheckRecord>,
    units: HashMap<InventoryUnitId, InventoryUnit>,
}

impl Tables {
    fn check_version(
        &self,
        process: &DonationProcess,
        expected: ExpectedVersion,
    ) -> Result<(), StoreError> {
        let id = process.id_typed();
        let current = self.processes.get(&id).map(|p| p.version());
        if !expected.matches(current) {
            return Err(StoreError::Concurrency(format!(
                "donation process {id}: expected {expected:?}, found {current:?}"
            )));
        }
        Ok(())
    }

    fn check_unit_absent(&self, id: &InventoryUnitId) -> Result<(), StoreError> {
        if self.units.contains_key(id) {
            return Err(StoreError::DuplicateKey(format!(
                "blood unit with id {id} already exists"
            )));
        }
        Ok(())
    }

    fn put_process(&mut self, process: DonationProcess) {
        let id = process.id_typed();
        if self.processes.insert(id, process).is_none() {
            self.process_order.push(id);
        }
    }

    fn ordered_processes<'a>(
        &'a self,
        filter: impl Fn(&DonationProcess) -> bool + 'a,
    ) -> impl Iterator<Item = DonationProcess> + 'a {
        self.process_order
            .iter()
            .filter_map(move |id| self.processes.get(id))
            .filter(move |p| filter(*p))
            .cloned()
    }
}

/// In-memory backend implementing every store trait.
///
/// One lock guards all tables, so a [`Commit`] is applied atomically and
/// readers never observe half of one.
#[derive(Debug, Default)]
pub struct InMemoryBloodBank {
    tables: RwLock<Tables>,
}

impl InMemoryBloodBank {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

impl ProcessStore for InMemoryBloodBank {
    fn save(&self, process: &DonationProcess, expected: ExpectedVersion) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        tables.check_version(process, expected)?;
        tables.put_process(process.clone());
        Ok(())
    }

    fn find_by_id(&self, id: DonationProcessId) -> Result<Option<DonationProcess>, StoreError> {
        Ok(self.read()?.processes.get(&id).cloned())
    }

    fn find_by_donor(&self, donor_id: UserId) -> Result<Vec<DonationProcess>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .ordered_processes(move |p| p.donor_id() == Some(donor_id))
            .collect())
    }

    fn find_all(&self) -> Result<Vec<DonationProcess>, StoreError> {
        let tables = self.read()?;
        Ok(tables.ordered_processes(|_| true).collect())
    }
}

impl HealthCheckStore for InMemoryBloodBank {
    fn save(&self, record: &HealthCheckRecord) -> Result<(), StoreError> {
        self.write()?.health_checks.push(record.clone());
        Ok(())
    }

    fn find_by_process(&self, id: DonationProcessId) -> Result<Vec<HealthCheckRecord>, StoreError> {
        Ok(self
            .read()?
            .health_checks
            .iter()
            .filter(|r| r.donation_process_id() == id)
            .cloned()
            .collect())
    }
}

impl InventoryStore for InMemoryBloodBank {
    fn exists_by_id(&self, id: &InventoryUnitId) -> Result<bool, StoreError> {
        Ok(self.read()?.units.contains_key(id))
    }

    fn save(&self, unit: &InventoryUnit) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        tables.check_unit_absent(unit.id_typed())?;
        tables.units.insert(unit.id_typed().clone(), unit.clone());
        Ok(())
    }

    fn find_by_id(&self, id: &InventoryUnitId) -> Result<Option<InventoryUnit>, StoreError> {
        Ok(self.read()?.units.get(id).cloned())
    }

    fn find_all(&self) -> Result<Vec<InventoryUnit>, StoreError> {
        Ok(self.read()?.units.values().cloned().collect())
    }
}

impl TransactionalStore for InMemoryBloodBank {
    fn commit(&self, commit: Commit) -> Result<(), StoreError> {
        let mut tables = self.write()?;

        // Validate everything before the first write.
        tables.check_version(&commit.process, commit.expected_version)?;
        if let Some(unit) = &commit.inventory_unit {
            tables.check_unit_absent(unit.id_typed())?;
        }

        if let Some(unit) = commit.inventory_unit {
            tables.units.insert(unit.id_typed().clone(), unit);
        }
        if let Some(record) = commit.health_check {
            tables.health_checks.push(record);
        }
        tables.put_process(commit.process);
        Ok(())
    }
}
