use std::sync::Arc;

use thiserror::Error;

use hemaflow_core::{DonationProcessId, ExpectedVersion, UserId};
use hemaflow_donation::{DonationProcess, HealthCheckRecord};
use hemaflow_inventory::{InventoryUnit, InventoryUnitId};

/// Storage operation error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The stored version did not match the caller's expectation.
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    /// Insert of a key that already exists.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Donation process snapshots keyed by id.
pub trait ProcessStore: Send + Sync {
    /// Upsert a snapshot, checking the stored version against `expected`.
    fn save(&self, process: &DonationProcess, expected: ExpectedVersion) -> Result<(), StoreError>;

    fn find_by_id(&self, id: DonationProcessId) -> Result<Option<DonationProcess>, StoreError>;

    /// Processes owned by one donor, in storage order.
    fn find_by_donor(&self, donor_id: UserId) -> Result<Vec<DonationProcess>, StoreError>;

    /// Every process, in storage order.
    fn find_all(&self) -> Result<Vec<DonationProcess>, StoreError>;
}

/// Append-only health check records.
pub trait HealthCheckStore: Send + Sync {
    fn save(&self, record: &HealthCheckRecord) -> Result<(), StoreError>;

    fn find_by_process(&self, id: DonationProcessId) -> Result<Vec<HealthCheckRecord>, StoreError>;
}

/// Stocked inventory units keyed by their caller-chosen id.
pub trait InventoryStore: Send + Sync {
    fn exists_by_id(&self, id: &InventoryUnitId) -> Result<bool, StoreError>;

    /// Insert-only: an existing id fails with `DuplicateKey` and is left as is.
    fn save(&self, unit: &InventoryUnit) -> Result<(), StoreError>;

    fn find_by_id(&self, id: &InventoryUnitId) -> Result<Option<InventoryUnit>, StoreError>;

    fn find_all(&self) -> Result<Vec<InventoryUnit>, StoreError>;
}

/// Everything one workflow transition writes.
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub process: DonationProcess,
    pub expected_version: ExpectedVersion,
    pub health_check: Option<HealthCheckRecord>,
    pub inventory_unit: Option<InventoryUnit>,
}

impl Commit {
    pub fn process(process: DonationProcess, expected_version: ExpectedVersion) -> Self {
        Self {
            process,
            expected_version,
            health_check: None,
            inventory_unit: None,
        }
    }

    pub fn with_health_check(mut self, record: HealthCheckRecord) -> Self {
        self.health_check = Some(record);
        self
    }

    pub fn with_inventory_unit(mut self, unit: InventoryUnit) -> Self {
        self.inventory_unit = Some(unit);
        self
    }
}

/// A store that can apply a [`Commit`] atomically.
///
/// Implementations must:
/// - check `expected_version` against the stored process
/// - reject an `inventory_unit` whose id already exists
/// - write all parts of the commit or none of them
pub trait TransactionalStore: ProcessStore + HealthCheckStore + InventoryStore {
    fn commit(&self, commit: Commit) -> Result<(), StoreError>;
}

impl<S> ProcessStore for Arc<S>
where
    S: ProcessStore + ?Sized,
{
    fn save(&self, process: &DonationProcess, expected: ExpectedVersion) -> Result<(), StoreError> {
        (**self).save(process, expected)
    }

    fn find_by_id(&self, id: DonationProcessId) -> Result<Option<DonationProcess>, StoreError> {
        (**self).find_by_id(id)
    }

    fn find_by_donor(&self, donor_id: UserId) -> Result<Vec<DonationProcess>, StoreError> {
        (**self).find_by_donor(donor_id)
    }

    fn find_all(&self) -> Result<Vec<DonationProcess>, StoreError> {
        (**self).find_all()
    }
}

impl<S> HealthCheckStore for Arc<S>
where
    S: HealthCheckStore + ?Sized,
{
    fn save(&self, record: &HealthCheckRecord) -> Result<(), StoreError> {
        (**self).save(record)
    }

    fn find_by_process(&self, id: DonationProcessId) -> Result<Vec<HealthCheckRecord>, StoreError> {
        (**self).find_by_process(id)
    }
}

impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    fn exists_by_id(&self, id: &InventoryUnitId) -> Result<bool, StoreError> {
        (**self).exists_by_id(id)
    }

    fn save(&self, unit: &InventoryUnit) -> Result<(), StoreError> {
        (**self).save(unit)
    }

    fn find_by_id(&self, id: &InventoryUnitId) -> Result<Option<InventoryUnit>, StoreError> {
        (**self).find_by_id(id)
    }

    fn find_all(&self) -> Result<Vec<InventoryUnit>, StoreError> {
        (**self).find_all()
    }
}

impl<S> TransactionalStore for Arc<S>
where
    S: TransactionalStore + ?Sized,
{
    fn commit(&self, commit: Commit) -> Result<(), StoreError> {
        (**self).commit(commit)
    }
}
