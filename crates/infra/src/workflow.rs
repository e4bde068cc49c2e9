//! Donation workflow service (application-level orchestration).
//!
//! Every state-changing operation follows the same pipeline:
//!
//! ```text
//! load process (NotFound)
//!   ↓
//! decide + apply on a copy (StateConflict / InvalidArgument)
//!   ↓
//! operation-specific checks (screening data, inventory unit)
//!   ↓
//! commit snapshot + side records, checked against the loaded version
//!   ↓
//! publish committed events
//! ```
//!
//! Nothing is written unless the commit succeeds, and the commit writes all of
//! its parts or none. Publication happens after the commit and never fails the
//! operation.

use std::sync::Arc;

use serde_json::Value as JsonValue;

use hemaflow_core::{
    Aggregate, AggregateRoot, AppointmentId, DonationProcessId, ExpectedVersion, HealthCheckId,
};
use hemaflow_donation::{
    ConfirmAppointmentScheduled, CreateDonationRequest, DonationCommand, DonationEvent,
    DonationProcess, DonationStatus, HealthCheckData, HealthCheckRecord, MarkBloodCollected,
    RecordHealthCheck, RecordTestResult, ReviewDonationRequest, TestOutcome,
};
use hemaflow_events::{EventBus, EventEnvelope};
use hemaflow_inventory::{InventoryEvent, InventoryUnit, InventoryUnitId, UnitSource};

use crate::clock::Clock;
use crate::collaborators::{AppointmentService, Donor, IdentityProvider};
use crate::config::HemaflowConfig;
use crate::error::{WorkflowError, WorkflowResult};
use crate::inventory_engine::{InventoryEngine, log_unit_stocked};
use crate::store::{Commit, HealthCheckStore, ProcessStore, TransactionalStore};
use crate::views::DonationProcessView;

pub const PROCESS_AGGREGATE_TYPE: &str = "donation.process";
pub const UNIT_AGGREGATE_TYPE: &str = "inventory.unit";

/// A decided transition that has not been committed yet.
struct Transition {
    before: DonationProcess,
    after: DonationProcess,
    events: Vec<DonationEvent>,
}

impl Transition {
    fn commit(&self) -> Commit {
        Commit::process(
            self.after.clone(),
            ExpectedVersion::Exact(self.before.version()),
        )
    }
}

/// Drives donation processes through their lifecycle and stocks the units
/// that pass testing.
pub struct DonationWorkflow<S, B> {
    store: Arc<S>,
    inventory: InventoryEngine<Arc<S>>,
    identity: Arc<dyn IdentityProvider>,
    appointments: Arc<dyn AppointmentService>,
    clock: Arc<dyn Clock>,
    bus: B,
}

impl<S, B> DonationWorkflow<S, B>
where
    S: TransactionalStore,
    B: EventBus<EventEnvelope<JsonValue>>,
{
    pub fn new(
        store: Arc<S>,
        bus: B,
        identity: Arc<dyn IdentityProvider>,
        appointments: Arc<dyn AppointmentService>,
        clock: Arc<dyn Clock>,
        config: &HemaflowConfig,
    ) -> WorkflowResult<Self> {
        let inventory = InventoryEngine::new(
            Arc::clone(&store),
            config.catalog()?,
            config.storage_location.clone(),
            Arc::clone(&clock),
        );

        Ok(Self {
            store,
            inventory,
            identity,
            appointments,
            clock,
            bus,
        })
    }

    pub fn inventory(&self) -> &InventoryEngine<Arc<S>> {
        &self.inventory
    }

    /// Open a new request owned by the acting user.
    pub fn create_donation_request(&self) -> WorkflowResult<DonationProcessView> {
        let donor = self.identity.current_user();
        let process_id = DonationProcessId::new();
        let command = DonationCommand::CreateDonationRequest(CreateDonationRequest {
            process_id,
            donor_id: donor.id,
            occurred_at: self.clock.now(),
        });

        let mut process = DonationProcess::empty(process_id);
        let events = process.execute(&command)?;
        self.store
            .commit(Commit::process(process.clone(), ExpectedVersion::New))?;

        tracing::info!(
            process_id = %process_id,
            donor_id = %donor.id,
            status = %process.status(),
            "donation request created"
        );
        self.publish_process_events(&process, &events);

        Ok(self.enrich(&process, Some(&donor)))
    }

    /// Requests owned by the acting user, in storage order.
    pub fn get_my_donation_history(&self) -> WorkflowResult<Vec<DonationProcessView>> {
        let donor = self.identity.current_user();
        let processes = self.store.find_by_donor(donor.id)?;
        tracing::debug!(donor_id = %donor.id, count = processes.len(), "loaded donation history");

        Ok(processes
            .iter()
            .map(|p| self.enrich(p, Some(&donor)))
            .collect())
    }

    /// Every request, in storage order.
    pub fn get_all_donation_requests(&self) -> WorkflowResult<Vec<DonationProcessView>> {
        let processes = ProcessStore::find_all(&*self.store)?;
        tracing::debug!(count = processes.len(), "loaded all donation requests");

        Ok(processes.iter().map(|p| self.enrich_with_owner(p)).collect())
    }

    pub fn get_donation_request(
        &self,
        process_id: DonationProcessId,
    ) -> WorkflowResult<DonationProcessView> {
        let process = self.load(process_id)?;
        Ok(self.enrich_with_owner(&process))
    }

    pub fn health_checks(&self, process_id: DonationProcessId) -> WorkflowResult<Vec<HealthCheckRecord>> {
        Ok(self.store.find_by_process(process_id)?)
    }

    /// Staff review: approve (`APPOINTMENT_PENDING`) or reject a pending request.
    pub fn update_donation_status(
        &self,
        process_id: DonationProcessId,
        new_status: DonationStatus,
        note: Option<String>,
    ) -> WorkflowResult<DonationProcessView> {
        let transition = self.decide(DonationCommand::ReviewDonationRequest(
            ReviewDonationRequest {
                process_id,
                new_status,
                note,
                occurred_at: self.clock.now(),
            },
        ))?;

        self.commit(&transition, transition.commit())?;
        Ok(self.enrich_with_owner(&transition.after))
    }

    /// Called by the appointment service once a slot is booked.
    pub fn confirm_appointment_scheduled(
        &self,
        process_id: DonationProcessId,
        appointment_id: AppointmentId,
    ) -> WorkflowResult<DonationProcessView> {
        let transition = self.decide(DonationCommand::ConfirmAppointmentScheduled(
            ConfirmAppointmentScheduled {
                process_id,
                appointment_id,
                occurred_at: self.clock.now(),
            },
        ))?;

        self.commit(&transition, transition.commit())?;
        Ok(self.enrich_with_owner(&transition.after))
    }

    /// Store the screening and move to `HEALTH_CHECK_PASSED` or `HEALTH_CHECK_FAILED`.
    pub fn record_health_check(
        &self,
        process_id: DonationProcessId,
        data: HealthCheckData,
        is_eligible: bool,
    ) -> WorkflowResult<HealthCheckRecord> {
        let now = self.clock.now();
        let health_check_id = HealthCheckId::new();
        let transition = self.decide(DonationCommand::RecordHealthCheck(RecordHealthCheck {
            process_id,
            health_check_id,
            is_eligible,
            occurred_at: now,
        }))?;

        if let Err(err) = data.validate() {
            tracing::warn!(process_id = %process_id, error = %err, "health check data rejected");
            return Err(err.into());
        }

        let record = HealthCheckRecord::new(health_check_id, process_id, data, is_eligible, now);
        self.commit(
            &transition,
            transition.commit().with_health_check(record.clone()),
        )?;
        Ok(record)
    }

    pub fn mark_blood_as_collected(
        &self,
        process_id: DonationProcessId,
        collected_volume_ml: u32,
    ) -> WorkflowResult<DonationProcessView> {
        let transition = self.decide(DonationCommand::MarkBloodCollected(MarkBloodCollected {
            process_id,
            volume_ml: collected_volume_ml,
            occurred_at: self.clock.now(),
        }))?;

        self.commit(&transition, transition.commit())?;
        Ok(self.enrich_with_owner(&transition.after))
    }

    /// Record the lab outcome for a collected donation.
    ///
    /// A safe result stocks a unit under `unit_id` in the same commit as the
    /// `COMPLETED` transition; if the unit cannot be created nothing is written.
    pub fn record_blood_test_result(
        &self,
        process_id: DonationProcessId,
        is_safe: bool,
        unit_id: impl Into<String>,
        failure_notes: Option<String>,
    ) -> WorkflowResult<DonationProcessView> {
        let unit_id = InventoryUnitId::new(unit_id);
        let outcome = if is_safe {
            TestOutcome::Safe
        } else {
            TestOutcome::Unsafe {
                notes: failure_notes.unwrap_or_else(|| "not specified".to_string()),
            }
        };

        let transition = self.decide(DonationCommand::RecordTestResult(RecordTestResult {
            process_id,
            unit_id: unit_id.clone(),
            outcome,
            occurred_at: self.clock.now(),
        }))?;

        if !is_safe {
            self.commit(&transition, transition.commit())?;
            return Ok(self.enrich_with_owner(&transition.after));
        }

        let unit = self.prepare_unit(&transition.before, unit_id)?;
        self.commit(
            &transition,
            transition.commit().with_inventory_unit(unit.clone()),
        )?;

        log_unit_stocked(&unit);
        self.publish(EventEnvelope::from_typed(
            unit.id_typed().to_string(),
            UNIT_AGGREGATE_TYPE,
            1,
            &InventoryEvent::stocked(&unit, self.clock.now()),
        ));

        Ok(self.enrich_with_owner(&transition.after))
    }

    fn load(&self, process_id: DonationProcessId) -> WorkflowResult<DonationProcess> {
        ProcessStore::find_by_id(&*self.store, process_id)?.ok_or_else(|| {
            WorkflowError::NotFound(format!("donation process not found with id: {process_id}"))
        })
    }

    fn decide(&self, command: DonationCommand) -> WorkflowResult<Transition> {
        let before = self.load(command.process_id())?;
        let mut after = before.clone();

        match after.execute(&command) {
            Ok(events) => Ok(Transition {
                before,
                after,
                events,
            }),
            Err(err) => {
                tracing::warn!(
                    process_id = %command.process_id(),
                    status = %before.status(),
                    error = %err,
                    "donation transition rejected"
                );
                Err(err.into())
            }
        }
    }

    fn commit(&self, transition: &Transition, commit: Commit) -> WorkflowResult<()> {
        let process_id = transition.after.id_typed();

        if let Err(err) = self.store.commit(commit) {
            tracing::warn!(process_id = %process_id, error = %err, "donation commit failed");
            return Err(err.into());
        }

        tracing::info!(
            process_id = %process_id,
            from = %transition.before.status(),
            to = %transition.after.status(),
            "donation status changed"
        );
        self.publish_process_events(&transition.after, &transition.events);
        Ok(())
    }

    fn prepare_unit(
        &self,
        process: &DonationProcess,
        unit_id: InventoryUnitId,
    ) -> WorkflowResult<InventoryUnit> {
        // An owner the identity provider no longer knows has no blood type on record.
        let donor_blood_type = process
            .donor_id()
            .and_then(|id| self.identity.find_user(id))
            .and_then(|donor| donor.blood_type);

        let source = UnitSource {
            donation_process_id: process.id_typed(),
            donor_blood_type,
            collected_volume_ml: process.collected_volume_ml(),
        };

        self.inventory.prepare_unit(&source, unit_id).inspect_err(|err| {
            tracing::warn!(process_id = %process.id_typed(), error = %err, "blood unit rejected");
        })
    }

    fn publish_process_events(&self, process: &DonationProcess, events: &[DonationEvent]) {
        let base = process.version().saturating_sub(events.len() as u64);
        for (offset, event) in events.iter().enumerate() {
            self.publish(EventEnvelope::from_typed(
                process.id_typed().to_string(),
                PROCESS_AGGREGATE_TYPE,
                base + offset as u64 + 1,
                event,
            ));
        }
    }

    fn publish(&self, envelope: Result<EventEnvelope<JsonValue>, serde_json::Error>) {
        let envelope = match envelope {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(error = %err, "failed to serialize committed event");
                return;
            }
        };

        let event_type = envelope.event_type().to_string();
        if let Err(err) = self.bus.publish(envelope) {
            tracing::warn!(event_type = %event_type, error = ?err, "event publication failed after commit");
        }
    }

    fn enrich_with_owner(&self, process: &DonationProcess) -> DonationProcessView {
        let donor = process.donor_id().and_then(|id| self.identity.find_user(id));
        self.enrich(process, donor.as_ref())
    }

    fn enrich(&self, process: &DonationProcess, donor: Option<&Donor>) -> DonationProcessView {
        let appointment = process
            .appointment_id()
            .and_then(|id| self.appointments.summarize(id));
        DonationProcessView::from_parts(process, donor, appointment)
    }
}
