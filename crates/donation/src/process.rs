use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hemaflow_core::{
    Aggregate, AggregateRoot, AppointmentId, DomainError, DonationProcessId, HealthCheckId, UserId,
};
use hemaflow_events::Event;
use hemaflow_inventory::InventoryUnitId;

use crate::status::DonationStatus;

/// Aggregate root: DonationProcess.
///
/// # Invariants
/// - `status` only moves along [`DonationStatus::successors`].
/// - `collected_volume_ml` is written once, by the collection transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationProcess {
    id: DonationProcessId,
    donor_id: Option<UserId>,
    status: DonationStatus,
    note: Option<String>,
    collected_volume_ml: Option<u32>,
    appointment_id: Option<AppointmentId>,
    requested_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl DonationProcess {
    /// Create an empty, not-yet-created aggregate instance.
    pub fn empty(id: DonationProcessId) -> Self {
        Self {
            id,
            donor_id: None,
            status: DonationStatus::PendingApproval,
            note: None,
            collected_volume_ml: None,
            appointment_id: None,
            requested_at: None,
            updated_at: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> DonationProcessId {
        self.id
    }

    pub fn donor_id(&self) -> Option<UserId> {
        self.donor_id
    }

    pub fn status(&self) -> DonationStatus {
        self.status
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn collected_volume_ml(&self) -> Option<u32> {
        self.collected_volume_ml
    }

    pub fn appointment_id(&self) -> Option<AppointmentId> {
        self.appointment_id
    }

    pub fn requested_at(&self) -> Option<DateTime<Utc>> {
        self.requested_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl AggregateRoot for DonationProcess {
    type Id = DonationProcessId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateDonationRequest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDonationRequest {
    pub process_id: DonationProcessId,
    pub donor_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReviewDonationRequest (staff approval or rejection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDonationRequest {
    pub process_id: DonationProcessId,
    pub new_status: DonationStatus,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ConfirmAppointmentScheduled (issued on behalf of the appointment service).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmAppointmentScheduled {
    pub process_id: DonationProcessId,
    pub appointment_id: AppointmentId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordHealthCheck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordHealthCheck {
    pub process_id: DonationProcessId,
    pub health_check_id: HealthCheckId,
    pub is_eligible: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkBloodCollected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkBloodCollected {
    pub process_id: DonationProcessId,
    pub volume_ml: u32,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestOutcome {
    Safe,
    Unsafe { notes: String },
}

/// Command: RecordTestResult.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTestResult {
    pub process_id: DonationProcessId,
    pub unit_id: InventoryUnitId,
    pub outcome: TestOutcome,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DonationCommand {
    CreateDonationRequest(CreateDonationRequest),
    ReviewDonationRequest(ReviewDonationRequest),
    ConfirmAppointmentScheduled(ConfirmAppointmentScheduled),
    RecordHealthCheck(RecordHealthCheck),
    MarkBloodCollected(MarkBloodCollected),
    RecordTestResult(RecordTestResult),
}

impl DonationCommand {
    pub fn process_id(&self) -> DonationProcessId {
        match self {
            DonationCommand::CreateDonationRequest(c) => c.process_id,
            DonationCommand::ReviewDonationRequest(c) => c.process_id,
            DonationCommand::ConfirmAppointmentScheduled(c) => c.process_id,
            DonationCommand::RecordHealthCheck(c) => c.process_id,
            DonationCommand::MarkBloodCollected(c) => c.process_id,
            DonationCommand::RecordTestResult(c) => c.process_id,
        }
    }
}

/// Event: DonationRequested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationRequested {
    pub process_id: DonationProcessId,
    pub donor_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DonationReviewed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationReviewed {
    pub process_id: DonationProcessId,
    pub new_status: DonationStatus,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: AppointmentScheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentScheduled {
    pub process_id: DonationProcessId,
    pub appointment_id: AppointmentId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: HealthCheckRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckRecorded {
    pub process_id: DonationProcessId,
    pub health_check_id: HealthCheckId,
    pub passed: bool,
    pub note: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: BloodCollected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodCollected {
    pub process_id: DonationProcessId,
    pub volume_ml: u32,
    pub note: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: TestPassed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestPassed {
    pub process_id: DonationProcessId,
    pub unit_id: InventoryUnitId,
    pub note: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: TestFailed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestFailed {
    pub process_id: DonationProcessId,
    pub unit_id: InventoryUnitId,
    pub note: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DonationEvent {
    DonationRequested(DonationRequested),
    DonationReviewed(DonationReviewed),
    AppointmentScheduled(AppointmentScheduled),
    HealthCheckRecorded(HealthCheckRecorded),
    BloodCollected(BloodCollected),
    TestPassed(TestPassed),
    TestFailed(TestFailed),
}

impl Event for DonationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            DonationEvent::DonationRequested(_) => "donation.process.created",
            DonationEvent::DonationReviewed(_) => "donation.process.reviewed",
            DonationEvent::AppointmentScheduled(_) => "donation.process.appointment_scheduled",
            DonationEvent::HealthCheckRecorded(_) => "donation.process.health_check_recorded",
            DonationEvent::BloodCollected(_) => "donation.process.blood_collected",
            DonationEvent::TestPassed(_) => "donation.process.test_passed",
            DonationEvent::TestFailed(_) => "donation.process.test_failed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            DonationEvent::DonationRequested(e) => e.occurred_at,
            DonationEvent::DonationReviewed(e) => e.occurred_at,
            DonationEvent::AppointmentScheduled(e) => e.occurred_at,
            DonationEvent::HealthCheckRecorded(e) => e.occurred_at,
            DonationEvent::BloodCollected(e) => e.occurred_at,
            DonationEvent::TestPassed(e) => e.occurred_at,
            DonationEvent::TestFailed(e) => e.occurred_at,
        }
    }
}

impl Aggregate for DonationProcess {
    type Command = DonationCommand;
    type Event = DonationEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            DonationEvent::DonationRequested(e) => {
                self.id = e.process_id;
                self.donor_id = Some(e.donor_id);
                self.status = DonationStatus::PendingApproval;
                self.note = None;
                self.collected_volume_ml = None;
                self.appointment_id = None;
                self.requested_at = Some(e.occurred_at);
                self.created = true;
            }
            DonationEvent::DonationReviewed(e) => {
                self.status = e.new_status;
                self.note = e.note.clone();
            }
            DonationEvent::AppointmentScheduled(e) => {
                self.status = DonationStatus::AppointmentScheduled;
                self.appointment_id = Some(e.appointment_id);
            }
            DonationEvent::HealthCheckRecorded(e) => {
                self.status = if e.passed {
                    DonationStatus::HealthCheckPassed
                } else {
                    DonationStatus::HealthCheckFailed
                };
                self.note = Some(e.note.clone());
            }
            DonationEvent::BloodCollected(e) => {
                self.status = DonationStatus::BloodCollected;
                self.collected_volume_ml = Some(e.volume_ml);
                self.note = Some(e.note.clone());
            }
            DonationEvent::TestPassed(e) => {
                self.status = DonationStatus::Completed;
                self.note = Some(e.note.clone());
            }
            DonationEvent::TestFailed(e) => {
                self.status = DonationStatus::TestingFailed;
                self.note = Some(e.note.clone());
            }
        }

        self.updated_at = Some(event.occurred_at());
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            DonationCommand::CreateDonationRequest(cmd) => self.handle_create(cmd),
            DonationCommand::ReviewDonationRequest(cmd) => self.handle_review(cmd),
            DonationCommand::ConfirmAppointmentScheduled(cmd) => self.handle_schedule(cmd),
            DonationCommand::RecordHealthCheck(cmd) => self.handle_health_check(cmd),
            DonationCommand::MarkBloodCollected(cmd) => self.handle_collect(cmd),
            DonationCommand::RecordTestResult(cmd) => self.handle_test_result(cmd),
        }
    }
}

impl DonationProcess {
    fn ensure_process(&self, process_id: DonationProcessId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found(format!(
                "donation process not found with id: {process_id}"
            )));
        }
        if self.id != process_id {
            return Err(DomainError::invalid_argument("process_id mismatch"));
        }
        Ok(())
    }

    fn ensure_status(&self, expected: DonationStatus, msg: &str) -> Result<(), DomainError> {
        if self.status != expected {
            return Err(DomainError::state_conflict(format!(
                "{msg} (current status: {})",
                self.status
            )));
        }
        Ok(())
    }

    fn handle_create(
        &self,
        cmd: &CreateDonationRequest,
    ) -> Result<Vec<DonationEvent>, DomainError> {
        if self.created {
            return Err(DomainError::state_conflict("donation process already exists"));
        }

        Ok(vec![DonationEvent::DonationRequested(DonationRequested {
            process_id: cmd.process_id,
            donor_id: cmd.donor_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_review(
        &self,
        cmd: &ReviewDonationRequest,
    ) -> Result<Vec<DonationEvent>, DomainError> {
        self.ensure_process(cmd.process_id)?;
        self.ensure_status(
            DonationStatus::PendingApproval,
            "this request is not pending approval",
        )?;

        if !matches!(
            cmd.new_status,
            DonationStatus::Rejected | DonationStatus::AppointmentPending
        ) {
            return Err(DomainError::invalid_argument(format!(
                "invalid status {}: only REJECTED or APPOINTMENT_PENDING are allowed",
                cmd.new_status
            )));
        }

        Ok(vec![DonationEvent::DonationReviewed(DonationReviewed {
            process_id: cmd.process_id,
            new_status: cmd.new_status,
            note: cmd.note.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_schedule(
        &self,
        cmd: &ConfirmAppointmentScheduled,
    ) -> Result<Vec<DonationEvent>, DomainError> {
        self.ensure_process(cmd.process_id)?;
        self.ensure_status(
            DonationStatus::AppointmentPending,
            "an appointment can only be scheduled for an approved request",
        )?;

        Ok(vec![DonationEvent::AppointmentScheduled(AppointmentScheduled {
            process_id: cmd.process_id,
            appointment_id: cmd.appointment_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_health_check(
        &self,
        cmd: &RecordHealthCheck,
    ) -> Result<Vec<DonationEvent>, DomainError> {
        self.ensure_process(cmd.process_id)?;
        self.ensure_status(
            DonationStatus::AppointmentScheduled,
            "cannot record health check for a process that is not in scheduled state",
        )?;

        let note = if cmd.is_eligible {
            "Health check recorded. Result: Passed."
        } else {
            "Health check recorded. Result: Failed."
        };

        Ok(vec![DonationEvent::HealthCheckRecorded(HealthCheckRecorded {
            process_id: cmd.process_id,
            health_check_id: cmd.health_check_id,
            passed: cmd.is_eligible,
            note: note.to_string(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_collect(&self, cmd: &MarkBloodCollected) -> Result<Vec<DonationEvent>, DomainError> {
        self.ensure_process(cmd.process_id)?;
        self.ensure_status(
            DonationStatus::HealthCheckPassed,
            "blood can only be collected after a passed health check",
        )?;

        if self.collected_volume_ml.is_some() {
            return Err(DomainError::state_conflict("collected volume is already recorded"));
        }
        if cmd.volume_ml == 0 {
            return Err(DomainError::invalid_argument("collected volume must be positive"));
        }

        Ok(vec![DonationEvent::BloodCollected(BloodCollected {
            process_id: cmd.process_id,
            volume_ml: cmd.volume_ml,
            note: format!(
                "Blood collected ({}ml). Awaiting test results.",
                cmd.volume_ml
            ),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_test_result(
        &self,
        cmd: &RecordTestResult,
    ) -> Result<Vec<DonationEvent>, DomainError> {
        self.ensure_process(cmd.process_id)?;
        self.ensure_status(
            DonationStatus::BloodCollected,
            "cannot record test results for blood that has not been collected",
        )?;

        if cmd.unit_id.is_blank() {
            return Err(DomainError::invalid_argument("blood unit id cannot be empty"));
        }

        let event = match &cmd.outcome {
            TestOutcome::Safe => DonationEvent::TestPassed(TestPassed {
                process_id: cmd.process_id,
                unit_id: cmd.unit_id.clone(),
                note: format!(
                    "Blood unit {} passed tests and added to inventory.",
                    cmd.unit_id
                ),
                occurred_at: cmd.occurred_at,
            }),
            TestOutcome::Unsafe { notes } => DonationEvent::TestFailed(TestFailed {
                process_id: cmd.process_id,
                unit_id: cmd.unit_id.clone(),
                note: format!(
                    "Blood unit {} failed testing. Reason: {}",
                    cmd.unit_id, notes
                ),
                occurred_at: cmd.occurred_at,
            }),
        };

        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hemaflow_core::ErrorKind;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn created() -> DonationProcess {
        let process_id = DonationProcessId::new();
        let mut process = DonationProcess::empty(process_id);
        process
            .execute(&DonationCommand::CreateDonationRequest(CreateDonationRequest {
                process_id,
                donor_id: UserId::new(),
                occurred_at: test_time(),
            }))
            .unwrap();
        process
    }

    fn review(p: &DonationProcess, new_status: DonationStatus) -> DonationCommand {
        DonationCommand::ReviewDonationRequest(ReviewDonationRequest {
            process_id: p.id_typed(),
            new_status,
            note: Some("looks good".to_string()),
            occurred_at: test_time(),
        })
    }

    fn schedule(p: &DonationProcess) -> DonationCommand {
        DonationCommand::ConfirmAppointmentScheduled(ConfirmAppointmentScheduled {
            process_id: p.id_typed(),
            appointment_id: AppointmentId::new(),
            occurred_at: test_time(),
        })
    }

    fn health_check(p: &DonationProcess, is_eligible: bool) -> DonationCommand {
        DonationCommand::RecordHealthCheck(RecordHealthCheck {
            process_id: p.id_typed(),
            health_check_id: HealthCheckId::new(),
            is_eligible,
            occurred_at: test_time(),
        })
    }

    fn collect(p: &DonationProcess, volume_ml: u32) -> DonationCommand {
        DonationCommand::MarkBloodCollected(MarkBloodCollected {
            process_id: p.id_typed(),
            volume_ml,
            occurred_at: test_time(),
        })
    }

    fn test_result(p: &DonationProcess, outcome: TestOutcome) -> DonationCommand {
        DonationCommand::RecordTestResult(RecordTestResult {
            process_id: p.id_typed(),
            unit_id: InventoryUnitId::new("U1"),
            outcome,
            occurred_at: test_time(),
        })
    }

    fn collected() -> DonationProcess {
        let mut p = created();
        p.execute(&review(&p, DonationStatus::AppointmentPending)).unwrap();
        p.execute(&schedule(&p)).unwrap();
        p.execute(&health_check(&p, true)).unwrap();
        p.execute(&collect(&p, 450)).unwrap();
        p
    }

    #[test]
    fn create_emits_donation_requested() {
        let process_id = DonationProcessId::new();
        let donor_id = UserId::new();
        let process = DonationProcess::empty(process_id);

        let events = process
            .handle(&DonationCommand::CreateDonationRequest(CreateDonationRequest {
                process_id,
                donor_id,
                occurred_at: test_time(),
            }))
            .unwrap();

        assert_eq!(events.len(), 1);
        match &events[0] {
            DonationEvent::DonationRequested(e) => {
                assert_eq!(e.process_id, process_id);
                assert_eq!(e.donor_id, donor_id);
            }
            _ => panic!("Expected DonationRequested event"),
        }
    }

    #[test]
    fn new_request_starts_pending_without_note_or_volume() {
        let p = created();
        assert_eq!(p.status(), DonationStatus::PendingApproval);
        assert_eq!(p.note(), None);
        assert_eq!(p.collected_volume_ml(), None);
        assert_eq!(p.version(), 1);
    }

    #[test]
    fn commands_on_missing_process_are_not_found() {
        let p = DonationProcess::empty(DonationProcessId::new());
        let err = p.handle(&collect(&p, 450)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn creating_twice_is_a_conflict() {
        let p = created();
        let err = p
            .handle(&DonationCommand::CreateDonationRequest(CreateDonationRequest {
                process_id: p.id_typed(),
                donor_id: UserId::new(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
    }

    #[test]
    fn review_sets_status_and_note() {
        let mut p = created();
        p.execute(&review(&p, DonationStatus::Rejected)).unwrap();
        assert_eq!(p.status(), DonationStatus::Rejected);
        assert_eq!(p.note(), Some("looks good"));
    }

    #[test]
    fn review_rejects_other_target_statuses() {
        let p = created();
        for target in DonationStatus::ALL {
            if matches!(
                target,
                DonationStatus::Rejected | DonationStatus::AppointmentPending
            ) {
                continue;
            }
            let err = p.handle(&review(&p, target)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{target}");
        }
    }

    #[test]
    fn review_after_approval_is_state_conflict_even_for_bad_target() {
        let mut p = created();
        p.execute(&review(&p, DonationStatus::AppointmentPending)).unwrap();
        let err = p.handle(&review(&p, DonationStatus::Completed)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
    }

    #[test]
    fn health_check_requires_scheduled_appointment() {
        let mut p = created();
        p.execute(&review(&p, DonationStatus::AppointmentPending)).unwrap();
        let err = p.handle(&health_check(&p, true)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
    }

    #[test]
    fn failed_health_check_is_terminal() {
        let mut p = created();
        p.execute(&review(&p, DonationStatus::AppointmentPending)).unwrap();
        p.execute(&schedule(&p)).unwrap();
        p.execute(&health_check(&p, false)).unwrap();
        assert_eq!(p.status(), DonationStatus::HealthCheckFailed);
        assert_eq!(p.note(), Some("Health check recorded. Result: Failed."));

        let err = p.handle(&collect(&p, 450)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
    }

    #[test]
    fn second_health_check_is_rejected() {
        let mut p = created();
        p.execute(&review(&p, DonationStatus::AppointmentPending)).unwrap();
        p.execute(&schedule(&p)).unwrap();
        p.execute(&health_check(&p, true)).unwrap();
        let err = p.handle(&health_check(&p, false)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        assert_eq!(p.status(), DonationStatus::HealthCheckPassed);
    }

    #[test]
    fn collection_records_volume_and_summary() {
        let p = collected();
        assert_eq!(p.status(), DonationStatus::BloodCollected);
        assert_eq!(p.collected_volume_ml(), Some(450));
        assert_eq!(p.note(), Some("Blood collected (450ml). Awaiting test results."));
    }

    #[test]
    fn zero_volume_is_invalid_argument() {
        let mut p = created();
        p.execute(&review(&p, DonationStatus::AppointmentPending)).unwrap();
        p.execute(&schedule(&p)).unwrap();
        p.execute(&health_check(&p, true)).unwrap();
        let err = p.handle(&collect(&p, 0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn collecting_from_pending_approval_leaves_process_unchanged() {
        let mut p = created();
        let before = p.clone();
        let err = p.execute(&collect(&p, 450)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        assert_eq!(p, before);
    }

    #[test]
    fn safe_result_completes_with_unit_reference() {
        let mut p = collected();
        p.execute(&test_result(&p, TestOutcome::Safe)).unwrap();
        assert_eq!(p.status(), DonationStatus::Completed);
        assert_eq!(p.note(), Some("Blood unit U1 passed tests and added to inventory."));
        assert_eq!(p.collected_volume_ml(), Some(450));
    }

    #[test]
    fn unsafe_result_records_reason() {
        let mut p = collected();
        p.execute(&test_result(
            &p,
            TestOutcome::Unsafe {
                notes: "HBV reactive".to_string(),
            },
        ))
        .unwrap();
        assert_eq!(p.status(), DonationStatus::TestingFailed);
        assert_eq!(
            p.note(),
            Some("Blood unit U1 failed testing. Reason: HBV reactive")
        );
    }

    #[test]
    fn blank_unit_id_is_invalid_argument() {
        let p = collected();
        let cmd = DonationCommand::RecordTestResult(RecordTestResult {
            process_id: p.id_typed(),
            unit_id: InventoryUnitId::new("  "),
            outcome: TestOutcome::Safe,
            occurred_at: test_time(),
        });
        assert_eq!(p.handle(&cmd).unwrap_err().kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let p = collected();
        let before = p.clone();
        let events1 = p.handle(&test_result(&p, TestOutcome::Safe)).unwrap();
        assert_eq!(p, before);
        assert_eq!(events1.len(), 1);
    }

    #[test]
    fn apply_is_deterministic() {
        let process_id = DonationProcessId::new();
        let at = test_time();
        let events = vec![
            DonationEvent::DonationRequested(DonationRequested {
                process_id,
                donor_id: UserId::new(),
                occurred_at: at,
            }),
            DonationEvent::DonationReviewed(DonationReviewed {
                process_id,
                new_status: DonationStatus::AppointmentPending,
                note: None,
                occurred_at: at,
            }),
        ];

        let mut a = DonationProcess::empty(process_id);
        let mut b = DonationProcess::empty(process_id);
        for e in &events {
            a.apply(e);
            b.apply(e);
        }
        assert_eq!(a, b);
        assert_eq!(a.version(), 2);
        assert_eq!(a.status(), DonationStatus::AppointmentPending);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        /// Drive a fresh process to `target` along the happy edges.
        fn process_in(target: DonationStatus) -> DonationProcess {
            use DonationStatus::*;
            let mut p = created();
            let path: &[DonationStatus] = match target {
                PendingApproval => &[],
                Rejected => &[Rejected],
                AppointmentPending => &[AppointmentPending],
                AppointmentScheduled => &[AppointmentPending, AppointmentScheduled],
                HealthCheckPassed => &[AppointmentPending, AppointmentScheduled, HealthCheckPassed],
                HealthCheckFailed => &[AppointmentPending, AppointmentScheduled, HealthCheckFailed],
                BloodCollected => &[
                    AppointmentPending,
                    AppointmentScheduled,
                    HealthCheckPassed,
                    BloodCollected,
                ],
                Completed => &[
                    AppointmentPending,
                    AppointmentScheduled,
                    HealthCheckPassed,
                    BloodCollected,
                    Completed,
                ],
                TestingFailed => &[
                    AppointmentPending,
                    AppointmentScheduled,
                    HealthCheckPassed,
                    BloodCollected,
                    TestingFailed,
                ],
            };
            for step in path {
                let cmd = command_towards(&p, *step);
                p.execute(&cmd).unwrap();
            }
            assert_eq!(p.status(), target);
            p
        }

        /// The command whose success would move a process into `next`.
        fn command_towards(p: &DonationProcess, next: DonationStatus) -> DonationCommand {
            use DonationStatus::*;
            match next {
                Rejected | AppointmentPending => review(p, next),
                AppointmentScheduled => schedule(p),
                HealthCheckPassed => health_check(p, true),
                HealthCheckFailed => health_check(p, false),
                BloodCollected => collect(p, 450),
                Completed => test_result(p, TestOutcome::Safe),
                TestingFailed => test_result(
                    p,
                    TestOutcome::Unsafe {
                        notes: "reactive".to_string(),
                    },
                ),
                // No command targets the initial status; reviewing towards it is invalid input.
                PendingApproval => review(p, PendingApproval),
            }
        }

        fn any_status() -> impl Strategy<Value = DonationStatus> {
            prop::sample::select(DonationStatus::ALL.to_vec())
        }

        proptest! {
            /// Property: a command succeeds exactly when the edge exists in the graph,
            /// and failures leave status, note and volume untouched.
            #[test]
            fn only_graph_edges_succeed(from in any_status(), to in any_status()) {
                let mut p = process_in(from);
                let before = p.clone();
                let cmd = command_towards(&p, to);

                match p.execute(&cmd) {
                    Ok(_) => {
                        prop_assert!(from.can_transition_to(to));
                        prop_assert_eq!(p.status(), to);
                    }
                    Err(err) => {
                        prop_assert!(!from.can_transition_to(to));
                        prop_assert_eq!(&p, &before);
                        if from == DonationStatus::PendingApproval && to == DonationStatus::PendingApproval {
                            // Right state, wrong target value.
                            prop_assert_eq!(err.kind(), ErrorKind::InvalidArgument);
                        } else {
                            prop_assert_eq!(err.kind(), ErrorKind::StateConflict);
                        }
                    }
                }
            }
        }
    }
}
