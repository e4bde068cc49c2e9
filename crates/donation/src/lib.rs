//! Donation workflow domain module.
//!
//! This crate contains the donation process state machine and the health check
//! record, implemented purely as deterministic domain logic (no IO, no HTTP, no
//! storage).

pub mod health_check;
pub mod process;
pub mod status;

pub use health_check::{HealthCheckData, HealthCheckRecord};
pub use process::{
    AppointmentScheduled, BloodCollected, ConfirmAppointmentScheduled, CreateDonationRequest,
    DonationCommand, DonationEvent, DonationProcess, DonationRequested, DonationReviewed,
    HealthCheckRecorded, MarkBloodCollected, RecordHealthCheck, RecordTestResult,
    ReviewDonationRequest, TestFailed, TestOutcome, TestPassed,
};
pub use status::DonationStatus;
