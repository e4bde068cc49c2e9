use serde::{Deserialize, Serialize};

/// Donation process status lifecycle.
///
/// ```text
/// PENDING_APPROVAL ─┬─> REJECTED
///                   └─> APPOINTMENT_PENDING ─> APPOINTMENT_SCHEDULED ─┬─> HEALTH_CHECK_FAILED
///                                                                     └─> HEALTH_CHECK_PASSED ─> BLOOD_COLLECTED ─┬─> COMPLETED
///                                                                                                                 └─> TESTING_FAILED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DonationStatus {
    PendingApproval,
    Rejected,
    AppointmentPending,
    AppointmentScheduled,
    HealthCheckPassed,
    HealthCheckFailed,
    BloodCollected,
    Completed,
    TestingFailed,
}

impl DonationStatus {
    pub const ALL: [DonationStatus; 9] = [
        DonationStatus::PendingApproval,
        DonationStatus::Rejected,
        DonationStatus::AppointmentPending,
        DonationStatus::AppointmentScheduled,
        DonationStatus::HealthCheckPassed,
        DonationStatus::HealthCheckFailed,
        DonationStatus::BloodCollected,
        DonationStatus::Completed,
        DonationStatus::TestingFailed,
    ];

    /// Statuses directly reachable from `self`.
    pub fn successors(self) -> &'static [DonationStatus] {
        use DonationStatus::*;
        match self {
            PendingApproval => &[Rejected, AppointmentPending],
            AppointmentPending => &[AppointmentScheduled],
            AppointmentScheduled => &[HealthCheckPassed, HealthCheckFailed],
            HealthCheckPassed => &[BloodCollected],
            BloodCollected => &[Completed, TestingFailed],
            Rejected | HealthCheckFailed | Completed | TestingFailed => &[],
        }
    }

    pub fn can_transition_to(self, next: DonationStatus) -> bool {
        self.successors().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::PendingApproval => "PENDING_APPROVAL",
            DonationStatus::Rejected => "REJECTED",
            DonationStatus::AppointmentPending => "APPOINTMENT_PENDING",
            DonationStatus::AppointmentScheduled => "APPOINTMENT_SCHEDULED",
            DonationStatus::HealthCheckPassed => "HEALTH_CHECK_PASSED",
            DonationStatus::HealthCheckFailed => "HEALTH_CHECK_FAILED",
            DonationStatus::BloodCollected => "BLOOD_COLLECTED",
            DonationStatus::Completed => "COMPLETED",
            DonationStatus::TestingFailed => "TESTING_FAILED",
        }
    }
}

impl core::fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
