//! Read models returned by the workflow's query operations.

use chrono::{DateTime, Utc};
use serde::Serialize;

use hemaflow_core::{DonationProcessId, UserId};
use hemaflow_donation::{DonationProcess, DonationStatus};
use hemaflow_inventory::BloodType;

use crate::collaborators::{AppointmentSummary, Donor};

/// Donor fields exposed alongside a donation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DonorSummary {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub blood_type: Option<BloodType>,
}

impl From<&Donor> for DonorSummary {
    fn from(donor: &Donor) -> Self {
        Self {
            id: donor.id,
            full_name: donor.full_name.clone(),
            email: donor.email.clone(),
            blood_type: donor.blood_type,
        }
    }
}

/// A donation process enriched with its donor and appointment.
///
/// `donor` and `appointment` are `None` when the owning service no longer
/// knows the referenced record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DonationProcessView {
    pub id: DonationProcessId,
    pub status: DonationStatus,
    pub note: Option<String>,
    pub collected_volume_ml: Option<u32>,
    pub requested_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub donor: Option<DonorSummary>,
    pub appointment: Option<AppointmentSummary>,
}

impl DonationProcessView {
    pub fn from_parts(
        process: &DonationProcess,
        donor: Option<&Donor>,
        appointment: Option<AppointmentSummary>,
    ) -> Self {
        Self {
            id: process.id_typed(),
            status: process.status(),
            note: process.note().map(str::to_string),
            collected_volume_ml: process.collected_volume_ml(),
            requested_at: process.requested_at(),
            updated_at: process.updated_at(),
            donor: donor.map(DonorSummary::from),
            appointment,
        }
    }
}
