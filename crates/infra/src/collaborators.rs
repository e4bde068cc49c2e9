//! Interfaces of the services this core relies on but does not own.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hemaflow_core::{AppointmentId, UserId};
use hemaflow_inventory::BloodType;

/// A registered user acting as donor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donor {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub blood_type: Option<BloodType>,
}

/// Resolves who is acting and who a process belongs to.
///
/// Authentication happens upstream; `current_user` is trusted as returned.
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Donor;

    fn find_user(&self, id: UserId) -> Option<Donor>;
}

/// Presentation record for an appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentSummary {
    pub id: AppointmentId,
    pub scheduled_for: DateTime<Utc>,
    pub location: String,
}

/// Read-only view onto the appointment service, used for enrichment.
pub trait AppointmentService: Send + Sync {
    fn summarize(&self, appointment_id: AppointmentId) -> Option<AppointmentSummary>;
}

impl<T> IdentityProvider for Arc<T>
where
    T: IdentityProvider + ?Sized,
{
    fn current_user(&self) -> Donor {
        (**self).current_user()
    }

    fn find_user(&self, id: UserId) -> Option<Donor> {
        (**self).find_user(id)
    }
}

impl<T> AppointmentService for Arc<T>
where
    T: AppointmentService + ?Sized,
{
    fn summarize(&self, appointment_id: AppointmentId) -> Option<AppointmentSummary> {
        (**self).summarize(appointment_id)
    }
}
