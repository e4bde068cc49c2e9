//! Pre-donation medical screening.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hemaflow_core::{DomainError, DomainResult, DonationProcessId, Entity, HealthCheckId, ValueObject};

/// Screening measurements taken at the appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckData {
    pub weight_kg: f32,
    pub systolic_mmhg: u16,
    pub diastolic_mmhg: u16,
    pub pulse_bpm: u16,
    pub hemoglobin_g_dl: f32,
    pub temperature_c: f32,
    pub notes: Option<String>,
}

impl ValueObject for HealthCheckData {}

impl HealthCheckData {
    /// Reject measurements that cannot have come from a real reading.
    pub fn validate(&self) -> DomainResult<()> {
        let positive = [
            ("weight_kg", self.weight_kg),
            ("hemoglobin_g_dl", self.hemoglobin_g_dl),
            ("temperature_c", self.temperature_c),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(DomainError::invalid_argument(format!(
                    "{field} must be a positive number"
                )));
            }
        }
        if self.systolic_mmhg == 0 || self.diastolic_mmhg == 0 || self.pulse_bpm == 0 {
            return Err(DomainError::invalid_argument(
                "blood pressure and pulse must be positive",
            ));
        }
        if self.diastolic_mmhg >= self.systolic_mmhg {
            return Err(DomainError::invalid_argument(
                "diastolic pressure must be below systolic pressure",
            ));
        }
        Ok(())
    }
}

/// Entity: one recorded screening, immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckRecord {
    id: HealthCheckId,
    donation_process_id: DonationProcessId,
    data: HealthCheckData,
    is_eligible: bool,
    recorded_at: DateTime<Utc>,
}

impl HealthCheckRecord {
    pub fn new(
        id: HealthCheckId,
        donation_process_id: DonationProcessId,
        data: HealthCheckData,
        is_eligible: bool,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            donation_process_id,
            data,
            is_eligible,
            recorded_at,
        }
    }

    pub fn id_typed(&self) -> HealthCheckId {
        self.id
    }

    pub fn donation_process_id(&self) -> DonationProcessId {
        self.donation_process_id
    }

    pub fn data(&self) -> &HealthCheckData {
        &self.data
    }

    pub fn is_eligible(&self) -> bool {
        self.is_eligible
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

impl Entity for HealthCheckRecord {
    type Id = HealthCheckId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
