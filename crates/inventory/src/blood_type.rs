//! ABO/Rh blood types and their shelf-life reference data.

use std::collections::HashMap;

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use hemaflow_core::{DomainError, DomainResult, ValueObject};

/// Shelf life applied to every type unless the catalog overrides it.
pub const DEFAULT_SHELF_LIFE_DAYS: u32 = 35;

/// ABO group with Rh factor.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodType {
    pub const ALL: [BloodType; 8] = [
        BloodType::APositive,
        BloodType::ANegative,
        BloodType::BPositive,
        BloodType::BNegative,
        BloodType::AbPositive,
        BloodType::AbNegative,
        BloodType::OPositive,
        BloodType::ONegative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BloodType::APositive => "A+",
            BloodType::ANegative => "A-",
            BloodType::BPositive => "B+",
            BloodType::BNegative => "B-",
            BloodType::AbPositive => "AB+",
            BloodType::AbNegative => "AB-",
            BloodType::OPositive => "O+",
            BloodType::ONegative => "O-",
        }
    }
}

impl ValueObject for BloodType {}

impl core::fmt::Display for BloodType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        BloodType::ALL
            .into_iter()
            .find(|bt| bt.as_str() == normalized)
            .ok_or_else(|| DomainError::invalid_argument(format!("unknown blood type '{s}'")))
    }
}

/// Blood type → shelf life in days.
///
/// Every type always resolves; overrides replace the default for one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloodTypeCatalog {
    shelf_life_days: HashMap<BloodType, u32>,
}

impl BloodTypeCatalog {
    /// Catalog with [`DEFAULT_SHELF_LIFE_DAYS`] for every type.
    pub fn standard() -> Self {
        Self {
            shelf_life_days: BloodType::ALL
                .into_iter()
                .map(|bt| (bt, DEFAULT_SHELF_LIFE_DAYS))
                .collect(),
        }
    }

    /// Override the shelf life of one type. Zero days is rejected.
    pub fn with_shelf_life(mut self, blood_type: BloodType, days: u32) -> DomainResult<Self> {
        if days == 0 {
            return Err(DomainError::invalid_argument(format!(
                "shelf life for {blood_type} must be positive"
            )));
        }
        self.shelf_life_days.insert(blood_type, days);
        Ok(self)
    }

    pub fn shelf_life_days(&self, blood_type: BloodType) -> u32 {
        self.shelf_life_days
            .get(&blood_type)
            .copied()
            .unwrap_or(DEFAULT_SHELF_LIFE_DAYS)
    }
}

impl Default for BloodTypeCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
