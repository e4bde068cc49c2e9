//! Configuration loading and representation.

use std::collections::HashMap;

use anyhow::Context;
use serde::Deserialize;

use hemaflow_core::DomainResult;
use hemaflow_inventory::{BloodType, BloodTypeCatalog, DEFAULT_STORAGE_LOCATION};

pub const STORAGE_LOCATION_VAR: &str = "HEMAFLOW_STORAGE_LOCATION";
pub const SHELF_LIFE_OVERRIDES_VAR: &str = "HEMAFLOW_SHELF_LIFE_OVERRIDES";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HemaflowConfig {
    /// Location recorded on newly stocked units.
    pub storage_location: String,
    /// Shelf life in days per blood type, replacing the catalog default.
    pub shelf_life_overrides: HashMap<BloodType, u32>,
}

impl Default for HemaflowConfig {
    fn default() -> Self {
        Self {
            storage_location: DEFAULT_STORAGE_LOCATION.to_string(),
            shelf_life_overrides: HashMap::new(),
        }
    }
}

impl HemaflowConfig {
    /// Read from the process environment. Malformed values fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(location) = lookup(STORAGE_LOCATION_VAR) {
            let location = location.trim();
            if location.is_empty() {
                tracing::warn!("{STORAGE_LOCATION_VAR} is blank; using '{DEFAULT_STORAGE_LOCATION}'");
            } else {
                config.storage_location = location.to_string();
            }
        }

        if let Some(raw) = lookup(SHELF_LIFE_OVERRIDES_VAR) {
            match parse_overrides(&raw) {
                Ok(overrides) => config.shelf_life_overrides = overrides,
                Err(err) => {
                    tracing::warn!("ignoring {SHELF_LIFE_OVERRIDES_VAR}: {err:#}");
                }
            }
        }

        config
    }

    /// Parse a whole config document, e.g. `{"storage_location": "Fridge 2"}`.
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw).context("invalid hemaflow config")
    }

    pub fn catalog(&self) -> DomainResult<BloodTypeCatalog> {
        let mut overrides: Vec<_> = self.shelf_life_overrides.iter().collect();
        overrides.sort();
        overrides
            .into_iter()
            .try_fold(BloodTypeCatalog::standard(), |catalog, (blood_type, days)| {
                catalog.with_shelf_life(*blood_type, *days)
            })
    }
}

fn parse_overrides(raw: &str) -> anyhow::Result<HashMap<BloodType, u32>> {
    serde_json::from_str(raw)
        .with_context(|| format!("expected a JSON object like {{\"O+\": 35}}, got '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hemaflow_core::ErrorKind;
    use hemaflow_inventory::DEFAULT_SHELF_LIFE_DAYS;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    }

    #[test]
    fn defaults_without_environment() {
        let config = HemaflowConfig::from_lookup(|_| None);
        assert_eq!(config, HemaflowConfig::default());
        assert_eq!(config.storage_location, "Main Storage");
    }

    #[test]
    fn reads_location_and_overrides() {
        let config = HemaflowConfig::from_lookup(lookup_from(&[
            (STORAGE_LOCATION_VAR, "Cold Room B"),
            (SHELF_LIFE_OVERRIDES_VAR, r#"{"O-": 42, "AB+": 21}"#),
        ]));
        assert_eq!(config.storage_location, "Cold Room B");

        let catalog = config.catalog().unwrap();
        assert_eq!(catalog.shelf_life_days(BloodType::ONegative), 42);
        assert_eq!(catalog.shelf_life_days(BloodType::AbPositive), 21);
        assert_eq!(catalog.shelf_life_days(BloodType::APositive), DEFAULT_SHELF_LIFE_DAYS);
    }

    #[test]
    fn malformed_overrides_fall_back_to_defaults() {
        let config = HemaflowConfig::from_lookup(lookup_from(&[
            (STORAGE_LOCATION_VAR, "   "),
            (SHELF_LIFE_OVERRIDES_VAR, "O-=42"),
        ]));
        assert_eq!(config, HemaflowConfig::default());
    }

    #[test]
    fn zero_day_override_fails_catalog_build() {
        let config = HemaflowConfig::from_json(r#"{"shelf_life_overrides": {"B-": 0}}"#).unwrap();
        let err = config.catalog().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn json_document_fills_missing_fields_with_defaults() {
        let config = HemaflowConfig::from_json(r#"{"storage_location": "Fridge 2"}"#).unwrap();
        assert_eq!(config.storage_location, "Fridge 2");
        assert!(config.shelf_life_overrides.is_empty());
        assert!(HemaflowConfig::from_json("not json").is_err());
    }
}
