//! # Configuration
//!
//! Where the service lives and which path serves each scenario. Paths are
//! data, so a new service version only needs a new endpoint file.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cases::{IdSource, MAX_ID};
use crate::error::HarnessError;
use crate::http::BaseConfig;
use crate::scenarios::Scenario;
use crate::testing::RunMode;

/// Endpoint path for every scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct EndpointMap {
    pub send_message_success: String,
    pub send_message_missing_field: String,
    pub cancel_message_invalid_id: String,
    pub cancel_message_valid_id: String,
    pub read_message: String,
}

impl Default for EndpointMap {
    fn default() -> Self {
        Self {
            send_message_success: "/bb697acc-6196-4573-a3a2-eb9cd2cf0cd2".to_string(),
            send_message_missing_field: "/991e0503-e3c6-47e5-8c0d-da9442c25126".to_string(),
            cancel_message_invalid_id: "/abf93805-65c1-43bd-a876-9a74aed6aea0".to_string(),
            cancel_message_valid_id: "/66c59f37-a99f-45c6-8cc4-4351b98aae23".to_string(),
            read_message: "/8659e175-c9c9-4a76-ac2a-e6d18cb39a22".to_string(),
        }
    }
}

impl EndpointMap {
    pub fn path(&self, scenario: Scenario) -> &str {
        match scenario {
            Scenario::SendMessageSuccess => &self.send_message_success,
            Scenario::SendMessageMissingField => &self.send_message_missing_field,
            Scenario::CancelMessageInvalidId => &self.cancel_message_invalid_id,
            Scenario::CancelMessageValidId => &self.cancel_message_valid_id,
            Scenario::ReadMessage => &self.read_message,
        }
    }

    /// Parse a JSON object keyed by scenario name. Keys left out keep their
    /// default path.
    pub fn from_json(raw: &str) -> Result<Self, HarnessError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, HarnessError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            HarnessError::Config(format!(
                "failed to read endpoint file `{}`: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&raw)
    }
}

/// Everything a suite run needs.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub base: BaseConfig,
    pub endpoints: EndpointMap,
    pub ids: IdSource,
    pub run_mode: RunMode,
    pub scenarios: Vec<Scenario>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base: BaseConfig::default(),
            endpoints: EndpointMap::default(),
            ids: IdSource::default(),
            run_mode: RunMode::Serial,
            scenarios: Scenario::ALL.to_vec(),
        }
    }
}

impl HarnessConfig {
    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.base.base_uri.trim().is_empty() {
            return Err(HarnessError::Config("base URI cannot be empty".to_string()));
        }
        if self.base.deadline == Some(Duration::ZERO) {
            return Err(HarnessError::Config(
                "deadline must be greater than zero".to_string(),
            ));
        }
        for scenario in Scenario::ALL {
            if self.endpoints.path(scenario).trim().is_empty() {
                return Err(HarnessError::Config(format!(
                    "endpoint path for `{}` cannot be empty",
                    scenario.name()
                )));
            }
        }
        let no_ids = match &self.ids {
            IdSource::Seeded { count, .. } => *count == 0,
            IdSource::Fixed(ids) => ids.is_empty(),
            IdSource::Boundary => false,
        };
        if no_ids {
            return Err(HarnessError::Config(
                "at least one message id is required".to_string(),
            ));
        }
        if let IdSource::Fixed(ids) = &self.ids {
            if let Some(id) = ids.iter().find(|id| !(0..MAX_ID).contains(*id)) {
                return Err(HarnessError::Config(format!(
                    "message id {id} is outside 0..{MAX_ID}"
                )));
            }
        }
        if self.scenarios.is_empty() {
            return Err(HarnessError::Config(
                "at least one scenario must be selected".to_string(),
            ));
        }
        Ok(())
    }
}
