use std::collections::HashMap;

use crate::core::error::GatewayError;
use crate::upstreams::target::Capability;

/// Which caller parameters a capability needs before any upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Every listed parameter must be present.
    All(&'static [(&'static str, &'static str)]),
    /// At least one listed parameter must be present.
    AnyOf(&'static [(&'static str, &'static str)]),
}

impl Capability {
    /// Required parameters as `(name, description)` pairs.
    pub fn requirement(&self) -> Requirement {
        match self {
            Capability::Fertilizer => Requirement::All(&[("cropCode", "crop code")]),
            Capability::WeatherForecast => Requirement::All(&[("regId", "region code")]),
            Capability::WeatherObservation => {
                Requirement::All(&[("spotCode", "observation spot code"), ("date", "observation date")])
            }
            Capability::Pest => Requirement::AnyOf(&[("cropName", "crop name"), ("pestName", "pest name")]),
        }
    }
}

/// One inbound request, reduced to its non-empty query parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CallerRequest {
    pub capability: Capability,
    pub params: HashMap<String, String>,
}

impl CallerRequest {
    /// Drops parameters whose value is empty or whitespace.
    pub fn new(capability: Capability, raw: HashMap<String, String>) -> Self {
        let params = raw
            .into_iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .collect();
        Self { capability, params }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Checks the capability's required parameters.
    ///
    /// # Errors
    /// Returns [`GatewayError::Validation`] naming every missing field.
    pub fn validate(&self) -> Result<(), GatewayError> {
        match self.capability.requirement() {
            Requirement::All(fields) => {
                let missing: Vec<_> = fields
                    .iter()
                    .filter(|(name, _)| self.get(name).is_none())
                    .collect();
                if missing.is_empty() {
                    return Ok(());
                }
                let described: Vec<String> = missing
                    .iter()
                    .map(|(name, desc)| format!("{} ({})", name, desc))
                    .collect();
                Err(GatewayError::Validation {
                    fields: missing.iter().map(|(name, _)| name.to_string()).collect(),
                    message: format!("Missing required query parameter: {}", described.join(", ")),
                })
            }
            Requirement::AnyOf(fields) => {
                if fields.iter().any(|(name, _)| self.get(name).is_some()) {
                    return Ok(());
                }
                let described: Vec<String> = fields
                    .iter()
                    .map(|(name, desc)| format!("{} ({})", name, desc))
                    .collect();
                Err(GatewayError::Validation {
                    fields: fields.iter().map(|(name, _)| name.to_string()).collect(),
                    message: format!("Provide at least one query parameter: {}", described.join(" or ")),
                })
            }
        }
    }
}
