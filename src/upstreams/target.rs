//! # Upstream Targets
//!
//! One immutable [`TargetDescriptor`] per capability describes how to reach an
//! upstream: base endpoint, auth parameter, query bindings in declaration
//! order, response format and the path down to the payload. The
//! [`TargetCatalog`] is built once at startup from [`GatewayConfig`].

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::configs::GatewayConfig;
use crate::core::error::GatewayError;

pub const FERTILIZER_ENDPOINT: &str =
    "https://apis.data.go.kr/1390802/SoilEnviron/FrtlzrStdUse/getSoilFrtlzrQyList";
pub const FORECAST_ENDPOINT: &str =
    "http://apis.data.go.kr/1360000/MidFcstInfoService/getMidTa";
pub const OBSERVATION_ENDPOINT: &str =
    "http://apis.data.go.kr/1390802/AgriWeather/WeatherObsrInfo/V2/GnrlWeather/getWeatherTimeList";
pub const PEST_ENDPOINT: &str = "http://ncpms.rda.go.kr/npmsAPI/service";

/// The logical operations offered by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Fertilizer,
    WeatherForecast,
    WeatherObservation,
    Pest,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::Fertilizer,
        Capability::WeatherForecast,
        Capability::WeatherObservation,
        Capability::Pest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Fertilizer => "fertilizer",
            Capability::WeatherForecast => "weather_forecast",
            Capability::WeatherObservation => "weather_observation",
            Capability::Pest => "pest",
        }
    }

    /// Human-readable service name used in caller-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            Capability::Fertilizer => "fertilizer",
            Capability::WeatherForecast => "weather forecast",
            Capability::WeatherObservation => "weather observation",
            Capability::Pest => "pest",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    Xml,
    Json,
}

/// Where the value of one upstream query parameter comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamSource {
    /// A caller parameter that validation guarantees is present.
    Caller(&'static str),
    /// A caller parameter sent as an empty value when absent.
    OptionalCaller(&'static str),
    /// The resolved forecast-reference timestamp.
    ForecastTime,
    /// A constant the upstream expects on every call.
    Fixed(&'static str),
}

/// Maps one upstream parameter name to its value source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamBinding {
    pub upstream: &'static str,
    pub source: ParamSource,
}

impl ParamBinding {
    pub fn caller(logical: &'static str, upstream: &'static str) -> Self {
        Self { upstream, source: ParamSource::Caller(logical) }
    }

    pub fn optional(logical: &'static str, upstream: &'static str) -> Self {
        Self { upstream, source: ParamSource::OptionalCaller(logical) }
    }

    pub fn forecast_time(upstream: &'static str) -> Self {
        Self { upstream, source: ParamSource::ForecastTime }
    }

    pub fn fixed(upstream: &'static str, value: &'static str) -> Self {
        Self { upstream, source: ParamSource::Fixed(value) }
    }
}

/// Immutable description of one upstream target.
#[derive(Debug, Clone)]
pub struct TargetDescriptor {
    pub capability: Capability,
    pub base_url: Url,
    /// Upstream query parameter carrying the service key.
    pub auth_key_name: &'static str,
    pub auth_key: String,
    /// Query bindings, emitted in this order after the auth key.
    pub params: Vec<ParamBinding>,
    pub response_format: ResponseFormat,
    pub payload_path: Vec<&'static str>,
}

impl TargetDescriptor {
    /// The binding table for `capability`, pointed at `base_url`.
    pub fn for_capability(capability: Capability, base_url: Url, auth_key: impl Into<String>) -> Self {
        let auth_key = auth_key.into();
        match capability {
            Capability::Fertilizer => Self {
                capability,
                base_url,
                auth_key_name: "serviceKey",
                auth_key,
                params: vec![ParamBinding::caller("cropCode", "fstd_Crop_Code")],
                response_format: ResponseFormat::Xml,
                payload_path: vec!["response", "body", "items", "item"],
            },
            Capability::WeatherForecast => Self {
                capability,
                base_url,
                auth_key_name: "serviceKey",
                auth_key,
                params: vec![
                    ParamBinding::caller("regId", "regId"),
                    ParamBinding::forecast_time("tmFc"),
                    ParamBinding::fixed("dataType", "JSON"),
                ],
                response_format: ResponseFormat::Json,
                payload_path: vec!["response", "body", "items"],
            },
            Capability::WeatherObservation => Self {
                capability,
                base_url,
                auth_key_name: "serviceKey",
                auth_key,
                params: vec![
                    ParamBinding::fixed("Page_No", "1"),
                    ParamBinding::fixed("Page_Size", "24"),
                    ParamBinding::caller("date", "date"),
                    ParamBinding::caller("spotCode", "obsr_Spot_Code"),
                ],
                response_format: ResponseFormat::Xml,
                payload_path: vec!["response", "body", "items", "item"],
            },
            Capability::Pest => Self {
                capability,
                base_url,
                auth_key_name: "apiKey",
                auth_key,
                params: vec![
                    ParamBinding::fixed("serviceCode", "SVC01"),
                    ParamBinding::fixed("serviceType", "AA003"),
                    ParamBinding::optional("cropName", "cropName"),
                    ParamBinding::optional("pestName", "sickNameKor"),
                ],
                response_format: ResponseFormat::Xml,
                payload_path: vec!["service", "list"],
            },
        }
    }
}

/// Startup outcome for one capability.
#[derive(Debug, Clone)]
pub enum TargetSlot {
    Ready(Arc<TargetDescriptor>),
    /// Disabled for the life of the process; the reason is operator-facing.
    Unavailable(String),
}

/// Read-only table of targets shared by all requests.
#[derive(Debug, Clone, Default)]
pub struct TargetCatalog {
    slots: HashMap<Capability, TargetSlot>,
}

impl TargetCatalog {
    /// Builds every target from the configuration.
    ///
    /// A missing key disables its capability, or aborts when `strict_keys`
    /// is set. An unparseable base URL always aborts.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let mut catalog = Self::default();

        for capability in Capability::ALL {
            let (override_url, default_url, key, key_var) = match capability {
                Capability::Fertilizer => (&config.endpoints.fertilizer_url, FERTILIZER_ENDPOINT, &config.api_key, "API_KEY"),
                Capability::WeatherForecast => (&config.endpoints.forecast_url, FORECAST_ENDPOINT, &config.api_key, "API_KEY"),
                Capability::WeatherObservation => (&config.endpoints.observation_url, OBSERVATION_ENDPOINT, &config.api_key, "API_KEY"),
                Capability::Pest => (&config.endpoints.pest_url, PEST_ENDPOINT, &config.pest_api_key, "PEST_API_KEY"),
            };

            let raw_url = override_url.as_deref().unwrap_or(default_url);
            let base_url = Url::parse(raw_url).map_err(|e| {
                GatewayError::ConfigError(format!("Invalid base URL for {}: '{}' ({})", capability, raw_url, e))
            })?;

            match key {
                Some(key) => catalog.insert(TargetDescriptor::for_capability(capability, base_url, key.clone())),
                None if config.strict_keys => {
                    return Err(GatewayError::ConfigError(format!(
                        "{} is not set; required by the {} capability",
                        key_var, capability
                    )));
                }
                None => catalog.disable(capability, format!("{} is not set", key_var)),
            }
        }

        Ok(catalog)
    }

    pub fn insert(&mut self, target: TargetDescriptor) {
        self.slots.insert(target.capability, TargetSlot::Ready(Arc::new(target)));
    }

    pub fn disable(&mut self, capability: Capability, reason: impl Into<String>) {
        self.slots.insert(capability, TargetSlot::Unavailable(reason.into()));
    }

    pub fn get(&self, capability: Capability) -> Result<Arc<TargetDescriptor>, GatewayError> {
        match self.slots.get(&capability) {
            Some(TargetSlot::Ready(target)) => Ok(target.clone()),
            Some(TargetSlot::Unavailable(reason)) => Err(GatewayError::Unavailable {
                capability: capability.to_string(),
                reason: reason.clone(),
            }),
            None => Err(GatewayError::Unavailable {
                capability: capability.to_string(),
                reason: "no upstream target registered".to_string(),
            }),
        }
    }

    /// `(capability, reason)` for every disabled or unregistered capability.
    pub fn unavailable(&self) -> Vec<(Capability, String)> {
        Capability::ALL
            .into_iter()
            .filter_map(|c| match self.get(c) {
                Ok(_) => None,
                Err(GatewayError::Unavailable { reason, .. }) => Some((c, reason)),
                Err(e) => Some((c, e.to_string())),
            })
            .collect()
    }
}
