//! # Gateway Configuration
//!
//! Settings are merged once at startup and never mutated afterwards:
//! serialized defaults, an optional TOML file, the unprefixed `API_KEY` /
//! `PEST_API_KEY` variables, then `AGRI_`-prefixed variables (`__` nests).

use chrono_tz::Tz;
use figment::{Figment, providers::{Env, Format, Serialized, Toml}};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::error::GatewayError;
use crate::loggers::LogLevel;

/// Default configuration file, read only when present.
pub const DEFAULT_CONFIG_FILE: &str = "gateway.toml";

/// Environment variable naming an alternative configuration file.
pub const CONFIG_PATH_ENV: &str = "AGRI_CONFIG";

/// Optional base-URL overrides, one per upstream target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointOverrides {
    pub fertilizer_url: Option<String>,
    pub forecast_url: Option<String>,
    pub observation_url: Option<String>,
    pub pest_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// Service key shared by the fertilizer and weather upstreams.
    pub api_key: Option<String>,
    /// Key for the pest/disease upstream.
    pub pest_api_key: Option<String>,
    pub upstream_timeout_ms: u64,
    /// IANA zone used as "local time" for forecast bulletins.
    pub timezone: String,
    /// Abort startup instead of disabling capabilities whose key is missing.
    pub strict_keys: bool,
    pub log_level: LogLevel,
    pub endpoints: EndpointOverrides,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            api_key: None,
            pest_api_key: None,
            upstream_timeout_ms: 10_000,
            timezone: "Asia/Seoul".to_string(),
            strict_keys: false,
            log_level: LogLevel::Info,
            endpoints: EndpointOverrides::default(),
        }
    }
}

impl GatewayConfig {
    /// Loads from `AGRI_CONFIG` if set, otherwise from `gateway.toml` when it exists.
    pub fn load() -> Result<Self, GatewayError> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::load_from(path.trim()),
            _ => Self::extract(Self::figment(DEFAULT_CONFIG_FILE)),
        }
    }

    /// Loads with an explicit file. Fails if the file is missing.
    pub fn load_from(path: &str) -> Result<Self, GatewayError> {
        if !std::path::Path::new(path).exists() {
            return Err(GatewayError::ConfigError(format!("Config file not found: {}", path)));
        }
        Self::extract(Self::figment(path))
    }

    fn figment(path: &str) -> Figment {
        Figment::from(Serialized::defaults(GatewayConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::raw().only(&["API_KEY", "PEST_API_KEY"]))
            .merge(Env::prefixed("AGRI_").ignore(&["CONFIG"]).split("__"))
    }

    fn extract(figment: Figment) -> Result<Self, GatewayError> {
        let mut config: GatewayConfig = figment
            .extract()
            .map_err(|e| GatewayError::ConfigError(e.to_string()))?;

        // Blank keys count as absent
        config.api_key = config.api_key.filter(|k| !k.trim().is_empty());
        config.pest_api_key = config.pest_api_key.filter(|k| !k.trim().is_empty());
        Ok(config)
    }

    pub fn timezone(&self) -> Result<Tz, GatewayError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| GatewayError::ConfigError(format!("Unknown timezone '{}': {}", self.timezone, e)))
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream_timeout_ms.max(1))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
