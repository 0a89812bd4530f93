//! Configuration for the skycast pipeline
//!
//! Loaded from an optional `skycast.toml` next to the working directory plus
//! `SKYCAST_*` environment overrides (`SKYCAST_WEATHER__API_KEY`, ...). Every
//! field has a sensible default except the API key, which is a startup
//! concern of the embedding application.

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkycastConfig {
    /// Weather API configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Location acquisition configuration
    #[serde(default)]
    pub location: LocationConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Weather API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// API key; requests without one are rejected by the service
    pub api_key: Option<String>,
    /// Base URL of the timeline weather endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Comma-separated field list requested from the endpoint
    #[serde(default = "default_elements")]
    pub elements: String,
    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
}

/// Location acquisition settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Upper bound on one position acquisition in seconds
    #[serde(default = "default_acquisition_timeout")]
    pub acquisition_timeout_seconds: u64,
}

impl LocationConfig {
    #[must_use]
    pub fn acquisition_timeout(&self) -> Duration {
        Duration::from_secs(self.acquisition_timeout_seconds)
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl SkycastConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name("skycast").required(false))
            .add_source(Environment::with_prefix("SKYCAST").separator("__"))
            .build()
            .with_context(|| "Failed to load configuration")?;

        let config: Self = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.weather.base_url.trim().is_empty() {
            bail!("weather.base_url must not be empty");
        }
        if self.weather.timeout_seconds == 0 {
            bail!("weather.timeout_seconds must be positive");
        }
        if self.location.acquisition_timeout_seconds == 0 {
            bail!("location.acquisition_timeout_seconds must be positive");
        }
        Ok(())
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            elements: default_elements(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            acquisition_timeout_seconds: default_acquisition_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_base_url() -> String {
    "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline"
        .to_string()
}

fn default_elements() -> String {
    "datetime,datetimeEpoch,tempmax,tempmin,temp,dew,sunrise,sunset,description,hours,alerts"
        .to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_acquisition_timeout() -> u64 {
    15
}

fn default_log_level() -> String {
    "info".to_string()
}
