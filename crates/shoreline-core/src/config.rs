use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Forecast provider settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Event source settings
    #[serde(default)]
    pub events: EventsConfig,
}

/// Public, unauthenticated 24-hour forecast endpoint.
pub const DEFAULT_FORECAST_URL: &str =
    "https://api.data.gov.sg/v1/environment/24-hour-weather-forecast";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Forecast endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Region consulted first for per-period conditions
    #[serde(default = "default_primary_region")]
    pub primary_region: String,

    /// Region consulted when the primary one is missing
    #[serde(default = "default_fallback_region")]
    pub fallback_region: String,

    /// HTTP client timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra attempts on transient failures (0 disables retry)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff delay; doubles on each retry
    #[serde(default = "default_retry_initial_delay_ms")]
    pub retry_initial_delay_ms: u64,
}

fn default_api_url() -> String {
    DEFAULT_FORECAST_URL.to_string()
}

fn default_primary_region() -> String {
    "east".to_string()
}

fn default_fallback_region() -> String {
    "central".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_initial_delay_ms() -> u64 {
    200
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            primary_region: default_primary_region(),
            fallback_region: default_fallback_region(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_initial_delay_ms: default_retry_initial_delay_ms(),
        }
    }
}

impl WeatherConfig {
    /// Regions in lookup priority order.
    pub fn region_priority(&self) -> Vec<String> {
        vec![self.primary_region.clone(), self.fallback_region.clone()]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Events returned per fetch ("load more" page size)
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Simulated latency of an event fetch
    #[serde(default = "default_fetch_latency_ms")]
    pub fetch_latency_ms: u64,

    /// Simulated latency of a join request
    #[serde(default = "default_join_latency_ms")]
    pub join_latency_ms: u64,
}

fn default_page_size() -> usize {
    3
}

fn default_fetch_latency_ms() -> u64 {
    400
}

fn default_join_latency_ms() -> u64 {
    300
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            fetch_latency_ms: default_fetch_latency_ms(),
            join_latency_ms: default_join_latency_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shoreline");

        Self {
            config_dir,
            weather: WeatherConfig::default(),
            events: EventsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, writing defaults there if absent
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let mut config = Self::default();
            if let Some(parent) = config_path.parent() {
                config.config_dir = parent.to_path_buf();
            }
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(config_path)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents)
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.api_url, "weather.api_url", &mut result);

        if self.weather.primary_region.trim().is_empty() {
            result.add_error("weather.primary_region", "Region name cannot be empty");
        }
        if self.weather.fallback_region.trim().is_empty() {
            result.add_error("weather.fallback_region", "Region name cannot be empty");
        }

        if self.weather.timeout_secs == 0 {
            result.add_error("weather.timeout_secs", "Timeout must be greater than 0");
        } else if self.weather.timeout_secs > 120 {
            result.add_warning("weather.timeout_secs", "Timeout is unusually long (>120s)");
        }

        if self.weather.max_retries > 5 {
            result.add_warning("weather.max_retries", "More than 5 retries may stall the UI");
        }

        if self.events.page_size == 0 {
            result.add_error("events.page_size", "Page size must be greater than 0");
        }

        if self.events.fetch_latency_ms > 5000 {
            result.add_warning(
                "events.fetch_latency_ms",
                "Simulated fetch latency is more than 5 seconds",
            );
        }
        if self.events.join_latency_ms > 5000 {
            result.add_warning(
                "events.join_latency_ms",
                "Simulated join latency is more than 5 seconds",
            );
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("shoreline");

        Ok(config_dir.join("config.toml"))
    }
}
