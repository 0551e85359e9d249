//! Configuration management for the weather tracker
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TrackerError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable holding the OpenWeatherMap credential
pub const WEATHER_KEY_ENV: &str = "API_KEY_OPENWEATHERMAP";
/// Environment variable holding the Google generative AI credential
pub const INSIGHT_KEY_ENV: &str = "API_KEY_GOOGLE_GENERATIVE_AI";

/// Root configuration structure for the weather tracker
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Weather provider settings
    pub weather: WeatherConfig,
    /// Generative model settings
    pub insight: InsightConfig,
    /// Web dashboard settings
    pub server: ServerConfig,
    /// Temperature chart settings
    pub chart: ChartConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Weather API configuration settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key
    pub api_key: Option<String>,
    /// Base URL for the weather API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Look up all cities at once instead of one after another
    pub concurrent_lookups: bool,
}

/// Generative model configuration settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Google generative AI API key
    pub api_key: Option<String>,
    /// Base URL for the generative language API
    pub base_url: String,
    /// Model identifier, fixed for the life of the process
    pub model: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
}

/// Web dashboard settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Chart dimensions in pixels
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_insight_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_chart_width() -> u32 {
    1000
}

fn default_chart_height() -> u32 {
    600
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            timeout_seconds: default_timeout(),
            concurrent_lookups: false,
        }
    }
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_insight_base_url(),
            model: default_model(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_chart_width(),
            height: default_chart_height(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn redacted(key: &Option<String>) -> &'static str {
    if key.is_some() { "<redacted>" } else { "<unset>" }
}

impl fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("api_key", &redacted(&self.api_key))
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("concurrent_lookups", &self.concurrent_lookups)
            .finish()
    }
}

impl fmt::Debug for InsightConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsightConfig")
            .field("api_key", &redacted(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl TrackerConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    ///
    /// An explicitly given file must exist; the default location is optional.
    pub fn load_from_path(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        match config_path {
            Some(path) => {
                builder = builder.add_source(
                    File::from(path.to_path_buf())
                        .required(true)
                        .format(config::FileFormat::Toml),
                );
            }
            None => {
                if let Some(default_path) = Self::get_config_path().filter(|p| p.exists()) {
                    builder = builder.add_source(
                        File::from(default_path)
                            .required(false)
                            .format(config::FileFormat::Toml),
                    );
                }
            }
        }

        // Environment overrides, e.g. WEATHERTRACKER_SERVER__PORT=9000
        builder = builder.add_source(
            Environment::with_prefix("WEATHERTRACKER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TrackerConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_credential_env(|name| std::env::var(name).ok());
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weathertracker").join("config.toml"))
    }

    /// Fill unset credentials from the provider-specific environment variables
    pub fn apply_credential_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        if self.weather.api_key.is_none() {
            self.weather.api_key = from_env(WEATHER_KEY_ENV);
        }
        if self.insight.api_key.is_none() {
            self.insight.api_key = from_env(INSIGHT_KEY_ENV);
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.insight.base_url.is_empty() {
            self.insight.base_url = default_insight_base_url();
        }
        if self.insight.model.is_empty() {
            self.insight.model = default_model();
        }
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    ///
    /// Missing keys are allowed; the provider calls fail later and are
    /// reported inline like any other lookup or generation failure.
    pub fn validate_api_keys(&self) -> Result<()> {
        if self.weather.api_key.as_deref().is_some_and(str::is_empty) {
            return Err(TrackerError::config(
                "Weather API key cannot be empty if provided. Either remove it or provide a valid key.",
            )
            .into());
        }
        if self.insight.api_key.as_deref().is_some_and(str::is_empty) {
            return Err(TrackerError::config(
                "Insight API key cannot be empty if provided. Either remove it or provide a valid key.",
            )
            .into());
        }
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if !(1..=300).contains(&self.weather.timeout_seconds) {
            return Err(TrackerError::config(
                "Weather API timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        if !(1..=300).contains(&self.insight.timeout_seconds) {
            return Err(TrackerError::config(
                "Insight API timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        if self.server.port == 0 {
            return Err(TrackerError::config("Server port cannot be 0").into());
        }

        if !(200..=4000).contains(&self.chart.width) || !(200..=4000).contains(&self.chart.height)
        {
            return Err(TrackerError::config(
                "Chart width and height must be between 200 and 4000 pixels",
            )
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TrackerError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TrackerError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Weather", &self.weather.base_url),
            ("Insight", &self.insight.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TrackerError::config(format!(
                    "{name} API base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
