//! Weather observation model and display methods

use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single city's current weather, as reported by the provider.
///
/// Built once from a provider response and read through accessors afterwards.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherObservation {
    /// City name as resolved by the provider
    city: String,
    /// Country code (ISO 3166-1 alpha-2)
    country: String,
    /// Temperature in Celsius
    temperature: f64,
    /// Perceived temperature in Celsius
    feels_like: f64,
    /// Human-readable description of weather conditions
    description: String,
    /// Relative humidity in percent
    humidity: u8,
    /// Wind speed in m/s
    wind_speed: f64,
    /// Atmospheric pressure in hPa
    pressure: u32,
    /// When this observation was fetched
    fetched_at: DateTime<Utc>,
}

/// Format a measurement the way the provider reported it.
///
/// Whole numbers keep a single decimal (`18.0`), everything else uses the
/// shortest representation that round-trips (`3.5`, `18.53`).
#[must_use]
pub fn format_measurement(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

impl WeatherObservation {
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        city: impl Into<String>,
        country: impl Into<String>,
        temperature: f64,
        feels_like: f64,
        description: impl Into<String>,
        humidity: u8,
        wind_speed: f64,
        pressure: u32,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            city: city.into(),
            country: country.into(),
            temperature,
            feels_like,
            description: description.into(),
            humidity,
            wind_speed,
            pressure,
            fetched_at,
        }
    }

    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }

    #[must_use]
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    #[must_use]
    pub fn feels_like(&self) -> f64 {
        self.feels_like
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn humidity(&self) -> u8 {
        self.humidity
    }

    #[must_use]
    pub fn wind_speed(&self) -> f64 {
        self.wind_speed
    }

    #[must_use]
    pub fn pressure(&self) -> u32 {
        self.pressure
    }

    #[must_use]
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Heading line, e.g. `Paris, FR`
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.city, self.country)
    }

    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{} °C", format_measurement(self.temperature))
    }

    /// Format perceived temperature with unit
    #[must_use]
    pub fn format_feels_like(&self) -> String {
        format!("{} °C", format_measurement(self.feels_like))
    }

    #[must_use]
    pub fn format_humidity(&self) -> String {
        format!("{} %", self.humidity)
    }

    #[must_use]
    pub fn format_wind(&self) -> String {
        format!("{} m/s", format_measurement(self.wind_speed))
    }

    #[must_use]
    pub fn format_pressure(&self) -> String {
        format!("{} hPa", self.pressure)
    }

    /// One-line rendering of all eight fields, used as model context.
    #[must_use]
    pub fn context_line(&self) -> String {
        format!(
            "Current weather in {} ({}): Temperature: {} °C, Feels Like: {} °C, Weather: {}, Humidity: {}%, Wind Speed: {} m/s, Pressure: {} hPa.",
            self.city,
            self.country,
            format_measurement(self.temperature),
            format_measurement(self.feels_like),
            self.description,
            self.humidity,
            format_measurement(self.wind_speed),
            self.pressure,
        )
    }
}

impl Display for WeatherObservation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "🌤 Weather in {}", self.display_name())?;
        writeln!(f, "   🌡️ Temperature: {}", self.format_temperature())?;
        writeln!(f, "   😓 Feels Like: {}", self.format_feels_like())?;
        writeln!(f, "   ☁️ Weather: {}", self.description)?;
        writeln!(f, "   💧 Humidity: {}", self.format_humidity())?;
        writeln!(f, "   🌬️ Wind Speed: {}", self.format_wind())?;
        writeln!(f, "   🌪️ Pressure: {}", self.format_pressure())
    }
}
