//! OpenWeatherMap current-weather client

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::{LookupError, WeatherProvider};
use crate::TrackerError;
use crate::config::WeatherConfig;
use crate::models::WeatherObservation;

/// Weather client for the OpenWeatherMap `/weather` endpoint
#[derive(Debug, Clone)]
pub struct OpenWeatherMapClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherMapClient {
    /// Create a new client from the weather configuration.
    ///
    /// A missing API key is not an error here; the provider rejects the
    /// request later and the city is reported as a failed lookup.
    pub fn new(config: &WeatherConfig) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("weathertracker/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TrackerError::config(format!("Failed to create HTTP client: {e}")))?;

        if config.api_key.is_none() {
            warn!("No OpenWeatherMap API key configured, lookups will be rejected");
        }

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().unwrap_or_default(),
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMapClient {
    #[instrument(skip(self), fields(city = %city))]
    async fn fetch(&self, city: &str) -> Result<WeatherObservation, LookupError> {
        let start_time = Instant::now();
        let url = format!("{}/weather", self.base_url);
        debug!("OpenWeatherMap request URL: {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!("Lookup for '{}' failed with status {}", city, status);
            return Err(LookupError::from_status(status));
        }

        let body = response.text().await?;
        let parsed: CurrentWeatherResponse = serde_json::from_str(&body).map_err(|e| {
            warn!("Failed to parse weather response for '{}': {}", city, e);
            LookupError::MalformedResponse(e.to_string())
        })?;
        let observation = parsed.into_observation(Utc::now())?;

        info!(
            "Retrieved weather for {} in {:.3}s",
            observation.display_name(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(observation)
    }
}

/// Subset of the current-weather response the dashboard needs
#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    name: String,
    sys: SysInfo,
    main: MainInfo,
    weather: Vec<Condition>,
    wind: WindInfo,
}

#[derive(Debug, Deserialize)]
struct SysInfo {
    country: String,
}

#[derive(Debug, Deserialize)]
struct MainInfo {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct WindInfo {
    speed: f64,
}

impl CurrentWeatherResponse {
    fn into_observation(self, fetched_at: DateTime<Utc>) -> Result<WeatherObservation, LookupError> {
        let description = self
            .weather
            .into_iter()
            .next()
            .map(|condition| condition.description)
            .ok_or_else(|| LookupError::MalformedResponse("empty weather list".to_string()))?;

        Ok(WeatherObservation::new(
            self.name,
            self.sys.country,
            self.main.temp,
            self.main.feels_like,
            description,
            self.main.humidity,
            self.wind.speed,
            self.main.pressure,
            fetched_at,
        ))
    }
}
