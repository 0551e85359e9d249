//! In-memory providers shared by the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use weathertracker::config::ChartConfig;
use weathertracker::{
    Dashboard, GenerationError, LookupError, TextGenerator, WeatherObservation, WeatherProvider,
};

pub fn observation(city: &str, country: &str, temperature: f64) -> WeatherObservation {
    WeatherObservation::new(
        city,
        country,
        temperature,
        temperature - 1.0,
        "clear sky",
        60,
        3.5,
        1012,
        Utc::now(),
    )
}

/// Known cities answer, everything else is not found
#[derive(Default)]
pub struct FakeWeather {
    cities: HashMap<String, WeatherObservation>,
    pub requests: Mutex<Vec<String>>,
}

impl FakeWeather {
    pub fn with(mut self, observation: WeatherObservation) -> Self {
        self.cities.insert(observation.city().to_string(), observation);
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl WeatherProvider for FakeWeather {
    async fn fetch(&self, city: &str) -> Result<WeatherObservation, LookupError> {
        self.requests.lock().unwrap().push(city.to_string());
        self.cities.get(city).cloned().ok_or(LookupError::CityNotFound)
    }
}

/// Echoes the prompt back, or fails with a fixed error
pub struct FakeGenerator {
    pub failure: Option<GenerationError>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn echo() -> Self {
        Self {
            failure: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(failure: GenerationError) -> Self {
        Self {
            failure: Some(failure),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(format!("echo: {prompt}")),
        }
    }

    fn model(&self) -> &str {
        "fake"
    }
}

pub fn standard_weather() -> FakeWeather {
    FakeWeather::default()
        .with(observation("Paris", "FR", 18.0))
        .with(observation("Tokyo", "JP", 24.0))
        .with(observation("Lima", "PE", 21.0))
}

pub fn dashboard(weather: Arc<FakeWeather>, generator: Arc<FakeGenerator>) -> Dashboard {
    Dashboard::new(weather, generator, ChartConfig::default())
}
