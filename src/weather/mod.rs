//! Current weather lookups
//!
//! The dashboard talks to the weather service through [`WeatherProvider`];
//! [`OpenWeatherMapClient`] is the production implementation.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::WeatherObservation;

pub mod openweathermap;

pub use openweathermap::OpenWeatherMapClient;

/// Why a single city's lookup did not produce an observation
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookupError {
    /// The provider does not know the city (404)
    #[error("city not found")]
    CityNotFound,

    /// The credential was missing or rejected (401)
    #[error("the weather service rejected the API key")]
    Unauthorized,

    /// The provider throttled the request (429)
    #[error("rate limit exceeded")]
    RateLimited,

    /// Any other non-200 status
    #[error("unexpected response status {0}")]
    UnexpectedStatus(u16),

    /// Connection, DNS or timeout failure
    #[error("connection failed: {0}")]
    Transport(String),

    /// 200 response whose body lacks a required field
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl LookupError {
    /// Map a non-200 status to its failure kind
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::NOT_FOUND => LookupError::CityNotFound,
            StatusCode::UNAUTHORIZED => LookupError::Unauthorized,
            StatusCode::TOO_MANY_REQUESTS => LookupError::RateLimited,
            other => LookupError::UnexpectedStatus(other.as_u16()),
        }
    }

    /// Short advice shown next to the failed city
    #[must_use]
    pub fn hint(&self) -> &'static str {
        match self {
            LookupError::CityNotFound => "Please check the city name.",
            LookupError::Unauthorized => "Please check the OpenWeatherMap API key.",
            LookupError::RateLimited => "The weather service is busy, try again in a minute.",
            LookupError::UnexpectedStatus(_) | LookupError::MalformedResponse(_) => {
                "The weather service returned an unexpected answer."
            }
            LookupError::Transport(_) => "Please check your internet connection.",
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LookupError::MalformedResponse(err.to_string())
        } else {
            LookupError::Transport(err.to_string())
        }
    }
}

/// Source of current weather observations
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Look up the current weather for one city name
    async fn fetch(&self, city: &str) -> Result<WeatherObservation, LookupError>;
}
