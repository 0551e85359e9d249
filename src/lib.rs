//! `WeatherTracker` - Multi-city current weather dashboard with AI insights
//!
//! This library looks up the current weather for a list of cities, compares
//! their temperatures in a chart with the mean and standard deviation, and
//! forwards questions about a fetched city to a generative text model.

pub mod aggregator;
pub mod api;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod insight;
pub mod models;
pub mod page;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use aggregator::{SummaryStatistics, summarize};
pub use chart::{Chart, render_temperature_chart};
pub use config::TrackerConfig;
pub use dashboard::{CityOutcome, Dashboard, FetchReport, Phase, Session, parse_city_list};
pub use error::TrackerError;
pub use insight::{GeminiClient, GenerationError, TextGenerator};
pub use models::{ObservationSet, WeatherObservation};
pub use weather::{LookupError, OpenWeatherMapClient, WeatherProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TrackerError>;
