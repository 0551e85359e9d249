//! Interaction cycle of the weather dashboard
//!
//! One cycle parses the city list, looks every city up, charts the result
//! when at least two cities succeeded, and then answers any number of
//! questions about the fetched cities without looking them up again.

use std::fmt::Display;
use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::chart::{Chart, render_temperature_chart};
use crate::config::{ChartConfig, TrackerConfig};
use crate::insight::{self, GeminiClient, TextGenerator};
use crate::models::{ObservationSet, WeatherObservation};
use crate::weather::{LookupError, OpenWeatherMapClient, WeatherProvider};
use crate::TrackerError;

/// Split a comma separated city list into trimmed, non-blank names.
///
/// Order is kept and duplicates are not removed.
#[must_use]
pub fn parse_city_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|city| !city.is_empty())
        .map(str::to_string)
        .collect()
}

/// Where a dashboard session stands in its interaction cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing entered yet
    Idle,
    /// Weather lookups in flight
    Fetching,
    /// Lookups done, chart drawn when possible, no city to ask about
    Aggregated,
    /// At least one city fetched, questions can be submitted
    InsightReady,
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Fetching => "fetching",
            Phase::Aggregated => "aggregated",
            Phase::InsightReady => "insight-ready",
        };
        f.write_str(name)
    }
}

/// Result of looking up one entered city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CityOutcome {
    Fetched {
        query: String,
        observation: WeatherObservation,
    },
    Failed {
        query: String,
        error: LookupError,
    },
}

impl CityOutcome {
    /// The city name as the user typed it
    #[must_use]
    pub fn query(&self) -> &str {
        match self {
            CityOutcome::Fetched { query, .. } | CityOutcome::Failed { query, .. } => query,
        }
    }
}

/// Outcomes of one fetch phase, in input order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchReport {
    pub outcomes: Vec<CityOutcome>,
}

impl FetchReport {
    /// Successful observations only, in input order
    #[must_use]
    pub fn observations(&self) -> ObservationSet {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                CityOutcome::Fetched { observation, .. } => Some(observation.clone()),
                CityOutcome::Failed { .. } => None,
            })
            .collect()
    }

    /// Failed lookups as `(query, error)` pairs
    pub fn failures(&self) -> impl Iterator<Item = (&str, &LookupError)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            CityOutcome::Failed { query, error } => Some((query.as_str(), error)),
            CityOutcome::Fetched { .. } => None,
        })
    }
}

/// Answer (or failure) shown in the insight area
#[derive(Debug, Clone, PartialEq)]
pub enum InsightOutcome {
    Answer {
        city: String,
        question: String,
        text: String,
    },
    Failed {
        city: String,
        message: String,
    },
}

/// Everything one page render needs
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Raw city list as entered
    pub cities_input: String,
    /// `None` until the user submitted a city list
    pub report: Option<FetchReport>,
    pub chart: Option<Chart>,
    /// Set when drawing failed; the weather cards are still shown
    pub chart_error: Option<String>,
    pub insight: Option<InsightOutcome>,
}

impl Session {
    #[must_use]
    pub fn phase(&self) -> Phase {
        match &self.report {
            None => Phase::Idle,
            Some(report) if report.observations().is_empty() => Phase::Aggregated,
            Some(_) => Phase::InsightReady,
        }
    }

    #[must_use]
    pub fn observations(&self) -> ObservationSet {
        self.report
            .as_ref()
            .map(FetchReport::observations)
            .unwrap_or_default()
    }
}

/// Drives the weather client, the chart and the insight generator
pub struct Dashboard {
    weather: Arc<dyn WeatherProvider>,
    generator: Arc<dyn TextGenerator>,
    chart_config: ChartConfig,
    concurrent_lookups: bool,
}

impl Dashboard {
    pub fn new(
        weather: Arc<dyn WeatherProvider>,
        generator: Arc<dyn TextGenerator>,
        chart_config: ChartConfig,
    ) -> Self {
        Self {
            weather,
            generator,
            chart_config,
            concurrent_lookups: false,
        }
    }

    /// Dispatch all lookups at once; results keep input order
    #[must_use]
    pub fn with_concurrent_lookups(mut self, enabled: bool) -> Self {
        self.concurrent_lookups = enabled;
        self
    }

    /// Build the production clients from configuration
    pub fn from_config(config: &TrackerConfig) -> crate::Result<Self> {
        let weather = OpenWeatherMapClient::new(&config.weather)?;
        let generator = GeminiClient::new(&config.insight)?;
        Ok(Self::new(Arc::new(weather), Arc::new(generator), config.chart.clone())
            .with_concurrent_lookups(config.weather.concurrent_lookups))
    }

    async fn lookup(&self, city: &str) -> CityOutcome {
        match self.weather.fetch(city).await {
            Ok(observation) => CityOutcome::Fetched {
                query: city.to_string(),
                observation,
            },
            Err(error) => {
                warn!("Could not retrieve data for '{}': {}", city, error);
                CityOutcome::Failed {
                    query: city.to_string(),
                    error,
                }
            }
        }
    }

    /// Look up every city in the list. Failures never abort the others.
    #[instrument(skip(self))]
    pub async fn fetch_all(&self, input: &str) -> FetchReport {
        let cities = parse_city_list(input);
        info!(phase = %Phase::Fetching, "Looking up {} cities", cities.len());

        let outcomes = if self.concurrent_lookups {
            join_all(cities.iter().map(|city| self.lookup(city))).await
        } else {
            let mut outcomes = Vec::with_capacity(cities.len());
            for city in &cities {
                outcomes.push(self.lookup(city).await);
            }
            outcomes
        };

        let report = FetchReport { outcomes };
        info!(
            "Fetched {} of {} cities",
            report.observations().len(),
            cities.len()
        );
        report
    }

    /// Chart the set, or `None` when fewer than two cities are available
    pub fn chart(&self, observations: &ObservationSet) -> crate::Result<Option<Chart>> {
        if !observations.is_chartable() {
            return Ok(None);
        }
        render_temperature_chart(observations, &self.chart_config).map(Some)
    }

    /// Ask about one of the fetched cities
    pub async fn ask(
        &self,
        observations: &ObservationSet,
        city: &str,
        question: &str,
    ) -> crate::Result<String> {
        if city.trim().is_empty() {
            return Err(TrackerError::validation("select a city first"));
        }
        let observation = observations.find(city).ok_or_else(|| {
            TrackerError::validation(format!("'{city}' is not one of the fetched cities"))
        })?;
        self.ask_about(observation, question).await
    }

    /// Ask about an observation supplied by the caller
    pub async fn ask_about(
        &self,
        observation: &WeatherObservation,
        question: &str,
    ) -> crate::Result<String> {
        insight::ask(question, observation, self.generator.as_ref())
            .await
            .map_err(TrackerError::from)
    }

    /// Fetch and aggregate a fresh city list
    pub async fn start_session(&self, cities_input: &str) -> Session {
        let report = self.fetch_all(cities_input).await;
        self.resume_session(cities_input, report)
    }

    /// Rebuild a session from an earlier fetch without looking anything up
    #[must_use]
    pub fn resume_session(&self, cities_input: &str, report: FetchReport) -> Session {
        let observations = report.observations();
        let (chart, chart_error) = match self.chart(&observations) {
            Ok(chart) => (chart, None),
            Err(err) => {
                warn!("Failed to draw temperature chart: {}", err);
                (None, Some(err.user_message()))
            }
        };

        let session = Session {
            cities_input: cities_input.to_string(),
            report: Some(report),
            chart,
            chart_error,
            insight: None,
        };
        info!(phase = %session.phase(), "Session ready");
        session
    }

    /// Answer a question and store the outcome in the session
    pub async fn submit_insight(&self, session: &mut Session, city: &str, question: &str) {
        let observations = session.observations();
        let outcome = match self.ask(&observations, city, question).await {
            Ok(text) => InsightOutcome::Answer {
                city: city.to_string(),
                question: question.to_string(),
                text,
            },
            Err(err) => {
                warn!("Insight request for '{}' failed: {}", city, err);
                InsightOutcome::Failed {
                    city: city.to_string(),
                    message: err.user_message(),
                }
            }
        };
        session.insight = Some(outcome);
    }
}
