use axum::{
    Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::{
    TrackerError,
    aggregator::{SummaryStatistics, summarize},
    dashboard::{CityOutcome, FetchReport},
    models::WeatherObservation,
    web::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CitiesQuery {
    #[serde(default)]
    pub cities: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiObservation {
    pub city: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub description: String,
    pub humidity: u8,
    pub wind_speed: f64,
    pub pressure: u32,
    pub fetched_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiCityResult {
    pub query: String,
    pub ok: bool,
    pub observation: Option<ApiObservation>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiWeatherReport {
    pub cities: Vec<ApiCityResult>,
    /// Present only when at least two cities were fetched
    pub statistics: Option<SummaryStatistics>,
}

#[derive(Debug, Deserialize)]
pub struct ApiInsightRequest {
    pub observation: WeatherObservation,
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiInsightResponse {
    pub insight: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl From<&WeatherObservation> for ApiObservation {
    fn from(observation: &WeatherObservation) -> Self {
        Self {
            city: observation.city().to_string(),
            country: observation.country().to_string(),
            temperature: observation.temperature(),
            feels_like: observation.feels_like(),
            description: observation.description().to_string(),
            humidity: observation.humidity(),
            wind_speed: observation.wind_speed(),
            pressure: observation.pressure(),
            fetched_at: observation.fetched_at().to_rfc3339(),
        }
    }
}

impl From<&CityOutcome> for ApiCityResult {
    fn from(outcome: &CityOutcome) -> Self {
        match outcome {
            CityOutcome::Fetched { query, observation } => Self {
                query: query.clone(),
                ok: true,
                observation: Some(ApiObservation::from(observation)),
                error: None,
            },
            CityOutcome::Failed { query, error } => Self {
                query: query.clone(),
                ok: false,
                observation: None,
                error: Some(
                    TrackerError::lookup(query.clone(), error.clone()).user_message(),
                ),
            },
        }
    }
}

impl From<&FetchReport> for ApiWeatherReport {
    fn from(report: &FetchReport) -> Self {
        let observations = report.observations();
        Self {
            cities: report.outcomes.iter().map(ApiCityResult::from).collect(),
            statistics: observations
                .is_chartable()
                .then(|| summarize(&observations)),
        }
    }
}

fn error_response(status: StatusCode, err: &TrackerError) -> Response {
    (
        status,
        Json(ApiError {
            error: err.user_message(),
        }),
    )
        .into_response()
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/weather", get(get_weather))
        .route("/chart.svg", get(get_chart))
        .route("/insight", post(post_insight))
}

async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<CitiesQuery>,
) -> Json<ApiWeatherReport> {
    let report = state.dashboard.fetch_all(&query.cities).await;
    Json(ApiWeatherReport::from(&report))
}

async fn get_chart(State(state): State<AppState>, Query(query): Query<CitiesQuery>) -> Response {
    let report = state.dashboard.fetch_all(&query.cities).await;
    match state.dashboard.chart(&report.observations()) {
        Ok(Some(chart)) => ([(header::CONTENT_TYPE, "image/svg+xml")], chart.svg).into_response(),
        Ok(None) => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            &TrackerError::validation("a temperature chart needs at least two fetched cities"),
        ),
        Err(err) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &err),
    }
}

async fn post_insight(
    State(state): State<AppState>,
    Json(request): Json<ApiInsightRequest>,
) -> Response {
    match state
        .dashboard
        .ask_about(&request.observation, &request.question)
        .await
    {
        Ok(insight) => Json(ApiInsightResponse { insight }).into_response(),
        Err(err) => error_response(StatusCode::BAD_GATEWAY, &err),
    }
}
