//! HTTP surface of the dashboard, driven through the router

mod common;

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::{FakeGenerator, FakeWeather, dashboard, observation, standard_weather};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use weathertracker::GenerationError;
use weathertracker::web;

fn app() -> Router {
    app_with(Arc::new(standard_weather()))
}

fn app_with(weather: Arc<FakeWeather>) -> Router {
    web::router(Arc::new(dashboard(weather, Arc::new(FakeGenerator::echo())))).unwrap()
}

fn form(uri: &str, pairs: &[(&str, &str)]) -> Request<Body> {
    let body = pairs
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// The inlined chart, between the section tags
fn chart_section(html: &str) -> &str {
    let start = html.find("<section class=\"chart\">").unwrap();
    let end = start + html[start..].find("</section>").unwrap();
    &html[start..end]
}

#[tokio::test]
async fn test_health() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_index_shows_empty_dashboard() {
    let response = app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Weather Tracker + AI"));
    assert!(html.contains("Get AI Insights"));
    assert!(!html.contains("<option"));
}

#[tokio::test]
async fn test_fetch_then_ask_round_trip() {
    let weather = Arc::new(standard_weather());
    let app = app_with(weather.clone());
    let cities = "Paris, Atlantis, Tokyo";

    let response = app
        .clone()
        .oneshot(form("/weather", &[("cities", cities)]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Fetching weather for Atlantis..."));
    assert!(html.contains("Could not retrieve data for <strong>Atlantis</strong>"));
    assert!(html.contains("Weather in Tokyo, JP"));
    assert!(html.contains("<svg"));
    assert!(html.contains("<option value=\"Tokyo\">Tokyo</option>"));

    // The same fake answers identically, so the hidden field must hold this exact report
    let report = dashboard(weather, Arc::new(FakeGenerator::echo()))
        .fetch_all(cities)
        .await;
    let report_json = serde_json::to_string(&report).unwrap();
    assert!(html.contains(&format!(
        "name=\"report\" value=\"{}\"",
        tera::escape_html(&report_json)
    )));

    let response = app
        .oneshot(form(
            "/insight",
            &[
                ("cities", cities),
                ("report", &report_json),
                ("city", "Tokyo"),
                ("question", "Umbrella <today>?"),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("AI Insight:"));
    assert!(html.contains("Current weather in Tokyo (JP)"));
    assert!(html.contains("Umbrella &lt;today&gt;?"));
    assert!(html.contains("Weather in Paris, FR"));
}

#[tokio::test]
async fn test_chart_skips_failed_city() {
    let response = app()
        .oneshot(form("/weather", &[("cities", "Paris, Atlantis, Tokyo")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;

    let chart = chart_section(&html);
    assert_eq!(chart.matches("fill=\"#ADD8E6\"").count(), 2);
    assert!(chart.contains("Paris"));
    assert!(chart.contains("Tokyo"));
    assert!(!chart.contains("Atlantis"));
}

#[tokio::test]
async fn test_fetch_with_empty_cities() {
    let response = app()
        .oneshot(form("/weather", &[("cities", "")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(!html.contains("<option"));
    assert!(!html.contains("Fetching weather for"));
    assert!(!html.contains("<svg"));
}

#[tokio::test]
async fn test_insight_with_unreadable_report() {
    let response = app()
        .oneshot(form(
            "/insight",
            &[("cities", "Paris"), ("report", "{not json"), ("city", "Paris")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("fetch the weather again"));
}

#[tokio::test]
async fn test_insight_without_city() {
    let response = app()
        .oneshot(form("/insight", &[("question", "Rain?")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("select a city first"));
}

#[tokio::test]
async fn test_api_weather_report() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/weather?cities=Paris,%20Atlantis,%20Tokyo")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    let cities = body["cities"].as_array().unwrap();
    assert_eq!(cities.len(), 3);
    assert_eq!(cities[0]["ok"], json!(true));
    assert_eq!(cities[0]["observation"]["country"], json!("FR"));
    assert_eq!(cities[1]["ok"], json!(false));
    assert!(
        cities[1]["error"]
            .as_str()
            .unwrap()
            .starts_with("Could not retrieve data for Atlantis.")
    );
    assert_eq!(body["statistics"]["mean"], json!(21.0));
    assert_eq!(body["statistics"]["std_dev"], json!(3.0));
}

#[tokio::test]
async fn test_api_chart_needs_two_cities() {
    let app = app();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/chart.svg?cities=Paris")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/chart.svg?cities=Paris,Lima")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "image/svg+xml"
    );
    assert!(body_text(response).await.starts_with("<svg"));
}

#[tokio::test]
async fn test_api_insight_success_and_failure() {
    let request = || {
        Request::builder()
            .method("POST")
            .uri("/api/insight")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "observation": observation("Lima", "PE", 19.0), "question": "Fog?" })
                    .to_string(),
            ))
            .unwrap()
    };

    let response = app().oneshot(request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert!(body["insight"].as_str().unwrap().ends_with("\n\nFog?"));

    let failing = web::router(Arc::new(dashboard(
        Arc::new(standard_weather()),
        Arc::new(FakeGenerator::failing(GenerationError::EmptyResponse)),
    )))
    .unwrap();
    let response = failing.oneshot(request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("AI insight unavailable"));
}
