//! OpenWeatherMap client against a mock server

use serde_json::json;
use weathertracker::config::WeatherConfig;
use weathertracker::{LookupError, OpenWeatherMapClient, WeatherProvider};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OpenWeatherMapClient {
    let config = WeatherConfig {
        api_key: Some("test-key".to_string()),
        base_url: server.uri(),
        timeout_seconds: 5,
        ..WeatherConfig::default()
    };
    OpenWeatherMapClient::new(&config).unwrap()
}

fn tokyo_body() -> serde_json::Value {
    json!({
        "weather": [{ "id": 500, "main": "Rain", "description": "light rain", "icon": "10d" }],
        "main": { "temp": 22.4, "feels_like": 22.9, "humidity": 83, "pressure": 1008 },
        "wind": { "speed": 4.1 },
        "sys": { "country": "JP" },
        "name": "Tokyo",
        "cod": 200
    })
}

#[tokio::test]
async fn test_fetch_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Tokyo"))
        .and(query_param("appid", "test-key"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokyo_body()))
        .expect(1)
        .mount(&server)
        .await;

    let observation = client_for(&server).fetch("Tokyo").await.unwrap();

    assert_eq!(observation.display_name(), "Tokyo, JP");
    assert_eq!(observation.format_temperature(), "22.4 °C");
    assert_eq!(observation.description(), "light rain");
    assert_eq!(observation.humidity(), 83);
    assert_eq!(observation.format_wind(), "4.1 m/s");
    assert_eq!(observation.format_pressure(), "1008 hPa");
}

#[tokio::test]
async fn test_city_name_is_url_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "São Paulo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokyo_body()))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client_for(&server).fetch("São Paulo").await.is_ok());
}

#[tokio::test]
async fn test_status_codes_map_to_lookup_errors() {
    let server = MockServer::start().await;
    for (city, status) in [("Atlantis", 404), ("Locked", 401), ("Busy", 429), ("Broken", 503)] {
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", city))
            .respond_with(
                ResponseTemplate::new(status).set_body_json(json!({ "cod": status, "message": "nope" })),
            )
            .mount(&server)
            .await;
    }

    let client = client_for(&server);
    assert_eq!(client.fetch("Atlantis").await, Err(LookupError::CityNotFound));
    assert_eq!(client.fetch("Locked").await, Err(LookupError::Unauthorized));
    assert_eq!(client.fetch("Busy").await, Err(LookupError::RateLimited));
    assert_eq!(client.fetch("Broken").await, Err(LookupError::UnexpectedStatus(503)));
}

#[tokio::test]
async fn test_missing_field_is_malformed() {
    let server = MockServer::start().await;
    let mut body = tokyo_body();
    body.as_object_mut().unwrap().remove("wind");
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let result = client_for(&server).fetch("Tokyo").await;
    assert!(matches!(result, Err(LookupError::MalformedResponse(_))));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let config = WeatherConfig {
        api_key: Some("test-key".to_string()),
        base_url: "http://127.0.0.1:1".to_string(),
        timeout_seconds: 5,
        ..WeatherConfig::default()
    };
    let client = OpenWeatherMapClient::new(&config).unwrap();

    let result = client.fetch("Paris").await;
    assert!(matches!(result, Err(LookupError::Transport(_))));
}
