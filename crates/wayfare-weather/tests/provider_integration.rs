//! Integration tests for WeatherClient and WeatherOrchestrator using wiremock.

use std::time::Duration;

use wayfare_weather::{
    CacheMode, CurrentView, WeatherClient, WeatherError, WeatherOrchestrator, WeatherPhase,
    DEFAULT_TTL,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test_key";

fn current_body(city: &str, temp: f64) -> serde_json::Value {
    serde_json::json!({
        "name": city,
        "sys": {"country": "IN", "sunrise": 1_760_750_000, "sunset": 1_760_791_000},
        "main": {"temp": temp, "feels_like": temp + 2.2, "humidity": 41, "pressure": 1009},
        "wind": {"speed": 4.06},
        "clouds": {"all": 75},
        "weather": [{"description": "broken clouds", "icon": "04d"}]
    })
}

/// `count` samples, 3 hours apart, temperature equal to the sample index.
fn forecast_body(count: usize) -> serde_json::Value {
    let list: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            serde_json::json!({
                "dt": 1_760_745_600 + (i as i64) * 3 * 3600,
                "main": {"temp": i as f64, "feels_like": i as f64, "humidity": 60, "pressure": 1011},
                "wind": {"speed": 1.0},
                "weather": [{"description": "few clouds", "icon": "02d"}]
            })
        })
        .collect();
    serde_json::json!({ "list": list, "city": {"timezone": 0} })
}

async fn mount_current(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(template)
        .mount(server)
        .await;
}

async fn mount_forecast(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_unknown_city_is_location_not_found() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Nowhere"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .mount(&mock_server)
        .await;

    let client = WeatherClient::new(&mock_server.uri(), API_KEY).unwrap();
    let err = client.fetch_current("Nowhere").await.unwrap_err();

    assert_eq!(err, WeatherError::LocationNotFound("Nowhere".to_string()));
}

#[tokio::test]
async fn test_bad_key_is_invalid_credentials() {
    let mock_server = MockServer::start().await;
    mount_current(&mock_server, ResponseTemplate::new(401)).await;

    let client = WeatherClient::new(&mock_server.uri(), "wrong").unwrap();
    let err = client.fetch_current("Delhi").await.unwrap_err();

    assert_eq!(err, WeatherError::InvalidCredentials);
}

#[tokio::test]
async fn test_other_status_is_provider_error() {
    let mock_server = MockServer::start().await;
    mount_current(&mock_server, ResponseTemplate::new(503)).await;
    mount_forecast(&mock_server, ResponseTemplate::new(429)).await;

    let client = WeatherClient::new(&mock_server.uri(), API_KEY).unwrap();

    assert_eq!(client.fetch_current("Delhi").await.unwrap_err(), WeatherError::Provider(503));
    assert_eq!(client.fetch_forecast("Delhi").await.unwrap_err(), WeatherError::Provider(429));
}

#[tokio::test]
async fn test_forecast_errors_use_same_mapping() {
    let mock_server = MockServer::start().await;
    mount_forecast(&mock_server, ResponseTemplate::new(404)).await;

    let client = WeatherClient::new(&mock_server.uri(), API_KEY).unwrap();
    let err = client.fetch_forecast("Atlantis").await.unwrap_err();

    assert_eq!(err, WeatherError::LocationNotFound("Atlantis".to_string()));
}

#[tokio::test]
async fn test_unreachable_provider_is_transport_error() {
    // Grab a free port and close it again so nothing is listening there.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let uri = format!("http://127.0.0.1:{}", port);

    let client = WeatherClient::new(&uri, API_KEY).unwrap();
    let err = client.fetch_current("Delhi").await.unwrap_err();

    assert!(matches!(err, WeatherError::Transport(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_transport_error_does_not_expose_api_key() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let secret = "SECRET_KEY_123";

    let client = WeatherClient::new(&format!("http://127.0.0.1:{}", port), secret).unwrap();
    let err = client.fetch_current("Delhi").await.unwrap_err();

    assert!(matches!(err, WeatherError::Transport(_)), "got {:?}", err);
    assert!(!err.to_string().contains(secret), "key leaked: {}", err);
    assert!(!format!("{:?}", err).contains(secret));
}

#[tokio::test]
async fn test_forecast_keeps_one_sample_per_day() {
    let mock_server = MockServer::start().await;
    mount_forecast(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(forecast_body(40)),
    )
    .await;

    let client = WeatherClient::new(&mock_server.uri(), API_KEY).unwrap();
    let points = client.fetch_forecast("Delhi").await.unwrap();

    let temps: Vec<i32> = points.iter().map(|p| p.temperature).collect();
    assert_eq!(temps, vec![0, 8, 16, 24, 32]);
    assert!(points.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
}

#[tokio::test]
async fn test_empty_forecast_is_not_an_error() {
    let mock_server = MockServer::start().await;
    mount_forecast(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "list": [] })),
    )
    .await;

    let client = WeatherClient::new(&mock_server.uri(), API_KEY).unwrap();
    let points = client.fetch_forecast("Delhi").await.unwrap();

    assert!(points.is_empty());
}

#[tokio::test]
async fn test_orchestrator_ready_against_provider() {
    let mock_server = MockServer::start().await;
    mount_current(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(current_body("Delhi", 30.4)),
    )
    .await;
    mount_forecast(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(forecast_body(40)),
    )
    .await;

    let client = WeatherClient::new(&mock_server.uri(), API_KEY).unwrap();
    let orchestrator = WeatherOrchestrator::with_defaults(client, "Delhi");

    let report = orchestrator.init("Delhi").await.unwrap();

    assert_eq!(orchestrator.snapshot().phase, WeatherPhase::Ready);
    assert_eq!(report.current_weather().map(|w| w.temperature), Some(30));
    assert_eq!(report.forecast.len(), 5);

    // Served from cache: no further /weather request is needed.
    let cached = orchestrator.get_current_weather(CacheMode::UseCache).await.unwrap();
    assert_eq!(cached.temperature, 30);

    let requests = mock_server.received_requests().await.unwrap();
    let weather_requests = requests.iter().filter(|r| r.url.path() == "/weather").count();
    assert_eq!(weather_requests, 1);
}

#[tokio::test]
async fn test_orchestrator_forecast_failure_is_non_fatal() {
    let mock_server = MockServer::start().await;
    mount_current(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(current_body("Delhi", 22.0)),
    )
    .await;
    mount_forecast(&mock_server, ResponseTemplate::new(500)).await;

    let client = WeatherClient::new(&mock_server.uri(), API_KEY).unwrap();
    let orchestrator = WeatherOrchestrator::with_defaults(client, "Delhi");

    let report = orchestrator.init("Delhi").await.unwrap();

    assert_eq!(orchestrator.snapshot().phase, WeatherPhase::Ready);
    assert!(report.is_available());
    assert!(report.forecast.is_empty());
}

#[tokio::test]
async fn test_orchestrator_slow_provider_times_out() {
    let mock_server = MockServer::start().await;
    mount_current(
        &mock_server,
        ResponseTemplate::new(200)
            .set_body_json(current_body("Delhi", 22.0))
            .set_delay(Duration::from_secs(2)),
    )
    .await;
    mount_forecast(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(forecast_body(8)),
    )
    .await;

    let client = WeatherClient::new(&mock_server.uri(), API_KEY).unwrap();
    let orchestrator =
        WeatherOrchestrator::new(client, "Delhi", DEFAULT_TTL, Duration::from_millis(200));

    let report = orchestrator.init("Delhi").await.unwrap();

    assert_eq!(
        orchestrator.snapshot().phase,
        WeatherPhase::Failed(WeatherError::Timeout)
    );
    match report.current {
        CurrentView::Unavailable(notice) => assert_eq!(notice.temperature, "N/A"),
        CurrentView::Available(_) => panic!("expected the unavailable sentinel"),
    }
    assert!(orchestrator.cached_weather("Delhi").is_none());
}
