//! Integration tests for the geocode → aggregate → plan pipeline over a fake transport

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use weatherplan::workflow::{TextStream, activity_prompt};
use weatherplan::{
    ActivityPlanner, CallBudget, EmptySeriesPolicy, ForecastAggregator, ForecastSummary, Geocoder,
    HttpClient, HttpResponse, Locale, WeatherPlanConfig, WeatherPlanError, WeatherTool,
    WeatherWorkflow,
};

const GEOCODING_URL: &str = "https://geo.test/v1/search";
const FORECAST_URL: &str = "https://wx.test/v1/forecast";

/// Answers by URL prefix and records every request
#[derive(Clone, Default)]
struct FakeHttpClient {
    routes: Arc<Mutex<Vec<(String, Route)>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

#[derive(Clone)]
enum Route {
    Json(u16, serde_json::Value),
    Delayed(Duration, u16, serde_json::Value),
    Unreachable,
    Hang,
}

impl FakeHttpClient {
    fn route(self, prefix: &str, route: Route) -> Self {
        self.routes.lock().unwrap().push((prefix.to_string(), route));
        self
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for FakeHttpClient {
    async fn fetch(&self, url: &str) -> weatherplan::Result<HttpResponse> {
        self.requests.lock().unwrap().push(url.to_string());
        let route = self
            .routes
            .lock()
            .unwrap()
            .iter()
            .find(|(prefix, _)| url.starts_with(prefix.as_str()))
            .map(|(_, route)| route.clone());

        match route {
            Some(Route::Json(status, body)) => Ok(HttpResponse::new(status, body.to_string())),
            Some(Route::Delayed(delay, status, body)) => {
                tokio::time::sleep(delay).await;
                Ok(HttpResponse::new(status, body.to_string()))
            }
            Some(Route::Unreachable) => Err(WeatherPlanError::transport(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))),
            Some(Route::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(HttpResponse::new(504, ""))
            }
            None => Ok(HttpResponse::new(404, "")),
        }
    }
}

/// Planner that echoes the prompt back in fixed-size fragments
struct EchoPlanner;

#[async_trait]
impl ActivityPlanner for EchoPlanner {
    async fn plan(&self, forecast: &ForecastSummary) -> weatherplan::Result<TextStream> {
        let prompt = activity_prompt(forecast)?;
        let fragments: Vec<weatherplan::Result<String>> = prompt
            .chars()
            .collect::<Vec<_>>()
            .chunks(16)
            .map(|chunk| Ok(chunk.iter().collect()))
            .collect();
        Ok(stream::iter(fragments).boxed())
    }
}

/// Planner that takes `delay` before yielding a single fragment
struct SlowPlanner {
    delay: Duration,
}

#[async_trait]
impl ActivityPlanner for SlowPlanner {
    async fn plan(&self, _forecast: &ForecastSummary) -> weatherplan::Result<TextStream> {
        tokio::time::sleep(self.delay).await;
        Ok(stream::iter(vec![Ok("Visit a museum".to_string())]).boxed())
    }
}

fn config() -> WeatherPlanConfig {
    let mut config = WeatherPlanConfig::default();
    config.api.geocoding_url = GEOCODING_URL.to_string();
    config.api.forecast_url = FORECAST_URL.to_string();
    config
}

fn sao_paulo_geocoding() -> Route {
    Route::Json(
        200,
        json!({"results": [{"latitude": -23.5505, "longitude": -46.6333, "name": "São Paulo"}]}),
    )
}

fn sao_paulo_forecast() -> Route {
    Route::Json(
        200,
        json!({
            "latitude": -23.5,
            "longitude": -46.625,
            "current": {
                "time": "2026-10-19T14:00",
                "interval": 900,
                "temperature_2m": 21.4,
                "apparent_temperature": 22.1,
                "relative_humidity_2m": 78,
                "wind_speed_10m": 9.7,
                "wind_gusts_10m": 24.5,
                "precipitation": 0.3,
                "weathercode": 61
            },
            "hourly": {
                "time": ["2026-10-19T00:00", "2026-10-19T01:00", "2026-10-19T02:00", "2026-10-19T03:00"],
                "temperature_2m": [18, 22, 25, 19],
                "precipitation_probability": [10, 40, 70, 20]
            }
        }),
    )
}

/// Same response as `route`, answered two seconds late
fn delayed(route: Route) -> Route {
    match route {
        Route::Json(status, body) => Route::Delayed(Duration::from_secs(2), status, body),
        other => other,
    }
}

fn sao_paulo_client() -> FakeHttpClient {
    FakeHttpClient::default()
        .route(GEOCODING_URL, sao_paulo_geocoding())
        .route(FORECAST_URL, sao_paulo_forecast())
}

#[tokio::test]
async fn test_sao_paulo_end_to_end_summary() {
    let client = sao_paulo_client();
    let geocoder = Geocoder::new(client.clone(), GEOCODING_URL);
    let aggregator = ForecastAggregator::from_config(client.clone(), &config());

    let location = geocoder.resolve("São Paulo").await.unwrap();
    assert_eq!(location.latitude, -23.5505);
    assert_eq!(location.longitude, -46.6333);

    let summary = aggregator.aggregate(&location).await.unwrap();
    assert_eq!(summary.max_temp, 25.0);
    assert_eq!(summary.min_temp, 18.0);
    assert_eq!(summary.precipitation_chance, 70.0);
    assert_eq!(summary.condition, "Slight rain");
    assert_eq!(summary.location, "São Paulo");

    let requests = client.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[0],
        "https://geo.test/v1/search?name=S%C3%A3o%20Paulo&count=1"
    );
    assert!(requests[1].starts_with(
        "https://wx.test/v1/forecast?latitude=-23.5505&longitude=-46.6333&current="
    ));
}

#[tokio::test]
async fn test_summary_json_round_trip_from_pipeline() {
    let client = sao_paulo_client();
    let workflow = WeatherWorkflow::new(client, &config(), EchoPlanner);
    let summary = workflow
        .fetch_forecast("São Paulo", &CallBudget::default())
        .await
        .unwrap();

    let json = serde_json::to_string(&summary).unwrap();
    let back: ForecastSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(back, summary);
}

#[tokio::test]
async fn test_workflow_collects_planner_fragments() {
    let workflow = WeatherWorkflow::new(sao_paulo_client(), &config(), EchoPlanner);
    let plan = workflow
        .run("São Paulo", &CallBudget::default())
        .await
        .unwrap();

    assert_eq!(plan.forecast.condition, "Slight rain");
    assert_eq!(plan.activities, activity_prompt(&plan.forecast).unwrap());
}

#[tokio::test]
async fn test_unknown_city_is_location_not_found() {
    let client = FakeHttpClient::default()
        .route(GEOCODING_URL, Route::Json(200, json!({"generationtime_ms": 0.4})));
    let workflow = WeatherWorkflow::new(client.clone(), &config(), EchoPlanner);

    let err = workflow
        .run("Qwxyzzzz", &CallBudget::default())
        .await
        .unwrap_err();

    match err {
        WeatherPlanError::LocationNotFound { query } => assert_eq!(query, "Qwxyzzzz"),
        other => panic!("expected LocationNotFound, got {other:?}"),
    }
    assert_eq!(client.requests().len(), 1);
}

#[tokio::test]
async fn test_transport_error_propagates() {
    let client = FakeHttpClient::default()
        .route(GEOCODING_URL, sao_paulo_geocoding())
        .route(FORECAST_URL, Route::Unreachable);
    let workflow = WeatherWorkflow::new(client, &config(), EchoPlanner);

    let err = workflow
        .fetch_forecast("São Paulo", &CallBudget::default())
        .await
        .unwrap_err();
    assert!(matches!(err, WeatherPlanError::Transport { .. }));
    assert!(err.is_retryable());
    assert!(err.to_string().contains("connection refused"));
}

#[tokio::test]
async fn test_out_of_range_coordinates_surface_upstream_reason() {
    let client = FakeHttpClient::default()
        .route(
            GEOCODING_URL,
            Route::Json(
                200,
                json!({"results": [{"latitude": 123.0, "longitude": 0.0, "name": "Bogus"}]}),
            ),
        )
        .route(
            FORECAST_URL,
            Route::Json(
                400,
                json!({"error": true, "reason": "Latitude must be in range of -90 to 90°. Given: 123.0."}),
            ),
        );
    let workflow = WeatherWorkflow::new(client, &config(), EchoPlanner);

    let err = workflow
        .fetch_forecast("Bogus", &CallBudget::default())
        .await
        .unwrap_err();
    match err {
        WeatherPlanError::Upstream { status, reason } => {
            assert_eq!(status, 400);
            assert!(reason.contains("Latitude must be in range"));
        }
        other => panic!("expected Upstream, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_hourly_series_policy() {
    let empty_forecast = Route::Json(
        200,
        json!({
            "current": {
                "time": "2026-10-19T14:00", "temperature_2m": 16.2, "weather_code": 3,
                "apparent_temperature": 15.0, "relative_humidity_2m": 60,
                "wind_speed_10m": 5.0, "wind_gusts_10m": 11.0
            },
            "hourly": {"precipitation_probability": [], "temperature_2m": []}
        }),
    );
    let client = FakeHttpClient::default()
        .route(GEOCODING_URL, sao_paulo_geocoding())
        .route(FORECAST_URL, empty_forecast);

    let location = Geocoder::new(client.clone(), GEOCODING_URL)
        .resolve("São Paulo")
        .await
        .unwrap();

    let strict = ForecastAggregator::from_config(client.clone(), &config());
    let err = strict.aggregate(&location).await.unwrap_err();
    assert!(matches!(err, WeatherPlanError::EmptySeries { .. }));

    let mut lenient_config = config();
    lenient_config.forecast.empty_series = EmptySeriesPolicy::UseCurrent;
    let lenient = ForecastAggregator::from_config(client, &lenient_config);
    let summary = lenient.aggregate(&location).await.unwrap();
    assert_eq!(summary.max_temp, 16.2);
    assert_eq!(summary.min_temp, 16.2);
    assert_eq!(summary.precipitation_chance, 0.0);
}

#[tokio::test]
async fn test_weather_tool_reports_current_conditions() {
    let client = sao_paulo_client();
    let mut config = config();
    config.forecast.locale = Locale::BrazilianPortuguese;
    let tool = WeatherTool::new(client.clone(), &config);

    let report = tool.current("São Paulo").await.unwrap();
    assert_eq!(report.temperature, 21.4);
    assert_eq!(report.feels_like, 22.1);
    assert_eq!(report.humidity, 78.0);
    assert_eq!(report.wind_speed, 9.7);
    assert_eq!(report.wind_gust, 24.5);
    assert_eq!(report.conditions, "Chuva fraca");
    assert_eq!(report.location, "São Paulo");

    let requests = client.requests();
    assert!(requests[1].contains("wind_gusts_10m"));
    assert!(!requests[1].contains("hourly="));
}

#[tokio::test]
async fn test_weather_tool_rejects_missing_wind_fields() {
    let client = FakeHttpClient::default()
        .route(GEOCODING_URL, sao_paulo_geocoding())
        .route(
            FORECAST_URL,
            Route::Json(
                200,
                json!({"current": {"time": "2026-10-19T14:00", "temperature_2m": 21.4, "weather_code": 0}}),
            ),
        );
    let tool = WeatherTool::new(client, &config());

    let err = tool.current("São Paulo").await.unwrap_err();
    assert!(matches!(err, WeatherPlanError::InvalidResponseShape { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_deadline_bounds_chained_calls() {
    let client = FakeHttpClient::default()
        .route(GEOCODING_URL, sao_paulo_geocoding())
        .route(FORECAST_URL, Route::Hang);
    let workflow = WeatherWorkflow::new(client, &config(), EchoPlanner);

    let err = workflow
        .run("São Paulo", &CallBudget::with_deadline(Duration::from_secs(5)))
        .await
        .unwrap_err();
    assert!(matches!(err, WeatherPlanError::DeadlineExceeded { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_deadline_spans_forecast_and_planner_steps() {
    let client = FakeHttpClient::default()
        .route(GEOCODING_URL, delayed(sao_paulo_geocoding()))
        .route(FORECAST_URL, delayed(sao_paulo_forecast()));
    let planner = SlowPlanner {
        delay: Duration::from_secs(4),
    };
    let workflow = WeatherWorkflow::new(client, &config(), planner);
    let budget = CallBudget::with_deadline(Duration::from_secs(5));

    let started = tokio::time::Instant::now();
    let err = workflow.run("São Paulo", &budget).await.unwrap_err();
    assert!(matches!(err, WeatherPlanError::DeadlineExceeded { after } if after == Duration::from_secs(5)));
    assert!(started.elapsed() <= Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn test_fetch_forecast_alone_fits_deadline() {
    let client = FakeHttpClient::default()
        .route(GEOCODING_URL, delayed(sao_paulo_geocoding()))
        .route(FORECAST_URL, sao_paulo_forecast());
    let workflow = WeatherWorkflow::new(client, &config(), EchoPlanner);

    let summary = workflow
        .fetch_forecast("São Paulo", &CallBudget::with_deadline(Duration::from_secs(5)))
        .await
        .unwrap();
    assert_eq!(summary.max_temp, 25.0);
}

#[tokio::test]
async fn test_cancellation_stops_workflow() {
    let client = FakeHttpClient::default()
        .route(GEOCODING_URL, Route::Hang);
    let workflow = WeatherWorkflow::new(client, &config(), EchoPlanner);

    let budget = CallBudget::default();
    let canceller = budget.cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let err = workflow.run("São Paulo", &budget).await.unwrap_err();
    assert!(matches!(err, WeatherPlanError::Cancelled));
}
