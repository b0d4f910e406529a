//! HTTP client for an OpenWeatherMap-compatible provider.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

use crate::forecast::project;
use crate::source::WeatherSource;
use crate::types::{CurrentWeather, ForecastPoint, WeatherError};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ApiCurrent {
    #[serde(default)]
    name: String,
    sys: ApiSys,
    main: ApiMain,
    wind: ApiWind,
    #[serde(default)]
    clouds: ApiClouds,
    #[serde(default)]
    weather: Vec<ApiCondition>,
}

#[derive(Debug, Deserialize)]
struct ApiSys {
    #[serde(default)]
    country: String,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct ApiMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: i32,
}

#[derive(Debug, Deserialize)]
struct ApiWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct ApiClouds {
    #[serde(default)]
    all: u8,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct ApiForecast {
    #[serde(default)]
    list: Vec<ApiForecastItem>,
    city: Option<ApiForecastCity>,
}

#[derive(Debug, Deserialize)]
struct ApiForecastItem {
    dt: i64,
    main: ApiMain,
    wind: ApiWind,
    #[serde(default)]
    weather: Vec<ApiCondition>,
}

#[derive(Debug, Deserialize)]
struct ApiForecastCity {
    /// Shift from UTC in seconds
    timezone: Option<i32>,
}

/// Client for the provider's `/weather` and `/forecast` endpoints.
///
/// One request per call; failures are returned as-is, never retried.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, WeatherError> {
        Self::with_timeout(base_url, api_key, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: &str,
        api_key: &str,
        request_timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(request_timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Fetch and normalize current conditions for `city`.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_current(&self, city: &str) -> Result<CurrentWeather, WeatherError> {
        let response = self.get("weather", &[("q", city)]).await?;
        let body: ApiCurrent = handle_response(response, city).await?;
        let weather = normalize_current(body, Utc::now())?;

        tracing::info!(
            "Current weather for {}: {}°C, {}",
            weather.city,
            weather.temperature,
            weather.description
        );
        Ok(weather)
    }

    /// Fetch the 3-hourly forecast for `city` and reduce it to one point per day.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_forecast(&self, city: &str) -> Result<Vec<ForecastPoint>, WeatherError> {
        let response = self.get("forecast", &[("q", city)]).await?;
        let body: ApiForecast = handle_response(response, city).await?;

        let offset = body
            .city
            .and_then(|c| c.timezone)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());

        let points = project(body.list)
            .into_iter()
            .map(|item| normalize_forecast_item(item, &offset))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!("Forecast for {}: {} day(s)", city, points.len());
        Ok(points)
    }

    /// Current conditions at a coordinate pair.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<CurrentWeather, WeatherError> {
        let lat = latitude.to_string();
        let lon = longitude.to_string();
        let location = format!("{},{}", lat, lon);

        let response = self
            .get("weather", &[("lat", lat.as_str()), ("lon", lon.as_str())])
            .await?;
        let body: ApiCurrent = handle_response(response, &location).await?;
        normalize_current(body, Utc::now())
    }

    async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Response, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        self.client
            .get(&url)
            .query(params)
            .query(&[("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                tracing::warn!("Weather request to /{} failed: {}", endpoint, e);
                WeatherError::from(e)
            })
    }
}

impl WeatherSource for WeatherClient {
    async fn current(&self, city: &str) -> Result<CurrentWeather, WeatherError> {
        self.fetch_current(city).await
    }

    async fn forecast(&self, city: &str) -> Result<Vec<ForecastPoint>, WeatherError> {
        self.fetch_forecast(city).await
    }
}

/// Map provider status codes onto [`WeatherError`] and decode the body.
async fn handle_response<T: DeserializeOwned>(
    response: Response,
    location: &str,
) -> Result<T, WeatherError> {
    let status = response.status();
    tracing::debug!("Weather API status: {}", status);

    if status.is_success() {
        response.json().await.map_err(WeatherError::from)
    } else if status == StatusCode::UNAUTHORIZED {
        Err(WeatherError::InvalidCredentials)
    } else if status == StatusCode::NOT_FOUND {
        Err(WeatherError::LocationNotFound(location.to_string()))
    } else {
        Err(WeatherError::Provider(status.as_u16()))
    }
}

fn normalize_current(body: ApiCurrent, now: DateTime<Utc>) -> Result<CurrentWeather, WeatherError> {
    let condition = body
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::MalformedResponse("missing weather condition".into()))?;

    Ok(CurrentWeather {
        city: body.name,
        country: body.sys.country,
        temperature: round_degrees(body.main.temp),
        feels_like: round_degrees(body.main.feels_like),
        humidity: body.main.humidity,
        pressure: body.main.pressure,
        wind_speed: round_tenth(body.wind.speed),
        cloudiness: body.clouds.all,
        description: condition.description,
        icon_code: condition.icon,
        sunrise: from_epoch(body.sys.sunrise)?,
        sunset: from_epoch(body.sys.sunset)?,
        fetched_at: now,
    })
}

fn normalize_forecast_item(
    item: ApiForecastItem,
    offset: &FixedOffset,
) -> Result<ForecastPoint, WeatherError> {
    let timestamp = from_epoch(item.dt)?;
    let condition = item
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::MalformedResponse("missing forecast condition".into()))?;

    Ok(ForecastPoint {
        date: timestamp.with_timezone(offset).format("%b %-d").to_string(),
        timestamp,
        temperature: round_degrees(item.main.temp),
        feels_like: round_degrees(item.main.feels_like),
        humidity: item.main.humidity,
        description: condition.description,
        icon_code: condition.icon,
        wind_speed: round_tenth(item.wind.speed),
        pressure: item.main.pressure,
    })
}

// Halves round up (-7.5 -> -7), not away from zero.
fn round_degrees(celsius: f64) -> i32 {
    (celsius + 0.5).floor() as i32
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

fn from_epoch(secs: i64) -> Result<DateTime<Utc>, WeatherError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| WeatherError::MalformedResponse(format!("timestamp out of range: {}", secs)))
}
