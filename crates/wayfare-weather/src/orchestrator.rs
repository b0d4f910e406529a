//! Session-level weather state: one orchestrator per UI session.
//!
//! `init`/`set_city` always go to the network, race the combined fetch
//! against a deadline and publish the result. Every fetch is tagged with a
//! generation number; only the most recently started fetch may publish.

use parking_lot::Mutex;
use std::time::Duration;

use crate::cache::{WeatherCache, DEFAULT_TTL};
use crate::source::WeatherSource;
use crate::types::{CurrentWeather, ForecastPoint, WeatherError, WeatherReport};

/// Deadline for the combined current + forecast fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Current weather (required) paired with the forecast (best effort).
type FetchOutcome = Result<(CurrentWeather, Result<Vec<ForecastPoint>, WeatherError>), WeatherError>;

/// Whether a read may be answered from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    /// Serve a fresh cached reading for the same city if there is one
    UseCache,
    /// Drop the cached reading and go to the network
    Bypass,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WeatherPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(WeatherError),
}

/// Point-in-time copy of the orchestrator state.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub city: String,
    pub phase: WeatherPhase,
    /// Last published report, if any fetch has completed
    pub report: Option<WeatherReport>,
    pub generation: u64,
}

#[derive(Debug)]
struct SessionState {
    city: String,
    phase: WeatherPhase,
    report: Option<WeatherReport>,
    generation: u64,
}

pub struct WeatherOrchestrator<S> {
    source: S,
    // Lock order: state before cache.
    state: Mutex<SessionState>,
    cache: Mutex<WeatherCache>,
    fetch_timeout: Duration,
}

impl<S: WeatherSource> WeatherOrchestrator<S> {
    pub fn new(
        source: S,
        default_city: impl Into<String>,
        cache_ttl: Duration,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            source,
            state: Mutex::new(SessionState {
                city: default_city.into(),
                phase: WeatherPhase::Idle,
                report: None,
                generation: 0,
            }),
            cache: Mutex::new(WeatherCache::new(cache_ttl)),
            fetch_timeout,
        }
    }

    /// Five-minute cache, ten-second fetch deadline.
    pub fn with_defaults(source: S, default_city: impl Into<String>) -> Self {
        Self::new(source, default_city, DEFAULT_TTL, DEFAULT_FETCH_TIMEOUT)
    }

    pub fn city(&self) -> String {
        self.state.lock().city.clone()
    }

    pub fn snapshot(&self) -> WeatherSnapshot {
        let state = self.state.lock();
        WeatherSnapshot {
            city: state.city.clone(),
            phase: state.phase.clone(),
            report: state.report.clone(),
            generation: state.generation,
        }
    }

    /// Cached reading for `city`, without touching the network.
    pub fn cached_weather(&self, city: &str) -> Option<CurrentWeather> {
        self.cache.lock().get(city)
    }

    /// Fetch current weather and forecast for `city`, bypassing the cache.
    ///
    /// Returns the report to render, or `None` when a later `init`/`set_city`
    /// started while this one was in flight; in that case nothing is published
    /// and the later call's result stands.
    pub async fn init(&self, city: &str) -> Option<WeatherReport> {
        let generation = self.begin(city);
        tracing::info!("Loading weather for {} (generation {})", city, generation);

        let fetch = async {
            tokio::join!(self.source.current(city), self.source.forecast(city))
        };

        // On timeout the join is dropped, which cancels both requests.
        let outcome: FetchOutcome = match tokio::time::timeout(self.fetch_timeout, fetch).await {
            Ok((current, forecast)) => current.map(|current| (current, forecast)),
            Err(_) => Err(WeatherError::Timeout),
        };

        self.publish(generation, city, outcome)
    }

    /// Switch to another city. Always goes to the network.
    pub async fn set_city(&self, city: &str) -> Option<WeatherReport> {
        self.init(city).await
    }

    /// Re-run `init` for the current city.
    pub async fn reload(&self) -> Option<WeatherReport> {
        let city = self.city();
        self.init(&city).await
    }

    /// Trim user input and switch to that city; blank input makes no request.
    pub async fn search_city(&self, raw_input: &str) -> Option<WeatherReport> {
        let city = raw_input.trim();
        if city.is_empty() {
            tracing::warn!("City name cannot be empty");
            return None;
        }
        self.set_city(city).await
    }

    /// Current weather for the session's city.
    ///
    /// With [`CacheMode::UseCache`] a fresh cached reading is returned without
    /// a request. Does not change the phase or the published report.
    pub async fn get_current_weather(&self, mode: CacheMode) -> Result<CurrentWeather, WeatherError> {
        let city = self.city();

        match mode {
            CacheMode::UseCache => {
                if let Some(weather) = self.cache.lock().get(&city) {
                    return Ok(weather);
                }
            }
            CacheMode::Bypass => self.cache.lock().invalidate(),
        }

        let weather = self.with_deadline(self.source.current(&city)).await?;

        let state = self.state.lock();
        if state.city == city {
            self.cache.lock().put(&city, weather.clone());
        } else {
            tracing::debug!("City changed to {} during fetch; not caching {}", state.city, city);
        }

        Ok(weather)
    }

    /// Forecast for the session's city. Never cached.
    pub async fn get_forecast(&self) -> Result<Vec<ForecastPoint>, WeatherError> {
        let city = self.city();
        self.with_deadline(self.source.forecast(&city)).await
    }

    fn begin(&self, city: &str) -> u64 {
        let mut state = self.state.lock();
        state.generation += 1;
        state.city = city.to_string();
        state.phase = WeatherPhase::Loading;
        self.cache.lock().invalidate();
        state.generation
    }

    fn publish(
        &self,
        generation: u64,
        city: &str,
        outcome: FetchOutcome,
    ) -> Option<WeatherReport> {
        let mut state = self.state.lock();
        if state.generation != generation {
            tracing::debug!(
                "Discarding weather for {} (generation {}, current {})",
                city,
                generation,
                state.generation
            );
            return None;
        }

        let report = match outcome {
            Ok((current, forecast)) => {
                let forecast = forecast.unwrap_or_else(|e| {
                    tracing::warn!("Forecast for {} unavailable: {}", city, e);
                    Vec::new()
                });
                self.cache.lock().put(city, current.clone());
                state.phase = WeatherPhase::Ready;
                WeatherReport::available(city, current, forecast)
            }
            Err(e) => {
                tracing::error!("Weather for {} unavailable: {}", city, e);
                let report = WeatherReport::unavailable(city, &e);
                state.phase = WeatherPhase::Failed(e);
                report
            }
        };

        state.report = Some(report.clone());
        Some(report)
    }

    async fn with_deadline<T>(
        &self,
        fetch: impl std::future::Future<Output = Result<T, WeatherError>>,
    ) -> Result<T, WeatherError> {
        tokio::time::timeout(self.fetch_timeout, fetch)
            .await
            .unwrap_or(Err(WeatherError::Timeout))
    }
}
