use std::future::Future;

use crate::types::{CurrentWeather, ForecastPoint, WeatherError};

/// Anything that can produce current conditions and a daily forecast for a city.
///
/// [`WeatherClient`](crate::WeatherClient) is the production implementation;
/// the orchestrator only depends on this trait.
pub trait WeatherSource: Send + Sync {
    /// Current conditions, normalized.
    fn current(&self, city: &str) -> impl Future<Output = Result<CurrentWeather, WeatherError>> + Send;

    /// Daily forecast, already down-sampled. An empty vector is a valid answer.
    fn forecast(
        &self,
        city: &str,
    ) -> impl Future<Output = Result<Vec<ForecastPoint>, WeatherError>> + Send;
}
