//! Forecast down-sampling and chart series preparation.

use serde::Serialize;

use crate::types::ForecastPoint;

/// The provider reports one sample every 3 hours.
pub const SAMPLES_PER_DAY: usize = 8;

/// Longest forecast handed to the UI.
pub const MAX_FORECAST_DAYS: usize = 5;

/// Reduce a 3-hourly series to one sample per day, at most five days.
///
/// Picks indices 0, 8, 16, ... and keeps the first [`MAX_FORECAST_DAYS`].
/// Samples in between are dropped, not averaged.
pub fn project<T>(series: impl IntoIterator<Item = T>) -> Vec<T> {
    series
        .into_iter()
        .step_by(SAMPLES_PER_DAY)
        .take(MAX_FORECAST_DAYS)
        .collect()
}

/// Data a line chart needs for the forecast view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub temperature: Vec<i32>,
    pub feels_like: Vec<i32>,
    pub humidity: Vec<u8>,
    /// Shown in the tooltip for each point
    pub descriptions: Vec<String>,
}

impl ChartSeries {
    pub fn from_forecast(points: &[ForecastPoint]) -> Self {
        let mut series = Self::default();
        for point in points {
            series.labels.push(point.date.clone());
            series.temperature.push(point.temperature);
            series.feels_like.push(point.feels_like);
            series.humidity.push(point.humidity);
            series.descriptions.push(point.description.clone());
        }
        series
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
