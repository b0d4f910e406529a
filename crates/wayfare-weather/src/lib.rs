//! Weather widget backend for Wayfare
//!
//! Fetches current conditions and a five-day forecast from an
//! OpenWeatherMap-compatible provider, keeps the latest reading in a
//! short-lived cache and exposes one orchestrator per UI session.

pub mod cache;
pub mod client;
pub mod forecast;
pub mod orchestrator;
pub mod source;
pub mod types;

pub use cache::{WeatherCache, WeatherCacheEntry, DEFAULT_TTL};
pub use client::WeatherClient;
pub use forecast::{project, ChartSeries};
pub use orchestrator::{
    CacheMode, WeatherOrchestrator, WeatherPhase, WeatherSnapshot, DEFAULT_FETCH_TIMEOUT,
};
pub use source::WeatherSource;
pub use types::*;
