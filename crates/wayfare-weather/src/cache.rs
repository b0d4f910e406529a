//! Single-slot, in-memory cache for current conditions.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::types::CurrentWeather;

/// Default freshness window for a current-weather reading.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// The cached reading and the city it was requested for.
#[derive(Debug, Clone)]
pub struct WeatherCacheEntry {
    pub city: String,
    pub weather: CurrentWeather,
}

/// Holds at most one reading. Forecasts are never cached.
#[derive(Debug)]
pub struct WeatherCache {
    ttl: Duration,
    entry: Option<WeatherCacheEntry>,
}

impl WeatherCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached reading for `city`, if one exists and is still fresh.
    pub fn get(&self, city: &str) -> Option<CurrentWeather> {
        self.get_at(city, Utc::now())
    }

    /// Same as [`get`](Self::get) with an explicit clock reading.
    pub fn get_at(&self, city: &str, now: DateTime<Utc>) -> Option<CurrentWeather> {
        let entry = self.entry.as_ref()?;

        if !same_city(&entry.city, city) {
            tracing::debug!("Weather cache miss: cached {}, wanted {}", entry.city, city);
            return None;
        }

        // A reading stamped in the future counts as fresh.
        let fresh = match (now - entry.weather.fetched_at).to_std() {
            Ok(elapsed) => elapsed < self.ttl,
            Err(_) => true,
        };

        if fresh {
            tracing::debug!("Weather cache hit for {}", city);
            Some(entry.weather.clone())
        } else {
            tracing::debug!("Weather cache entry for {} expired", city);
            None
        }
    }

    /// Replace the slot.
    pub fn put(&mut self, city: &str, weather: CurrentWeather) {
        self.entry = Some(WeatherCacheEntry {
            city: city.to_string(),
            weather,
        });
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn entry(&self) -> Option<&WeatherCacheEntry> {
        self.entry.as_ref()
    }
}

impl Default for WeatherCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

fn same_city(cached: &str, requested: &str) -> bool {
    cached.trim().to_lowercase() == requested.trim().to_lowercase()
}
