use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder temperature shown when no reading is available.
pub const UNAVAILABLE_TEMPERATURE: &str = "N/A";

/// Current conditions for one city, normalized from the provider response.
///
/// Temperatures are whole degrees Celsius; rounding happens once, when the
/// provider payload is converted, never at display time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub city: String,
    /// ISO 3166 country code
    pub country: String,
    pub temperature: i32,
    pub feels_like: i32,
    /// Percent, 0-100
    pub humidity: u8,
    /// hPa
    pub pressure: i32,
    /// m/s, one decimal place
    pub wind_speed: f64,
    /// Percent cloud cover
    pub cloudiness: u8,
    pub description: String,
    pub icon_code: String,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    /// When this reading was taken; drives cache freshness
    pub fetched_at: DateTime<Utc>,
}

/// One day of the forecast (a single 3-hour sample, not an aggregate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Short label such as "Oct 18"
    pub date: String,
    pub timestamp: DateTime<Utc>,
    pub temperature: i32,
    pub feels_like: i32,
    pub humidity: u8,
    pub description: String,
    pub icon_code: String,
    pub wind_speed: f64,
    pub pressure: i32,
}

/// Stand-in shown in place of current conditions when a fetch failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailableNotice {
    pub temperature: String,
    pub condition: String,
}

impl UnavailableNotice {
    pub fn from_error(error: &WeatherError) -> Self {
        Self {
            temperature: UNAVAILABLE_TEMPERATURE.to_string(),
            condition: error.user_message().to_string(),
        }
    }
}

/// What the UI shows in the current-conditions slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CurrentView {
    Available(CurrentWeather),
    Unavailable(UnavailableNotice),
}

/// Everything handed to the rendering layer after a fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// City as requested by the caller
    pub city: String,
    pub current: CurrentView,
    /// Possibly empty; an empty forecast means "skip the chart"
    pub forecast: Vec<ForecastPoint>,
}

impl WeatherReport {
    pub fn available(
        city: impl Into<String>,
        current: CurrentWeather,
        forecast: Vec<ForecastPoint>,
    ) -> Self {
        Self {
            city: city.into(),
            current: CurrentView::Available(current),
            forecast,
        }
    }

    pub fn unavailable(city: impl Into<String>, error: &WeatherError) -> Self {
        Self {
            city: city.into(),
            current: CurrentView::Unavailable(UnavailableNotice::from_error(error)),
            forecast: Vec::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.current, CurrentView::Available(_))
    }

    pub fn current_weather(&self) -> Option<&CurrentWeather> {
        match &self.current {
            CurrentView::Available(weather) => Some(weather),
            CurrentView::Unavailable(_) => None,
        }
    }
}

/// Weather provider errors.
///
/// Every variant is terminal for the request that produced it; nothing here
/// is retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WeatherError {
    #[error("Invalid API key")]
    InvalidCredentials,
    #[error("City \"{0}\" not found")]
    LocationNotFound(String),
    #[error("Weather provider returned status {0}")]
    Provider(u16),
    #[error("Network error: {0}")]
    Transport(String),
    #[error("Weather request timed out")]
    Timeout,
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

impl WeatherError {
    /// Short explanation for the unavailable sentinel.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "Weather API key is invalid. Check settings.",
            Self::LocationNotFound(_) => "City not found. Check the name and try again.",
            Self::Provider(status) if *status >= 500 => {
                "Weather service is having trouble. Please try again later."
            }
            Self::Provider(_) => "Unable to fetch weather data",
            Self::Transport(_) => "Unable to reach the weather service. Check your connection.",
            Self::Timeout => "Weather request timed out. Please try again.",
            Self::MalformedResponse(_) => "Unable to read weather data",
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    /// The request URL carries the API key, so it is stripped first.
    fn from(e: reqwest::Error) -> Self {
        let e = e.without_url();
        if e.is_decode() {
            Self::MalformedResponse(e.to_string())
        } else if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(e.to_string())
        }
    }
}
