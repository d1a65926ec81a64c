//! Shared types for stormwatch.
//!
//! These types form the data model used across all modules: the
//! location value, the canonical (normalized) forecast records handed
//! to the dashboard, and the domain error enums.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// A named point on the map.
///
/// Cache identity is decided by the rounded coordinates only, so two
/// locations with different display names at the same place share entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub name: String,
}

impl Location {
    pub fn new(lat: f64, lng: f64, name: impl Into<String>) -> Self {
        Self {
            lat,
            lng,
            name: name.into(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "({:.4}, {:.4})", self.lat, self.lng)
        } else {
            write!(f, "{} ({:.4}, {:.4})", self.name, self.lat, self.lng)
        }
    }
}

// ---------------------------------------------------------------------------
// Canonical forecast records
// ---------------------------------------------------------------------------

/// Current conditions at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature: i32,
    pub feels_like: i32,
    /// Relative humidity, percent.
    pub humidity: u8,
    pub wind_speed: i32,
    /// Meteorological degrees (0 = from the north).
    pub wind_direction: u16,
    /// Precipitation intensity in mm/h; 0 when the provider omits it.
    pub precipitation: f64,
    pub description: String,
    pub icon: String,
    /// Observation time in the location's local offset.
    pub observed_at: DateTime<FixedOffset>,
}

/// One hour of forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    /// Start of the hour in the location's local offset.
    pub time: DateTime<FixedOffset>,
    pub temperature: i32,
    pub feels_like: i32,
    pub humidity: u8,
    pub wind_speed: i32,
    pub wind_direction: u16,
    /// Chance of precipitation, whole percent (0–100).
    pub precipitation_chance: u8,
    pub precipitation: f64,
    pub description: String,
    pub icon: String,
}

/// One day of the 7-day outlook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    /// Calendar date local to the forecast location.
    pub date: NaiveDate,
    pub high: i32,
    pub low: i32,
    pub humidity: u8,
    pub wind_speed: i32,
    pub wind_direction: u16,
    pub precipitation_chance: u8,
    pub precipitation: f64,
    pub description: String,
    pub icon: String,
    pub sunrise: Option<DateTime<FixedOffset>>,
    pub sunset: Option<DateTime<FixedOffset>>,
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The kinds of payload the forecast cache holds, each with its own TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheKind {
    Current,
    Hourly,
    Daily,
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKind::Current => write!(f, "current"),
            CacheKind::Hourly => write!(f, "hourly"),
            CacheKind::Daily => write!(f, "daily"),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Maximum length for error response bodies kept in `ProviderError::Status`.
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Failure talking to the remote weather provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed provider payload: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Build a `Status` error, truncating oversized bodies.
    pub fn from_status(status: u16, body: &str) -> Self {
        let body = if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut cut = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
        };
        ProviderError::Status { status, body }
    }
}

/// Errors surfaced by the forecast service.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// The provider failed; the underlying error is surfaced unchanged.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("No cached {kind} data available in offline mode")]
    NoCachedData { kind: CacheKind },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown mock scenario: {0}")]
    UnknownScenario(String),
}

pub type WeatherResult<T> = std::result::Result<T, WeatherError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
