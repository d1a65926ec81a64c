//! Remote weather provider seam.
//!
//! Defines the `WeatherApi` trait the forecast service calls on a cache
//! miss, plus the raw payload shapes it returns. The shapes follow the
//! OpenWeather One Call 3.0 JSON; the service only ever reads them once,
//! when normalizing into the canonical records in `types`.

pub mod openweather;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::service::normalize::fixed_offset;
use crate::types::{Location, ProviderError};

/// Abstraction over the remote weather source.
///
/// Implementors are external collaborators: they may fail with any
/// `ProviderError`, and the service never retries them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherApi: Send + Sync {
    /// Current conditions, the hourly window and the daily outlook.
    async fn one_call(&self, location: &Location) -> Result<OneCallResponse, ProviderError>;

    /// Hourly records covering (as far as the provider can) the given
    /// calendar day local to `location`.
    async fn hourly_for_date(
        &self,
        location: &Location,
        date: NaiveDate,
    ) -> Result<HourlySeries, ProviderError>;
}

// ---------------------------------------------------------------------------
// Payload types (One Call JSON → Rust)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OneCallResponse {
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lon: f64,
    #[serde(default)]
    pub timezone: String,
    /// Seconds east of UTC for the location.
    #[serde(default)]
    pub timezone_offset: i32,
    #[serde(default)]
    pub current: Option<RawCurrent>,
    #[serde(default)]
    pub hourly: Vec<RawHour>,
    #[serde(default)]
    pub daily: Vec<RawDay>,
}

impl OneCallResponse {
    pub fn zone(&self) -> LocalZone {
        LocalZone::resolve(&self.timezone, self.timezone_offset)
    }
}

/// The hours belonging to one requested day.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HourlySeries {
    /// IANA zone name; empty when the provider did not send one.
    #[serde(default)]
    pub timezone: String,
    pub timezone_offset: i32,
    pub hourly: Vec<RawHour>,
}

impl HourlySeries {
    pub fn zone(&self) -> LocalZone {
        LocalZone::resolve(&self.timezone, self.timezone_offset)
    }
}

/// Condition code entry; the provider sends an array and only the first
/// element is meaningful for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub main: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

/// Precipitation volume over the last hour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrecipVolume {
    #[serde(rename = "1h", default)]
    pub one_hour: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCurrent {
    pub dt: i64,
    pub temp: f64,
    pub feels_like: f64,
    #[serde(default)]
    pub humidity: f64,
    #[serde(default)]
    pub wind_speed: f64,
    #[serde(default)]
    pub wind_deg: f64,
    #[serde(default)]
    pub weather: Vec<Condition>,
    #[serde(default)]
    pub rain: Option<PrecipVolume>,
    #[serde(default)]
    pub snow: Option<PrecipVolume>,
}

/// One hourly record. Also the shape of a timemachine `data` element,
/// which carries no `pop`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawHour {
    pub dt: i64,
    pub temp: f64,
    pub feels_like: f64,
    #[serde(default)]
    pub humidity: f64,
    #[serde(default)]
    pub wind_speed: f64,
    #[serde(default)]
    pub wind_deg: f64,
    /// Probability of precipitation as a fraction in [0, 1].
    #[serde(default)]
    pub pop: Option<f64>,
    #[serde(default)]
    pub weather: Vec<Condition>,
    #[serde(default)]
    pub rain: Option<PrecipVolume>,
    #[serde(default)]
    pub snow: Option<PrecipVolume>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayTemp {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDay {
    pub dt: i64,
    #[serde(default)]
    pub sunrise: Option<i64>,
    #[serde(default)]
    pub sunset: Option<i64>,
    pub temp: DayTemp,
    #[serde(default)]
    pub humidity: f64,
    #[serde(default)]
    pub wind_speed: f64,
    #[serde(default)]
    pub wind_deg: f64,
    #[serde(default)]
    pub pop: Option<f64>,
    /// Daily precipitation volume in mm (a bare number for daily records).
    #[serde(default)]
    pub rain: Option<f64>,
    #[serde(default)]
    pub snow: Option<f64>,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

// ---------------------------------------------------------------------------
// Local-day helpers
// ---------------------------------------------------------------------------

/// The clock at a location.
///
/// A named zone follows daylight-saving changes, so the offset is looked up
/// per instant. `Fixed` is the provider's reported offset, used only when the
/// zone name is missing or unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalZone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl LocalZone {
    pub fn resolve(name: &str, offset_secs: i32) -> Self {
        match name.parse::<Tz>() {
            Ok(tz) => LocalZone::Named(tz),
            Err(_) => LocalZone::Fixed(fixed_offset(offset_secs)),
        }
    }

    /// Wall-clock time at epoch second `ts`, with the offset in force then.
    pub fn at(&self, ts: i64) -> DateTime<FixedOffset> {
        let utc = DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default();
        match self {
            LocalZone::Named(tz) => utc.with_timezone(tz).fixed_offset(),
            LocalZone::Fixed(offset) => utc.with_timezone(offset),
        }
    }

    /// Epoch-second bounds `[start, end)` of the local calendar day `date`.
    /// 23 or 25 hours long on daylight-saving transition days.
    pub fn day_bounds(&self, date: NaiveDate) -> (i64, i64) {
        let next = date.succ_opt().unwrap_or(date);
        (self.midnight(date), self.midnight(next))
    }

    fn midnight(&self, date: NaiveDate) -> i64 {
        match self {
            // Some zones skip midnight itself; the day starts at the first
            // wall-clock hour that exists.
            LocalZone::Named(tz) => (0..3)
                .find_map(|h| tz.from_local_datetime(&date.and_hms_opt(h, 0, 0)?).earliest())
                .map(|dt| dt.timestamp())
                .unwrap_or_else(|| local_day_bounds(date, 0).0),
            LocalZone::Fixed(offset) => local_day_bounds(date, offset.local_minus_utc()).0,
        }
    }
}

/// Epoch-second bounds `[start, end)` of `date` for a location whose clock
/// runs `offset_secs` ahead of UTC.
pub fn local_day_bounds(date: NaiveDate, offset_secs: i32) -> (i64, i64) {
    let midnight_utc = date
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default();
    let start = midnight_utc - i64::from(offset_secs);
    (start, start + 24 * 3600)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
