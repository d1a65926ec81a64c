//! Reshaping provider payloads into the canonical records.
//!
//! Rules shared by every kind: temperatures and wind speed round to whole
//! units, precipitation probability goes from a [0, 1] fraction to a whole
//! percent, missing precipitation volume reads as 0, and the first
//! condition entry supplies description and icon.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

use crate::provider::{
    Condition, HourlySeries, LocalZone, OneCallResponse, PrecipVolume, RawHour,
};
use crate::types::{CurrentWeather, DailyForecast, HourlyForecast, ProviderError};

/// Upper bound on the daily outlook.
pub const MAX_DAILY_ENTRIES: usize = 7;

/// Hours in a local calendar day away from daylight-saving transitions.
pub const HOURS_PER_DAY: usize = 24;

pub fn fixed_offset(offset_secs: i32) -> FixedOffset {
    FixedOffset::east_opt(offset_secs).unwrap_or_else(|| Utc.fix())
}

pub fn local_time(epoch_secs: i64, offset: FixedOffset) -> DateTime<FixedOffset> {
    DateTime::<Utc>::from_timestamp(epoch_secs, 0)
        .unwrap_or_default()
        .with_timezone(&offset)
}

pub fn round_whole(value: f64) -> i32 {
    value.round() as i32
}

pub fn percent(fraction: Option<f64>) -> u8 {
    fraction
        .map(|p| (p.clamp(0.0, 1.0) * 100.0).round() as u8)
        .unwrap_or(0)
}

fn humidity(value: f64) -> u8 {
    value.clamp(0.0, 100.0).round() as u8
}

fn direction(degrees: f64) -> u16 {
    (degrees.rem_euclid(360.0).round() as u16) % 360
}

fn hourly_volume(volume: &Option<PrecipVolume>) -> f64 {
    volume.as_ref().and_then(|v| v.one_hour).unwrap_or(0.0)
}

fn condition(weather: &[Condition]) -> (String, String) {
    weather
        .first()
        .map(|c| (c.description.clone(), c.icon.clone()))
        .unwrap_or_default()
}

pub fn current(resp: &OneCallResponse) -> Result<CurrentWeather, ProviderError> {
    let raw = resp
        .current
        .as_ref()
        .ok_or_else(|| ProviderError::Malformed("response has no current conditions".into()))?;
    let (description, icon) = condition(&raw.weather);
    Ok(CurrentWeather {
        temperature: round_whole(raw.temp),
        feels_like: round_whole(raw.feels_like),
        humidity: humidity(raw.humidity),
        wind_speed: round_whole(raw.wind_speed),
        wind_direction: direction(raw.wind_deg),
        precipitation: hourly_volume(&raw.rain) + hourly_volume(&raw.snow),
        description,
        icon,
        observed_at: resp.zone().at(raw.dt),
    })
}

pub fn daily(resp: &OneCallResponse) -> Vec<DailyForecast> {
    let zone = resp.zone();
    resp.daily
        .iter()
        .take(MAX_DAILY_ENTRIES)
        .map(|day| {
            let (description, icon) = condition(&day.weather);
            DailyForecast {
                date: zone.at(day.dt).date_naive(),
                high: round_whole(day.temp.max),
                low: round_whole(day.temp.min),
                humidity: humidity(day.humidity),
                wind_speed: round_whole(day.wind_speed),
                wind_direction: direction(day.wind_deg),
                precipitation_chance: percent(day.pop),
                precipitation: day.rain.unwrap_or(0.0) + day.snow.unwrap_or(0.0),
                description,
                icon,
                sunrise: day.sunrise.map(|t| zone.at(t)),
                sunset: day.sunset.map(|t| zone.at(t)),
            }
        })
        .collect()
}

fn hour(raw: &RawHour, zone: &LocalZone) -> HourlyForecast {
    let (description, icon) = condition(&raw.weather);
    HourlyForecast {
        time: zone.at(raw.dt),
        temperature: round_whole(raw.temp),
        feels_like: round_whole(raw.feels_like),
        humidity: humidity(raw.humidity),
        wind_speed: round_whole(raw.wind_speed),
        wind_direction: direction(raw.wind_deg),
        precipitation_chance: percent(raw.pop),
        precipitation: hourly_volume(&raw.rain) + hourly_volume(&raw.snow),
        description,
        icon,
    }
}

/// The hours whose location-local calendar date is `date`, in order.
///
/// Filtering happens on the local date, not the UTC date, so a request
/// near midnight never leaks hours from the neighbouring day. Each hour
/// carries the offset in force at that instant, so transition days have
/// 23 or 25 entries.
pub fn hourly_for_day(series: &HourlySeries, date: NaiveDate) -> Vec<HourlyForecast> {
    let zone = series.zone();
    let mut hours: Vec<&RawHour> = series
        .hourly
        .iter()
        .filter(|h| zone.at(h.dt).date_naive() == date)
        .collect();
    hours.sort_by_key(|h| h.dt);
    hours.dedup_by_key(|h| h.dt);
    hours.into_iter().map(|h| hour(h, &zone)).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
