//! Location key derivation.
//!
//! Turns coordinates (and optionally a calendar date) into cache keys so
//! that floating-point jitter around the same place resolves to a single
//! entry. Also hosts the looser "same place" predicate used when merging
//! recent locations.

use chrono::NaiveDate;

use crate::types::{Location, WeatherError, WeatherResult};

/// Decimal digits kept when deriving cache keys (~11 m resolution).
pub const KEY_PRECISION: usize = 4;

/// Tolerance used to merge entries in the recent-locations list.
pub const RECENT_LOCATION_TOLERANCE: f64 = 0.001;

/// Cache key for current conditions and the daily outlook.
pub fn cache_key(location: &Location) -> String {
    format!(
        "{},{}",
        round_coord(location.lat),
        round_coord(location.lng)
    )
}

/// Cache key for the hourly forecast of one calendar day.
pub fn cache_key_for_date(location: &Location, date: NaiveDate) -> String {
    format!("{}-{}", cache_key(location), date.format("%Y-%m-%d"))
}

/// True when both coordinate deltas fall within `tolerance_degrees`.
pub fn same_location(a: &Location, b: &Location, tolerance_degrees: f64) -> bool {
    (a.lat - b.lat).abs() <= tolerance_degrees && (a.lng - b.lng).abs() <= tolerance_degrees
}

/// Reject non-finite or out-of-range coordinates.
pub fn validate_coordinates(lat: f64, lng: f64) -> WeatherResult<()> {
    if !lat.is_finite() || !lng.is_finite() {
        return Err(WeatherError::InvalidInput(format!(
            "coordinates must be finite (lat={lat}, lng={lng})"
        )));
    }
    if lat.abs() > 90.0 {
        return Err(WeatherError::InvalidInput(format!(
            "latitude {lat} outside [-90, 90]"
        )));
    }
    if lng.abs() > 180.0 {
        return Err(WeatherError::InvalidInput(format!(
            "longitude {lng} outside [-180, 180]"
        )));
    }
    Ok(())
}

/// Parse a `YYYY-MM-DD` date string.
pub fn parse_date(date: &str) -> WeatherResult<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| WeatherError::InvalidInput(format!("expected YYYY-MM-DD date, got {date:?}")))
}

/// Format a coordinate at key precision, folding `-0.0000` into `0.0000`.
fn round_coord(value: f64) -> String {
    let factor = 10f64.powi(KEY_PRECISION as i32);
    let rounded = (value * factor).round() / factor;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded:.prec$}", prec = KEY_PRECISION)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_format() {
        let loc = Location::new(41.87814, -87.62981, "Chicago");
        assert_eq!(cache_key(&loc), "41.8781,-87.6298");
    }

    #[test]
    fn test_cache_key_absorbs_jitter() {
        let a = Location::new(41.87814, -87.62981, "Chicago, IL");
        let b = Location::new(41.87809, -87.62976, "Chicago, Illinois");
        assert_eq!(cache_key(&a), cache_key(&b));
    }

    #[test]
    fn test_cache_key_ignores_name() {
        let a = Location::new(10.0, 20.0, "one");
        let b = Location::new(10.0, 20.0, "two");
        assert_eq!(cache_key(&a), cache_key(&b));
    }

    #[test]
    fn test_cache_key_negative_zero() {
        let loc = Location::new(-0.00001, 0.00002, "");
        assert_eq!(cache_key(&loc), "0.0000,0.0000");
    }

    #[test]
    fn test_cache_key_for_date() {
        let loc = Location::new(41.87814, -87.62981, "");
        let date = NaiveDate::from_ymd_opt(2022, 1, 2).unwrap();
        assert_eq!(cache_key_for_date(&loc, date), "41.8781,-87.6298-2022-01-02");
        assert_ne!(cache_key_for_date(&loc, date), cache_key(&loc));
    }

    #[test]
    fn test_same_location_tolerance() {
        let a = Location::new(41.8781, -87.6298, "");
        let near = Location::new(41.8788, -87.6291, "");
        let far = Location::new(41.8800, -87.6298, "");
        assert!(same_location(&a, &near, RECENT_LOCATION_TOLERANCE));
        assert!(!same_location(&a, &far, RECENT_LOCATION_TOLERANCE));
    }

    #[test]
    fn test_same_location_looser_than_key() {
        // Different cache keys, still "the same place" for recents.
        let a = Location::new(41.8781, -87.6298, "");
        let b = Location::new(41.8785, -87.6298, "");
        assert_ne!(cache_key(&a), cache_key(&b));
        assert!(same_location(&a, &b, RECENT_LOCATION_TOLERANCE));
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(90.0, -180.0).is_ok());
        assert!(validate_coordinates(90.5, 0.0).is_err());
        assert!(validate_coordinates(0.0, 180.1).is_err());
        assert!(validate_coordinates(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2022-01-02").unwrap(),
            NaiveDate::from_ymd_opt(2022, 1, 2).unwrap()
        );
        assert!(matches!(parse_date("01/02/2022"), Err(WeatherError::InvalidInput(_))));
        assert!(parse_date("").is_err());
    }
}
