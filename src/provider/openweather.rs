//! OpenWeather One Call 3.0 client.
//!
//! API: `https://api.openweathermap.org/data/3.0/onecall`
//! Auth: `appid` query parameter (subscription key).
//! Forecast window: 48 hourly records starting at the current hour, so
//! earlier hours of "today" are backfilled from the timemachine endpoint.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::future::try_join_all;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

use super::{HourlySeries, OneCallResponse, RawHour, WeatherApi};
use crate::types::{Location, ProviderError};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

const ONE_CALL_PATH: &str = "/data/3.0/onecall";
const TIMEMACHINE_PATH: &str = "/data/3.0/onecall/timemachine";

const USER_AGENT: &str = concat!("stormwatch/", env!("CARGO_PKG_VERSION"));

/// Measurement system requested from the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Imperial,
    Metric,
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Imperial => "imperial",
            Units::Metric => "metric",
            Units::Standard => "standard",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timemachine response: a single-hour `data` array.
#[derive(Debug, Deserialize)]
struct TimemachineResponse {
    #[serde(default)]
    data: Vec<RawHour>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct OpenWeatherClient {
    http: Client,
    base_url: String,
    api_key: Secret<String>,
    units: Units,
}

impl OpenWeatherClient {
    pub fn new(
        api_key: Secret<String>,
        base_url: Option<String>,
        units: Units,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build OpenWeather HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key,
            units,
        })
    }

    pub fn units(&self) -> Units {
        self.units
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http
            .get(&url)
            .query(params)
            .query(&[
                ("units", self.units.as_str()),
                ("appid", self.api_key.expose_secret().as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            warn!(path, status = %status, "OpenWeather request failed");
            return Err(ProviderError::from_status(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::Malformed(format!("{path}: {e}")))
    }

    fn coord_params(location: &Location) -> Vec<(&'static str, String)> {
        vec![
            ("lat", location.lat.to_string()),
            ("lon", location.lng.to_string()),
        ]
    }

    /// Fetch the single historical hour starting at `dt`.
    async fn timemachine_hour(
        &self,
        location: &Location,
        dt: i64,
    ) -> Result<Option<RawHour>, ProviderError> {
        let mut params = Self::coord_params(location);
        params.push(("dt", dt.to_string()));
        let resp: TimemachineResponse = self.get_json(TIMEMACHINE_PATH, &params).await?;
        Ok(resp.data.into_iter().next())
    }
}

#[async_trait]
impl WeatherApi for OpenWeatherClient {
    async fn one_call(&self, location: &Location) -> Result<OneCallResponse, ProviderError> {
        let mut params = Self::coord_params(location);
        params.push(("exclude", "minutely,alerts".to_string()));
        let resp: OneCallResponse = self.get_json(ONE_CALL_PATH, &params).await?;
        debug!(
            location = %location,
            hourly = resp.hourly.len(),
            daily = resp.daily.len(),
            "One Call response received"
        );
        Ok(resp)
    }

    async fn hourly_for_date(
        &self,
        location: &Location,
        date: NaiveDate,
    ) -> Result<HourlySeries, ProviderError> {
        let forecast = self.one_call(location).await?;
        let (start, end) = forecast.zone().day_bounds(date);

        // Only hours that are already history can be backfilled: those before
        // both the forecast window and the provider's "now". Hours past the
        // window stay missing.
        let horizon = [
            forecast.hourly.first().map(|h| h.dt),
            forecast.current.as_ref().map(|c| c.dt),
        ]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(start);
        let missing: Vec<i64> = (start..end)
            .step_by(3600)
            .filter(|dt| *dt < horizon)
            .collect();

        let mut hours: Vec<RawHour> = forecast
            .hourly
            .into_iter()
            .filter(|h| h.dt >= start && h.dt < end)
            .collect();

        if !missing.is_empty() {
            debug!(location = %location, %date, count = missing.len(), "Backfilling past hours");
            let backfill = try_join_all(
                missing.iter().map(|dt| self.timemachine_hour(location, *dt)),
            )
            .await?;
            hours.extend(backfill.into_iter().flatten());
        }

        hours.sort_by_key(|h| h.dt);
        Ok(HourlySeries {
            timezone: forecast.timezone,
            timezone_offset: forecast.timezone_offset,
            hourly: hours,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> OpenWeatherClient {
        OpenWeatherClient::new(
            Secret::new("test-key".to_string()),
            Some(server.uri()),
            Units::Imperial,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn chicago() -> Location {
        Location::new(41.8781, -87.6298, "Chicago")
    }

    fn hour_json(dt: i64) -> serde_json::Value {
        serde_json::json!({
            "dt": dt, "temp": 30.0, "feels_like": 25.0, "humidity": 60,
            "wind_speed": 5.0, "wind_deg": 180, "pop": 0.1,
            "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}]
        })
    }

    #[tokio::test]
    async fn test_one_call_sends_key_and_units() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ONE_CALL_PATH))
            .and(query_param("appid", "test-key"))
            .and(query_param("units", "imperial"))
            .and(query_param("exclude", "minutely,alerts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "timezone_offset": -21600,
                "hourly": [hour_json(1_641_103_200)],
                "daily": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resp = client(&server).one_call(&chicago()).await.unwrap();
        assert_eq!(resp.timezone_offset, -21600);
        assert_eq!(resp.hourly.len(), 1);
    }

    #[tokio::test]
    async fn test_non_success_status_maps_to_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ONE_CALL_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
            .mount(&server)
            .await;

        let err = client(&server).one_call(&chicago()).await.unwrap_err();
        match err {
            ProviderError::Status { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("Invalid API key"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_garbage_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ONE_CALL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client(&server).one_call(&chicago()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_hourly_for_date_backfills_past_hours() {
        let server = MockServer::start().await;
        let date = NaiveDate::from_ymd_opt(2022, 1, 2).unwrap();
        let (start, _) = crate::provider::local_day_bounds(date, 0);

        // Forecast window starts at 22:00 local; 22 earlier hours are history.
        let forecast: Vec<_> = (22..48).map(|i| hour_json(start + i * 3600)).collect();
        Mock::given(method("GET"))
            .and(path(ONE_CALL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "timezone_offset": 0,
                "hourly": forecast
            })))
            .mount(&server)
            .await;
        for i in 0..22 {
            let dt = start + i * 3600;
            Mock::given(method("GET"))
                .and(path(TIMEMACHINE_PATH))
                .and(query_param("dt", dt.to_string()))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "timezone_offset": 0,
                    "data": [hour_json(dt)]
                })))
                .expect(1)
                .mount(&server)
                .await;
        }

        let series = client(&server).hourly_for_date(&chicago(), date).await.unwrap();
        assert_eq!(series.hourly.len(), 24);
        assert_eq!(series.hourly[0].dt, start);
        assert_eq!(series.hourly[23].dt, start + 23 * 3600);
    }

    #[tokio::test]
    async fn test_day_past_forecast_window_is_not_backfilled() {
        let server = MockServer::start().await;
        // Window opens 2022-01-02T10:00Z and runs 48 hours.
        let now = 1_641_117_600;
        let forecast: Vec<_> = (0..48).map(|i| hour_json(now + i * 3600)).collect();
        Mock::given(method("GET"))
            .and(path(ONE_CALL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "timezone": "America/Chicago",
                "timezone_offset": -21600,
                "current": hour_json(now),
                "hourly": forecast
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(TIMEMACHINE_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_string("out of allowed range"))
            .expect(0)
            .mount(&server)
            .await;

        let date = NaiveDate::from_ymd_opt(2022, 1, 12).unwrap();
        let series = client(&server).hourly_for_date(&chicago(), date).await.unwrap();
        assert!(series.hourly.is_empty());
        assert_eq!(series.timezone, "America/Chicago");
    }

    #[tokio::test]
    async fn test_backfill_uses_named_zone_day() {
        let server = MockServer::start().await;
        // 2022-03-14 in Chicago starts at 05:00Z (CDT) although the
        // reported offset is still CST.
        let date = NaiveDate::from_ymd_opt(2022, 3, 14).unwrap();
        let start = 1_647_234_000;
        let forecast: Vec<_> = (2..50).map(|i| hour_json(start + i * 3600)).collect();
        Mock::given(method("GET"))
            .and(path(ONE_CALL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "timezone": "America/Chicago",
                "timezone_offset": -21600,
                "hourly": forecast
            })))
            .mount(&server)
            .await;
        for dt in [start, start + 3600] {
            Mock::given(method("GET"))
                .and(path(TIMEMACHINE_PATH))
                .and(query_param("dt", dt.to_string()))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "data": [hour_json(dt)]
                })))
                .expect(1)
                .mount(&server)
                .await;
        }

        let series = client(&server).hourly_for_date(&chicago(), date).await.unwrap();
        assert_eq!(series.hourly.len(), 24);
        assert_eq!(series.hourly[0].dt, start);
    }

    #[test]
    fn test_units_as_str() {
        assert_eq!(Units::default(), Units::Imperial);
        assert_eq!(Units::Metric.to_string(), "metric");
    }
}
