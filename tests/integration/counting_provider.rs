//! Call-counting provider for integration testing.
//!
//! Provides a deterministic `WeatherApi` implementation that serves a
//! fixed Chicago forecast, counts every call, and can be switched into a
//! failing state, all in-memory with no network access.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::{Arc, Mutex};

use stormwatch::provider::{
    Condition, DayTemp, HourlySeries, LocalZone, OneCallResponse, RawCurrent, RawDay, RawHour,
    WeatherApi,
};
use stormwatch::types::{Location, ProviderError};

pub const CHICAGO_TZ: &str = "America/Chicago";

/// America/Chicago in January (UTC-6).
pub const CHICAGO_OFFSET: i32 = -21_600;

/// 2022-01-02T00:00:00Z in milliseconds.
pub const T0_MS: i64 = 1_641_081_600_000;

#[derive(Clone, Default)]
pub struct CountingProvider {
    one_calls: Arc<Mutex<u32>>,
    hourly_calls: Arc<Mutex<u32>>,
    temperature: Arc<Mutex<f64>>,
    /// If set, every call fails with this HTTP status.
    force_status: Arc<Mutex<Option<u16>>>,
}

impl CountingProvider {
    pub fn new(temperature: f64) -> Self {
        let provider = Self::default();
        *provider.temperature.lock().unwrap() = temperature;
        provider
    }

    pub fn one_calls(&self) -> u32 {
        *self.one_calls.lock().unwrap()
    }

    pub fn hourly_calls(&self) -> u32 {
        *self.hourly_calls.lock().unwrap()
    }

    pub fn total_calls(&self) -> u32 {
        self.one_calls() + self.hourly_calls()
    }

    pub fn set_temperature(&self, temperature: f64) {
        *self.temperature.lock().unwrap() = temperature;
    }

    pub fn fail_with(&self, status: u16) {
        *self.force_status.lock().unwrap() = Some(status);
    }

    fn check_error(&self) -> Result<(), ProviderError> {
        match *self.force_status.lock().unwrap() {
            Some(status) => Err(ProviderError::from_status(status, "forced failure")),
            None => Ok(()),
        }
    }

    fn response(&self) -> OneCallResponse {
        let temp = *self.temperature.lock().unwrap();
        let condition = Condition {
            id: 804,
            main: "Clouds".into(),
            description: "overcast clouds".into(),
            icon: "04d".into(),
        };
        OneCallResponse {
            lat: 41.8781,
            lon: -87.6298,
            timezone: CHICAGO_TZ.into(),
            timezone_offset: CHICAGO_OFFSET,
            current: Some(RawCurrent {
                dt: T0_MS / 1000,
                temp,
                feels_like: temp - 4.0,
                humidity: 65.0,
                wind_speed: 12.0,
                wind_deg: 270.0,
                weather: vec![condition.clone()],
                ..Default::default()
            }),
            hourly: Vec::new(),
            daily: (0..8)
                .map(|i| RawDay {
                    dt: T0_MS / 1000 + 18 * 3600 + i * 86_400,
                    temp: DayTemp {
                        min: temp - 10.0,
                        max: temp + 5.0,
                    },
                    humidity: 60.0,
                    pop: Some(0.2),
                    weather: vec![condition.clone()],
                    ..Default::default()
                })
                .collect(),
        }
    }
}

#[async_trait]
impl WeatherApi for CountingProvider {
    async fn one_call(&self, _location: &Location) -> Result<OneCallResponse, ProviderError> {
        *self.one_calls.lock().unwrap() += 1;
        self.check_error()?;
        Ok(self.response())
    }

    /// Hours from the previous local day through the next, so the caller
    /// has to pick the requested day out by local date.
    async fn hourly_for_date(
        &self,
        _location: &Location,
        date: NaiveDate,
    ) -> Result<HourlySeries, ProviderError> {
        *self.hourly_calls.lock().unwrap() += 1;
        self.check_error()?;
        let temp = *self.temperature.lock().unwrap();
        // The reported offset is always CST, as if fetched in winter.
        let (start, _) = LocalZone::resolve(CHICAGO_TZ, CHICAGO_OFFSET).day_bounds(date);
        Ok(HourlySeries {
            timezone: CHICAGO_TZ.into(),
            timezone_offset: CHICAGO_OFFSET,
            hourly: (-12..36)
                .map(|i| RawHour {
                    dt: start + i * 3600,
                    temp: temp + (i % 24) as f64 * 0.5,
                    feels_like: temp,
                    humidity: 70.0,
                    pop: Some(0.1),
                    ..Default::default()
                })
                .collect(),
        })
    }
}
