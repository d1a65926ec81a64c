//! Forecast fetch orchestrator.
//!
//! One read path per data kind (current, hourly-for-day, daily), all with
//! the same control structure:
//!
//! - `mock`: reshape the selected scenario; the provider is never called.
//! - `offline`: fresh cache entry or `NoCachedData`; never the provider.
//! - `cache-first`: fresh cache entry, else fall through to a live fetch.
//! - `production`: live fetch, normalize, write the cache.
//!
//! A failed live fetch is neither retried nor cached, and whatever entry
//! was there before stays eligible for later cache-first reads. Concurrent
//! misses on the same key are not coalesced; the last write wins.

pub mod normalize;

use chrono::NaiveDate;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, Clock, ForecastCache, TemporalCache};
use crate::dev::{DevConfig, DevConfigPatch, DevHarness, OperatingMode};
use crate::location::{cache_key, cache_key_for_date, parse_date, validate_coordinates};
use crate::provider::WeatherApi;
use crate::scenarios::{MockScenario, ScenarioSummary};
use crate::types::{
    CacheKind, CurrentWeather, DailyForecast, HourlyForecast, Location, ProviderError,
    WeatherError, WeatherResult,
};

/// Where a read was satisfied from, for logging.
#[derive(Debug, Clone, Copy)]
enum Source {
    Mock,
    CacheHit,
    CacheMiss,
    Provider,
}

impl Source {
    fn as_str(&self) -> &'static str {
        match self {
            Source::Mock => "mock",
            Source::CacheHit => "cache-hit",
            Source::CacheMiss => "cache-miss",
            Source::Provider => "provider",
        }
    }
}

pub struct WeatherService {
    api: Arc<dyn WeatherApi>,
    cache: Arc<ForecastCache>,
    dev: Arc<DevHarness>,
    clock: Arc<dyn Clock>,
    provider_calls: AtomicU64,
    cache_hits: AtomicU64,
}

impl WeatherService {
    pub fn new(
        api: Arc<dyn WeatherApi>,
        cache: Arc<ForecastCache>,
        dev: Arc<DevHarness>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            api,
            cache,
            dev,
            clock,
            provider_calls: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
        }
    }

    // -- Forecast reads --------------------------------------------------

    pub async fn get_current_weather(&self, location: &Location) -> WeatherResult<CurrentWeather> {
        validate_coordinates(location.lat, location.lng)?;
        let config = self.dev.current();
        self.resolve(
            CacheKind::Current,
            &self.cache.current,
            cache_key(location),
            location,
            &config,
            |scenario| scenario.current_weather,
            || async move {
                let resp = self.api.one_call(location).await?;
                normalize::current(&resp)
            },
        )
        .await
    }

    /// The 24 hours of the local calendar day `date` (`YYYY-MM-DD`).
    pub async fn get_hourly_forecast_for_day(
        &self,
        location: &Location,
        date: &str,
    ) -> WeatherResult<Vec<HourlyForecast>> {
        validate_coordinates(location.lat, location.lng)?;
        let date = parse_date(date)?;
        let config = self.dev.current();
        self.resolve(
            CacheKind::Hourly,
            &self.cache.hourly,
            cache_key_for_date(location, date),
            location,
            &config,
            |scenario| scenario.hourly_for_date(date),
            || async move {
                let series = self.api.hourly_for_date(location, date).await?;
                let hours = normalize::hourly_for_day(&series, date);
                check_hours(&hours, date)?;
                Ok::<_, ProviderError>(hours)
            },
        )
        .await
    }

    /// Up to seven days of outlook.
    pub async fn get_daily_forecast(
        &self,
        location: &Location,
    ) -> WeatherResult<Vec<DailyForecast>> {
        validate_coordinates(location.lat, location.lng)?;
        let config = self.dev.current();
        self.resolve(
            CacheKind::Daily,
            &self.cache.daily,
            cache_key(location),
            location,
            &config,
            |scenario| scenario.daily_forecast,
            || async move {
                let resp = self.api.one_call(location).await?;
                let days = normalize::daily(&resp);
                if days.is_empty() {
                    return Err(ProviderError::Malformed("response has no daily forecast".into()));
                }
                Ok(days)
            },
        )
        .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn resolve<T, M, F, Fut>(
        &self,
        kind: CacheKind,
        cache: &TemporalCache<T>,
        key: String,
        location: &Location,
        config: &DevConfig,
        from_scenario: M,
        fetch: F,
    ) -> WeatherResult<T>
    where
        T: Clone,
        M: FnOnce(MockScenario) -> T,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        match config.mode {
            OperatingMode::Mock => {
                let scenario = self.dev.active_scenario()?;
                self.trace(config, kind, &key, Source::Mock);
                return Ok(from_scenario(scenario));
            }
            OperatingMode::Offline => {
                return match cache.get(&key, self.clock.now_ms()) {
                    Some(hit) => {
                        self.record_hit(config, kind, &key);
                        Ok(hit)
                    }
                    None => {
                        self.trace(config, kind, &key, Source::CacheMiss);
                        Err(WeatherError::NoCachedData { kind })
                    }
                };
            }
            OperatingMode::CacheFirst => {
                if let Some(hit) = cache.get(&key, self.clock.now_ms()) {
                    self.record_hit(config, kind, &key);
                    return Ok(hit);
                }
                self.trace(config, kind, &key, Source::CacheMiss);
            }
            OperatingMode::Production => {}
        }

        self.provider_calls.fetch_add(1, Ordering::Relaxed);
        let data = fetch().await.map_err(|e| {
            warn!(kind = %kind, key = %key, error = %e, "Provider fetch failed");
            WeatherError::from(e)
        })?;

        cache.put(key.clone(), data.clone(), location, self.clock.now_ms());
        self.trace(config, kind, &key, Source::Provider);
        Ok(data)
    }

    fn record_hit(&self, config: &DevConfig, kind: CacheKind, key: &str) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
        self.trace(config, kind, key, Source::CacheHit);
    }

    fn trace(&self, config: &DevConfig, kind: CacheKind, key: &str, source: Source) {
        let source = source.as_str();
        if config.logging {
            info!(mode = %config.mode, kind = %kind, key, source, "Forecast read");
        } else {
            debug!(mode = %config.mode, kind = %kind, key, source, "Forecast read");
        }
    }

    // -- Dev harness -----------------------------------------------------

    pub fn set_dev_mode(&self, patch: DevConfigPatch) -> WeatherResult<DevConfig> {
        let updated = self.dev.set(patch)?;
        info!(
            mode = %updated.mode,
            scenario = %updated.scenario_id,
            logging = updated.logging,
            "Dev config updated"
        );
        Ok(updated)
    }

    pub fn dev_config(&self) -> DevConfig {
        self.dev.current()
    }

    pub fn available_scenarios(&self) -> Vec<ScenarioSummary> {
        self.dev.available_scenarios()
    }

    // -- Cache introspection ---------------------------------------------

    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("Forecast cache cleared");
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats(self.clock.now_ms())
    }

    /// Live provider calls attempted so far (successful or not).
    pub fn provider_calls(&self) -> u64 {
        self.provider_calls.load(Ordering::Relaxed)
    }

    /// Reads answered from a fresh cache entry.
    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    /// Cache hit rate as a fraction (0.0 to 1.0).
    pub fn cache_hit_rate(&self) -> f64 {
        let hits = self.cache_hits();
        let total = hits + self.provider_calls();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

/// An empty day means the date is outside what the provider can serve.
fn check_hours(hours: &[HourlyForecast], date: NaiveDate) -> Result<(), ProviderError> {
    if hours.is_empty() {
        return Err(ProviderError::Malformed(format!(
            "provider returned no hours for {date}"
        )));
    }
    if hours.len() < normalize::HOURS_PER_DAY {
        debug!(%date, hours = hours.len(), "Partial hourly coverage for requested day");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
