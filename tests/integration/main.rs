//! End-to-end tests of the forecast service against a counting provider.

mod counting_provider;

use chrono::{NaiveDate, Timelike};
use std::sync::Arc;

use counting_provider::{CountingProvider, T0_MS};
use stormwatch::cache::{CacheStats, CacheTtls, ForecastCache, ManualClock};
use stormwatch::dev::{DevConfig, DevConfigPatch, DevHarness, OperatingMode};
use stormwatch::service::WeatherService;
use stormwatch::types::{CacheKind, Location, ProviderError, WeatherError};

const MIN: i64 = 60_000;

struct Fixture {
    service: WeatherService,
    provider: CountingProvider,
    clock: Arc<ManualClock>,
}

fn fixture(mode: OperatingMode, start_ms: i64) -> Fixture {
    let provider = CountingProvider::new(50.0);
    let clock = Arc::new(ManualClock::new(start_ms));
    let service = WeatherService::new(
        Arc::new(provider.clone()),
        Arc::new(ForecastCache::new(CacheTtls::default())),
        Arc::new(DevHarness::new(DevConfig {
            mode,
            ..DevConfig::default()
        })),
        clock.clone(),
    );
    Fixture {
        service,
        provider,
        clock,
    }
}

fn chicago() -> Location {
    Location::new(41.87814, -87.62981, "Chicago, IL")
}

#[tokio::test]
async fn ttl_boundary_is_inclusive() {
    let f = fixture(OperatingMode::CacheFirst, 1_000_000);
    f.service.get_current_weather(&chicago()).await.unwrap();

    f.clock.set(1_000_000 + 10 * MIN);
    f.service.get_current_weather(&chicago()).await.unwrap();
    assert_eq!(f.provider.one_calls(), 1);

    f.clock.set(1_000_000 + 10 * MIN + 1);
    f.service.get_current_weather(&chicago()).await.unwrap();
    assert_eq!(f.provider.one_calls(), 2);
}

#[tokio::test]
async fn stale_entry_after_eleven_minutes() {
    let f = fixture(OperatingMode::CacheFirst, 1_000_000);
    f.service.get_daily_forecast(&chicago()).await.unwrap();
    f.clock.advance_mins(11);
    assert_eq!(f.service.cache_stats().daily.fresh, 0);
    f.service.get_daily_forecast(&chicago()).await.unwrap();
    assert_eq!(f.provider.one_calls(), 2);
}

#[tokio::test]
async fn nearby_coordinates_share_one_entry() {
    let f = fixture(OperatingMode::CacheFirst, T0_MS);
    let a = Location::new(41.87814, -87.62981, "A");
    let b = Location::new(41.87809, -87.62976, "B");

    f.service.get_current_weather(&a).await.unwrap();
    f.service.get_current_weather(&b).await.unwrap();

    assert_eq!(f.provider.one_calls(), 1);
    assert_eq!(f.service.cache_stats().current.total, 1);
}

#[tokio::test]
async fn cache_first_call_counts() {
    let f = fixture(OperatingMode::CacheFirst, T0_MS);
    for _ in 0..3 {
        f.service.get_current_weather(&chicago()).await.unwrap();
        f.service.get_daily_forecast(&chicago()).await.unwrap();
        f.service
            .get_hourly_forecast_for_day(&chicago(), "2022-01-02")
            .await
            .unwrap();
    }
    // One live call per kind; the rest are hits.
    assert_eq!(f.provider.one_calls(), 2);
    assert_eq!(f.provider.hourly_calls(), 1);
    assert_eq!(f.service.provider_calls(), 3);
    assert_eq!(f.service.cache_hits(), 6);
}

#[tokio::test]
async fn production_refreshes_every_read() {
    let f = fixture(OperatingMode::Production, T0_MS);
    f.service.get_current_weather(&chicago()).await.unwrap();
    f.provider.set_temperature(61.0);
    let second = f.service.get_current_weather(&chicago()).await.unwrap();
    assert_eq!(second.temperature, 61);
    assert_eq!(f.provider.one_calls(), 2);

    // Cache-first now sees the refreshed entry.
    f.service
        .set_dev_mode(DevConfigPatch::mode(OperatingMode::CacheFirst))
        .unwrap();
    f.provider.set_temperature(10.0);
    let cached = f.service.get_current_weather(&chicago()).await.unwrap();
    assert_eq!(cached.temperature, 61);
}

#[tokio::test]
async fn offline_cold_cache_fails_without_network() {
    let f = fixture(OperatingMode::Offline, T0_MS);
    let err = f.service.get_current_weather(&chicago()).await.unwrap_err();
    assert!(matches!(
        err,
        WeatherError::NoCachedData {
            kind: CacheKind::Current
        }
    ));
    let err = f
        .service
        .get_hourly_forecast_for_day(&chicago(), "2022-01-02")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WeatherError::NoCachedData {
            kind: CacheKind::Hourly
        }
    ));
    assert_eq!(f.provider.total_calls(), 0);
}

#[tokio::test]
async fn mock_mode_is_isolated_from_provider_and_cache() {
    let f = fixture(OperatingMode::CacheFirst, T0_MS);
    f.service
        .set_dev_mode(DevConfigPatch::scenario("extreme-heat"))
        .unwrap();

    let current = f.service.get_current_weather(&chicago()).await.unwrap();
    assert_eq!(current.temperature, 118);
    assert_eq!(f.provider.total_calls(), 0);
    assert_eq!(f.service.cache_stats(), CacheStats::default());

    // Leaving mock mode reaches the provider again.
    f.service
        .set_dev_mode(DevConfigPatch::mode(OperatingMode::CacheFirst))
        .unwrap();
    let live = f.service.get_current_weather(&chicago()).await.unwrap();
    assert_eq!(live.temperature, 50);
    assert_eq!(f.provider.one_calls(), 1);
}

#[tokio::test]
async fn hourly_for_day_returns_local_day() {
    let f = fixture(OperatingMode::CacheFirst, T0_MS);
    let date = NaiveDate::from_ymd_opt(2022, 1, 2).unwrap();
    let hours = f
        .service
        .get_hourly_forecast_for_day(&chicago(), "2022-01-02")
        .await
        .unwrap();

    assert_eq!(hours.len(), 24);
    assert!(hours.iter().all(|h| h.time.date_naive() == date));
    assert_eq!(hours[0].time.hour(), 0);
    assert_eq!(hours[23].time.hour(), 23);
    assert!(hours.windows(2).all(|w| w[0].time < w[1].time));

    // Another date is a separate entry.
    f.service
        .get_hourly_forecast_for_day(&chicago(), "2022-01-03")
        .await
        .unwrap();
    assert_eq!(f.provider.hourly_calls(), 2);
    assert_eq!(f.service.cache_stats().hourly.total, 2);
}

#[tokio::test]
async fn hourly_for_day_after_dst_change() {
    let f = fixture(OperatingMode::CacheFirst, T0_MS);
    let date = NaiveDate::from_ymd_opt(2022, 3, 14).unwrap();
    let hours = f
        .service
        .get_hourly_forecast_for_day(&chicago(), "2022-03-14")
        .await
        .unwrap();

    assert_eq!(hours.len(), 24);
    // Local midnight in CDT is 05:00 UTC.
    assert_eq!(hours[0].time.timestamp(), 1_647_234_000);
    assert!(hours.iter().all(|h| h.time.date_naive() == date));
    assert!(hours.iter().all(|h| h.time.offset().local_minus_utc() == -18_000));
    assert_eq!(hours[23].time.hour(), 23);
}

#[tokio::test]
async fn clear_is_idempotent() {
    let f = fixture(OperatingMode::CacheFirst, T0_MS);
    f.service.get_current_weather(&chicago()).await.unwrap();
    f.service.get_daily_forecast(&chicago()).await.unwrap();

    f.service.clear_cache();
    f.service.clear_cache();
    assert_eq!(f.service.cache_stats(), CacheStats::default());

    f.service.get_current_weather(&chicago()).await.unwrap();
    assert_eq!(f.provider.one_calls(), 3);
}

#[tokio::test]
async fn kinds_expire_independently() {
    let f = fixture(OperatingMode::CacheFirst, T0_MS);
    f.service.get_current_weather(&chicago()).await.unwrap();
    f.clock.advance_mins(6);
    f.service.get_daily_forecast(&chicago()).await.unwrap();
    f.clock.advance_mins(6);

    let stats = f.service.cache_stats();
    assert_eq!(stats.current.fresh, 0);
    assert_eq!(stats.daily.fresh, 1);

    f.service.get_daily_forecast(&chicago()).await.unwrap();
    assert_eq!(f.provider.one_calls(), 2);
    f.service.get_current_weather(&chicago()).await.unwrap();
    assert_eq!(f.provider.one_calls(), 3);
}

#[tokio::test]
async fn provider_failure_leaves_cache_untouched() {
    let f = fixture(OperatingMode::CacheFirst, T0_MS);
    f.service.get_current_weather(&chicago()).await.unwrap();
    f.clock.advance_mins(11);
    f.provider.fail_with(429);

    let err = f.service.get_current_weather(&chicago()).await.unwrap_err();
    assert!(matches!(
        err,
        WeatherError::Provider(ProviderError::Status { status: 429, .. })
    ));
    assert_eq!(f.service.cache_stats().current.total, 1);
    assert_eq!(f.service.cache_stats().current.fresh, 0);
}
