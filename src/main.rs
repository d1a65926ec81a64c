//! STORMWATCH: weather dashboard backend.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! wires the provider client, cache, dev harness and saved locations
//! together, and serves the HTTP API with graceful shutdown.

use anyhow::Result;
use secrecy::Secret;
use std::sync::Arc;
use tracing::{info, warn};

use stormwatch::cache::{Clock, ForecastCache, SystemClock};
use stormwatch::config::AppConfig;
use stormwatch::dashboard::{self, DashboardState};
use stormwatch::dev::{DevHarness, OperatingMode};
use stormwatch::geocode::Geocoder;
use stormwatch::provider::openweather::OpenWeatherClient;
use stormwatch::service::WeatherService;
use stormwatch::storage::LocationStore;

const BANNER: &str = r#"
     _                                        _       _
 ___| |_ ___  _ __ _ __ _____      ____ _| |_ ___| |__
/ __| __/ _ \| '__| '_ ` _ \ \ /\ / / _` | __/ __| '_ \
\__ \ || (_) | |  | | | | | \ V  V / (_| | || (__| | | |
|___/\__\___/|_|  |_| |_| |_|\_/\_/ \__,_|\__\___|_| |_|

  Forecast cache and dashboard API
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let cfg = AppConfig::load_or_default(&config_path)?;

    println!("{BANNER}");

    // -- Provider --------------------------------------------------------

    let api_key = AppConfig::resolve_env(&cfg.provider.api_key_env)
        .ok()
        .filter(|k| !k.trim().is_empty());

    let mut dev_config = cfg.dev_config();
    if api_key.is_none() && dev_config.mode.uses_network() {
        warn!(
            env = %cfg.provider.api_key_env,
            "No OpenWeather API key configured, falling back to mock mode"
        );
        dev_config.mode = OperatingMode::Mock;
    }

    let client = Arc::new(OpenWeatherClient::new(
        Secret::new(api_key.clone().unwrap_or_default()),
        cfg.provider.base_url.clone(),
        cfg.provider.units,
        cfg.provider_timeout(),
    )?);

    info!(
        mode = %dev_config.mode,
        scenario = %dev_config.scenario_id,
        units = %client.units(),
        port = cfg.dashboard.port,
        "STORMWATCH starting up"
    );

    // -- Components ------------------------------------------------------

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let service = WeatherService::new(
        client.clone(),
        Arc::new(ForecastCache::new(cfg.cache_ttls())),
        Arc::new(DevHarness::new(dev_config)),
        clock.clone(),
    );

    let geocoder = api_key
        .as_ref()
        .map(|_| Geocoder::new(client.clone(), clock.clone(), cfg.geocode_ttl()));

    let locations = LocationStore::open(&cfg.storage.locations_file)?;

    // Warm the cache for the last location the user looked at.
    if let Some(saved) = locations.get_current_location() {
        if service.dev_config().mode.uses_network() {
            match service.get_current_weather(&saved).await {
                Ok(current) => info!(
                    location = %saved,
                    temperature = current.temperature,
                    "Prewarmed current conditions"
                ),
                Err(e) => warn!(location = %saved, error = %e, "Prewarm failed"),
            }
        }
    }

    let state = Arc::new(DashboardState {
        service,
        geocoder,
        locations,
        tile_key: api_key.map(Secret::new),
    });

    // -- Serve -----------------------------------------------------------

    if !cfg.dashboard.enabled {
        info!("Dashboard disabled in config. Nothing to serve.");
        return Ok(());
    }

    info!("Press Ctrl+C to stop.");
    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutdown signal received.");
    };
    dashboard::serve(state.clone(), cfg.dashboard.port, shutdown).await?;

    info!(
        provider_calls = state.service.provider_calls(),
        cache_hits = state.service.cache_hits(),
        hit_rate = format!("{:.1}%", state.service.cache_hit_rate() * 100.0),
        "STORMWATCH shut down cleanly."
    );

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("stormwatch=info"));

    let json_logging = std::env::var("STORMWATCH_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
