//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs. Every
//! section has defaults, so a missing file or a partial file still yields a
//! usable config. The API key is referenced by env-var name and resolved at
//! runtime via `std::env::var`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::cache::{CacheTtls, store::DEFAULT_TTL_MINS};
use crate::dev::{DevConfig, OperatingMode};
use crate::geocode::GEOCODE_TTL_HOURS;
use crate::provider::openweather::Units;
use crate::scenarios::DEFAULT_SCENARIO_ID;
use crate::storage::DEFAULT_LOCATIONS_FILE;

/// Environment variable that overrides `[dev] mode`.
pub const MODE_ENV: &str = "STORMWATCH_MODE";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub dev: DevSection,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_key_env: String,
    /// Override for tests and proxies; the public endpoint when absent.
    pub base_url: Option<String>,
    pub units: Units,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENWEATHER_API_KEY".to_string(),
            base_url: None,
            units: Units::Imperial,
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub current_ttl_mins: i64,
    pub hourly_ttl_mins: i64,
    pub daily_ttl_mins: i64,
    pub geocode_ttl_hours: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            current_ttl_mins: DEFAULT_TTL_MINS,
            hourly_ttl_mins: DEFAULT_TTL_MINS,
            daily_ttl_mins: DEFAULT_TTL_MINS,
            geocode_ttl_hours: GEOCODE_TTL_HOURS,
        }
    }
}

/// `[dev]` as written in the file. The mode is optional so the build
/// default applies when it is left out.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DevSection {
    pub mode: Option<OperatingMode>,
    pub scenario_id: String,
    pub logging: bool,
}

impl Default for DevSection {
    fn default() -> Self {
        Self {
            mode: None,
            scenario_id: DEFAULT_SCENARIO_ID.to_string(),
            logging: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 8080,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub locations_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            locations_file: DEFAULT_LOCATIONS_FILE.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Like [`AppConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            info!(path, "No config file found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }

    /// Initial harness state: file settings, with `STORMWATCH_MODE` winning.
    pub fn dev_config(&self) -> DevConfig {
        self.dev_config_with(std::env::var(MODE_ENV).ok().as_deref())
    }

    fn dev_config_with(&self, mode_override: Option<&str>) -> DevConfig {
        let mut mode = self.dev.mode.unwrap_or_else(OperatingMode::build_default);
        if let Some(raw) = mode_override {
            match raw.parse::<OperatingMode>() {
                Ok(parsed) => mode = parsed,
                Err(e) => warn!(value = raw, error = %e, "Ignoring {MODE_ENV}"),
            }
        }
        DevConfig {
            mode,
            scenario_id: self.dev.scenario_id.clone(),
            logging: self.dev.logging,
        }
    }

    pub fn cache_ttls(&self) -> CacheTtls {
        CacheTtls {
            current: chrono::Duration::minutes(self.cache.current_ttl_mins),
            hourly: chrono::Duration::minutes(self.cache.hourly_ttl_mins),
            daily: chrono::Duration::minutes(self.cache.daily_ttl_mins),
        }
    }

    pub fn geocode_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.cache.geocode_ttl_hours)
    }

    pub fn provider_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.provider.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [provider]
        api_key_env = "OWM_KEY"
        units = "metric"
        timeout_secs = 5

        [cache]
        hourly_ttl_mins = 30

        [dev]
        mode = "offline"
        scenario_id = "blizzard"
        logging = true

        [dashboard]
        port = 9000
    "#;

    #[test]
    fn test_parse_sample() {
        let cfg = AppConfig::parse(SAMPLE).unwrap();
        assert_eq!(cfg.provider.api_key_env, "OWM_KEY");
        assert_eq!(cfg.provider.units, Units::Metric);
        assert_eq!(cfg.provider_timeout(), std::time::Duration::from_secs(5));
        assert_eq!(cfg.dashboard.port, 9000);
        assert!(cfg.dashboard.enabled);
        assert_eq!(cfg.storage.locations_file, DEFAULT_LOCATIONS_FILE);

        let ttls = cfg.cache_ttls();
        assert_eq!(ttls.current, chrono::Duration::minutes(10));
        assert_eq!(ttls.hourly, chrono::Duration::minutes(30));
        assert_eq!(cfg.geocode_ttl(), chrono::Duration::hours(24));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let cfg = AppConfig::parse("").unwrap();
        assert_eq!(cfg.provider.api_key_env, "OPENWEATHER_API_KEY");
        assert_eq!(cfg.provider.units, Units::Imperial);
        let dev = cfg.dev_config_with(None);
        assert_eq!(dev.mode, OperatingMode::build_default());
        assert_eq!(dev.scenario_id, DEFAULT_SCENARIO_ID);
        assert!(!dev.logging);
    }

    #[test]
    fn test_mode_override() {
        let cfg = AppConfig::parse(SAMPLE).unwrap();
        assert_eq!(cfg.dev_config_with(None).mode, OperatingMode::Offline);
        assert_eq!(cfg.dev_config_with(Some("mock")).mode, OperatingMode::Mock);
        // Garbage in the env var leaves the file setting alone.
        assert_eq!(cfg.dev_config_with(Some("warp")).mode, OperatingMode::Offline);
        assert_eq!(cfg.dev_config_with(None).scenario_id, "blizzard");
    }

    #[test]
    fn test_unknown_mode_in_file_is_error() {
        assert!(AppConfig::parse("[dev]\nmode = \"turbo\"").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(AppConfig::load("definitely/not/here.toml").is_err());
        assert!(AppConfig::load_or_default("definitely/not/here.toml").is_ok());
    }
}
