//! Operating mode selector and mock-scenario harness.
//!
//! Holds `{mode, scenario_id, logging}` for one service instance. Any mode
//! may follow any other; `set` merges a partial patch and `current` hands
//! back a copy so callers can never reach the live state.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::scenarios::{self, MockScenario, ScenarioSummary, DEFAULT_SCENARIO_ID};
use crate::types::{WeatherError, WeatherResult};

/// Which path satisfies a forecast read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperatingMode {
    /// Always call the provider and refresh the cache.
    Production,
    /// Serve fresh cache entries; call the provider only on a miss.
    CacheFirst,
    /// Serve the selected scenario; never call the provider.
    Mock,
    /// Serve fresh cache entries or fail; never call the provider.
    Offline,
}

impl OperatingMode {
    /// `production` for release builds, `cache-first` while developing.
    pub fn build_default() -> Self {
        if cfg!(debug_assertions) {
            OperatingMode::CacheFirst
        } else {
            OperatingMode::Production
        }
    }

    /// Whether this mode may reach the network.
    pub fn uses_network(&self) -> bool {
        matches!(self, OperatingMode::Production | OperatingMode::CacheFirst)
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatingMode::Production => write!(f, "production"),
            OperatingMode::CacheFirst => write!(f, "cache-first"),
            OperatingMode::Mock => write!(f, "mock"),
            OperatingMode::Offline => write!(f, "offline"),
        }
    }
}

impl FromStr for OperatingMode {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" | "live" => Ok(OperatingMode::Production),
            "cache-first" | "cache_first" | "cache" => Ok(OperatingMode::CacheFirst),
            "mock" => Ok(OperatingMode::Mock),
            "offline" => Ok(OperatingMode::Offline),
            other => Err(WeatherError::InvalidInput(format!("unknown operating mode {other:?}"))),
        }
    }
}

/// Snapshot of the harness state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevConfig {
    pub mode: OperatingMode,
    pub scenario_id: String,
    /// Promote per-read cache decisions from `debug` to `info` logs.
    pub logging: bool,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            mode: OperatingMode::build_default(),
            scenario_id: DEFAULT_SCENARIO_ID.to_string(),
            logging: false,
        }
    }
}

/// Partial update merged over the current `DevConfig`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevConfigPatch {
    #[serde(default)]
    pub mode: Option<OperatingMode>,
    #[serde(default)]
    pub scenario_id: Option<String>,
    #[serde(default)]
    pub logging: Option<bool>,
}

impl DevConfigPatch {
    pub fn mode(mode: OperatingMode) -> Self {
        Self {
            mode: Some(mode),
            ..Default::default()
        }
    }

    pub fn scenario(id: impl Into<String>) -> Self {
        Self {
            mode: Some(OperatingMode::Mock),
            scenario_id: Some(id.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Default)]
pub struct DevHarness {
    config: RwLock<DevConfig>,
}

impl DevHarness {
    pub fn new(initial: DevConfig) -> Self {
        Self {
            config: RwLock::new(initial),
        }
    }

    /// Merge `patch` over the current config.
    ///
    /// Unknown scenario ids are rejected and leave the state untouched.
    pub fn set(&self, patch: DevConfigPatch) -> WeatherResult<DevConfig> {
        if let Some(id) = &patch.scenario_id {
            if !scenarios::exists(id) {
                return Err(WeatherError::UnknownScenario(id.clone()));
            }
        }

        let mut config = self.config.write();
        if let Some(mode) = patch.mode {
            config.mode = mode;
        }
        if let Some(id) = patch.scenario_id {
            config.scenario_id = id;
        }
        if let Some(logging) = patch.logging {
            config.logging = logging;
        }
        Ok(config.clone())
    }

    pub fn current(&self) -> DevConfig {
        self.config.read().clone()
    }

    pub fn mode(&self) -> OperatingMode {
        self.config.read().mode
    }

    pub fn available_scenarios(&self) -> Vec<ScenarioSummary> {
        scenarios::summaries()
    }

    /// The full payload of the selected scenario.
    pub fn active_scenario(&self) -> WeatherResult<MockScenario> {
        let id = self.config.read().scenario_id.clone();
        scenarios::find(&id).ok_or(WeatherError::UnknownScenario(id))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
