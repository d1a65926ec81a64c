//! Persistence for saved locations.
//!
//! Keeps the dashboard's "current location" and the five most recently
//! used locations in a JSON file so they survive restarts. Forecast data
//! is never written here; the forecast cache is memory-only.

use anyhow::{Context, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::location::{same_location, RECENT_LOCATION_TOLERANCE};
use crate::types::Location;

/// Default locations file path.
pub const DEFAULT_LOCATIONS_FILE: &str = "stormwatch_locations.json";

/// Most-recently-used entries kept.
pub const MAX_RECENT_LOCATIONS: usize = 5;

/// On-disk shape of the locations file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedLocations {
    #[serde(default)]
    pub current: Option<Location>,
    /// Most recent first.
    #[serde(default)]
    pub recent: Vec<Location>,
}

impl SavedLocations {
    /// Move `location` to the front, merging any entry for the same place.
    fn push_recent(&mut self, location: Location) {
        self.recent
            .retain(|existing| !same_location(existing, &location, RECENT_LOCATION_TOLERANCE));
        self.recent.insert(0, location);
        self.recent.truncate(MAX_RECENT_LOCATIONS);
    }
}

/// Save locations to a JSON file.
pub fn save_locations(saved: &SavedLocations, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(saved).context("Failed to serialise saved locations")?;
    std::fs::write(path, &json)
        .with_context(|| format!("Failed to write locations to {}", path.display()))?;
    debug!(path = %path.display(), recent = saved.recent.len(), "Locations saved");
    Ok(())
}

/// Load locations from a JSON file.
/// Returns None if the file doesn't exist (first run).
pub fn load_locations(path: &Path) -> Result<Option<SavedLocations>> {
    if !path.exists() {
        info!(path = %path.display(), "No saved locations found, starting fresh");
        return Ok(None);
    }

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read locations from {}", path.display()))?;
    let saved: SavedLocations = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse locations from {}", path.display()))?;

    info!(
        path = %path.display(),
        current = ?saved.current.as_ref().map(|l| l.name.as_str()),
        recent = saved.recent.len(),
        "Locations loaded from disk"
    );
    Ok(Some(saved))
}

/// File-backed store of the current and recent locations.
pub struct LocationStore {
    path: PathBuf,
    state: RwLock<SavedLocations>,
}

impl LocationStore {
    /// Open the store at `path`, starting empty if the file is absent.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = load_locations(&path)?.unwrap_or_default();
        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    pub fn get_current_location(&self) -> Option<Location> {
        self.state.read().current.clone()
    }

    /// Make `location` current; it also becomes the most recent entry.
    pub fn set_current_location(&self, location: Location) -> Result<()> {
        self.update(|saved| {
            saved.current = Some(location.clone());
            saved.push_recent(location);
        })
    }

    pub fn add_recent_location(&self, location: Location) -> Result<()> {
        self.update(|saved| saved.push_recent(location))
    }

    /// Apply `change` to a copy, write it, and only then publish it.
    /// The write lock is held throughout so concurrent saves stay ordered.
    fn update(&self, change: impl FnOnce(&mut SavedLocations)) -> Result<()> {
        let mut state = self.state.write();
        let mut next = state.clone();
        change(&mut next);
        save_locations(&next, &self.path)?;
        *state = next;
        Ok(())
    }

    pub fn recent_locations(&self) -> Vec<Location> {
        self.state.read().recent.clone()
    }

    pub fn snapshot(&self) -> SavedLocations {
        self.state.read().clone()
    }

    /// Whether two locations count as the same place for the recents list.
    pub fn are_locations_same(a: &Location, b: &Location) -> bool {
        same_location(a, b, RECENT_LOCATION_TOLERANCE)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
