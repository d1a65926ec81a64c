//! Place search and reverse geocoding.
//!
//! Wraps the OpenWeather geocoding endpoints and memoizes answers in a
//! `TemporalCache` with a day-long TTL; place names change far less often
//! than forecasts.
//!
//! API: `https://api.openweathermap.org/geo/1.0/{direct,reverse}`

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::cache::{Clock, KindStats, TemporalCache};
use crate::location::{cache_key, validate_coordinates};
use crate::provider::openweather::OpenWeatherClient;
use crate::types::{Location, WeatherError, WeatherResult};

/// Default TTL for geocoding answers.
pub const GEOCODE_TTL_HOURS: i64 = 24;

/// Maximum places returned per lookup.
const RESULT_LIMIT: u32 = 5;

/// One match from the geocoding API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub state: Option<String>,
}

impl Place {
    /// "Name, State, Country" with empty parts skipped.
    pub fn display_name(&self) -> String {
        [Some(self.name.as_str()), self.state.as_deref(), Some(self.country.as_str())]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn to_location(&self) -> Location {
        Location::new(self.lat, self.lon, self.display_name())
    }
}

pub struct Geocoder {
    client: Arc<OpenWeatherClient>,
    clock: Arc<dyn Clock>,
    searches: TemporalCache<Vec<Place>>,
    reverses: TemporalCache<Vec<Place>>,
}

impl Geocoder {
    pub fn new(client: Arc<OpenWeatherClient>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            client,
            clock,
            searches: TemporalCache::new(ttl),
            reverses: TemporalCache::new(ttl),
        }
    }

    /// Forward lookup of a free-text place query.
    pub async fn search(&self, query: &str) -> WeatherResult<Vec<Place>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(WeatherError::InvalidInput("search query is empty".into()));
        }

        let key = query.to_lowercase();
        if let Some(hit) = self.searches.get(&key, self.clock.now_ms()) {
            debug!(query, "Geocode cache hit");
            return Ok(hit);
        }

        let path = format!(
            "/geo/1.0/direct?q={}&limit={RESULT_LIMIT}",
            urlencoding::encode(query)
        );
        let places: Vec<Place> = self.client.get_json(&path, &[]).await?;

        let anchor = places
            .first()
            .map(Place::to_location)
            .unwrap_or_else(|| Location::new(0.0, 0.0, query));
        self.searches.put(key, places.clone(), &anchor, self.clock.now_ms());
        Ok(places)
    }

    /// Places near a coordinate, nearest first.
    pub async fn reverse(&self, lat: f64, lng: f64) -> WeatherResult<Vec<Place>> {
        validate_coordinates(lat, lng)?;
        let location = Location::new(lat, lng, "");
        let key = cache_key(&location);
        if let Some(hit) = self.reverses.get(&key, self.clock.now_ms()) {
            debug!(key = %key, "Reverse geocode cache hit");
            return Ok(hit);
        }

        let params = [
            ("lat", lat.to_string()),
            ("lon", lng.to_string()),
            ("limit", RESULT_LIMIT.to_string()),
        ];
        let places: Vec<Place> = self.client.get_json("/geo/1.0/reverse", &params).await?;
        self.reverses.put(key, places.clone(), &location, self.clock.now_ms());
        Ok(places)
    }

    pub fn stats(&self) -> (KindStats, KindStats) {
        let now = self.clock.now_ms();
        (self.searches.stats(now), self.reverses.stats(now))
    }

    pub fn clear(&self) {
        self.searches.clear();
        self.reverses.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
