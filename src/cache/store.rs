use chrono::Duration;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;

use crate::types::{CacheKind, CurrentWeather, DailyForecast, HourlyForecast, Location};

/// Default freshness window for every forecast kind.
pub const DEFAULT_TTL_MINS: i64 = 10;

/// A stored payload with the moment it was fetched.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub data: T,
    /// Epoch milliseconds at write time.
    pub timestamp: i64,
    pub location: Location,
}

impl<T> CacheEntry<T> {
    /// `age == ttl` still counts as fresh.
    fn is_fresh(&self, now_ms: i64, ttl_ms: i64) -> bool {
        now_ms - self.timestamp <= ttl_ms
    }
}

/// Count of entries held for one kind, and how many are still fresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindStats {
    pub total: usize,
    pub fresh: usize,
}

/// Keyed store with a single fixed TTL.
///
/// Expired entries are never evicted, only ignored by `get`; the next
/// successful write at the same key replaces them.
#[derive(Debug)]
pub struct TemporalCache<T> {
    ttl_ms: i64,
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
}

impl<T: Clone> TemporalCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl_ms: ttl.num_milliseconds(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::milliseconds(self.ttl_ms)
    }

    pub fn put(&self, key: impl Into<String>, data: T, location: &Location, now_ms: i64) {
        self.entries.write().insert(
            key.into(),
            CacheEntry {
                data,
                timestamp: now_ms,
                location: location.clone(),
            },
        );
    }

    pub fn get(&self, key: &str, now_ms: i64) -> Option<T> {
        self.entries
            .read()
            .get(key)
            .filter(|entry| entry.is_fresh(now_ms, self.ttl_ms))
            .map(|entry| entry.data.clone())
    }

    /// The full entry regardless of age.
    pub fn entry(&self, key: &str) -> Option<CacheEntry<T>> {
        self.entries.read().get(key).cloned()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn stats(&self, now_ms: i64) -> KindStats {
        let entries = self.entries.read();
        KindStats {
            total: entries.len(),
            fresh: entries
                .values()
                .filter(|entry| entry.is_fresh(now_ms, self.ttl_ms))
                .count(),
        }
    }
}

/// Per-kind TTLs, fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct CacheTtls {
    pub current: Duration,
    pub hourly: Duration,
    pub daily: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            current: Duration::minutes(DEFAULT_TTL_MINS),
            hourly: Duration::minutes(DEFAULT_TTL_MINS),
            daily: Duration::minutes(DEFAULT_TTL_MINS),
        }
    }
}

/// Snapshot of every kind's entry counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub current: KindStats,
    pub hourly: KindStats,
    pub daily: KindStats,
}

impl CacheStats {
    pub fn for_kind(&self, kind: CacheKind) -> KindStats {
        match kind {
            CacheKind::Current => self.current,
            CacheKind::Hourly => self.hourly,
            CacheKind::Daily => self.daily,
        }
    }
}

/// The three forecast caches, each expiring independently.
#[derive(Debug)]
pub struct ForecastCache {
    pub current: TemporalCache<CurrentWeather>,
    pub hourly: TemporalCache<Vec<HourlyForecast>>,
    pub daily: TemporalCache<Vec<DailyForecast>>,
}

impl ForecastCache {
    pub fn new(ttls: CacheTtls) -> Self {
        Self {
            current: TemporalCache::new(ttls.current),
            hourly: TemporalCache::new(ttls.hourly),
            daily: TemporalCache::new(ttls.daily),
        }
    }

    pub fn clear(&self) {
        self.current.clear();
        self.hourly.clear();
        self.daily.clear();
    }

    pub fn stats(&self, now_ms: i64) -> CacheStats {
        CacheStats {
            current: self.current.stats(now_ms),
            hourly: self.hourly.stats(now_ms),
            daily: self.daily.stats(now_ms),
        }
    }
}

impl Default for ForecastCache {
    fn default() -> Self {
        Self::new(CacheTtls::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
