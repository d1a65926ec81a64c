//! In-memory forecast cache.
//!
//! Holds one live entry per key per payload kind (current conditions,
//! hourly-by-date, daily outlook). Staleness is decided on read against a
//! fixed per-kind TTL and an injected clock, so tests can move time
//! without sleeping. Nothing is persisted; a restart starts cold.

pub mod clock;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{CacheEntry, CacheStats, CacheTtls, ForecastCache, KindStats, TemporalCache};
