//! Time-bounded irradiance cache keyed by rounded coordinates.
//!
//! Nearby requests are deliberately collapsed: latitude and longitude are each
//! rounded to two decimal places (roughly 1 km), so coordinates that round to the
//! same bucket share one entry.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::models::NormalizedSolarData;

pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache is full ({capacity} entries)")]
    Full { capacity: usize },
    #[error("Cache lock poisoned")]
    Unavailable,
}

/// Cache identity for a coordinate pair, e.g. `"28.61,77.21"`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoordinateKey(String);

impl CoordinateKey {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self(format!(
            "{:.2},{:.2}",
            round_to_bucket(latitude),
            round_to_bucket(longitude)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CoordinateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn round_to_bucket(value: f64) -> f64 {
    // Adding 0.0 turns -0.0 into 0.0 so both sides of zero share a bucket
    (value * 100.0).round() / 100.0 + 0.0
}

/// Store for normalized irradiance results.
///
/// Caching is best-effort: callers treat a failed `set` as a miss next time,
/// never as a request failure.
pub trait SolarCache: Send + Sync {
    fn get(&self, latitude: f64, longitude: f64) -> Option<NormalizedSolarData>;
    fn set(
        &self,
        latitude: f64,
        longitude: f64,
        data: NormalizedSolarData,
    ) -> Result<(), CacheError>;
    fn clear(&self);
    /// Drop expired entries, returning how many were removed
    fn purge_expired(&self) -> usize;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: NormalizedSolarData,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

pub struct InMemorySolarCache {
    entries: RwLock<HashMap<CoordinateKey, CacheEntry>>,
    ttl: Duration,
    max_entries: Option<usize>,
}

impl InMemorySolarCache {
    pub fn new(ttl: Duration, max_entries: Option<usize>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            max_entries,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for InMemorySolarCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, None)
    }
}

impl SolarCache for InMemorySolarCache {
    fn get(&self, latitude: f64, longitude: f64) -> Option<NormalizedSolarData> {
        let key = CoordinateKey::new(latitude, longitude);
        let now = Instant::now();

        {
            let entries = self.entries.read().ok()?;
            match entries.get(&key) {
                Some(entry) if !entry.is_expired(now) => {
                    debug!(key = %key, "Cache hit");
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => {
                    debug!(key = %key, "Cache miss");
                    return None;
                }
            }
        }

        // Expired: evict lazily, re-checking under the write lock in case a fresh
        // value was stored in between
        if let Ok(mut entries) = self.entries.write() {
            if entries.get(&key).is_some_and(|e| e.is_expired(now)) {
                entries.remove(&key);
                debug!(key = %key, "Evicted expired cache entry");
            }
        }
        None
    }

    fn set(
        &self,
        latitude: f64,
        longitude: f64,
        data: NormalizedSolarData,
    ) -> Result<(), CacheError> {
        let key = CoordinateKey::new(latitude, longitude);
        let now = Instant::now();
        let mut entries = self.entries.write().map_err(|_| CacheError::Unavailable)?;

        if let Some(capacity) = self.max_entries {
            if !entries.contains_key(&key) && entries.len() >= capacity {
                entries.retain(|_, entry| !entry.is_expired(now));
                if entries.len() >= capacity {
                    warn!(key = %key, capacity, "Cache full, entry not stored");
                    return Err(CacheError::Full { capacity });
                }
            }
        }

        debug!(key = %key, ttl_secs = self.ttl.as_secs(), "Caching solar data");
        entries.insert(
            key,
            CacheEntry {
                value: data,
                expires_at: now + self.ttl,
            },
        );
        Ok(())
    }

    fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    fn purge_expired(&self) -> usize {
        let now = Instant::now();
        match self.entries.write() {
            Ok(mut entries) => {
                let before = entries.len();
                entries.retain(|_, entry| !entry.is_expired(now));
                before - entries.len()
            }
            Err(_) => 0,
        }
    }

    fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }
}
