use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use std::sync::Arc;

use crate::clock::Clock;
use crate::weather::ViewModel;

/// A thread-safe cache with TTL (time-to-live) support
///
/// Keys are matched exactly. An entry is readable while its age is strictly
/// below the TTL; older entries read as a miss and are replaced on the next insert.
pub struct TtlCache<K, V> {
    data: DashMap<K, CacheEntry<V>>,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

struct CacheEntry<V> {
    value: V,
    captured_at: DateTime<Utc>,
}

impl<K, V> TtlCache<K, V>
where
    K: std::hash::Hash + Eq + Clone,
    V: Clone,
{
    /// Create a new cache with the specified TTL
    pub fn new(ttl: TimeDelta, clock: Arc<dyn Clock>) -> Self {
        Self {
            data: DashMap::new(),
            ttl,
            clock,
        }
    }

    /// Get a value from the cache if it exists and hasn't expired
    pub fn get(&self, key: &K) -> Option<V> {
        let entry = self.data.get(key)?;
        if !self.is_expired(&entry) {
            return Some(entry.value.clone());
        }
        drop(entry);
        // Re-checked under the write lock so a concurrent insert survives
        self.data.remove_if(key, |_, entry| self.is_expired(entry));
        None
    }

    /// Insert a value into the cache, resetting its capture time
    pub fn insert(&self, key: K, value: V) {
        let entry = CacheEntry {
            value,
            captured_at: self.clock.now(),
        };
        self.data.insert(key, entry);
    }

    fn is_expired(&self, entry: &CacheEntry<V>) -> bool {
        self.clock.now() - entry.captured_at >= self.ttl
    }

    /// Get the number of entries in the cache (including expired ones)
    pub fn len(&self) -> usize {
        self.data.len()
    }
}

/// Rendered weather keyed by the city string exactly as submitted
pub type WeatherCache = Arc<TtlCache<String, ViewModel>>;

/// Create the weather result cache
pub fn create_weather_cache(ttl_secs: u64, clock: Arc<dyn Clock>) -> WeatherCache {
    Arc::new(TtlCache::new(ttl_from_secs(ttl_secs), clock))
}

/// TTLs past what `TimeDelta` can hold saturate instead of wrapping
fn ttl_from_secs(ttl_secs: u64) -> TimeDelta {
    i64::try_from(ttl_secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX)
}
