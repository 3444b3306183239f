//! Bounded TTL cache for pipeline results.
//!
//! Identical queries within the TTL window are served from memory instead
//! of re-running the extraction, retrieval, and composition stages. The
//! cache is bounded: past capacity, the entry closest to expiry is
//! evicted first.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::debug;

use crate::types::Recommendation;

/// Default maximum number of cached entries.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Default entry lifetime (24 hours).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Normalize a query into a cache key.
///
/// Queries differing only in case or surrounding whitespace share an
/// entry.
fn cache_key(query: &str) -> String {
    query.trim().to_lowercase()
}

struct CacheEntry {
    recommendation: Recommendation,
    expires_at: Instant,
}

/// Bounded, TTL-expiring cache of [`Recommendation`]s keyed by normalized
/// query.
///
/// All operations take a single coarse lock; pipeline runs dominate
/// request latency, so contention here is negligible. Lookups, stores,
/// and evictions never fail.
pub struct ResultCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    capacity: usize,
    ttl: Duration,
}

impl ResultCache {
    /// Create a cache with the given capacity and TTL.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity,
            ttl,
        }
    }

    /// Look up a query.
    ///
    /// An expired entry found here is removed and reported as a miss;
    /// expired results are never returned.
    pub fn lookup(&self, query: &str) -> Option<Recommendation> {
        let key = cache_key(query);
        let mut entries = self.entries.lock();

        match entries.get(&key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                debug!(key = %key, "Cache hit");
                Some(entry.recommendation.clone())
            }
            Some(_) => {
                entries.remove(&key);
                debug!(key = %key, "Cache entry expired");
                None
            }
            None => None,
        }
    }

    /// Store a result, overwriting any existing entry for the same
    /// normalized query.
    ///
    /// When the insert pushes the cache past capacity, entries closest
    /// to expiry are evicted until the bound holds.
    pub fn store(&self, query: &str, recommendation: Recommendation) {
        let key = cache_key(query);
        let mut entries = self.entries.lock();

        entries.insert(
            key,
            CacheEntry {
                recommendation,
                expires_at: Instant::now() + self.ttl,
            },
        );

        while entries.len() > self.capacity {
            let victim = entries
                .iter()
                .min_by_key(|(_, entry)| entry.expires_at)
                .map(|(key, _)| key.clone());

            match victim {
                Some(key) => {
                    entries.remove(&key);
                    debug!(key = %key, "Evicted cache entry at capacity");
                }
                None => break,
            }
        }
    }

    /// Number of live (unexpired) entries. Sweeps expired entries first.
    pub fn len(&self) -> usize {
        let mut entries = self.entries.lock();
        let now = Instant::now();
        entries.retain(|_, entry| entry.expires_at > now);
        entries.len()
    }

    /// Returns true if the cache holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL)
    }
}
