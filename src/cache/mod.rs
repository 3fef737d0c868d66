//! Response caching for the OpenPlantbook API client.
//!
//! [`Cache`] is a capability contract: any conforming store can replace the
//! built-in implementations. [`InMemoryCache`] is the functioning default
//! with a background expiry sweep; [`NoopCache`] disables caching without
//! requiring branches elsewhere in the request pipeline.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Interval between background sweeps of expired entries.
const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Key/value store with per-entry TTL for caching API responses.
pub trait Cache: Send + Sync {
    /// Retrieves a value from the cache. Expired entries report a miss even
    /// if the background sweep has not removed them yet.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Stores a value in the cache with a TTL.
    fn set(&self, key: &str, value: Vec<u8>, ttl: Duration);

    /// Removes a value from the cache.
    fn delete(&self, key: &str);

    /// Removes all values from the cache.
    fn clear(&self);
}

struct CacheEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// In-memory [`Cache`] implementation with background cleanup.
///
/// Reads proceed concurrently; writes are exclusive. A background task
/// sweeps expired entries every five minutes when a Tokio runtime is
/// available at construction; without one, expiry is enforced passively
/// by [`Cache::get`].
///
/// Clones share the same underlying store. Call [`InMemoryCache::close`]
/// once to stop the sweep task.
#[derive(Clone)]
pub struct InMemoryCache {
    items: Arc<RwLock<HashMap<String, CacheEntry>>>,
    shutdown: CancellationToken,
}

impl InMemoryCache {
    /// Creates a new in-memory cache and starts the background sweep.
    pub fn new() -> Self {
        let items = Arc::new(RwLock::new(HashMap::new()));
        let shutdown = CancellationToken::new();

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let sweep_items = Arc::clone(&items);
            let sweep_shutdown = shutdown.clone();
            handle.spawn(async move {
                let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
                ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                // The first tick completes immediately.
                ticker.tick().await;
                loop {
                    tokio::select! {
                        _ = sweep_shutdown.cancelled() => break,
                        _ = ticker.tick() => Self::remove_expired(&sweep_items),
                    }
                }
            });
        }

        Self { items, shutdown }
    }

    /// Stops the background sweep task. The store itself remains usable;
    /// expired entries are still hidden by [`Cache::get`].
    pub fn close(self) {
        self.shutdown.cancel();
    }

    fn remove_expired(items: &RwLock<HashMap<String, CacheEntry>>) {
        let now = Instant::now();
        items.write().retain(|_, entry| entry.expires_at > now);
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Cache for InMemoryCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let items = self.items.read();
        let entry = items.get(key)?;
        if Instant::now() >= entry.expires_at {
            return None;
        }
        Some(entry.value.clone())
    }

    fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.items.write().insert(key.to_string(), entry);
    }

    fn delete(&self, key: &str) {
        self.items.write().remove(key);
    }

    fn clear(&self) {
        self.items.write().clear();
    }
}

/// [`Cache`] implementation that stores nothing.
///
/// Always reports a miss and discards writes; used to disable caching
/// entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Creates a new no-op cache.
    pub fn new() -> Self {
        Self
    }
}

impl Cache for NoopCache {
    fn get(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) {}

    fn delete(&self, _key: &str) {}

    fn clear(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        let cache = InMemoryCache::new();
        cache.set("key", b"value".to_vec(), Duration::from_secs(60));
        assert_eq!(cache.get("key"), Some(b"value".to_vec()));
    }

    #[test]
    fn get_missing_key_is_none() {
        let cache = InMemoryCache::new();
        assert_eq!(cache.get("absent"), None);
    }

    #[test]
    fn expired_entry_reports_miss_before_sweep() {
        let cache = InMemoryCache::new();
        cache.set("key", b"value".to_vec(), Duration::from_millis(10));
        assert!(cache.get("key").is_some());

        std::thread::sleep(Duration::from_millis(25));
        assert_eq!(cache.get("key"), None);
    }

    #[test]
    fn set_overwrites_existing_entry() {
        let cache = InMemoryCache::new();
        cache.set("key", b"old".to_vec(), Duration::from_secs(60));
        cache.set("key", b"new".to_vec(), Duration::from_secs(60));
        assert_eq!(cache.get("key"), Some(b"new".to_vec()));
    }

    #[test]
    fn delete_removes_entry() {
        let cache = InMemoryCache::new();
        cache.set("key", b"value".to_vec(), Duration::from_secs(60));
        cache.delete("key");
        assert_eq!(cache.get("key"), None);
    }

    #[test]
    fn clear_removes_all_entries() {
        let cache = InMemoryCache::new();
        cache.set("a", b"1".to_vec(), Duration::from_secs(60));
        cache.set("b", b"2".to_vec(), Duration::from_secs(60));
        cache.clear();
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), None);
    }

    #[tokio::test]
    async fn background_sweep_removes_expired_entries() {
        let cache = InMemoryCache::new();
        cache.set("stale", b"value".to_vec(), Duration::from_millis(5));
        tokio::time::sleep(Duration::from_millis(20)).await;

        InMemoryCache::remove_expired(&cache.items);
        assert!(cache.items.read().is_empty());
    }

    #[tokio::test]
    async fn close_stops_the_sweep_without_deleting() {
        let cache = InMemoryCache::new();
        cache.set("key", b"value".to_vec(), Duration::from_secs(60));

        let handle = cache.clone();
        handle.close();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(cache.get("key"), Some(b"value".to_vec()));
    }

    #[test]
    fn noop_cache_always_misses() {
        let cache = NoopCache::new();
        cache.set("key", b"value".to_vec(), Duration::from_secs(60));
        assert_eq!(cache.get("key"), None);

        // Nothing to delete or clear, but the calls must be valid.
        cache.delete("key");
        cache.clear();
    }
}
