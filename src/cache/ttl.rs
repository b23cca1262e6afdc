//! TTL-based in-memory cache.

use dashmap::DashMap;
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::config::CacheConfig;
use crate::observability::metrics;

struct Entry<V> {
    value: V,
    inserted_at: Instant,
    ttl: Duration,
}

impl<V> Entry<V> {
    /// An entry is dead once its age reaches its TTL, so a zero TTL is never readable.
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) >= self.ttl
    }
}

/// Snapshot of one cache entry.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EntryStats {
    pub key: String,
    pub age_ms: u64,
    pub ttl_ms: u64,
}

/// Snapshot of the whole cache.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    pub size: usize,
    pub entries: Vec<EntryStats>,
}

/// A thread-safe cache whose entries expire after a TTL.
///
/// Cloning is cheap and every clone sees the same entries. Expired entries
/// are evicted lazily, on read or by `purge_expired`.
pub struct TtlCache<K, V> {
    inner: Arc<DashMap<K, Entry<V>>>,
    default_ttl: Duration,
}

impl<K, V> Clone for TtlCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            default_ttl: self.default_ttl,
        }
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create a new empty cache.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            default_ttl,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(Duration::from_millis(config.default_ttl_ms))
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Insert with the default TTL, replacing any previous entry.
    pub fn set(&self, key: K, value: V) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    pub fn set_with_ttl(&self, key: K, value: V, ttl: Duration) {
        self.inner.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
                ttl,
            },
        );
        metrics::record_cache_size(self.inner.len());
    }

    /// Get a live value. An expired entry is evicted and reported as missing.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let expired = match self.inner.get(key) {
            Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            // re-check under the write lock; a fresh value may have landed meanwhile
            self.inner.remove_if(key, |_, entry| entry.is_expired(now));
            metrics::record_cache_size(self.inner.len());
        }
        None
    }

    /// Return the cached value, or await `load` and cache what it yields.
    ///
    /// Failures are returned to the caller and never cached. Concurrent misses
    /// on the same key may each run their loader; the last write wins.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        let value = load().await?;
        self.set(key, value.clone());
        Ok(value)
    }

    /// Drop one entry, returning its value if it was still live.
    pub fn remove(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let removed = self
            .inner
            .remove(key)
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(_, entry)| entry.value);
        metrics::record_cache_size(self.inner.len());
        removed
    }

    pub fn clear(&self) {
        self.inner.clear();
        metrics::record_cache_size(0);
    }

    /// Evict every expired entry, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.inner.len();
        self.inner.retain(|_, entry| !entry.is_expired(now));
        let after = self.inner.len();
        metrics::record_cache_size(after);
        before.saturating_sub(after)
    }

    /// Number of stored entries, expired ones not yet evicted included.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Display,
    V: Clone,
{
    /// Describe every stored entry, sorted by key.
    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let mut entries: Vec<EntryStats> = self
            .inner
            .iter()
            .map(|r| EntryStats {
                key: r.key().to_string(),
                age_ms: now.saturating_duration_since(r.value().inserted_at).as_millis() as u64,
                ttl_ms: r.value().ttl.as_millis() as u64,
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));

        CacheStats {
            size: entries.len(),
            entries,
        }
    }
}
