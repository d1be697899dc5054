// ── Response cache ──
//
// Read-through TTL cache for entity-client reads. The cache is an
// injected collaborator: whoever builds the entity clients decides how
// widely one instance is shared.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{trace, warn};

/// Default lifetime of a cached response.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Type-erased cached value.
pub type CachedValue = Arc<dyn Any + Send + Sync>;

/// Storage behind `with_cache`.
pub trait ResponseCache: Send + Sync {
    /// Return the entry for `key` if it is younger than the TTL.
    fn get(&self, key: &str) -> Option<CachedValue>;

    /// Store (or overwrite) the entry for `key`, stamped now.
    fn insert(&self, key: String, value: CachedValue);

    /// Drop one entry without affecting the purge epoch.
    fn remove(&self, key: &str);

    /// Drop every entry whose key satisfies `pred` and advance the purge
    /// epoch. Returns the number of entries removed.
    fn remove_where(&self, pred: &dyn Fn(&str) -> bool) -> usize;

    /// Counter advanced by every `remove_where`. A result fetched across
    /// an advance may predate the purge and must not be stored.
    fn epoch(&self) -> u64;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct CacheEntry {
    data: CachedValue,
    timestamp: Instant,
}

/// Concurrent map with a fixed time-to-live.
pub struct TtlCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    epoch: AtomicU64,
}

impl TtlCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            epoch: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ResponseCache for TtlCache {
    fn get(&self, key: &str) -> Option<CachedValue> {
        let entry = self.entries.get(key)?;
        if entry.timestamp.elapsed() < self.ttl {
            return Some(Arc::clone(&entry.data));
        }
        drop(entry);
        // Expired: the next `insert` overwrites it, but don't leave it
        // around if nobody asks again.
        self.entries.remove(key);
        None
    }

    fn insert(&self, key: String, value: CachedValue) {
        self.entries.insert(
            key,
            CacheEntry {
                data: value,
                timestamp: Instant::now(),
            },
        );
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    fn remove_where(&self, pred: &dyn Fn(&str) -> bool) -> usize {
        // Advance first: an insert racing this purge either lands before
        // `retain` (and is removed by it) or sees the new epoch.
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let before = self.entries.len();
        self.entries.retain(|k, _| !pred(k));
        before - self.entries.len()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }
}

/// Deterministic composite key: `METHOD:url:json(params)`.
///
/// `params` is serialized as-is, so struct fields and `IndexMap` entries
/// keep their declaration/insertion order. Callers must build params
/// consistently or equivalent requests fragment into distinct keys.
///
/// Returns `None` when `params` cannot be serialized; such a request is
/// never cached.
pub fn cache_key<P: Serialize + ?Sized>(method: &str, url: &str, params: &P) -> Option<String> {
    match serde_json::to_string(params) {
        Ok(json) => Some(format!("{method}:{url}:{json}")),
        Err(e) => {
            warn!(%method, %url, error = %e, "request params not serializable, bypassing cache");
            None
        }
    }
}

/// The URL segment of a key built by [`cache_key`].
pub fn key_url(key: &str) -> Option<&str> {
    let (_, rest) = key.split_once(':')?;
    rest.split_once(':').map(|(url, _)| url)
}

/// Return the cached value for `key` or run `operation` and cache its
/// result. Failed operations leave no entry behind, and neither does a
/// result whose fetch overlapped a purge. `None` skips the cache.
pub async fn with_cache<T, E, F, Fut>(
    cache: &dyn ResponseCache,
    key: Option<String>,
    operation: F,
) -> Result<T, E>
where
    T: Clone + Send + Sync + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let Some(key) = key else {
        return operation().await;
    };
    if let Some(hit) = cache.get(&key) {
        if let Ok(value) = hit.downcast::<T>() {
            trace!(%key, "response cache hit");
            return Ok(T::clone(&value));
        }
    }
    trace!(%key, "response cache miss");
    let epoch = cache.epoch();
    let value = operation().await?;
    cache.insert(key.clone(), Arc::new(value.clone()));
    if cache.epoch() != epoch {
        trace!(%key, "cache purged during fetch, result not kept");
        cache.remove(&key);
    }
    Ok(value)
}
