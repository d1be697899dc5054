// ── Query cache ──
//
// Keyed store of query results with soft staleness and hard eviction.
// Concurrent fetches of the same key coalesce: the first caller fetches,
// the rest wait on a per-key lock and read what it stored.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use super::key::{InvalidationSet, QueryKey};
use crate::error::DomainError;

/// Staleness and eviction windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// After this, a cached result is refetched on next read.
    pub stale_time: Duration,
    /// After this without being read or written, a result is evicted.
    pub gc_time: Duration,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(5 * 60),
            gc_time: Duration::from_secs(30 * 60),
        }
    }
}

struct QueryEntry {
    value: Arc<dyn Any + Send + Sync>,
    updated_at: Instant,
    last_used: Instant,
    invalidated: bool,
}

/// Shared cache for every query the console issues.
pub struct QueryClient {
    entries: DashMap<QueryKey, QueryEntry>,
    locks: DashMap<QueryKey, Arc<Mutex<()>>>,
    /// Keys with a fetch in flight; `true` once an invalidation hit them.
    in_flight: DashMap<QueryKey, bool>,
    options: QueryOptions,
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new(QueryOptions::default())
    }
}

impl QueryClient {
    pub fn new(options: QueryOptions) -> Self {
        Self {
            entries: DashMap::new(),
            locks: DashMap::new(),
            in_flight: DashMap::new(),
            options,
        }
    }

    pub fn options(&self) -> QueryOptions {
        self.options
    }

    /// Return fresh cached data for `key`, or run `fetcher` and store it.
    ///
    /// On failure the previous data (if any) is kept for placeholder use.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<Arc<T>, DomainError>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        self.collect_garbage();

        if let Some(hit) = self.fresh::<T>(&key) {
            trace!(?key, "query cache hit");
            return Ok(hit);
        }

        let lock = Arc::clone(self.locks.entry(key.clone()).or_default().value());
        let _guard = lock.lock().await;

        // Someone else may have filled it while we waited.
        if let Some(hit) = self.fresh::<T>(&key) {
            trace!(?key, "query coalesced with in-flight fetch");
            return Ok(hit);
        }

        debug!(?key, "fetching query");
        self.in_flight.insert(key.clone(), false);
        let value = match fetcher().await {
            Ok(value) => Arc::new(value),
            Err(e) => {
                self.in_flight.remove(&key);
                return Err(e);
            }
        };

        // Store first, then check the flag: an invalidation that runs
        // between the two marks the stored entry itself.
        self.set_query_data(key.clone(), Arc::clone(&value));
        if self.in_flight.remove(&key).is_some_and(|(_, hit)| hit) {
            debug!(?key, "query invalidated while fetching, stored as stale");
            if let Some(mut entry) = self.entries.get_mut(&key) {
                entry.invalidated = true;
            }
        }
        Ok(value)
    }

    /// Fetch into the cache, swallowing failures.
    pub async fn prefetch<T, F, Fut>(&self, key: QueryKey, fetcher: F)
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        if let Err(e) = self.fetch(key.clone(), fetcher).await {
            warn!(?key, error = %e, "prefetch failed");
        }
    }

    /// Store `value` under `key`, fresh as of now.
    pub fn set_query_data<T: Send + Sync + 'static>(&self, key: QueryKey, value: Arc<T>) {
        let now = Instant::now();
        self.entries.insert(
            key,
            QueryEntry {
                value,
                updated_at: now,
                last_used: now,
                invalidated: false,
            },
        );
    }

    /// Cached data for `key` regardless of staleness.
    pub fn get_query_data<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let mut entry = self.entries.get_mut(key)?;
        entry.last_used = Instant::now();
        Arc::clone(&entry.value).downcast::<T>().ok()
    }

    /// Whether `key` holds data that should be refetched before use.
    /// Missing keys count as stale.
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.entries.get(key).is_none_or(|e| self.entry_is_stale(&e))
    }

    pub fn is_invalidated(&self, key: &QueryKey) -> bool {
        self.entries.get(key).is_some_and(|e| e.invalidated)
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Mark every key matched by `set` stale. Data stays available as a
    /// placeholder until the next fetch replaces it. A fetch in flight
    /// for a matched key stores its result already stale.
    pub fn invalidate(&self, set: &InvalidationSet) -> Vec<QueryKey> {
        for mut pending in self.in_flight.iter_mut() {
            if set.matches(pending.key()) {
                *pending.value_mut() = true;
            }
        }
        let mut touched = Vec::new();
        for mut entry in self.entries.iter_mut() {
            if set.matches(entry.key()) {
                entry.invalidated = true;
                touched.push(entry.key().clone());
            }
        }
        debug!(count = touched.len(), "invalidated queries");
        touched
    }

    pub fn remove(&self, key: &QueryKey) {
        self.entries.remove(key);
        self.locks.remove(key);
    }

    /// Evict entries unused for longer than `gc_time`.
    pub fn collect_garbage(&self) -> usize {
        let gc_time = self.options.gc_time;
        let before = self.entries.len();
        self.entries.retain(|_, e| e.last_used.elapsed() < gc_time);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            self.locks.retain(|k, _| self.entries.contains_key(k));
            trace!(evicted, "query cache garbage collected");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn fresh<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let mut entry = self.entries.get_mut(key)?;
        if self.entry_is_stale(&entry) {
            return None;
        }
        entry.last_used = Instant::now();
        Arc::clone(&entry.value).downcast::<T>().ok()
    }

    fn entry_is_stale(&self, entry: &QueryEntry) -> bool {
        entry.invalidated || entry.updated_at.elapsed() >= self.options.stale_time
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::EntityKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn key() -> QueryKey {
        QueryKey::all(EntityKind::Area)
    }

    async fn fetch_counting(client: &QueryClient, calls: &AtomicUsize) -> Arc<usize> {
        client
            .fetch(key(), || async {
                Ok(calls.fetch_add(1, Ordering::SeqCst) + 1)
            })
            .await
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_data_is_served_until_stale_time() {
        let client = QueryClient::default();
        let calls = AtomicUsize::new(0);

        assert_eq!(*fetch_counting(&client, &calls).await, 1);
        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(*fetch_counting(&client, &calls).await, 1);
        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(*fetch_counting(&client, &calls).await, 2);
    }

    #[tokio::test]
    async fn invalidated_data_is_refetched_but_kept_meanwhile() {
        let client = QueryClient::default();
        let calls = AtomicUsize::new(0);
        fetch_counting(&client, &calls).await;

        client.invalidate(&InvalidationSet::new().lists(EntityKind::Area));
        assert!(client.is_stale(&key()));
        assert_eq!(*client.get_query_data::<usize>(&key()).unwrap(), 1);

        assert_eq!(*fetch_counting(&client, &calls).await, 2);
        assert!(!client.is_invalidated(&key()));
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_data() {
        let client = QueryClient::default();
        client.set_query_data(key(), Arc::new(7usize));
        client.invalidate(&InvalidationSet::new().lists(EntityKind::Area));

        let result = client
            .fetch::<usize, _, _>(key(), || async {
                Err(DomainError::Validation {
                    entity: EntityKind::Area,
                    message: "x".into(),
                })
            })
            .await;
        assert!(result.is_err());
        assert_eq!(*client.get_query_data::<usize>(&key()).unwrap(), 7);
    }

    #[tokio::test]
    async fn concurrent_fetches_coalesce() {
        let client = QueryClient::default();
        let calls = AtomicUsize::new(0);
        let slow = || async {
            tokio::task::yield_now().await;
            Ok::<_, DomainError>(calls.fetch_add(1, Ordering::SeqCst))
        };

        let (a, b) = tokio::join!(client.fetch(key(), slow), client.fetch(key(), slow));
        assert_eq!(*a.unwrap(), 0);
        assert_eq!(*b.unwrap(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidation_during_fetch_leaves_result_stale() {
        let client = QueryClient::default();
        let value = client
            .fetch(key(), || async {
                client.invalidate(&InvalidationSet::new().lists(EntityKind::Area));
                Ok::<_, DomainError>(1usize)
            })
            .await
            .unwrap();

        assert_eq!(*value, 1);
        assert!(client.is_invalidated(&key()));
        assert!(client.is_stale(&key()));
        // Still usable as placeholder data.
        assert_eq!(*client.get_query_data::<usize>(&key()).unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unused_entries_are_evicted_after_gc_time() {
        let client = QueryClient::default();
        client.set_query_data(key(), Arc::new(1u8));
        tokio::time::advance(Duration::from_secs(30 * 60)).await;
        assert_eq!(client.collect_garbage(), 1);
        assert!(client.is_empty());
    }

    #[tokio::test]
    async fn prefetch_swallows_errors() {
        let client = QueryClient::default();
        client
            .prefetch::<u8, _, _>(key(), || async {
                Err(DomainError::Internal {
                    entity: EntityKind::Area,
                    message: "down".into(),
                })
            })
            .await;
        assert!(!client.contains(&key()));
    }
}
