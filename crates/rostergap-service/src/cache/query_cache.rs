//! Process-wide query cache with request deduplication.
//!
//! The cache guarantees at most one in-flight warehouse computation per
//! query key. The first caller for a key becomes the leader and spawns
//! the computation on a detached task; callers arriving while it runs
//! become followers and await the same shared outcome. A completed value
//! is served without recomputation until its freshness window elapses.
//! Failures are never stored: every waiter of a failed computation gets
//! the error, and the next request for that key starts over.

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use rostergap_core::{QueryKey, RostergapError, RostergapResult, UnenrolledReport};
use rostergap_warehouse::WarehouseExecutor;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

type SharedReport = Arc<UnenrolledReport>;

/// Write-once, multi-reader completion slot for one computation.
type SharedFetch = Shared<BoxFuture<'static, Result<SharedReport, Arc<RostergapError>>>>;

type EntryMap = HashMap<QueryKey, CacheEntry>;

enum CacheEntry {
    /// A completed value, fresh until `fetched_at + ttl`.
    Ready {
        value: SharedReport,
        fetched_at: Instant,
    },
    /// An in-flight computation. `id` ties the marker to the task that
    /// installed it, so a finished task never clobbers a newer entry.
    Fetching { id: u64, fetch: SharedFetch },
}

/// Request-deduplicating cache over the warehouse executor.
///
/// Constructed once at startup and shared across all request handlers.
/// Keys are independent: a slow computation for one key never delays
/// callers of another.
pub struct QueryCache {
    entries: Arc<Mutex<EntryMap>>,
    executor: Arc<dyn WarehouseExecutor>,
    ttl: Duration,
    enabled: bool,
    next_fetch_id: AtomicU64,
}

impl QueryCache {
    /// Creates a cache over `executor` with the given freshness window.
    ///
    /// With `enabled` false the store is bypassed entirely and every call
    /// runs the executor directly (development only).
    #[must_use]
    pub fn new(executor: Arc<dyn WarehouseExecutor>, ttl: Duration, enabled: bool) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            executor,
            ttl,
            enabled,
            next_fetch_id: AtomicU64::new(0),
        }
    }

    /// Returns the cached report for `key`, computing it if absent or
    /// stale.
    ///
    /// Concurrent callers for the same key share a single executor call.
    /// The computation runs on a detached task, so it completes and lands
    /// in the cache even if every caller is cancelled mid-await.
    pub async fn get_or_compute(&self, key: QueryKey) -> RostergapResult<SharedReport> {
        if !self.enabled {
            return self.executor.execute(&key).await.map(Arc::new);
        }

        let fetch = {
            let mut entries = self.entries.lock();
            match entries.get(&key) {
                Some(CacheEntry::Ready { value, fetched_at })
                    if fetched_at.elapsed() < self.ttl =>
                {
                    debug!(key = %key, "cache hit");
                    return Ok(Arc::clone(value));
                }
                Some(CacheEntry::Fetching { fetch, .. }) => {
                    debug!(key = %key, "joining in-flight query");
                    fetch.clone()
                }
                _ => self.begin_fetch(&mut entries, key),
            }
        };

        // Lock is released; the await below never blocks other keys.
        fetch.await.map_err(|err| err.duplicate())
    }

    /// Drops the entry for `key`, whether completed or in-flight.
    /// Returns whether one existed. Waiters already attached to an
    /// in-flight computation still receive its outcome.
    pub fn invalidate(&self, key: &QueryKey) -> bool {
        let existed = self.entries.lock().remove(key).is_some();
        if existed {
            info!(key = %key, "cache entry invalidated");
        }
        existed
    }

    /// Drops every entry.
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        let count = entries.len();
        entries.clear();
        info!(count, "cache cleared");
    }

    /// Number of entries currently held, in-flight markers included.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.lock().len()
    }

    /// Installs an in-flight marker for `key` and spawns the computation.
    /// Must be called with the entry lock held, so exactly one caller can
    /// become the leader for a key.
    fn begin_fetch(&self, entries: &mut EntryMap, key: QueryKey) -> SharedFetch {
        info!(key = %key, "starting warehouse query");
        let id = self.next_fetch_id.fetch_add(1, Ordering::Relaxed);

        // Detached: dropping the JoinHandle (when the last waiter goes
        // away) does not cancel the task.
        let executor = Arc::clone(&self.executor);
        let store = Arc::clone(&self.entries);
        let handle = tokio::spawn(async move {
            let result = executor.execute(&key).await.map(Arc::new).map_err(Arc::new);
            let mut entries = store.lock();
            if current_fetch_is(&entries, &key, id) {
                match &result {
                    Ok(value) => {
                        entries.insert(
                            key,
                            CacheEntry::Ready {
                                value: Arc::clone(value),
                                fetched_at: Instant::now(),
                            },
                        );
                    }
                    Err(err) => {
                        warn!(key = %key, error = %err, "query failed, clearing in-flight marker");
                        entries.remove(&key);
                    }
                }
            }
            result
        });

        let store = Arc::clone(&self.entries);
        let fetch: SharedFetch = async move {
            match handle.await {
                Ok(result) => result,
                Err(join_err) => {
                    // The task panicked before it could update the map;
                    // clear the marker so the key can be retried.
                    let mut entries = store.lock();
                    if current_fetch_is(&entries, &key, id) {
                        entries.remove(&key);
                    }
                    Err(Arc::new(RostergapError::internal(format!(
                        "warehouse query task failed: {}",
                        join_err
                    ))))
                }
            }
        }
        .boxed()
        .shared();

        entries.insert(
            key,
            CacheEntry::Fetching {
                id,
                fetch: fetch.clone(),
            },
        );
        fetch
    }
}

fn current_fetch_is(entries: &EntryMap, key: &QueryKey, id: u64) -> bool {
    matches!(entries.get(key), Some(CacheEntry::Fetching { id: current, .. }) if *current == id)
}
