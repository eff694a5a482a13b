//! Process-wide query cache.
//!
//! Each resource read is stored under a [`CacheKey`]. The data itself lives in
//! a `moka` cache, whose `try_get_with` gives us the two properties the views
//! rely on: concurrent reads of one key share a single in-flight fetch, and a
//! failed fetch is never cached. Next to it sits a status table
//! (`idle | loading | success | error`, last error, last fetch time, stale
//! flag) that views can inspect or subscribe to.
//!
//! The status table is swept whenever it outgrows `max_keys`: rows whose
//! data moka has evicted are dropped, unless a fetch for them is in flight.
//!
//! Invalidation is lazy: it bumps the key's generation, drops the cached data
//! and marks the entry stale. Every stored value carries the generation it was
//! fetched under, so a result that raced with an invalidation is discarded
//! and fetched again instead of being served as fresh.

mod entry;
mod key;

pub use entry::{CacheEntry, CacheEntrySummary, CacheEvent, CacheStatus, Collection, Dataset};
pub use key::{CacheKey, Resource};

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::Utc;
use moka::future::Cache;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::cancel::CancelToken;
use crate::error::{HrmError, Result};

const MAX_READ_ATTEMPTS: usize = 3;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub max_keys: u64,
    /// Entries older than this are fetched again on the next read.
    pub ttl: Option<Duration>,
    pub event_buffer: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_keys: 1024,
            ttl: None,
            event_buffer: 256,
        }
    }
}

#[derive(Clone)]
struct Stamped {
    generation: u64,
    data: Dataset,
}

pub struct QueryCache {
    store: Cache<CacheKey, Stamped>,
    max_keys: u64,
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    events: broadcast::Sender<CacheEvent>,
}

impl QueryCache {
    pub fn new(config: &CacheConfig) -> Self {
        let mut builder = Cache::builder().max_capacity(config.max_keys);
        if let Some(ttl) = config.ttl {
            builder = builder.time_to_live(ttl);
        }
        let (events, _) = broadcast::channel(config.event_buffer.max(1));
        Self {
            store: builder.build(),
            max_keys: config.max_keys,
            entries: RwLock::new(HashMap::new()),
            events,
        }
    }

    /// Returns the cached collection for `key`, fetching it when absent or
    /// stale. Concurrent reads of the same key share one fetch.
    pub async fn read<F, Fut>(&self, key: &CacheKey, fetcher: F) -> Result<Dataset>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Dataset>>,
    {
        let result = self.read_fresh(key, &fetcher).await;
        self.sweep().await;
        result
    }

    async fn read_fresh<F, Fut>(&self, key: &CacheKey, fetcher: &F) -> Result<Dataset>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Dataset>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let stamped = self
                .store
                .try_get_with(key.clone(), self.fetch(key, fetcher))
                .await
                .map_err(|source| HrmError::Fetch {
                    key: key.clone(),
                    source,
                })?;

            if stamped.generation >= self.generation(key) {
                return Ok(stamped.data);
            }
            if attempt >= MAX_READ_ATTEMPTS {
                warn!(%key, attempt, "Key keeps being invalidated; serving latest fetch");
                return Ok(stamped.data);
            }
            debug!(%key, "Result was invalidated while in flight; fetching again");
            self.store.invalidate(key).await;
        }
    }

    /// Drops status rows whose data is no longer cached once the table holds
    /// more than `max_keys` rows. Rows with a fetch in flight are kept.
    async fn sweep(&self) {
        let len = self.read_entries().len() as u64;
        if len <= self.max_keys {
            return;
        }
        self.store.run_pending_tasks().await;
        let mut entries = self.write();
        entries.retain(|key, entry| {
            entry.status == CacheStatus::Loading || self.store.contains_key(key)
        });
        debug!(before = len, after = entries.len(), "Swept cache status table");
    }

    /// Typed [`read`](Self::read) for a resource's row collection.
    pub async fn read_rows<T, F, Fut>(&self, key: &CacheKey, fetcher: F) -> Result<Arc<Vec<T>>>
    where
        T: Collection,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        let data = self
            .read(key, || {
                let rows = fetcher();
                async move { rows.await.map(|rows| T::into_dataset(Arc::new(rows))) }
            })
            .await?;

        T::from_dataset(data).ok_or_else(|| HrmError::Fetch {
            key: key.clone(),
            source: Arc::new(HrmError::validation(format!(
                "cached `{key}` holds a different resource"
            ))),
        })
    }

    /// Like [`read`](Self::read), but the result is discarded if `token` was
    /// cancelled while waiting. The cache still keeps what was fetched.
    pub async fn read_scoped<F, Fut>(
        &self,
        key: &CacheKey,
        token: &CancelToken,
        fetcher: F,
    ) -> Result<Dataset>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Dataset>>,
    {
        let result = self.read(key, fetcher).await;
        if token.is_cancelled() {
            debug!(%key, "View unmounted; dropping result");
            return Err(HrmError::Cancelled(key.clone()));
        }
        result
    }

    /// Marks `key` stale. Nothing is fetched until the next read.
    pub async fn invalidate(&self, key: &CacheKey) {
        let status = {
            let mut entries = self.write();
            let entry = entries.entry(key.clone()).or_default();
            entry.generation += 1;
            entry.stale = true;
            entry.status
        };
        self.store.invalidate(key).await;
        debug!(%key, "Invalidated");
        self.publish(key, status, true);
    }

    /// Invalidates every key of `resource`, whatever its parameters.
    pub async fn invalidate_resource(&self, resource: Resource) {
        let keys: Vec<CacheKey> = self
            .read_entries()
            .keys()
            .filter(|k| k.resource() == resource)
            .cloned()
            .collect();
        for key in keys {
            self.invalidate(&key).await;
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.read_entries().get(key).cloned()
    }

    pub fn entries(&self) -> Vec<CacheEntrySummary> {
        let mut out: Vec<_> = self
            .read_entries()
            .iter()
            .map(|(key, entry)| CacheEntrySummary::new(key, entry))
            .collect();
        out.sort_by(|a, b| a.key.cmp(&b.key));
        out
    }

    async fn fetch<F, Fut>(&self, key: &CacheKey, fetcher: &F) -> Result<Stamped>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Dataset>>,
    {
        let generation = self.begin(key);
        debug!(%key, generation, "Fetching");
        match fetcher().await {
            Ok(data) => {
                self.succeed(key, generation, &data);
                Ok(Stamped { generation, data })
            }
            Err(e) => {
                warn!(%key, error = %e, "Fetch failed");
                self.fail(key, &e);
                Err(e)
            }
        }
    }

    fn begin(&self, key: &CacheKey) -> u64 {
        let (generation, stale) = {
            let mut entries = self.write();
            let entry = entries.entry(key.clone()).or_default();
            entry.status = CacheStatus::Loading;
            (entry.generation, entry.stale)
        };
        self.publish(key, CacheStatus::Loading, stale);
        generation
    }

    fn succeed(&self, key: &CacheKey, generation: u64, data: &Dataset) {
        let stale = {
            let mut entries = self.write();
            let entry = entries.entry(key.clone()).or_default();
            entry.status = CacheStatus::Success;
            entry.rows = Some(data.len());
            entry.error = None;
            entry.last_fetched_at = Some(Utc::now());
            entry.stale = entry.generation > generation;
            entry.stale
        };
        self.publish(key, CacheStatus::Success, stale);
    }

    fn fail(&self, key: &CacheKey, err: &HrmError) {
        let stale = {
            let mut entries = self.write();
            let entry = entries.entry(key.clone()).or_default();
            entry.status = CacheStatus::Error;
            entry.error = Some(err.to_string());
            entry.stale
        };
        self.publish(key, CacheStatus::Error, stale);
    }

    fn generation(&self, key: &CacheKey) -> u64 {
        self.read_entries()
            .get(key)
            .map(|e| e.generation)
            .unwrap_or(0)
    }

    fn publish(&self, key: &CacheKey, status: CacheStatus, stale: bool) {
        // no subscribers is fine
        let _ = self.events.send(CacheEvent {
            key: key.clone(),
            status,
            stale,
        });
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}
