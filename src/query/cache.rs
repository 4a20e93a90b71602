//! Tag-aware query cache.
//!
//! Entries are keyed by endpoint and typed list arguments and carry the tags
//! they were issued with. Invalidating a tag removes every entry carrying it
//! and notifies subscribers so active lists can refetch. A fetch that started
//! before an invalidation of one of its tags is handed back to its caller but
//! never stored, so stale data cannot re-enter the cache.

use super::params::ListParams;
use super::tag::Tag;
use log::*;
use std::{
    any::Any,
    collections::HashMap,
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tokio::sync::broadcast;
use tokio::time::Instant;

/// How long unused entries stay fresh unless configured otherwise.
///
pub const DEFAULT_KEEP_FOR: Duration = Duration::from_secs(60);

const INVALIDATION_CAPACITY: usize = 64;

/// Identifies a cached query.
///
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub endpoint: String,
    pub params: ListParams,
}

impl QueryKey {
    pub fn new(endpoint: &str, params: ListParams) -> Self {
        QueryKey {
            endpoint: endpoint.to_owned(),
            params,
        }
    }
}

/// Broadcast after tags were invalidated.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invalidation {
    pub tags: Vec<Tag>,
}

impl Invalidation {
    /// Return true if any of the given tags was invalidated.
    ///
    pub fn touches(&self, tags: &[Tag]) -> bool {
        tags.iter().any(|tag| self.tags.contains(tag))
    }
}

struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    tags: Vec<Tag>,
    stored_at: Instant,
}

#[derive(Default)]
struct Store {
    entries: HashMap<QueryKey, Entry>,
    // Bumped for a tag each time it is invalidated.
    epochs: HashMap<Tag, u64>,
}

impl Store {
    fn epoch_of(&self, tags: &[Tag]) -> u64 {
        tags.iter()
            .map(|tag| self.epochs.get(tag).copied().unwrap_or(0))
            .sum()
    }
}

/// Shared cache of query results. Construct one per process (or per test)
/// and pass it around behind an `Arc`.
///
pub struct QueryCache {
    store: Mutex<Store>,
    keep_for: Duration,
    invalidations: broadcast::Sender<Invalidation>,
}

impl QueryCache {
    pub fn new(keep_for: Duration) -> Self {
        let (invalidations, _) = broadcast::channel(INVALIDATION_CAPACITY);
        QueryCache {
            store: Mutex::new(Store::default()),
            keep_for,
            invalidations,
        }
    }

    /// Return a receiver of future invalidations.
    ///
    pub fn subscribe(&self) -> broadcast::Receiver<Invalidation> {
        self.invalidations.subscribe()
    }

    /// Return the cached value for the key if it is still fresh.
    ///
    pub fn lookup<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let store = self.lock();
        let entry = store.entries.get(key)?;
        if entry.stored_at.elapsed() >= self.keep_for {
            return None;
        }
        Arc::clone(&entry.value).downcast::<T>().ok()
    }

    /// Return the cached value, or run the fetch and cache its successful
    /// result under the given tags.
    ///
    pub async fn query<T, E, F, Fut>(&self, key: QueryKey, tags: &[Tag], fetch: F) -> Result<Arc<T>, E>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.lookup::<T>(&key) {
            debug!("Cache hit for {} {:?}", key.endpoint, key.params);
            return Ok(value);
        }
        self.refresh(key, tags, fetch).await
    }

    /// Run the fetch regardless of cached data and cache its successful
    /// result under the given tags.
    ///
    pub async fn refresh<T, E, F, Fut>(&self, key: QueryKey, tags: &[Tag], fetch: F) -> Result<Arc<T>, E>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let epoch = self.lock().epoch_of(tags);
        let value = Arc::new(fetch().await?);

        let mut store = self.lock();
        if store.epoch_of(tags) != epoch {
            debug!(
                "Not caching {} {:?}: invalidated while in flight",
                key.endpoint, key.params
            );
            return Ok(value);
        }
        store.entries.insert(
            key,
            Entry {
                value: value.clone(),
                tags: tags.to_vec(),
                stored_at: Instant::now(),
            },
        );
        Ok(value)
    }

    /// Remove every entry sharing one of the tags and notify subscribers.
    /// Returns the number of removed entries.
    ///
    pub fn invalidate(&self, tags: &[Tag]) -> usize {
        if tags.is_empty() {
            return 0;
        }
        let removed = {
            let mut store = self.lock();
            for tag in tags {
                *store.epochs.entry(*tag).or_insert(0) += 1;
            }
            let before = store.entries.len();
            store
                .entries
                .retain(|_, entry| !entry.tags.iter().any(|tag| tags.contains(tag)));
            before - store.entries.len()
        };
        debug!("Invalidated tags {:?}, removed {} entries", tags, removed);
        // No receivers simply means no list is mounted.
        let _ = self.invalidations.send(Invalidation {
            tags: tags.to_vec(),
        });
        removed
    }

    /// Await a mutation and invalidate the tags only if it succeeded.
    ///
    pub async fn mutate<T, E, Fut>(&self, tags: &[Tag], mutation: Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        let value = mutation.await?;
        self.invalidate(tags);
        Ok(value)
    }

    /// Drop entries older than the keep-for window. Returns the number of
    /// dropped entries.
    ///
    pub fn evict_expired(&self) -> usize {
        let keep_for = self.keep_for;
        let mut store = self.lock();
        let before = store.entries.len();
        store
            .entries
            .retain(|_, entry| entry.stored_at.elapsed() < keep_for);
        before - store.entries.len()
    }

    /// Forget everything, e.g. after the session ended. Requests already in
    /// flight will not be cached either.
    ///
    pub fn clear(&self) {
        let mut store = self.lock();
        store.entries.clear();
        for tag in Tag::ALL {
            *store.epochs.entry(tag).or_insert(0) += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        QueryCache::new(DEFAULT_KEEP_FOR)
    }
}
