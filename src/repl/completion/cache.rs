//! TTL lookup cache with fetch coalescing
//!
//! [`LookupCache`] stores values per string key, each with its own expiry,
//! and guarantees at most one fetch in flight per key. A request for a key
//! whose fetch is already running attaches to the running fetch and receives
//! the same result.
//!
//! Fetches run as spawned tasks. A caller that stops waiting (the user kept
//! typing) does not cancel the fetch; it completes and warms the cache for the
//! next request. While a refresh runs, the previous value stays in place.
//! Failures are never surfaced: the caller receives the stale value if there
//! is one, otherwise the cache's fallback, and the key stays unpopulated so the
//! next request retries.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::Result;

/// Longest TTL an entry is kept for; larger values are clamped
pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// A cached value with its expiry
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    pub value: T,
    pub expires_at: Instant,
    /// A refresh for this key is in flight
    pub loading: bool,
}

impl<T> CacheEntry<T> {
    pub fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

type FetchHandle<T> = Shared<BoxFuture<'static, Option<T>>>;

/// An in-flight fetch
struct PendingFetch<T> {
    id: u64,
    handle: FetchHandle<T>,
}

struct CacheState<T> {
    entries: HashMap<String, CacheEntry<T>>,
    pending: HashMap<String, PendingFetch<T>>,
    next_fetch_id: u64,
}

/// TTL cache keyed by string, coalescing concurrent fetches per key
pub struct LookupCache<T> {
    state: Arc<Mutex<CacheState<T>>>,
    ttl: Duration,
    fallback: T,
    /// Label used in log lines
    name: &'static str,
}

fn lock<T>(state: &Mutex<CacheState<T>>) -> MutexGuard<'_, CacheState<T>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn expiry(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl)
        .or_else(|| now.checked_add(MAX_TTL))
        .unwrap_or(now)
}

/// Drop expired entries with no fetch in flight
fn prune_expired<T>(state: &mut CacheState<T>, now: Instant) {
    let CacheState { entries, pending, .. } = state;
    entries.retain(|key, entry| entry.is_fresh(now) || pending.contains_key(key));
}

impl<T> LookupCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an empty cache
    ///
    /// # Arguments
    /// * `name` - Label used in log lines
    /// * `ttl` - How long a fetched value stays fresh, at most [`MAX_TTL`]
    /// * `fallback` - Value served when a fetch fails and nothing is cached
    pub fn new(name: &'static str, ttl: Duration, fallback: T) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState {
                entries: HashMap::new(),
                pending: HashMap::new(),
                next_fetch_id: 0,
            })),
            ttl: ttl.min(MAX_TTL),
            fallback,
            name,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a fresh value, fetching it if needed
    ///
    /// The fetcher is only invoked when the key is neither fresh nor already
    /// being fetched. This never fails.
    ///
    /// # Arguments
    /// * `key` - Cache key
    /// * `fetcher` - Produces the fetch future on a miss
    ///
    /// # Returns
    /// * `T` - Fresh value, else stale value, else the fallback
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetcher: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let handle = {
            let mut state = lock(&self.state);
            if let Some(entry) = state.entries.get(key) {
                if entry.is_fresh(Instant::now()) {
                    return entry.value.clone();
                }
            }
            match state.pending.get(key) {
                Some(pending) => {
                    debug!("{} cache: joining in-flight fetch for '{}'", self.name, key);
                    pending.handle.clone()
                }
                None => self.start_fetch(&mut state, key, fetcher()),
            }
        };

        match handle.await {
            Some(value) => value,
            None => self.stale_or_fallback(key),
        }
    }

    /// Start a background fetch unless the key is fresh or already loading
    ///
    /// Must be called from within a tokio runtime.
    pub fn prefetch<F, Fut>(&self, key: &str, fetcher: F)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let mut state = lock(&self.state);
        let fresh = state
            .entries
            .get(key)
            .is_some_and(|e| e.is_fresh(Instant::now()));
        if fresh || state.pending.contains_key(key) {
            return;
        }
        self.start_fetch(&mut state, key, fetcher());
    }

    /// Spawn the fetch and register it as pending. Caller holds the lock, so
    /// the task cannot finish before it is registered.
    fn start_fetch<Fut>(&self, state: &mut CacheState<T>, key: &str, fetch: Fut) -> FetchHandle<T>
    where
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let id = state.next_fetch_id;
        state.next_fetch_id += 1;

        if let Some(entry) = state.entries.get_mut(key) {
            entry.loading = true;
        }

        debug!("{} cache: fetching '{}'", self.name, key);

        let shared_state = Arc::clone(&self.state);
        let owned_key = key.to_string();
        let ttl = self.ttl;
        let name = self.name;

        let task = tokio::spawn(async move {
            let result = fetch.await;

            let mut state = lock(&shared_state);
            let still_current = state.pending.get(&owned_key).is_some_and(|p| p.id == id);
            if still_current {
                state.pending.remove(&owned_key);
            }

            match result {
                Ok(value) => {
                    if still_current {
                        let now = Instant::now();
                        prune_expired(&mut state, now);
                        state.entries.insert(
                            owned_key,
                            CacheEntry {
                                value: value.clone(),
                                expires_at: expiry(now, ttl),
                                loading: false,
                            },
                        );
                    }
                    Some(value)
                }
                Err(e) => {
                    debug!("{} cache: fetch for '{}' failed: {}", name, owned_key, e);
                    if let Some(entry) = state.entries.get_mut(&owned_key) {
                        entry.loading = false;
                    }
                    None
                }
            }
        });

        let handle = async move {
            match task.await {
                Ok(result) => result,
                Err(e) => {
                    warn!("Lookup task failed: {}", e);
                    None
                }
            }
        }
        .boxed()
        .shared();

        state.pending.insert(
            key.to_string(),
            PendingFetch {
                id,
                handle: handle.clone(),
            },
        );
        handle
    }

    fn stale_or_fallback(&self, key: &str) -> T {
        lock(&self.state)
            .entries
            .get(key)
            .map(|e| e.value.clone())
            .unwrap_or_else(|| self.fallback.clone())
    }

    /// The value for a key if it is fresh, without fetching
    pub fn peek(&self, key: &str) -> Option<T> {
        lock(&self.state)
            .entries
            .get(key)
            .filter(|e| e.is_fresh(Instant::now()))
            .map(|e| e.value.clone())
    }

    /// Snapshot of a key's entry, fresh or stale
    pub fn entry(&self, key: &str) -> Option<CacheEntry<T>> {
        lock(&self.state).entries.get(key).cloned()
    }

    /// Whether a fetch for the key is in flight
    pub fn is_loading(&self, key: &str) -> bool {
        lock(&self.state).pending.contains_key(key)
    }

    /// Drop one key. An in-flight fetch for it still answers its waiters but
    /// no longer populates the cache.
    pub fn clear_key(&self, key: &str) {
        let mut state = lock(&self.state);
        state.entries.remove(key);
        state.pending.remove(key);
    }

    /// Drop every key starting with the prefix, and any expired entry
    pub fn clear_prefix(&self, prefix: &str) {
        let mut state = lock(&self.state);
        state.entries.retain(|k, _| !k.starts_with(prefix));
        state.pending.retain(|k, _| !k.starts_with(prefix));
        prune_expired(&mut state, Instant::now());
    }

    /// Drop everything
    pub fn clear_all(&self) {
        let mut state = lock(&self.state);
        state.entries.clear();
        state.pending.clear();
    }

    /// Number of cached entries, fresh or stale
    pub fn len(&self) -> usize {
        lock(&self.state).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
