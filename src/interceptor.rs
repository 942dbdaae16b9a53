//! Cache-aside wrapper around a resource type's service operations.
//!
//! ## Architecture
//!
//! ```text
//!   caller ──► CachingInterceptor<K, V>
//!                 │  lock()  (one parking_lot::Mutex per resource type)
//!                 ▼
//!        ┌─────────────────────────────────────────────┐
//!        │ read    : cache.get(id) ─hit─► Arc<V>        │
//!        │              └─miss─► fetch(id) ─► put(v.id) │
//!        │ create  : op() ─► put(v.id)                  │
//!        │ mutate  : op(id) ─► remove(id) ─► put(id)    │
//!        │ delete  : op(id) ─► remove(id)               │
//!        └─────────────────────────────────────────────┘
//!                 │  guard dropped on return, error or unwind
//!                 ▼
//!               caller
//! ```
//!
//! The lock is held across the delegated call, so two threads never run
//! delegated operations of the same resource type at the same time, and a
//! cache update always reflects the delegated result it follows. Writes
//! delegate first: when the delegated call fails its error is returned
//! unchanged and the cache is not touched.
//!
//! The lock is not reentrant. A delegated closure must not call back into
//! the same interceptor.
//!
//! Values are stored as `Arc<V>`; a hit hands out a clone of the pointer,
//! never a copy of the snapshot.
//!
//! ## Example
//!
//! ```
//! use std::num::NonZeroUsize;
//!
//! use house_cache::builder::{CacheFactory, CachePolicy};
//! use house_cache::interceptor::CachingInterceptor;
//! use house_cache::traits::Identified;
//!
//! #[derive(Debug, PartialEq)]
//! struct House {
//!     id: u32,
//!     address: String,
//! }
//!
//! impl Identified<u32> for House {
//!     fn id(&self) -> u32 {
//!         self.id
//!     }
//! }
//!
//! let factory = CacheFactory::new(NonZeroUsize::new(16).unwrap(), CachePolicy::Lru);
//! let houses = CachingInterceptor::<u32, House>::from_factory("house", &factory);
//!
//! let fetched = houses
//!     .read(&1, |&id| Ok::<_, String>(House { id, address: "Elm St".into() }))
//!     .unwrap();
//! // Second read is served from the cache; the fetch closure is not called.
//! let cached = houses.read(&1, |_| Err("unreachable".to_string())).unwrap();
//! assert!(std::sync::Arc::ptr_eq(&fetched, &cached));
//! ```

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::builder::{CacheFactory, CachePolicy, PolicyCache};
use crate::traits::{Cache, Identified};

/// Counters for one interceptor, read with [`CachingInterceptor::stats`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InterceptorStats {
    pub hits: u64,
    pub misses: u64,
    pub creates: u64,
    pub mutations: u64,
    pub deletes: u64,
    /// Delegated calls that returned an error.
    pub failures: u64,
}

impl InterceptorStats {
    /// Fraction of reads served from the cache, `0.0` before any read.
    pub fn hit_ratio(&self) -> f64 {
        let reads = self.hits + self.misses;
        if reads == 0 {
            0.0
        } else {
            self.hits as f64 / reads as f64
        }
    }
}

struct Guarded<K, V>
where
    K: Eq + Hash + Clone,
{
    cache: PolicyCache<K, Arc<V>>,
    stats: InterceptorStats,
}

/// One cache and one lock for a single resource type.
pub struct CachingInterceptor<K, V>
where
    K: Eq + Hash + Clone,
{
    resource: &'static str,
    state: Mutex<Guarded<K, V>>,
}

impl<K, V> CachingInterceptor<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    /// Wraps an existing cache. `resource` names the type in log events.
    pub fn new(resource: &'static str, cache: PolicyCache<K, Arc<V>>) -> Self {
        Self {
            resource,
            state: Mutex::new(Guarded {
                cache,
                stats: InterceptorStats::default(),
            }),
        }
    }

    /// Builds a fresh cache from `factory`.
    pub fn from_factory(resource: &'static str, factory: &CacheFactory) -> Self {
        Self::new(resource, factory.create())
    }

    pub fn resource(&self) -> &'static str {
        self.resource
    }

    /// Returns the snapshot for `id`, calling `fetch` only on a miss.
    ///
    /// A fetched value is cached under its own identifier, which is expected
    /// to equal `id`.
    pub fn read<E, F>(&self, id: &K, fetch: F) -> Result<Arc<V>, E>
    where
        V: Identified<K>,
        F: FnOnce(&K) -> Result<V, E>,
    {
        let mut state = self.state.lock();
        if let Some(hit) = state.cache.get(id).cloned() {
            state.stats.hits += 1;
            tracing::trace!(resource = self.resource, key = ?id, "cache hit");
            return Ok(hit);
        }

        state.stats.misses += 1;
        tracing::trace!(resource = self.resource, key = ?id, "cache miss");
        let fetched = fetch(id);
        let value = Arc::new(state.delegated(self.resource, "read", Some(id), fetched)?);
        state.cache.put(value.id(), Arc::clone(&value));
        Ok(value)
    }

    /// Runs `op` and caches the created snapshot under its assigned identifier.
    pub fn create<E, F>(&self, op: F) -> Result<Arc<V>, E>
    where
        V: Identified<K>,
        F: FnOnce() -> Result<V, E>,
    {
        let mut state = self.state.lock();
        let created = op();
        let value = Arc::new(state.delegated(self.resource, "create", None, created)?);
        let key = value.id();
        tracing::trace!(resource = self.resource, key = ?key, "caching created value");
        state.cache.put(key, Arc::clone(&value));
        state.stats.creates += 1;
        Ok(value)
    }

    /// Runs a state-changing `op` on `id` and replaces the cached entry.
    ///
    /// Covers full updates, partial updates and related-entity attachment.
    /// The stale entry is removed and the fresh snapshot stored under `id`.
    pub fn mutate<E, F>(&self, id: &K, op: F) -> Result<Arc<V>, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        let mut state = self.state.lock();
        let mutated = op(id);
        let value = Arc::new(state.delegated(self.resource, "mutate", Some(id), mutated)?);
        state.cache.remove_by_key(id);
        state.cache.put(id.clone(), Arc::clone(&value));
        state.stats.mutations += 1;
        tracing::trace!(resource = self.resource, key = ?id, "replaced cached value");
        Ok(value)
    }

    /// Runs `op` on `id`, then drops `id` from the cache whether or not it
    /// was cached.
    pub fn delete<T, E, F>(&self, id: &K, op: F) -> Result<T, E>
    where
        F: FnOnce(&K) -> Result<T, E>,
    {
        let mut state = self.state.lock();
        let deleted = op(id);
        let out = state.delegated(self.resource, "delete", Some(id), deleted)?;
        let evicted = state.cache.remove_by_key(id).is_some();
        state.stats.deletes += 1;
        tracing::trace!(resource = self.resource, key = ?id, evicted, "removed cached value");
        Ok(out)
    }

    /// Checks membership without touching eviction order.
    pub fn contains(&self, id: &K) -> bool {
        self.state.lock().cache.contains(id)
    }

    /// Cached snapshot for `id`, without delegating or touching eviction order.
    pub fn peek(&self, id: &K) -> Option<Arc<V>> {
        self.state.lock().cache.peek(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.lock().cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().cache.capacity()
    }

    pub fn policy(&self) -> CachePolicy {
        self.state.lock().cache.policy()
    }

    /// Snapshot of the counters, taken under the lock.
    pub fn stats(&self) -> InterceptorStats {
        self.state.lock().stats
    }
}

impl<K, V> Guarded<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    /// Counts and logs a failed delegated call; the result passes through.
    fn delegated<T, E>(
        &mut self,
        resource: &'static str,
        operation: &'static str,
        key: Option<&K>,
        result: Result<T, E>,
    ) -> Result<T, E> {
        if result.is_err() {
            self.stats.failures += 1;
            tracing::debug!(resource, operation, key = ?key, "delegated operation failed");
        }
        result
    }
}

impl<K, V> fmt::Debug for CachingInterceptor<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("CachingInterceptor")
            .field("resource", &self.resource)
            .field("policy", &state.cache.policy())
            .field("len", &state.cache.len())
            .field("capacity", &state.cache.capacity())
            .field("stats", &state.stats)
            .finish_non_exhaustive()
    }
}
