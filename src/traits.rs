//! # Cache Contract
//!
//! The operation set every eviction policy implements, plus the one trait the
//! interceptor needs from the values it caches.
//!
//! ```text
//!   ┌─────────────────────────────────────────────┐
//!   │               Cache<K, V>                   │
//!   │                                             │
//!   │  get(&mut, &K) → Option<&V>      (touches)  │
//!   │  put(&mut, K, V) → Option<V>     (touches)  │
//!   │  remove_by_key(&mut, &K) → Option<V>        │
//!   │  peek(&, &K) → Option<&V>        (no touch) │
//!   │  contains / len / capacity / clear          │
//!   └──────────────────────┬──────────────────────┘
//!                          │
//!          ┌───────────────┼────────────────┐
//!          ▼               ▼                ▼
//!      LruCache         LfuCache        PolicyCache
//!                                   (factory output, dispatches)
//! ```
//!
//! ## Semantics
//!
//! | Method          | Hit                                   | Miss               |
//! |-----------------|---------------------------------------|--------------------|
//! | `get`           | refresh ordering, return value        | `None`, no effect  |
//! | `put`           | replace value, refresh as a hit       | insert, evict one if full |
//! | `remove_by_key` | drop entry, return value              | `None`, no effect  |
//!
//! Capacity is enforced by the policy itself; callers never check it.
//!
//! ## Thread Safety
//!
//! Implementations are single-threaded (`&mut self`). Shared access goes
//! through [`CachingInterceptor`](crate::interceptor::CachingInterceptor),
//! which serializes every operation behind one lock.

use std::sync::Arc;

/// Bounded key-value cache with a policy-defined eviction order.
///
/// # Example
///
/// ```
/// use std::num::NonZeroUsize;
///
/// use house_cache::policy::lru::LruCache;
/// use house_cache::traits::Cache;
///
/// fn warm<C: Cache<u64, String>>(cache: &mut C, data: &[(u64, &str)]) {
///     for (key, value) in data {
///         cache.put(*key, value.to_string());
///     }
/// }
///
/// let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap());
/// warm(&mut cache, &[(1, "one"), (2, "two"), (3, "three")]);
/// assert_eq!(cache.len(), 2);
/// assert!(!cache.contains(&1));
/// ```
pub trait Cache<K, V> {
    /// Looks up `key`, refreshing its ordering metadata on a hit.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Inserts or replaces `key`, returning the replaced value.
    ///
    /// Inserting a new key into a full cache evicts exactly one entry first.
    fn put(&mut self, key: K, value: V) -> Option<V>;

    /// Removes `key` if present. Absent keys are not an error.
    fn remove_by_key(&mut self, key: &K) -> Option<V>;

    /// Looks up `key` without affecting eviction order.
    fn peek(&self, key: &K) -> Option<&V>;

    /// Checks membership without affecting eviction order.
    fn contains(&self, key: &K) -> bool {
        self.peek(key).is_some()
    }

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fixed upper bound on `len`.
    fn capacity(&self) -> usize;

    fn clear(&mut self);
}

/// Value snapshots that carry their own cache key.
///
/// The interceptor keys read and create results by the identifier found in
/// the result rather than by the request argument.
pub trait Identified<K> {
    fn id(&self) -> K;
}

impl<K, T> Identified<K> for Arc<T>
where
    T: Identified<K> + ?Sized,
{
    fn id(&self) -> K {
        (**self).id()
    }
}
