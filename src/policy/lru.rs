//! # Least Recently Used (LRU) Cache
//!
//! Bounded cache that evicts the entry touched longest ago.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                          LruCache<K, V>                              │
//!   │                                                                      │
//!   │   index: FxHashMap<K, SlotId>                                        │
//!   │   ┌─────────┬──────────┐                                             │
//!   │   │  key_a  │  id_2  ──┼──────────────┐                              │
//!   │   │  key_b  │  id_0  ──┼───────┐      │                              │
//!   │   │  key_c  │  id_1  ──┼──┐    │      │                              │
//!   │   └─────────┴──────────┘  │    │      │                              │
//!   │                           ▼    ▼      ▼                              │
//!   │   order (one Chain in a ChainArena<Entry<K, V>>)                     │
//!   │                                                                      │
//!   │     head (MRU) ─► [c] ◄──► [b] ◄──► [a] ◄── tail (LRU, next victim)  │
//!   │                                                                      │
//!   │   capacity: NonZeroUsize                                             │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Method            | Complexity | Effect on order                     |
//! |-------------------|------------|-------------------------------------|
//! | `get` (hit)       | O(1)       | node moves to head                  |
//! | `put` (existing)  | O(1)       | value replaced, node moves to head  |
//! | `put` (new, full) | O(1)       | tail evicted, new node at head      |
//! | `remove_by_key`   | O(1)       | node unlinked                       |
//! | `peek`            | O(1)       | none                                |
//! | `pop_lru`         | O(1)       | tail removed                        |
//!
//! The chain is a total order, so no tie-break is ever needed.
//!
//! ## Thread Safety
//!
//! Not thread-safe; wrap in a [`CachingInterceptor`](crate::interceptor::CachingInterceptor)
//! or another lock for shared use.

use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;

use rustc_hash::FxHashMap;

use crate::ds::{Chain, ChainArena, SlotId};
use crate::error::{ConfigError, InvariantError};
use crate::traits::Cache;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Fixed-capacity LRU cache.
///
/// # Example
///
/// ```
/// use std::num::NonZeroUsize;
///
/// use house_cache::policy::lru::LruCache;
/// use house_cache::traits::Cache;
///
/// let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap());
/// cache.put("a", 1);
/// cache.put("b", 2);
/// cache.get(&"a");        // "b" is now least recently used
/// cache.put("c", 3);      // evicts "b"
///
/// assert!(cache.contains(&"a"));
/// assert!(!cache.contains(&"b"));
/// ```
pub struct LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    index: FxHashMap<K, SlotId>,
    nodes: ChainArena<Entry<K, V>>,
    order: Chain,
    capacity: NonZeroUsize,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty cache holding at most `capacity` entries.
    pub fn new(capacity: NonZeroUsize) -> Self {
        LruCache {
            index: FxHashMap::with_capacity_and_hasher(capacity.get(), Default::default()),
            nodes: ChainArena::with_capacity(capacity.get()),
            order: Chain::new(),
            capacity,
        }
    }

    /// Fallible constructor for user-supplied capacities.
    ///
    /// ```
    /// use house_cache::policy::lru::LruCache;
    /// use house_cache::traits::Cache;
    ///
    /// assert!(LruCache::<u32, u32>::try_new(0).is_err());
    /// assert_eq!(LruCache::<u32, u32>::try_new(8).unwrap().capacity(), 8);
    /// ```
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        NonZeroUsize::new(capacity)
            .map(Self::new)
            .ok_or(ConfigError::NonPositiveCapacity(0))
    }

    /// Returns the entry that the next eviction would remove.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        let id = self.order.back()?;
        self.nodes.get(id).map(|entry| (&entry.key, &entry.value))
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let entry = self.nodes.pop_back(&mut self.order)?;
        self.index.remove(&entry.key);
        Some((entry.key, entry.value))
    }

    /// Iterates entries from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.nodes
            .iter(&self.order)
            .map(|(_, entry)| (&entry.key, &entry.value))
    }

    /// Checks that the index, the chain and the capacity bound agree.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.index.len() > self.capacity.get() {
            return Err(InvariantError::new(format!(
                "lru holds {} entries over capacity {}",
                self.index.len(),
                self.capacity
            )));
        }
        if self.index.len() != self.order.len() || self.nodes.len() != self.order.len() {
            return Err(InvariantError::new(format!(
                "lru index has {} keys, chain {} nodes, arena {} slots",
                self.index.len(),
                self.order.len(),
                self.nodes.len()
            )));
        }
        self.nodes
            .validate_chain(&self.order)
            .map_err(InvariantError::new)?;
        for (id, entry) in self.nodes.iter(&self.order) {
            if self.index.get(&entry.key) != Some(&id) {
                return Err(InvariantError::new(format!(
                    "lru slot {} is not indexed under its key",
                    id.index()
                )));
            }
        }
        Ok(())
    }
}

impl<K, V> Cache<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    #[inline]
    fn get(&mut self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.nodes.move_to_front(&mut self.order, id);
        self.nodes.get(id).map(|entry| &entry.value)
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&id) = self.index.get(&key) {
            self.nodes.move_to_front(&mut self.order, id);
            return self
                .nodes
                .get_mut(id)
                .map(|entry| std::mem::replace(&mut entry.value, value));
        }

        if self.index.len() >= self.capacity.get() && self.pop_lru().is_some() {
            tracing::trace!(policy = "lru", "evicted least recently used entry");
        }

        let id = self.nodes.push_front(
            &mut self.order,
            Entry {
                key: key.clone(),
                value,
            },
        );
        self.index.insert(key, id);
        None
    }

    fn remove_by_key(&mut self, key: &K) -> Option<V> {
        let id = self.index.remove(key)?;
        self.nodes
            .remove(&mut self.order, id)
            .map(|entry| entry.value)
    }

    #[inline]
    fn peek(&self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.nodes.get(id).map(|entry| &entry.value)
    }

    #[inline]
    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    #[inline]
    fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.capacity.get()
    }

    fn clear(&mut self) {
        self.index.clear();
        self.nodes.clear();
        self.order = Chain::new();
    }
}

impl<K, V> fmt::Debug for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("len", &self.index.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl<K, V> Extend<(K, V)> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}
