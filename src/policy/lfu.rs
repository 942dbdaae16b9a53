//! # LFU (Least Frequently Used) Cache
//!
//! Bounded cache that evicts the entry with the lowest access count, breaking
//! ties by evicting the least recently touched among them.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────────┐
//!   │                           LfuCache<K, V>                                 │
//!   │                                                                          │
//!   │   index: FxHashMap<K, SlotId>     nodes: ChainArena<Entry { key,         │
//!   │                                                   value, freq }>         │
//!   │                                                                          │
//!   │   buckets: FxHashMap<u64, FreqBucket>  (linked in ascending freq order)  │
//!   │                                                                          │
//!   │   min_freq ─► ┌────────┐  next  ┌────────┐  next  ┌────────┐            │
//!   │               │ freq 1 │ ─────► │ freq 2 │ ─────► │ freq 5 │            │
//!   │               │ [d][c] │ ◄───── │  [a]   │ ◄───── │  [b]   │            │
//!   │               └────────┘  prev  └────────┘  prev  └────────┘            │
//!   │                   ▲                                                      │
//!   │                   └── back of the min bucket = next victim (c)           │
//!   └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every bucket chain lives in the one shared arena; moving a key between
//! buckets relinks its node and never reallocates it.
//!
//! ## Frequency Lifecycle
//!
//! ```text
//!   put(new key)            → freq = 1, front of bucket 1, min_freq = 1
//!   get(key) hit            → freq += 1, front of bucket freq+1
//!   put(existing key)       → value replaced, freq += 1 (same as a hit)
//!   bucket emptied          → bucket unlinked; if it was min, min_freq = next
//!   remove_by_key / evict   → node freed, bucket unlinked if emptied
//! ```
//!
//! ## Operations
//!
//! | Method            | Complexity | Notes                                  |
//! |-------------------|------------|----------------------------------------|
//! | `get`             | O(1)       | bucket hop to `freq + 1`               |
//! | `put` (existing)  | O(1)       | bucket hop to `freq + 1`               |
//! | `put` (new, full) | O(1)       | pop back of `min_freq` bucket          |
//! | `remove_by_key`   | O(1)       | unlink, bucket unlinked if emptied     |
//! | `peek` / `frequency` | O(1)    | no metadata change                     |
//! | `peek_lfu` / `pop_lfu` | O(1)  | back of `min_freq` bucket              |
//!
//! The successor bucket of `f` is always `f + 1` or a later linked bucket, so
//! finding where to link a new bucket never scans.
//!
//! ## Thread Safety
//!
//! Not thread-safe; shared use goes through a
//! [`CachingInterceptor`](crate::interceptor::CachingInterceptor).

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
    freq: u64,
}

#[derive(Debug, Default)]
struct FreqBucket {
    chain: Chain,
    prev: Option<u64>,
    next: Option<u64>,
}

/// Fixed-capacity LFU cache with LRU tie-breaking.
///
/// # Example
///
/// ```
/// use std::num::NonZeroUsize;
///
/// use house_cache::policy::lfu::LfuCache;
/// use house_cache::traits::Cache;
///
/// let mut cache = LfuCache::new(NonZeroUsize::new(2).unwrap());
/// cache.put("a", 1);
/// cache.put("b", 2);
/// cache.get(&"a");     // a: 2 accesses, b: 1
/// cache.put("c", 3);   // evicts b
///
/// assert_eq!(cache.frequency(&"a"), Some(2));
/// assert!(!cache.contains(&"b"));
/// ```
pub struct LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    index: FxHashMap<K, SlotId>,
    nodes: ChainArena<Entry<K, V>>,
    buckets: FxHashMap<u64, FreqBucket>,
    min_freq: u64,
    capacity: NonZeroUsize,
}

impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty cache holding at most `capacity` entries.
    pub fn new(capacity: NonZeroUsize) -> Self {
        LfuCache {
            index: FxHashMap::with_capacity_and_hasher(capacity.get(), Default::default()),
            nodes: ChainArena::with_capacity(capacity.get()),
            buckets: FxHashMap::default(),
            min_freq: 0,
            capacity,
        }
    }

    /// Fallible constructor for user-supplied capacities.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        NonZeroUsize::new(capacity)
            .map(Self::new)
            .ok_or(ConfigError::NonPositiveCapacity(0))
    }

    /// Access count of `key`, without counting this call as an access.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        let id = *self.index.get(key)?;
        self.nodes.get(id).map(|entry| entry.freq)
    }

    /// Returns the entry that the next eviction would remove.
    pub fn peek_lfu(&self) -> Option<(&K, &V)> {
        let id = self.buckets.get(&self.min_freq)?.chain.back()?;
        self.nodes.get(id).map(|entry| (&entry.key, &entry.value))
    }

    /// Removes and returns the least frequently used entry.
    pub fn pop_lfu(&mut self) -> Option<(K, V)> {
        let freq = self.min_freq;
        let bucket = self.buckets.get_mut(&freq)?;
        let entry = self.nodes.pop_back(&mut bucket.chain)?;
        if bucket.chain.is_empty() {
            self.unlink_bucket(freq);
        }
        self.index.remove(&entry.key);
        Some((entry.key, entry.value))
    }

    /// Registers an empty bucket for `freq` between `prev` and `next`.
    fn link_bucket(&mut self, freq: u64, prev: Option<u64>, next: Option<u64>) {
        self.buckets.insert(
            freq,
            FreqBucket {
                chain: Chain::new(),
                prev,
                next,
            },
        );
        if let Some(bucket) = prev.and_then(|p| self.buckets.get_mut(&p)) {
            bucket.next = Some(freq);
        }
        if let Some(bucket) = next.and_then(|n| self.buckets.get_mut(&n)) {
            bucket.prev = Some(freq);
        }
        if prev.is_none() {
            self.min_freq = freq;
        }
    }

    /// Drops the (empty) bucket for `freq` and splices its neighbours.
    fn unlink_bucket(&mut self, freq: u64) {
        let Some(bucket) = self.buckets.remove(&freq) else {
            return;
        };
        if let Some(prev) = bucket.prev.and_then(|p| self.buckets.get_mut(&p)) {
            prev.next = bucket.next;
        }
        if let Some(next) = bucket.next.and_then(|n| self.buckets.get_mut(&n)) {
            next.prev = bucket.prev;
        }
        if self.min_freq == freq {
            self.min_freq = bucket.next.unwrap_or(0);
        }
    }

    /// Counts one access to `id`: moves it to the front of the next bucket.
    fn touch(&mut self, id: SlotId) {
        let Some(old) = self.nodes.get(id).map(|entry| entry.freq) else {
            return;
        };
        let new = old.saturating_add(1);

        if new == old {
            // Saturated counter: only recency changes.
            if let Some(bucket) = self.buckets.get_mut(&old) {
                self.nodes.move_to_front(&mut bucket.chain, id);
            }
            return;
        }

        if !self.buckets.contains_key(&new) {
            let next = self.buckets.get(&old).and_then(|bucket| bucket.next);
            self.link_bucket(new, Some(old), next);
        }

        let (Some(mut from), Some(mut to)) = (
            self.buckets.get(&old).map(|bucket| bucket.chain),
            self.buckets.get(&new).map(|bucket| bucket.chain),
        ) else {
            return;
        };
        self.nodes.transfer_front(&mut from, &mut to, id);
        if let Some(bucket) = self.buckets.get_mut(&new) {
            bucket.chain = to;
        }
        if let Some(bucket) = self.buckets.get_mut(&old) {
            bucket.chain = from;
        }
        if from.is_empty() {
            self.unlink_bucket(old);
        }

        if let Some(entry) = self.nodes.get_mut(id) {
            entry.freq = new;
        }
    }

    /// Checks bucket links, chain contents and the capacity bound.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let len = self.index.len();
        if len > self.capacity.get() {
            return Err(InvariantError::new(format!(
                "lfu holds {len} entries over capacity {}",
                self.capacity
            )));
        }
        if self.nodes.len() != len {
            return Err(InvariantError::new(format!(
                "lfu index has {len} keys but arena holds {} nodes",
                self.nodes.len()
            )));
        }
        if len == 0 {
            if self.min_freq != 0 || !self.buckets.is_empty() {
                return Err(InvariantError::new("empty lfu still tracks buckets"));
            }
            return Ok(());
        }

        let min = self
            .buckets
            .get(&self.min_freq)
            .ok_or_else(|| {
                InvariantError::new(format!("min_freq {} has no bucket", self.min_freq))
            })?;
        if min.prev.is_some() {
            return Err(InvariantError::new("min_freq bucket has a predecessor"));
        }

        let mut walked_buckets = 0usize;
        let mut walked_nodes = 0usize;
        let mut prev = None;
        let mut current = Some(self.min_freq);
        while let Some(freq) = current {
            let bucket = self
                .buckets
                .get(&freq)
                .ok_or_else(|| {
                    InvariantError::new(format!("bucket {freq} is linked but missing"))
                })?;
            if bucket.prev != prev {
                return Err(InvariantError::new(format!("bucket {freq} has a stale prev link")));
            }
            if prev.is_some_and(|p| p >= freq) {
                return Err(InvariantError::new(format!("bucket {freq} is out of order")));
            }
            if bucket.chain.is_empty() {
                return Err(InvariantError::new(format!("bucket {freq} is empty")));
            }
            self.nodes
                .validate_chain(&bucket.chain)
                .map_err(|msg| InvariantError::new(format!("bucket {freq}: {msg}")))?;
            for (id, entry) in self.nodes.iter(&bucket.chain) {
                if entry.freq != freq {
                    return Err(InvariantError::new(format!(
                        "slot {} has freq {} inside bucket {freq}",
                        id.index(),
                        entry.freq
                    )));
                }
                if self.index.get(&entry.key) != Some(&id) {
                    return Err(InvariantError::new(format!(
                        "slot {} is not indexed under its key",
                        id.index()
                    )));
                }
            }
            walked_buckets += 1;
            walked_nodes += bucket.chain.len();
            prev = Some(freq);
            current = bucket.next;
        }

        if walked_buckets != self.buckets.len() {
            return Err(InvariantError::new(format!(
                "{} buckets exist but {walked_buckets} are reachable from min_freq",
                self.buckets.len()
            )));
        }
        if walked_nodes != len {
            return Err(InvariantError::new(format!(
                "buckets hold {walked_nodes} nodes, index holds {len}"
            )));
        }
        Ok(())
    }
}

impl<K, V> Cache<K, V> for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.touch(id);
        self.nodes.get(id).map(|entry| &entry.value)
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&id) = self.index.get(&key) {
            self.touch(id);
            return self
                .nodes
                .get_mut(id)
                .map(|entry| std::mem::replace(&mut entry.value, value));
        }

        if self.index.len() >= self.capacity.get() && self.pop_lfu().is_some() {
            tracing::trace!(policy = "lfu", "evicted least frequently used entry");
        }

        if !self.buckets.contains_key(&1) {
            let next = (self.min_freq != 0).then_some(self.min_freq);
            self.link_bucket(1, None, next);
        }
        let bucket = self.buckets.entry(1).or_default();
        let id = self.nodes.push_front(
            &mut bucket.chain,
            Entry {
                key: key.clone(),
                value,
                freq: 1,
            },
        );
        self.index.insert(key, id);
        self.min_freq = 1;
        None
    }

    fn remove_by_key(&mut self, key: &K) -> Option<V> {
        let id = self.index.remove(key)?;
        let freq = self.nodes.get(id)?.freq;
        let bucket = self.buckets.get_mut(&freq)?;
        let entry = self.nodes.remove(&mut bucket.chain, id)?;
        if bucket.chain.is_empty() {
            self.unlink_bucket(freq);
        }
        Some(entry.value)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.nodes.get(id).map(|entry| &entry.value)
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn capacity(&self) -> usize {
        self.capacity.get()
    }

    fn clear(&mut self) {
        self.index.clear();
        self.nodes.clear();
        self.buckets.clear();
        self.min_freq = 0;
    }
}

impl<K, V> fmt::Debug for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuCache")
            .field("len", &self.index.len())
            .field("capacity", &self.capacity)
            .field("min_freq", &self.min_freq)
            .finish_non_exhaustive()
    }
}

impl<K, V> Extend<(K, V)> for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}
