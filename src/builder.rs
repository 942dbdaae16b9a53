//! Cache factory: turns the two configuration scalars into a cache.
//!
//! `capacity` bounds the cache; `algorithm` picks the policy. The string
//! `"LFU"` selects [`LfuCache`]; anything else, including no value at all,
//! selects [`LruCache`]. Each [`CacheFactory::create`] call returns a new,
//! independent cache, so one factory can serve every resource type while
//! each type keeps its own instance.
//!
//! ## Example
//!
//! ```rust
//! use house_cache::builder::{CacheFactory, CachePolicy};
//! use house_cache::config::CacheSettings;
//! use house_cache::traits::Cache;
//!
//! let factory = CacheFactory::from_settings(&CacheSettings::new(100, Some("LFU"))).unwrap();
//! assert_eq!(factory.policy(), CachePolicy::Lfu);
//!
//! let mut cache = factory.create::<u64, String>();
//! cache.put(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some(&"hello".to_string()));
//! ```

use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;

use crate::config::CacheSettings;
use crate::error::ConfigError;
use crate::policy::lfu::LfuCache;
use crate::policy::lru::LruCache;
use crate::traits::Cache;

/// Available cache eviction policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CachePolicy {
    /// Least Recently Used eviction.
    #[default]
    Lru,
    /// Least Frequently Used eviction, ties broken by recency.
    Lfu,
}

impl CachePolicy {
    /// Maps an `algorithm` setting to a policy.
    ///
    /// Only the exact string `"LFU"` selects LFU. Unrecognized names are not
    /// an error; they fall back to LRU.
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("LFU") => CachePolicy::Lfu,
            Some(other) => {
                tracing::debug!(algorithm = other, "unrecognized cache algorithm, using LRU");
                CachePolicy::Lru
            },
            None => CachePolicy::Lru,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CachePolicy::Lru => "LRU",
            CachePolicy::Lfu => "LFU",
        }
    }
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cache produced by the factory; dispatches to the configured policy.
pub struct PolicyCache<K, V>
where
    K: Eq + Hash + Clone,
{
    inner: PolicyInner<K, V>,
}

enum PolicyInner<K, V>
where
    K: Eq + Hash + Clone,
{
    Lru(LruCache<K, V>),
    Lfu(LfuCache<K, V>),
}

impl<K, V> PolicyCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Builds an empty cache of the given policy.
    pub fn new(policy: CachePolicy, capacity: NonZeroUsize) -> Self {
        let inner = match policy {
            CachePolicy::Lru => PolicyInner::Lru(LruCache::new(capacity)),
            CachePolicy::Lfu => PolicyInner::Lfu(LfuCache::new(capacity)),
        };
        PolicyCache { inner }
    }

    /// The policy this cache evicts by.
    pub fn policy(&self) -> CachePolicy {
        match &self.inner {
            PolicyInner::Lru(_) => CachePolicy::Lru,
            PolicyInner::Lfu(_) => CachePolicy::Lfu,
        }
    }

    /// Runs the underlying policy's own invariant check.
    pub fn check_invariants(&self) -> Result<(), crate::error::InvariantError> {
        match &self.inner {
            PolicyInner::Lru(lru) => lru.check_invariants(),
            PolicyInner::Lfu(lfu) => lfu.check_invariants(),
        }
    }
}

impl<K, V> Cache<K, V> for PolicyCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        match &mut self.inner {
            PolicyInner::Lru(lru) => lru.get(key),
            PolicyInner::Lfu(lfu) => lfu.get(key),
        }
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        match &mut self.inner {
            PolicyInner::Lru(lru) => lru.put(key, value),
            PolicyInner::Lfu(lfu) => lfu.put(key, value),
        }
    }

    fn remove_by_key(&mut self, key: &K) -> Option<V> {
        match &mut self.inner {
            PolicyInner::Lru(lru) => lru.remove_by_key(key),
            PolicyInner::Lfu(lfu) => lfu.remove_by_key(key),
        }
    }

    fn peek(&self, key: &K) -> Option<&V> {
        match &self.inner {
            PolicyInner::Lru(lru) => lru.peek(key),
            PolicyInner::Lfu(lfu) => lfu.peek(key),
        }
    }

    fn contains(&self, key: &K) -> bool {
        match &self.inner {
            PolicyInner::Lru(lru) => lru.contains(key),
            PolicyInner::Lfu(lfu) => lfu.contains(key),
        }
    }

    fn len(&self) -> usize {
        match &self.inner {
            PolicyInner::Lru(lru) => lru.len(),
            PolicyInner::Lfu(lfu) => lfu.len(),
        }
    }

    fn capacity(&self) -> usize {
        match &self.inner {
            PolicyInner::Lru(lru) => lru.capacity(),
            PolicyInner::Lfu(lfu) => lfu.capacity(),
        }
    }

    fn clear(&mut self) {
        match &mut self.inner {
            PolicyInner::Lru(lru) => lru.clear(),
            PolicyInner::Lfu(lfu) => lfu.clear(),
        }
    }
}

impl<K, V> fmt::Debug for PolicyCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            PolicyInner::Lru(lru) => fmt::Debug::fmt(lru, f),
            PolicyInner::Lfu(lfu) => fmt::Debug::fmt(lfu, f),
        }
    }
}

/// Stateless factory holding the validated capacity and policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheFactory {
    capacity: NonZeroUsize,
    policy: CachePolicy,
}

impl CacheFactory {
    pub fn new(capacity: NonZeroUsize, policy: CachePolicy) -> Self {
        Self { capacity, policy }
    }

    /// Validates raw settings; fails on a missing, non-numeric or
    /// non-positive capacity.
    pub fn from_settings(settings: &CacheSettings) -> Result<Self, ConfigError> {
        let validated = settings.validate()?;
        Ok(Self::new(validated.capacity, validated.policy))
    }

    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Builds a new, independent cache.
    pub fn create<K, V>(&self) -> PolicyCache<K, V>
    where
        K: Eq + Hash + Clone,
    {
        tracing::info!(
            policy = %self.policy,
            capacity = self.capacity.get(),
            "creating cache"
        );
        PolicyCache::new(self.policy, self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory(capacity: usize, algorithm: Option<&str>) -> CacheFactory {
        CacheFactory::from_settings(&CacheSettings::new(capacity as i64, algorithm)).unwrap()
    }

    #[test]
    fn algorithm_names_map_to_policies() {
        assert_eq!(CachePolicy::from_name(Some("LFU")), CachePolicy::Lfu);
        assert_eq!(CachePolicy::from_name(Some("LRU")), CachePolicy::Lru);
        assert_eq!(CachePolicy::from_name(Some("lfu")), CachePolicy::Lru);
        assert_eq!(CachePolicy::from_name(Some("ARC")), CachePolicy::Lru);
        assert_eq!(CachePolicy::from_name(Some("")), CachePolicy::Lru);
        assert_eq!(CachePolicy::from_name(None), CachePolicy::Lru);
        assert_eq!(CachePolicy::default(), CachePolicy::Lru);
    }

    #[test]
    fn policy_display_uses_config_names() {
        assert_eq!(CachePolicy::Lfu.to_string(), "LFU");
        assert_eq!(CachePolicy::Lru.to_string(), "LRU");
    }

    #[test]
    fn test_all_policies_basic_ops() {
        for algorithm in [Some("LFU"), Some("LRU"), None] {
            let mut cache = factory(10, algorithm).create::<u64, String>();

            assert_eq!(cache.put(1, "one".to_string()), None);
            assert_eq!(cache.put(2, "two".to_string()), None);

            assert_eq!(cache.get(&1), Some(&"one".to_string()));
            assert_eq!(cache.get(&3), None);
            assert!(cache.contains(&2));
            assert_eq!(cache.peek(&2), Some(&"two".to_string()));
            assert_eq!(cache.len(), 2);
            assert_eq!(cache.capacity(), 10);

            assert_eq!(cache.put(1, "ONE".to_string()), Some("one".to_string()));
            assert_eq!(cache.remove_by_key(&2), Some("two".to_string()));
            assert_eq!(cache.remove_by_key(&2), None);

            cache.clear();
            assert!(cache.is_empty());
            cache.check_invariants().unwrap();
        }
    }

    #[test]
    fn factory_output_matches_policy() {
        assert_eq!(factory(4, Some("LFU")).create::<u8, u8>().policy(), CachePolicy::Lfu);
        assert_eq!(factory(4, Some("MRU")).create::<u8, u8>().policy(), CachePolicy::Lru);
    }

    #[test]
    fn each_create_call_is_independent() {
        let factory = factory(2, None);
        let mut houses = factory.create::<u32, &str>();
        let mut people = factory.create::<u32, &str>();

        houses.put(1, "house");
        assert!(!people.contains(&1));
        people.put(1, "person");
        assert_eq!(houses.get(&1), Some(&"house"));
    }

    #[test]
    fn invalid_capacity_fails_construction() {
        assert_eq!(
            CacheFactory::from_settings(&CacheSettings::new(0, None)).unwrap_err(),
            ConfigError::NonPositiveCapacity(0)
        );
        assert_eq!(
            CacheFactory::from_settings(&CacheSettings::new("lots", Some("LFU"))).unwrap_err(),
            ConfigError::NonNumericCapacity("lots".into())
        );
        assert_eq!(
            CacheFactory::from_settings(&CacheSettings::default()).unwrap_err(),
            ConfigError::MissingCapacity
        );
    }

    #[test]
    fn lfu_and_lru_disagree_on_victim() {
        // x: 3 accesses, y: 1 then touched last
        let ops = |cache: &mut PolicyCache<&str, i32>| {
            cache.put("x", 1);
            cache.get(&"x");
            cache.get(&"x");
            cache.put("y", 2);
            cache.put("z", 3);
        };

        let mut lru = factory(2, Some("LRU")).create();
        ops(&mut lru);
        assert!(!lru.contains(&"x"));

        let mut lfu = factory(2, Some("LFU")).create();
        ops(&mut lfu);
        assert!(lfu.contains(&"x"));
        assert!(!lfu.contains(&"y"));
    }
}
