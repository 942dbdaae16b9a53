//! Error types for the house_cache library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when cache settings cannot produce a cache
//!   (missing, non-numeric or non-positive capacity, unreadable config source).
//! - [`InvariantError`]: Returned by `check_invariants` on the policy types when
//!   internal bookkeeping disagrees with itself.
//!
//! Errors raised by the wrapped service layer are never converted; the
//! interceptor hands them back to the caller as-is.
//!
//! ## Example Usage
//!
//! ```
//! use house_cache::config::CacheSettings;
//! use house_cache::error::ConfigError;
//!
//! let err = CacheSettings::new("0", None).validate().unwrap_err();
//! assert_eq!(err, ConfigError::NonPositiveCapacity(0));
//! ```

use thiserror::Error;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache settings are invalid.
///
/// Every variant is fatal for the factory: no cache is built.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    /// No `capacity` setting was supplied.
    #[error("cache capacity is not configured")]
    MissingCapacity,

    /// The `capacity` setting is not an integer.
    #[error("cache capacity must be numeric, got {0:?}")]
    NonNumericCapacity(String),

    /// The `capacity` setting is zero or negative.
    #[error("cache capacity must be > 0, got {0}")]
    NonPositiveCapacity(i64),

    /// The configuration source could not be read or deserialized.
    #[error("failed to load cache configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by [`LruCache::check_invariants`](crate::policy::lru::LruCache::check_invariants)
/// and [`LfuCache::check_invariants`](crate::policy::lfu::LfuCache::check_invariants).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
