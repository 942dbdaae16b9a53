//! house_cache: bounded LRU/LFU caches and a cache-aside interceptor for
//! per-resource-type service layers.
//!
//! - [`policy`]: the two eviction policies behind the [`traits::Cache`] contract.
//! - [`builder`]: the factory that turns `capacity`/`algorithm` settings into a cache.
//! - [`config`]: settings and their YAML/environment loader.
//! - [`interceptor`]: one cache and one lock per resource type.
//! - [`service`]: the service contract and the [`service::Cached`] decorator.

pub mod builder;
pub mod config;
pub mod ds;
pub mod error;
pub mod interceptor;
pub mod policy;
pub mod prelude;
pub mod service;
pub mod traits;
