pub use crate::builder::{CacheFactory, CachePolicy, PolicyCache};
pub use crate::config::{CacheSettings, RawCapacity, ValidatedSettings};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::interceptor::{CachingInterceptor, InterceptorStats};
pub use crate::policy::lfu::LfuCache;
pub use crate::policy::lru::LruCache;
pub use crate::service::{Cached, ResourceService};
pub use crate::traits::{Cache, Identified};
