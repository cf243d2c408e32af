//! SEO document cache.
//!
//! Two interchangeable tiers behind [`SeoCacheStore`]:
//!
//! - **Redis**: used when `cache.redis_url` or `cache.redis_host` is set;
//!   documents are stored as JSON with a TTL.
//! - **Memory**: bounded in-process LRU map with lazy expiry.
//!
//! Keys carry a content fingerprint (see [`content_fingerprint`]), so entries
//! are never invalidated explicitly; changed content lands on a new key.
//!
//! ```toml
//! [cache]
//! ttl_seconds = 21600
//! memory_limit = 1000
//! # redis_url = "redis://127.0.0.1:6379"
//! ```

mod config;
mod error;
mod keys;
mod lock;
mod redis_store;
mod store;

pub use config::{CacheConfig, RedisTarget};
pub use error::CacheError;
pub use keys::{SeoCacheKey, content_fingerprint};
pub use redis_store::RedisStore;
pub use store::{CacheTier, MemoryStore, SeoCache, SeoCacheStore};
