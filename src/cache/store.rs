//! Cache storage implementations.
//!
//! `MemoryStore`: in-process LRU map with lazy expiry.
//! `SeoCache`: picks Redis or memory once, on first use, and degrades to a
//! no-op tier when Redis cannot be reached.

use std::{
    sync::RwLock,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use lru::LruCache;
use metrics::counter;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::application::seo::SeoDocument;

use super::{
    config::CacheConfig,
    lock::{rw_read, rw_write},
    redis_store::RedisStore,
};

const SOURCE: &str = "cache::store";
pub(crate) const METRIC_CACHE_WRITE_FAILED: &str = "vitrina_seo_cache_write_failed_total";

/// Read/write access to cached SEO documents.
///
/// Implementations never fail the caller: backend errors read as a miss and
/// writes are best-effort.
#[async_trait]
pub trait SeoCacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<SeoDocument>;

    async fn set(&self, key: &str, value: &SeoDocument, ttl: Duration);
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: SeoDocument,
    expires_at: Instant,
}

impl MemoryEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-process tier. Expired entries are evicted when read, never swept.
pub struct MemoryStore {
    entries: RwLock<LruCache<String, MemoryEntry>>,
}

impl MemoryStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.memory_limit_non_zero())),
        }
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "memory.len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<SeoDocument> {
        let mut entries = rw_write(&self.entries, SOURCE, "memory.get");
        let expired = match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        None
    }

    fn set_at(&self, key: &str, value: &SeoDocument, ttl: Duration, now: Instant) {
        let entry = MemoryEntry {
            value: value.clone(),
            expires_at: now + ttl,
        };
        rw_write(&self.entries, SOURCE, "memory.set").put(key.to_string(), entry);
    }
}

#[async_trait]
impl SeoCacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<SeoDocument> {
        self.get_at(key, Instant::now())
    }

    async fn set(&self, key: &str, value: &SeoDocument, ttl: Duration) {
        self.set_at(key, value, ttl, Instant::now());
    }
}

/// Backend chosen for the process lifetime.
#[derive(Debug)]
pub enum CacheTier {
    Redis(RedisStore),
    Memory(MemoryStore),
    /// Redis was configured but unreachable: reads miss, writes are dropped.
    Unavailable,
}

impl CacheTier {
    pub fn name(&self) -> &'static str {
        match self {
            CacheTier::Redis(_) => "redis",
            CacheTier::Memory(_) => "memory",
            CacheTier::Unavailable => "unavailable",
        }
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("len", &self.len())
            .finish()
    }
}

/// Lazily selected two-tier SEO cache.
pub struct SeoCache {
    config: CacheConfig,
    tier: OnceCell<CacheTier>,
}

impl SeoCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            tier: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Selected tier, connecting on first call.
    pub async fn tier(&self) -> &CacheTier {
        self.tier.get_or_init(|| self.select_tier()).await
    }

    async fn select_tier(&self) -> CacheTier {
        let Some(target) = &self.config.redis else {
            info!(
                target = "vitrina::cache",
                capacity = self.config.memory_limit,
                "Using in-process SEO cache"
            );
            return CacheTier::Memory(MemoryStore::new(&self.config));
        };

        let url = target.connection_url();
        match RedisStore::connect(&url, self.config.connect_timeout).await {
            Ok(store) => {
                info!(target = "vitrina::cache", "Using Redis SEO cache");
                CacheTier::Redis(store)
            }
            Err(err) => {
                warn!(
                    target = "vitrina::cache",
                    error = %err,
                    "Redis unreachable; SEO cache disabled for this process"
                );
                CacheTier::Unavailable
            }
        }
    }
}

#[async_trait]
impl SeoCacheStore for SeoCache {
    async fn get(&self, key: &str) -> Option<SeoDocument> {
        match self.tier().await {
            CacheTier::Memory(store) => store.get(key).await,
            CacheTier::Redis(store) => match store.get(key).await {
                Ok(value) => value,
                Err(err) => {
                    warn!(
                        target = "vitrina::cache",
                        error = %err,
                        key,
                        "SEO cache read failed; treating as miss"
                    );
                    None
                }
            },
            CacheTier::Unavailable => None,
        }
    }

    async fn set(&self, key: &str, value: &SeoDocument, ttl: Duration) {
        match self.tier().await {
            CacheTier::Memory(store) => store.set(key, value, ttl).await,
            CacheTier::Redis(store) => {
                if let Err(err) = store.set(key, value, ttl).await {
                    counter!(METRIC_CACHE_WRITE_FAILED).increment(1);
                    warn!(
                        target = "vitrina::cache",
                        error = %err,
                        key,
                        "SEO cache write failed"
                    );
                }
            }
            CacheTier::Unavailable => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::seo::{OpenGraph, TwitterCard};

    fn document(title: &str) -> SeoDocument {
        SeoDocument {
            title: title.to_string(),
            description: "desc".into(),
            keywords: vec!["barbería".into()],
            canonical: "https://example.com/a/barberias".into(),
            robots: "index, follow".into(),
            h1: "h1".into(),
            h2: None,
            body_text: "body".into(),
            og: OpenGraph {
                title: title.to_string(),
                description: "desc".into(),
                kind: "website".into(),
                url: "https://example.com/a/barberias".into(),
                image: "/og-default.jpg".into(),
                site_name: "pymerp".into(),
                locale: "es_CL".into(),
            },
            twitter: TwitterCard {
                card: "summary_large_image".into(),
                title: title.to_string(),
                description: "desc".into(),
                image: "/og-default.jpg".into(),
            },
            json_ld: vec![],
            breadcrumbs: vec![],
        }
    }

    #[tokio::test]
    async fn memory_round_trip() {
        let store = MemoryStore::new(&CacheConfig::default());
        assert!(store.get("k").await.is_none());
        store.set("k", &document("A"), Duration::from_secs(60)).await;
        assert_eq!(store.get("k").await.map(|d| d.title), Some("A".into()));
    }

    #[test]
    fn memory_evicts_expired_entry_on_read() {
        let store = MemoryStore::new(&CacheConfig::default());
        let start = Instant::now();
        store.set_at("k", &document("A"), Duration::from_secs(10), start);

        assert!(store.get_at("k", start + Duration::from_secs(9)).is_some());
        assert_eq!(store.len(), 1);
        assert!(store.get_at("k", start + Duration::from_secs(10)).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn memory_respects_capacity() {
        let store = MemoryStore::new(&CacheConfig {
            memory_limit: 2,
            ..Default::default()
        });
        let now = Instant::now();
        for key in ["a", "b", "c"] {
            store.set_at(key, &document(key), Duration::from_secs(60), now);
        }
        assert_eq!(store.len(), 2);
        assert!(store.get_at("a", now).is_none());
        assert!(store.get_at("c", now).is_some());
    }

    #[tokio::test]
    async fn selects_memory_without_redis_settings() {
        let cache = SeoCache::new(CacheConfig::default());
        assert_eq!(cache.tier().await.name(), "memory");
        cache.set("k", &document("A"), Duration::from_secs(60)).await;
        assert!(cache.get("k").await.is_some());
    }

    #[tokio::test]
    async fn unreachable_redis_degrades_to_unavailable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);

        let cache = SeoCache::new(CacheConfig {
            redis: Some(crate::cache::RedisTarget::Host {
                host: "127.0.0.1".into(),
                port,
                password: None,
            }),
            connect_timeout: Duration::from_millis(200),
            ..Default::default()
        });

        assert_eq!(cache.tier().await.name(), "unavailable");
        cache.set("k", &document("A"), Duration::from_secs(60)).await;
        assert!(cache.get("k").await.is_none());
    }
}
