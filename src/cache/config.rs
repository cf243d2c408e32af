//! Cache configuration.
//!
//! Controls backend selection (Redis or in-process), entry TTL and the
//! in-process capacity via the `[cache]` settings section.

use std::{num::NonZeroUsize, time::Duration};

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

// Default values for cache configuration
const DEFAULT_TTL_SECONDS: u64 = 21_600;
const DEFAULT_MEMORY_LIMIT: usize = 1000;
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 500;
const DEFAULT_REDIS_PORT: u16 = 6379;

/// Connection parameters for the networked tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedisTarget {
    Url(String),
    Host {
        host: String,
        port: u16,
        password: Option<String>,
    },
}

impl RedisTarget {
    /// Connection URL understood by the Redis client.
    pub fn connection_url(&self) -> String {
        match self {
            RedisTarget::Url(url) => url.clone(),
            RedisTarget::Host {
                host,
                port,
                password: Some(password),
            } => format!(
                "redis://:{}@{host}:{port}",
                utf8_percent_encode(password, NON_ALPHANUMERIC)
            ),
            RedisTarget::Host {
                host,
                port,
                password: None,
            } => format!("redis://{host}:{port}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Networked tier; `None` selects the in-process map.
    pub redis: Option<RedisTarget>,
    pub connect_timeout: Duration,
    /// Lifetime of each stored document.
    pub ttl: Duration,
    /// Maximum entries in the in-process map.
    pub memory_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis: None,
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            ttl: Duration::from_secs(DEFAULT_TTL_SECONDS),
            memory_limit: DEFAULT_MEMORY_LIMIT,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        let non_blank = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let redis = match (non_blank(&settings.redis_url), non_blank(&settings.redis_host)) {
            (Some(url), _) => Some(RedisTarget::Url(url)),
            (None, Some(host)) => Some(RedisTarget::Host {
                host,
                port: settings.redis_port.unwrap_or(DEFAULT_REDIS_PORT),
                password: non_blank(&settings.redis_password),
            }),
            (None, None) => None,
        };

        Self {
            redis,
            connect_timeout: Duration::from_millis(settings.connect_timeout_ms),
            ttl: Duration::from_secs(settings.ttl_seconds),
            memory_limit: settings.memory_limit,
        }
    }
}

impl CacheConfig {
    /// Returns the memory limit as NonZeroUsize, clamping to 1 if zero.
    pub fn memory_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.memory_limit).unwrap_or(NonZeroUsize::MIN)
    }
}
