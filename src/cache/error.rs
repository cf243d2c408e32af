use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis connection failed: {0}")]
    Connect(#[source] redis::RedisError),
    #[error("redis command failed: {0}")]
    Command(#[from] redis::RedisError),
    #[error("cached document could not be encoded or decoded: {0}")]
    Codec(#[from] serde_json::Error),
}
