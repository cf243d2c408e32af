//! Networked cache tier backed by Redis.
//!
//! Documents are stored as JSON text with `SET ... EX`.

use std::time::Duration;

use redis::{
    AsyncCommands, Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};

use crate::application::seo::SeoDocument;

use super::error::CacheError;

#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    /// Open a managed connection, failing fast when the server is unreachable.
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, CacheError> {
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(1)
            .set_connection_timeout(timeout);

        let client = Client::open(url).map_err(CacheError::Connect)?;
        let manager = client
            .get_connection_manager_with_config(config)
            .await
            .map_err(CacheError::Connect)?;
        Ok(Self { manager })
    }

    pub async fn get(&self, key: &str) -> Result<Option<SeoDocument>, CacheError> {
        let mut connection = self.manager.clone();
        let raw: Option<String> = connection.get(key).await?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn set(
        &self,
        key: &str,
        value: &SeoDocument,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let payload = serde_json::to_string(value)?;
        let mut connection = self.manager.clone();
        let () = connection
            .set_ex(key, payload, ttl.as_secs().max(1))
            .await?;
        Ok(())
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}
