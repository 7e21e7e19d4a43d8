use super::KeyValueStore;
use crate::error::JobResult;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client as RedisClient};

/// Stores each key as a plain Redis string
#[derive(Clone)]
pub struct RedisStore {
    client: RedisClient,
}

impl RedisStore {
    /// Create a store for the given Redis URL; the connection is opened lazily
    pub fn open(redis_url: &str) -> JobResult<Self> {
        let client = RedisClient::open(redis_url)?;
        Ok(Self { client })
    }

    async fn connection(&self) -> JobResult<MultiplexedConnection> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> JobResult<Option<String>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> JobResult<()> {
        let mut conn = self.connection().await?;
        () = conn.set(key, value).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> JobResult<()> {
        let mut conn = self.connection().await?;
        () = conn.del(key).await?;
        Ok(())
    }
}
