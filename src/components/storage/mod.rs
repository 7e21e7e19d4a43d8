use crate::config::{Config, StorageBackend};
use crate::error::JobResult;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

mod file_store;
mod memory_store;
mod redis_store;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use redis_store::RedisStore;

// Storage key constants
pub mod keys {
    pub const JOB_META: &str = "honestech_status";
    pub const GOOGLE_CALENDAR_TOKEN: &str = "google_calendar_token";
}

/// A string blob store with one value per fixed key
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the blob stored under `key`, if any
    async fn get(&self, key: &str) -> JobResult<Option<String>>;

    /// Replace the blob stored under `key`
    async fn set(&self, key: &str, value: String) -> JobResult<()>;

    /// Remove `key`; removing a missing key is not an error
    async fn delete(&self, key: &str) -> JobResult<()>;
}

/// Open the backend selected in the configuration
pub fn open(config: &Config) -> JobResult<Arc<dyn KeyValueStore>> {
    match &config.storage {
        StorageBackend::File(dir) => {
            info!("Using file storage in {}", dir.display());
            Ok(Arc::new(FileStore::new(dir.clone())))
        }
        StorageBackend::Redis(url) => {
            info!("Using Redis storage at {}", url);
            Ok(Arc::new(RedisStore::open(url)?))
        }
    }
}
