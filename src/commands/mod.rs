use crate::components::storage::{self, KeyValueStore};
use crate::components::{CalendarSession, JobStore};
use crate::config::Config;
use crate::error::JobResult;
use chrono_tz::Tz;
use std::sync::Arc;

pub mod auth;
pub mod jobs;
pub mod render;

/// Everything a command needs, created once per run
pub struct CommandContext {
    pub config: Arc<Config>,
    pub timezone: Tz,
    pub store: JobStore,
    pub session: CalendarSession,
}

impl CommandContext {
    /// Open storage from the configuration
    pub fn new(config: Config) -> JobResult<Self> {
        let storage = storage::open(&config)?;
        Self::with_storage(config, storage)
    }

    /// Use an already opened storage backend
    pub fn with_storage(config: Config, storage: Arc<dyn KeyValueStore>) -> JobResult<Self> {
        let timezone = config.tz()?;
        let config = Arc::new(config);
        Ok(Self {
            store: JobStore::new(Arc::clone(&storage)),
            session: CalendarSession::new(Arc::clone(&config), storage),
            config,
            timezone,
        })
    }
}
