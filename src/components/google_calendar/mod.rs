pub mod auth;
pub mod models;
mod session;
pub mod token;

pub use models::{CalendarEvent, EventTime};
pub use session::CalendarSession;

use crate::error::JobResult;
use crate::utils::time::DayRange;
use async_trait::async_trait;

/// Anything that can list a day's calendar events
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Events overlapping `range`, in start-time order
    async fn list_events(&self, range: &DayRange) -> JobResult<Vec<CalendarEvent>>;
}
