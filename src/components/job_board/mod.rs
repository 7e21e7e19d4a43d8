use crate::components::google_calendar::CalendarSource;
use crate::components::job_store::{Job, JobMeta, JobMetaPatch, JobStore};
use crate::error::JobResult;
use crate::utils::time::DayRange;
use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::{error, info};

/// Static message shown in place of the job list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    NoJobs,
    LoadFailed,
    SignedOut,
}

impl EmptyState {
    pub fn message(&self) -> String {
        match self {
            EmptyState::NoJobs => t!("no_jobs").to_string(),
            EmptyState::LoadFailed => t!("load_failed").to_string(),
            EmptyState::SignedOut => t!("signed_out").to_string(),
        }
    }
}

/// What a day looks like once loaded
#[derive(Debug, Clone, PartialEq)]
pub enum BoardState {
    Jobs(Vec<Job>),
    Empty(EmptyState),
}

/// A day's calendar events joined with their local annotations
pub struct JobBoard<'a> {
    source: &'a dyn CalendarSource,
    store: &'a JobStore,
    timezone: Tz,
}

impl<'a> JobBoard<'a> {
    pub fn new(source: &'a dyn CalendarSource, store: &'a JobStore, timezone: Tz) -> Self {
        Self {
            source,
            store,
            timezone,
        }
    }

    /// Fetch `date`'s events and annotate them. A failed fetch becomes an empty state.
    pub async fn load_day(&self, date: NaiveDate) -> JobResult<BoardState> {
        let range = DayRange::for_date(date, self.timezone)?;

        let events = match self.source.list_events(&range).await {
            Ok(events) => events,
            Err(e) => {
                error!("Error loading events: {}", e);
                return Ok(BoardState::Empty(EmptyState::LoadFailed));
            }
        };

        if events.is_empty() {
            return Ok(BoardState::Empty(EmptyState::NoJobs));
        }

        let metas = self.store.load().await?;
        let jobs = events
            .into_iter()
            .map(|event| {
                let meta = metas.get(&event.id).cloned().unwrap_or_default();
                Job { event, meta }
            })
            .collect::<Vec<_>>();

        info!("Loaded {} jobs for {}", jobs.len(), date);
        Ok(BoardState::Jobs(jobs))
    }

    pub async fn set_status(&self, event_id: &str, status: &str) -> JobResult<JobMeta> {
        self.store
            .update(event_id, JobMetaPatch::status(status))
            .await
    }

    pub async fn assign(&self, event_id: &str, tech: &str) -> JobResult<JobMeta> {
        self.store.update(event_id, JobMetaPatch::tech(tech)).await
    }
}
