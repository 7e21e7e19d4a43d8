use super::models::JobMeta;
use crate::components::google_calendar::CalendarEvent;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// A calendar event together with its local annotation
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub event: CalendarEvent,
    pub meta: JobMeta,
}

/// Status selector: every job, or only jobs with exactly this status
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(String),
}

impl FromStr for StatusFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == "all" {
            StatusFilter::All
        } else {
            StatusFilter::Only(s.to_string())
        })
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("all"),
            StatusFilter::Only(status) => f.write_str(status),
        }
    }
}

/// Status plus free-text search over a day's jobs
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    status: StatusFilter,
    search: String,
}

impl JobFilter {
    pub fn new(status: StatusFilter, search: &str) -> Self {
        Self {
            status,
            search: search.to_lowercase(),
        }
    }

    /// Whether one job passes both the status and the search criteria
    pub fn matches(&self, job: &Job) -> bool {
        if let StatusFilter::Only(status) = &self.status {
            if job.meta.status != *status {
                return false;
            }
        }

        if self.search.is_empty() {
            return true;
        }

        let event = &job.event;
        let haystack = [
            event.summary.as_deref().unwrap_or(""),
            event.location.as_deref().unwrap_or(""),
            event.description.as_deref().unwrap_or(""),
            job.meta.tech.as_str(),
        ]
        .concat()
        .to_lowercase();

        haystack.contains(&self.search)
    }

    /// Matching jobs, in their original order
    pub fn apply<'a>(&self, jobs: &'a [Job]) -> Vec<&'a Job> {
        jobs.iter().filter(|job| self.matches(job)).collect()
    }
}
