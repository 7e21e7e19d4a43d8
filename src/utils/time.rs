use crate::error::{other_error, JobResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// One local day, as bounds for the events list query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayRange {
    /// Local 00:00:00 through 23:59:59 of `date` in `tz`
    pub fn for_date(date: NaiveDate, tz: Tz) -> JobResult<Self> {
        let start = local_instant(date.and_time(NaiveTime::MIN), tz)?;
        let end_time = NaiveTime::from_hms_opt(23, 59, 59)
            .ok_or_else(|| other_error("Failed to create end of day"))?;
        let end = local_instant(date.and_time(end_time), tz)?;
        Ok(Self { start, end })
    }

    /// `timeMin` query value
    pub fn time_min(&self) -> String {
        self.start.to_rfc3339()
    }

    /// `timeMax` query value
    pub fn time_max(&self) -> String {
        self.end.to_rfc3339()
    }
}

/// Resolve a wall-clock time in `tz`, taking the earlier instant across DST folds
fn local_instant(naive: NaiveDateTime, tz: Tz) -> JobResult<DateTime<Utc>> {
    match tz.from_local_datetime(&naive).earliest() {
        Some(dt) => Ok(dt.with_timezone(&Utc)),
        // Inside a spring-forward gap; an hour later always exists
        None => tz
            .from_local_datetime(&(naive + chrono::Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| other_error(&format!("Invalid local time {} in {}", naive, tz))),
    }
}

/// Today's date in `tz`
pub fn today(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Parse a YYYY-MM-DD date
pub fn parse_date(s: &str) -> JobResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| other_error(&format!("Invalid date '{}'. Expected YYYY-MM-DD", s)))
}

/// Clock time for an RFC 3339 value in `tz` (e.g. `9:05 AM`); anything else is returned as-is
pub fn format_time(value: &str, tz: Tz) -> String {
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => dt.with_timezone(&tz).format("%-I:%M %p").to_string(),
        Err(_) => value.to_string(),
    }
}
