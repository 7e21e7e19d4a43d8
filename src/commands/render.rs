use crate::components::job_board::{BoardState, EmptyState};
use crate::components::job_store::{Job, JobFilter};
use crate::error::JobResult;
use crate::utils::time::format_time;
use chrono_tz::Tz;

/// Text card for one job
pub fn render_card(job: &Job, tz: Tz) -> String {
    let event = &job.event;
    let title = event
        .summary
        .clone()
        .unwrap_or_else(|| t!("no_title").to_string());
    let location = event
        .location
        .clone()
        .unwrap_or_else(|| t!("no_location").to_string());

    let start = event.start.value().map(|v| format_time(v, tz)).unwrap_or_default();
    let end = event.end.value().map(|v| format_time(v, tz)).unwrap_or_default();

    let mut card = format!("[{}] {}\n", job.meta.status, title);
    card.push_str(&format!("  {} – {}\n", start, end));
    card.push_str(&format!("  {}\n", location));
    if !job.meta.tech.is_empty() {
        card.push_str(&format!("  Tech: {}\n", job.meta.tech));
    }
    if let Some(notes) = event.description.as_deref().filter(|d| !d.trim().is_empty()) {
        for line in notes.lines() {
            card.push_str(&format!("  | {}\n", line));
        }
    }
    card.push_str(&format!("  id: {}\n", event.id));
    card
}

/// The event exactly as the calendar returned it
pub fn render_raw(job: &Job) -> JobResult<String> {
    Ok(serde_json::to_string_pretty(&job.event)?)
}

/// A filtered day, or the appropriate empty-state message
pub fn render_board(state: &BoardState, filter: &JobFilter, tz: Tz) -> String {
    let jobs = match state {
        BoardState::Empty(empty) => return format!("{}\n", empty.message()),
        BoardState::Jobs(jobs) => jobs,
    };

    let visible = filter.apply(jobs);
    if visible.is_empty() {
        return format!("{}\n", t!("no_matches"));
    }

    visible
        .into_iter()
        .map(|job| render_card(job, tz))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Message for a signed-out board
pub fn render_signed_out() -> String {
    format!("{}\n", EmptyState::SignedOut.message())
}
