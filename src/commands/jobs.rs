use super::render::{render_board, render_card, render_raw};
use super::CommandContext;
use crate::components::job_board::{BoardState, JobBoard};
use crate::components::job_store::{JobFilter, StatusFilter};
use crate::error::{other_error, JobResult};
use crate::utils::time::{parse_date, today};
use chrono::NaiveDate;
use tracing::warn;

fn resolve_date(ctx: &CommandContext, date: Option<&str>) -> JobResult<NaiveDate> {
    match date {
        Some(date) => parse_date(date),
        None => Ok(today(ctx.timezone)),
    }
}

fn warn_unknown_status(ctx: &CommandContext, status: &str) {
    if !ctx.config.is_known_status(status) {
        warn!(
            "{}",
            t!(
                "unknown_status",
                status = status,
                known = ctx.config.statuses.join(", ")
            )
        );
    }
}

/// Show a day's jobs, filtered by status and search text
pub async fn list(
    ctx: &mut CommandContext,
    date: Option<&str>,
    status: StatusFilter,
    search: &str,
) -> JobResult<String> {
    let date = resolve_date(ctx, date)?;
    if let StatusFilter::Only(status) = &status {
        warn_unknown_status(ctx, status);
    }

    ctx.session.ensure_signed_in().await?;

    let board = JobBoard::new(&ctx.session, &ctx.store, ctx.timezone);
    let state = board.load_day(date).await?;
    Ok(render_board(&state, &JobFilter::new(status, search), ctx.timezone))
}

/// Show one job from the given day, optionally as raw event JSON
pub async fn show(
    ctx: &mut CommandContext,
    event_id: &str,
    date: Option<&str>,
    raw: bool,
) -> JobResult<String> {
    let date = resolve_date(ctx, date)?;
    ctx.session.ensure_signed_in().await?;

    let board = JobBoard::new(&ctx.session, &ctx.store, ctx.timezone);
    let jobs = match board.load_day(date).await? {
        BoardState::Jobs(jobs) => jobs,
        BoardState::Empty(empty) => return Ok(format!("{}\n", empty.message())),
    };

    let job = jobs
        .iter()
        .find(|job| job.event.id == event_id)
        .ok_or_else(|| {
            other_error(&t!("job_not_found", id = event_id, date = date.to_string()))
        })?;

    if raw {
        Ok(format!("{}\n", render_raw(job)?))
    } else {
        Ok(render_card(job, ctx.timezone))
    }
}

/// Set a job's status
pub async fn set_status(ctx: &CommandContext, event_id: &str, status: &str) -> JobResult<String> {
    warn_unknown_status(ctx, status);
    let board = JobBoard::new(&ctx.session, &ctx.store, ctx.timezone);
    let meta = board.set_status(event_id, status).await?;
    Ok(format!("{}: {}\n", event_id, meta.status))
}

/// Assign a technician to a job; an empty name clears the assignment
pub async fn assign(ctx: &CommandContext, event_id: &str, tech: &str) -> JobResult<String> {
    let board = JobBoard::new(&ctx.session, &ctx.store, ctx.timezone);
    let meta = board.assign(event_id, tech.trim()).await?;
    if meta.tech.is_empty() {
        Ok(format!("{}: unassigned\n", event_id))
    } else {
        Ok(format!("{}: {}\n", event_id, meta.tech))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::storage::MemoryStore;
    use crate::config::Config;
    use std::sync::Arc;

    fn context() -> CommandContext {
        CommandContext::with_storage(Config::default(), Arc::new(MemoryStore::new())).unwrap()
    }

    #[tokio::test]
    async fn test_set_status_then_assign() {
        let ctx = context();
        assert_eq!(
            set_status(&ctx, "evt1", "Completed").await.unwrap(),
            "evt1: Completed\n"
        );
        assert_eq!(assign(&ctx, "evt1", "  Ana ").await.unwrap(), "evt1: Ana\n");

        let meta = ctx.store.get("evt1").await.unwrap();
        assert_eq!(meta.status, "Completed");
        assert_eq!(meta.tech, "Ana");

        assert_eq!(assign(&ctx, "evt1", "").await.unwrap(), "evt1: unassigned\n");
        assert_eq!(ctx.store.get("evt1").await.unwrap().status, "Completed");
    }

    #[tokio::test]
    async fn test_bad_date_is_rejected_before_network() {
        let mut ctx = context();
        assert!(list(&mut ctx, Some("tomorrow"), StatusFilter::All, "")
            .await
            .is_err());
    }
}
