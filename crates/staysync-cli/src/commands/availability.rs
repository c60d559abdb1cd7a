//! `staysync availability`, `block` and `unblock`.

use chrono::NaiveDate;
use serde::Serialize;
use staysync_core::DateRange;

use super::Context;
use crate::cli::{DateSpan, PeriodArgs};
use crate::error::{CliError, CliResult};
use crate::render;

/// Resolves the query period, defaulting to the month containing `today`.
pub fn period_range(period: &PeriodArgs, today: NaiveDate) -> CliResult<DateRange> {
    match (period.month, period.from, period.to) {
        (Some((year, month)), _, _) => DateRange::month(year, month)
            .ok_or_else(|| CliError::invalid_argument(format!("invalid month {}-{:02}", year, month))),
        (None, Some(from), Some(to)) => span_range(from, to),
        _ => DateRange::month_of(today)
            .ok_or_else(|| CliError::invalid_argument("cannot resolve the current month")),
    }
}

fn span_range(from: NaiveDate, to: NaiveDate) -> CliResult<DateRange> {
    DateRange::new(from, to).map_err(|e| CliError::invalid_argument(e.to_string()))
}

/// Print the availability grid of a room.
pub async fn show(
    ctx: &Context,
    room: Option<&str>,
    period: &PeriodArgs,
    today: NaiveDate,
) -> CliResult<String> {
    let room = ctx.config.resolve_room(room)?;
    let range = period_range(period, today)?;
    let grid = ctx.reconciler().compute_availability(&room, range).await?;
    ctx.output(&grid, render::render_grid)
}

#[derive(Debug, Serialize)]
struct OverrideSummary {
    room_id: String,
    range: DateRange,
    blocked: bool,
    dates: usize,
}

/// Block or unblock a span of dates.
pub async fn set_block(
    ctx: &Context,
    room: Option<&str>,
    span: &DateSpan,
    note: Option<&str>,
    blocked: bool,
) -> CliResult<String> {
    let room = ctx.config.resolve_room(room)?;
    let range = span_range(span.from, span.to)?;
    let dates = ctx
        .reconciler()
        .update_availability(&room, range, blocked, note)
        .await?;

    let summary = OverrideSummary {
        room_id: room,
        range,
        blocked,
        dates,
    };
    ctx.output(&summary, |s| {
        format!(
            "{} {} date(s) on {} from {} until {}",
            if s.blocked { "Blocked" } else { "Unblocked" },
            s.dates,
            s.room_id,
            s.range.start(),
            s.range.end()
        )
    })
}
