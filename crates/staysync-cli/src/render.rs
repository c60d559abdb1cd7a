//! Plain-text rendering of command results.
//!
//! Every function returns the full text without a trailing newline; `--json`
//! output bypasses this module.

use staysync_core::{AvailabilityGrid, CachedExternalBooking, Reservation};
use staysync_engine::{SyncOutcome, SyncReport};

/// One line per date, then the per-status totals.
pub fn render_grid(grid: &AvailabilityGrid) -> String {
    let mut lines = vec![format!(
        "{} {} .. {}",
        grid.room_id,
        grid.range.start(),
        grid.range.end()
    )];
    for day in &grid.days {
        lines.push(format!(
            "{} {}  {}",
            day.date.format("%a"),
            day.date,
            day.status.as_str()
        ));
    }
    let totals: Vec<String> = grid
        .counts()
        .iter()
        .map(|(status, count)| format!("{} {}", status.as_str(), count))
        .collect();
    lines.push(totals.join(", "));
    lines.join("\n")
}

/// Per-source outcomes followed by the cache size.
pub fn render_sync_report(report: &SyncReport) -> String {
    let mut lines: Vec<String> = report
        .outcomes
        .iter()
        .map(|(source, outcome)| {
            let (status, detail) = match outcome {
                SyncOutcome::Success { count } => ("ok", format!("{} bookings", count)),
                SyncOutcome::Failure { reason } => ("failed", reason.clone()),
            };
            format!("{:<12} {:<7} {}", source.as_str(), status, detail)
        })
        .collect();
    if lines.is_empty() {
        lines.push("No feeds configured.".to_string());
    }
    lines.push(format!(
        "{} channel bookings cached",
        report.reservations.len()
    ));
    lines.join("\n")
}

pub fn render_reservations(reservations: &[Reservation]) -> String {
    if reservations.is_empty() {
        return "No reservations.".to_string();
    }
    reservations
        .iter()
        .map(|r| {
            format!(
                "{}  {} -> {}  {:<9}  {:<8}  {}",
                r.reservation_number,
                r.check_in(),
                r.check_out(),
                r.status.as_str(),
                r.room.as_deref().unwrap_or("-"),
                r.primary_guest.as_ref().map_or("-", |g| g.name.as_str()),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_bookings(bookings: &[CachedExternalBooking]) -> String {
    if bookings.is_empty() {
        return "No cached channel bookings.".to_string();
    }
    bookings
        .iter()
        .map(|b| {
            format!(
                "{} -> {}  {:<11}  {}  {}",
                b.event.check_in(),
                b.event.check_out(),
                b.source().as_str(),
                b.uid(),
                b.event.summary
            )
            .trim_end()
            .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
