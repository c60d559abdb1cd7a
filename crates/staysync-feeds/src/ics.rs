//! iCalendar feed parsing.
//!
//! Channel exports are plain RFC 5545 documents with one VEVENT per
//! reservation (UID, SUMMARY, DTSTART, DTEND). Every date or date-time is
//! reduced to a calendar date; the resulting stay is `[DTSTART, DTEND)`.

use chrono::{Days, NaiveDate};
use icalendar::{
    Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime, Event, EventLike,
    EventStatus,
};
use staysync_core::{BookingSource, DateRange, ExternalEvent};
use tracing::{debug, warn};

use crate::error::{FeedError, FeedResult};

/// Parses a raw feed payload into external events.
///
/// Malformed or unusable VEVENTs are logged and skipped. Only a payload that
/// is not a calendar document at all fails the whole parse. Output order
/// follows the document.
pub fn parse_feed(source: BookingSource, raw: &[u8]) -> FeedResult<Vec<ExternalEvent>> {
    let text = std::str::from_utf8(raw).map_err(|e| {
        FeedError::parse("feed is not valid UTF-8")
            .with_source_tag(source)
            .with_cause(e)
    })?;
    let text = text.trim_start_matches('\u{feff}');

    if !text
        .lines()
        .any(|line| line.trim().eq_ignore_ascii_case("BEGIN:VCALENDAR"))
    {
        return Err(FeedError::parse("missing BEGIN:VCALENDAR").with_source_tag(source));
    }

    let calendar = text
        .parse::<Calendar>()
        .map_err(|e| FeedError::parse(format!("malformed calendar: {}", e)).with_source_tag(source))?;

    let events: Vec<ExternalEvent> = calendar
        .iter()
        .filter_map(|component| match component {
            CalendarComponent::Event(event) => parse_event(source, event),
            _ => None,
        })
        .collect();

    debug!(source = %source, count = events.len(), "Parsed feed");
    Ok(events)
}

fn parse_event(source: BookingSource, event: &Event) -> Option<ExternalEvent> {
    let Some(uid) = event.get_uid().map(str::trim).filter(|uid| !uid.is_empty()) else {
        warn!(source = %source, "Dropping VEVENT without UID");
        return None;
    };

    if matches!(event.get_status(), Some(EventStatus::Cancelled)) {
        debug!(source = %source, uid = %uid, "Skipping cancelled VEVENT");
        return None;
    }

    let Some(start) = event.get_start() else {
        warn!(source = %source, uid = %uid, "Dropping VEVENT with missing or unreadable DTSTART");
        return None;
    };
    let start_is_date = matches!(start, DatePerhapsTime::Date(_));
    let check_in = to_date(start);

    let check_out = match event.get_end() {
        Some(end) => to_date(end),
        // All-day event without DTEND lasts one day (RFC 5545 3.6.1).
        None if start_is_date => check_in.checked_add_days(Days::new(1))?,
        None => {
            warn!(source = %source, uid = %uid, "Dropping timed VEVENT without DTEND");
            return None;
        }
    };

    let stay = match DateRange::new(check_in, check_out) {
        Ok(stay) => stay,
        Err(e) => {
            warn!(source = %source, uid = %uid, error = %e, "Dropping VEVENT with empty stay");
            return None;
        }
    };

    let summary = event.get_summary().map(str::trim).unwrap_or_default();
    Some(ExternalEvent::new(uid, source, summary, stay))
}

/// Reduces a DTSTART/DTEND value to the calendar date it names.
///
/// Zoned and floating times keep their local date; the zone is not resolved.
fn to_date(value: DatePerhapsTime) -> NaiveDate {
    match value {
        DatePerhapsTime::Date(date) => date,
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => dt.date_naive(),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => naive.date(),
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, .. }) => {
            date_time.date()
        }
    }
}
