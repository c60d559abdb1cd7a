//! External calendar events and their cached form.
//!
//! - [`ExternalEvent`]: one reservation as read from a channel's feed
//! - [`CachedExternalBooking`]: the persisted copy, stamped with its sync time

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::source::BookingSource;
use crate::time::DateRange;

/// A reservation parsed from an external calendar feed.
///
/// Channels rarely expose guest details; `summary` is often only initials or
/// a fixed string such as "Reserved".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalEvent {
    /// Feed-assigned identifier, unique within its source.
    pub uid: String,
    /// The channel this event was read from.
    pub source: BookingSource,
    /// Free-text summary, empty when the feed has none.
    pub summary: String,
    /// Occupied nights, `[check_in, check_out)`.
    pub stay: DateRange,
}

impl ExternalEvent {
    /// Creates a new external event.
    pub fn new(
        uid: impl Into<String>,
        source: BookingSource,
        summary: impl Into<String>,
        stay: DateRange,
    ) -> Self {
        Self {
            uid: uid.into(),
            source,
            summary: summary.into(),
            stay,
        }
    }

    /// Check-in date (inclusive).
    pub fn check_in(&self) -> NaiveDate {
        self.stay.start()
    }

    /// Check-out date (exclusive).
    pub fn check_out(&self) -> NaiveDate {
        self.stay.end()
    }
}

/// An external event as held in the booking cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedExternalBooking {
    #[serde(flatten)]
    pub event: ExternalEvent,
    /// When the source holding this row last synced successfully.
    pub synced_at: DateTime<Utc>,
}

impl CachedExternalBooking {
    /// Stamps an event with its sync time.
    pub fn new(event: ExternalEvent, synced_at: DateTime<Utc>) -> Self {
        Self { event, synced_at }
    }

    pub fn uid(&self) -> &str {
        &self.event.uid
    }

    pub fn source(&self) -> BookingSource {
        self.event.source
    }

    pub fn stay(&self) -> DateRange {
        self.event.stay
    }
}
