//! Per-date availability, derived from bookings and overrides.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::time::DateRange;

/// Identifier of a room in the property.
pub type RoomId = String;

/// Availability of a room on one date.
///
/// Variants are declared from lowest to highest precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AvailabilityStatus {
    Available,
    BlockedExternal,
    Booked,
    BlockedManual,
}

impl AvailabilityStatus {
    /// Resolves the status of a date from the facts that apply to it.
    ///
    /// A manual block wins over an admin booking, which wins over a channel
    /// booking.
    pub fn resolve(blocked_manual: bool, booked: bool, blocked_external: bool) -> Self {
        if blocked_manual {
            Self::BlockedManual
        } else if booked {
            Self::Booked
        } else if blocked_external {
            Self::BlockedExternal
        } else {
            Self::Available
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::BlockedExternal => "BLOCKED_EXTERNAL",
            Self::Booked => "BOOKED",
            Self::BlockedManual => "BLOCKED_MANUAL",
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of one room on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityDay {
    pub date: NaiveDate,
    pub status: AvailabilityStatus,
    pub room_id: RoomId,
}

/// Ordered availability for every date of a range, one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityGrid {
    pub room_id: RoomId,
    pub range: DateRange,
    pub days: Vec<AvailabilityDay>,
}

impl AvailabilityGrid {
    /// Builds a grid by resolving each date of `range` with `status_of`.
    pub fn build(
        room_id: impl Into<RoomId>,
        range: DateRange,
        mut status_of: impl FnMut(NaiveDate) -> AvailabilityStatus,
    ) -> Self {
        let room_id = room_id.into();
        let days = range
            .days()
            .map(|date| AvailabilityDay {
                date,
                status: status_of(date),
                room_id: room_id.clone(),
            })
            .collect();
        Self {
            room_id,
            range,
            days,
        }
    }

    /// Returns the status on a date, if the date is inside the grid.
    pub fn status_on(&self, date: NaiveDate) -> Option<AvailabilityStatus> {
        if !self.range.contains(date) {
            return None;
        }
        let index = (date - self.range.start()).num_days();
        usize::try_from(index)
            .ok()
            .and_then(|i| self.days.get(i))
            .map(|day| day.status)
    }

    /// Returns true if every date of `stay` inside the grid is available.
    ///
    /// Dates of `stay` outside the grid are not considered.
    pub fn is_range_free(&self, stay: &DateRange) -> bool {
        self.days
            .iter()
            .filter(|day| stay.contains(day.date))
            .all(|day| day.status.is_available())
    }

    /// Number of dates per status.
    pub fn counts(&self) -> BTreeMap<AvailabilityStatus, usize> {
        let mut counts = BTreeMap::new();
        for day in &self.days {
            *counts.entry(day.status).or_insert(0) += 1;
        }
        counts
    }
}
