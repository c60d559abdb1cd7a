//! Date ranges for stays and availability queries.
//!
//! Every range in the system is a half-open interval of calendar dates
//! `[start, end)`: a stay from the 10th to the 12th occupies the nights of the
//! 10th and 11th, and the 12th is free for the next check-in.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a range would be empty or reversed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid date range: {start} is not before {end}")]
pub struct InvalidRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// A non-empty half-open interval of dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRange", into = "RawRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Serialize, Deserialize)]
struct RawRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawRange> for DateRange {
    type Error = InvalidRange;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl From<DateRange> for RawRange {
    fn from(range: DateRange) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }
}

impl DateRange {
    /// Creates a range, rejecting `start >= end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InvalidRange> {
        if start < end {
            Ok(Self { start, end })
        } else {
            Err(InvalidRange { start, end })
        }
    }

    /// Creates a range covering the inclusive dates `first..=last`.
    pub fn inclusive(first: NaiveDate, last: NaiveDate) -> Result<Self, InvalidRange> {
        let end = last
            .checked_add_days(Days::new(1))
            .ok_or(InvalidRange { start: first, end: last })?;
        Self::new(first, end)
    }

    /// Creates a range covering a single date.
    pub fn single(date: NaiveDate) -> Result<Self, InvalidRange> {
        Self::inclusive(date, date)
    }

    /// Creates a range covering a whole calendar month.
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let end = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some(Self { start, end })
    }

    /// Creates the month range containing the given date.
    pub fn month_of(date: NaiveDate) -> Option<Self> {
        Self::month(date.year(), date.month())
    }

    /// First date in the range (inclusive).
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// End of the range (exclusive).
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of dates (nights, for a stay) in the range.
    pub fn len_days(&self) -> u64 {
        (self.end - self.start).num_days().unsigned_abs()
    }

    /// Checks if a date falls within this range, using `[start, end)`.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    /// Checks if two ranges share at least one date.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Iterates every date in the range in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d < end)
    }
}
