//! Booking source tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where a booking originated.
///
/// `Manual` marks admin-created bookings; every other variant names a
/// distribution channel whose calendar feed is synchronized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingSource {
    Manual,
    Airbnb,
    BookingCom,
    Vrbo,
    Other,
}

impl BookingSource {
    /// All known sources, in display order.
    pub const ALL: [BookingSource; 5] = [
        Self::Manual,
        Self::Airbnb,
        Self::BookingCom,
        Self::Vrbo,
        Self::Other,
    ];

    /// Returns the stable tag used in storage and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Airbnb => "airbnb",
            Self::BookingCom => "booking_com",
            Self::Vrbo => "vrbo",
            Self::Other => "other",
        }
    }

    /// Returns a human-readable channel name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Manual => "Manual",
            Self::Airbnb => "Airbnb",
            Self::BookingCom => "Booking.com",
            Self::Vrbo => "Vrbo",
            Self::Other => "Other",
        }
    }

    /// Returns true if bookings from this source come from an external feed.
    pub fn is_external(&self) -> bool {
        !matches!(self, Self::Manual)
    }
}

impl fmt::Display for BookingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a source tag is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown booking source: {0}")]
pub struct UnknownSource(pub String);

impl FromStr for BookingSource {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "airbnb" => Ok(Self::Airbnb),
            "booking_com" | "booking.com" | "bookingcom" => Ok(Self::BookingCom),
            "vrbo" => Ok(Self::Vrbo),
            "other" => Ok(Self::Other),
            _ => Err(UnknownSource(s.to_string())),
        }
    }
}
