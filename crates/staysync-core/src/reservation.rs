//! Reservations, the domain view shared by admin and channel bookings.
//!
//! Admin-created reservations carry full guest and payment details. Channel
//! bookings are projected from [`CachedExternalBooking`] rows, which only know
//! a uid, a summary and the stay; everything else is filled with the
//! defaults below.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::availability::RoomId;
use crate::event::CachedExternalBooking;
use crate::source::BookingSource;
use crate::time::DateRange;

/// Adult count assigned to channel bookings, whose feeds carry no party size.
pub const EXTERNAL_DEFAULT_ADULTS: u32 = 1;
/// Kid count assigned to channel bookings.
pub const EXTERNAL_DEFAULT_KIDS: u32 = 0;

/// Lifecycle state of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Approved,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Cancelled => "CANCELLED",
            Self::Completed => "COMPLETED",
        }
    }

    /// Returns true if a reservation in this state occupies its room.
    pub fn occupies_room(&self) -> bool {
        matches!(self, Self::Approved | Self::Completed)
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "CANCELLED" | "CANCELED" => Ok(Self::Cancelled),
            "COMPLETED" => Ok(Self::Completed),
            other => Err(format!("unknown reservation status: {}", other)),
        }
    }
}

/// Primary guest contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Guest {
    /// Creates a guest with a name and phone number.
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: Some(phone.into()),
            email: None,
        }
    }

    /// Builder: set email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Payment metadata recorded for admin bookings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInfo {
    /// How the guest paid (e.g. "cash", "bank_transfer").
    pub method: String,
    /// Amount already received, in minor currency units.
    pub paid_amount: i64,
    /// External payment reference, if any.
    pub reference: Option<String>,
}

/// A reservation for the property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    pub reservation_number: String,
    pub status: ReservationStatus,
    pub stay: DateRange,
    pub adults: u32,
    pub kids: u32,
    pub has_pet: bool,
    /// Total price in minor currency units.
    pub total_amount: i64,
    pub primary_guest: Option<Guest>,
    /// Room assignment; channel bookings without a room mapping have none.
    pub room: Option<RoomId>,
    pub booking_source: BookingSource,
    pub payment: Option<PaymentInfo>,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    /// Check-in date (inclusive).
    pub fn check_in(&self) -> NaiveDate {
        self.stay.start()
    }

    /// Check-out date (exclusive).
    pub fn check_out(&self) -> NaiveDate {
        self.stay.end()
    }

    /// Total party size.
    pub fn guests_count(&self) -> u32 {
        self.adults + self.kids
    }

    /// Returns true if this reservation occupies `room` on `date`.
    pub fn occupies(&self, room: &str, date: NaiveDate) -> bool {
        self.status.occupies_room()
            && self.room.as_deref() == Some(room)
            && self.stay.contains(date)
    }

    /// Projects a cached channel booking into a reservation.
    ///
    /// Feeds carry no party size, pricing or payment data, so the result uses
    /// [`EXTERNAL_DEFAULT_ADULTS`], [`EXTERNAL_DEFAULT_KIDS`], a zero total and
    /// no payment. The summary becomes the guest name when present. `room` is
    /// whatever room the caller maps the channel to.
    pub fn from_external(booking: &CachedExternalBooking, room: Option<RoomId>) -> Self {
        let event = &booking.event;
        let primary_guest = (!event.summary.trim().is_empty()).then(|| Guest {
            name: event.summary.trim().to_string(),
            phone: None,
            email: None,
        });

        Self {
            id: event.uid.clone(),
            reservation_number: event.uid.clone(),
            status: ReservationStatus::Approved,
            stay: event.stay,
            adults: EXTERNAL_DEFAULT_ADULTS,
            kids: EXTERNAL_DEFAULT_KIDS,
            has_pet: false,
            total_amount: 0,
            primary_guest,
            room,
            booking_source: event.source,
            payment: None,
            created_at: booking.synced_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ExternalEvent;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn cached(summary: &str) -> CachedExternalBooking {
        let stay = DateRange::new(date(2024, 5, 10), date(2024, 5, 12)).unwrap();
        CachedExternalBooking::new(
            ExternalEvent::new("ext-1", BookingSource::Airbnb, summary, stay),
            Utc::now(),
        )
    }

    #[test]
    fn external_projection_uses_synthetic_defaults() {
        let booking = cached("Reserved");
        let rsvp = Reservation::from_external(&booking, Some("room-1".into()));

        assert_eq!(rsvp.id, "ext-1");
        assert_eq!(rsvp.status, ReservationStatus::Approved);
        assert_eq!(rsvp.adults, EXTERNAL_DEFAULT_ADULTS);
        assert_eq!(rsvp.kids, EXTERNAL_DEFAULT_KIDS);
        assert_eq!(rsvp.total_amount, 0);
        assert!(rsvp.payment.is_none());
        assert_eq!(rsvp.booking_source, BookingSource::Airbnb);
        assert_eq!(rsvp.primary_guest.unwrap().name, "Reserved");
        assert_eq!(rsvp.room.as_deref(), Some("room-1"));
        assert_eq!(rsvp.created_at, booking.synced_at);
    }

    #[test]
    fn blank_summary_projects_without_guest() {
        let rsvp = Reservation::from_external(&cached("  "), None);
        assert!(rsvp.primary_guest.is_none());
        assert!(rsvp.room.is_none());
    }

    #[test]
    fn only_approved_and_completed_occupy() {
        let mut rsvp = Reservation::from_external(&cached("A"), Some("r".into()));
        assert!(rsvp.occupies("r", date(2024, 5, 11)));
        assert!(!rsvp.occupies("r", date(2024, 5, 12)));
        assert!(!rsvp.occupies("other", date(2024, 5, 11)));

        rsvp.status = ReservationStatus::Completed;
        assert!(rsvp.occupies("r", date(2024, 5, 10)));

        rsvp.status = ReservationStatus::Pending;
        assert!(!rsvp.occupies("r", date(2024, 5, 10)));

        rsvp.status = ReservationStatus::Cancelled;
        assert!(!rsvp.occupies("r", date(2024, 5, 10)));
    }

    #[test]
    fn status_parsing() {
        assert_eq!(
            "approved".parse::<ReservationStatus>().unwrap(),
            ReservationStatus::Approved
        );
        assert_eq!(
            "canceled".parse::<ReservationStatus>().unwrap(),
            ReservationStatus::Cancelled
        );
        assert!("unknown".parse::<ReservationStatus>().is_err());
    }
}
