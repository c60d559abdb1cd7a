//! Admin booking admission.
//!
//! Admission validates and persists a manually entered reservation. It does
//! not look for conflicts; callers check the availability grid first.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use staysync_core::{
    BookingSource, DateRange, Guest, PaymentInfo, Reservation, ReservationStatus, RoomId,
};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::store::Store;

/// Input for a new admin reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionRequest {
    pub guest_name: String,
    pub contact_number: String,
    pub email: Option<String>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: u32,
    pub kids: u32,
    pub has_pet: bool,
    pub room_id: Option<RoomId>,
    /// Total price in minor currency units.
    pub total_amount: i64,
    pub payment: Option<PaymentInfo>,
}

impl AdmissionRequest {
    /// Creates a request for one adult with no extras. A room must be set
    /// with [`with_room`](Self::with_room) before the request validates.
    pub fn new(
        guest_name: impl Into<String>,
        contact_number: impl Into<String>,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Self {
        Self {
            guest_name: guest_name.into(),
            contact_number: contact_number.into(),
            email: None,
            check_in,
            check_out,
            adults: 1,
            kids: 0,
            has_pet: false,
            room_id: None,
            total_amount: 0,
            payment: None,
        }
    }

    /// Builder: set the party size.
    pub fn with_guests(mut self, adults: u32, kids: u32) -> Self {
        self.adults = adults;
        self.kids = kids;
        self
    }

    /// Builder: set the room.
    pub fn with_room(mut self, room: impl Into<RoomId>) -> Self {
        self.room_id = Some(room.into());
        self
    }

    /// Builder: set email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Builder: set the pet flag.
    pub fn with_pet(mut self, has_pet: bool) -> Self {
        self.has_pet = has_pet;
        self
    }

    /// Builder: set the total amount in minor units.
    pub fn with_total_amount(mut self, amount: i64) -> Self {
        self.total_amount = amount;
        self
    }

    /// Builder: record a payment.
    pub fn with_payment(mut self, payment: PaymentInfo) -> Self {
        self.payment = Some(payment);
        self
    }

    pub fn guests_count(&self) -> u32 {
        self.adults.saturating_add(self.kids)
    }

    /// Checks the request and turns it into an approved reservation.
    pub fn validate(&self, created_at: DateTime<Utc>) -> EngineResult<Reservation> {
        let name = self.guest_name.trim();
        if name.is_empty() {
            return Err(EngineError::validation("guest name is required"));
        }
        let phone = self.contact_number.trim();
        if phone.is_empty() {
            return Err(EngineError::validation("contact number is required"));
        }
        let room = self
            .room_id
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| EngineError::validation("room id is required"))?;
        if self.guests_count() < 1 {
            return Err(EngineError::validation("at least one guest is required"));
        }
        let stay = DateRange::new(self.check_in, self.check_out).map_err(|_| {
            EngineError::validation(format!(
                "check-in {} must be before check-out {}",
                self.check_in, self.check_out
            ))
        })?;
        if self.total_amount < 0 {
            return Err(EngineError::validation("total amount cannot be negative"));
        }

        let mut guest = Guest::new(name, phone);
        if let Some(email) = self.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            guest = guest.with_email(email);
        }

        let id = Uuid::new_v4();
        Ok(Reservation {
            id: id.to_string(),
            reservation_number: reservation_number(created_at, &id),
            status: ReservationStatus::Approved,
            stay,
            adults: self.adults,
            kids: self.kids,
            has_pet: self.has_pet,
            total_amount: self.total_amount,
            primary_guest: Some(guest),
            room: Some(room.to_string()),
            booking_source: BookingSource::Manual,
            payment: self.payment.clone(),
            created_at,
        })
    }
}

/// `RSV-YYYYMMDD-XXXXXX`, the suffix taken from the reservation id.
fn reservation_number(created_at: DateTime<Utc>, id: &Uuid) -> String {
    let suffix: String = id
        .simple()
        .to_string()
        .chars()
        .take(6)
        .collect::<String>()
        .to_ascii_uppercase();
    format!("RSV-{}-{}", created_at.format("%Y%m%d"), suffix)
}

/// Admits admin reservations into the store.
#[derive(Clone)]
pub struct BookingAdmission {
    store: Store,
}

impl BookingAdmission {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Validate `request` and persist it as an approved reservation.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] without touching the store when
    /// the name, contact number or room is blank, the party is empty, or the
    /// stay is empty or reversed.
    pub async fn admit(&self, request: &AdmissionRequest) -> EngineResult<Reservation> {
        let reservation = request.validate(Utc::now()).inspect_err(|err| {
            tracing::warn!(error = %err, "Rejected admission");
        })?;

        self.store.insert_reservation(&reservation).await?;
        tracing::info!(
            id = %reservation.id,
            number = %reservation.reservation_number,
            room = ?reservation.room,
            check_in = %reservation.check_in(),
            check_out = %reservation.check_out(),
            "Admitted reservation"
        );
        Ok(reservation)
    }
}
