//! Availability reconciliation.
//!
//! Three inputs decide a room's status on a date, highest precedence first:
//!
//! 1. a manual override blocking the date
//! 2. an approved or completed admin reservation covering it
//! 3. an external booking covering it, for the room its channel maps to
//!
//! Stays are half-open, so a check-out date is free for the next check-in.
//! The reconciler only reads the stores, except for override upserts.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use staysync_core::{AvailabilityGrid, AvailabilityStatus, BookingSource, DateRange, RoomId};

use crate::db::ManualOverride;
use crate::error::{EngineError, EngineResult};
use crate::store::Store;

/// Which room each channel's bookings occupy.
///
/// Feeds are per listing, not per room. A channel without an explicit
/// mapping falls back to `default_room`; with no default either, its
/// bookings apply to whatever room is queried, which is right for a
/// single-room property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomMapping {
    pub default_room: Option<RoomId>,
    #[serde(default)]
    pub by_source: HashMap<BookingSource, RoomId>,
}

impl RoomMapping {
    pub fn new(default_room: Option<RoomId>) -> Self {
        Self {
            default_room,
            by_source: HashMap::new(),
        }
    }

    /// Builder: map a channel to a room.
    pub fn with_source(mut self, source: BookingSource, room: impl Into<RoomId>) -> Self {
        self.by_source.insert(source, room.into());
        self
    }

    /// The room a channel's bookings are assigned to, if known.
    pub fn room_for(&self, source: BookingSource) -> Option<RoomId> {
        self.by_source
            .get(&source)
            .or(self.default_room.as_ref())
            .cloned()
    }

    /// Returns true if bookings from `source` block `room`.
    pub fn applies_to(&self, source: BookingSource, room: &str) -> bool {
        match self.room_for(source) {
            Some(mapped) => mapped == room,
            None => true,
        }
    }
}

/// Computes per-date availability and records manual overrides.
#[derive(Clone)]
pub struct AvailabilityReconciler {
    store: Store,
    mapping: RoomMapping,
}

impl AvailabilityReconciler {
    pub fn new(store: Store, mapping: RoomMapping) -> Self {
        Self { store, mapping }
    }

    pub fn mapping(&self) -> &RoomMapping {
        &self.mapping
    }

    /// Availability of `room` on every date of `range`, in date order.
    pub async fn compute_availability(
        &self,
        room: &str,
        range: DateRange,
    ) -> EngineResult<AvailabilityGrid> {
        let room = require_room(room)?;
        let inputs = self.store.availability_inputs(room, &range).await?;

        let blocked: HashSet<NaiveDate> = inputs
            .overrides
            .iter()
            .filter(|o| o.blocked)
            .map(|o| o.date)
            .collect();
        let external: Vec<DateRange> = inputs
            .external
            .iter()
            .filter(|b| self.mapping.applies_to(b.source(), room))
            .map(|b| b.stay())
            .collect();

        let grid = AvailabilityGrid::build(room, range, |date| {
            AvailabilityStatus::resolve(
                blocked.contains(&date),
                inputs.reservations.iter().any(|r| r.occupies(room, date)),
                external.iter().any(|stay| stay.contains(date)),
            )
        });

        tracing::debug!(
            room,
            start = %range.start(),
            end = %range.end(),
            overrides = blocked.len(),
            reservations = inputs.reservations.len(),
            external = external.len(),
            "Computed availability"
        );
        Ok(grid)
    }

    /// Set or lift a manual block on `room` for every date of `dates`.
    ///
    /// No conflict check is made against existing bookings; a block over a
    /// booked date shows up as `BLOCKED_MANUAL` on the next query.
    pub async fn update_availability(
        &self,
        room: &str,
        dates: DateRange,
        blocked: bool,
        note: Option<&str>,
    ) -> EngineResult<usize> {
        let room = require_room(room)?;
        let note = note.map(str::trim).filter(|n| !n.is_empty());
        let written = self
            .store
            .upsert_overrides(room, &dates, blocked, note)
            .await?;
        tracing::info!(
            room,
            start = %dates.start(),
            end = %dates.end(),
            blocked,
            "Updated manual availability"
        );
        Ok(written)
    }

    /// Overrides recorded for `room` inside `range`.
    pub async fn list_overrides(
        &self,
        room: &str,
        range: DateRange,
    ) -> EngineResult<Vec<ManualOverride>> {
        let room = require_room(room)?;
        self.store.list_overrides(room, &range).await
    }
}

fn require_room(room: &str) -> EngineResult<&str> {
    let room = room.trim();
    if room.is_empty() {
        return Err(EngineError::validation("room id is required"));
    }
    Ok(room)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use staysync_core::{ExternalEvent, Guest, Reservation, ReservationStatus};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn range(start: u32, end: u32) -> DateRange {
        DateRange::new(date(start), date(end)).unwrap()
    }

    fn booking(id: &str, room: &str, stay: DateRange, status: ReservationStatus) -> Reservation {
        Reservation {
            id: id.to_string(),
            reservation_number: format!("RSV-{id}"),
            status,
            stay,
            adults: 2,
            kids: 0,
            has_pet: false,
            total_amount: 0,
            primary_guest: Some(Guest::new("Grace Hopper", "555-0000")),
            room: Some(room.to_string()),
            booking_source: BookingSource::Manual,
            payment: None,
            created_at: Utc::now(),
        }
    }

    fn reconciler(store: &Store) -> AvailabilityReconciler {
        AvailabilityReconciler::new(store.clone(), RoomMapping::new(Some("garden".to_string())))
    }

    #[tokio::test]
    async fn manual_override_wins_over_booking() {
        let store = Store::open_in_memory().unwrap();
        store
            .insert_reservation(&booking("r1", "garden", range(10, 12), ReservationStatus::Approved))
            .await
            .unwrap();
        let reconciler = reconciler(&store);
        reconciler
            .update_availability("garden", range(10, 11), true, Some("boiler"))
            .await
            .unwrap();

        let grid = reconciler
            .compute_availability("garden", range(10, 12))
            .await
            .unwrap();
        assert_eq!(grid.status_on(date(10)), Some(AvailabilityStatus::BlockedManual));
        assert_eq!(grid.status_on(date(11)), Some(AvailabilityStatus::Booked));
    }

    #[tokio::test]
    async fn checkout_day_is_available() {
        let store = Store::open_in_memory().unwrap();
        store
            .insert_reservation(&booking("r1", "garden", range(10, 12), ReservationStatus::Approved))
            .await
            .unwrap();

        let grid = reconciler(&store)
            .compute_availability("garden", range(12, 13))
            .await
            .unwrap();
        assert_eq!(grid.status_on(date(12)), Some(AvailabilityStatus::Available));
    }

    #[tokio::test]
    async fn grid_covers_every_date_in_order() {
        let store = Store::open_in_memory().unwrap();
        let grid = reconciler(&store)
            .compute_availability("garden", range(1, 32))
            .await
            .unwrap();

        assert_eq!(grid.days.len(), 31);
        assert!(grid.days.windows(2).all(|w| w[0].date.succ_opt() == Some(w[1].date)));
        assert!(grid.days.iter().all(|d| d.status.is_available() && d.room_id == "garden"));
    }

    #[tokio::test]
    async fn inactive_reservations_do_not_book() {
        let store = Store::open_in_memory().unwrap();
        store
            .insert_reservation(&booking("p", "garden", range(10, 11), ReservationStatus::Pending))
            .await
            .unwrap();
        store
            .insert_reservation(&booking("c", "garden", range(11, 12), ReservationStatus::Cancelled))
            .await
            .unwrap();
        store
            .insert_reservation(&booking("done", "garden", range(12, 13), ReservationStatus::Completed))
            .await
            .unwrap();

        let grid = reconciler(&store)
            .compute_availability("garden", range(10, 13))
            .await
            .unwrap();
        assert_eq!(grid.status_on(date(10)), Some(AvailabilityStatus::Available));
        assert_eq!(grid.status_on(date(11)), Some(AvailabilityStatus::Available));
        assert_eq!(grid.status_on(date(12)), Some(AvailabilityStatus::Booked));
    }

    #[tokio::test]
    async fn external_bookings_follow_room_mapping() {
        let store = Store::open_in_memory().unwrap();
        store
            .replace_source(
                BookingSource::Airbnb,
                &[ExternalEvent::new("a", BookingSource::Airbnb, "", range(10, 12))],
            )
            .await
            .unwrap();
        store
            .replace_source(
                BookingSource::Vrbo,
                &[ExternalEvent::new("v", BookingSource::Vrbo, "", range(12, 13))],
            )
            .await
            .unwrap();
        let mapping = RoomMapping::new(Some("garden".to_string()))
            .with_source(BookingSource::Vrbo, "attic");
        let reconciler = AvailabilityReconciler::new(store.clone(), mapping);

        let garden = reconciler
            .compute_availability("garden", range(10, 13))
            .await
            .unwrap();
        assert_eq!(garden.status_on(date(11)), Some(AvailabilityStatus::BlockedExternal));
        assert_eq!(garden.status_on(date(12)), Some(AvailabilityStatus::Available));

        let attic = reconciler
            .compute_availability("attic", range(10, 13))
            .await
            .unwrap();
        assert_eq!(attic.status_on(date(11)), Some(AvailabilityStatus::Available));
        assert_eq!(attic.status_on(date(12)), Some(AvailabilityStatus::BlockedExternal));
    }

    #[tokio::test]
    async fn admin_booking_outranks_external_block() {
        let store = Store::open_in_memory().unwrap();
        store
            .replace_source(
                BookingSource::Airbnb,
                &[ExternalEvent::new("a", BookingSource::Airbnb, "", range(10, 12))],
            )
            .await
            .unwrap();
        store
            .insert_reservation(&booking("r1", "garden", range(11, 12), ReservationStatus::Approved))
            .await
            .unwrap();

        let grid = reconciler(&store)
            .compute_availability("garden", range(10, 12))
            .await
            .unwrap();
        assert_eq!(grid.status_on(date(10)), Some(AvailabilityStatus::BlockedExternal));
        assert_eq!(grid.status_on(date(11)), Some(AvailabilityStatus::Booked));
    }

    #[tokio::test]
    async fn lifting_a_block_restores_availability() {
        let store = Store::open_in_memory().unwrap();
        let reconciler = reconciler(&store);
        reconciler
            .update_availability("garden", range(10, 12), true, None)
            .await
            .unwrap();
        reconciler
            .update_availability("garden", range(10, 11), false, Some("  "))
            .await
            .unwrap();

        let grid = reconciler
            .compute_availability("garden", range(10, 12))
            .await
            .unwrap();
        assert_eq!(grid.status_on(date(10)), Some(AvailabilityStatus::Available));
        assert_eq!(grid.status_on(date(11)), Some(AvailabilityStatus::BlockedManual));

        let overrides = reconciler.list_overrides("garden", range(10, 12)).await.unwrap();
        assert_eq!(overrides.len(), 2);
        assert_eq!(overrides[0].note, None);
    }

    #[tokio::test]
    async fn blank_room_is_rejected() {
        let store = Store::open_in_memory().unwrap();
        let err = reconciler(&store)
            .compute_availability("  ", range(10, 11))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));
    }

    #[test]
    fn room_mapping_falls_back_to_default() {
        let mapping = RoomMapping::new(Some("garden".to_string()))
            .with_source(BookingSource::BookingCom, "attic");
        assert_eq!(mapping.room_for(BookingSource::Airbnb).as_deref(), Some("garden"));
        assert_eq!(mapping.room_for(BookingSource::BookingCom).as_deref(), Some("attic"));

        let unmapped = RoomMapping::default();
        assert!(unmapped.applies_to(BookingSource::Airbnb, "anything"));
    }
}
