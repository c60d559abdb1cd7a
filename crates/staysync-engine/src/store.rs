//! Shared async store service.

use std::path::PathBuf;
use std::sync::Arc;

use staysync_core::{
    BookingSource, CachedExternalBooking, DateRange, ExternalEvent, Reservation, ReservationStatus,
};
use tokio::sync::Mutex;

use crate::db::{
    Database, ExternalBookingRepository, ManualOverride, OverrideRepository,
    ReservationRepository, SqliteExternalBookingRepository, SqliteOverrideRepository,
    SqliteReservationRepository,
};
use crate::error::{EngineError, EngineResult};

/// Everything that decides one room's availability over a range, read
/// under a single lock so no write lands halfway through.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityInputs {
    pub overrides: Vec<ManualOverride>,
    pub reservations: Vec<Reservation>,
    /// External bookings overlapping the range, from every source.
    pub external: Vec<CachedExternalBooking>,
}

/// Thread-safe handle to the database and its repositories.
///
/// Each call holds the connection only for the duration of its statement or
/// transaction, so feed fetches and parsing never wait on each other.
#[derive(Clone)]
pub struct Store {
    db: Arc<Mutex<Database>>,
    path: Option<PathBuf>,
}

impl Store {
    /// Open the store at `path`, creating parent directories as needed.
    pub async fn open(path: impl Into<PathBuf>) -> EngineResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                EngineError::store(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        let db = Database::open(&path)?;
        tracing::info!(path = %path.display(), "Opened booking store");
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            path: Some(path),
        })
    }

    /// Open a private in-memory store (primarily for tests).
    pub fn open_in_memory() -> EngineResult<Self> {
        Ok(Self {
            db: Arc::new(Mutex::new(Database::open_in_memory()?)),
            path: None,
        })
    }

    /// Database file location, `None` when in memory.
    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    // External booking cache

    pub async fn list_external(&self) -> EngineResult<Vec<CachedExternalBooking>> {
        let db = self.db.lock().await;
        SqliteExternalBookingRepository::new(db.conn()).list_all()
    }

    pub async fn find_external(&self, uid: &str) -> EngineResult<Option<CachedExternalBooking>> {
        let db = self.db.lock().await;
        SqliteExternalBookingRepository::new(db.conn()).find_by_uid(uid)
    }

    pub async fn replace_source(
        &self,
        source: BookingSource,
        events: &[ExternalEvent],
    ) -> EngineResult<usize> {
        let db = self.db.lock().await;
        SqliteExternalBookingRepository::new(db.conn()).replace_source(source, events)
    }

    pub async fn clear_external(&self) -> EngineResult<usize> {
        let db = self.db.lock().await;
        SqliteExternalBookingRepository::new(db.conn()).clear_all()
    }

    pub async fn retain_sources(&self, configured: &[BookingSource]) -> EngineResult<usize> {
        let db = self.db.lock().await;
        SqliteExternalBookingRepository::new(db.conn()).retain_sources(configured)
    }

    // Admin reservations

    pub async fn insert_reservation(&self, reservation: &Reservation) -> EngineResult<()> {
        let db = self.db.lock().await;
        SqliteReservationRepository::new(db.conn()).insert(reservation)
    }

    pub async fn get_reservation(&self, id: &str) -> EngineResult<Option<Reservation>> {
        let db = self.db.lock().await;
        SqliteReservationRepository::new(db.conn()).get(id)
    }

    pub async fn list_reservations(&self) -> EngineResult<Vec<Reservation>> {
        let db = self.db.lock().await;
        SqliteReservationRepository::new(db.conn()).list()
    }

    pub async fn count_reservations(&self) -> EngineResult<usize> {
        let db = self.db.lock().await;
        SqliteReservationRepository::new(db.conn()).count()
    }

    /// Change a reservation's status, failing with `NotFound` for unknown ids.
    pub async fn set_reservation_status(
        &self,
        id: &str,
        status: ReservationStatus,
    ) -> EngineResult<()> {
        let db = self.db.lock().await;
        if SqliteReservationRepository::new(db.conn()).set_status(id, status)? {
            Ok(())
        } else {
            Err(EngineError::NotFound(format!("reservation {}", id)))
        }
    }

    // Manual overrides

    pub async fn upsert_overrides(
        &self,
        room: &str,
        dates: &DateRange,
        blocked: bool,
        note: Option<&str>,
    ) -> EngineResult<usize> {
        let db = self.db.lock().await;
        SqliteOverrideRepository::new(db.conn()).upsert(room, dates, blocked, note)
    }

    pub async fn list_overrides(
        &self,
        room: &str,
        range: &DateRange,
    ) -> EngineResult<Vec<ManualOverride>> {
        let db = self.db.lock().await;
        SqliteOverrideRepository::new(db.conn()).list_for_room(room, range)
    }

    /// Read the overrides, active reservations and overlapping external
    /// bookings for `room` over `range` in one consistent view.
    pub async fn availability_inputs(
        &self,
        room: &str,
        range: &DateRange,
    ) -> EngineResult<AvailabilityInputs> {
        let db = self.db.lock().await;
        let tx = db.conn().unchecked_transaction()?;

        let overrides = SqliteOverrideRepository::new(&tx).list_for_room(room, range)?;
        let reservations = SqliteReservationRepository::new(&tx).list_active_for_room(room, range)?;
        let external = SqliteExternalBookingRepository::new(&tx).list_overlapping(range)?;

        tx.commit()?;
        Ok(AvailabilityInputs {
            overrides,
            reservations,
            external,
        })
    }

    /// Run raw SQL against the connection, for tests that sabotage the schema.
    #[cfg(test)]
    pub(crate) async fn execute_for_tests(&self, sql: &str) {
        let db = self.db.lock().await;
        db.conn().execute_batch(sql).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn range(start: u32, end: u32) -> DateRange {
        DateRange::new(date(start), date(end)).unwrap()
    }

    #[tokio::test]
    async fn open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("staysync.db");

        let store = Store::open(&path).await.unwrap();
        assert!(path.exists());
        assert_eq!(store.path(), Some(&path));
        assert_eq!(store.count_reservations().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_reservation_status_change_is_not_found() {
        let store = Store::open_in_memory().unwrap();
        let err = store
            .set_reservation_status("ghost", ReservationStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[tokio::test]
    async fn availability_inputs_filter_external_by_range() {
        let store = Store::open_in_memory().unwrap();
        store
            .replace_source(
                BookingSource::Airbnb,
                &[
                    ExternalEvent::new("in", BookingSource::Airbnb, "", range(9, 11)),
                    ExternalEvent::new("out", BookingSource::Airbnb, "", range(1, 5)),
                ],
            )
            .await
            .unwrap();
        store
            .upsert_overrides("garden", &range(10, 11), true, None)
            .await
            .unwrap();

        let inputs = store
            .availability_inputs("garden", &range(10, 15))
            .await
            .unwrap();
        assert_eq!(inputs.overrides.len(), 1);
        assert!(inputs.reservations.is_empty());
        let uids: Vec<&str> = inputs.external.iter().map(|b| b.uid()).collect();
        assert_eq!(uids, vec!["in"]);
    }

    #[tokio::test]
    async fn broken_store_surfaces_store_errors() {
        let store = Store::open_in_memory().unwrap();
        store.execute_for_tests("DROP TABLE external_bookings;").await;
        assert!(matches!(
            store.list_external().await.unwrap_err(),
            EngineError::Store(_)
        ));
    }

    #[tokio::test]
    async fn concurrent_replaces_of_one_source_serialize() {
        let store = Store::open_in_memory().unwrap();
        let first: Vec<ExternalEvent> = (1..=5)
            .map(|d| {
                ExternalEvent::new(format!("first-{d}"), BookingSource::Airbnb, "", range(d, d + 1))
            })
            .collect();
        let second: Vec<ExternalEvent> = (10..=12)
            .map(|d| {
                ExternalEvent::new(format!("second-{d}"), BookingSource::Airbnb, "", range(d, d + 1))
            })
            .collect();

        for _ in 0..20 {
            let (a, b) = tokio::join!(
                store.replace_source(BookingSource::Airbnb, &first),
                store.replace_source(BookingSource::Airbnb, &second),
            );
            assert_eq!(a.unwrap(), 5);
            assert_eq!(b.unwrap(), 3);

            let mut stored: Vec<String> = store
                .list_external()
                .await
                .unwrap()
                .iter()
                .map(|booking| booking.uid().to_string())
                .collect();
            stored.sort();
            let expected_first: Vec<String> = first.iter().map(|e| e.uid.clone()).collect();
            let expected_second: Vec<String> = second.iter().map(|e| e.uid.clone()).collect();
            assert!(
                stored == expected_first || stored == expected_second,
                "partition mixed both writes: {:?}",
                stored
            );
        }
    }
}
