//! Admin reservation storage.

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use staysync_core::{
    BookingSource, DateRange, Guest, PaymentInfo, Reservation, ReservationStatus,
};

use super::{parse_column, stay_from_columns};
use crate::error::EngineResult;

const SELECT_COLUMNS: &str = "SELECT id, reservation_number, status, check_in, check_out, adults, kids, has_pet, \
     total_amount, guest_name, guest_phone, guest_email, room_id, booking_source, \
     payment_method, payment_paid_amount, payment_reference, created_at FROM reservations";

/// Storage operations for admin-created reservations.
pub trait ReservationRepository {
    /// Persist a new reservation.
    fn insert(&self, reservation: &Reservation) -> EngineResult<()>;

    /// Get a reservation by id.
    fn get(&self, id: &str) -> EngineResult<Option<Reservation>>;

    /// All reservations, latest check-in first.
    fn list(&self) -> EngineResult<Vec<Reservation>>;

    /// Number of stored reservations.
    fn count(&self) -> EngineResult<usize>;

    /// Change a reservation's status. Returns false if no row matched.
    fn set_status(&self, id: &str, status: ReservationStatus) -> EngineResult<bool>;

    /// Approved or completed reservations of `room` overlapping `range`.
    fn list_active_for_room(&self, room: &str, range: &DateRange)
    -> EngineResult<Vec<Reservation>>;
}

/// `SQLite` implementation of [`ReservationRepository`]
pub struct SqliteReservationRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteReservationRepository<'a> {
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Reservation> {
        let check_in: NaiveDate = row.get(3)?;
        let check_out: NaiveDate = row.get(4)?;

        let primary_guest = match row.get::<_, Option<String>>(9)? {
            Some(name) => Some(Guest {
                name,
                phone: row.get(10)?,
                email: row.get(11)?,
            }),
            None => None,
        };

        let payment = match row.get::<_, Option<String>>(14)? {
            Some(method) => Some(PaymentInfo {
                method,
                paid_amount: row.get::<_, Option<i64>>(15)?.unwrap_or(0),
                reference: row.get(16)?,
            }),
            None => None,
        };

        Ok(Reservation {
            id: row.get(0)?,
            reservation_number: row.get(1)?,
            status: parse_column::<ReservationStatus>(2, row.get(2)?)?,
            stay: stay_from_columns(3, check_in, check_out)?,
            adults: row.get(5)?,
            kids: row.get(6)?,
            has_pet: row.get::<_, i32>(7)? != 0,
            total_amount: row.get(8)?,
            primary_guest,
            room: row.get(12)?,
            booking_source: parse_column::<BookingSource>(13, row.get(13)?)?,
            payment,
            created_at: row.get(17)?,
        })
    }
}

impl ReservationRepository for SqliteReservationRepository<'_> {
    fn insert(&self, reservation: &Reservation) -> EngineResult<()> {
        let guest = reservation.primary_guest.as_ref();
        let payment = reservation.payment.as_ref();
        self.conn.execute(
            "INSERT INTO reservations (
                id, reservation_number, status, check_in, check_out, adults, kids, has_pet,
                total_amount, guest_name, guest_phone, guest_email, room_id, booking_source,
                payment_method, payment_paid_amount, payment_reference, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
            params![
                reservation.id,
                reservation.reservation_number,
                reservation.status.as_str(),
                reservation.check_in(),
                reservation.check_out(),
                reservation.adults,
                reservation.kids,
                i32::from(reservation.has_pet),
                reservation.total_amount,
                guest.map(|g| g.name.as_str()),
                guest.and_then(|g| g.phone.as_deref()),
                guest.and_then(|g| g.email.as_deref()),
                reservation.room,
                reservation.booking_source.as_str(),
                payment.map(|p| p.method.as_str()),
                payment.map(|p| p.paid_amount),
                payment.and_then(|p| p.reference.as_deref()),
                reservation.created_at,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> EngineResult<Option<Reservation>> {
        let reservation = self
            .conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id],
                Self::parse_row,
            )
            .optional()?;
        Ok(reservation)
    }

    fn list(&self) -> EngineResult<Vec<Reservation>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_COLUMNS} ORDER BY check_in DESC, created_at DESC"))?;
        let rows = stmt
            .query_map([], Self::parse_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn count(&self) -> EngineResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM reservations", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn set_status(&self, id: &str, status: ReservationStatus) -> EngineResult<bool> {
        let updated = self.conn.execute(
            "UPDATE reservations SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        Ok(updated > 0)
    }

    fn list_active_for_room(
        &self,
        room: &str,
        range: &DateRange,
    ) -> EngineResult<Vec<Reservation>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_COLUMNS}
             WHERE room_id = ?1 AND status IN ('APPROVED', 'COMPLETED')
               AND check_in < ?3 AND check_out > ?2
             ORDER BY check_in ASC"
        ))?;
        let rows = stmt
            .query_map(params![room, range.start(), range.end()], Self::parse_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}
