//! SQLite persistence.
//!
//! Repositories borrow a [`rusqlite::Connection`] and run synchronously; the
//! async [`Store`](crate::store::Store) service owns the connection and
//! serializes access to it.

mod bookings;
mod migrations;
mod overrides;
mod reservations;

use std::error::Error as StdError;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::Connection;
use rusqlite::types::Type;
use staysync_core::DateRange;

use crate::error::EngineResult;

pub use bookings::{ExternalBookingRepository, SqliteExternalBookingRepository};
pub use overrides::{ManualOverride, OverrideRepository, SqliteOverrideRepository};
pub use reservations::{ReservationRepository, SqliteReservationRepository};

/// An open, migrated SQLite database.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (creating if needed) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> EngineResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::init(conn)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> EngineResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> EngineResult<Self> {
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        migrations::run(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Parses a text column through `FromStr`.
pub(crate) fn parse_column<T>(idx: usize, value: String) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: Into<Box<dyn StdError + Send + Sync>>,
{
    value
        .parse()
        .map_err(|e: T::Err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

/// Rebuilds a stay from its two date columns.
pub(crate) fn stay_from_columns(
    idx: usize,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> rusqlite::Result<DateRange> {
    DateRange::new(check_in, check_out)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
