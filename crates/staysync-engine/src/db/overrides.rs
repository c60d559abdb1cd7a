//! Manual availability overrides.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use staysync_core::{DateRange, RoomId};

use crate::error::EngineResult;

/// An operator decision about one room on one date.
///
/// Only rows with `blocked` set make a date `BLOCKED_MANUAL`; an unblocked
/// row records that the operator lifted an earlier block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualOverride {
    pub room_id: RoomId,
    pub date: NaiveDate,
    pub blocked: bool,
    pub note: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Storage operations for manual overrides.
pub trait OverrideRepository {
    /// Upsert one row per date of `dates`. Returns the number of dates written.
    fn upsert(
        &self,
        room: &str,
        dates: &DateRange,
        blocked: bool,
        note: Option<&str>,
    ) -> EngineResult<usize>;

    /// Overrides of `room` inside `range`, by date.
    fn list_for_room(&self, room: &str, range: &DateRange) -> EngineResult<Vec<ManualOverride>>;
}

/// `SQLite` implementation of [`OverrideRepository`]
pub struct SqliteOverrideRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteOverrideRepository<'a> {
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ManualOverride> {
        Ok(ManualOverride {
            room_id: row.get(0)?,
            date: row.get(1)?,
            blocked: row.get::<_, i32>(2)? != 0,
            note: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }
}

impl OverrideRepository for SqliteOverrideRepository<'_> {
    fn upsert(
        &self,
        room: &str,
        dates: &DateRange,
        blocked: bool,
        note: Option<&str>,
    ) -> EngineResult<usize> {
        let now = Utc::now();
        let tx = self.conn.unchecked_transaction()?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO availability_overrides (room_id, date, blocked, note, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(room_id, date) DO UPDATE SET
                    blocked = excluded.blocked,
                    note = excluded.note,
                    updated_at = excluded.updated_at",
            )?;
            for date in dates.days() {
                written += stmt.execute(params![room, date, i32::from(blocked), note, now])?;
            }
        }
        tx.commit()?;
        Ok(written)
    }

    fn list_for_room(&self, room: &str, range: &DateRange) -> EngineResult<Vec<ManualOverride>> {
        let mut stmt = self.conn.prepare(
            "SELECT room_id, date, blocked, note, updated_at FROM availability_overrides
             WHERE room_id = ?1 AND date >= ?2 AND date < ?3
             ORDER BY date ASC",
        )?;
        let rows = stmt
            .query_map(params![room, range.start(), range.end()], Self::parse_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}
