//! External booking cache.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use staysync_core::{BookingSource, CachedExternalBooking, DateRange, ExternalEvent};

use super::{parse_column, stay_from_columns};
use crate::error::EngineResult;

const SELECT_COLUMNS: &str = "SELECT uid, source, summary, check_in, check_out, synced_at FROM external_bookings";

/// Storage operations for bookings synchronized from channel feeds.
pub trait ExternalBookingRepository {
    /// Every cached booking, latest check-in first.
    fn list_all(&self) -> EngineResult<Vec<CachedExternalBooking>>;

    /// Bookings whose stay overlaps `range`, latest check-in first.
    fn list_overlapping(&self, range: &DateRange) -> EngineResult<Vec<CachedExternalBooking>>;

    /// Look up one booking by its feed uid.
    ///
    /// Uids are only unique within a source. When several sources carry the
    /// same uid the most recently synced row wins.
    fn find_by_uid(&self, uid: &str) -> EngineResult<Option<CachedExternalBooking>>;

    /// Replace every row of `source` with `events` in one transaction.
    ///
    /// Events sharing a uid collapse to the last one. On any error the
    /// source's previous rows are left exactly as they were. Returns the
    /// number of rows written.
    fn replace_source(&self, source: BookingSource, events: &[ExternalEvent])
    -> EngineResult<usize>;

    /// Delete every cached booking. Returns the number of rows removed.
    fn clear_all(&self) -> EngineResult<usize>;

    /// Delete rows whose source is not in `configured`. Returns the number
    /// of rows removed.
    fn retain_sources(&self, configured: &[BookingSource]) -> EngineResult<usize>;
}

/// `SQLite` implementation of [`ExternalBookingRepository`]
pub struct SqliteExternalBookingRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteExternalBookingRepository<'a> {
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CachedExternalBooking> {
        let check_in: NaiveDate = row.get(3)?;
        let check_out: NaiveDate = row.get(4)?;
        let synced_at: DateTime<Utc> = row.get(5)?;
        let event = ExternalEvent::new(
            row.get::<_, String>(0)?,
            parse_column::<BookingSource>(1, row.get(1)?)?,
            row.get::<_, String>(2)?,
            stay_from_columns(3, check_in, check_out)?,
        );
        Ok(CachedExternalBooking::new(event, synced_at))
    }
}

/// Collapses events sharing a uid, keeping the last one in its first slot.
fn dedupe_last_wins(events: &[ExternalEvent]) -> Vec<&ExternalEvent> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut unique: Vec<&ExternalEvent> = Vec::with_capacity(events.len());
    for event in events {
        match slots.get(event.uid.as_str()) {
            Some(&idx) => unique[idx] = event,
            None => {
                slots.insert(event.uid.as_str(), unique.len());
                unique.push(event);
            }
        }
    }
    unique
}

impl ExternalBookingRepository for SqliteExternalBookingRepository<'_> {
    fn list_all(&self) -> EngineResult<Vec<CachedExternalBooking>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_COLUMNS} ORDER BY check_in DESC, uid ASC"))?;
        let rows = stmt
            .query_map([], Self::parse_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn list_overlapping(&self, range: &DateRange) -> EngineResult<Vec<CachedExternalBooking>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_COLUMNS} WHERE check_in < ?2 AND check_out > ?1 ORDER BY check_in DESC, uid ASC"
        ))?;
        let rows = stmt
            .query_map(params![range.start(), range.end()], Self::parse_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn find_by_uid(&self, uid: &str) -> EngineResult<Option<CachedExternalBooking>> {
        let booking = self
            .conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE uid = ?1 ORDER BY synced_at DESC, source ASC LIMIT 1"),
                params![uid],
                Self::parse_row,
            )
            .optional()?;
        Ok(booking)
    }

    fn replace_source(
        &self,
        source: BookingSource,
        events: &[ExternalEvent],
    ) -> EngineResult<usize> {
        let unique = dedupe_last_wins(events);
        let synced_at = Utc::now();

        // Dropping the transaction without commit rolls back.
        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute(
            "DELETE FROM external_bookings WHERE source = ?1",
            params![source.as_str()],
        )?;

        {
            let mut insert = tx.prepare(
                "INSERT INTO external_bookings (uid, source, summary, check_in, check_out, synced_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for event in &unique {
                if event.source != source {
                    tracing::warn!(
                        uid = %event.uid,
                        expected = %source,
                        actual = %event.source,
                        "Event tagged with another source, storing under the replaced source"
                    );
                }
                insert.execute(params![
                    event.uid,
                    source.as_str(),
                    event.summary,
                    event.check_in(),
                    event.check_out(),
                    synced_at,
                ])?;
            }
        }

        tx.commit()?;
        tracing::debug!(
            source = %source,
            removed,
            inserted = unique.len(),
            "Replaced cached bookings"
        );
        Ok(unique.len())
    }

    fn clear_all(&self) -> EngineResult<usize> {
        let removed = self.conn.execute("DELETE FROM external_bookings", [])?;
        tracing::info!(removed, "Cleared external booking cache");
        Ok(removed)
    }

    fn retain_sources(&self, configured: &[BookingSource]) -> EngineResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let stored: Vec<String> = {
            let mut stmt = tx.prepare("SELECT DISTINCT source FROM external_bookings")?;
            stmt.query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<_>>()?
        };

        let mut removed = 0;
        for source in stored {
            if configured.iter().any(|c| c.as_str() == source) {
                continue;
            }
            let count = tx.execute(
                "DELETE FROM external_bookings WHERE source = ?1",
                params![source],
            )?;
            tracing::info!(source = %source, removed = count, "Pruned bookings of unconfigured source");
            removed += count;
        }
        tx.commit()?;
        Ok(removed)
    }
}
