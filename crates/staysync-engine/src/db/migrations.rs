//! Database migrations

use rusqlite::{Connection, params};

use crate::error::EngineResult;

/// Current schema version
const CURRENT_VERSION: i32 = 1;

/// Run all pending migrations
pub fn run(conn: &Connection) -> EngineResult<()> {
    let version = get_version(conn)?;

    if version < 1 {
        migrate_v1(conn)?;
    }

    tracing::debug!(version = CURRENT_VERSION, "Database schema up to date");
    Ok(())
}

fn get_version(conn: &Connection) -> EngineResult<i32> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version')",
        [],
        |row| row.get(0),
    )?;
    if !exists {
        return Ok(0);
    }

    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Migration to version 1: initial schema
fn migrate_v1(conn: &Connection) -> EngineResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );

        -- Reservations synchronized from channel feeds, one partition per source
        -- Feed uids are only unique within their own source
        CREATE TABLE IF NOT EXISTS external_bookings (
            uid TEXT NOT NULL,
            source TEXT NOT NULL,
            summary TEXT NOT NULL DEFAULT '',
            check_in TEXT NOT NULL,
            check_out TEXT NOT NULL,
            synced_at TEXT NOT NULL,
            PRIMARY KEY (source, uid),
            CHECK (check_in < check_out)
        );
        CREATE INDEX IF NOT EXISTS idx_external_bookings_uid ON external_bookings(uid);
        CREATE INDEX IF NOT EXISTS idx_external_bookings_check_in ON external_bookings(check_in DESC);

        -- Admin-created reservations
        CREATE TABLE IF NOT EXISTS reservations (
            id TEXT PRIMARY KEY,
            reservation_number TEXT NOT NULL UNIQUE,
            status TEXT NOT NULL,
            check_in TEXT NOT NULL,
            check_out TEXT NOT NULL,
            adults INTEGER NOT NULL,
            kids INTEGER NOT NULL,
            has_pet INTEGER NOT NULL DEFAULT 0,
            total_amount INTEGER NOT NULL DEFAULT 0,
            guest_name TEXT,
            guest_phone TEXT,
            guest_email TEXT,
            room_id TEXT,
            booking_source TEXT NOT NULL,
            payment_method TEXT,
            payment_paid_amount INTEGER,
            payment_reference TEXT,
            created_at TEXT NOT NULL,
            CHECK (check_in < check_out)
        );
        CREATE INDEX IF NOT EXISTS idx_reservations_room ON reservations(room_id, check_in);

        -- Operator overrides, one row per room and date
        CREATE TABLE IF NOT EXISTS availability_overrides (
            room_id TEXT NOT NULL,
            date TEXT NOT NULL,
            blocked INTEGER NOT NULL,
            note TEXT,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (room_id, date)
        );",
    )?;

    tx.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        params![1],
    )?;
    tx.commit()?;

    tracing::info!("Applied database migration v1");
    Ok(())
}
