//! Ordered schema steps for the slot database.
//!
//! Steps only add tables or columns. Slot payloads are opaque JSON and are
//! never rewritten by a migration.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// `(version, sql)` in strictly increasing version order.
const STEPS: &[(u32, &str)] = &[(1, include_str!("0001_slots.sql"))];

/// Newest schema version this build can write.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |(version, _)| *version)
}

/// Version currently recorded in the database.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Runs every step newer than the recorded version inside one transaction.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = schema_version(conn)?;
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }

    let pending = STEPS
        .iter()
        .filter(|(version, _)| *version > from)
        .collect::<Vec<_>>();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (version, sql) in pending {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", *version)?;
        info!("event=db_migrate module=db status=ok step={version}");
    }
    tx.commit()?;
    info!("event=db_migrate module=db status=done from_version={from} to_version={latest}");
    Ok(())
}
