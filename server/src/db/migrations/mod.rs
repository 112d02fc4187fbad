//! Schema migrations, applied in order on every open.
//!
//! Script `n` in [`SCRIPTS`] brings the schema to version `n + 1`; the
//! applied version lives in `PRAGMA user_version`.

use rusqlite::Connection;

use super::{StoreError, StoreResult};

const SCRIPTS: &[&str] = &[include_str!("0001_init.sql")];

pub fn latest_version() -> u32 {
    SCRIPTS.len() as u32
}

/// Bring the schema up to [`latest_version`] in one transaction
pub fn apply_migrations(conn: &mut Connection) -> StoreResult<()> {
    let current = current_version(conn)?;
    let pending = SCRIPTS.get(current as usize..).ok_or(StoreError::UnsupportedSchemaVersion {
        db_version: current,
        latest_supported: latest_version(),
    })?;
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (version, script) in (current + 1..).zip(pending) {
        tracing::info!(version, "migrating schema");
        tx.execute_batch(script)?;
        tx.pragma_update(None, "user_version", version)?;
    }
    tx.commit()?;
    Ok(())
}

pub fn current_version(conn: &Connection) -> StoreResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
