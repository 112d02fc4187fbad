//! SQLite connection bootstrap.
//!
//! Connections handed out from here have foreign keys enforced and every
//! migration applied.

use std::{path::Path, time::Duration};

use rusqlite::Connection;

pub mod migrations;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    #[error("invalid stored data: {0}")]
    InvalidData(String),
}

/// Open (creating if needed) a database file
pub fn open(path: impl AsRef<Path>) -> StoreResult<Connection> {
    let path = path.as_ref();
    let mut conn = Connection::open(path)?;
    bootstrap(&mut conn)?;
    tracing::info!(path = %path.display(), "opened database");
    Ok(conn)
}

/// Open a private database that disappears with the connection
pub fn open_in_memory() -> StoreResult<Connection> {
    let mut conn = Connection::open_in_memory()?;
    bootstrap(&mut conn)?;
    tracing::info!("opened in-memory database");
    Ok(conn)
}

fn bootstrap(conn: &mut Connection) -> StoreResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    migrations::apply_migrations(conn)
}
