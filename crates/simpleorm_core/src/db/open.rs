//! Connection bootstrap for the relational store.
//!
//! # Invariants
//! - Returned stores have the configured busy timeout and `foreign_keys` pragma.
//! - No table is created here; schema creation belongs to registration.

use super::config::StoreConfig;
use super::store::Store;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens a file-backed store with default options.
///
/// # Side effects
/// - Creates the database file when missing.
/// - Emits `db_open` logging events with duration and status.
pub fn open_store(path: impl AsRef<Path>) -> DbResult<Store> {
    open_store_with(&StoreConfig::file(path.as_ref()))
}

/// Opens a private in-memory store with default options.
pub fn open_store_in_memory() -> DbResult<Store> {
    open_store_with(&StoreConfig::in_memory())
}

/// Opens a store described by `config`.
pub fn open_store_with(config: &StoreConfig) -> DbResult<Store> {
    let started_at = Instant::now();
    let mode = if config.is_in_memory() { "memory" } else { "file" };
    info!("event=db_open module=db status=start mode={mode}");

    let opened = match config.path.as_deref() {
        Some(path) => {
            if path.as_os_str().is_empty() {
                Err(DbError::InvalidConfig("path cannot be empty".to_string()))
            } else {
                Connection::open(path).map_err(DbError::from)
            }
        }
        None => Connection::open_in_memory().map_err(DbError::from),
    };

    let conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={err}",
                started_at.elapsed().as_millis()
            );
            return Err(err);
        }
    };

    if let Err(err) = configure_connection(&conn, config) {
        error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_configure_failed error={err}",
            started_at.elapsed().as_millis()
        );
        return Err(err);
    }

    info!(
        "event=db_open module=db status=ok mode={mode} duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(Store::new(conn))
}

fn configure_connection(conn: &Connection, config: &StoreConfig) -> DbResult<()> {
    let foreign_keys = if config.foreign_keys { "ON" } else { "OFF" };
    conn.execute_batch(&format!("PRAGMA foreign_keys = {foreign_keys};"))?;
    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;

    if !config.is_in_memory() {
        // journal_mode answers with the resulting mode, so it must be read as a query.
        let applied: String = conn.query_row(
            &format!("PRAGMA journal_mode = {};", config.journal_mode.as_pragma()),
            [],
            |row| row.get(0),
        )?;
        if !applied.eq_ignore_ascii_case(config.journal_mode.as_pragma()) {
            return Err(DbError::InvalidConfig(format!(
                "journal_mode `{}` was not applied, store reports `{applied}`",
                config.journal_mode.as_pragma()
            )));
        }
    }

    Ok(())
}
