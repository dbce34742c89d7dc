//! Shared store handle.

use super::{DbError, DbResult};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Cloneable handle to the one SQLite connection of a process.
///
/// SQLite serializes writers itself; the mutex only keeps the non-`Sync`
/// connection usable from several threads.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    conn: Mutex<Connection>,
    calls: AtomicU64,
}

impl Debug for Store {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("calls", &self.call_count())
            .finish_non_exhaustive()
    }
}

impl Store {
    pub(crate) fn new(conn: Connection) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                conn: Mutex::new(conn),
                calls: AtomicU64::new(0),
            }),
        }
    }

    /// Runs `op` with shared access to the connection.
    pub fn read<R, E>(&self, op: impl FnOnce(&Connection) -> Result<R, E>) -> Result<R, E>
    where
        E: From<DbError>,
    {
        let conn = self.lock()?;
        self.inner.calls.fetch_add(1, Ordering::Relaxed);
        op(&conn)
    }

    /// Runs `op` inside one `IMMEDIATE` transaction.
    ///
    /// The transaction commits only when `op` returns `Ok`. Any error, from
    /// `op` or from the commit itself, leaves the transaction rolled back.
    pub fn write<R, E>(&self, op: impl FnOnce(&Transaction<'_>) -> Result<R, E>) -> Result<R, E>
    where
        E: From<DbError>,
    {
        let mut conn = self.lock()?;
        self.inner.calls.fetch_add(1, Ordering::Relaxed);
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(DbError::from)?;
        let value = op(&tx)?;
        tx.commit().map_err(DbError::from)?;
        Ok(value)
    }

    /// Number of read/write scopes opened through this handle so far.
    pub fn call_count(&self) -> u64 {
        self.inner.calls.load(Ordering::Relaxed)
    }

    /// Returns whether both handles point at the same connection.
    pub fn same_store(&self, other: &Store) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.inner.conn.lock().map_err(|_| DbError::LockPoisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::Store;
    use crate::db::DbError;
    use rusqlite::Connection;

    fn scratch_store() -> Store {
        let store = Store::new(Connection::open_in_memory().expect("in-memory db should open"));
        store
            .write(|tx| tx.execute_batch("CREATE TABLE t (v INTEGER);").map_err(DbError::from))
            .expect("scratch table should be created");
        store
    }

    fn row_count(store: &Store) -> i64 {
        store
            .read(|conn| {
                conn.query_row("SELECT COUNT(*) FROM t;", [], |row| row.get(0))
                    .map_err(DbError::from)
            })
            .expect("count should succeed")
    }

    #[test]
    fn write_commits_on_ok() {
        let store = scratch_store();
        store
            .write(|tx| tx.execute("INSERT INTO t (v) VALUES (1);", []).map_err(DbError::from))
            .expect("insert should commit");
        assert_eq!(row_count(&store), 1);
    }

    #[test]
    fn write_rolls_back_on_err() {
        let store = scratch_store();
        let result: Result<(), DbError> = store.write(|tx| {
            tx.execute("INSERT INTO t (v) VALUES (1);", [])?;
            Err(DbError::InvalidConfig("forced failure".to_string()))
        });
        assert!(result.is_err());
        assert_eq!(row_count(&store), 0);
    }

    #[test]
    fn call_count_tracks_scopes() {
        let store = scratch_store();
        let before = store.call_count();
        row_count(&store);
        row_count(&store);
        assert_eq!(store.call_count(), before + 2);
    }

    #[test]
    fn clones_share_the_connection() {
        let store = scratch_store();
        let clone = store.clone();
        assert!(store.same_store(&clone));
        let other = Store::new(Connection::open_in_memory().expect("in-memory db should open"));
        assert!(!store.same_store(&other));
    }
}
