//! Relational store boundary over SQLite.
//!
//! # Responsibility
//! - Open and configure the single SQLite connection the ORM routes through.
//! - Provide scoped read access and one-transaction-per-call write access.
//!
//! # Invariants
//! - Every write scope is exactly one transaction: committed on `Ok`,
//!   rolled back on `Err` before the error reaches the caller.
//! - Connection locks are released on every exit path.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod config;
mod open;
mod store;

pub use config::{JournalMode, StoreConfig};
pub use open::{open_store, open_store_in_memory, open_store_with};
pub use store::Store;

pub type DbResult<T> = Result<T, DbError>;

/// Transport-level store failure.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    LockPoisoned,
    InvalidConfig(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::LockPoisoned => write!(f, "store connection lock is poisoned"),
            Self::InvalidConfig(message) => write!(f, "invalid store config: {message}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::LockPoisoned | Self::InvalidConfig(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
