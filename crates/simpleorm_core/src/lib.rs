//! Descriptor-driven object/relational mapping over SQLite.
//!
//! Callers describe each entity table explicitly (name, ordered columns,
//! row mapper), register the descriptors once together with a store handle,
//! and then obtain a cached generic DAO per entity type.

pub mod dao;
pub mod db;
pub mod error;
pub mod logging;
pub mod mapper;
pub mod registry;
pub mod schema;

pub use dao::{Dao, SqliteDao};
pub use db::{open_store, open_store_in_memory, open_store_with, DbError, Store, StoreConfig};
pub use error::{OrmError, OrmResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use mapper::{RowMapper, RowValues};
pub use registry::Registry;
pub use rusqlite::types::Value;
pub use rusqlite::Row;
pub use schema::{
    build_create_table, validate_descriptor, ColumnDescriptor, DataType, SchemaRegistry,
    TableDescriptor, ValidationError, ID_COLUMN,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
