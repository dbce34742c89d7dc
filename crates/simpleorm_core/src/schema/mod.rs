//! Table metadata, validation, DDL and column registry.
//!
//! # Responsibility
//! - Describe tables explicitly (name, ordered columns, row mapper).
//! - Reject malformed descriptors before they reach the store.
//! - Derive `CREATE TABLE` text and keep the table -> columns map.
//!
//! # Invariants
//! - Every registered table declares `id INTEGER`.
//! - Column order is declaration order everywhere.

pub mod ddl;
mod descriptor;
mod registry;
mod validate;

pub use ddl::build_create_table;
pub use descriptor::{ColumnDescriptor, DataType, TableDescriptor, ID_COLUMN};
pub use registry::SchemaRegistry;
pub use validate::{validate_descriptor, ValidationError};

pub(crate) use descriptor::MapperBinding;
