//! Error taxonomy shared by registration and data access.
//!
//! # Invariants
//! - Lookups that find nothing surface `NotFound`, never a default value.
//! - Mutating operations never turn a store failure into an empty result.

use crate::db::DbError;
use crate::schema::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type OrmResult<T> = Result<T, OrmError>;

#[derive(Debug)]
pub enum OrmError {
    /// A table descriptor was rejected at registration.
    Validation(ValidationError),
    /// Transport failure reported by the store.
    Db(DbError),
    /// Column metadata requested for a table that was never registered.
    UnknownTable(String),
    /// A DAO was requested for an entity type without a registered table.
    UnknownEntity(&'static str),
    /// A row mapper produced a column the table does not declare.
    UnknownColumn { table: String, column: String },
    /// A row mapper asked for a column the result row does not carry.
    MissingColumn(String),
    NotFound { table: String, id: i64 },
    /// Update/delete by value on an entity that has no identifier yet.
    MissingIdentifier { table: String },
    InsertFailed { table: String, source: DbError },
    AlreadyRegistered,
    NotRegistered,
    DuplicateTable(String),
    DuplicateEntity(&'static str),
    /// A table already in the store lacks a column its descriptor declares.
    SchemaMismatch { table: String, column: String },
    /// A row mapper rejected stored data it could not decode.
    InvalidData(String),
}

impl Display for OrmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UnknownTable(table) => write!(f, "no table registered under name `{table}`"),
            Self::UnknownEntity(entity) => {
                write!(f, "no table registered for entity type `{entity}`")
            }
            Self::UnknownColumn { table, column } => {
                write!(f, "column `{column}` is not declared for table `{table}`")
            }
            Self::MissingColumn(column) => write!(f, "result row has no column `{column}`"),
            Self::NotFound { table, id } => write!(f, "no row in table `{table}` with id {id}"),
            Self::MissingIdentifier { table } => {
                write!(f, "value for table `{table}` carries no identifier")
            }
            Self::InsertFailed { table, source } => {
                write!(f, "insert into `{table}` failed: {source}")
            }
            Self::AlreadyRegistered => write!(f, "a store is already registered"),
            Self::NotRegistered => write!(f, "no store has been registered"),
            Self::DuplicateTable(table) => write!(f, "table `{table}` is declared more than once"),
            Self::DuplicateEntity(entity) => {
                write!(f, "entity type `{entity}` is mapped by more than one table")
            }
            Self::SchemaMismatch { table, column } => write!(
                f,
                "existing table `{table}` has no column `{column}` declared by its descriptor"
            ),
            Self::InvalidData(message) => write!(f, "invalid stored data: {message}"),
        }
    }
}

impl Error for OrmError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InsertFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ValidationError> for OrmError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for OrmError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for OrmError {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::InvalidColumnName(column) => Self::MissingColumn(column),
            other => Self::Db(DbError::Sqlite(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::OrmError;
    use crate::db::DbError;
    use std::error::Error;

    #[test]
    fn invalid_column_name_maps_to_missing_column() {
        let err = OrmError::from(rusqlite::Error::InvalidColumnName("label".to_string()));
        assert!(matches!(err, OrmError::MissingColumn(ref column) if column == "label"));
    }

    #[test]
    fn other_sqlite_errors_stay_store_errors() {
        let err = OrmError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(matches!(err, OrmError::Db(DbError::Sqlite(_))));
        assert!(err.source().is_some());
    }

    #[test]
    fn not_found_names_table_and_id() {
        let err = OrmError::NotFound {
            table: "items".to_string(),
            id: 7,
        };
        assert_eq!(err.to_string(), "no row in table `items` with id 7");
    }
}
