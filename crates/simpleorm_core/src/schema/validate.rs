//! Registration-time descriptor checks.

use super::descriptor::{TableDescriptor, ID_COLUMN};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

// Names are spliced into SQL text, so only plain identifiers are accepted.
static SQL_IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

/// Descriptor rejected at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingTableMetadata,
    InvalidTableName(String),
    MissingRowMapper { table: String },
    NoColumnsDeclared { table: String },
    InvalidColumnName { table: String, column: String },
    DuplicateColumn { table: String, column: String },
    MissingIntegerIdColumn { table: String },
    IdNotPrimaryKey { table: String },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTableMetadata => write!(f, "table descriptor has no table name"),
            Self::InvalidTableName(name) => write!(f, "table name `{name}` is not a SQL identifier"),
            Self::MissingRowMapper { table } => {
                write!(f, "table `{table}` has no row mapper bound")
            }
            Self::NoColumnsDeclared { table } => write!(f, "table `{table}` declares no columns"),
            Self::InvalidColumnName { table, column } => write!(
                f,
                "column `{column}` of table `{table}` is not a SQL identifier"
            ),
            Self::DuplicateColumn { table, column } => {
                write!(f, "column `{column}` is declared twice in table `{table}`")
            }
            Self::MissingIntegerIdColumn { table } => write!(
                f,
                "table `{table}` must declare `{ID_COLUMN}` as an INTEGER column"
            ),
            Self::IdNotPrimaryKey { table } => write!(
                f,
                "column `{ID_COLUMN}` of table `{table}` must be declared PRIMARY KEY"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Checks that `descriptor` can be registered.
///
/// Checks run in order: table metadata, row mapper, column presence, column
/// names, then the `INTEGER PRIMARY KEY` identifier column. The first
/// failure wins.
pub fn validate_descriptor(descriptor: &TableDescriptor) -> Result<(), ValidationError> {
    let table = descriptor.table_name().trim();
    if table.is_empty() {
        return Err(ValidationError::MissingTableMetadata);
    }
    if !is_sql_identifier(descriptor.table_name()) {
        return Err(ValidationError::InvalidTableName(
            descriptor.table_name().to_string(),
        ));
    }
    if !descriptor.has_mapper() {
        return Err(ValidationError::MissingRowMapper {
            table: table.to_string(),
        });
    }

    let columns = descriptor.columns();
    if columns.is_empty() {
        return Err(ValidationError::NoColumnsDeclared {
            table: table.to_string(),
        });
    }

    let mut seen = BTreeSet::new();
    for column in columns {
        if !is_sql_identifier(&column.name) {
            return Err(ValidationError::InvalidColumnName {
                table: table.to_string(),
                column: column.name.clone(),
            });
        }
        // SQLite identifiers are case-insensitive.
        if !seen.insert(column.name.to_ascii_lowercase()) {
            return Err(ValidationError::DuplicateColumn {
                table: table.to_string(),
                column: column.name.clone(),
            });
        }
    }

    let Some(id_column) = columns.iter().find(|column| column.is_identifier()) else {
        return Err(ValidationError::MissingIntegerIdColumn {
            table: table.to_string(),
        });
    };
    // Only `INTEGER PRIMARY KEY` aliases the rowid that inserts report back.
    if !id_column.is_primary_key() {
        return Err(ValidationError::IdNotPrimaryKey {
            table: table.to_string(),
        });
    }

    Ok(())
}

pub(crate) fn is_sql_identifier(value: &str) -> bool {
    SQL_IDENTIFIER_RE.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::{is_sql_identifier, validate_descriptor, ValidationError};
    use crate::error::OrmResult;
    use crate::mapper::{RowMapper, RowValues};
    use crate::schema::descriptor::{ColumnDescriptor, DataType, TableDescriptor};
    use rusqlite::Row;

    struct Unit;

    struct UnitMapper;

    impl RowMapper for UnitMapper {
        type Entity = Unit;

        fn decode(&self, _row: &Row<'_>) -> OrmResult<Unit> {
            Ok(Unit)
        }

        fn encode(&self, _value: &Unit) -> RowValues {
            RowValues::new()
        }

        fn id(&self, _value: &Unit) -> Option<i64> {
            None
        }

        fn set_id(&self, _value: &mut Unit, _id: i64) {}
    }

    fn items() -> TableDescriptor {
        TableDescriptor::new("items").mapper(UnitMapper)
    }

    #[test]
    fn accepts_well_formed_descriptor() {
        let table = items()
            .column(ColumnDescriptor::primary_key())
            .column(ColumnDescriptor::new("label", DataType::Text));
        validate_descriptor(&table).expect("descriptor should validate");
    }

    #[test]
    fn rejects_blank_table_name_first() {
        let table = TableDescriptor::new("   ");
        assert_eq!(
            validate_descriptor(&table),
            Err(ValidationError::MissingTableMetadata)
        );
    }

    #[test]
    fn rejects_table_name_with_sql_text() {
        let table = TableDescriptor::new("items; DROP TABLE x")
            .column(ColumnDescriptor::primary_key())
            .mapper(UnitMapper);
        assert!(matches!(
            validate_descriptor(&table),
            Err(ValidationError::InvalidTableName(_))
        ));
    }

    #[test]
    fn rejects_missing_mapper() {
        let table = TableDescriptor::new("items").column(ColumnDescriptor::primary_key());
        assert_eq!(
            validate_descriptor(&table),
            Err(ValidationError::MissingRowMapper {
                table: "items".to_string()
            })
        );
    }

    #[test]
    fn rejects_descriptor_without_columns() {
        assert_eq!(
            validate_descriptor(&items()),
            Err(ValidationError::NoColumnsDeclared {
                table: "items".to_string()
            })
        );
    }

    #[test]
    fn rejects_duplicate_columns_case_insensitively() {
        let table = items()
            .column(ColumnDescriptor::primary_key())
            .column(ColumnDescriptor::new("label", DataType::Text))
            .column(ColumnDescriptor::new("LABEL", DataType::Text));
        assert_eq!(
            validate_descriptor(&table),
            Err(ValidationError::DuplicateColumn {
                table: "items".to_string(),
                column: "LABEL".to_string()
            })
        );
    }

    #[test]
    fn rejects_missing_or_mistyped_identifier_column() {
        let without_id = items().column(ColumnDescriptor::new("label", DataType::Text));
        assert_eq!(
            validate_descriptor(&without_id),
            Err(ValidationError::MissingIntegerIdColumn {
                table: "items".to_string()
            })
        );

        let text_id = items().column(ColumnDescriptor::new("id", DataType::Text));
        assert!(matches!(
            validate_descriptor(&text_id),
            Err(ValidationError::MissingIntegerIdColumn { .. })
        ));
    }

    #[test]
    fn rejects_identifier_column_without_primary_key() {
        let plain_id = items()
            .column(ColumnDescriptor::new("id", DataType::Integer))
            .column(ColumnDescriptor::new("label", DataType::Text));
        assert_eq!(
            validate_descriptor(&plain_id),
            Err(ValidationError::IdNotPrimaryKey {
                table: "items".to_string()
            })
        );

        let keyed_id = items()
            .column(ColumnDescriptor::new("id", DataType::Integer).with_properties("PRIMARY KEY"));
        validate_descriptor(&keyed_id).expect("explicit primary key should validate");
    }

    #[test]
    fn identifier_pattern() {
        assert!(is_sql_identifier("_id"));
        assert!(is_sql_identifier("item_2"));
        assert!(!is_sql_identifier("2items"));
        assert!(!is_sql_identifier("label text"));
        assert!(!is_sql_identifier(""));
    }
}
