//! Static table metadata supplied by callers.

use crate::mapper::RowMapper;
use std::any::{type_name, Any, TypeId};
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// Reserved identifier column every table must declare as `INTEGER`.
pub const ID_COLUMN: &str = "id";

/// Column storage class rendered into `CREATE TABLE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Integer,
    Text,
    Real,
    Blob,
    Numeric,
}

impl DataType {
    /// Canonical SQL spelling.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Text => "TEXT",
            Self::Real => "REAL",
            Self::Blob => "BLOB",
            Self::Numeric => "NUMERIC",
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: DataType,
    /// Raw DDL fragment appended after the type, e.g. `NOT NULL UNIQUE`.
    pub properties: String,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            properties: String::new(),
        }
    }

    pub fn with_properties(mut self, properties: impl Into<String>) -> Self {
        self.properties = properties.into();
        self
    }

    /// `id INTEGER primary key autoincrement`.
    pub fn primary_key() -> Self {
        Self::new(ID_COLUMN, DataType::Integer).with_properties("primary key autoincrement")
    }

    pub fn is_identifier(&self) -> bool {
        self.name == ID_COLUMN && self.data_type == DataType::Integer
    }

    /// Whether the column constraints declare `PRIMARY KEY`, in any case or
    /// spacing.
    pub fn is_primary_key(&self) -> bool {
        let properties = self
            .properties
            .split_whitespace()
            .map(str::to_ascii_lowercase)
            .collect::<Vec<_>>();
        properties
            .windows(2)
            .any(|pair| pair[0] == "primary" && pair[1] == "key")
    }
}

/// Type-erased reference to one entity's [`RowMapper`].
#[derive(Clone)]
pub(crate) struct MapperBinding {
    entity: TypeId,
    entity_name: &'static str,
    handle: Arc<dyn Any + Send + Sync>,
}

impl MapperBinding {
    fn new<M: RowMapper>(mapper: M) -> Self {
        let mapper: Arc<dyn RowMapper<Entity = M::Entity>> = Arc::new(mapper);
        Self {
            entity: TypeId::of::<M::Entity>(),
            entity_name: type_name::<M::Entity>(),
            handle: Arc::new(mapper),
        }
    }

    pub(crate) fn entity(&self) -> TypeId {
        self.entity
    }

    pub(crate) fn entity_name(&self) -> &'static str {
        self.entity_name
    }

    pub(crate) fn mapper<T: Send + 'static>(&self) -> Option<Arc<dyn RowMapper<Entity = T>>> {
        self.handle
            .downcast_ref::<Arc<dyn RowMapper<Entity = T>>>()
            .cloned()
    }
}

/// Table name, ordered columns and row mapper for one entity type.
///
/// Built explicitly by the caller:
///
/// ```
/// # use simpleorm_core::{ColumnDescriptor, DataType, TableDescriptor};
/// let table = TableDescriptor::new("items")
///     .column(ColumnDescriptor::primary_key())
///     .column(ColumnDescriptor::new("label", DataType::Text));
/// assert_eq!(table.column_names(), vec!["id", "label"]);
/// ```
#[derive(Clone)]
pub struct TableDescriptor {
    table_name: String,
    columns: Vec<ColumnDescriptor>,
    mapper: Option<MapperBinding>,
}

impl TableDescriptor {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns: Vec::new(),
            mapper: None,
        }
    }

    pub fn column(mut self, column: ColumnDescriptor) -> Self {
        self.columns.push(column);
        self
    }

    pub fn columns_from(mut self, columns: impl IntoIterator<Item = ColumnDescriptor>) -> Self {
        self.columns.extend(columns);
        self
    }

    /// Binds the row mapper; the mapper's entity type becomes the DAO key.
    pub fn mapper<M: RowMapper>(mut self, mapper: M) -> Self {
        self.mapper = Some(MapperBinding::new(mapper));
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.name.clone()).collect()
    }

    pub fn entity_name(&self) -> Option<&'static str> {
        self.mapper.as_ref().map(MapperBinding::entity_name)
    }

    pub fn has_mapper(&self) -> bool {
        self.mapper.is_some()
    }

    pub(crate) fn binding(&self) -> Option<&MapperBinding> {
        self.mapper.as_ref()
    }
}

impl Debug for TableDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableDescriptor")
            .field("table_name", &self.table_name)
            .field("columns", &self.columns)
            .field("entity", &self.entity_name())
            .finish()
    }
}
