//! Row mapping capability between entity values and raw store columns.
//!
//! # Responsibility
//! - Define the per-entity strategy the generic DAO delegates to.
//! - Carry encoded column/value sets into parameterized SQL.
//!
//! # Invariants
//! - `decode` reads columns by name, never by position.
//! - `encode` omits the identifier column while the identifier is unset, so
//!   the store can generate one.
//! - `set_id` is invoked exactly once after every successful insert.

use crate::error::OrmResult;
use rusqlite::types::Value;
use rusqlite::Row;

/// Per-entity mapping strategy, supplied by the caller once per entity type.
pub trait RowMapper: Send + Sync + 'static {
    type Entity: Send + 'static;

    /// Builds a fully populated entity from one result row.
    fn decode(&self, row: &Row<'_>) -> OrmResult<Self::Entity>;

    /// Produces the column/value set written by insert and update.
    fn encode(&self, value: &Self::Entity) -> RowValues;

    fn id(&self, value: &Self::Entity) -> Option<i64>;

    /// Writes back the identifier the store generated on insert.
    fn set_id(&self, value: &mut Self::Entity, id: i64);
}

/// Ordered column/value set produced by [`RowMapper::encode`].
///
/// Putting a column twice replaces its earlier value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowValues {
    entries: Vec<(String, Value)>,
}

impl RowValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
    }

    /// Builder form of [`RowValues::put`].
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.put(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
