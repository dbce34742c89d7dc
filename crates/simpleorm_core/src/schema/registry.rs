//! Table name to ordered column list mapping.

use crate::error::{OrmError, OrmResult};
use std::collections::BTreeMap;

/// Column layout of every registered table.
///
/// Write-once per table name; the stored order is the declaration order and
/// drives the positional layout of generated SELECT statements. Names are
/// matched ASCII case-insensitively, as SQLite matches identifiers.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    tables: BTreeMap<String, RegisteredTable>,
}

#[derive(Debug, Clone)]
struct RegisteredTable {
    name: String,
    columns: Vec<String>,
}

fn table_key(table_name: &str) -> String {
    table_name.to_ascii_lowercase()
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `columns` for `table_name`; a second registration is rejected.
    pub fn register(
        &mut self,
        table_name: impl Into<String>,
        columns: Vec<String>,
    ) -> OrmResult<()> {
        let name = table_name.into();
        let key = table_key(&name);
        if self.tables.contains_key(&key) {
            return Err(OrmError::DuplicateTable(name));
        }
        self.tables.insert(key, RegisteredTable { name, columns });
        Ok(())
    }

    pub fn columns_for(&self, table_name: &str) -> OrmResult<&[String]> {
        self.tables
            .get(&table_key(table_name))
            .map(|table| table.columns.as_slice())
            .ok_or_else(|| OrmError::UnknownTable(table_name.to_string()))
    }

    pub fn contains(&self, table_name: &str) -> bool {
        self.tables.contains_key(&table_key(table_name))
    }

    /// Registered table names as declared, sorted case-insensitively.
    pub fn table_names(&self) -> Vec<String> {
        self.tables.values().map(|table| table.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::SchemaRegistry;
    use crate::error::OrmError;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn returns_columns_in_declaration_order() {
        let mut registry = SchemaRegistry::new();
        registry
            .register("items", columns(&["label", "id", "weight"]))
            .expect("items should register");

        assert_eq!(
            registry.columns_for("items").expect("items is registered"),
            columns(&["label", "id", "weight"]).as_slice()
        );
    }

    #[test]
    fn unknown_table_is_an_error() {
        let registry = SchemaRegistry::new();
        let err = registry.columns_for("missing").expect_err("lookup should fail");
        assert!(matches!(err, OrmError::UnknownTable(name) if name == "missing"));
    }

    #[test]
    fn second_registration_is_rejected_and_keeps_first() {
        let mut registry = SchemaRegistry::new();
        registry
            .register("items", columns(&["id"]))
            .expect("first registration should succeed");
        let err = registry
            .register("items", columns(&["id", "label"]))
            .expect_err("duplicate should fail");

        assert!(matches!(err, OrmError::DuplicateTable(name) if name == "items"));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.columns_for("items").expect("items is registered").len(),
            1
        );
    }

    #[test]
    fn table_names_differing_only_in_case_collide() {
        let mut registry = SchemaRegistry::new();
        registry
            .register("items", columns(&["id", "label"]))
            .expect("items should register");
        let err = registry
            .register("ITEMS", columns(&["id", "name"]))
            .expect_err("case variant should fail");

        assert!(matches!(err, OrmError::DuplicateTable(name) if name == "ITEMS"));
        assert!(registry.contains("Items"));
        assert_eq!(
            registry.columns_for("ITEMS").expect("lookup ignores case"),
            columns(&["id", "label"]).as_slice()
        );
        assert_eq!(registry.table_names(), columns(&["items"]));
    }

    #[test]
    fn table_names_are_sorted() {
        let mut registry = SchemaRegistry::new();
        registry.register("zeta", columns(&["id"])).expect("zeta");
        registry.register("alpha", columns(&["id"])).expect("alpha");
        assert_eq!(registry.table_names(), columns(&["alpha", "zeta"]));
        assert!(registry.contains("zeta"));
        assert!(!registry.is_empty());
    }
}
