//! SQL text derived from table metadata.
//!
//! Only validated identifiers reach these builders; values are always bound
//! as parameters, never spliced in.

use super::descriptor::TableDescriptor;

/// Renders `CREATE TABLE <name> (<col> <TYPE> <props>, ...)` in declared order.
pub fn build_create_table(descriptor: &TableDescriptor) -> String {
    let definitions = descriptor
        .columns()
        .iter()
        .map(|column| {
            let properties = column.properties.trim();
            if properties.is_empty() {
                format!("{} {}", column.name, column.data_type)
            } else {
                format!("{} {} {}", column.name, column.data_type, properties)
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!("CREATE TABLE {} ({definitions})", descriptor.table_name())
}

/// `SELECT <columns> FROM <table>`.
pub(crate) fn select_sql(table: &str, columns: &[String]) -> String {
    format!("SELECT {} FROM {table}", columns.join(", "))
}

/// `(?,?,...,?)` with `count` placeholders.
pub(crate) fn sql_placeholders(count: usize) -> String {
    debug_assert!(count > 0, "placeholder list must not be empty");
    format!("({})", vec!["?"; count].join(","))
}

#[cfg(test)]
mod tests {
    use super::{build_create_table, select_sql, sql_placeholders};
    use crate::schema::descriptor::{ColumnDescriptor, DataType, TableDescriptor};

    #[test]
    fn create_table_keeps_declared_order_without_trailing_comma() {
        let table = TableDescriptor::new("items")
            .column(ColumnDescriptor::primary_key())
            .column(ColumnDescriptor::new("label", DataType::Text))
            .column(ColumnDescriptor::new("weight", DataType::Real).with_properties("NOT NULL"));

        assert_eq!(
            build_create_table(&table),
            "CREATE TABLE items (id INTEGER primary key autoincrement, label TEXT, weight REAL NOT NULL)"
        );
    }

    #[test]
    fn create_table_with_single_column() {
        let table = TableDescriptor::new("ids").column(ColumnDescriptor::primary_key());
        assert_eq!(
            build_create_table(&table),
            "CREATE TABLE ids (id INTEGER primary key autoincrement)"
        );
    }

    #[test]
    fn select_lists_columns_in_order() {
        let columns = vec!["id".to_string(), "label".to_string()];
        assert_eq!(select_sql("items", &columns), "SELECT id, label FROM items");
    }

    #[test]
    fn placeholders_match_count() {
        assert_eq!(sql_placeholders(1), "(?)");
        assert_eq!(sql_placeholders(3), "(?,?,?)");
    }
}
