//! Generic data-access object over registered tables.
//!
//! # Responsibility
//! - Provide CRUD for any entity type with a registered table and mapper.
//! - Build parameterized SQL from the registered column list.
//!
//! # Invariants
//! - Every mutating call runs in exactly one store transaction.
//! - Values are bound as parameters; only validated identifiers are spliced.
//! - Single-row lookups report `NotFound`; read-many calls may return empty.
//! - Updating or deleting an id that matches no row is a successful no-op.

use crate::db::{DbError, Store};
use crate::error::{OrmError, OrmResult};
use crate::mapper::{RowMapper, RowValues};
use crate::schema::ddl::{select_sql, sql_placeholders};
use crate::schema::ID_COLUMN;
use log::{debug, warn};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Params};
use std::collections::HashSet;
use std::sync::Arc;

/// Upper bound of `?` placeholders per `IN (...)` statement.
const MAX_IDS_PER_STATEMENT: usize = 500;

/// CRUD contract for one entity type.
pub trait Dao<T>: Send + Sync {
    /// Returns the row with `id`, or `NotFound`.
    fn get_by_id(&self, id: i64) -> OrmResult<T>;
    /// Returns the rows whose id is in `ids`, in store order.
    fn get_by_ids(&self, ids: &[i64]) -> OrmResult<Vec<T>>;
    /// Inserts `value`, writes the generated id back into it and returns it.
    fn create(&self, value: &mut T) -> OrmResult<i64>;
    fn update(&self, value: &T) -> OrmResult<()>;
    fn delete(&self, value: &T) -> OrmResult<()>;
    fn delete_by_id(&self, id: i64) -> OrmResult<()>;
    /// Removes every row of the table. Does not cascade.
    fn delete_all(&self) -> OrmResult<()>;
    fn find_all(&self) -> OrmResult<Vec<T>>;
    /// Runs caller-supplied parameterized SQL and decodes every row.
    ///
    /// An empty query or an empty parameter list returns an empty result
    /// without touching the store.
    fn query(&self, sql: &str, params: &[&str]) -> OrmResult<Vec<T>>;
}

/// Default [`Dao`] built from a registered table.
pub struct SqliteDao<T> {
    table: String,
    columns: Vec<String>,
    select_sql: String,
    mapper: Arc<dyn RowMapper<Entity = T>>,
    store: Store,
}

impl<T: Send + 'static> SqliteDao<T> {
    pub(crate) fn new(
        table: String,
        columns: Vec<String>,
        mapper: Arc<dyn RowMapper<Entity = T>>,
        store: Store,
    ) -> Self {
        let select_sql = select_sql(&table, &columns);
        Self {
            table,
            columns,
            select_sql,
            mapper,
            store,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    fn decode_all<P: Params>(
        &self,
        conn: &Connection,
        sql: &str,
        params: P,
    ) -> OrmResult<Vec<T>> {
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut values = Vec::new();
        while let Some(row) = rows.next()? {
            values.push(self.mapper.decode(row)?);
        }
        Ok(values)
    }

    fn ensure_declared(&self, values: &RowValues) -> OrmResult<()> {
        match values
            .columns()
            .find(|column| !self.columns.iter().any(|declared| declared.as_str() == *column))
        {
            Some(column) => Err(OrmError::UnknownColumn {
                table: self.table.clone(),
                column: column.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn insert_sql(&self, values: &RowValues) -> String {
        if values.is_empty() {
            return format!("INSERT INTO {} DEFAULT VALUES", self.table);
        }
        let columns = values.columns().collect::<Vec<_>>();
        let placeholders = (1..=columns.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            columns.join(", "),
            placeholders.join(", ")
        )
    }

    fn identifier_of(&self, value: &T) -> OrmResult<i64> {
        self.mapper.id(value).ok_or_else(|| OrmError::MissingIdentifier {
            table: self.table.clone(),
        })
    }
}

impl<T: Send + 'static> Dao<T> for SqliteDao<T> {
    fn get_by_id(&self, id: i64) -> OrmResult<T> {
        let sql = format!("{} WHERE {ID_COLUMN} = ?1", self.select_sql);
        let found = self.store.read(|conn| -> OrmResult<Option<T>> {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query([id])?;
            match rows.next()? {
                Some(row) => Ok(Some(self.mapper.decode(row)?)),
                None => Ok(None),
            }
        })?;

        found.ok_or_else(|| OrmError::NotFound {
            table: self.table.clone(),
            id,
        })
    }

    fn get_by_ids(&self, ids: &[i64]) -> OrmResult<Vec<T>> {
        let mut seen = HashSet::with_capacity(ids.len());
        let unique = ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect::<Vec<_>>();
        if unique.is_empty() {
            return Ok(Vec::new());
        }

        self.store.read(|conn| -> OrmResult<Vec<T>> {
            let mut values = Vec::with_capacity(unique.len());
            for chunk in unique.chunks(MAX_IDS_PER_STATEMENT) {
                let sql = format!(
                    "{} WHERE {ID_COLUMN} IN {}",
                    self.select_sql,
                    sql_placeholders(chunk.len())
                );
                values.extend(self.decode_all(conn, &sql, params_from_iter(chunk.iter()))?);
            }
            Ok(values)
        })
    }

    fn create(&self, value: &mut T) -> OrmResult<i64> {
        let values = self.mapper.encode(value);
        self.ensure_declared(&values)?;
        let sql = self.insert_sql(&values);

        let inserted = self.store.write(|tx| -> Result<i64, DbError> {
            tx.execute(&sql, params_from_iter(values.iter().map(|(_, value)| value)))?;
            Ok(tx.last_insert_rowid())
        });

        match inserted {
            Ok(id) => {
                self.mapper.set_id(value, id);
                debug!(
                    "event=dao_create module=dao status=ok table={} id={id}",
                    self.table
                );
                Ok(id)
            }
            Err(source) => {
                warn!(
                    "event=dao_create module=dao status=error table={} error_code=insert_failed error={source}",
                    self.table
                );
                Err(OrmError::InsertFailed {
                    table: self.table.clone(),
                    source,
                })
            }
        }
    }

    fn update(&self, value: &T) -> OrmResult<()> {
        let id = self.identifier_of(value)?;
        let values = self.mapper.encode(value);
        self.ensure_declared(&values)?;

        let id_value = Value::Integer(id);
        let mut assignments = Vec::new();
        let mut binds: Vec<&Value> = Vec::new();
        for (column, value) in values.iter().filter(|(column, _)| *column != ID_COLUMN) {
            binds.push(value);
            assignments.push(format!("{column} = ?{}", binds.len()));
        }
        if assignments.is_empty() {
            debug!(
                "event=dao_update module=dao status=skip table={} id={id} reason=no_columns",
                self.table
            );
            return Ok(());
        }

        binds.push(&id_value);
        let sql = format!(
            "UPDATE {} SET {} WHERE {ID_COLUMN} = ?{}",
            self.table,
            assignments.join(", "),
            binds.len()
        );

        let changed = self.store.write(|tx| -> OrmResult<usize> {
            Ok(tx.execute(&sql, params_from_iter(binds.iter()))?)
        })?;
        debug!(
            "event=dao_update module=dao status=ok table={} id={id} changed={changed}",
            self.table
        );
        Ok(())
    }

    fn delete(&self, value: &T) -> OrmResult<()> {
        let id = self.identifier_of(value)?;
        self.delete_by_id(id)
    }

    fn delete_by_id(&self, id: i64) -> OrmResult<()> {
        let sql = format!("DELETE FROM {} WHERE {ID_COLUMN} = ?1", self.table);
        let changed = self
            .store
            .write(|tx| -> OrmResult<usize> { Ok(tx.execute(&sql, [id])?) })?;
        debug!(
            "event=dao_delete module=dao status=ok table={} id={id} changed={changed}",
            self.table
        );
        Ok(())
    }

    fn delete_all(&self) -> OrmResult<()> {
        let sql = format!("DELETE FROM {}", self.table);
        let changed = self
            .store
            .write(|tx| -> OrmResult<usize> { Ok(tx.execute(&sql, [])?) })?;
        debug!(
            "event=dao_delete_all module=dao status=ok table={} changed={changed}",
            self.table
        );
        Ok(())
    }

    fn find_all(&self) -> OrmResult<Vec<T>> {
        self.store
            .read(|conn| self.decode_all(conn, &self.select_sql, []))
    }

    fn query(&self, sql: &str, params: &[&str]) -> OrmResult<Vec<T>> {
        if sql.trim().is_empty() || params.is_empty() {
            debug!(
                "event=dao_query module=dao status=skip table={} reason=empty_input",
                self.table
            );
            return Ok(Vec::new());
        }
        self.store
            .read(|conn| self.decode_all(conn, sql, params_from_iter(params.iter())))
    }
}
