//! Registration front door and DAO cache.
//!
//! # Responsibility
//! - Bind one store and the set of managed tables exactly once.
//! - Create each managed table once and record its column layout.
//! - Hand out one cached DAO per entity type.
//!
//! # Invariants
//! - State moves `Unregistered -> Registered` only; a second registration is
//!   rejected with `AlreadyRegistered` and the first stays active.
//! - Every descriptor is validated before any DDL reaches the store.
//! - All `CREATE TABLE` statements of one registration share a transaction.

use crate::dao::{Dao, SqliteDao};
use crate::db::{DbError, Store};
use crate::error::{OrmError, OrmResult};
use crate::schema::{
    build_create_table, validate_descriptor, MapperBinding, SchemaRegistry, TableDescriptor,
    ValidationError,
};
use log::{error, info, warn};
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::any::{type_name, Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

static GLOBAL_REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// Owner of the store handle, schema registry and DAO cache.
///
/// Use [`Registry::global`] for the process-wide instance or
/// [`Registry::new`] for an isolated one.
#[derive(Default)]
pub struct Registry {
    state: RwLock<Option<Arc<Registration>>>,
    daos: Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

struct Registration {
    store: Store,
    schema: SchemaRegistry,
    entities: HashMap<TypeId, EntityTable>,
}

struct EntityTable {
    table: String,
    binding: MapperBinding,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry.
    pub fn global() -> &'static Registry {
        &GLOBAL_REGISTRY
    }

    /// Binds `store` and creates every table in `tables`.
    ///
    /// # Errors
    /// - `AlreadyRegistered` when this registry is already bound.
    /// - `Validation`, `DuplicateTable` or `DuplicateEntity` for bad input;
    ///   nothing is created and the registry stays unbound.
    /// - `SchemaMismatch` when a table already in the store lacks a declared
    ///   column.
    /// - `Db` when table creation fails; the transaction is rolled back and
    ///   the registry stays unbound.
    ///
    /// # Side effects
    /// - Tables already present in the store are left untouched once their
    ///   columns cover the descriptor.
    /// - Emits `registry_register` logging events.
    pub fn register(&self, store: Store, tables: Vec<TableDescriptor>) -> OrmResult<()> {
        let started_at = Instant::now();
        let mut state = self.state.write().map_err(|_| DbError::LockPoisoned)?;
        if state.is_some() {
            warn!("event=registry_register module=registry status=error error_code=already_registered");
            return Err(OrmError::AlreadyRegistered);
        }
        info!(
            "event=registry_register module=registry status=start tables={}",
            tables.len()
        );

        let registration = build_registration(store, &tables)
            .and_then(|registration| {
                create_tables(&registration.store, &tables)?;
                Ok(registration)
            })
            .map_err(|err| {
                error!(
                    "event=registry_register module=registry status=error duration_ms={} error_code=register_failed error={err}",
                    started_at.elapsed().as_millis()
                );
                err
            })?;

        *state = Some(Arc::new(registration));
        info!(
            "event=registry_register module=registry status=ok tables={} duration_ms={}",
            tables.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    pub fn is_registered(&self) -> OrmResult<bool> {
        let state = self.state.read().map_err(|_| DbError::LockPoisoned)?;
        Ok(state.is_some())
    }

    /// Returns the bound store handle.
    pub fn store(&self) -> OrmResult<Store> {
        Ok(self.registration()?.store.clone())
    }

    /// Column names of `table_name` in declaration order.
    pub fn columns_for(&self, table_name: &str) -> OrmResult<Vec<String>> {
        let registration = self.registration()?;
        Ok(registration.schema.columns_for(table_name)?.to_vec())
    }

    /// Registered table names, sorted.
    pub fn tables(&self) -> OrmResult<Vec<String>> {
        Ok(self.registration()?.schema.table_names())
    }

    /// Returns the DAO for `T`, building and caching the default one on
    /// first request.
    pub fn dao<T: Send + 'static>(&self) -> OrmResult<Arc<dyn Dao<T>>> {
        let key = TypeId::of::<T>();
        let mut daos = self.daos.lock().map_err(|_| DbError::LockPoisoned)?;
        if let Some(cached) = daos
            .get(&key)
            .and_then(|handle| handle.downcast_ref::<Arc<dyn Dao<T>>>())
        {
            return Ok(Arc::clone(cached));
        }

        let registration = self.registration()?;
        let entity = registration
            .entities
            .get(&key)
            .ok_or(OrmError::UnknownEntity(type_name::<T>()))?;
        let mapper = entity
            .binding
            .mapper::<T>()
            .ok_or(OrmError::UnknownEntity(type_name::<T>()))?;
        let columns = registration.schema.columns_for(&entity.table)?.to_vec();

        let dao: Arc<dyn Dao<T>> = Arc::new(SqliteDao::new(
            entity.table.clone(),
            columns,
            mapper,
            registration.store.clone(),
        ));
        daos.insert(key, Arc::new(Arc::clone(&dao)));
        Ok(dao)
    }

    /// Installs a caller-provided DAO for `T`, replacing any cached one.
    pub fn register_dao<T: Send + 'static>(&self, dao: Arc<dyn Dao<T>>) -> OrmResult<()> {
        let mut daos = self.daos.lock().map_err(|_| DbError::LockPoisoned)?;
        daos.insert(TypeId::of::<T>(), Arc::new(dao));
        Ok(())
    }

    fn registration(&self) -> OrmResult<Arc<Registration>> {
        let state = self.state.read().map_err(|_| DbError::LockPoisoned)?;
        state.as_ref().cloned().ok_or(OrmError::NotRegistered)
    }
}

fn build_registration(store: Store, tables: &[TableDescriptor]) -> OrmResult<Registration> {
    let mut schema = SchemaRegistry::new();
    let mut entities = HashMap::with_capacity(tables.len());

    for table in tables {
        validate_descriptor(table)?;
        let binding = table
            .binding()
            .cloned()
            .ok_or_else(|| ValidationError::MissingRowMapper {
                table: table.table_name().to_string(),
            })?;
        if entities.contains_key(&binding.entity()) {
            return Err(OrmError::DuplicateEntity(binding.entity_name()));
        }

        schema.register(table.table_name(), table.column_names())?;
        entities.insert(
            binding.entity(),
            EntityTable {
                table: table.table_name().to_string(),
                binding,
            },
        );
    }

    Ok(Registration {
        store,
        schema,
        entities,
    })
}

fn create_tables(store: &Store, tables: &[TableDescriptor]) -> OrmResult<()> {
    store.write(|tx| -> OrmResult<()> {
        for table in tables {
            if table_exists(tx, table.table_name())? {
                ensure_existing_columns(tx, table)?;
                info!(
                    "event=table_create module=registry status=skip table={} reason=exists",
                    table.table_name()
                );
                continue;
            }
            tx.execute_batch(&build_create_table(table))?;
            info!(
                "event=table_create module=registry status=ok table={}",
                table.table_name()
            );
        }
        Ok(())
    })
}

fn table_exists(conn: &Connection, table_name: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1 COLLATE NOCASE
        );",
        [table_name],
        |row| row.get(0),
    )
}

fn ensure_existing_columns(conn: &Connection, table: &TableDescriptor) -> OrmResult<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let existing = stmt
        .query_map([table.table_name()], |row| row.get::<_, String>(0))?
        .map(|name| name.map(|name| name.to_ascii_lowercase()))
        .collect::<rusqlite::Result<HashSet<_>>>()?;

    match table
        .columns()
        .iter()
        .find(|column| !existing.contains(&column.name.to_ascii_lowercase()))
    {
        Some(column) => {
            error!(
                "event=table_create module=registry status=error table={} error_code=schema_mismatch column={}",
                table.table_name(),
                column.name
            );
            Err(OrmError::SchemaMismatch {
                table: table.table_name().to_string(),
                column: column.name.clone(),
            })
        }
        None => Ok(()),
    }
}
