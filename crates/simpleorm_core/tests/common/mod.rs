#![allow(dead_code)]

use rusqlite::Row;
use simpleorm_core::{
    open_store_in_memory, ColumnDescriptor, DataType, OrmResult, Registry, RowMapper, RowValues,
    Store, TableDescriptor,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: Option<i64>,
    pub label: String,
}

impl Item {
    pub fn new(label: &str) -> Self {
        Self {
            id: None,
            label: label.to_string(),
        }
    }
}

pub struct ItemMapper;

impl RowMapper for ItemMapper {
    type Entity = Item;

    fn decode(&self, row: &Row<'_>) -> OrmResult<Item> {
        Ok(Item {
            id: Some(row.get("id")?),
            label: row.get("label")?,
        })
    }

    fn encode(&self, value: &Item) -> RowValues {
        let mut values = RowValues::new();
        if let Some(id) = value.id {
            values.put("id", id);
        }
        values.put("label", value.label.clone());
        values
    }

    fn id(&self, value: &Item) -> Option<i64> {
        value.id
    }

    fn set_id(&self, value: &mut Item, id: i64) {
        value.id = Some(id);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: Option<i64>,
    pub name: String,
}

pub struct TagMapper;

impl RowMapper for TagMapper {
    type Entity = Tag;

    fn decode(&self, row: &Row<'_>) -> OrmResult<Tag> {
        Ok(Tag {
            id: Some(row.get("id")?),
            name: row.get("name")?,
        })
    }

    fn encode(&self, value: &Tag) -> RowValues {
        let values = RowValues::new().with("name", value.name.clone());
        match value.id {
            Some(id) => values.with("id", id),
            None => values,
        }
    }

    fn id(&self, value: &Tag) -> Option<i64> {
        value.id
    }

    fn set_id(&self, value: &mut Tag, id: i64) {
        value.id = Some(id);
    }
}

pub fn item_table() -> TableDescriptor {
    TableDescriptor::new("items")
        .column(ColumnDescriptor::primary_key())
        .column(ColumnDescriptor::new("label", DataType::Text))
        .mapper(ItemMapper)
}

pub fn tag_table() -> TableDescriptor {
    TableDescriptor::new("tags")
        .column(ColumnDescriptor::primary_key())
        .column(ColumnDescriptor::new("name", DataType::Text).with_properties("NOT NULL UNIQUE"))
        .mapper(TagMapper)
}

/// In-memory store with `items` and `tags` registered.
pub fn registered() -> (Registry, Store) {
    let store = open_store_in_memory().unwrap();
    let registry = Registry::new();
    registry
        .register(store.clone(), vec![item_table(), tag_table()])
        .unwrap();
    (registry, store)
}

pub fn table_exists(store: &Store, table_name: &str) -> bool {
    store
        .read(|conn| {
            conn.query_row(
                "SELECT EXISTS(
                    SELECT 1
                    FROM sqlite_master
                    WHERE type = 'table' AND name = ?1
                );",
                [table_name],
                |row| row.get::<_, i64>(0),
            )
            .map_err(simpleorm_core::DbError::from)
        })
        .unwrap()
        == 1
}
