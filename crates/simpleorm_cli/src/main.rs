//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `simpleorm_core` linkage end to end against an in-memory store.
//! - Keep output deterministic for quick local sanity checks.

use simpleorm_core::{
    default_log_level, init_logging, open_store_in_memory, ColumnDescriptor, DataType, OrmResult,
    Registry, Row, RowMapper, RowValues, TableDescriptor,
};
use std::error::Error;

#[derive(Debug)]
struct Item {
    id: Option<i64>,
    label: String,
}

struct ItemMapper;

impl RowMapper for ItemMapper {
    type Entity = Item;

    fn decode(&self, row: &Row<'_>) -> OrmResult<Item> {
        Ok(Item {
            id: Some(row.get("id")?),
            label: row.get("label")?,
        })
    }

    fn encode(&self, value: &Item) -> RowValues {
        let values = RowValues::new().with("label", value.label.clone());
        match value.id {
            Some(id) => values.with("id", id),
            None => values,
        }
    }

    fn id(&self, value: &Item) -> Option<i64> {
        value.id
    }

    fn set_id(&self, value: &mut Item, id: i64) {
        value.id = Some(id);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    if let Ok(log_dir) = std::env::var("SIMPLEORM_LOG_DIR") {
        init_logging(default_log_level(), &log_dir)?;
    }
    println!("simpleorm_core version={}", simpleorm_core::core_version());

    let registry = Registry::global();
    registry.register(
        open_store_in_memory()?,
        vec![TableDescriptor::new("items")
            .column(ColumnDescriptor::primary_key())
            .column(ColumnDescriptor::new("label", DataType::Text))
            .mapper(ItemMapper)],
    )?;

    let dao = registry.dao::<Item>()?;
    let mut first = Item {
        id: None,
        label: "a".to_string(),
    };
    let mut second = Item {
        id: None,
        label: "b".to_string(),
    };
    let first_id = dao.create(&mut first)?;
    dao.create(&mut second)?;
    println!("items after create={}", dao.find_all()?.len());
    println!("item {first_id} label={}", dao.get_by_id(first_id)?.label);

    dao.delete(&first)?;
    let remaining = dao.find_all()?;
    println!(
        "items after delete={} remaining={:?}",
        remaining.len(),
        remaining.iter().map(|item| item.label.as_str()).collect::<Vec<_>>()
    );
    Ok(())
}
