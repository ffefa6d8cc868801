use serde_json::Value;

use super::{field, link_pleiades, required, RawFormat, SourceAdapter};
use crate::error::ItemError;
use crate::item::Item;
use crate::namespace::NamespaceTable;
use crate::text::capitalize_first;

const MANTO_BASE: &str = "https://resource.manto.unh.edu/";

/// MANTO mythological places (CSV).
pub struct MantoAdapter;

impl SourceAdapter for MantoAdapter {
    fn name(&self) -> &'static str {
        "manto"
    }

    fn format(&self) -> RawFormat {
        RawFormat::Csv
    }

    fn parse(&self, raw: &Value, namespaces: &NamespaceTable) -> Result<Item, ItemError> {
        let label = required(raw, "Name")?;
        let id = required(raw, "Object ID")?;
        let mut item = Item::new(format!("{MANTO_BASE}{id}"), label);
        item.set_summary(capitalize_first(&field(raw, "Information")));
        link_pleiades(&mut item, namespaces, &field(raw, "Pleiades"))?;
        Ok(item)
    }
}
