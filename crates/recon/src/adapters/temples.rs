use serde_json::Value;

use super::{field, link_pleiades, required, RawFormat, SourceAdapter};
use crate::error::ItemError;
use crate::item::Item;
use crate::namespace::NamespaceTable;

/// Rome Research Group classical temples (CSV).
pub struct ClassicalTemplesAdapter;

impl SourceAdapter for ClassicalTemplesAdapter {
    fn name(&self) -> &'static str {
        "classical_temples"
    }

    fn format(&self) -> RawFormat {
        RawFormat::Csv
    }

    fn parse(&self, raw: &Value, namespaces: &NamespaceTable) -> Result<Item, ItemError> {
        let label = required(raw, "name")?;
        let id = required(raw, "id")?;
        let mut item = Item::new(format!("https://romeresearchgroup.org/items/{id}"), label);

        let summary: Vec<String> = ["location", "modernplace"]
            .iter()
            .map(|key| field(raw, key))
            .filter(|part| !part.is_empty())
            .collect();
        item.set_summary(summary.join(", "));

        link_pleiades(&mut item, namespaces, &field(raw, "pleiades"))?;
        Ok(item)
    }
}
