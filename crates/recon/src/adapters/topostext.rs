use serde_json::Value;

use super::{field, link_pleiades, required, RawFormat, SourceAdapter};
use crate::error::ItemError;
use crate::item::Item;
use crate::namespace::NamespaceTable;

/// ToposText places (CSV).
pub struct ToposTextAdapter;

impl SourceAdapter for ToposTextAdapter {
    fn name(&self) -> &'static str {
        "topostext"
    }

    fn format(&self) -> RawFormat {
        RawFormat::Csv
    }

    fn parse(&self, raw: &Value, namespaces: &NamespaceTable) -> Result<Item, ItemError> {
        let label = required(raw, "TITLE")?;
        let id = required(raw, "TTID")?;
        let mut item = Item::new(format!("https://topostext.org/place/{id}"), label);
        item.set_summary(field(raw, "SHORTDESC"));
        link_pleiades(&mut item, namespaces, &field(raw, "PLEIADES"))?;
        Ok(item)
    }
}
