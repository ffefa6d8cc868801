use std::collections::BTreeSet;

use serde_json::Value;

use super::{field, scalar_text, RawFormat, SourceAdapter};
use crate::error::ItemError;
use crate::item::Item;
use crate::namespace::NamespaceTable;

/// Itiner-e route segments (NDJSON export). Each segment lists the
/// Pleiades places it passes through.
pub struct ItinereAdapter;

impl SourceAdapter for ItinereAdapter {
    fn name(&self) -> &'static str {
        "itinere"
    }

    fn format(&self) -> RawFormat {
        RawFormat::Ndjson
    }

    fn parse(&self, raw: &Value, namespaces: &NamespaceTable) -> Result<Item, ItemError> {
        let id = field(raw, "id");
        if id.is_empty() {
            return Err(ItemError::malformed("missing segment 'id'"));
        }
        let name = scalar_text(raw.pointer("/properties/name"));
        if name.is_empty() {
            return Err(ItemError::malformed(format!("segment {id} has no properties.name")));
        }
        let base = namespaces
            .resolve("itinere")?
            .ok_or_else(|| ItemError::malformed("itinere namespace is marked unsupported"))?;

        let mut item = Item::new(format!("{base}{id}"), format!("{id} {name}"));

        let places: BTreeSet<String> = raw
            .get("pleiadesPlaces")
            .and_then(Value::as_array)
            .map(|places| {
                places
                    .iter()
                    .map(|p| scalar_text(p.pointer("/properties/url")))
                    .filter(|url| !url.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        for url in places {
            item.add_link("relatedMatch", &url);
        }
        Ok(item)
    }
}
