use serde_json::Value;

use super::{link_pleiades, scalar_text, RawFormat, SourceAdapter};
use crate::error::ItemError;
use crate::item::Item;
use crate::namespace::NamespaceTable;

/// World Historical Gazetteer GeoJSON export.
pub struct WhgAdapter;

fn property(raw: &Value, key: &str) -> String {
    scalar_text(raw.get("properties").and_then(|p| p.get(key)))
}

impl SourceAdapter for WhgAdapter {
    fn name(&self) -> &'static str {
        "whg"
    }

    fn format(&self) -> RawFormat {
        RawFormat::Geojson
    }

    fn parse(&self, raw: &Value, namespaces: &NamespaceTable) -> Result<Item, ItemError> {
        let label = property(raw, "title");
        if label.is_empty() {
            return Err(ItemError::malformed("feature has no properties.title"));
        }
        let pid = property(raw, "pid");
        let uri = if pid.is_empty() { property(raw, "id") } else { pid };
        if uri.is_empty() {
            return Err(ItemError::malformed(format!("{label}: neither properties.pid nor properties.id")));
        }
        let mut item = Item::new(uri, label);
        item.set_summary(property(raw, "description"));
        link_pleiades(&mut item, namespaces, &property(raw, "pleiades_id"))?;
        Ok(item)
    }
}
