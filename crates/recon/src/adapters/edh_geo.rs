use serde_json::Value;

use super::{field, required, RawFormat, SourceAdapter};
use crate::error::ItemError;
use crate::item::Item;
use crate::namespace::NamespaceTable;

/// Link columns; the namespace is the column name up to the first `_`.
const LINK_COLUMNS: &[&str] = &[
    "pleiades_id_1",
    "pleiades_id_2",
    "geonames_id_1",
    "geonames_id_2",
    "trismegistos_geo_id",
];

/// Epigraphic Database Heidelberg geography export (CSV).
pub struct EdhGeoAdapter;

impl SourceAdapter for EdhGeoAdapter {
    fn name(&self) -> &'static str {
        "edhgeo"
    }

    fn format(&self) -> RawFormat {
        RawFormat::Csv
    }

    fn parse(&self, raw: &Value, namespaces: &NamespaceTable) -> Result<Item, ItemError> {
        let ancient = field(raw, "fo_antik");
        let mut label = if ancient.is_empty() { field(raw, "fo_modern") } else { ancient };
        if label.is_empty() {
            return Err(ItemError::malformed("neither fo_antik nor fo_modern is set"));
        }
        let findspot = field(raw, "fundstelle");
        if !findspot.is_empty() {
            label.push_str(&format!(" ({findspot})"));
        }

        let id = required(raw, "id")?;
        let base = namespaces
            .resolve("edhgeo")?
            .ok_or_else(|| ItemError::malformed("edhgeo namespace is marked unsupported"))?;
        let mut item = Item::new(format!("{base}{id}"), label);

        for column in LINK_COLUMNS {
            let value = field(raw, column);
            if value.is_empty() {
                continue;
            }
            let abbrev = column.split('_').next().unwrap_or(column);
            if let Some(base) = namespaces.resolve(abbrev)? {
                item.add_link("closeMatch", &format!("{base}{value}"));
            }
        }
        Ok(item)
    }
}
