use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::{field, required, RawFormat, SourceAdapter};
use crate::error::ItemError;
use crate::item::Item;
use crate::namespace::NamespaceTable;

/// SPARQL result export column -> namespace abbreviation.
const LINK_COLUMNS: &[(&str, &str)] = &[
    ("pleiades", "pleiades"),
    ("chronique_ids", "cfl/ado"),
    ("dare_ids", "dare"),
    ("geonames_ids", "geonames"),
    ("gettytgn_ids", "gettytgn"),
    ("idaigaz_ids", "idaigaz"),
    ("loc_ids", "loc"),
    ("manto_ids", "manto"),
    ("nomisma_ids", "nomisma"),
    ("topostext_ids", "topostext"),
    ("trismegistos_ids", "trismegistos"),
    ("viaf_ids", "viaf"),
    ("vici_ids", "vici"),
    ("wikipedia_en", "wikipedia"),
];

fn delimiter() -> &'static Regex {
    static RX: OnceLock<Regex> = OnceLock::new();
    RX.get_or_init(|| Regex::new(r"[,;]\s*").expect("valid delimiter regex"))
}

/// Wikidata SPARQL export (CSV): one row per entity, external ids in
/// `*_ids` columns, several ids per cell separated by `,` or `;`.
pub struct WikidataAdapter;

impl SourceAdapter for WikidataAdapter {
    fn name(&self) -> &'static str {
        "wikidata"
    }

    fn format(&self) -> RawFormat {
        RawFormat::Csv
    }

    fn parse(&self, raw: &Value, namespaces: &NamespaceTable) -> Result<Item, ItemError> {
        let uri = required(raw, "item")?;
        let label = required(raw, "itemLabel")?;
        let mut item = Item::new(uri, label);

        for (column, abbrev) in LINK_COLUMNS {
            let cell = field(raw, column);
            if cell.is_empty() {
                continue;
            }
            let Some(base) = namespaces.resolve(abbrev)? else {
                continue;
            };
            for id in delimiter().split(&cell).map(str::trim).filter(|id| !id.is_empty()) {
                item.add_link("closeMatch", &format!("{base}{id}"));
            }
        }
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_sparql_row() {
        let raw = json!({
            "pleiades": "266040",
            "item": "http://www.wikidata.org/entity/Q5685282",
            "itemLabel": "Sierra Elvira",
            "geonames_ids": "2510769; 2510770",
            "dare_ids": "12345",
        });
        let item = WikidataAdapter.parse(&raw, &NamespaceTable::default()).unwrap();
        assert_eq!(item.label, "Sierra Elvira");
        assert_eq!(item.uri, "http://www.wikidata.org/entity/Q5685282");
        assert_eq!(
            item.canonical_uris("pleiades.stoa.org"),
            vec!["https://pleiades.stoa.org/places/266040".to_string()]
        );
        assert_eq!(item.links_for("www.geonames.org").len(), 2);
        // dare is known unsupported
        assert_eq!(item.links.len(), 2);
    }

    #[test]
    fn missing_item_is_malformed() {
        let raw = json!({"itemLabel": "Nowhere"});
        let err = WikidataAdapter.parse(&raw, &NamespaceTable::default()).unwrap_err();
        assert!(matches!(err, ItemError::MalformedRecord { .. }));
    }

    #[test]
    fn unsupported_pleiades_drops_link() {
        use std::collections::BTreeMap;
        use crate::namespace::NamespaceEntry;

        let raw = json!({
            "item": "http://www.wikidata.org/entity/Q1",
            "itemLabel": "One",
            "pleiades": "1",
        });
        let mut overrides = BTreeMap::new();
        overrides.insert("pleiades".to_string(), NamespaceEntry::Unsupported);
        let table = NamespaceTable::with_overrides(&overrides);
        let item = WikidataAdapter.parse(&raw, &table).unwrap();
        assert!(item.links.is_empty());
    }
}
