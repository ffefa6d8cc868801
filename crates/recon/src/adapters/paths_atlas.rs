use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::{literal_in, scalar_text, RawFormat, SourceAdapter};
use crate::error::ItemError;
use crate::item::Item;
use crate::namespace::NamespaceTable;

const LEGACY_PREFIX: &str = "http://paths.uniroma1.it";
const CURRENT_PREFIX: &str = "https://atlas.paths-erc.eu";
const PLACE_PREFIXES: &[&str] = &[
    "http://paths.uniroma1.it/atlas/places/",
    "https://atlas.paths-erc.eu/places/",
];

const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
const SKOS_EXACT_MATCH: &str = "http://www.w3.org/2004/02/skos/core#exactMatch";

/// Pleiades name/location URIs collapse to their place.
fn pleiades_child() -> &'static Regex {
    static RX: OnceLock<Regex> = OnceLock::new();
    RX.get_or_init(|| {
        Regex::new(r"^(https://pleiades\.stoa\.org/places/\d+)/[a-z]+/?$").expect("valid pleiades regex")
    })
}

fn reduce_target(target: &str) -> String {
    let target = match pleiades_child().captures(target) {
        Some(caps) => caps[1].to_string(),
        None => target.to_string(),
    };
    target.trim_end_matches('/').to_string()
}

/// PAThs Atlas RDF/JSON export: an object keyed by subject URI.
pub struct PathsAtlasAdapter;

impl SourceAdapter for PathsAtlasAdapter {
    fn name(&self) -> &'static str {
        "paths_atlas"
    }

    fn format(&self) -> RawFormat {
        RawFormat::KeyedJson
    }

    fn accepts(&self, raw: &Value) -> bool {
        let id = scalar_text(raw.get("@id"));
        PLACE_PREFIXES.iter().any(|prefix| id.starts_with(prefix))
    }

    fn parse(&self, raw: &Value, _namespaces: &NamespaceTable) -> Result<Item, ItemError> {
        let id = scalar_text(raw.get("@id"));
        let uri = match id.strip_prefix(LEGACY_PREFIX) {
            Some(rest) => format!("{CURRENT_PREFIX}{rest}"),
            None => id,
        };
        let label = literal_in(raw.get(RDFS_LABEL), "value", "lang", "en")
            .ok_or_else(|| ItemError::malformed(format!("{uri}: no English rdfs:label")))?;
        let mut item = Item::new(uri, label);

        let targets: BTreeSet<String> = raw
            .get(SKOS_EXACT_MATCH)
            .and_then(Value::as_array)
            .map(|matches| {
                matches
                    .iter()
                    .map(|m| scalar_text(m.get("value")))
                    .filter(|v| !v.is_empty())
                    .map(|v| reduce_target(&v))
                    .collect()
            })
            .unwrap_or_default();
        for target in targets {
            item.add_link("exactMatch", &target);
        }
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn place() -> Value {
        json!({
            "@id": "http://paths.uniroma1.it/atlas/places/42",
            RDFS_LABEL: [
                {"value": "Panopolis", "lang": "en"},
                {"value": "Akhmim", "lang": "ar"}
            ],
            SKOS_EXACT_MATCH: [
                {"value": "https://pleiades.stoa.org/places/776368/akhmim", "type": "uri"},
                {"value": "https://pleiades.stoa.org/places/776368/", "type": "uri"},
                {"value": "https://www.trismegistos.org/place/39", "type": "uri"}
            ]
        })
    }

    #[test]
    fn rewrites_legacy_host_and_reduces_links() {
        let item = PathsAtlasAdapter.parse(&place(), &NamespaceTable::default()).unwrap();
        assert_eq!(item.uri, "https://atlas.paths-erc.eu/atlas/places/42");
        assert_eq!(item.label, "Panopolis");
        assert_eq!(
            item.canonical_uris("pleiades.stoa.org"),
            vec!["https://pleiades.stoa.org/places/776368".to_string()]
        );
        assert_eq!(item.links_for("pleiades.stoa.org").len(), 1);
        assert_eq!(item.links_for("www.trismegistos.org")[0].relation, "exactMatch");
    }

    #[test]
    fn accepts_only_places() {
        assert!(PathsAtlasAdapter.accepts(&place()));
        assert!(PathsAtlasAdapter.accepts(&json!({"@id": "https://atlas.paths-erc.eu/places/1"})));
        assert!(!PathsAtlasAdapter.accepts(&json!({"@id": "https://atlas.paths-erc.eu/sites/1"})));
    }

    #[test]
    fn unlabelled_place_is_malformed() {
        let raw = json!({"@id": "https://atlas.paths-erc.eu/places/1"});
        assert!(PathsAtlasAdapter.parse(&raw, &NamespaceTable::default()).is_err());
    }
}
