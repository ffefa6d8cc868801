use std::collections::BTreeSet;

use serde_json::Value;
use url::Url;

use super::{literal_in, scalar_text, RawFormat, SourceAdapter};
use crate::error::ItemError;
use crate::item::Item;
use crate::namespace::NamespaceTable;
use crate::text::norm;

/// Nomisma.org JSON-LD dump. Only `nmo:Mint` nodes are places.
pub struct NomismaAdapter;

fn has_type(raw: &Value, wanted: &str) -> bool {
    match raw.get("@type") {
        Some(Value::String(t)) => t == wanted,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(wanted)),
        _ => false,
    }
}

fn close_match_ids(raw: &Value) -> Vec<String> {
    match raw.get("skos:closeMatch") {
        Some(Value::Array(matches)) => matches.iter().map(|m| scalar_text(m.get("@id"))).collect(),
        Some(m @ Value::Object(_)) => vec![scalar_text(m.get("@id"))],
        Some(Value::String(s)) => vec![norm(s)],
        _ => Vec::new(),
    }
}

fn is_web_url(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

impl SourceAdapter for NomismaAdapter {
    fn name(&self) -> &'static str {
        "nomisma"
    }

    fn format(&self) -> RawFormat {
        RawFormat::Jsonld
    }

    fn accepts(&self, raw: &Value) -> bool {
        if raw.get("@type").is_none() {
            log::error!("nomisma node without @type: {}", scalar_text(raw.get("@id")));
            return false;
        }
        has_type(raw, "nmo:Mint")
    }

    fn parse(&self, raw: &Value, namespaces: &NamespaceTable) -> Result<Item, ItemError> {
        let id = scalar_text(raw.get("@id"));
        if id.is_empty() {
            return Err(ItemError::malformed("node has no @id"));
        }
        let label = literal_in(raw.get("skos:prefLabel"), "@value", "@language", "en")
            .ok_or_else(|| ItemError::malformed(format!("{id}: no English skos:prefLabel")))?;
        let uri = namespaces
            .expand_curie(&id)?
            .ok_or_else(|| ItemError::malformed(format!("{id}: prefix is marked unsupported")))?;

        let mut item = Item::new(uri, label);
        match literal_in(raw.get("skos:definition"), "@value", "@language", "en") {
            Some(definition) => item.set_summary(definition),
            None => log::warn!("no skos:definition for {id}"),
        }

        let matches: BTreeSet<String> = close_match_ids(raw)
            .into_iter()
            .filter(|m| is_web_url(m))
            .collect();
        if matches.is_empty() {
            log::debug!("no usable skos:closeMatch for {id}");
        }
        for target in matches {
            item.add_link("closeMatch", &target);
        }
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mint() -> Value {
        json!({
            "@id": "nm:athens",
            "@type": ["nmo:Mint", "skos:Concept"],
            "skos:prefLabel": [
                {"@value": "Athen", "@language": "de"},
                {"@value": "Athens", "@language": "en"}
            ],
            "skos:definition": {"@value": "The  mint at Athens", "@language": "en"},
            "skos:closeMatch": [
                {"@id": "http://pleiades.stoa.org/places/579885"},
                {"@id": "http://www.wikidata.org/entity/Q1524"},
                {"@id": "not a uri"}
            ]
        })
    }

    #[test]
    fn parses_mint() {
        let item = NomismaAdapter.parse(&mint(), &NamespaceTable::default()).unwrap();
        assert_eq!(item.uri, "http://nomisma.org/id/athens");
        assert_eq!(item.label, "Athens");
        assert_eq!(item.summary.as_deref(), Some("The mint at Athens"));
        assert_eq!(item.links_for("pleiades.stoa.org").len(), 1);
        assert_eq!(item.links_for("www.wikidata.org").len(), 1);
        assert_eq!(item.links.len(), 2);
    }

    #[test]
    fn accepts_only_mints() {
        assert!(NomismaAdapter.accepts(&mint()));
        assert!(!NomismaAdapter.accepts(&json!({"@id": "nm:x", "@type": "nmo:Region"})));
        assert!(!NomismaAdapter.accepts(&json!({"@id": "nm:x"})));
    }

    #[test]
    fn single_close_match_object() {
        let mut raw = mint();
        raw["skos:closeMatch"] = json!({"@id": "https://pleiades.stoa.org/places/1"});
        raw["skos:prefLabel"] = json!({"@value": "Solo", "@language": "en"});
        let item = NomismaAdapter.parse(&raw, &NamespaceTable::default()).unwrap();
        assert_eq!(item.label, "Solo");
        assert_eq!(item.links.len(), 1);
    }

    #[test]
    fn unknown_prefix_is_unknown_namespace() {
        let mut raw = mint();
        raw["@id"] = json!("zz:athens");
        let err = NomismaAdapter.parse(&raw, &NamespaceTable::default()).unwrap_err();
        assert_eq!(err, ItemError::UnknownNamespace("zz".into()));
    }

    #[test]
    fn missing_definition_is_tolerated() {
        let mut raw = mint();
        raw.as_object_mut().unwrap().remove("skos:definition");
        let item = NomismaAdapter.parse(&raw, &NamespaceTable::default()).unwrap();
        assert_eq!(item.summary, None);
    }
}
