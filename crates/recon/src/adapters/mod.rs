//! Source adapters: one per external gazetteer.
//!
//! Each adapter turns one raw record (a CSV row as a JSON object of
//! strings, an NDJSON object, a JSON-LD node, a GeoJSON feature, ...) into
//! an [`Item`]. Adapters only know their own field mapping; validation,
//! merging, and indexing are shared (see [`crate::engine::build_index`]).

mod ancient_ports;
mod cfl_ago;
mod edh_geo;
mod itinere;
mod manto;
mod nomisma;
mod paths_atlas;
mod temples;
mod topostext;
mod whg;
mod wikidata;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ItemError;
use crate::item::Item;
use crate::namespace::NamespaceTable;
use crate::text::norm;

pub use ancient_ports::AncientPortsAdapter;
pub use cfl_ago::CflAgoAdapter;
pub use edh_geo::EdhGeoAdapter;
pub use itinere::ItinereAdapter;
pub use manto::MantoAdapter;
pub use nomisma::NomismaAdapter;
pub use paths_atlas::PathsAtlasAdapter;
pub use temples::ClassicalTemplesAdapter;
pub use topostext::ToposTextAdapter;
pub use whg::WhgAdapter;
pub use wikidata::WikidataAdapter;

/// On-disk shape of a source's raw data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawFormat {
    /// Comma-separated (delimiter sniffed), one record per row.
    Csv,
    /// Tab-separated, one record per row.
    Tsv,
    /// One JSON object per line.
    Ndjson,
    /// A JSON array of records.
    Json,
    /// JSON-LD document; records are the `@graph` nodes.
    Jsonld,
    /// GeoJSON FeatureCollection; records are the features.
    Geojson,
    /// Linked Places FeatureCollection; records are the features.
    Lpf,
    /// JSON object keyed by record URI; the key is injected as `@id`.
    KeyedJson,
}

impl fmt::Display for RawFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Tsv => write!(f, "tsv"),
            Self::Ndjson => write!(f, "ndjson"),
            Self::Json => write!(f, "json"),
            Self::Jsonld => write!(f, "jsonld"),
            Self::Geojson => write!(f, "geojson"),
            Self::Lpf => write!(f, "lpf"),
            Self::KeyedJson => write!(f, "keyed_json"),
        }
    }
}

pub trait SourceAdapter {
    /// Registry key.
    fn name(&self) -> &'static str;

    /// Native raw format, used when the configuration does not say.
    fn format(&self) -> RawFormat;

    /// Records the source exports but that are not places for this
    /// adapter (skipped silently).
    fn accepts(&self, _raw: &Value) -> bool {
        true
    }

    fn parse(&self, raw: &Value, namespaces: &NamespaceTable) -> Result<Item, ItemError>;
}

pub struct AdapterRegistry {
    adapters: BTreeMap<&'static str, Box<dyn SourceAdapter>>,
}

impl AdapterRegistry {
    pub fn empty() -> Self {
        Self { adapters: BTreeMap::new() }
    }

    /// Every adapter shipped with the crate.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(AncientPortsAdapter));
        registry.register(Box::new(CflAgoAdapter));
        registry.register(Box::new(ClassicalTemplesAdapter));
        registry.register(Box::new(EdhGeoAdapter));
        registry.register(Box::new(ItinereAdapter));
        registry.register(Box::new(MantoAdapter));
        registry.register(Box::new(NomismaAdapter));
        registry.register(Box::new(PathsAtlasAdapter));
        registry.register(Box::new(ToposTextAdapter));
        registry.register(Box::new(WhgAdapter));
        registry.register(Box::new(WikidataAdapter));
        registry
    }

    pub fn register(&mut self, adapter: Box<dyn SourceAdapter>) {
        self.adapters.insert(adapter.name(), adapter);
    }

    pub fn get(&self, name: &str) -> Option<&dyn SourceAdapter> {
        self.adapters.get(name).map(|a| a.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.adapters.keys().copied()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

// ---------------------------------------------------------------------------
// Field helpers shared by adapters
// ---------------------------------------------------------------------------

/// Normalized text of a scalar JSON value; empty for null, arrays, objects.
pub(crate) fn scalar_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => norm(s),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Normalized text of top-level field `key`.
pub(crate) fn field(raw: &Value, key: &str) -> String {
    scalar_text(raw.get(key))
}

/// Like [`field`], but missing or blank is a malformed record.
pub(crate) fn required(raw: &Value, key: &str) -> Result<String, ItemError> {
    let value = field(raw, key);
    if value.is_empty() {
        Err(ItemError::malformed(format!("missing required field '{key}'")))
    } else {
        Ok(value)
    }
}

/// Pick the literal in `lang` out of a JSON-LD-ish literal: either a single
/// object or a list of objects carrying `value_key` / `lang_key`.
pub(crate) fn literal_in(value: Option<&Value>, value_key: &str, lang_key: &str, lang: &str) -> Option<String> {
    match value? {
        Value::Object(_) => {
            let text = scalar_text(value.and_then(|v| v.get(value_key)));
            (!text.is_empty()).then_some(text)
        }
        Value::Array(entries) => entries
            .iter()
            .filter(|e| e.get(lang_key).and_then(Value::as_str) == Some(lang))
            .map(|e| scalar_text(e.get(value_key)))
            .find(|text| !text.is_empty()),
        Value::String(s) => {
            let text = norm(s);
            (!text.is_empty()).then_some(text)
        }
        _ => None,
    }
}

/// Canonical place URI for a bare Pleiades id.
pub(crate) fn pleiades_uri(namespaces: &NamespaceTable, id: &str) -> Result<Option<String>, ItemError> {
    Ok(namespaces.resolve("pleiades")?.map(|base| format!("{base}{id}")))
}

/// Attach a `relatedMatch` to the Pleiades place `id`, if `id` is non-empty.
pub(crate) fn link_pleiades(item: &mut Item, namespaces: &NamespaceTable, id: &str) -> Result<(), ItemError> {
    if id.is_empty() {
        return Ok(());
    }
    if let Some(uri) = pleiades_uri(namespaces, id)? {
        item.add_link("relatedMatch", &uri);
    }
    Ok(())
}
