//! Canonical gazetteer records and the per-run lookup cache.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// One outbound reference of a canonical record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "accessURI", default)]
    pub access_uri: Option<String>,
}

/// The parts of a Pleiades place document the reconciler reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub references: Vec<Reference>,
}

impl CanonicalRecord {
    /// Non-blank reference URIs, in document order.
    pub fn access_uris(&self) -> impl Iterator<Item = &str> {
        self.references
            .iter()
            .filter_map(|r| r.access_uri.as_deref())
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
    }
}

/// Source of canonical records, addressed by canonical URI.
pub trait CanonicalStore {
    fn get(&self, uri: &str) -> Result<CanonicalRecord, StoreError>;
}

impl<S: CanonicalStore + ?Sized> CanonicalStore for &S {
    fn get(&self, uri: &str) -> Result<CanonicalRecord, StoreError> {
        (**self).get(uri)
    }
}

impl<S: CanonicalStore + ?Sized> CanonicalStore for Box<S> {
    fn get(&self, uri: &str) -> Result<CanonicalRecord, StoreError> {
        (**self).get(uri)
    }
}

/// In-memory store, keyed by canonical URI.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<String, CanonicalRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: CanonicalRecord) {
        self.records.insert(record.uri.clone(), record);
    }

    pub fn with(mut self, record: CanonicalRecord) -> Self {
        self.insert(record);
        self
    }
}

impl CanonicalStore for MemoryStore {
    fn get(&self, uri: &str) -> Result<CanonicalRecord, StoreError> {
        self.records
            .get(uri)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(uri.to_string()))
    }
}

/// Memoizes store lookups for one run: every canonical URI hits the store
/// at most once, misses included. Fatal store errors are not memoized.
pub struct RecordCache<S> {
    store: S,
    memo: HashMap<String, Option<CanonicalRecord>>,
    lookups: usize,
}

impl<S: CanonicalStore> RecordCache<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            memo: HashMap::new(),
            lookups: 0,
        }
    }

    /// `Ok(None)` when the record is missing (not found or timed out).
    pub fn get(&mut self, uri: &str) -> Result<Option<&CanonicalRecord>, StoreError> {
        if !self.memo.contains_key(uri) {
            self.lookups += 1;
            let fetched = match self.store.get(uri) {
                Ok(record) => Some(record),
                Err(e) if e.is_missing() => {
                    log::warn!("skipping {uri}: {e}");
                    None
                }
                Err(e) => return Err(e),
            };
            self.memo.insert(uri.to_string(), fetched);
        }
        Ok(self.memo.get(uri).and_then(Option::as_ref))
    }

    /// Store calls made so far.
    pub fn lookups(&self) -> usize {
        self.lookups
    }

    /// Distinct canonical URIs the store had no record for.
    pub fn misses(&self) -> usize {
        self.memo.values().filter(|r| r.is_none()).count()
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn record(uri: &str, refs: &[&str]) -> CanonicalRecord {
        CanonicalRecord {
            uri: uri.into(),
            title: "Place".into(),
            references: refs
                .iter()
                .map(|r| Reference {
                    access_uri: Some(r.to_string()),
                })
                .collect(),
        }
    }

    struct Flaky {
        calls: Cell<usize>,
    }

    impl CanonicalStore for Flaky {
        fn get(&self, uri: &str) -> Result<CanonicalRecord, StoreError> {
            self.calls.set(self.calls.get() + 1);
            Err(StoreError::Http {
                uri: uri.into(),
                status: 500,
            })
        }
    }

    #[test]
    fn deserializes_place_document() {
        let doc = r#"{
            "uri": "https://pleiades.stoa.org/places/579885",
            "title": "Athenae",
            "references": [
                {"accessURI": "https://www.wikidata.org/wiki/Q1524", "shortTitle": "wd"},
                {"accessURI": ""},
                {"shortTitle": "no uri"}
            ],
            "connections": []
        }"#;
        let rec: CanonicalRecord = serde_json::from_str(doc).unwrap();
        assert_eq!(rec.title, "Athenae");
        assert_eq!(rec.references.len(), 3);
        assert_eq!(rec.access_uris().collect::<Vec<_>>(), vec!["https://www.wikidata.org/wiki/Q1524"]);
    }

    #[test]
    fn cache_memoizes_hits_and_misses() {
        let store = MemoryStore::new().with(record("p1", &["https://ext.org/1"]));
        let mut cache = RecordCache::new(store);

        assert!(cache.get("p1").unwrap().is_some());
        assert!(cache.get("p1").unwrap().is_some());
        assert!(cache.get("p9").unwrap().is_none());
        assert!(cache.get("p9").unwrap().is_none());
        assert_eq!(cache.lookups(), 2);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn fatal_errors_propagate_and_are_not_memoized() {
        let store = Flaky { calls: Cell::new(0) };
        let mut cache = RecordCache::new(&store);
        assert!(matches!(cache.get("p1"), Err(StoreError::Http { status: 500, .. })));
        assert!(cache.get("p1").is_err());
        assert_eq!(store.calls.get(), 2);
    }
}
