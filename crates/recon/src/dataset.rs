//! Per-source item collection and its canonical reverse index.

use std::collections::{BTreeMap, BTreeSet};

use crate::item::Item;
use crate::lpf::FeatureCollection;

/// Items of one source keyed by URI, plus the reverse index
/// `canonicalURI -> {itemURI}`.
///
/// The reverse index is derived: call [`SourceIndex::build_reverse_index`]
/// once all items are inserted.
#[derive(Debug, Clone)]
pub struct SourceIndex {
    namespace: String,
    canonical_domain: String,
    items: BTreeMap<String, Item>,
    reverse: BTreeMap<String, BTreeSet<String>>,
}

impl SourceIndex {
    pub fn new(namespace: impl Into<String>, canonical_domain: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            canonical_domain: canonical_domain.into(),
            items: BTreeMap::new(),
            reverse: BTreeMap::new(),
        }
    }

    /// Insert every item and build the reverse index.
    pub fn from_items(
        namespace: impl Into<String>,
        canonical_domain: impl Into<String>,
        items: impl IntoIterator<Item = Item>,
    ) -> Self {
        let mut index = Self::new(namespace, canonical_domain);
        for item in items {
            index.insert(item);
        }
        index.build_reverse_index();
        index
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn canonical_domain(&self) -> &str {
        &self.canonical_domain
    }

    /// New URI: insert. Known URI: extend the existing item's canonical
    /// links with the newcomer's; everything else of the newcomer is dropped.
    pub fn insert(&mut self, item: Item) {
        match self.items.get_mut(&item.uri) {
            Some(existing) => {
                log::debug!("{} URI collision: {}. Merging ...", self.namespace, item.uri);
                existing.merge_canonical_links(item, &self.canonical_domain);
            }
            None => {
                self.items.insert(item.uri.clone(), item);
            }
        }
    }

    pub fn build_reverse_index(&mut self) {
        self.reverse.clear();
        for item in self.items.values() {
            for link in item.links_for(&self.canonical_domain) {
                let uris = self.reverse.entry(link.target.clone()).or_default();
                if !uris.is_empty() && !uris.contains(&item.uri) {
                    log::debug!(
                        "{} canonical URI collision: {} in {} and {:?}",
                        self.namespace,
                        link.target,
                        item.uri,
                        uris
                    );
                }
                uris.insert(item.uri.clone());
            }
        }
    }

    pub fn reverse_index(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.reverse
    }

    pub fn get(&self, uri: &str) -> Option<&Item> {
        self.items.get(uri)
    }

    /// Items of this source that link to `canonical_uri`.
    pub fn canonical_items(&self, canonical_uri: &str) -> Vec<&Item> {
        self.reverse
            .get(canonical_uri)
            .map(|uris| uris.iter().filter_map(|u| self.items.get(u)).collect())
            .unwrap_or_default()
    }

    /// `canonicalURI -> matching items`. With `omit_multiples`, canonical
    /// URIs matched by more than one item are left out as ambiguous.
    pub fn get_pleiades_matches(&self, omit_multiples: bool) -> BTreeMap<String, Vec<&Item>> {
        self.reverse
            .iter()
            .filter(|(_, uris)| !(omit_multiples && uris.len() > 1))
            .map(|(canonical_uri, uris)| {
                let items = uris.iter().filter_map(|u| self.items.get(u)).collect();
                (canonical_uri.clone(), items)
            })
            .collect()
    }

    /// Propose canonical links for other namespaces: for each item with a
    /// canonical link, its links under each of `netlocs`, keyed by the
    /// item's (first) canonical URI.
    pub fn infer(&self, netlocs: &[&str]) -> BTreeMap<String, Vec<String>> {
        let mut inferred: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for item in self.items.values() {
            let canonical = item.links_for(&self.canonical_domain);
            let Some(first) = canonical.first() else {
                continue;
            };
            if canonical.len() > 1 {
                log::warn!(
                    "{}: {} has {} canonical links, inferring from the first only",
                    self.namespace,
                    item.uri,
                    canonical.len()
                );
            }
            for netloc in netlocs {
                let targets: BTreeSet<&str> =
                    item.links_for(netloc).iter().map(|l| l.target.as_str()).collect();
                if targets.is_empty() {
                    continue;
                }
                inferred
                    .entry(first.target.clone())
                    .or_default()
                    .extend(targets.into_iter().map(str::to_string));
            }
        }
        inferred
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Every item as one LPF feature collection.
    pub fn to_feature_collection(&self) -> FeatureCollection {
        FeatureCollection::new(
            self.items
                .values()
                .map(|item| item.to_feature(&self.canonical_domain))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLEIADES: &str = "pleiades.stoa.org";

    fn item(uri: &str, pids: &[&str]) -> Item {
        let mut item = Item::new(uri, uri.rsplit('/').next().unwrap_or(uri));
        for pid in pids {
            item.add_link("relatedMatch", &format!("https://pleiades.stoa.org/places/{pid}"));
        }
        item
    }

    #[test]
    fn collision_merges_links() {
        let mut index = SourceIndex::new("ext", PLEIADES);
        index.insert(item("https://ext.org/1", &["10"]));
        index.insert(item("https://ext.org/1", &["10", "20"]));
        index.build_reverse_index();

        assert_eq!(index.len(), 1);
        let merged = index.get("https://ext.org/1").unwrap();
        assert_eq!(merged.links_for(PLEIADES).len(), 3);
        assert_eq!(index.reverse_index().len(), 2);
    }

    #[test]
    fn reverse_index_is_consistent() {
        let index = SourceIndex::from_items(
            "ext",
            PLEIADES,
            vec![
                item("https://ext.org/1", &["10"]),
                item("https://ext.org/2", &["10", "20"]),
                item("https://ext.org/3", &[]),
            ],
        );

        for it in index.items() {
            for link in it.links_for(PLEIADES) {
                assert!(index.reverse_index()[&link.target].contains(&it.uri));
            }
        }
        for (canonical, uris) in index.reverse_index() {
            for uri in uris {
                let it = index.get(uri).unwrap();
                assert!(it.links_for(PLEIADES).iter().any(|l| &l.target == canonical));
            }
        }
    }

    #[test]
    fn matches_resolve_to_items() {
        let index = SourceIndex::from_items(
            "ext",
            PLEIADES,
            vec![item("https://ext.org/1", &["10"]), item("https://ext.org/2", &["10", "20"])],
        );
        let matches = index.get_pleiades_matches(false);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches["https://pleiades.stoa.org/places/10"].len(), 2);
        assert_eq!(matches["https://pleiades.stoa.org/places/20"][0].uri, "https://ext.org/2");
    }

    #[test]
    fn omit_multiples_drops_ambiguous() {
        let index = SourceIndex::from_items(
            "ext",
            PLEIADES,
            vec![item("https://ext.org/1", &["10"]), item("https://ext.org/2", &["10", "20"])],
        );
        let matches = index.get_pleiades_matches(true);
        assert_eq!(matches.len(), 1);
        assert!(matches.contains_key("https://pleiades.stoa.org/places/20"));
    }

    #[test]
    fn canonical_items_unknown_is_empty() {
        let index = SourceIndex::from_items("ext", PLEIADES, vec![item("https://ext.org/1", &["10"])]);
        assert!(index.canonical_items("https://pleiades.stoa.org/places/99").is_empty());
        assert_eq!(index.canonical_items("https://pleiades.stoa.org/places/10").len(), 1);
    }

    #[test]
    fn infer_collects_other_netlocs() {
        let mut a = item("https://ext.org/1", &["10"]);
        a.add_link("closeMatch", "https://www.geonames.org/5");
        a.add_link("closeMatch", "https://www.geonames.org/6");
        let b = item("https://ext.org/2", &["20"]);
        let index = SourceIndex::from_items("ext", PLEIADES, vec![a, b]);

        let inferred = index.infer(&["www.geonames.org"]);
        assert_eq!(inferred.len(), 1);
        assert_eq!(
            inferred["https://pleiades.stoa.org/places/10"],
            vec!["https://www.geonames.org/5".to_string(), "https://www.geonames.org/6".to_string()]
        );
    }

    #[test]
    fn feature_collection_covers_all_items() {
        let index = SourceIndex::from_items(
            "ext",
            PLEIADES,
            vec![item("https://ext.org/2", &["10"]), item("https://ext.org/1", &[])],
        );
        let fc = index.to_feature_collection();
        assert_eq!(fc.kind, "FeatureCollection");
        assert_eq!(fc.features.len(), 2);
        assert_eq!(fc.features[0].id, "https://ext.org/1");
    }
}
