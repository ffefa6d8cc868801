use std::collections::{BTreeMap, BTreeSet};

use crate::lpf::{sort_features, Feature};
use crate::model::{ReconResult, ReconSummary};

/// Collects reconciled matches from every source, then orders them.
#[derive(Debug, Default)]
pub struct Aggregator {
    sidebar: BTreeMap<String, Vec<Feature>>,
    unreciprocated: BTreeMap<String, Vec<Feature>>,
    canonical_uris: BTreeSet<String>,
    summary: ReconSummary,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_source(&mut self) {
        self.summary.sources += 1;
    }

    /// Record one checked match of `feature` against `canonical_uri`.
    pub fn add(&mut self, namespace: &str, canonical_uri: &str, feature: Feature, reciprocal: bool) {
        let feature = feature.with_reciprocal(reciprocal);
        self.summary.matches += 1;
        self.canonical_uris.insert(canonical_uri.to_string());
        if reciprocal {
            self.summary.reciprocal += 1;
        } else {
            self.summary.unreciprocated += 1;
            self.unreciprocated
                .entry(namespace.to_string())
                .or_default()
                .push(feature.clone());
        }
        self.sidebar.entry(canonical_uri.to_string()).or_default().push(feature);
    }

    pub fn malformed_uri(&mut self) {
        self.summary.malformed_uris += 1;
    }

    /// Sort every list by `@id` and drop repeated features, so identical
    /// input always serializes identically.
    pub fn finish(mut self, missing_records: usize) -> ReconResult {
        for features in self.sidebar.values_mut().chain(self.unreciprocated.values_mut()) {
            sort_features(features);
            features.dedup_by(|a, b| a.id == b.id);
        }
        self.summary.canonical_uris = self.canonical_uris.len();
        self.summary.missing_records = missing_records;
        ReconResult {
            sidebar: self.sidebar,
            unreciprocated: self.unreciprocated,
            summary: self.summary,
        }
    }
}
