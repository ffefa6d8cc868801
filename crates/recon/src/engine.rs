use std::collections::{BTreeSet, HashMap};

use serde_json::Value;

use crate::adapters::SourceAdapter;
use crate::aggregate::Aggregator;
use crate::canonical::{CanonicalStore, RecordCache};
use crate::dataset::SourceIndex;
use crate::error::{ItemError, ReconError};
use crate::item::secure_canonical;
use crate::model::{PreparedSource, ReconResult};
use crate::namespace::NamespaceTable;
use crate::reciprocity::{is_reciprocal, normalized_references};

/// Parse every raw record of one source and index the results.
///
/// Records the adapter does not accept are skipped silently; malformed
/// records are dropped with a warning. An unknown namespace abbreviation
/// aborts the whole source.
pub fn build_index(
    source_name: &str,
    adapter: &dyn SourceAdapter,
    records: &[Value],
    namespaces: &NamespaceTable,
    canonical_domain: &str,
) -> Result<SourceIndex, ReconError> {
    let mut index = SourceIndex::new(source_name, canonical_domain);
    let mut dropped = 0usize;
    let mut skipped = 0usize;

    for (i, raw) in records.iter().enumerate() {
        if !adapter.accepts(raw) {
            skipped += 1;
            continue;
        }
        match adapter.parse(raw, namespaces) {
            Ok(item) => index.insert(item),
            Err(ItemError::MalformedRecord { reason }) => {
                log::warn!("{source_name}: dropping record {}: {reason}", i + 1);
                dropped += 1;
            }
            Err(ItemError::UnknownNamespace(abbrev)) => {
                return Err(ReconError::UnknownNamespace {
                    source_name: source_name.to_string(),
                    abbrev,
                });
            }
        }
    }

    index.build_reverse_index();
    log::info!(
        "{source_name}: parsed {} items from {} records ({dropped} malformed, {skipped} not applicable)",
        index.len(),
        records.len()
    );
    Ok(index)
}

/// Reconcile every source against the canonical gazetteer.
///
/// Each canonical record is fetched at most once through `cache`. Missing
/// records skip their canonical URI; item URIs without an identity key
/// skip that match. Any other store failure ends the run.
pub fn run<S: CanonicalStore>(
    sources: &[PreparedSource],
    cache: &mut RecordCache<S>,
) -> Result<ReconResult, ReconError> {
    let mut aggregator = Aggregator::new();
    let mut references: HashMap<String, Option<BTreeSet<String>>> = HashMap::new();

    for source in sources {
        aggregator.begin_source();
        let namespace = source.namespace();
        let domain = source.index.canonical_domain();

        for (canonical_uri, items) in source.index.get_pleiades_matches(source.omit_ambiguous) {
            if !references.contains_key(&canonical_uri) {
                let keys = cache.get(&canonical_uri)?.map(normalized_references);
                references.insert(canonical_uri.clone(), keys);
            }
            let Some(keys) = references.get(&canonical_uri).and_then(Option::as_ref) else {
                continue;
            };

            let sidebar_key = secure_canonical(&canonical_uri, domain);
            for item in items {
                match is_reciprocal(&item.uri, keys) {
                    Ok(reciprocal) => {
                        aggregator.add(namespace, &sidebar_key, item.to_feature(domain), reciprocal)
                    }
                    Err(e) => {
                        log::warn!("{namespace}: skipping match {} -> {canonical_uri}: {e}", item.uri);
                        aggregator.malformed_uri();
                    }
                }
            }
        }
    }

    let result = aggregator.finish(cache.misses());
    log::info!("reconciled: {}", result.summary);
    Ok(result)
}
