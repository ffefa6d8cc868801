use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dataset::SourceIndex;
use crate::lpf::Feature;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One parsed source ready for reconciliation.
#[derive(Debug, Clone)]
pub struct PreparedSource {
    pub index: SourceIndex,
    /// Leave out canonical URIs matched by several items of this source.
    pub omit_ambiguous: bool,
}

impl PreparedSource {
    pub fn new(index: SourceIndex) -> Self {
        Self {
            index,
            omit_ambiguous: false,
        }
    }

    pub fn namespace(&self) -> &str {
        self.index.namespace()
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub sources: usize,
    /// Distinct canonical URIs matched by at least one source.
    pub canonical_uris: usize,
    /// (canonical URI, item) pairs that were checked.
    pub matches: usize,
    pub reciprocal: usize,
    pub unreciprocated: usize,
    /// Canonical URIs with no record in the store (skipped).
    pub missing_records: usize,
    /// Matches skipped because the item URI has no identity key.
    pub malformed_uris: usize,
}

impl fmt::Display for ReconSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sources, {} canonical URIs, {} matches ({} reciprocal, {} unreciprocated), \
             {} missing records, {} malformed URIs",
            self.sources,
            self.canonical_uris,
            self.matches,
            self.reciprocal,
            self.unreciprocated,
            self.missing_records,
            self.malformed_uris
        )
    }
}

/// Reconciliation output. Serializes as
/// `{"sidebar": {...}, "unreciprocated": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconResult {
    /// canonical URI -> every external match, tagged `reciprocal`.
    pub sidebar: BTreeMap<String, Vec<Feature>>,
    /// source namespace -> matches the canonical record does not link back to.
    pub unreciprocated: BTreeMap<String, Vec<Feature>>,
    #[serde(skip)]
    pub summary: ReconSummary,
}

