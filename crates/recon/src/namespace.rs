//! Namespace abbreviation table.
//!
//! Sources reference other gazetteers through short names (`pleiades`,
//! `geonames`, `nm:athens`). The table maps each abbreviation to a base URI
//! or to an explicit known-unsupported marker; anything else is an
//! [`ItemError::UnknownNamespace`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer};

use crate::error::ItemError;

pub const UNSUPPORTED_MARKER: &str = "unsupported";

const DEFAULT_BASES: &[(&str, &str)] = &[
    ("edhgeo", "https://edh.ub.uni-heidelberg.de/edh/geographie/"),
    ("geonames", "https://www.geonames.org/"),
    ("itinere", "https://itiner-e.org/route-segment/"),
    ("nm", "http://nomisma.org/id/"),
    ("nomisma", "http://nomisma.org/id/"),
    ("pleiades", "https://pleiades.stoa.org/places/"),
    ("trismegistos", "https://www.trismegistos.org/place/"),
    ("whg", "https://whgazetteer.org/places/"),
    ("wikidata", "https://wikidata.org/entities/"),
];

const DEFAULT_UNSUPPORTED: &[&str] = &[
    "bnf", "cfl/ado", "dare", "gettytgn", "gnd", "idaigaz", "loc", "manto", "topostext", "viaf",
    "vici", "wikipedia",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceEntry {
    Base(String),
    Unsupported,
}

impl fmt::Display for NamespaceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base(base) => write!(f, "{base}"),
            Self::Unsupported => write!(f, "{UNSUPPORTED_MARKER}"),
        }
    }
}

impl<'de> Deserialize<'de> for NamespaceEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.trim() == UNSUPPORTED_MARKER {
            Ok(Self::Unsupported)
        } else {
            Ok(Self::Base(raw.trim().to_string()))
        }
    }
}

#[derive(Debug, Clone)]
pub struct NamespaceTable {
    entries: BTreeMap<String, NamespaceEntry>,
}

impl Default for NamespaceTable {
    fn default() -> Self {
        let mut entries = BTreeMap::new();
        for (abbrev, base) in DEFAULT_BASES {
            entries.insert(abbrev.to_string(), NamespaceEntry::Base(base.to_string()));
        }
        for abbrev in DEFAULT_UNSUPPORTED {
            entries.insert(abbrev.to_string(), NamespaceEntry::Unsupported);
        }
        Self { entries }
    }
}

impl NamespaceTable {
    /// Built-in defaults with `overrides` applied on top.
    pub fn with_overrides(overrides: &BTreeMap<String, NamespaceEntry>) -> Self {
        let mut table = Self::default();
        for (abbrev, entry) in overrides {
            table.entries.insert(abbrev.clone(), entry.clone());
        }
        table
    }

    pub fn entry(&self, abbrev: &str) -> Option<&NamespaceEntry> {
        self.entries.get(abbrev)
    }

    /// `Ok(Some(base))` for a known namespace, `Ok(None)` for a
    /// known-unsupported one (the caller drops the link).
    pub fn resolve(&self, abbrev: &str) -> Result<Option<&str>, ItemError> {
        match self.entries.get(abbrev) {
            Some(NamespaceEntry::Base(base)) => Ok(Some(base.as_str())),
            Some(NamespaceEntry::Unsupported) => {
                log::debug!("namespace '{abbrev}' is known unsupported, skipping link");
                Ok(None)
            }
            None => Err(ItemError::UnknownNamespace(abbrev.to_string())),
        }
    }

    /// Expand `prefix:local` into `base + local`.
    pub fn expand_curie(&self, curie: &str) -> Result<Option<String>, ItemError> {
        let (prefix, local) = curie
            .split_once(':')
            .ok_or_else(|| ItemError::malformed(format!("'{curie}' is not a prefixed name")))?;
        let local = local.trim();
        if local.is_empty() {
            return Err(ItemError::malformed(format!("'{curie}' has an empty local part")));
        }
        Ok(self.resolve(prefix.trim())?.map(|base| format!("{base}{local}")))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &NamespaceEntry)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_default_base() {
        let table = NamespaceTable::default();
        assert_eq!(
            table.resolve("pleiades").unwrap(),
            Some("https://pleiades.stoa.org/places/")
        );
    }

    #[test]
    fn unsupported_is_not_an_error() {
        let table = NamespaceTable::default();
        assert_eq!(table.resolve("gnd").unwrap(), None);
        assert_eq!(table.resolve("dare").unwrap(), None);
    }

    #[test]
    fn unknown_is_an_error() {
        let table = NamespaceTable::default();
        assert_eq!(
            table.resolve("atlantis").unwrap_err(),
            ItemError::UnknownNamespace("atlantis".into())
        );
    }

    #[test]
    fn overrides_replace_defaults() {
        let mut overrides = BTreeMap::new();
        overrides.insert("vici".to_string(), NamespaceEntry::Base("https://vici.org/vici/".into()));
        overrides.insert("geonames".to_string(), NamespaceEntry::Unsupported);
        let table = NamespaceTable::with_overrides(&overrides);
        assert_eq!(table.resolve("vici").unwrap(), Some("https://vici.org/vici/"));
        assert_eq!(table.resolve("geonames").unwrap(), None);
    }

    #[test]
    fn expands_curie() {
        let table = NamespaceTable::default();
        assert_eq!(
            table.expand_curie("nm:athens").unwrap().as_deref(),
            Some("http://nomisma.org/id/athens")
        );
        assert!(matches!(table.expand_curie("athens"), Err(ItemError::MalformedRecord { .. })));
        assert!(matches!(table.expand_curie("zz:athens"), Err(ItemError::UnknownNamespace(_))));
    }

    #[test]
    fn entry_deserializes_marker() {
        #[derive(Deserialize)]
        struct Wrapper {
            namespaces: BTreeMap<String, NamespaceEntry>,
        }
        let wrapper: Wrapper = toml::from_str(
            r#"
[namespaces]
gnd = "unsupported"
vici = "https://vici.org/vici/"
"#,
        )
        .unwrap();
        assert_eq!(wrapper.namespaces["gnd"], NamespaceEntry::Unsupported);
        assert_eq!(
            wrapper.namespaces["vici"],
            NamespaceEntry::Base("https://vici.org/vici/".into())
        );
    }
}
