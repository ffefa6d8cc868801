//! Reciprocity check: does the canonical record link back to the item?

use std::collections::BTreeSet;

use crate::canonical::CanonicalRecord;
use crate::error::UriError;
use crate::identity::normalize_uri;

/// Identity keys of every usable outbound reference of `record`.
/// References that do not normalize are left out.
pub fn normalized_references(record: &CanonicalRecord) -> BTreeSet<String> {
    record
        .access_uris()
        .filter_map(|uri| match normalize_uri(uri) {
            Ok(key) => Some(key.to_string()),
            Err(e) => {
                log::trace!("{}: ignoring reference: {e}", record.uri);
                None
            }
        })
        .collect()
}

/// Whether `item_uri`'s identity key is among `references`. An item URI
/// with no identity key is an error for the caller to handle.
pub fn is_reciprocal(item_uri: &str, references: &BTreeSet<String>) -> Result<bool, UriError> {
    let key = normalize_uri(item_uri)?;
    Ok(references.contains(&key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::Reference;

    fn record(refs: &[Option<&str>]) -> CanonicalRecord {
        CanonicalRecord {
            uri: "https://pleiades.stoa.org/places/1".into(),
            title: "P1".into(),
            references: refs
                .iter()
                .map(|r| Reference {
                    access_uri: r.map(str::to_string),
                })
                .collect(),
        }
    }

    #[test]
    fn skips_unusable_references() {
        let rec = record(&[
            Some("https://www.ext.org/places/42"),
            Some("not a uri"),
            Some("https://ext.org/"),
            Some(""),
            None,
            Some("https://chronique.efa.gr/?r=topo_public&id=77"),
        ]);
        let keys = normalized_references(&rec);
        assert_eq!(
            keys.into_iter().collect::<Vec<_>>(),
            vec!["chronique.efa.gr:77".to_string(), "ext.org:42".to_string()]
        );
    }

    #[test]
    fn matches_across_uri_shapes() {
        let keys = normalized_references(&record(&[Some("https://www.ext.org/places/42")]));
        assert!(is_reciprocal("https://ext.org/places/42", &keys).unwrap());
        assert!(is_reciprocal("http://ext.org/item?id=42", &keys).unwrap());
        assert!(!is_reciprocal("https://ext.org/places/43", &keys).unwrap());
        assert!(!is_reciprocal("https://other.org/places/42", &keys).unwrap());
    }

    #[test]
    fn item_without_identity_is_an_error() {
        let keys = BTreeSet::new();
        assert!(matches!(is_reciprocal("https://ext.org/", &keys), Err(UriError::NoProbableId(_))));
    }
}
