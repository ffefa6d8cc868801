use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::lpf::{Feature, FeatureLink, FeatureProperties};

/// A typed reference from an item to a URI in another namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub relation: String,
    pub target: String,
}

/// One normalized record of one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub label: String,
    pub uri: String,
    #[serde(default)]
    pub summary: Option<String>,
    /// Links grouped by target host.
    #[serde(default)]
    pub links: BTreeMap<String, Vec<Link>>,
}

impl Item {
    pub fn new(uri: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            uri: uri.into(),
            summary: None,
            links: BTreeMap::new(),
        }
    }

    /// Empty strings count as absent.
    pub fn set_summary(&mut self, summary: impl Into<String>) {
        let summary = summary.into();
        self.summary = if summary.is_empty() { None } else { Some(summary) };
    }

    /// File `target` under its host. Targets that are not absolute URLs
    /// are dropped; returns whether the link was kept.
    pub fn add_link(&mut self, relation: &str, target: &str) -> bool {
        let host = match Url::parse(target) {
            Ok(url) => match url.host_str() {
                Some(host) if !host.is_empty() => host.to_string(),
                _ => {
                    log::debug!("{}: link target '{target}' has no host, dropped", self.uri);
                    return false;
                }
            },
            Err(e) => {
                log::debug!("{}: link target '{target}' is not a URL ({e}), dropped", self.uri);
                return false;
            }
        };
        self.links.entry(host).or_default().push(Link {
            relation: relation.to_string(),
            target: target.to_string(),
        });
        true
    }

    pub fn links_for(&self, domain: &str) -> &[Link] {
        self.links.get(domain).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Distinct canonical-gazetteer targets, in order.
    pub fn canonical_uris(&self, domain: &str) -> Vec<String> {
        self.links_for(domain)
            .iter()
            .map(|l| l.target.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// URI collision: append `other`'s canonical links, never replace.
    pub fn merge_canonical_links(&mut self, mut other: Item, domain: &str) {
        if let Some(incoming) = other.links.remove(domain) {
            self.links.entry(domain.to_string()).or_default().extend(incoming);
        }
    }

    /// Render as an LPF feature. Link identifiers are deduplicated, the
    /// canonical domain is upgraded to https, and links are sorted by
    /// identifier.
    pub fn to_feature(&self, canonical_domain: &str) -> Feature {
        let mut seen = BTreeSet::new();
        let mut links = Vec::new();
        for link in self.links.values().flatten() {
            let identifier = secure_canonical(&link.target, canonical_domain);
            if seen.insert(identifier.clone()) {
                links.push(FeatureLink {
                    relation: link.relation.clone(),
                    identifier,
                });
            }
        }
        links.sort_by(|a, b| a.identifier.cmp(&b.identifier));

        Feature {
            id: self.uri.clone(),
            kind: "Feature".into(),
            properties: FeatureProperties {
                title: self.label.clone(),
                summary: self.summary.clone(),
                reciprocal: None,
            },
            links,
        }
    }
}

/// `http://<domain>/...` becomes `https://<domain>/...`; anything else is
/// returned unchanged.
pub fn secure_canonical(uri: &str, canonical_domain: &str) -> String {
    match uri.strip_prefix("http://").and_then(|rest| rest.strip_prefix(canonical_domain)) {
        Some(rest) if rest.starts_with('/') => format!("https://{canonical_domain}{rest}"),
        _ => uri.to_string(),
    }
}
