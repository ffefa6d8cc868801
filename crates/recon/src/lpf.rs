//! Linked Places Format (LPF) output shapes.

use serde::{Deserialize, Serialize};

pub const LPF_CONTEXT: &str =
    "https://raw.githubusercontent.com/LinkedPasts/linked-places/master/linkedplaces-context-v1.1.jsonld";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureLink {
    #[serde(rename = "type")]
    pub relation: String,
    pub identifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureProperties {
    pub title: String,
    pub summary: Option<String>,
    /// Only present on reconciled (sidebar) features.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reciprocal: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: FeatureProperties,
    pub links: Vec<FeatureLink>,
}

impl Feature {
    pub fn with_reciprocal(mut self, reciprocal: bool) -> Self {
        self.properties.reciprocal = Some(reciprocal);
        self
    }

    /// First link identifier containing `domain`.
    pub fn link_into(&self, domain: &str) -> Option<&str> {
        self.links
            .iter()
            .map(|l| l.identifier.as_str())
            .find(|identifier| identifier.contains(domain))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "@context")]
    pub context: String,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Wrap `features`, ordered by `@id`.
    pub fn new(mut features: Vec<Feature>) -> Self {
        sort_features(&mut features);
        Self {
            kind: "FeatureCollection".into(),
            context: LPF_CONTEXT.into(),
            features,
        }
    }
}

/// Lexicographic (code-point) order by `@id`. Stable for equal ids.
pub fn sort_features(features: &mut [Feature]) {
    features.sort_by(|a, b| a.id.cmp(&b.id));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(id: &str) -> Feature {
        Feature {
            id: id.into(),
            kind: "Feature".into(),
            properties: FeatureProperties {
                title: id.to_uppercase(),
                summary: None,
                reciprocal: None,
            },
            links: vec![FeatureLink {
                relation: "relatedMatch".into(),
                identifier: "https://pleiades.stoa.org/places/1".into(),
            }],
        }
    }

    #[test]
    fn serializes_lpf_field_names() {
        let value = serde_json::to_value(feature("https://ext.org/a").with_reciprocal(true)).unwrap();
        assert_eq!(value["@id"], "https://ext.org/a");
        assert_eq!(value["type"], "Feature");
        assert_eq!(value["properties"]["reciprocal"], true);
        assert!(value["properties"]["summary"].is_null());
        assert_eq!(value["links"][0]["type"], "relatedMatch");
    }

    #[test]
    fn reciprocal_omitted_for_plain_export() {
        let value = serde_json::to_value(feature("https://ext.org/a")).unwrap();
        assert!(value["properties"].get("reciprocal").is_none());
    }

    #[test]
    fn collection_sorts_by_id() {
        let fc = FeatureCollection::new(vec![feature("b"), feature("a"), feature("B")]);
        let ids: Vec<&str> = fc.features.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "a", "b"]);
        assert_eq!(fc.context, LPF_CONTEXT);
    }

    #[test]
    fn finds_canonical_link() {
        let f = feature("x");
        assert_eq!(f.link_into("pleiades.stoa.org"), Some("https://pleiades.stoa.org/places/1"));
        assert_eq!(f.link_into("geonames.org"), None);
    }
}
