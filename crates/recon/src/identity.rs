//! URI identity keys.
//!
//! Two gazetteers often reference the same entity through differently
//! shaped URIs (`?id=42` vs `/places/42`, `www.` vs bare host). Reducing
//! both sides to a `domain:probableID` key lets the reconciler compare
//! them without exact string equality.

use std::fmt;

use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::UriError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey {
    pub domain: String,
    pub probable_id: String,
}

impl IdentityKey {
    /// Rebuild a path-style URI carrying the same identity. The id is
    /// percent-encoded as a single path segment, so `normalize_uri` of the
    /// result gives back this key.
    pub fn to_uri(&self) -> Result<String, UriError> {
        let base = format!("https://{}/", self.domain);
        let mut url = Url::parse(&base).map_err(|e| UriError::Invalid {
            uri: base.clone(),
            reason: e.to_string(),
        })?;
        url.path_segments_mut()
            .map_err(|_| UriError::MissingHost(base.clone()))?
            .clear()
            .push(&self.probable_id);
        Ok(url.into())
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.domain, self.probable_id)
    }
}

/// Reduce `uri` to its identity key.
///
/// - domain: host with any leading `www.` removed. The port is dropped, so
///   `ext.org:8080/x` and `ext.org/x` share a key; the key is scheme- and
///   port-agnostic.
/// - probableID: the single non-empty `id` query value if there is exactly
///   one, else the last non-empty path segment. Both are percent-decoded.
pub fn normalize_uri(uri: &str) -> Result<IdentityKey, UriError> {
    let url = Url::parse(uri.trim()).map_err(|e| UriError::Invalid {
        uri: uri.to_string(),
        reason: e.to_string(),
    })?;

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| UriError::MissingHost(uri.to_string()))?;
    let domain = host.strip_prefix("www.").unwrap_or(host).to_string();

    let ids: Vec<String> = url
        .query_pairs()
        .filter(|(k, v)| k == "id" && !v.is_empty())
        .map(|(_, v)| v.into_owned())
        .collect();

    let probable_id = if ids.len() == 1 {
        ids.into_iter().next()
    } else {
        url.path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
    };

    match probable_id {
        Some(probable_id) => Ok(IdentityKey { domain, probable_id }),
        None => Err(UriError::NoProbableId(uri.to_string())),
    }
}
