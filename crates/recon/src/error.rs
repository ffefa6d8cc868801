use thiserror::Error;

/// Why a single raw record could not become an [`Item`](crate::item::Item).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    /// A required field (identifier or label source) is missing or unparseable.
    /// The record is dropped; the run continues.
    #[error("malformed record: {reason}")]
    MalformedRecord { reason: String },

    /// A link names a namespace abbreviation with no base URI and no
    /// known-unsupported marker. Fatal for the source.
    #[error("unknown namespace abbreviation '{0}'")]
    UnknownNamespace(String),
}

impl ItemError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedRecord { reason: reason.into() }
    }
}

/// A URI that cannot be reduced to a `domain:probableID` identity key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UriError {
    #[error("invalid URI '{uri}': {reason}")]
    Invalid { uri: String, reason: String },

    #[error("URI '{0}' has no host")]
    MissingHost(String),

    #[error("URI '{0}' has no id query parameter and no path segment")]
    NoProbableId(String),
}

/// Failure to obtain a canonical record from a store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("canonical record not found: {0}")]
    NotFound(String),

    #[error("timed out fetching canonical record: {0}")]
    Timeout(String),

    #[error("cannot read canonical record {uri}: {message}")]
    Io { uri: String, message: String },

    #[error("cannot parse canonical record {uri}: {message}")]
    Parse { uri: String, message: String },

    #[error("canonical store returned HTTP {status} for {uri}")]
    Http { uri: String, status: u16 },
}

impl StoreError {
    /// NotFound and Timeout both mean "skip this canonical URI".
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Timeout(_))
    }
}

#[derive(Error, Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// Config validation error (no sources, bad namespace override, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),

    #[error("source '{source_name}': unknown adapter '{adapter}'")]
    UnknownAdapter { source_name: String, adapter: String },

    #[error("source '{source_name}': unknown namespace abbreviation '{abbrev}'")]
    UnknownNamespace { source_name: String, abbrev: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}
