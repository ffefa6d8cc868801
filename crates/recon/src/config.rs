use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use url::Url;

use crate::adapters::{AdapterRegistry, RawFormat, SourceAdapter};
use crate::error::ReconError;
use crate::namespace::{NamespaceEntry, NamespaceTable};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SidebarConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub canonical: CanonicalConfig,
    /// Overrides and extensions of the built-in namespace table.
    #[serde(default)]
    pub namespaces: BTreeMap<String, NamespaceEntry>,
    pub sources: BTreeMap<String, SourceConfig>,
}

fn default_name() -> String {
    "sidebar".into()
}

// ---------------------------------------------------------------------------
// Canonical gazetteer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CanonicalConfig {
    #[serde(default = "default_domain")]
    pub domain: String,
    #[serde(default)]
    pub store: StoreKind,
    /// File store root, relative to the config file. May be left out
    /// when `PLEIADES_PATH` supplies it.
    #[serde(default)]
    pub path: Option<String>,
    /// HTTP store: records are fetched from `<base_url>/<pid>/json`
    /// instead of `<uri>/json`.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_domain() -> String {
    "pleiades.stoa.org".into()
}

fn default_timeout_secs() -> u64 {
    15
}

impl CanonicalConfig {
    /// Configured file store root; blank counts as unset.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }

    /// Configured base URL; blank counts as unset.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref().map(str::trim).filter(|b| !b.is_empty())
    }
}

impl Default for CanonicalConfig {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            store: StoreKind::default(),
            path: None,
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    #[default]
    File,
    Http,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Http => write!(f, "http"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Raw data file, relative to the config file.
    pub file: String,
    /// Adapter name; defaults to the source's table key.
    #[serde(default)]
    pub adapter: Option<String>,
    /// Defaults to the adapter's native format.
    #[serde(default)]
    pub format: Option<RawFormat>,
    #[serde(default)]
    pub omit_ambiguous: bool,
}

impl SourceConfig {
    pub fn adapter_name<'a>(&'a self, source_name: &'a str) -> &'a str {
        self.adapter.as_deref().unwrap_or(source_name)
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl SidebarConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: SidebarConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate(&AdapterRegistry::builtin())?;
        Ok(config)
    }

    pub fn validate(&self, registry: &AdapterRegistry) -> Result<(), ReconError> {
        if self.sources.is_empty() {
            return Err(ReconError::ConfigValidation(
                "at least one source is required".into(),
            ));
        }

        if self.canonical.domain.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "canonical.domain must not be empty".into(),
            ));
        }

        if self.canonical.timeout_secs == 0 {
            return Err(ReconError::ConfigValidation(
                "canonical.timeout_secs must be greater than 0".into(),
            ));
        }

        if let Some(base_url) = self.canonical.base_url() {
            if !is_http_base(base_url) {
                return Err(ReconError::ConfigValidation(format!(
                    "canonical.base_url '{base_url}' is not an http(s) URL"
                )));
            }
        }

        for (abbrev, entry) in &self.namespaces {
            if let NamespaceEntry::Base(base) = entry {
                if !is_http_base(base) {
                    return Err(ReconError::ConfigValidation(format!(
                        "namespace '{abbrev}': '{base}' is neither \"unsupported\" nor an http(s) base URI"
                    )));
                }
            }
        }

        for (source_name, source) in &self.sources {
            let adapter = source.adapter_name(source_name);
            if registry.get(adapter).is_none() {
                return Err(ReconError::UnknownAdapter {
                    source_name: source_name.clone(),
                    adapter: adapter.to_string(),
                });
            }
            if source.file.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "source '{source_name}': file must not be empty"
                )));
            }
        }

        Ok(())
    }

    /// Built-in namespace table with this config's overrides applied.
    pub fn namespace_table(&self) -> NamespaceTable {
        NamespaceTable::with_overrides(&self.namespaces)
    }

    /// Look up the adapter for `source_name` in `registry`.
    pub fn adapter_for<'r>(
        &self,
        registry: &'r AdapterRegistry,
        source_name: &str,
    ) -> Result<&'r dyn SourceAdapter, ReconError> {
        let source = self.sources.get(source_name).ok_or_else(|| {
            ReconError::ConfigValidation(format!("no source named '{source_name}'"))
        })?;
        let adapter = source.adapter_name(source_name);
        registry.get(adapter).ok_or_else(|| ReconError::UnknownAdapter {
            source_name: source_name.to_string(),
            adapter: adapter.to_string(),
        })
    }

    /// Raw format for `source_name`: configured, else the adapter's own.
    pub fn format_for(&self, registry: &AdapterRegistry, source_name: &str) -> Result<RawFormat, ReconError> {
        let adapter = self.adapter_for(registry, source_name)?;
        Ok(self.sources[source_name].format.unwrap_or_else(|| adapter.format()))
    }

    /// Keep only `selected` sources (all when empty). Unknown names are an error.
    pub fn select_sources(&mut self, selected: &[String]) -> Result<(), ReconError> {
        if selected.is_empty() {
            return Ok(());
        }
        for name in selected {
            if !self.sources.contains_key(name) {
                return Err(ReconError::ConfigValidation(format!(
                    "namespace '{name}' is not configured (known: {})",
                    self.sources.keys().cloned().collect::<Vec<_>>().join(", ")
                )));
            }
        }
        self.sources.retain(|name, _| selected.contains(name));
        Ok(())
    }
}

fn is_http_base(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
