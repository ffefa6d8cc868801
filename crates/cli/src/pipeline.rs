//! `sidebar generate | validate | export | unrecip-csv`: config-driven
//! wiring of loaders, stores, the engine, and the output writers.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use sidebar_io::output::{convert_unreciprocated_dir, write_json, write_result};
use sidebar_io::raw::load_records;
use sidebar_io::{DatasetCache, FileStore, HttpStore};
use sidebar_recon::config::StoreKind;
use sidebar_recon::{
    build_index, run, AdapterRegistry, CanonicalStore, NamespaceTable, PreparedSource, RecordCache,
    SidebarConfig, SourceIndex,
};

use crate::exit_codes::{EXIT_CANONICAL_STORE, EXIT_ERROR, EXIT_INVALID_CONFIG, EXIT_OUTPUT_WRITE};
use crate::CliError;

pub struct GenerateArgs {
    pub config: PathBuf,
    pub namespaces: Vec<String>,
    pub use_cache: bool,
    pub cache_dir: Option<PathBuf>,
    pub pleiades_path: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub json: bool,
}

pub fn cmd_generate(args: GenerateArgs) -> Result<(), CliError> {
    let mut config = read_config(&args.config)?;
    config.select_sources(&args.namespaces)?;
    let base_dir = config_dir(&args.config);

    let store = open_store(&config, base_dir, args.pleiades_path)?;
    let cache = dataset_cache(args.cache_dir);
    let loader = SourceLoader::new(&config, base_dir, cache.as_ref(), args.use_cache);

    let mut prepared = Vec::with_capacity(config.sources.len());
    for (name, source) in &config.sources {
        prepared.push(PreparedSource {
            index: loader.load(name)?,
            omit_ambiguous: source.omit_ambiguous,
        });
    }

    let mut records = RecordCache::new(store);
    let result = run(&prepared, &mut records)?;

    if let Some(out) = &args.output {
        write_result(out, &result)?;
        eprintln!("wrote {}", out.display());
    }
    if args.json || args.output.is_none() {
        print_json(&result)?;
    }

    eprintln!("{}: {}", config.name, result.summary);
    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    let sources: Vec<String> = config
        .sources
        .iter()
        .map(|(name, source)| {
            let adapter = source.adapter_name(name);
            if adapter == name {
                name.clone()
            } else {
                format!("{name} ({adapter})")
            }
        })
        .collect();
    eprintln!(
        "valid: '{}' with {} source(s): {}; canonical {} store for {}",
        config.name,
        sources.len(),
        sources.join(", "),
        config.canonical.store,
        config.canonical.domain,
    );
    Ok(())
}

pub fn cmd_export(
    config_path: PathBuf,
    namespace: String,
    use_cache: bool,
    cache_dir: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let mut config = read_config(&config_path)?;
    config.select_sources(std::slice::from_ref(&namespace))?;
    let base_dir = config_dir(&config_path);

    let cache = dataset_cache(cache_dir);
    let index = SourceLoader::new(&config, base_dir, cache.as_ref(), use_cache).load(&namespace)?;
    let collection = index.to_feature_collection();

    match output {
        Some(path) => {
            write_json(&path, &collection)?;
            eprintln!("wrote {} ({} features)", path.display(), collection.features.len());
        }
        None => print_json(&collection)?,
    }
    Ok(())
}

pub fn cmd_unrecip_csv(dir: PathBuf, domain: String) -> Result<(), CliError> {
    if !dir.is_dir() {
        return Err(CliError::usage(format!("{} is not a directory", dir.display())));
    }
    let written = convert_unreciprocated_dir(&dir, &domain)?;
    if written.is_empty() {
        tracing::warn!("no unreciprocated_*.json files in {}", dir.display());
    }
    for path in &written {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_config(path: &Path) -> Result<SidebarConfig, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        CliError::usage(format!("cannot read config {}: {e}", path.display()))
    })?;
    let config = SidebarConfig::from_toml(&text)?;
    tracing::debug!("loaded config '{}' from {}", config.name, path.display());
    Ok(config)
}

/// Relative paths in a config resolve against the config file's directory.
fn config_dir(config_path: &Path) -> &Path {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

fn dataset_cache(cache_dir: Option<PathBuf>) -> Option<DatasetCache> {
    let cache = cache_dir.or_else(DatasetCache::default_dir).map(DatasetCache::new);
    if cache.is_none() {
        tracing::warn!("no cache directory on this platform; dataset cache disabled");
    }
    cache
}

fn open_store(
    config: &SidebarConfig,
    base_dir: &Path,
    pleiades_path: Option<PathBuf>,
) -> Result<Box<dyn CanonicalStore>, CliError> {
    match config.canonical.store {
        StoreKind::File => {
            let root = match (pleiades_path, config.canonical.path()) {
                (Some(root), _) => root,
                (None, Some(path)) => base_dir.join(path),
                (None, None) => {
                    return Err(CliError::new(EXIT_INVALID_CONFIG, "no canonical.path for the file store")
                        .with_hint("set canonical.path, --pleiades-path, or PLEIADES_PATH"))
                }
            };
            if !root.is_dir() {
                return Err(CliError::new(
                    EXIT_CANONICAL_STORE,
                    format!("Pleiades JSON tree not found at {}", root.display()),
                )
                .with_hint("set canonical.path, --pleiades-path, or PLEIADES_PATH"));
            }
            tracing::info!("canonical records from {}", root.display());
            Ok(Box::new(FileStore::new(root)))
        }
        StoreKind::Http => {
            if pleiades_path.is_some() {
                tracing::warn!("--pleiades-path ignored: canonical store is http");
            }
            let timeout = Duration::from_secs(config.canonical.timeout_secs);
            let base_url = config.canonical.base_url().map(str::to_string);
            Ok(Box::new(HttpStore::new(timeout, base_url)?))
        }
    }
}

/// Loads one configured source, through the dataset cache when asked.
struct SourceLoader<'a> {
    config: &'a SidebarConfig,
    registry: AdapterRegistry,
    namespaces: NamespaceTable,
    base_dir: &'a Path,
    cache: Option<&'a DatasetCache>,
    use_cache: bool,
}

impl<'a> SourceLoader<'a> {
    fn new(
        config: &'a SidebarConfig,
        base_dir: &'a Path,
        cache: Option<&'a DatasetCache>,
        use_cache: bool,
    ) -> Self {
        Self {
            config,
            registry: AdapterRegistry::builtin(),
            namespaces: config.namespace_table(),
            base_dir,
            cache,
            use_cache,
        }
    }

    fn load(&self, name: &str) -> Result<SourceIndex, CliError> {
        if let Some(index) = self.cached(name) {
            return Ok(index);
        }

        let adapter = self.config.adapter_for(&self.registry, name)?;
        let format = self.config.format_for(&self.registry, name)?;
        let path = self.base_dir.join(&self.config.sources[name].file);
        let records = load_records(&path, format)?;
        let index = build_index(name, adapter, &records, &self.namespaces, &self.config.canonical.domain)?;

        // A fresh parse always refreshes the snapshot
        if let Some(cache) = self.cache {
            if let Err(e) = cache.save(&index) {
                tracing::warn!("{name}: not cached: {e}");
            }
        }
        Ok(index)
    }

    fn cached(&self, name: &str) -> Option<SourceIndex> {
        if !self.use_cache {
            return None;
        }
        match self.cache?.load(name) {
            Ok(Some(index)) if index.canonical_domain() == self.config.canonical.domain => Some(index),
            Ok(Some(index)) => {
                tracing::warn!(
                    "{name}: cached for {}, not {}; re-parsing",
                    index.canonical_domain(),
                    self.config.canonical.domain
                );
                None
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("{name}: {e}; re-parsing");
                None
            }
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{json}")
        .and_then(|_| stdout.flush())
        .map_err(|e| CliError::new(EXIT_OUTPUT_WRITE, format!("cannot write to stdout: {e}")))
}
