//! Per-source dataset cache.
//!
//! Parsing some sources is slow, so the parsed items of each namespace
//! are kept as a JSON snapshot `<dir>/<namespace>.json`. The reverse index
//! is not stored; it is rebuilt on load.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sidebar_recon::{Item, SourceIndex};

use crate::error::IoError;
use crate::CACHE_FORMAT_VERSION;

const CACHE_DIR_NAME: &str = "pleiades-sidebar";

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    namespace: String,
    canonical_domain: String,
    items: Vec<Item>,
}

#[derive(Debug, Clone)]
pub struct DatasetCache {
    dir: PathBuf,
}

impl DatasetCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<platform cache dir>/pleiades-sidebar`, if the platform has one.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::cache_dir().map(|d| d.join(CACHE_DIR_NAME))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, namespace: &str) -> PathBuf {
        self.dir.join(format!("{namespace}.json"))
    }

    /// `Ok(None)` on a cache miss. Unreadable or outdated snapshots are
    /// also misses, so the caller re-parses and overwrites them.
    pub fn load(&self, namespace: &str) -> Result<Option<SourceIndex>, IoError> {
        let path = self.path_for(namespace);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("{namespace}: no cached dataset at {}", path.display());
                return Ok(None);
            }
            Err(e) => return Err(IoError::read(&path, e)),
        };

        let snapshot: Snapshot = match serde_json::from_reader(BufReader::new(file)) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("{namespace}: ignoring unreadable cache {}: {e}", path.display());
                return Ok(None);
            }
        };
        if snapshot.version != CACHE_FORMAT_VERSION {
            log::warn!(
                "{namespace}: ignoring cache {} (version {}, expected {CACHE_FORMAT_VERSION})",
                path.display(),
                snapshot.version
            );
            return Ok(None);
        }
        if snapshot.namespace != namespace {
            return Err(IoError::Cache(format!(
                "{} holds namespace '{}', not '{namespace}'",
                path.display(),
                snapshot.namespace
            )));
        }

        let index = SourceIndex::from_items(snapshot.namespace, snapshot.canonical_domain, snapshot.items);
        log::info!("{namespace}: loaded {} items from cache {}", index.len(), path.display());
        Ok(Some(index))
    }

    pub fn save(&self, index: &SourceIndex) -> Result<PathBuf, IoError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| IoError::write(&self.dir, e))?;
        let path = self.path_for(index.namespace());
        let snapshot = Snapshot {
            version: CACHE_FORMAT_VERSION,
            namespace: index.namespace().to_string(),
            canonical_domain: index.canonical_domain().to_string(),
            items: index.items().cloned().collect(),
        };

        let file = File::create(&path).map_err(|e| IoError::write(&path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &snapshot).map_err(|e| IoError::Cache(e.to_string()))?;
        writer.flush().map_err(|e| IoError::write(&path, e))?;
        log::info!("{}: cached {} items at {}", index.namespace(), index.len(), path.display());
        Ok(path)
    }
}
