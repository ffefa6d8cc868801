//! Output writers: the per-place sidebar tree, unreciprocated lists, and
//! their CSV rendering.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use sidebar_recon::lpf::Feature;
use sidebar_recon::text::sort_key;
use sidebar_recon::ReconResult;

use crate::error::IoError;
use crate::store::pid_from_uri;

const UNRECIP_PREFIX: &str = "unreciprocated_";
const CSV_HEADER: [&str; 4] = ["uri", "title", "summary", "pleiades_uri"];

/// `<out>/<pid[0]>/<pid[1]>/<pid[2]>/<pid>.json`, with one directory per
/// leading character when the id is shorter than three.
pub fn sidebar_path(out: &Path, canonical_uri: &str) -> Option<PathBuf> {
    let pid = pid_from_uri(canonical_uri)?;
    let mut path = out.to_path_buf();
    for c in pid.chars().take(3) {
        path.push(c.to_string());
    }
    path.push(format!("{pid}.json"));
    Some(path)
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), IoError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| IoError::write(parent, e))?;
    }
    let file = File::create(path).map_err(|e| IoError::write(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| IoError::write(path, e))?;
    writer.write_all(b"\n").map_err(|e| IoError::write(path, e))?;
    writer.flush().map_err(|e| IoError::write(path, e))?;
    Ok(())
}

/// One file per canonical URI. Returns the number of files written.
pub fn write_sidebar_tree(out: &Path, sidebar: &BTreeMap<String, Vec<Feature>>) -> Result<usize, IoError> {
    let mut written = 0;
    for (canonical_uri, features) in sidebar {
        let Some(path) = sidebar_path(out, canonical_uri) else {
            log::warn!("no place id in {canonical_uri}, not written");
            continue;
        };
        write_json(&path, features)?;
        written += 1;
    }
    log::info!("wrote {written} sidebar files under {}", out.display());
    Ok(written)
}

/// `<out>/unreciprocated_<namespace>.json` per namespace.
pub fn write_unreciprocated(
    out: &Path,
    unreciprocated: &BTreeMap<String, Vec<Feature>>,
) -> Result<Vec<PathBuf>, IoError> {
    let mut paths = Vec::new();
    for (namespace, features) in unreciprocated {
        let path = out.join(format!("{UNRECIP_PREFIX}{namespace}.json"));
        write_json(&path, features)?;
        log::info!("wrote {} ({} features)", path.display(), features.len());
        paths.push(path);
    }
    Ok(paths)
}

/// Sidebar tree plus unreciprocated files.
pub fn write_result(out: &Path, result: &ReconResult) -> Result<(), IoError> {
    fs::create_dir_all(out).map_err(|e| IoError::write(out, e))?;
    write_sidebar_tree(out, &result.sidebar)?;
    write_unreciprocated(out, &result.unreciprocated)?;
    Ok(())
}

// ── Unreciprocated CSV ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnrecipRow {
    pub uri: String,
    pub title: String,
    pub summary: Option<String>,
    pub pleiades_uri: String,
}

/// Rows ordered by the slug of their title.
pub fn unreciprocated_rows(features: &[Feature], canonical_domain: &str) -> Vec<UnrecipRow> {
    let mut rows: Vec<UnrecipRow> = features
        .iter()
        .map(|f| UnrecipRow {
            uri: f.id.clone(),
            title: f.properties.title.clone(),
            summary: f.properties.summary.clone(),
            pleiades_uri: f.link_into(canonical_domain).unwrap_or_default().to_string(),
        })
        .collect();
    rows.sort_by_cached_key(|r| sort_key(&r.title));
    rows
}

pub fn write_unreciprocated_csv(path: &Path, rows: &[UnrecipRow]) -> Result<(), IoError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| IoError::write(path, e))?;
    writer.write_record(CSV_HEADER).map_err(|e| IoError::write(path, e))?;
    for row in rows {
        writer.serialize(row).map_err(|e| IoError::write(path, e))?;
    }
    writer.flush().map_err(|e| IoError::write(path, e))?;
    Ok(())
}

/// Convert every `unreciprocated_*.json` in `dir` into a sibling `.csv`.
pub fn convert_unreciprocated_dir(dir: &Path, canonical_domain: &str) -> Result<Vec<PathBuf>, IoError> {
    let mut sources: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| IoError::read(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            name.starts_with(UNRECIP_PREFIX) && name.ends_with(".json")
        })
        .collect();
    sources.sort();

    let mut written = Vec::new();
    for source in sources {
        let text = fs::read_to_string(&source).map_err(|e| IoError::read(&source, e))?;
        let features: Vec<Feature> = serde_json::from_str(&text).map_err(|e| IoError::parse(&source, e))?;
        let target = source.with_extension("csv");
        write_unreciprocated_csv(&target, &unreciprocated_rows(&features, canonical_domain))?;
        log::info!("wrote {}", target.display());
        written.push(target);
    }
    Ok(written)
}
