//! Canonical-record stores backed by a local Pleiades JSON tree or the
//! Pleiades web site.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use sidebar_recon::{CanonicalRecord, CanonicalStore, StoreError};

use crate::error::IoError;

pub const USER_AGENT: &str = concat!("pleiades-sidebar/", env!("CARGO_PKG_VERSION"));
const DEFAULT_RETRIES: u32 = 2;

/// Place id of a canonical URI: its last non-empty path segment.
pub fn pid_from_uri(uri: &str) -> Option<&str> {
    uri.split('/').map(str::trim).filter(|s| !s.is_empty()).last()
}

fn parse_record(uri: &str, text: &str) -> Result<CanonicalRecord, StoreError> {
    let mut record: CanonicalRecord =
        serde_json::from_str(text.trim_start_matches('\u{feff}')).map_err(|e| StoreError::Parse {
            uri: uri.to_string(),
            message: e.to_string(),
        })?;
    if record.uri.is_empty() {
        record.uri = uri.to_string();
    }
    Ok(record)
}

// ── File store ──────────────────────────────────────────────────────

/// Pleiades JSON export on disk. Place `579885` lives at
/// `root/5/7/9/8/579885.json`: one directory per character of the id
/// except the last two.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn record_path(&self, pid: &str) -> PathBuf {
        let chars: Vec<char> = pid.chars().collect();
        let mut path = self.root.clone();
        for c in &chars[..chars.len().saturating_sub(2)] {
            path.push(c.to_string());
        }
        path.push(format!("{pid}.json"));
        path
    }
}

impl CanonicalStore for FileStore {
    fn get(&self, uri: &str) -> Result<CanonicalRecord, StoreError> {
        let pid = pid_from_uri(uri).ok_or_else(|| StoreError::NotFound(uri.to_string()))?;
        let path = self.record_path(pid);
        log::debug!("{uri} -> {}", path.display());
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(uri.to_string()))
            }
            Err(e) => {
                return Err(StoreError::Io {
                    uri: uri.to_string(),
                    message: format!("{}: {e}", path.display()),
                })
            }
        };
        parse_record(uri, &text)
    }
}

// ── HTTP store ──────────────────────────────────────────────────────

/// Fetches `<uri>/json` (or `<base_url>/<pid>/json`) with a blocking
/// client. 404 is NotFound and a request timeout is Timeout; 429 and 5xx
/// are retried with exponential backoff.
pub struct HttpStore {
    http: reqwest::blocking::Client,
    base_url: Option<String>,
    max_retries: u32,
}

impl HttpStore {
    pub fn new(timeout: Duration, base_url: Option<String>) -> Result<Self, IoError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| IoError::Client(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.map(|b| b.trim_end_matches('/').to_string()),
            max_retries: DEFAULT_RETRIES,
        })
    }

    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn record_url(&self, uri: &str) -> Result<String, StoreError> {
        match &self.base_url {
            Some(base) => {
                let pid = pid_from_uri(uri).ok_or_else(|| StoreError::NotFound(uri.to_string()))?;
                Ok(format!("{base}/{pid}/json"))
            }
            None => Ok(format!("{}/json", uri.trim_end_matches('/'))),
        }
    }
}

impl CanonicalStore for HttpStore {
    fn get(&self, uri: &str) -> Result<CanonicalRecord, StoreError> {
        let url = self.record_url(uri)?;
        let mut backoff_secs = 1u64;

        for attempt in 0..=self.max_retries {
            match self.http.get(&url).header("Accept", "application/json").send() {
                Ok(resp) => {
                    let status = resp.status().as_u16();

                    if status == 404 || status == 410 {
                        return Err(StoreError::NotFound(uri.to_string()));
                    }

                    if (status == 429 || status >= 500) && attempt < self.max_retries {
                        log::warn!(
                            "{url}: HTTP {status}, retry {}/{} in {backoff_secs}s",
                            attempt + 1,
                            self.max_retries
                        );
                        thread::sleep(Duration::from_secs(backoff_secs));
                        backoff_secs *= 2;
                        continue;
                    }

                    if !resp.status().is_success() {
                        return Err(StoreError::Http {
                            uri: uri.to_string(),
                            status,
                        });
                    }

                    let text = resp.text().map_err(|e| {
                        if e.is_timeout() {
                            StoreError::Timeout(uri.to_string())
                        } else {
                            StoreError::Io {
                                uri: uri.to_string(),
                                message: e.to_string(),
                            }
                        }
                    })?;
                    return parse_record(uri, &text);
                }
                Err(e) if e.is_timeout() => return Err(StoreError::Timeout(uri.to_string())),
                Err(e) => {
                    if attempt == self.max_retries {
                        return Err(StoreError::Io {
                            uri: uri.to_string(),
                            message: e.to_string(),
                        });
                    }
                    log::warn!("{url}: {e}, retry {}/{} in {backoff_secs}s", attempt + 1, self.max_retries);
                    thread::sleep(Duration::from_secs(backoff_secs));
                    backoff_secs *= 2;
                }
            }
        }

        Err(StoreError::Io {
            uri: uri.to_string(),
            message: "retries exhausted".into(),
        })
    }
}
