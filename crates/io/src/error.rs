use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("cannot read {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    #[error("cannot write {}: {message}", path.display())]
    Write { path: PathBuf, message: String },

    #[error("cannot parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("dataset cache: {0}")]
    Cache(String),

    #[error("HTTP client: {0}")]
    Client(String),
}

impl IoError {
    pub(crate) fn read(path: &Path, e: impl ToString) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    }

    pub(crate) fn write(path: &Path, e: impl ToString) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    }

    pub(crate) fn parse(path: &Path, e: impl ToString) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    }
}
