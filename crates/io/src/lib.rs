// File and network I/O around the reconciliation engine

pub mod cache;
pub mod error;
pub mod output;
pub mod raw;
pub mod store;

pub use cache::DatasetCache;
pub use error::IoError;
pub use store::{FileStore, HttpStore};

/// Dataset cache snapshot version.
/// Increment when the snapshot shape changes in a way old versions can't read.
pub const CACHE_FORMAT_VERSION: u32 = 1;
