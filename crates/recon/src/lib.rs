//! `sidebar-recon`: gazetteer reciprocity reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded raw records and a canonical-record
//! store, returns the sidebar and unreciprocated maps.
//! No CLI or IO dependencies.

pub mod adapters;
pub mod aggregate;
pub mod canonical;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod identity;
pub mod item;
pub mod lpf;
pub mod model;
pub mod namespace;
pub mod reciprocity;
pub mod text;

pub use adapters::{AdapterRegistry, RawFormat, SourceAdapter};
pub use canonical::{CanonicalRecord, CanonicalStore, MemoryStore, RecordCache};
pub use config::SidebarConfig;
pub use dataset::SourceIndex;
pub use engine::{build_index, run};
pub use error::{ItemError, ReconError, StoreError, UriError};
pub use identity::{normalize_uri, IdentityKey};
pub use item::{Item, Link};
pub use lpf::{Feature, FeatureCollection};
pub use model::{PreparedSource, ReconResult, ReconSummary};
pub use namespace::NamespaceTable;
