//! Indexing: file discovery, the extraction pipeline, symbol storage, and
//! the service façade that ties the generations together.

pub mod fingerprint;
pub(crate) mod pipeline;
pub mod service;
pub mod snapshot;
pub mod symbol_index;
pub mod walker;

pub use fingerprint::{FingerprintMap, content_hash};
pub use service::{DependencyReport, IndexService, IndexState, IndexStats};
pub use snapshot::Snapshot;
pub use symbol_index::{NameEntry, NameMap, SymbolIndex};
pub use walker::{FileScanner, ScannedFile};
