//! Immutable index generations.
//!
//! A snapshot is a fully-built index + graph version that queries read
//! against while the next generation is being built. The writer swaps a
//! single current-snapshot pointer when a rebuild completes, so in-flight
//! queries keep the old, consistent view until they finish. The search
//! cache belongs to the generation and dies with it.

use crate::graph::DependencyGraph;
use crate::indexing::fingerprint::FingerprintMap;
use crate::indexing::{NameMap, SymbolIndex};
use crate::search::{QueryCache, ScoredHit};
use parking_lot::Mutex;
use std::path::PathBuf;

pub struct Snapshot {
    /// 0 only for the pre-first-build empty snapshot.
    pub generation: u64,
    /// Root the index was built from; file paths are relative to it.
    pub root: PathBuf,
    pub index: SymbolIndex,
    pub graph: DependencyGraph,
    pub names: NameMap,
    pub fingerprints: FingerprintMap,
    /// Per-generation (query, scope) result cache.
    pub(crate) search_cache: Mutex<QueryCache<Vec<ScoredHit>>>,
}

impl Snapshot {
    /// The empty generation queries see before any successful build.
    pub fn empty(cache_capacity: usize) -> Self {
        Self {
            generation: 0,
            root: PathBuf::new(),
            index: SymbolIndex::new(),
            graph: DependencyGraph::new(),
            names: NameMap::default(),
            fingerprints: FingerprintMap::new(),
            search_cache: Mutex::new(QueryCache::new(cache_capacity)),
        }
    }

    /// Whether any build has ever completed.
    pub fn is_built(&self) -> bool {
        self.generation > 0
    }
}
