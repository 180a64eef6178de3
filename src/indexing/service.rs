//! The engine façade: owns the current snapshot and the rebuild lifecycle.
//!
//! State machine: `EMPTY → INDEXING → READY`, and `READY → INDEXING →
//! READY` on re-index. Mutation runs under a single-writer mutex; the
//! writer builds the next generation off to the side and atomically swaps
//! the current-snapshot pointer when done. Readers clone the pointer and
//! never observe a half-built graph. A failed rebuild (bad root, exceeded
//! deadline) leaves the previous snapshot current.

use crate::analysis::{
    DeadCodeDetector, DeadCodeFinding, ImpactAnalyzer, ImpactReport, Reference, SymbolLocation,
    SymbolNavigator,
};
use crate::config::Settings;
use crate::error::{IndexError, IndexResult, QueryError, QueryResult};
use crate::graph::GraphBuilder;
use crate::indexing::fingerprint::FingerprintMap;
use crate::indexing::pipeline::{self, FileOutcome};
use crate::indexing::snapshot::Snapshot;
use crate::indexing::walker::FileScanner;
use crate::indexing::{NameMap, SymbolIndex};
use crate::parsing::Language;
use crate::search::{
    PatternSimilarityEngine, QueryCache, SearchResponse, SemanticSearchEngine, SimilarBlock,
};
use crate::types::symbol_key;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexState {
    Empty,
    Indexing,
    Ready,
}

/// Outcome of one `index_codebase` run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_files: usize,
    /// Files extracted this run (new or changed content).
    pub indexed_files: usize,
    /// Files skipped because their fingerprint was unchanged.
    pub reused_files: usize,
    /// Files present in the previous generation but gone from this scan.
    pub removed_files: usize,
    pub total_symbols: usize,
    pub elapsed_ms: u64,
    pub generation: u64,
}

/// Both edge directions of one symbol's graph node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyReport {
    pub symbol: String,
    pub depends_on: Vec<String>,
    pub depended_by: Vec<String>,
    pub dependency_count: usize,
    pub dependent_count: usize,
    /// True when some call names did not resolve inside the index.
    pub has_external_references: bool,
}

/// The codebase intelligence engine.
///
/// One owned instance is shared by reference/handle with callers; all
/// operations are synchronous request/response.
pub struct IndexService {
    settings: Arc<Settings>,
    current: RwLock<Arc<Snapshot>>,
    writer: Mutex<()>,
    state: RwLock<IndexState>,
}

impl IndexService {
    pub fn new(settings: Arc<Settings>) -> Self {
        let cache_capacity = settings.search.cache_capacity;
        Self {
            settings,
            current: RwLock::new(Arc::new(Snapshot::empty(cache_capacity))),
            writer: Mutex::new(()),
            state: RwLock::new(IndexState::Empty),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(Arc::new(Settings::default()))
    }

    pub fn state(&self) -> IndexState {
        *self.state.read()
    }

    /// The last fully-built generation. Queries hold this for their whole
    /// run, so a concurrent rebuild never changes their view.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().clone()
    }

    /// Full or incremental rebuild of the index and dependency graph.
    ///
    /// Extensions and exclude directories default to the configured sets.
    /// Unchanged files (by content fingerprint) keep their symbols and
    /// their graph edges; changed files are re-extracted and re-spliced.
    pub fn index_codebase(
        &self,
        root: &Path,
        extensions: Option<&[String]>,
        exclude_dirs: Option<&[String]>,
    ) -> IndexResult<IndexStats> {
        let _writer = self.writer.lock();
        let start = Instant::now();

        if !root.is_dir() {
            return Err(IndexError::InvalidRoot(root.to_path_buf()));
        }

        let previous = self.snapshot();
        let prior_state = self.state();
        *self.state.write() = IndexState::Indexing;

        let result = self.rebuild(root, extensions, exclude_dirs, &previous, start);
        match result {
            Ok(stats) => {
                *self.state.write() = IndexState::Ready;
                Ok(stats)
            }
            Err(e) => {
                // Fail-soft: previous snapshot stays current.
                *self.state.write() = prior_state;
                Err(e)
            }
        }
    }

    fn rebuild(
        &self,
        root: &Path,
        extensions: Option<&[String]>,
        exclude_dirs: Option<&[String]>,
        previous: &Snapshot,
        start: Instant,
    ) -> IndexResult<IndexStats> {
        let extensions = extensions.unwrap_or(&self.settings.indexing.extensions);
        let exclude_dirs = exclude_dirs.unwrap_or(&self.settings.indexing.exclude_dirs);
        let scanner = FileScanner::new(extensions, exclude_dirs);
        let budget = Duration::from_secs(self.settings.indexing.max_index_seconds);

        // Incremental reuse only holds against the same root.
        let same_root = previous.is_built() && previous.root == root;
        let no_fingerprints = FingerprintMap::new();
        let prev_fingerprints = if same_root {
            &previous.fingerprints
        } else {
            &no_fingerprints
        };

        let collected = pipeline::run_extraction(
            root,
            &scanner,
            prev_fingerprints,
            self.settings.indexing.parallel_threads,
            budget,
        )?;

        let mut index = SymbolIndex::new();
        let mut fingerprints = FingerprintMap::new();
        let mut changed: Vec<PathBuf> = Vec::new();
        let mut reused_files = 0usize;

        for file in collected {
            let symbols = match file.outcome {
                FileOutcome::Reused => {
                    reused_files += 1;
                    previous
                        .index
                        .symbols_of(&file.rel_path)
                        .map(|s| s.to_vec())
                        .unwrap_or_default()
                }
                FileOutcome::Extracted(symbols) => {
                    changed.push(file.rel_path.clone());
                    symbols
                }
            };
            fingerprints.insert(file.rel_path.clone(), file.hash);
            index.upsert(file.rel_path, symbols);
        }

        let removed: Vec<PathBuf> = if same_root {
            previous
                .index
                .files()
                .filter(|f| !index.contains_file(f))
                .cloned()
                .collect()
        } else {
            Vec::new()
        };

        let names = NameMap::build(&index);
        let graph = if same_root {
            GraphBuilder::splice(&previous.graph, &index, &names, &changed, &removed)
        } else {
            GraphBuilder::build(&index, &names)
        };

        let stats = IndexStats {
            total_files: index.file_count(),
            indexed_files: changed.len(),
            reused_files,
            removed_files: removed.len(),
            total_symbols: index.symbol_count(),
            elapsed_ms: start.elapsed().as_millis() as u64,
            generation: previous.generation + 1,
        };

        tracing::info!(
            "indexed {} files ({} extracted, {} reused, {} removed), {} symbols in {}ms",
            stats.total_files,
            stats.indexed_files,
            stats.reused_files,
            stats.removed_files,
            stats.total_symbols,
            stats.elapsed_ms
        );

        let snapshot = Snapshot {
            generation: previous.generation + 1,
            root: root.to_path_buf(),
            index,
            graph,
            names,
            fingerprints,
            search_cache: Mutex::new(QueryCache::new(self.settings.search.cache_capacity)),
        };
        *self.current.write() = Arc::new(snapshot);

        Ok(stats)
    }

    /// Reset to the empty pre-build state. Mostly for tests.
    pub fn clear(&self) {
        let _writer = self.writer.lock();
        *self.current.write() =
            Arc::new(Snapshot::empty(self.settings.search.cache_capacity));
        *self.state.write() = IndexState::Empty;
    }

    /// Ranked free-text search over indexed symbols.
    pub fn semantic_search(
        &self,
        query: &str,
        scope: Option<&Path>,
        max_results: Option<usize>,
    ) -> QueryResult<SearchResponse> {
        let snapshot = self.built_snapshot()?;
        let engine = SemanticSearchEngine::new(
            self.settings.search.context_lines,
            self.settings.search.score_threshold,
        );
        Ok(engine.search(
            &snapshot.index,
            &snapshot.search_cache,
            &snapshot.root,
            query,
            scope,
            max_results.unwrap_or(self.settings.search.max_results),
        ))
    }

    /// Jaccard-ranked code blocks similar to a snippet.
    pub fn find_similar_patterns(
        &self,
        snippet: &str,
        language: Option<Language>,
        threshold: Option<f32>,
    ) -> QueryResult<Vec<SimilarBlock>> {
        let snapshot = self.built_snapshot()?;
        let engine = PatternSimilarityEngine::new();
        Ok(engine.find_similar(
            &snapshot.index,
            &snapshot.root,
            snippet,
            language,
            threshold.unwrap_or(self.settings.search.similarity_threshold),
        ))
    }

    /// Both edge directions of one symbol.
    pub fn analyze_dependencies(
        &self,
        name: &str,
        file_path: Option<&Path>,
    ) -> QueryResult<DependencyReport> {
        let snapshot = self.built_snapshot()?;
        let key = resolve_key(&snapshot, name, file_path)?;
        let node = snapshot
            .graph
            .node(&key)
            .ok_or_else(|| QueryError::SymbolNotFound(key.clone()))?;

        Ok(DependencyReport {
            symbol: node.key.clone(),
            depends_on: node.depends_on.iter().cloned().collect(),
            depended_by: node.depended_by.iter().cloned().collect(),
            dependency_count: node.depends_on.len(),
            dependent_count: node.depended_by.len(),
            has_external_references: node.is_external,
        })
    }

    /// Blast radius of changing a symbol: reverse-reachability BFS.
    pub fn impact_analysis(
        &self,
        name: &str,
        file_path: Option<&Path>,
    ) -> QueryResult<ImpactReport> {
        let snapshot = self.built_snapshot()?;
        let key = resolve_key(&snapshot, name, file_path)?;
        ImpactAnalyzer::new().impact_of(&snapshot.graph, &key)
    }

    /// Symbols with no incoming dependency edges (heuristic, not proof).
    pub fn detect_dead_code(&self, scope: Option<&Path>) -> QueryResult<Vec<DeadCodeFinding>> {
        let snapshot = self.built_snapshot()?;
        Ok(DeadCodeDetector::new().find_dead_code(&snapshot.index, &snapshot.graph, scope))
    }

    /// Exact-name definition lookup; may match in several files.
    pub fn find_definition(&self, name: &str) -> QueryResult<Vec<SymbolLocation>> {
        let snapshot = self.built_snapshot()?;
        Ok(SymbolNavigator::new().find_definition(&snapshot.index, &snapshot.names, name))
    }

    /// Callers of a symbol, resolved back to locations.
    pub fn find_references(
        &self,
        name: &str,
        file_path: Option<&Path>,
    ) -> QueryResult<Vec<Reference>> {
        let snapshot = self.built_snapshot()?;
        let key = resolve_key(&snapshot, name, file_path)?;
        SymbolNavigator::new().find_references(
            &snapshot.index,
            &snapshot.names,
            &snapshot.graph,
            &key,
        )
    }

    fn built_snapshot(&self) -> QueryResult<Arc<Snapshot>> {
        let snapshot = self.snapshot();
        if !snapshot.is_built() {
            return Err(QueryError::IndexNotBuilt);
        }
        Ok(snapshot)
    }
}

/// Resolve a bare symbol name (plus optional file) to a graph key.
///
/// With a file the key is exact; without one the first function/class
/// definition in scan order wins, the documented tie-break.
fn resolve_key(snapshot: &Snapshot, name: &str, file_path: Option<&Path>) -> QueryResult<String> {
    match file_path {
        Some(file) => {
            let key = symbol_key(file, name);
            if snapshot.graph.contains(&key) {
                Ok(key)
            } else {
                Err(QueryError::SymbolNotFound(key))
            }
        }
        None => snapshot
            .names
            .resolve_definition(name)
            .map(|entry| symbol_key(&entry.file_path, name))
            .ok_or_else(|| QueryError::SymbolNotFound(name.to_string())),
    }
}
