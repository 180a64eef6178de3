//! Codebase intelligence engine: indexes source trees, builds a cross-file
//! dependency graph, and answers structural queries about the code.
//!
//! The [`IndexService`] is the single entry point. Build an index with
//! [`IndexService::index_codebase`], then query it:
//!
//! ```no_run
//! use codeintel::IndexService;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let service = IndexService::with_defaults();
//! service.index_codebase(Path::new("."), None, None)?;
//!
//! let response = service.semantic_search("parse config", None, None)?;
//! for hit in &response.results {
//!     println!("{}:{} {}", hit.file_path.display(), hit.line_number, hit.matched_text);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Queries never block indexing and vice versa: readers hold an immutable
//! snapshot generation while the writer builds the next one off to the
//! side.

pub mod analysis;
pub mod config;
pub mod error;
pub mod graph;
pub mod indexing;
pub mod logging;
pub mod parsing;
pub mod search;
pub mod types;

pub use analysis::{
    DeadCodeDetector, DeadCodeFinding, ImpactAnalyzer, ImpactReport, Reference, SymbolLocation,
    SymbolNavigator,
};
pub use config::Settings;
pub use error::{IndexError, IndexResult, QueryError, QueryResult};
pub use graph::{DependencyGraph, DependencyNode, GraphBuilder};
pub use indexing::{DependencyReport, IndexService, IndexState, IndexStats, SymbolIndex};
pub use parsing::{ExtractorRegistry, Language, LanguageExtractor};
pub use search::{SearchResponse, SimilarBlock};
pub use types::{MatchType, SearchResult, Symbol, SymbolKind};
