//! Core data types shared across the engine.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Kind of an indexed symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Class,
    Import,
}

impl SymbolKind {
    /// Whether this kind participates in the dependency graph.
    ///
    /// Imports are indexed for navigation but never become graph nodes.
    pub fn is_definition(&self) -> bool {
        matches!(self, SymbolKind::Function | SymbolKind::Class)
    }
}

/// An indexed function, class, or import statement with file/line provenance.
///
/// Symbols are created during extraction of one file and replaced wholesale
/// when that file is re-extracted. The `SymbolIndex` entry for the file is
/// the sole owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub file_path: PathBuf,
    /// 1-based line of the definition.
    pub line_number: u32,
    /// The definition header line, trimmed.
    pub definition_text: String,
    pub docstring: Option<String>,
    /// Bare names called from this symbol's body, in source order.
    ///
    /// Syntactic best-effort: dynamically dispatched calls are missed and
    /// regex-level extractors leave this empty.
    pub call_dependencies: IndexSet<String>,
}

impl Symbol {
    /// Graph key for this symbol: `file_path::name`.
    pub fn key(&self) -> String {
        symbol_key(&self.file_path, &self.name)
    }
}

/// Build the canonical `file::symbol` graph key.
pub fn symbol_key(file_path: &Path, name: &str) -> String {
    format!("{}::{}", file_path.display(), name)
}

/// Split a graph key back into its file path and symbol name.
///
/// Splits on the last `::` so paths containing `::` (unlikely but legal)
/// keep their prefix intact.
pub fn split_key(key: &str) -> Option<(&str, &str)> {
    key.rsplit_once("::")
}

/// How a search result matched the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Semantic,
    Pattern,
    Fuzzy,
}

/// One ranked hit from a search query. Produced transiently; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub file_path: PathBuf,
    pub line_number: u32,
    pub matched_text: String,
    pub context_before: Vec<String>,
    pub context_after: Vec<String>,
    /// Always within `[0.0, 1.0]`.
    pub relevance_score: f32,
    pub match_type: MatchType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_key_round_trip() {
        let key = symbol_key(Path::new("src/a.py"), "foo");
        assert_eq!(key, "src/a.py::foo");

        let (file, name) = split_key(&key).unwrap();
        assert_eq!(file, "src/a.py");
        assert_eq!(name, "foo");
    }

    #[test]
    fn test_split_key_uses_last_separator() {
        let (file, name) = split_key("weird::dir/a.py::foo").unwrap();
        assert_eq!(file, "weird::dir/a.py");
        assert_eq!(name, "foo");
    }

    #[test]
    fn test_import_is_not_a_definition() {
        assert!(SymbolKind::Function.is_definition());
        assert!(SymbolKind::Class.is_definition());
        assert!(!SymbolKind::Import.is_definition());
    }
}
