//! Dead-code candidate detection.
//!
//! A definition with no incoming dependency edges is a candidate, not
//! proof: dynamic dispatch, reflection, and external callers are invisible
//! to static call extraction. Entry points and underscore-prefixed names
//! are excluded to cut the obvious false positives.

use crate::graph::DependencyGraph;
use crate::indexing::SymbolIndex;
use crate::types::SymbolKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Names that are invoked by convention rather than by an in-repo call.
const ENTRY_POINTS: &[&str] = &["main", "__init__", "__main__", "index", "setup"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadCodeFinding {
    /// Graph key of the unreferenced definition.
    pub symbol: String,
    pub name: String,
    pub kind: SymbolKind,
    pub file_path: PathBuf,
    pub line_number: u32,
    pub reason: String,
}

pub struct DeadCodeDetector;

impl DeadCodeDetector {
    pub fn new() -> Self {
        Self
    }

    /// Definitions nothing in the index depends on, in scan order.
    pub fn find_dead_code(
        &self,
        index: &SymbolIndex,
        graph: &DependencyGraph,
        scope: Option<&Path>,
    ) -> Vec<DeadCodeFinding> {
        let mut findings = Vec::new();

        for symbol in index.all_symbols().filter(|s| s.kind.is_definition()) {
            if let Some(scope) = scope {
                if !symbol.file_path.starts_with(scope) {
                    continue;
                }
            }
            if symbol.name.starts_with('_') {
                continue;
            }
            if ENTRY_POINTS.contains(&symbol.name.as_str()) {
                continue;
            }

            let key = symbol.key();
            let unreferenced = graph
                .node(&key)
                .map(|node| node.depended_by.is_empty())
                .unwrap_or(true);
            if !unreferenced {
                continue;
            }

            findings.push(DeadCodeFinding {
                symbol: key,
                name: symbol.name.clone(),
                kind: symbol.kind,
                file_path: symbol.file_path.clone(),
                line_number: symbol.line_number,
                reason: format!("no references to '{}' found in the index", symbol.name),
            });
        }

        findings
    }
}

impl Default for DeadCodeDetector {
    fn default() -> Self {
        Self::new()
    }
}
