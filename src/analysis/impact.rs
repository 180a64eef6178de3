//! Change-impact analysis.
//!
//! Breadth-first traversal along reverse dependency edges (`depended_by`):
//! everything transitively reachable would be affected by a change to the
//! origin symbol. The visited set includes the origin, so cycles terminate
//! and the origin never counts itself as affected.

use crate::error::{QueryError, QueryResult};
use crate::graph::DependencyGraph;
use crate::types::split_key;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactReport {
    /// The symbol whose change is being analyzed, as a graph key.
    pub symbol: String,
    /// Transitively affected symbols in BFS order (nearest first).
    pub affected_symbols: Vec<String>,
    /// Distinct files owning affected symbols, deduplicated in BFS order.
    pub affected_files: Vec<PathBuf>,
    /// Count of distinct affected symbols, origin excluded.
    pub impact_score: usize,
}

pub struct ImpactAnalyzer;

impl ImpactAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn impact_of(&self, graph: &DependencyGraph, key: &str) -> QueryResult<ImpactReport> {
        let origin = graph
            .node(key)
            .ok_or_else(|| QueryError::SymbolNotFound(key.to_string()))?;

        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(origin.key.clone());

        let mut queue: VecDeque<String> = origin.depended_by.iter().cloned().collect();
        let mut affected_symbols: Vec<String> = Vec::new();
        let mut affected_files: Vec<PathBuf> = Vec::new();
        let mut seen_files: HashSet<PathBuf> = HashSet::new();

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }
            if let Some((file, _)) = split_key(&current) {
                let file = PathBuf::from(file);
                if seen_files.insert(file.clone()) {
                    affected_files.push(file);
                }
            }
            if let Some(node) = graph.node(&current) {
                for owner in &node.depended_by {
                    if !visited.contains(owner) {
                        queue.push_back(owner.clone());
                    }
                }
            }
            affected_symbols.push(current);
        }

        let impact_score = affected_symbols.len();
        Ok(ImpactReport {
            symbol: origin.key.clone(),
            affected_symbols,
            affected_files,
            impact_score,
        })
    }
}

impl Default for ImpactAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::indexing::{NameMap, SymbolIndex};
    use crate::types::{Symbol, SymbolKind};
    use indexmap::IndexSet;

    fn symbol(name: &str, file: &str, calls: &[&str]) -> Symbol {
        Symbol {
            name: name.to_string(),
            kind: SymbolKind::Function,
            file_path: PathBuf::from(file),
            line_number: 1,
            definition_text: format!("def {name}():"),
            docstring: None,
            call_dependencies: calls.iter().map(|c| c.to_string()).collect::<IndexSet<_>>(),
        }
    }

    fn graph_of(files: &[(&str, Vec<Symbol>)]) -> DependencyGraph {
        let mut index = SymbolIndex::new();
        for (file, symbols) in files {
            index.upsert(PathBuf::from(file), symbols.clone());
        }
        let names = NameMap::build(&index);
        GraphBuilder::build(&index, &names)
    }

    #[test]
    fn test_impact_is_transitive() {
        // c calls b, b calls a: changing a affects b then c.
        let graph = graph_of(&[
            ("a.py", vec![symbol("a", "a.py", &[])]),
            ("b.py", vec![symbol("b", "b.py", &["a"])]),
            ("c.py", vec![symbol("c", "c.py", &["b"])]),
        ]);
        let report = ImpactAnalyzer::new().impact_of(&graph, "a.py::a").unwrap();

        assert_eq!(report.affected_symbols, vec!["b.py::b", "c.py::c"]);
        assert_eq!(report.impact_score, 2);
        assert_eq!(
            report.affected_files,
            vec![PathBuf::from("b.py"), PathBuf::from("c.py")]
        );
    }

    #[test]
    fn test_leaf_symbol_has_zero_impact() {
        let graph = graph_of(&[("a.py", vec![symbol("a", "a.py", &[])])]);
        let report = ImpactAnalyzer::new().impact_of(&graph, "a.py::a").unwrap();
        assert!(report.affected_symbols.is_empty());
        assert_eq!(report.impact_score, 0);
    }

    #[test]
    fn test_cycles_terminate_and_exclude_origin() {
        // a calls b, b calls a.
        let graph = graph_of(&[
            ("a.py", vec![symbol("a", "a.py", &["b"])]),
            ("b.py", vec![symbol("b", "b.py", &["a"])]),
        ]);
        let report = ImpactAnalyzer::new().impact_of(&graph, "a.py::a").unwrap();

        assert_eq!(report.affected_symbols, vec!["b.py::b"]);
        assert_eq!(report.impact_score, 1);
    }

    #[test]
    fn test_unknown_symbol_is_not_found() {
        let graph = DependencyGraph::new();
        assert!(matches!(
            ImpactAnalyzer::new().impact_of(&graph, "x.py::missing"),
            Err(QueryError::SymbolNotFound(_))
        ));
    }

    #[test]
    fn test_diamond_counts_each_symbol_once() {
        // b and c both call a; d calls both b and c.
        let graph = graph_of(&[
            ("a.py", vec![symbol("a", "a.py", &[])]),
            ("b.py", vec![symbol("b", "b.py", &["a"])]),
            ("c.py", vec![symbol("c", "c.py", &["a"])]),
            ("d.py", vec![symbol("d", "d.py", &["b", "c"])]),
        ]);
        let report = ImpactAnalyzer::new().impact_of(&graph, "a.py::a").unwrap();
        assert_eq!(report.impact_score, 3);
        assert_eq!(
            report
                .affected_symbols
                .iter()
                .filter(|s| s.as_str() == "d.py::d")
                .count(),
            1
        );
    }
}
