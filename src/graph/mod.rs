//! Cross-file dependency graph.
//!
//! Nodes are keyed `file_path::symbol_name` and carry both edge directions;
//! edges are always inserted as a pair, so for any nodes A and B,
//! `B ∈ A.depends_on ⇔ A ∈ B.depended_by`.
//!
//! Call names are resolved against the symbol index by bare name, first
//! match in scan order. Unresolvable names never produce invented nodes or
//! edges: they are recorded in a per-owner unresolved ledger (the owner is
//! marked `is_external`) so incremental re-splices can retry them when new
//! symbols appear.

use crate::indexing::{NameMap, SymbolIndex};
use crate::types::{Symbol, split_key, symbol_key};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyNode {
    pub key: String,
    pub depends_on: IndexSet<String>,
    pub depended_by: IndexSet<String>,
    /// True when at least one call name of this symbol did not resolve
    /// inside the index.
    pub is_external: bool,
}

impl DependencyNode {
    fn new(key: String) -> Self {
        Self {
            key,
            depends_on: IndexSet::new(),
            depended_by: IndexSet::new(),
            is_external: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyGraph {
    nodes: IndexMap<String, DependencyNode>,
    /// Owner key → call names that failed to resolve.
    unresolved: IndexMap<String, IndexSet<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, key: &str) -> Option<&DependencyNode> {
        self.nodes.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &DependencyNode> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn unresolved_names(&self, owner: &str) -> Option<&IndexSet<String>> {
        self.unresolved.get(owner)
    }

    fn ensure_node(&mut self, key: &str) -> &mut DependencyNode {
        self.nodes
            .entry(key.to_string())
            .or_insert_with(|| DependencyNode::new(key.to_string()))
    }

    /// Insert a `from depends_on to` edge, always as a pair.
    fn insert_edge(&mut self, from: &str, to: &str) {
        self.ensure_node(from).depends_on.insert(to.to_string());
        self.ensure_node(to).depended_by.insert(from.to_string());
    }

    fn note_unresolved(&mut self, owner: &str, name: &str) {
        self.ensure_node(owner).is_external = true;
        self.unresolved
            .entry(owner.to_string())
            .or_default()
            .insert(name.to_string());
    }

    fn clear_unresolved(&mut self, owner: &str, name: &str) {
        let empty = match self.unresolved.get_mut(owner) {
            Some(names) => {
                names.shift_remove(name);
                names.is_empty()
            }
            None => return,
        };
        if empty {
            self.unresolved.shift_remove(owner);
            if let Some(node) = self.nodes.get_mut(owner) {
                node.is_external = false;
            }
        }
    }

    /// Remove every node owned by one of `files`, unwiring both edge
    /// directions. Incoming edges from surviving owners are returned so
    /// the caller can reattach them after the files are rebuilt.
    fn detach_files(&mut self, files: &HashSet<String>) -> Vec<(String, String)> {
        let detached: Vec<String> = self
            .nodes
            .keys()
            .filter(|key| key_belongs_to(key, files))
            .cloned()
            .collect();
        let detached_set: HashSet<&String> = detached.iter().collect();

        let mut preserved = Vec::new();
        for key in &detached {
            let node = match self.nodes.get(key) {
                Some(node) => node.clone(),
                None => continue,
            };

            for dep in &node.depends_on {
                if !detached_set.contains(dep) {
                    if let Some(target) = self.nodes.get_mut(dep) {
                        target.depended_by.shift_remove(key);
                    }
                }
            }
            for owner in &node.depended_by {
                if !detached_set.contains(owner) {
                    if let Some(source) = self.nodes.get_mut(owner) {
                        source.depends_on.shift_remove(key);
                    }
                    preserved.push((owner.clone(), key.clone()));
                }
            }
        }

        for key in &detached {
            self.nodes.shift_remove(key);
            self.unresolved.shift_remove(key);
        }
        preserved
    }
}

/// Builds and re-splices dependency graphs from a symbol index.
pub struct GraphBuilder;

impl GraphBuilder {
    /// Full build: one node per function/class symbol, edges resolved by
    /// bare name against the pre-indexed name map (avoids the O(S²)
    /// resolution scan).
    pub fn build(index: &SymbolIndex, names: &NameMap) -> DependencyGraph {
        let mut graph = DependencyGraph::new();

        for symbol in index.all_symbols().filter(|s| s.kind.is_definition()) {
            graph.ensure_node(&symbol.key());
        }
        for symbol in index.all_symbols().filter(|s| s.kind.is_definition()) {
            Self::wire_symbol(&mut graph, symbol, names);
        }
        graph
    }

    /// Incremental rebuild: recompute only the edges owned by changed
    /// files, leave edges owned by unchanged files intact.
    ///
    /// Incoming edges into a changed file are preserved and reattached if
    /// their target still exists after re-extraction; otherwise the owner's
    /// call falls back into the unresolved ledger. Names that previously
    /// failed to resolve are retried against the changed files' new
    /// symbols.
    pub fn splice(
        previous: &DependencyGraph,
        index: &SymbolIndex,
        names: &NameMap,
        changed: &[PathBuf],
        removed: &[PathBuf],
    ) -> DependencyGraph {
        let mut graph = previous.clone();

        let detached_files: HashSet<String> = changed
            .iter()
            .chain(removed.iter())
            .map(|p| p.display().to_string())
            .collect();
        let preserved = graph.detach_files(&detached_files);

        // Rebuild the changed files' nodes and outgoing edges.
        for file in changed {
            let Some(symbols) = index.symbols_of(file) else {
                continue;
            };
            for symbol in symbols.iter().filter(|s| s.kind.is_definition()) {
                graph.ensure_node(&symbol.key());
            }
            for symbol in symbols.iter().filter(|s| s.kind.is_definition()) {
                Self::wire_symbol(&mut graph, symbol, names);
            }
        }

        // Reattach preserved incoming edges. A target deleted along with
        // its file may still resolve elsewhere (another definition of the
        // same name survives), so re-resolve before giving the edge up to
        // the unresolved ledger.
        for (owner, target) in preserved {
            if !graph.contains(&owner) {
                continue;
            }
            if graph.contains(&target) {
                graph.insert_edge(&owner, &target);
            } else if let Some((_, name)) = split_key(&target) {
                match names.resolve_definition(name) {
                    Some(entry) => {
                        let new_target = symbol_key(&entry.file_path, name);
                        if new_target != owner {
                            graph.insert_edge(&owner, &new_target);
                        }
                    }
                    None => {
                        let name = name.to_string();
                        graph.note_unresolved(&owner, &name);
                    }
                }
            }
        }

        // Retry previously-unresolved names against the new symbols.
        let new_names: HashSet<&str> = changed
            .iter()
            .filter_map(|f| index.symbols_of(f))
            .flatten()
            .filter(|s| s.kind.is_definition())
            .map(|s| s.name.as_str())
            .collect();

        let retries: Vec<(String, String)> = graph
            .unresolved
            .iter()
            .flat_map(|(owner, names)| {
                names
                    .iter()
                    .filter(|n| new_names.contains(n.as_str()))
                    .map(|n| (owner.clone(), n.clone()))
                    .collect::<Vec<_>>()
            })
            .collect();

        for (owner, name) in retries {
            if let Some(entry) = names.resolve_definition(&name) {
                let target = symbol_key(&entry.file_path, &name);
                if target != owner {
                    graph.insert_edge(&owner, &target);
                }
                graph.clear_unresolved(&owner, &name);
            }
        }

        graph
    }

    fn wire_symbol(graph: &mut DependencyGraph, symbol: &Symbol, names: &NameMap) {
        let from = symbol.key();
        for name in &symbol.call_dependencies {
            match names.resolve_definition(name) {
                Some(entry) => {
                    let to = symbol_key(&entry.file_path, name);
                    // Self-recursion is not a dependency edge.
                    if to != from {
                        graph.insert_edge(&from, &to);
                    }
                }
                None => graph.note_unresolved(&from, name),
            }
        }
    }
}

fn key_belongs_to(key: &str, files: &HashSet<String>) -> bool {
    split_key(key).is_some_and(|(file, _)| files.contains(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SymbolKind;

    fn symbol(name: &str, file: &str, calls: &[&str]) -> Symbol {
        Symbol {
            name: name.to_string(),
            kind: SymbolKind::Function,
            file_path: PathBuf::from(file),
            line_number: 1,
            definition_text: format!("def {name}():"),
            docstring: None,
            call_dependencies: calls.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn index_of(files: &[(&str, Vec<Symbol>)]) -> (SymbolIndex, NameMap) {
        let mut index = SymbolIndex::new();
        for (file, symbols) in files {
            index.upsert(PathBuf::from(file), symbols.clone());
        }
        let names = NameMap::build(&index);
        (index, names)
    }

    fn assert_edge_symmetry(graph: &DependencyGraph) {
        for node in graph.nodes() {
            for dep in &node.depends_on {
                let target = graph.node(dep).expect("edge target must exist");
                assert!(
                    target.depended_by.contains(&node.key),
                    "asymmetric edge {} -> {}",
                    node.key,
                    dep
                );
            }
            for owner in &node.depended_by {
                let source = graph.node(owner).expect("edge owner must exist");
                assert!(source.depends_on.contains(&node.key));
            }
        }
    }

    #[test]
    fn test_build_resolves_cross_file_calls() {
        let (index, names) = index_of(&[
            ("a.py", vec![symbol("foo", "a.py", &[])]),
            ("b.py", vec![symbol("bar", "b.py", &["foo"])]),
        ]);
        let graph = GraphBuilder::build(&index, &names);

        let bar = graph.node("b.py::bar").unwrap();
        assert_eq!(bar.depends_on.first().map(String::as_str), Some("a.py::foo"));
        let foo = graph.node("a.py::foo").unwrap();
        assert_eq!(foo.depended_by.first().map(String::as_str), Some("b.py::bar"));
        assert_edge_symmetry(&graph);
    }

    #[test]
    fn test_unresolved_names_drop_edges_and_mark_external() {
        let (index, names) = index_of(&[(
            "a.py",
            vec![symbol("caller", "a.py", &["requests_get"])],
        )]);
        let graph = GraphBuilder::build(&index, &names);

        let caller = graph.node("a.py::caller").unwrap();
        assert!(caller.depends_on.is_empty());
        assert!(caller.is_external);
        assert!(!graph.contains("requests_get"));
        assert!(
            graph
                .unresolved_names("a.py::caller")
                .unwrap()
                .contains("requests_get")
        );
    }

    #[test]
    fn test_first_match_resolution_follows_scan_order() {
        let (index, names) = index_of(&[
            ("a.py", vec![symbol("helper", "a.py", &[])]),
            ("b.py", vec![symbol("helper", "b.py", &[])]),
            ("c.py", vec![symbol("caller", "c.py", &["helper"])]),
        ]);
        let graph = GraphBuilder::build(&index, &names);

        let caller = graph.node("c.py::caller").unwrap();
        assert!(caller.depends_on.contains("a.py::helper"));
        assert!(!caller.depends_on.contains("b.py::helper"));
    }

    #[test]
    fn test_self_recursion_is_not_an_edge() {
        let (index, names) = index_of(&[("a.py", vec![symbol("loop", "a.py", &["loop"])])]);
        let graph = GraphBuilder::build(&index, &names);
        let node = graph.node("a.py::loop").unwrap();
        assert!(node.depends_on.is_empty());
        assert!(node.depended_by.is_empty());
    }

    #[test]
    fn test_splice_recomputes_only_changed_file_edges() {
        let (index, names) = index_of(&[
            ("a.py", vec![symbol("foo", "a.py", &[])]),
            ("b.py", vec![symbol("bar", "b.py", &["foo"])]),
        ]);
        let graph = GraphBuilder::build(&index, &names);

        // b.py changes: bar now also calls a new local function.
        let (new_index, new_names) = index_of(&[
            ("a.py", vec![symbol("foo", "a.py", &[])]),
            (
                "b.py",
                vec![
                    symbol("bar", "b.py", &["foo", "baz"]),
                    symbol("baz", "b.py", &[]),
                ],
            ),
        ]);
        let spliced = GraphBuilder::splice(
            &graph,
            &new_index,
            &new_names,
            &[PathBuf::from("b.py")],
            &[],
        );

        let bar = spliced.node("b.py::bar").unwrap();
        assert!(bar.depends_on.contains("a.py::foo"));
        assert!(bar.depends_on.contains("b.py::baz"));
        assert_edge_symmetry(&spliced);

        // Full rebuild agrees.
        let full = GraphBuilder::build(&new_index, &new_names);
        assert_eq!(spliced, full);
    }

    #[test]
    fn test_splice_preserves_incoming_edges_into_changed_file() {
        let (index, names) = index_of(&[
            ("a.py", vec![symbol("foo", "a.py", &[])]),
            ("b.py", vec![symbol("bar", "b.py", &["foo"])]),
        ]);
        let graph = GraphBuilder::build(&index, &names);

        // a.py changes but foo survives.
        let (new_index, new_names) = index_of(&[
            (
                "a.py",
                vec![symbol("foo", "a.py", &[]), symbol("extra", "a.py", &[])],
            ),
            ("b.py", vec![symbol("bar", "b.py", &["foo"])]),
        ]);
        let spliced = GraphBuilder::splice(
            &graph,
            &new_index,
            &new_names,
            &[PathBuf::from("a.py")],
            &[],
        );

        let foo = spliced.node("a.py::foo").unwrap();
        assert!(foo.depended_by.contains("b.py::bar"));
        assert_edge_symmetry(&spliced);
    }

    #[test]
    fn test_splice_handles_deleted_target() {
        let (index, names) = index_of(&[
            ("a.py", vec![symbol("foo", "a.py", &[])]),
            ("b.py", vec![symbol("bar", "b.py", &["foo"])]),
        ]);
        let graph = GraphBuilder::build(&index, &names);

        // a.py is deleted entirely.
        let (new_index, new_names) =
            index_of(&[("b.py", vec![symbol("bar", "b.py", &["foo"])])]);
        let spliced =
            GraphBuilder::splice(&graph, &new_index, &new_names, &[], &[PathBuf::from("a.py")]);

        assert!(!spliced.contains("a.py::foo"));
        let bar = spliced.node("b.py::bar").unwrap();
        assert!(bar.depends_on.is_empty());
        assert!(bar.is_external);
        assert_edge_symmetry(&spliced);
    }

    #[test]
    fn test_splice_reresolves_edge_when_duplicate_definition_survives() {
        // foo is defined in both a.py and c.py; bar resolves to a.py::foo
        // (first match). Deleting a.py must re-resolve bar's call to
        // c.py::foo, not degrade it to unresolved.
        let (index, names) = index_of(&[
            ("a.py", vec![symbol("foo", "a.py", &[])]),
            ("b.py", vec![symbol("bar", "b.py", &["foo"])]),
            ("c.py", vec![symbol("foo", "c.py", &[])]),
        ]);
        let graph = GraphBuilder::build(&index, &names);
        assert!(graph.node("b.py::bar").unwrap().depends_on.contains("a.py::foo"));

        let (new_index, new_names) = index_of(&[
            ("b.py", vec![symbol("bar", "b.py", &["foo"])]),
            ("c.py", vec![symbol("foo", "c.py", &[])]),
        ]);
        let spliced =
            GraphBuilder::splice(&graph, &new_index, &new_names, &[], &[PathBuf::from("a.py")]);

        let bar = spliced.node("b.py::bar").unwrap();
        assert_eq!(bar.depends_on.first().map(String::as_str), Some("c.py::foo"));
        assert!(!bar.is_external);
        assert_edge_symmetry(&spliced);

        let full = GraphBuilder::build(&new_index, &new_names);
        assert_eq!(spliced, full);
    }

    #[test]
    fn test_splice_retries_previously_unresolved_names() {
        let (index, names) =
            index_of(&[("b.py", vec![symbol("bar", "b.py", &["foo"])])]);
        let graph = GraphBuilder::build(&index, &names);
        assert!(graph.node("b.py::bar").unwrap().is_external);

        // a.py appears with the missing definition.
        let (new_index, new_names) = index_of(&[
            ("a.py", vec![symbol("foo", "a.py", &[])]),
            ("b.py", vec![symbol("bar", "b.py", &["foo"])]),
        ]);
        let spliced = GraphBuilder::splice(
            &graph,
            &new_index,
            &new_names,
            &[PathBuf::from("a.py")],
            &[],
        );

        let bar = spliced.node("b.py::bar").unwrap();
        assert!(bar.depends_on.contains("a.py::foo"));
        assert!(!bar.is_external);
        assert_edge_symmetry(&spliced);
    }

    #[test]
    fn test_imports_never_become_nodes() {
        let mut import = symbol("os", "a.py", &[]);
        import.kind = SymbolKind::Import;
        let (index, names) = index_of(&[("a.py", vec![import])]);
        let graph = GraphBuilder::build(&index, &names);
        assert_eq!(graph.node_count(), 0);
    }
}
