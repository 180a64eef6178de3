//! The authoritative symbol store: file path → symbol list.
//!
//! Entries are replaced wholesale per file, never partial-merged. Files are
//! kept in insertion order (directory-scan order), which is the documented
//! tie-break for same-named symbols across files.

use crate::types::{Symbol, SymbolKind};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct SymbolIndex {
    files: IndexMap<PathBuf, Vec<Symbol>>,
}

impl SymbolIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replace a file's symbol list.
    pub fn upsert(&mut self, file_path: PathBuf, symbols: Vec<Symbol>) {
        self.files.insert(file_path, symbols);
    }

    /// Drop a file's entry (file deleted since the last scan).
    pub fn remove(&mut self, file_path: &Path) {
        self.files.shift_remove(file_path);
    }

    pub fn symbols_of(&self, file_path: &Path) -> Option<&[Symbol]> {
        self.files.get(file_path).map(|v| v.as_slice())
    }

    /// All symbols in scan order: files in insertion order, symbols in
    /// source order within each file.
    pub fn all_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.files.values().flatten()
    }

    pub fn files(&self) -> impl Iterator<Item = &PathBuf> {
        self.files.keys()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn symbol_count(&self) -> usize {
        self.files.values().map(|v| v.len()).sum()
    }

    pub fn contains_file(&self, file_path: &Path) -> bool {
        self.files.contains_key(file_path)
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }
}

/// Secondary name → locations map for O(1) exact-name lookups.
///
/// Built once per snapshot generation, after the index is final. Entries
/// preserve scan order, so `.first()` is the documented first-match
/// resolution target.
#[derive(Debug, Clone, Default)]
pub struct NameMap {
    entries: HashMap<String, Vec<NameEntry>>,
}

#[derive(Debug, Clone)]
pub struct NameEntry {
    pub file_path: PathBuf,
    /// Position within the file's symbol list.
    pub slot: usize,
    pub kind: SymbolKind,
}

impl NameMap {
    pub fn build(index: &SymbolIndex) -> Self {
        let mut entries: HashMap<String, Vec<NameEntry>> = HashMap::new();
        for (file_path, symbols) in &index.files {
            for (slot, symbol) in symbols.iter().enumerate() {
                entries.entry(symbol.name.clone()).or_default().push(NameEntry {
                    file_path: file_path.clone(),
                    slot,
                    kind: symbol.kind,
                });
            }
        }
        Self { entries }
    }

    /// All locations of `name`, in scan order.
    pub fn lookup(&self, name: &str) -> &[NameEntry] {
        self.entries.get(name).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// First function/class definition of `name` in scan order, the
    /// documented (deterministic but arbitrary) resolution tie-break.
    pub fn resolve_definition(&self, name: &str) -> Option<&NameEntry> {
        self.lookup(name).iter().find(|e| e.kind.is_definition())
    }

    /// Resolve a name entry back to its symbol.
    pub fn symbol<'a>(&self, index: &'a SymbolIndex, entry: &NameEntry) -> Option<&'a Symbol> {
        index.symbols_of(&entry.file_path)?.get(entry.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexSet;

    fn symbol(name: &str, file: &str, kind: SymbolKind) -> Symbol {
        Symbol {
            name: name.to_string(),
            kind,
            file_path: PathBuf::from(file),
            line_number: 1,
            definition_text: format!("def {name}():"),
            docstring: None,
            call_dependencies: IndexSet::new(),
        }
    }

    #[test]
    fn test_upsert_replaces_wholesale() {
        let mut index = SymbolIndex::new();
        let file = PathBuf::from("a.py");
        index.upsert(
            file.clone(),
            vec![
                symbol("foo", "a.py", SymbolKind::Function),
                symbol("bar", "a.py", SymbolKind::Function),
            ],
        );
        index.upsert(file.clone(), vec![symbol("baz", "a.py", SymbolKind::Function)]);

        let symbols = index.symbols_of(&file).unwrap();
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "baz");
    }

    #[test]
    fn test_name_map_first_match_follows_scan_order() {
        let mut index = SymbolIndex::new();
        index.upsert(
            PathBuf::from("a.py"),
            vec![symbol("helper", "a.py", SymbolKind::Function)],
        );
        index.upsert(
            PathBuf::from("b.py"),
            vec![symbol("helper", "b.py", SymbolKind::Function)],
        );

        let names = NameMap::build(&index);
        let first = names.resolve_definition("helper").unwrap();
        assert_eq!(first.file_path, PathBuf::from("a.py"));
        assert_eq!(names.lookup("helper").len(), 2);
    }

    #[test]
    fn test_resolve_definition_skips_imports() {
        let mut index = SymbolIndex::new();
        index.upsert(
            PathBuf::from("a.py"),
            vec![symbol("json", "a.py", SymbolKind::Import)],
        );
        index.upsert(
            PathBuf::from("b.py"),
            vec![symbol("json", "b.py", SymbolKind::Function)],
        );

        let names = NameMap::build(&index);
        let def = names.resolve_definition("json").unwrap();
        assert_eq!(def.file_path, PathBuf::from("b.py"));
    }

    #[test]
    fn test_counts() {
        let mut index = SymbolIndex::new();
        index.upsert(
            PathBuf::from("a.py"),
            vec![
                symbol("foo", "a.py", SymbolKind::Function),
                symbol("Bar", "a.py", SymbolKind::Class),
            ],
        );
        assert_eq!(index.file_count(), 1);
        assert_eq!(index.symbol_count(), 2);
    }
}
