//! Symbol navigation: jump-to-definition and find-references.

use crate::error::{QueryError, QueryResult};
use crate::graph::DependencyGraph;
use crate::indexing::{NameMap, SymbolIndex};
use crate::types::{SymbolKind, split_key};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolLocation {
    pub name: String,
    pub kind: SymbolKind,
    pub file_path: PathBuf,
    pub line_number: u32,
    pub definition_text: String,
    pub docstring: Option<String>,
}

/// One caller of a symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    /// Graph key of the referencing definition.
    pub symbol: String,
    pub file_path: PathBuf,
    pub line_number: u32,
}

pub struct SymbolNavigator;

impl SymbolNavigator {
    pub fn new() -> Self {
        Self
    }

    /// Every definition of `name`, in scan order. A name defined in several
    /// files (or shadowed within one) yields several locations; an unknown
    /// name yields an empty list rather than an error.
    pub fn find_definition(
        &self,
        index: &SymbolIndex,
        names: &NameMap,
        name: &str,
    ) -> Vec<SymbolLocation> {
        names
            .lookup(name)
            .iter()
            .filter(|entry| entry.kind.is_definition())
            .filter_map(|entry| names.symbol(index, entry))
            .map(|symbol| SymbolLocation {
                name: symbol.name.clone(),
                kind: symbol.kind,
                file_path: symbol.file_path.clone(),
                line_number: symbol.line_number,
                definition_text: symbol.definition_text.clone(),
                docstring: symbol.docstring.clone(),
            })
            .collect()
    }

    /// Definitions that call `key`, resolved back to their locations.
    pub fn find_references(
        &self,
        index: &SymbolIndex,
        names: &NameMap,
        graph: &DependencyGraph,
        key: &str,
    ) -> QueryResult<Vec<Reference>> {
        let node = graph
            .node(key)
            .ok_or_else(|| QueryError::SymbolNotFound(key.to_string()))?;

        let references = node
            .depended_by
            .iter()
            .filter_map(|owner| {
                let (file, name) = split_key(owner)?;
                let file = PathBuf::from(file);
                let symbol = names
                    .lookup(name)
                    .iter()
                    .filter(|e| e.kind.is_definition() && e.file_path == file)
                    .find_map(|e| names.symbol(index, e))?;
                Some(Reference {
                    symbol: owner.clone(),
                    file_path: symbol.file_path.clone(),
                    line_number: symbol.line_number,
                })
            })
            .collect();

        Ok(references)
    }
}

impl Default for SymbolNavigator {
    fn default() -> Self {
        Self::new()
    }
}
