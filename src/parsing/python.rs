//! Python symbol extraction via tree-sitter.
//!
//! Walks the syntax tree for function/class definitions (including nested
//! ones), import statements, docstrings, and the set of names called from
//! each definition body. Extraction is tolerant: a file with syntax errors
//! still yields every symbol the parser could recover, and a file the
//! parser rejects outright yields zero symbols without failing the scan.

use crate::parsing::{Language, LanguageExtractor};
use crate::types::{Symbol, SymbolKind};
use indexmap::IndexSet;
use std::path::Path;
use tree_sitter::{Node, Parser};

pub struct PythonExtractor {
    parser: Option<Parser>,
}

impl std::fmt::Debug for PythonExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PythonExtractor")
            .field("language", &"Python")
            .finish()
    }
}

impl PythonExtractor {
    pub fn new() -> Self {
        let mut parser = Parser::new();
        let parser = match parser.set_language(&tree_sitter_python::LANGUAGE.into()) {
            Ok(()) => Some(parser),
            Err(e) => {
                tracing::error!("failed to load Python grammar: {e}");
                None
            }
        };
        Self { parser }
    }

    fn extract_from_node(
        &self,
        node: Node,
        code: &str,
        file_path: &Path,
        symbols: &mut Vec<Symbol>,
    ) {
        match node.kind() {
            "function_definition" => {
                if let Some(symbol) =
                    self.definition_symbol(node, code, file_path, SymbolKind::Function)
                {
                    symbols.push(symbol);
                }
                // Nested definitions become their own symbols.
                if let Some(body) = node.child_by_field_name("body") {
                    self.extract_from_node(body, code, file_path, symbols);
                }
                return;
            }
            "class_definition" => {
                if let Some(symbol) =
                    self.definition_symbol(node, code, file_path, SymbolKind::Class)
                {
                    symbols.push(symbol);
                }
                if let Some(body) = node.child_by_field_name("body") {
                    self.extract_from_node(body, code, file_path, symbols);
                }
                return;
            }
            "import_statement" | "import_from_statement" => {
                self.import_symbols(node, code, file_path, symbols);
                return;
            }
            _ => {}
        }

        for child in node.children(&mut node.walk()) {
            self.extract_from_node(child, code, file_path, symbols);
        }
    }

    fn definition_symbol(
        &self,
        node: Node,
        code: &str,
        file_path: &Path,
        kind: SymbolKind,
    ) -> Option<Symbol> {
        let name_node = node.child_by_field_name("name")?;
        let name = code[name_node.byte_range()].to_string();
        let row = node.start_position().row;

        let mut call_dependencies = IndexSet::new();
        if let Some(body) = node.child_by_field_name("body") {
            collect_calls(body, code, &mut call_dependencies);
        }

        Some(Symbol {
            name,
            kind,
            file_path: file_path.to_path_buf(),
            line_number: row as u32 + 1,
            definition_text: line_at(code, row),
            docstring: node
                .child_by_field_name("body")
                .and_then(|body| docstring_of(body, code)),
            call_dependencies,
        })
    }

    fn import_symbols(
        &self,
        node: Node,
        code: &str,
        file_path: &Path,
        symbols: &mut Vec<Symbol>,
    ) {
        let row = node.start_position().row;
        let definition_text = line_at(code, row);

        let mut names = Vec::new();
        if node.kind() == "import_from_statement" {
            if let Some(module) = node.child_by_field_name("module_name") {
                names.push(code[module.byte_range()].to_string());
            }
        } else {
            for child in node.children(&mut node.walk()) {
                match child.kind() {
                    "dotted_name" => names.push(code[child.byte_range()].to_string()),
                    "aliased_import" => {
                        if let Some(name) = child.child_by_field_name("name") {
                            names.push(code[name.byte_range()].to_string());
                        }
                    }
                    _ => {}
                }
            }
        }

        for name in names {
            symbols.push(Symbol {
                name,
                kind: SymbolKind::Import,
                file_path: file_path.to_path_buf(),
                line_number: row as u32 + 1,
                definition_text: definition_text.clone(),
                docstring: None,
                call_dependencies: IndexSet::new(),
            });
        }
    }
}

impl Default for PythonExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageExtractor for PythonExtractor {
    fn language(&self) -> Language {
        Language::Python
    }

    fn extract(&mut self, file_path: &Path, content: &str) -> Vec<Symbol> {
        let Some(parser) = self.parser.as_mut() else {
            return Vec::new();
        };
        let Some(tree) = parser.parse(content, None) else {
            tracing::warn!("tree-sitter could not parse {}", file_path.display());
            return Vec::new();
        };

        let root = tree.root_node();
        if root.has_error() {
            // Keep whatever the parser recovered; skip only broken regions.
            tracing::warn!(
                "syntax errors in {}; extracting recoverable symbols",
                file_path.display()
            );
        }

        let mut symbols = Vec::new();
        self.extract_from_node(root, content, file_path, &mut symbols);
        symbols
    }
}

/// Collect called names within a definition body.
///
/// Direct calls contribute the identifier (`foo()` → `foo`); attribute
/// calls contribute the attribute name (`obj.bar()` → `bar`). Recursion
/// stops at nested function/class definitions, which own their own calls.
fn collect_calls(node: Node, code: &str, out: &mut IndexSet<String>) {
    match node.kind() {
        "function_definition" | "class_definition" => return,
        "call" => {
            if let Some(function) = node.child_by_field_name("function") {
                match function.kind() {
                    "identifier" => {
                        out.insert(code[function.byte_range()].to_string());
                    }
                    "attribute" => {
                        if let Some(attr) = function.child_by_field_name("attribute") {
                            out.insert(code[attr.byte_range()].to_string());
                        }
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }

    for child in node.children(&mut node.walk()) {
        collect_calls(child, code, out);
    }
}

/// First-statement docstring of a `block` node, if any.
fn docstring_of(body: Node, code: &str) -> Option<String> {
    let first = body.named_child(0)?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let string_node = first.named_child(0)?;
    if string_node.kind() != "string" {
        return None;
    }

    // Prefer the grammar's string_content child; fall back to quote stripping.
    for child in string_node.children(&mut string_node.walk()) {
        if child.kind() == "string_content" {
            return Some(code[child.byte_range()].trim().to_string());
        }
    }
    Some(strip_quotes(&code[string_node.byte_range()]))
}

fn strip_quotes(raw: &str) -> String {
    let mut s = raw.trim();
    for prefix in ["r", "b", "u", "f", "R", "B", "U", "F"] {
        s = s.strip_prefix(prefix).unwrap_or(s);
    }
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|s| s.strip_suffix(quote)) {
            return inner.trim().to_string();
        }
    }
    s.trim().to_string()
}

fn line_at(code: &str, row: usize) -> String {
    code.lines().nth(row).unwrap_or_default().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(code: &str) -> Vec<Symbol> {
        let mut extractor = PythonExtractor::new();
        extractor.extract(Path::new("test.py"), code)
    }

    #[test]
    fn test_extracts_functions_with_lines_and_docstrings() {
        let code = r#"
def foo():
    """Adds numbers."""
    return 1
"#;
        let symbols = extract(code);
        assert_eq!(symbols.len(), 1);
        let foo = &symbols[0];
        assert_eq!(foo.name, "foo");
        assert_eq!(foo.kind, SymbolKind::Function);
        assert_eq!(foo.line_number, 2);
        assert_eq!(foo.definition_text, "def foo():");
        assert_eq!(foo.docstring.as_deref(), Some("Adds numbers."));
    }

    #[test]
    fn test_extracts_classes_and_nested_methods() {
        let code = r#"
class Greeter:
    """Says hello."""

    def greet(self):
        print("hi")

    def _helper(self):
        pass
"#;
        let symbols = extract(code);
        let names: Vec<&str> = symbols.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Greeter", "greet", "_helper"]);
        assert_eq!(symbols[0].kind, SymbolKind::Class);
        assert_eq!(symbols[0].docstring.as_deref(), Some("Says hello."));
        assert_eq!(symbols[1].kind, SymbolKind::Function);
    }

    #[test]
    fn test_collects_direct_and_attribute_calls() {
        let code = r#"
def bar():
    foo()
    obj.method()
    nested.deeply.chained()
"#;
        let symbols = extract(code);
        let bar = &symbols[0];
        assert!(bar.call_dependencies.contains("foo"));
        assert!(bar.call_dependencies.contains("method"));
        assert!(bar.call_dependencies.contains("chained"));
    }

    #[test]
    fn test_nested_function_owns_its_calls() {
        let code = r#"
def outer():
    def inner():
        helper()
    inner()
"#;
        let symbols = extract(code);
        let outer = symbols.iter().find(|s| s.name == "outer").unwrap();
        let inner = symbols.iter().find(|s| s.name == "inner").unwrap();
        assert!(outer.call_dependencies.contains("inner"));
        assert!(!outer.call_dependencies.contains("helper"));
        assert!(inner.call_dependencies.contains("helper"));
    }

    #[test]
    fn test_extracts_imports() {
        let code = "import os\nimport os.path\nfrom collections import OrderedDict\n";
        let symbols = extract(code);
        let imports: Vec<&str> = symbols
            .iter()
            .filter(|s| s.kind == SymbolKind::Import)
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(imports, vec!["os", "os.path", "collections"]);
    }

    #[test]
    fn test_syntax_error_does_not_abort_extraction() {
        let code = "def good():\n    return 1\n\ndef broken(:\n";
        let symbols = extract(code);
        assert!(symbols.iter().any(|s| s.name == "good"));
    }

    #[test]
    fn test_strip_quotes_handles_triple_and_single() {
        assert_eq!(strip_quotes("\"\"\"doc\"\"\""), "doc");
        assert_eq!(strip_quotes("'doc'"), "doc");
        assert_eq!(strip_quotes("r'''raw'''"), "raw");
    }
}
