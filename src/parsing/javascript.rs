//! JavaScript/TypeScript symbol extraction, regex-level.
//!
//! A documented precision/speed tradeoff: statement shapes are matched line
//! by line instead of parsing a real syntax tree, so dynamic or aliased
//! call patterns are missed and `call_dependencies` is always empty. Both
//! JS and TS families share this extractor.

use crate::parsing::{Language, LanguageExtractor};
use crate::types::{Symbol, SymbolKind};
use indexmap::IndexSet;
use regex::Regex;
use std::path::Path;

pub struct JsTsExtractor {
    function_decl: Regex,
    arrow_fn: Regex,
    class_decl: Regex,
    import_stmt: Regex,
    require_stmt: Regex,
}

impl JsTsExtractor {
    pub fn new() -> Self {
        // Anchored statement shapes; invalid lines simply do not match.
        Self {
            function_decl: Regex::new(
                r"^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*([A-Za-z_$][\w$]*)",
            )
            .expect("static regex"),
            arrow_fn: Regex::new(
                r"^\s*(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*(?::[^=]+)?=\s*(?:async\s+)?(?:\([^)]*\)|[A-Za-z_$][\w$]*)\s*=>",
            )
            .expect("static regex"),
            class_decl: Regex::new(
                r"^\s*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+([A-Za-z_$][\w$]*)",
            )
            .expect("static regex"),
            import_stmt: Regex::new(r#"^\s*import\s+(?:.+?\s+from\s+)?['"]([^'"]+)['"]"#)
                .expect("static regex"),
            require_stmt: Regex::new(
                r#"^\s*(?:const|let|var)\s+[\w${},\s]+=\s*require\(\s*['"]([^'"]+)['"]"#,
            )
            .expect("static regex"),
        }
    }

    fn symbol(
        &self,
        file_path: &Path,
        line: &str,
        line_number: u32,
        name: &str,
        kind: SymbolKind,
    ) -> Symbol {
        Symbol {
            name: name.to_string(),
            kind,
            file_path: file_path.to_path_buf(),
            line_number,
            definition_text: line.trim().to_string(),
            docstring: None,
            call_dependencies: IndexSet::new(),
        }
    }
}

impl Default for JsTsExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageExtractor for JsTsExtractor {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn extract(&mut self, file_path: &Path, content: &str) -> Vec<Symbol> {
        let mut symbols = Vec::new();

        for (idx, line) in content.lines().enumerate() {
            let line_number = idx as u32 + 1;

            if let Some(caps) = self.function_decl.captures(line) {
                symbols.push(self.symbol(file_path, line, line_number, &caps[1], SymbolKind::Function));
            } else if let Some(caps) = self.arrow_fn.captures(line) {
                symbols.push(self.symbol(file_path, line, line_number, &caps[1], SymbolKind::Function));
            } else if let Some(caps) = self.class_decl.captures(line) {
                symbols.push(self.symbol(file_path, line, line_number, &caps[1], SymbolKind::Class));
            } else if let Some(caps) = self.import_stmt.captures(line) {
                symbols.push(self.symbol(file_path, line, line_number, &caps[1], SymbolKind::Import));
            } else if let Some(caps) = self.require_stmt.captures(line) {
                symbols.push(self.symbol(file_path, line, line_number, &caps[1], SymbolKind::Import));
            }
        }

        symbols
    }
}
