//! Multi-language symbol extraction.
//!
//! Adding a language means adding one [`LanguageExtractor`] implementation
//! and registering it here — no central dispatcher to edit.

pub mod extractor;
pub mod javascript;
pub mod python;

pub use extractor::LanguageExtractor;
pub use javascript::JsTsExtractor;
pub use python::PythonExtractor;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
}

impl Language {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "py" | "pyi" => Some(Language::Python),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "ts" | "tsx" => Some(Language::TypeScript),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Extensions this language claims, used when filtering similarity
    /// candidates by language.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Python => &["py", "pyi"],
            Language::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Language::TypeScript => &["ts", "tsx"],
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            "javascript" | "js" => Ok(Language::JavaScript),
            "typescript" | "ts" => Ok(Language::TypeScript),
            other => Err(format!("unsupported language: {other}")),
        }
    }
}

/// Extension → extractor registry.
///
/// Each pipeline worker constructs its own registry so extractors can hold
/// mutable parser state without locking.
pub struct ExtractorRegistry {
    by_extension: HashMap<&'static str, usize>,
    extractors: Vec<Box<dyn LanguageExtractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self {
            by_extension: HashMap::new(),
            extractors: Vec::new(),
        }
    }

    /// Registry with the built-in extractors.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(&["py", "pyi"], Box::new(PythonExtractor::new()));
        registry.register(
            &["js", "jsx", "mjs", "cjs", "ts", "tsx"],
            Box::new(JsTsExtractor::new()),
        );
        registry
    }

    pub fn register(
        &mut self,
        extensions: &[&'static str],
        extractor: Box<dyn LanguageExtractor>,
    ) {
        let slot = self.extractors.len();
        self.extractors.push(extractor);
        for ext in extensions {
            self.by_extension.insert(ext, slot);
        }
    }

    /// Look up the extractor for a path, by extension.
    pub fn for_path(&mut self, path: &Path) -> Option<&mut dyn LanguageExtractor> {
        let ext = path.extension()?.to_str()?;
        let slot = *self.by_extension.get(ext)?;
        Some(self.extractors[slot].as_mut())
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
