//! Language extractor trait.
//!
//! One implementation per language family, selected by file extension
//! through the [`ExtractorRegistry`](crate::parsing::ExtractorRegistry).

use crate::parsing::Language;
use crate::types::Symbol;
use std::path::Path;

/// Turns file content into a list of [`Symbol`] records.
///
/// Implementations must be tolerant: a malformed construct in one file is
/// logged and yields whatever symbols could still be extracted (possibly
/// none), never an error that aborts the scan of other files.
pub trait LanguageExtractor: Send {
    /// The language this extractor handles.
    fn language(&self) -> Language;

    /// Extract symbols from one file.
    ///
    /// Takes `&mut self` because tree-sitter parsers carry internal state;
    /// each pipeline worker owns its own registry of extractors.
    fn extract(&mut self, file_path: &Path, content: &str) -> Vec<Symbol>;
}
