//! File scanner: directory walk with include/exclude filters.
//!
//! Walks the tree depth-first, pruning excluded directories before
//! descending into them, and yields file content plus a fingerprint for
//! every file whose extension is included. Unreadable files are skipped
//! with a warning; the scan continues.

use crate::indexing::fingerprint::content_hash;
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// One readable source file discovered by the scanner.
#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub content: String,
    pub hash: String,
}

/// Walks a root directory applying extension and directory filters.
///
/// Stateless: calling [`FileScanner::scan`] again re-walks the tree. The
/// walk is sorted by path so discovery order (and therefore index
/// insertion order) is deterministic across runs.
pub struct FileScanner {
    extensions: HashSet<String>,
    exclude_dirs: HashSet<String>,
}

impl FileScanner {
    pub fn new(extensions: &[String], exclude_dirs: &[String]) -> Self {
        Self {
            extensions: extensions.iter().map(|e| e.to_lowercase()).collect(),
            exclude_dirs: exclude_dirs.iter().cloned().collect(),
        }
    }

    /// Lazily yield readable files under `root`.
    pub fn scan<'a>(&'a self, root: &Path) -> impl Iterator<Item = ScannedFile> + 'a {
        let exclude_dirs = self.exclude_dirs.clone();

        let walker = WalkBuilder::new(root)
            .hidden(false)
            .git_ignore(true)
            .require_git(false)
            .follow_links(false)
            .sort_by_file_path(|a, b| a.cmp(b))
            // Prune before descent: returning false for a directory stops
            // the walker from recursing into it at all.
            .filter_entry(move |entry| {
                let name = entry.file_name().to_string_lossy();
                let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
                !(is_dir && exclude_dirs.contains(name.as_ref()))
            })
            .build();

        walker
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("skipping unreadable directory entry: {e}");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .filter(|entry| self.has_included_extension(entry.path()))
            .filter_map(|entry| {
                let path = entry.into_path();
                match fs::read_to_string(&path) {
                    Ok(content) => {
                        let hash = content_hash(&content);
                        Some(ScannedFile { path, content, hash })
                    }
                    Err(e) => {
                        tracing::warn!("skipping unreadable file {}: {e}", path.display());
                        None
                    }
                }
            })
    }

    fn has_included_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext.to_lowercase()))
    }
}
