//! Pattern similarity search.
//!
//! Normalizes code by stripping comments and collapsing whitespace, splits
//! candidate files into blocks at function/class boundaries, and ranks
//! blocks by Jaccard similarity of their token sets against the query
//! snippet. An empty query or empty corpus yields an empty result list.

use crate::indexing::SymbolIndex;
use crate::parsing::Language;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("static regex"));
static LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(//|#).*$").expect("static regex"));
static BLOCK_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:async\s+)?(?:def\s|class\s|function\s|export\s)").expect("static regex")
});
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*|\d+").expect("static regex"));

/// One candidate block at or above the similarity threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarBlock {
    pub file_path: PathBuf,
    pub start_line: u32,
    pub code: String,
    /// Jaccard similarity in `[0.0, 1.0]`.
    pub similarity: f32,
}

pub struct PatternSimilarityEngine;

impl PatternSimilarityEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn find_similar(
        &self,
        index: &SymbolIndex,
        root: &Path,
        snippet: &str,
        language: Option<Language>,
        threshold: f32,
    ) -> Vec<SimilarBlock> {
        let query_tokens = tokenize(&normalize(snippet));
        if query_tokens.is_empty() {
            return Vec::new();
        }

        let mut results = Vec::new();
        for file_path in index.files() {
            if let Some(lang) = language {
                let matches_lang = file_path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|ext| lang.extensions().contains(&ext));
                if !matches_lang {
                    continue;
                }
            }

            let content = match fs::read_to_string(root.join(file_path)) {
                Ok(content) => content,
                Err(e) => {
                    tracing::debug!("skipping {} for similarity: {e}", file_path.display());
                    continue;
                }
            };

            for block in split_blocks(&content) {
                let block_tokens = tokenize(&normalize(&block.text));
                let similarity = jaccard(&query_tokens, &block_tokens);
                if similarity >= threshold {
                    results.push(SimilarBlock {
                        file_path: file_path.clone(),
                        start_line: block.start_line,
                        code: block.text,
                        similarity,
                    });
                }
            }
        }

        results.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.file_path.cmp(&b.file_path))
                .then_with(|| a.start_line.cmp(&b.start_line))
        });
        results
    }
}

impl Default for PatternSimilarityEngine {
    fn default() -> Self {
        Self::new()
    }
}

struct Block {
    start_line: u32,
    text: String,
}

/// Split content into blocks at function/class boundary lines. Content
/// before the first boundary forms its own block.
fn split_blocks(content: &str) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_start = 1u32;

    for (idx, line) in content.lines().enumerate() {
        let line_number = idx as u32 + 1;
        if BLOCK_BOUNDARY.is_match(line) && !current.is_empty() {
            blocks.push(Block {
                start_line: current_start,
                text: current.join("\n"),
            });
            current = Vec::new();
            current_start = line_number;
        }
        if current.is_empty() {
            current_start = line_number;
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(Block {
            start_line: current_start,
            text: current.join("\n"),
        });
    }

    blocks
        .into_iter()
        .filter(|b| !b.text.trim().is_empty())
        .collect()
}

/// Strip comments and collapse whitespace.
fn normalize(code: &str) -> String {
    let without_block = BLOCK_COMMENT.replace_all(code, " ");
    let without_line = LINE_COMMENT.replace_all(&without_block, "");
    without_line.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn tokenize(code: &str) -> HashSet<String> {
    TOKEN
        .find_iter(code)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// `|A ∩ B| / |A ∪ B|` over token sets. Empty-vs-empty is 0, not NaN.
fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f32 / union as f32
}
