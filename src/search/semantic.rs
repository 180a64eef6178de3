//! Lexical relevance search over indexed symbols.
//!
//! Scores every symbol against a free-text query; contributions stack up
//! to a cap of 1.0 and results at or below the threshold are discarded.
//! Scored hits are cached per `(query, scope)` on the snapshot generation;
//! the ±N lines of context are read fresh from disk on every call so
//! results reflect live file state.

use crate::indexing::SymbolIndex;
use crate::search::cache::{CacheKey, QueryCache};
use crate::types::{MatchType, SearchResult, Symbol};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A scored symbol hit before context enrichment. This is what the cache
/// stores; context is attached at answer time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredHit {
    pub file_path: PathBuf,
    pub line_number: u32,
    pub matched_text: String,
    pub relevance_score: f32,
    pub match_type: MatchType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    /// True when the scored hits came from the generation's cache.
    pub cached: bool,
}

pub struct SemanticSearchEngine {
    pub context_lines: usize,
    pub score_threshold: f32,
}

impl SemanticSearchEngine {
    pub fn new(context_lines: usize, score_threshold: f32) -> Self {
        Self {
            context_lines,
            score_threshold,
        }
    }

    pub fn search(
        &self,
        index: &SymbolIndex,
        cache: &Mutex<QueryCache<Vec<ScoredHit>>>,
        root: &Path,
        query: &str,
        scope: Option<&Path>,
        max_results: usize,
    ) -> SearchResponse {
        let key = CacheKey {
            query: query.to_string(),
            scope: scope.map(|p| p.display().to_string()),
        };

        let cached_hits = cache.lock().get(&key);
        let (hits, cached) = match cached_hits {
            Some(hits) => (hits, true),
            None => {
                let hits = self.score_all(index, query, scope);
                cache.lock().insert(key, hits.clone());
                (hits, false)
            }
        };

        let results = hits
            .into_iter()
            .take(max_results)
            .map(|hit| self.enrich(root, hit))
            .collect();

        SearchResponse { results, cached }
    }

    fn score_all(&self, index: &SymbolIndex, query: &str, scope: Option<&Path>) -> Vec<ScoredHit> {
        let query_lower = query.to_lowercase();
        let query_words: Vec<&str> = query_lower.split_whitespace().collect();
        if query_words.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<ScoredHit> = index
            .all_symbols()
            .filter(|symbol| scope.is_none_or(|s| symbol.file_path.starts_with(s)))
            .filter_map(|symbol| {
                let (score, match_type) = score_symbol(symbol, &query_lower, &query_words);
                if score <= self.score_threshold {
                    return None;
                }
                Some(ScoredHit {
                    file_path: symbol.file_path.clone(),
                    line_number: symbol.line_number,
                    matched_text: symbol.definition_text.clone(),
                    relevance_score: score,
                    match_type,
                })
            })
            .collect();

        // Score descending; path then line break ties for determinism.
        hits.sort_by(|a, b| {
            b.relevance_score
                .total_cmp(&a.relevance_score)
                .then_with(|| a.file_path.cmp(&b.file_path))
                .then_with(|| a.line_number.cmp(&b.line_number))
        });
        hits
    }

    /// Attach ±context_lines read live from disk. A file that can no
    /// longer be read yields the hit with empty context, not an error.
    fn enrich(&self, root: &Path, hit: ScoredHit) -> SearchResult {
        let (before, after) = match fs::read_to_string(root.join(&hit.file_path)) {
            Ok(content) => {
                let lines: Vec<&str> = content.lines().collect();
                let idx = hit.line_number.saturating_sub(1) as usize;
                let start = idx.saturating_sub(self.context_lines);
                let before = lines[start.min(lines.len())..idx.min(lines.len())]
                    .iter()
                    .map(|l| l.to_string())
                    .collect();
                let after_start = (idx + 1).min(lines.len());
                let after_end = (idx + 1 + self.context_lines).min(lines.len());
                let after = lines[after_start..after_end]
                    .iter()
                    .map(|l| l.to_string())
                    .collect();
                (before, after)
            }
            Err(e) => {
                tracing::debug!(
                    "context read failed for {}: {e}",
                    hit.file_path.display()
                );
                (Vec::new(), Vec::new())
            }
        };

        SearchResult {
            file_path: hit.file_path,
            line_number: hit.line_number,
            matched_text: hit.matched_text,
            context_before: before,
            context_after: after,
            relevance_score: hit.relevance_score,
            match_type: hit.match_type,
        }
    }
}

/// Score one symbol against the query. All comparisons are
/// case-insensitive; contributions stack and the total is capped at 1.0.
fn score_symbol(symbol: &Symbol, query_lower: &str, query_words: &[&str]) -> (f32, MatchType) {
    let name_lower = symbol.name.to_lowercase();
    let mut score = 0.0_f32;
    let mut match_type = MatchType::Semantic;

    if name_lower == query_lower {
        score += 1.0;
        match_type = MatchType::Exact;
    } else if name_lower.contains(query_lower) {
        score += 0.7;
        match_type = MatchType::Fuzzy;
    } else if query_words.iter().any(|w| name_lower.contains(w)) {
        score += 0.5;
        match_type = MatchType::Fuzzy;
    }

    if let Some(doc) = &symbol.docstring {
        if doc.to_lowercase().contains(query_lower) {
            score += 0.4;
        }
    }
    if symbol.definition_text.to_lowercase().contains(query_lower) {
        score += 0.3;
    }

    (score.min(1.0), match_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SymbolKind;
    use indexmap::IndexSet;

    fn symbol(name: &str, doc: Option<&str>, definition: &str) -> Symbol {
        Symbol {
            name: name.to_string(),
            kind: SymbolKind::Function,
            file_path: PathBuf::from("a.py"),
            line_number: 1,
            definition_text: definition.to_string(),
            docstring: doc.map(|d| d.to_string()),
            call_dependencies: IndexSet::new(),
        }
    }

    fn score(symbol: &Symbol, query: &str) -> f32 {
        let query_lower = query.to_lowercase();
        let words: Vec<&str> = query_lower.split_whitespace().collect();
        score_symbol(symbol, &query_lower, &words).0
    }

    #[test]
    fn test_exact_name_match_scores_one() {
        let s = symbol("foo", None, "def foo():");
        let (score, match_type) = {
            let q = "foo";
            let ql = q.to_lowercase();
            let words: Vec<&str> = ql.split_whitespace().collect();
            score_symbol(&s, &ql, &words)
        };
        assert_eq!(score, 1.0);
        assert_eq!(match_type, MatchType::Exact);
    }

    #[test]
    fn test_exact_match_is_case_insensitive() {
        let s = symbol("ParseConfig", None, "def ParseConfig():");
        assert_eq!(score(&s, "parseconfig"), 1.0);
    }

    #[test]
    fn test_contributions_stack_and_cap_at_one() {
        // Name contains + docstring contains + definition contains:
        // 0.7 + 0.4 + 0.3 capped at 1.0.
        let s = symbol("parse_json", Some("parse helper"), "def parse_json(data):");
        let total = score(&s, "parse");
        assert_eq!(total, 1.0);
    }

    #[test]
    fn test_scores_stay_in_unit_interval() {
        let cases = [
            symbol("foo", Some("does foo things"), "def foo():"),
            symbol("unrelated", None, "def unrelated():"),
            symbol("foobar", Some("foo"), "def foobar(): # foo foo foo"),
        ];
        for s in &cases {
            let v = score(s, "foo");
            assert!((0.0..=1.0).contains(&v), "score {v} out of bounds");
        }
    }

    #[test]
    fn test_definition_only_match_falls_below_threshold() {
        let engine = SemanticSearchEngine::new(3, 0.3);
        let s = symbol("handler", None, "def handler(parse):");
        assert!(score(&s, "parse") <= engine.score_threshold);
    }

    #[test]
    fn test_docstring_match_scores_semantic() {
        let s = symbol("run", Some("entry point that parses args"), "def run():");
        let ql = "parses".to_string();
        let words: Vec<&str> = vec!["parses"];
        let (v, t) = score_symbol(&s, &ql, &words);
        assert_eq!(t, MatchType::Semantic);
        assert!((v - 0.4).abs() < f32::EPSILON);
    }
}
