//! Query engines over a snapshot: lexical relevance search and pattern
//! similarity.

pub mod cache;
pub mod semantic;
pub mod similarity;

pub use cache::{CacheKey, QueryCache};
pub use semantic::{ScoredHit, SearchResponse, SemanticSearchEngine};
pub use similarity::{PatternSimilarityEngine, SimilarBlock};
