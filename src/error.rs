//! Error taxonomy for indexing and queries.
//!
//! Indexing errors are partial-failure-tolerant: a file that fails to read
//! or parse is logged and skipped, so `IndexError` only surfaces for
//! failures that abort a whole rebuild (bad root, exceeded deadline).
//! Query errors are recoverable, typed outcomes — callers are expected to
//! distinguish "symbol not found" from "index not yet built".

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("not a directory: {0}")]
    InvalidRoot(PathBuf),

    #[error("indexing exceeded the {budget:?} wall-clock budget after {elapsed:?}; previous snapshot left in place")]
    DeadlineExceeded { budget: Duration, elapsed: Duration },

    #[error("indexing worker panicked or disconnected")]
    WorkerFailed,
}

pub type IndexResult<T> = Result<T, IndexError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("symbol not found in index: {0}")]
    SymbolNotFound(String),

    #[error("index has not been built yet; run index_codebase first")]
    IndexNotBuilt,
}

pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_errors_are_distinct_and_comparable() {
        let not_found = QueryError::SymbolNotFound("foo".into());
        assert_ne!(not_found, QueryError::IndexNotBuilt);
        assert_eq!(not_found, QueryError::SymbolNotFound("foo".into()));
    }

    #[test]
    fn test_error_messages_name_the_failure() {
        let err = QueryError::SymbolNotFound("bar".into());
        assert!(err.to_string().contains("bar"));

        let err = QueryError::IndexNotBuilt;
        assert!(err.to_string().contains("index_codebase"));
    }
}
