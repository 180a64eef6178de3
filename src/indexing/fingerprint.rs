//! Content fingerprints for incremental re-indexing.
//!
//! A file whose hash is unchanged since the last scan is skipped for
//! re-extraction; a changed or new file triggers re-extraction and an edge
//! re-splice for that file.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::PathBuf;

/// Per-file fingerprints from one completed index generation.
pub type FingerprintMap = HashMap<PathBuf, String>;

/// SHA-256 of file content, hex-encoded.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable_and_content_sensitive() {
        let a = content_hash("def foo(): pass");
        let b = content_hash("def foo(): pass");
        let c = content_hash("def foo(): return 1");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }
}
