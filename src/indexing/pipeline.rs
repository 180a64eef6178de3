//! Parallel extraction pipeline.
//!
//! ```text
//! SCAN → EXTRACT(×N) → COLLECT
//! ```
//!
//! The scanner walks the tree, reads content, and fingerprints each file;
//! unchanged files bypass the extraction workers entirely. Workers own
//! their extractor registries, so extraction runs without locks. The
//! collector is the single consumer and re-orders results by discovery
//! sequence number so the resulting index is identical across runs no
//! matter how workers were scheduled.
//!
//! A wall-clock budget is enforced at the scan stage: on overrun the whole
//! rebuild aborts with a typed error and the caller keeps the previous
//! snapshot (fail-soft).

use crate::error::{IndexError, IndexResult};
use crate::indexing::fingerprint::FingerprintMap;
use crate::indexing::walker::FileScanner;
use crate::parsing::ExtractorRegistry;
use crate::types::Symbol;
use crossbeam_channel::bounded;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

/// One file after the extract stage, tagged with its discovery order.
#[derive(Debug)]
pub(crate) struct CollectedFile {
    pub seq: usize,
    pub rel_path: PathBuf,
    pub hash: String,
    pub outcome: FileOutcome,
}

#[derive(Debug)]
pub(crate) enum FileOutcome {
    /// Fingerprint unchanged; the previous generation's symbols stay valid.
    Reused,
    Extracted(Vec<Symbol>),
}

struct ScanJob {
    seq: usize,
    rel_path: PathBuf,
    content: String,
    hash: String,
}

/// Run the pipeline over `root`, returning files in discovery order.
pub(crate) fn run_extraction(
    root: &Path,
    scanner: &FileScanner,
    previous: &FingerprintMap,
    workers: usize,
    budget: Duration,
) -> IndexResult<Vec<CollectedFile>> {
    let workers = workers.max(1);
    let start = Instant::now();

    let (job_tx, job_rx) = bounded::<ScanJob>(workers * 4);
    let (out_tx, out_rx) = bounded::<CollectedFile>(workers * 4);

    thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let out_tx = out_tx.clone();
            scope.spawn(move || {
                let mut registry = ExtractorRegistry::with_defaults();
                while let Ok(job) = job_rx.recv() {
                    let symbols = match registry.for_path(&job.rel_path) {
                        Some(extractor) => extractor.extract(&job.rel_path, &job.content),
                        None => Vec::new(),
                    };
                    let collected = CollectedFile {
                        seq: job.seq,
                        rel_path: job.rel_path,
                        hash: job.hash,
                        outcome: FileOutcome::Extracted(symbols),
                    };
                    if out_tx.send(collected).is_err() {
                        break;
                    }
                }
            });
        }
        drop(job_rx);

        let scan_out = out_tx.clone();
        drop(out_tx);
        let scan_handle = scope.spawn(move || -> IndexResult<()> {
            for (seq, file) in scanner.scan(root).enumerate() {
                let elapsed = start.elapsed();
                if elapsed > budget {
                    return Err(IndexError::DeadlineExceeded { budget, elapsed });
                }

                let rel_path = file
                    .path
                    .strip_prefix(root)
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|_| file.path.clone());

                if previous.get(&rel_path) == Some(&file.hash) {
                    let collected = CollectedFile {
                        seq,
                        rel_path,
                        hash: file.hash,
                        outcome: FileOutcome::Reused,
                    };
                    scan_out
                        .send(collected)
                        .map_err(|_| IndexError::WorkerFailed)?;
                } else {
                    let job = ScanJob {
                        seq,
                        rel_path,
                        content: file.content,
                        hash: file.hash,
                    };
                    job_tx.send(job).map_err(|_| IndexError::WorkerFailed)?;
                }
            }
            Ok(())
        });

        let mut collected: Vec<CollectedFile> = Vec::new();
        while let Ok(file) = out_rx.recv() {
            collected.push(file);
        }

        scan_handle.join().map_err(|_| IndexError::WorkerFailed)??;

        collected.sort_by_key(|f| f.seq);
        Ok(collected)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn scanner() -> FileScanner {
        FileScanner::new(&["py".to_string()], &[".git".to_string()])
    }

    #[test]
    fn test_extraction_preserves_discovery_order() {
        let dir = TempDir::new().unwrap();
        for name in ["c.py", "a.py", "b.py"] {
            fs::write(dir.path().join(name), "def f(): pass").unwrap();
        }

        let files = run_extraction(
            dir.path(),
            &scanner(),
            &FingerprintMap::new(),
            4,
            Duration::from_secs(60),
        )
        .unwrap();

        let paths: Vec<_> = files.iter().map(|f| f.rel_path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("a.py"),
                PathBuf::from("b.py"),
                PathBuf::from("c.py")
            ]
        );
        assert!(files
            .iter()
            .all(|f| matches!(f.outcome, FileOutcome::Extracted(_))));
    }

    #[test]
    fn test_unchanged_files_bypass_extraction() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.py"), "def f(): pass").unwrap();

        let first = run_extraction(
            dir.path(),
            &scanner(),
            &FingerprintMap::new(),
            2,
            Duration::from_secs(60),
        )
        .unwrap();

        let mut fingerprints = FingerprintMap::new();
        for f in &first {
            fingerprints.insert(f.rel_path.clone(), f.hash.clone());
        }

        let second = run_extraction(
            dir.path(),
            &scanner(),
            &fingerprints,
            2,
            Duration::from_secs(60),
        )
        .unwrap();
        assert!(matches!(second[0].outcome, FileOutcome::Reused));
    }

    #[test]
    fn test_deadline_aborts_the_scan() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.py"), "def f(): pass").unwrap();

        let result = run_extraction(
            dir.path(),
            &scanner(),
            &FingerprintMap::new(),
            2,
            Duration::ZERO,
        );
        assert!(matches!(result, Err(IndexError::DeadlineExceeded { .. })));
    }
}
