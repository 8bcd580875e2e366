//! Coordinator-side result loop.
//!
//! Turns the stream of per-file results into a run-level outcome. The first
//! failed result ends the run: nothing after it is reported and the partial
//! totals are dropped, so a summary is only ever produced for a clean run.

use std::time::Duration;

use crossbeam_channel::Receiver;
use tracing::debug;

use crate::error::RunError;
use crate::report::Reporter;
use crate::worker::JobResult;

const MEGA_BYTES: f64 = 1024.0 * 1024.0;

/// Totals over every successfully hashed file.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub files: usize,
    pub total_bytes: u64,
    /// Sum of per-file hashing time across all workers
    pub total_duration: Duration,
}

impl Summary {
    fn add(&mut self, result: &JobResult) {
        self.files += 1;
        self.total_bytes += result.size;
        self.total_duration += result.duration;
    }

    /// Throughput in MiB per second of hashing time. `None` when no time was
    /// recorded (no files, or hashing too fast to measure).
    pub fn throughput_mib_per_sec(&self) -> Option<f64> {
        let secs = self.total_duration.as_secs_f64();
        if secs == 0.0 {
            return None;
        }
        Some((self.total_bytes as f64 / MEGA_BYTES) / secs)
    }
}

/// Drain a closed results channel, reporting each success as it arrives.
///
/// The channel must already be closed (every sender dropped), otherwise
/// this blocks waiting for more results.
pub fn aggregate(
    results: &Receiver<JobResult>,
    reporter: &mut dyn Reporter,
) -> Result<Summary, RunError> {
    let mut summary = Summary::default();

    for mut result in results.iter() {
        if let Some(err) = result.error.take() {
            debug!(path = %result.path.display(), "failing run on first error");
            return Err(RunError::Hash(err));
        }

        reporter.file(&result)?;
        summary.add(&result);
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::HashError;
    use crate::report::TextReporter;
    use crossbeam_channel::bounded;
    use std::io;
    use std::path::PathBuf;

    fn ok(path: &str, hash: &str, size: u64, millis: u64) -> JobResult {
        JobResult {
            path: PathBuf::from(path),
            hash: hash.to_string(),
            size,
            duration: Duration::from_millis(millis),
            error: None,
        }
    }

    fn failed(path: &str) -> JobResult {
        JobResult {
            path: PathBuf::from(path),
            hash: String::new(),
            size: 0,
            duration: Duration::ZERO,
            error: Some(HashError::Open {
                path: PathBuf::from(path),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            }),
        }
    }

    fn closed_channel(results: Vec<JobResult>) -> Receiver<JobResult> {
        let (tx, rx) = bounded(results.len().max(1));
        for r in results {
            tx.send(r).unwrap();
        }
        rx
    }

    #[test]
    fn test_accumulates_totals() {
        let rx = closed_channel(vec![ok("a", "aa", 3, 500), ok("b", "bb", 7, 1500)]);
        let mut out = Vec::new();

        let summary = aggregate(&rx, &mut TextReporter::new(&mut out)).unwrap();
        assert_eq!(summary.files, 2);
        assert_eq!(summary.total_bytes, 10);
        assert_eq!(summary.total_duration, Duration::from_secs(2));
        assert_eq!(String::from_utf8(out).unwrap(), "aa *a\nbb *b\n");
    }

    #[test]
    fn test_first_error_stops_drain() {
        let rx = closed_channel(vec![ok("a", "aa", 3, 1), failed("bad"), ok("c", "cc", 1, 1)]);
        let mut out = Vec::new();

        let err = aggregate(&rx, &mut TextReporter::new(&mut out)).unwrap_err();
        assert!(matches!(err, RunError::Hash(HashError::Open { .. })));
        // Lines before the failure stay printed, nothing after it
        assert_eq!(String::from_utf8(out).unwrap(), "aa *a\n");
    }

    #[test]
    fn test_empty_run() {
        let rx = closed_channel(Vec::new());
        let mut out = Vec::new();

        let summary = aggregate(&rx, &mut TextReporter::new(&mut out)).unwrap();
        assert_eq!(summary, Summary::default());
        assert!(out.is_empty());
    }

    #[test]
    fn test_throughput() {
        let summary = Summary {
            files: 1,
            total_bytes: 4 * 1024 * 1024,
            total_duration: Duration::from_secs(2),
        };
        assert_eq!(summary.throughput_mib_per_sec(), Some(2.0));
        assert_eq!(Summary::default().throughput_mib_per_sec(), None);
    }
}
