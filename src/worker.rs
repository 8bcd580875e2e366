//! Hashing worker threads.
//!
//! Each worker:
//! - Pulls jobs from the shared job queue until it is closed and empty
//! - Hashes one file per job, timing only the hashing itself
//! - Sends exactly one [`JobResult`] per job, success or failure
//!
//! Per-file errors are reported in the result and never stop the worker.
//! Deciding whether an error ends the run is the aggregator's job.

use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::algorithm::Algorithm;
use crate::hasher::{self, HashError};
use crate::queue::Job;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("failed to start worker {id}: {reason}")]
    InitFailed { id: usize, reason: String },

    #[error("worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },
}

/// Outcome of hashing one job.
#[derive(Debug)]
pub struct JobResult {
    pub path: PathBuf,
    /// Lowercase hex digest, empty on failure
    pub hash: String,
    /// Bytes read, including a partial count on failure
    pub size: u64,
    pub duration: Duration,
    pub error: Option<HashError>,
}

impl JobResult {
    fn from_outcome(
        path: PathBuf,
        outcome: Result<hasher::FileDigest, HashError>,
        duration: Duration,
    ) -> Self {
        match outcome {
            Ok(digest) => Self {
                path,
                hash: digest.hash,
                size: digest.size,
                duration,
                error: None,
            },
            Err(e) => Self {
                path,
                hash: String::new(),
                size: e.bytes_read(),
                duration,
                error: Some(e),
            },
        }
    }
}

/// A worker thread that hashes queued files
#[derive(Debug)]
pub struct Worker {
    id: usize,
    handle: Option<JoinHandle<usize>>,
}

impl Worker {
    /// Spawn a worker bound to the shared job queue and results channel.
    pub fn spawn(
        id: usize,
        algorithm: Algorithm,
        jobs: Receiver<Job>,
        results: Sender<JobResult>,
    ) -> Result<Self, WorkerError> {
        let handle = thread::Builder::new()
            .name(format!("hasher-{id}"))
            .spawn(move || worker_loop(id, algorithm, &jobs, &results))
            .map_err(|e| WorkerError::InitFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Wait for the worker to drain the queue. Returns the number of jobs it
    /// processed.
    pub fn join(mut self) -> Result<usize, WorkerError> {
        let Some(handle) = self.handle.take() else {
            return Ok(0);
        };

        handle.join().map_err(|payload| WorkerError::Panicked {
            id: self.id,
            message: panic_message(payload.as_ref()),
        })
    }
}

fn worker_loop(
    id: usize,
    algorithm: Algorithm,
    jobs: &Receiver<Job>,
    results: &Sender<JobResult>,
) -> usize {
    trace!(worker = id, "worker starting");
    let mut processed = 0;

    // Iteration ends once the queue is closed and drained
    for job in jobs.iter() {
        let result = process_job(id, job, algorithm);
        processed += 1;

        if results.send(result).is_err() {
            // Only happens if the coordinator went away
            warn!(worker = id, "results channel closed, stopping");
            break;
        }
    }

    trace!(worker = id, processed, "worker finished");
    processed
}

/// Hash one job into a result. Time spent waiting in the queue is excluded.
pub fn process_job(id: usize, job: Job, algorithm: Algorithm) -> JobResult {
    let start = Instant::now();
    debug!(worker = id, path = %job.path.display(), "processing file");

    let outcome = hasher::hash_path(&job.path, algorithm);
    let duration = start.elapsed();

    match &outcome {
        Ok(digest) => {
            debug!(worker = id, path = %job.path.display(), size = digest.size, "hashed file");
        }
        Err(e) => {
            debug!(worker = id, path = %job.path.display(), error = %e, "hashing failed");
        }
    }

    JobResult::from_outcome(job.path, outcome, duration)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::JobQueue;
    use crossbeam_channel::bounded;
    use tempfile::tempdir;

    #[test]
    fn test_process_job_success() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("b.txt");
        std::fs::write(&path, b"").unwrap();

        let result = process_job(0, Job { path: path.clone() }, Algorithm::Sha256);
        assert!(result.error.is_none());
        assert_eq!(result.path, path);
        assert_eq!(result.size, 0);
        assert_eq!(
            result.hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_process_job_failure_carries_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gone.txt");

        let result = process_job(0, Job { path }, Algorithm::Sha256);
        assert!(result.error.is_some());
        assert!(result.hash.is_empty());
        assert_eq!(result.size, 0);
        assert!(matches!(result.error, Some(HashError::Open { .. })));
    }

    #[test]
    fn test_read_failure_keeps_partial_size() {
        let path = PathBuf::from("flaky.bin");
        let outcome = Err(HashError::Read {
            path: path.clone(),
            bytes_read: 4096,
            source: std::io::Error::other("device went away"),
        });

        let result = JobResult::from_outcome(path.clone(), outcome, Duration::from_millis(3));
        assert_eq!(result.path, path);
        assert_eq!(result.size, 4096);
        assert!(result.hash.is_empty());
        assert_eq!(result.duration, Duration::from_millis(3));
        assert!(matches!(
            result.error,
            Some(HashError::Read { bytes_read: 4096, .. })
        ));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_process_job_read_failure_after_open() {
        // A directory opens fine on Linux but every read fails with EISDIR
        let dir = tempdir().unwrap();

        let result = process_job(
            0,
            Job {
                path: dir.path().to_path_buf(),
            },
            Algorithm::Sha256,
        );
        assert!(result.hash.is_empty());
        assert_eq!(result.size, 0);
        assert!(matches!(result.error, Some(HashError::Read { .. })));
    }

    #[test]
    fn test_worker_continues_after_error() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.txt");
        std::fs::write(&good, b"abc").unwrap();
        let bad = dir.path().join("bad.txt");

        let queue = JobQueue::from_jobs(vec![
            Job { path: bad },
            Job { path: good.clone() },
        ]);
        let (tx, rx) = bounded(queue.len());

        let worker = Worker::spawn(7, Algorithm::Sha256, queue.receiver(), tx).unwrap();
        assert_eq!(worker.id(), 7);
        assert_eq!(worker.join().unwrap(), 2);

        let results: Vec<JobResult> = rx.iter().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].error.is_some());
        assert!(results[1].error.is_none());
        assert_eq!(results[1].path, good);
    }

    #[test]
    fn test_worker_exits_on_closed_empty_queue() {
        let queue = JobQueue::from_jobs(Vec::new());
        let (tx, rx) = bounded(1);

        let worker = Worker::spawn(0, Algorithm::Sha1, queue.receiver(), tx).unwrap();
        assert_eq!(worker.join().unwrap(), 0);
        assert_eq!(rx.iter().count(), 0);
    }
}
