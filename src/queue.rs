//! Job queue: the static work list handed from the coordinator to workers.
//!
//! The queue is sized to the number of jobs, filled completely and closed
//! before any worker starts, so population never blocks and a worker seeing
//! an empty queue knows the work is done.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crossbeam_channel::{Receiver, bounded};
use thiserror::Error;
use tracing::{debug, info};

use crate::hasher::STDIN_PATH;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("can not stat file {path}: {source}")]
    Stat {
        path: PathBuf,
        source: io::Error,
    },
}

/// One file queued for hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub path: PathBuf,
}

/// A closed, fully populated job queue.
#[derive(Debug)]
pub struct JobQueue {
    receiver: Receiver<Job>,
    len: usize,
}

impl JobQueue {
    /// Stat every input, skip directories and enqueue the rest in input order.
    ///
    /// Fails on the first path that cannot be stat-ed; nothing is hashed in
    /// that case.
    pub fn build<P: AsRef<Path>>(paths: &[P]) -> Result<Self, QueueError> {
        let mut jobs = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            if is_directory(path)? {
                info!(path = %path.display(), "skipping directory");
                continue;
            }
            jobs.push(Job {
                path: path.to_path_buf(),
            });
        }

        Ok(Self::from_jobs(jobs))
    }

    /// Enqueue already validated jobs and close the queue.
    pub fn from_jobs(jobs: Vec<Job>) -> Self {
        let len = jobs.len();
        // capacity 0 would make a rendezvous channel
        let (sender, receiver) = bounded(len.max(1));

        for job in jobs {
            // Cannot fail: we hold the receiver and capacity fits every job
            let _ = sender.send(job);
        }
        drop(sender);

        debug!(jobs = len, "job queue populated and closed");
        Self { receiver, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// A reader handle. Each job is delivered to exactly one reader.
    pub fn receiver(&self) -> Receiver<Job> {
        self.receiver.clone()
    }
}

fn is_directory(path: &Path) -> Result<bool, QueueError> {
    if path.as_os_str() == STDIN_PATH {
        return Ok(false);
    }

    let meta = fs::metadata(path).map_err(|source| QueueError::Stat {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(meta.is_dir())
}
