//! Worker pool coordination.
//!
//! A run moves through four states:
//!
//! ```text
//! Collecting ──► Draining ──► Succeeded
//!                    └──────► Failed
//! ```
//!
//! While collecting, the job queue is already closed and the workers hash
//! into a results channel sized to the job count, so no send ever blocks.
//! The coordinator joins every worker before draining, which guarantees no
//! sender is left when the results channel is read to the end.

use std::fmt;

use crossbeam_channel::bounded;
use tracing::{debug, error, info, trace};

use crate::aggregator::{self, Summary};
use crate::algorithm::Algorithm;
use crate::config::Config;
use crate::error::RunError;
use crate::queue::JobQueue;
use crate::report::Reporter;
use crate::worker::{JobResult, Worker, WorkerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Collecting,
    Draining,
    Succeeded,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Collecting => "collecting",
            RunState::Draining => "draining",
            RunState::Succeeded => "succeeded",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Never more workers than jobs; zero jobs means zero workers.
pub fn effective_workers(configured: usize, jobs: usize) -> usize {
    configured.min(jobs)
}

/// Hash every configured input and report the results and summary.
pub fn run(config: &Config, reporter: &mut dyn Reporter) -> Result<Summary, RunError> {
    let queue = JobQueue::build(&config.files)?;
    let summary = hash_all(&queue, config.workers, config.algorithm, reporter)?;
    reporter.summary(&summary)?;
    Ok(summary)
}

/// Run the pool over a closed job queue and aggregate the results.
pub fn hash_all(
    queue: &JobQueue,
    workers: usize,
    algorithm: Algorithm,
    reporter: &mut dyn Reporter,
) -> Result<Summary, RunError> {
    let jobs = queue.len();
    let workers = effective_workers(workers, jobs);
    if queue.is_empty() {
        info!("no files to hash");
    }
    let (results_tx, results_rx) = bounded::<JobResult>(jobs.max(1));

    info!(jobs, workers, %algorithm, state = %RunState::Collecting, "starting workers");

    let mut pool = Vec::with_capacity(workers);
    for id in 0..workers {
        pool.push(Worker::spawn(
            id,
            algorithm,
            queue.receiver(),
            results_tx.clone(),
        )?);
    }
    // Workers now hold the only senders
    drop(results_tx);

    let processed = join_all(pool)?;
    debug_assert_eq!(processed, jobs);

    debug!(processed, state = %RunState::Draining, "all workers finished");

    match aggregator::aggregate(&results_rx, reporter) {
        Ok(summary) => {
            debug!(files = summary.files, state = %RunState::Succeeded, "run complete");
            Ok(summary)
        }
        Err(e) => {
            debug!(state = %RunState::Failed, "run aborted");
            Err(e)
        }
    }
}

/// Completion barrier: wait for every worker, then report the first failure.
fn join_all(pool: Vec<Worker>) -> Result<usize, WorkerError> {
    let mut processed = 0;
    let mut first_error = None;

    for worker in pool {
        let id = worker.id();
        match worker.join() {
            Ok(n) => {
                trace!(worker = id, processed = n, "worker joined");
                processed += n;
            }
            Err(e) => {
                error!(worker = id, error = %e, "worker failed");
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(processed),
    }
}
