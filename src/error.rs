//! Run-level error type.
//!
//! Every failure ends the run with a single message and a non-zero exit:
//! - Configuration errors, before any work starts
//! - Stat failures while building the job queue
//! - The first per-file hashing error the aggregator sees
//! - Worker thread failures and broken stdout

use std::io;
use thiserror::Error;

use crate::config::ConfigError;
use crate::hasher::HashError;
use crate::queue::QueueError;
use crate::worker::WorkerError;

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Hash(#[from] HashError),

    #[error(transparent)]
    Worker(#[from] WorkerError),

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}
