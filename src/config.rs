//! Command-line parsing and run configuration.
//!
//! The [`Cli`] is what clap sees; [`Config`] is the validated, immutable
//! settings the pool runs with. The default algorithm follows the name the
//! binary was invoked as, so a `sha1sum` symlink behaves like `sha1sum`.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, ValueEnum};
use thiserror::Error;

use crate::algorithm::Algorithm;
use crate::hasher::STDIN_PATH;

/// Invocation names that select a default algorithm and read stdin when no
/// file is given.
const INVOCATION_DEFAULTS: &[(&str, Algorithm)] = &[
    ("sha1sum", Algorithm::Sha1),
    ("sha224sum", Algorithm::Sha224),
    ("sha256sum", Algorithm::Sha256),
    ("sha384sum", Algorithm::Sha384),
    ("sha512sum", Algorithm::Sha512),
    ("xxh3sum", Algorithm::Xxh3),
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unsupported algorithm: {0} (expected one of 1, 224, 256, 384, 512, xxh3)")]
    UnsupportedAlgorithm(String),

    #[error("invalid worker count {0}: must be at least 1")]
    InvalidWorkerCount(usize),

    #[error("no input files given. Usage: {program} file [file ...]")]
    NoFiles { program: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `<hash> *<path>` lines and a summary line
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "parsum", version)]
#[command(about = "Compute file checksums in parallel and report throughput")]
pub struct Cli {
    /// Files to hash (`-` reads standard input)
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Number of worker threads
    #[arg(short, long, value_name = "NUM", default_value_t = default_workers())]
    pub workers: usize,

    /// Digest algorithm: 1, 224, 256, 384, 512 or xxh3
    #[arg(short, long, value_name = "ALG")]
    pub algorithm: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// More log output (repeat for trace)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

fn default_workers() -> usize {
    num_cpus::get()
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub workers: usize,
    pub algorithm: Algorithm,
    pub files: Vec<PathBuf>,
    pub format: OutputFormat,
}

impl Config {
    /// Resolve CLI arguments against the invocation name (`argv[0]`).
    pub fn from_cli(cli: &Cli, argv0: &str) -> Result<Self, ConfigError> {
        if cli.workers == 0 {
            return Err(ConfigError::InvalidWorkerCount(cli.workers));
        }

        let invoked_as = invocation_default(argv0);

        let algorithm = match &cli.algorithm {
            Some(code) => code.parse()?,
            None => invoked_as.unwrap_or_default(),
        };

        let files = if !cli.files.is_empty() {
            cli.files.clone()
        } else if invoked_as.is_some() {
            vec![PathBuf::from(STDIN_PATH)]
        } else {
            return Err(ConfigError::NoFiles {
                program: program_name(argv0).to_string(),
            });
        };

        Ok(Self {
            workers: cli.workers,
            algorithm,
            files,
            format: cli.format,
        })
    }
}

/// Default algorithm for a known invocation name, if any.
pub fn invocation_default(argv0: &str) -> Option<Algorithm> {
    let name = program_name(argv0);
    INVOCATION_DEFAULTS
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|&(_, alg)| alg)
}

fn program_name(argv0: &str) -> &str {
    Path::new(argv0)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(argv0)
}
