mod aggregator;
mod algorithm;
mod config;
mod error;
mod hasher;
mod logging;
mod pool;
mod queue;
mod report;
mod worker;

use std::io;
use std::process::ExitCode;

use clap::Parser;

use crate::config::{Cli, Config};
use crate::error::RunError;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet, cli.log_file.as_deref());

    let argv0 = std::env::args_os()
        .next()
        .map(|arg| arg.to_string_lossy().into_owned())
        .unwrap_or_else(|| "parsum".to_string());

    match run(&cli, &argv0) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Plain stderr, outside any RUST_LOG filter
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, argv0: &str) -> Result<(), RunError> {
    let config = Config::from_cli(cli, argv0)?;

    let stdout = io::stdout();
    let mut reporter = report::reporter_for(config.format, stdout.lock());
    pool::run(&config, reporter.as_mut())?;
    Ok(())
}
