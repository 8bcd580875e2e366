//! Logging configuration for parsum.
//!
//! - Console output always goes to stderr, stdout is reserved for checksums
//! - `--log-file` adds a plain-text file layer
//! - `RUST_LOG` overrides the level picked from `-v` / `-q`

use std::io::{self, IsTerminal};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default log level for a verbosity setting.
pub fn level_for(verbose: u8, quiet: bool) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    }
}

pub fn init(verbose: u8, quiet: bool, log_file: Option<&Path>) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level_for(verbose, quiet);
        EnvFilter::new(format!("parsum={level},warn"))
    });

    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_names(verbose > 0)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr);

    let file_layer = log_file.and_then(setup_file_appender).map(|appender| {
        fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .with_thread_names(true)
            .with_writer(appender)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();
}

fn setup_file_appender(path: &Path) -> Option<RollingFileAppender> {
    let file_name = path.file_name()?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(dir)
        .map_err(|e| eprintln!("cannot open log file {}: {e}", path.display()))
        .ok()
}
