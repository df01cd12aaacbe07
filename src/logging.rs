//! Logging setup.
//!
//! All diagnostics go to stderr (or a log file) so stdout stays clean for
//! JSON output. `RUST_LOG` always wins over the `-v`/`-q` flags.

use anyhow::Context;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Initialize the global tracing subscriber.
///
/// Verbosity: `0` → warn, `1` → info, `2+` → debug (trace for the crate at 3+).
/// `quiet` forces error-only output. When `log_file` is set, events are
/// appended there as JSON lines instead of being written to stderr.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a global subscriber
/// was already installed.
pub fn init_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let default_directive = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "tracker_dash=trace,debug",
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening log file {}", path.display()))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(Mutex::new(file)))
            .try_init()
            .context("installing tracing subscriber")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(verbose >= 2),
            )
            .try_init()
            .context("installing tracing subscriber")?;
    }

    Ok(())
}

/// Install a test-friendly subscriber. Safe to call from every test.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}
