//! Subcommand implementations.
//!
//! Each command resolves config, runs one dashboard operation, and prints
//! either JSON (`--json`) or the text rendering to stdout.

pub mod config;
pub mod init;
pub mod issues;
pub mod options;
pub mod projects;
pub mod stats;
pub mod sync;
pub mod timeline;
pub mod versions;

use crate::error::Result;
use serde::Serialize;

/// Print `value` as pretty JSON on stdout.
fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
