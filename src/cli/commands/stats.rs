use super::print_json;
use crate::cli::StatsArgs;
use crate::config::{self, CliOverrides};
use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::format::render_stats;
use crate::stats::aggregate;
use chrono::Utc;
use tracing::debug;

/// Execute the stats command.
///
/// # Errors
///
/// Returns an error if the filters are invalid or the source or store is
/// unavailable. An unavailable source is never reported as zero counts.
pub fn execute(args: &StatsArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let loaded = config::load_for_command(cli)?;
    let filters = args.filters.to_filter_set()?;

    let stats = if args.cached {
        let storage = loaded.storage()?;
        let issues = storage.list_issues(&filters.unwrap_or_default())?;
        debug!(issues = issues.len(), "Aggregating cached issues");
        aggregate(&issues, Utc::now())
    } else {
        Dashboard::new(loaded.source()?).stats(filters.as_ref())?
    };

    if json {
        print_json(&stats)
    } else {
        print!("{}", render_stats(&stats));
        Ok(())
    }
}
