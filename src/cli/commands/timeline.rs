use super::print_json;
use crate::cli::TimelineArgs;
use crate::config::{self, CliOverrides};
use crate::dashboard::{Dashboard, validate_days};
use crate::error::Result;
use crate::format::render_timeline;

/// Execute the timeline command.
///
/// # Errors
///
/// Returns an error if `--days` is out of range, the filters are invalid, or
/// the source is unavailable.
pub fn execute(args: &TimelineArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    validate_days(args.days)?;
    let filters = args.filters.to_filter_set()?;
    let loaded = config::load_for_command(cli)?;

    let timeline = Dashboard::new(loaded.source()?).timeline(filters.as_ref(), args.days)?;

    if json {
        print_json(&timeline)
    } else {
        print!("{}", render_timeline(&timeline));
        Ok(())
    }
}
