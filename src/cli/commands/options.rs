use super::print_json;
use crate::cli::FilterArgs;
use crate::config::{self, CliOverrides};
use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::format::render_options;

/// Execute the options command.
///
/// # Errors
///
/// Returns an error if the filters are invalid or the source is unavailable.
pub fn execute(args: &FilterArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let filters = args.to_filter_set()?;
    let loaded = config::load_for_command(cli)?;

    let options = Dashboard::new(loaded.source()?).filter_options(filters.as_ref())?;

    if json {
        print_json(&options)
    } else {
        print!("{}", render_options(&options));
        Ok(())
    }
}
