use super::print_json;
use crate::cli::CachedArgs;
use crate::config::{self, CliOverrides};
use crate::error::Result;
use crate::format::render_projects;
use crate::remote::IssueSource;

/// Execute the projects command.
///
/// # Errors
///
/// Returns an error if the source or store is unavailable.
pub fn execute(args: &CachedArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let loaded = config::load_for_command(cli)?;

    let projects = if args.cached {
        loaded.storage()?.list_projects()?
    } else {
        loaded.source()?.projects()?
    };

    if json {
        print_json(&projects)
    } else {
        print!("{}", render_projects(&projects));
        Ok(())
    }
}
