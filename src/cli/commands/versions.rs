use super::print_json;
use crate::cli::VersionsArgs;
use crate::config::{self, CliOverrides};
use crate::error::{DashError, Result};
use crate::format::render_versions;
use crate::remote::IssueSource;

/// Execute the versions command.
///
/// # Errors
///
/// Returns a validation error for a blank project key, or an error if the
/// source or store is unavailable.
pub fn execute(args: &VersionsArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let project = args.project.trim();
    if project.is_empty() {
        return Err(DashError::validation("project", "must not be empty"));
    }
    let loaded = config::load_for_command(cli)?;

    let versions = if args.cached {
        loaded.storage()?.list_versions(project)?
    } else {
        loaded.source()?.project_versions(project)?
    };

    if json {
        print_json(&versions)
    } else {
        print!("{}", render_versions(&versions));
        Ok(())
    }
}
