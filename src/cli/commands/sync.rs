use super::print_json;
use crate::cli::SyncArgs;
use crate::config::{self, CliOverrides};
use crate::dashboard::{SyncReport, sync_project, sync_projects};
use crate::error::{DashError, Result};
use crate::format::render_sync_report;
use serde::Serialize;

#[derive(Serialize)]
struct SyncOutput {
    projects: usize,
    synced: Vec<SyncReport>,
}

/// Execute the sync command.
///
/// Refreshes the project list, then mirrors each requested project in turn.
/// With no keys, every project in the refreshed list is mirrored. Stops at the first failure; projects synced before it stay committed.
///
/// # Errors
///
/// Returns an error if the store is missing, a project key is blank, or the
/// source fails.
pub fn execute(args: &SyncArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    if args.projects.iter().any(|p| p.trim().is_empty()) {
        return Err(DashError::validation("project", "must not be empty"));
    }
    let loaded = config::load_for_command(cli)?;
    let mut storage = loaded.storage()?;
    let source = loaded.source()?;

    let projects = sync_projects(&source, &mut storage)?;
    let keys: Vec<String> = if args.projects.is_empty() {
        storage.list_projects()?.into_iter().map(|p| p.key).collect()
    } else {
        args.projects.iter().map(|k| k.trim().to_string()).collect()
    };

    let mut synced = Vec::with_capacity(keys.len());
    for key in &keys {
        let report = sync_project(&source, &mut storage, key)?;
        if !json {
            print!("{}", render_sync_report(&report));
        }
        synced.push(report);
    }

    if json {
        print_json(&SyncOutput { projects, synced })
    } else {
        println!("{projects} projects in cache");
        Ok(())
    }
}
