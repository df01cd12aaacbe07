//! Mirror remote issues and project metadata into the local store.

use crate::error::Result;
use crate::fetch::fetch_all;
use crate::model::FilterSet;
use crate::remote::IssueSource;
use crate::storage::{SqliteStorage, last_sync_key};
use crate::util::format_timestamp;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// Outcome of [`sync_project`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub project_key: String,
    pub fetched: usize,
    pub created: usize,
    pub updated: usize,
    pub versions: usize,
    pub synced_at: DateTime<Utc>,
}

/// Fetch every issue of `project_key` and upsert it, together with the
/// project's releases.
///
/// The fetch completes before anything is written, so a remote failure
/// leaves the store untouched.
///
/// # Errors
///
/// Returns any source or storage error.
pub fn sync_project<S: IssueSource + ?Sized>(
    source: &S,
    storage: &mut SqliteStorage,
    project_key: &str,
) -> Result<SyncReport> {
    let filters = FilterSet::for_project(project_key);
    let page = fetch_all(source, Some(&filters))?;
    let versions = source.project_versions(project_key)?;

    let counts = storage.upsert_issues(&page.issues)?;
    let version_count = storage.upsert_versions(&versions)?;

    let synced_at = Utc::now();
    storage.set_metadata(&last_sync_key(project_key), &format_timestamp(&synced_at))?;

    info!(
        project = project_key,
        fetched = page.issues.len(),
        created = counts.created,
        updated = counts.updated,
        versions = version_count,
        "Sync complete"
    );

    Ok(SyncReport {
        project_key: project_key.to_string(),
        fetched: page.issues.len(),
        created: counts.created,
        updated: counts.updated,
        versions: version_count,
        synced_at,
    })
}

/// Refresh the stored project list.
///
/// # Errors
///
/// Returns any source or storage error.
pub fn sync_projects<S: IssueSource + ?Sized>(source: &S, storage: &mut SqliteStorage) -> Result<usize> {
    let projects = source.projects()?;
    let count = storage.upsert_projects(&projects)?;
    info!(count, "Synced project list");
    Ok(count)
}
