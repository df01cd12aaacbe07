//! Remote issue sources.
//!
//! The dashboard core talks to a single capability, [`IssueSource`]. Two
//! implementations exist: [`JiraClient`] for the live REST API and
//! [`FixtureSource`] for a fixed issue list loaded from disk. Which one is
//! used is decided by configuration, never by catching errors.

mod fixture;
mod http;
pub mod payload;

pub use fixture::FixtureSource;
pub use http::JiraClient;
pub use payload::{RawIssue, SearchResponse};

use crate::error::Result;
use crate::model::{FilterSet, Project, ProjectVersion};
use crate::query::to_jql;

/// Fields requested on every search.
pub const SEARCH_FIELDS: &str = "summary,description,project,status,issuetype,priority,assignee,reporter,created,updated,resolutiondate,fixVersions";

/// A single paged search.
///
/// Carries both the rendered JQL (for the remote) and the structured filter
/// (for sources that evaluate locally).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub jql: String,
    pub filters: FilterSet,
    pub start_at: u64,
    pub max_results: u64,
    pub fields: String,
}

impl SearchRequest {
    #[must_use]
    pub fn new(filters: Option<&FilterSet>, start_at: u64, max_results: u64) -> Self {
        Self {
            jql: to_jql(filters),
            filters: filters.cloned().unwrap_or_default(),
            start_at,
            max_results,
            fields: SEARCH_FIELDS.to_string(),
        }
    }
}

/// Capability of answering paged issue searches plus project metadata.
pub trait IssueSource {
    /// Run one paged search.
    ///
    /// # Errors
    ///
    /// Any transport, status or payload failure. Implementations never
    /// substitute placeholder data.
    fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;

    /// List every project visible to the configured account.
    ///
    /// # Errors
    ///
    /// Same failure classes as [`IssueSource::search`].
    fn projects(&self) -> Result<Vec<Project>>;

    /// List the releases of one project.
    ///
    /// # Errors
    ///
    /// Same failure classes as [`IssueSource::search`].
    fn project_versions(&self, project_key: &str) -> Result<Vec<ProjectVersion>>;
}

impl<T: IssueSource + ?Sized> IssueSource for &T {
    fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        (**self).search(request)
    }

    fn projects(&self) -> Result<Vec<Project>> {
        (**self).projects()
    }

    fn project_versions(&self, project_key: &str) -> Result<Vec<ProjectVersion>> {
        (**self).project_versions(project_key)
    }
}

impl<T: IssueSource + ?Sized> IssueSource for Box<T> {
    fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        (**self).search(request)
    }

    fn projects(&self) -> Result<Vec<Project>> {
        (**self).projects()
    }

    fn project_versions(&self, project_key: &str) -> Result<Vec<ProjectVersion>> {
        (**self).project_versions(project_key)
    }
}
