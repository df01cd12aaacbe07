//! An issue source that replays a fixed remote and records every request.

use std::cell::RefCell;
use tracker_dash::error::{DashError, Result};
use tracker_dash::model::{Project, ProjectVersion};
use tracker_dash::remote::{IssueSource, RawIssue, SearchRequest, SearchResponse};

/// Serves `issues` page by page, reporting `total` regardless of filters
/// (the way the remote reports its own count). Can be told to fail at a
/// given offset or to under-deliver.
pub struct ScriptedSource {
    issues: Vec<RawIssue>,
    total: u64,
    fail_at: Option<u64>,
    pub requests: RefCell<Vec<SearchRequest>>,
}

impl ScriptedSource {
    pub fn new(issues: Vec<RawIssue>) -> Self {
        let total = issues.len() as u64;
        Self {
            issues,
            total,
            fail_at: None,
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Report a `total` different from the number of records served.
    pub fn with_reported_total(mut self, total: u64) -> Self {
        self.total = total;
        self
    }

    /// Fail with a timeout when a request starts at `offset`.
    pub fn failing_at(mut self, offset: u64) -> Self {
        self.fail_at = Some(offset);
        self
    }

    pub fn offsets(&self) -> Vec<u64> {
        self.requests.borrow().iter().map(|r| r.start_at).collect()
    }

    pub fn jql(&self) -> Vec<String> {
        self.requests.borrow().iter().map(|r| r.jql.clone()).collect()
    }
}

impl IssueSource for ScriptedSource {
    fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.requests.borrow_mut().push(request.clone());
        if self.fail_at == Some(request.start_at) {
            return Err(DashError::RemoteTimeout {
                url: "https://example.atlassian.net/rest/api/3/search".to_string(),
                timeout_secs: 30,
            });
        }

        let start = usize::try_from(request.start_at).unwrap_or(usize::MAX);
        let take = usize::try_from(request.max_results).unwrap_or(usize::MAX);
        Ok(SearchResponse {
            issues: self.issues.iter().skip(start).take(take).cloned().collect(),
            total: self.total,
            start_at: request.start_at,
            max_results: request.max_results,
        })
    }

    fn projects(&self) -> Result<Vec<Project>> {
        Ok(Vec::new())
    }

    fn project_versions(&self, _project_key: &str) -> Result<Vec<ProjectVersion>> {
        Ok(Vec::new())
    }
}
