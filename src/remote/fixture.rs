//! Offline issue source backed by a JSON file.
//!
//! The file uses the search-response shape (`{"issues": [...]}`), optionally
//! extended with `projects` and a `versions` map keyed by project key. The
//! file's own `total` is ignored; totals are computed after filtering.

use super::payload::{RawIssue, RawProject, RawVersion, SearchResponse};
use super::{IssueSource, SearchRequest};
use crate::error::{DashError, Result};
use crate::fetch::normalize_issue;
use crate::model::{Project, ProjectVersion};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
struct FixtureFile {
    #[serde(default)]
    issues: Vec<RawIssue>,
    #[serde(default)]
    projects: Vec<RawProject>,
    #[serde(default)]
    versions: HashMap<String, Vec<RawVersion>>,
}

/// Fixed in-memory issue list that evaluates filters locally.
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    issues: Vec<RawIssue>,
    projects: Vec<RawProject>,
    versions: HashMap<String, Vec<RawVersion>>,
}

impl FixtureSource {
    /// Load a fixture file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON of
    /// the expected shape.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            DashError::Config(format!("cannot read fixture {}: {e}", path.display()))
        })?;
        let file: FixtureFile = serde_json::from_str(&contents)?;
        debug!(
            path = %path.display(),
            issues = file.issues.len(),
            projects = file.projects.len(),
            "Loaded fixture"
        );
        Ok(Self {
            issues: file.issues,
            projects: file.projects,
            versions: file.versions,
        })
    }

    /// Build a source from raw issues already in memory.
    #[must_use]
    pub fn from_issues(issues: Vec<RawIssue>) -> Self {
        Self {
            issues,
            ..Self::default()
        }
    }
}

impl IssueSource for FixtureSource {
    fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let matching: Vec<&RawIssue> = self
            .issues
            .iter()
            .filter(|raw| request.filters.matches(&normalize_issue(raw)))
            .collect();

        let total = matching.len() as u64;
        let start = usize::try_from(request.start_at).unwrap_or(usize::MAX);
        let take = usize::try_from(request.max_results).unwrap_or(usize::MAX);
        let issues = matching
            .into_iter()
            .skip(start)
            .take(take)
            .cloned()
            .collect();

        Ok(SearchResponse {
            issues,
            total,
            start_at: request.start_at,
            max_results: request.max_results,
        })
    }

    fn projects(&self) -> Result<Vec<Project>> {
        Ok(self
            .projects
            .iter()
            .cloned()
            .map(RawProject::into_project)
            .collect())
    }

    fn project_versions(&self, project_key: &str) -> Result<Vec<ProjectVersion>> {
        Ok(self
            .versions
            .get(project_key)
            .map(|list| {
                list.iter()
                    .cloned()
                    .map(|v| v.into_version(project_key))
                    .collect()
            })
            .unwrap_or_default())
    }
}
