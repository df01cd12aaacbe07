//! Dashboard-facing API.
//!
//! [`Dashboard`] is what a route layer (here, the CLI) calls. Every read
//! re-walks the source; there is no in-process cache. A source failure is
//! returned as `Err` and never turned into an empty result.

mod sync;

pub use sync::{SyncReport, sync_project, sync_projects};

use crate::error::{DashError, Result};
use crate::fetch::{IssuePage, fetch_all, fetch_page};
use crate::model::FilterSet;
use crate::remote::IssueSource;
use crate::stats::{self, DashboardStats, FilterOptions, Timeline};
use chrono::{DateTime, Utc};
use tracing::info;

/// Longest timeline the dashboard will build.
pub const MAX_TIMELINE_DAYS: u32 = 365;

/// How `list_issues` should page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paging {
    /// Every matching issue in one page.
    All,
    /// One 1-based page of `per_page` issues.
    Page { page: u64, per_page: u64 },
}

#[derive(Debug)]
pub struct Dashboard<S> {
    source: S,
}

impl<S: IssueSource> Dashboard<S> {
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    pub const fn source(&self) -> &S {
        &self.source
    }

    /// List issues, either one page or exhaustively.
    ///
    /// # Errors
    ///
    /// Returns any source error, or a validation error for a zero page.
    pub fn list_issues(&self, filters: Option<&FilterSet>, paging: Paging) -> Result<IssuePage> {
        match paging {
            Paging::All => fetch_all(&self.source, filters),
            Paging::Page { page, per_page } => fetch_page(&self.source, filters, page, per_page),
        }
    }

    /// Aggregate statistics as of now.
    ///
    /// # Errors
    ///
    /// Returns any source error.
    pub fn stats(&self, filters: Option<&FilterSet>) -> Result<DashboardStats> {
        self.stats_at(filters, Utc::now())
    }

    /// Aggregate statistics as of `now`.
    ///
    /// # Errors
    ///
    /// Returns any source error.
    pub fn stats_at(&self, filters: Option<&FilterSet>, now: DateTime<Utc>) -> Result<DashboardStats> {
        let page = fetch_all(&self.source, filters)?;
        info!(issues = page.issues.len(), "Computing dashboard stats");
        Ok(stats::aggregate(&page.issues, now))
    }

    /// Created/resolved series for the last `days` days, ending today (UTC).
    ///
    /// # Errors
    ///
    /// Returns a validation error if `days` is outside `1..=365`, or any
    /// source error.
    pub fn timeline(&self, filters: Option<&FilterSet>, days: u32) -> Result<Timeline> {
        self.timeline_at(filters, days, Utc::now())
    }

    /// Same as [`Dashboard::timeline`] with an explicit clock.
    ///
    /// # Errors
    ///
    /// See [`Dashboard::timeline`].
    pub fn timeline_at(
        &self,
        filters: Option<&FilterSet>,
        days: u32,
        now: DateTime<Utc>,
    ) -> Result<Timeline> {
        validate_days(days)?;
        let page = fetch_all(&self.source, filters)?;
        Ok(stats::timeline(&page.issues, now.date_naive(), days))
    }

    /// Distinct values for the filter dropdowns.
    ///
    /// # Errors
    ///
    /// Returns any source error.
    pub fn filter_options(&self, filters: Option<&FilterSet>) -> Result<FilterOptions> {
        let page = fetch_all(&self.source, filters)?;
        Ok(stats::filter_options(&page.issues))
    }
}

/// Check a requested timeline length.
///
/// # Errors
///
/// Returns a validation error if `days` is outside `1..=365`.
pub fn validate_days(days: u32) -> Result<()> {
    if days == 0 || days > MAX_TIMELINE_DAYS {
        return Err(DashError::validation(
            "days",
            format!("must be between 1 and {MAX_TIMELINE_DAYS}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Project, ProjectVersion};
    use crate::remote::{FixtureSource, RawIssue, SearchRequest, SearchResponse};
    use chrono::TimeZone;
    use serde_json::json;

    fn init_logging() {
        crate::logging::init_test_logging();
    }

    struct FailingSource;

    impl IssueSource for FailingSource {
        fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
            Err(DashError::RemoteTimeout {
                url: format!("https://example.atlassian.net/rest/api/3/search?startAt={}", request.start_at),
                timeout_secs: 30,
            })
        }

        fn projects(&self) -> Result<Vec<Project>> {
            Err(DashError::Transport("down".to_string()))
        }

        fn project_versions(&self, _project_key: &str) -> Result<Vec<ProjectVersion>> {
            Err(DashError::Transport("down".to_string()))
        }
    }

    fn fixture() -> FixtureSource {
        let raw: Vec<RawIssue> = serde_json::from_value(json!([
            {"id": "1", "key": "SHOP-1", "fields": {
                "status": {"name": "Done"}, "issuetype": {"name": "Bug"},
                "created": "2024-06-28T10:00:00.000+0000",
                "resolutiondate": "2024-06-29T10:00:00.000+0000",
                "fixVersions": [{"name": "v1.0"}]
            }},
            {"id": "2", "key": "SHOP-2", "fields": {
                "status": {"name": "To Do"}, "issuetype": {"name": "Task"},
                "priority": {"name": "High"},
                "created": "2024-06-01T10:00:00.000+0000"
            }},
            {"id": "3", "key": "OPS-1", "fields": {
                "status": {"name": "To Do"}, "issuetype": {"name": "Task"},
                "created": "2024-06-30T08:00:00.000+0000"
            }}
        ]))
        .unwrap();
        FixtureSource::from_issues(raw)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_stats_over_filtered_source() {
        init_logging();
        let dashboard = Dashboard::new(fixture());
        let stats = dashboard
            .stats_at(Some(&FilterSet::for_project("SHOP")), now())
            .unwrap();
        assert_eq!(stats.total_issues, 2);
        assert_eq!(stats.resolved_issues, 1);
        assert_eq!(stats.backlog_aging[2].high, 1);
    }

    #[test]
    fn test_failure_is_not_zero() {
        init_logging();
        let dashboard = Dashboard::new(FailingSource);
        let err = dashboard.stats(None).unwrap_err();
        assert!(err.is_remote());
        assert!(dashboard.list_issues(None, Paging::All).is_err());
        assert!(dashboard.filter_options(None).is_err());
    }

    #[test]
    fn test_timeline_bounds_checked() {
        init_logging();
        let dashboard = Dashboard::new(fixture());
        assert!(matches!(
            dashboard.timeline(None, 0),
            Err(DashError::Validation { .. })
        ));
        assert!(dashboard.timeline(None, 366).is_err());

        let t = dashboard.timeline_at(None, 3, now()).unwrap();
        let created: Vec<u64> = t.created.iter().map(|d| d.count).collect();
        assert_eq!(created, vec![1, 0, 1]);
    }

    #[test]
    fn test_list_issues_paging() {
        init_logging();
        let dashboard = Dashboard::new(fixture());
        let page = dashboard
            .list_issues(None, Paging::Page { page: 1, per_page: 2 })
            .unwrap();
        assert_eq!(page.issues.len(), 2);
        assert_eq!(page.pages, 2);
        assert!(page.has_next);

        let all = dashboard.list_issues(None, Paging::All).unwrap();
        assert_eq!(all.total, 3);
        assert_eq!(all.per_page, 3);
    }

    #[test]
    fn test_filter_options() {
        init_logging();
        let options = Dashboard::new(fixture()).filter_options(None).unwrap();
        assert_eq!(options.statuses, vec!["Done", "To Do"]);
        assert_eq!(options.versions, vec!["v1.0"]);
    }
}
