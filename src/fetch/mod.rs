//! Paged and exhaustive issue retrieval.
//!
//! Every raw record is normalized on the way through, so callers only ever
//! see [`Issue`] values. A remote failure at any point aborts the whole call;
//! partial data is never returned.

mod normalize;
pub mod version_filter;

pub use normalize::normalize_issue;

use crate::error::{DashError, Result};
use crate::model::{FilterSet, Issue};
use crate::remote::{IssueSource, SearchRequest};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Page size used by [`fetch_all`].
pub const FETCH_ALL_BATCH_SIZE: u64 = 100;

/// One page of normalized issues plus paging metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuePage {
    pub issues: Vec<Issue>,
    pub total: u64,
    pub pages: u64,
    pub current_page: u64,
    pub per_page: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl IssuePage {
    /// Wrap a complete result set as a single page.
    #[must_use]
    pub fn single(issues: Vec<Issue>) -> Self {
        let len = issues.len() as u64;
        Self {
            issues,
            total: len,
            pages: 1,
            current_page: 1,
            per_page: len,
            has_next: false,
            has_prev: false,
        }
    }

    /// Cut page `page` (1-based) out of an already complete result set.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `page` or `per_page` is zero.
    pub fn paginate(issues: Vec<Issue>, page: u64, per_page: u64) -> Result<Self> {
        validate_paging(page, per_page)?;
        let total = issues.len() as u64;
        let start_at = (page - 1).saturating_mul(per_page);
        let issues = issues
            .into_iter()
            .skip(usize::try_from(start_at).unwrap_or(usize::MAX))
            .take(usize::try_from(per_page).unwrap_or(usize::MAX))
            .collect();
        Ok(Self {
            issues,
            total,
            pages: total.div_ceil(per_page).max(1),
            current_page: page,
            per_page,
            has_next: start_at.saturating_add(per_page) < total,
            has_prev: page > 1,
        })
    }
}

fn validate_paging(page: u64, per_page: u64) -> Result<()> {
    if page == 0 {
        return Err(DashError::validation("page", "must be at least 1"));
    }
    if per_page == 0 {
        return Err(DashError::validation("per_page", "must be at least 1"));
    }
    Ok(())
}

/// Fetch one page (1-based) of issues.
///
/// # Errors
///
/// Returns a validation error if `page` or `per_page` is zero, and any
/// error of the underlying source.
pub fn fetch_page<S: IssueSource + ?Sized>(
    source: &S,
    filters: Option<&FilterSet>,
    page: u64,
    per_page: u64,
) -> Result<IssuePage> {
    validate_paging(page, per_page)?;

    let start_at = (page - 1).saturating_mul(per_page);
    let response = source.search(&SearchRequest::new(filters, start_at, per_page))?;
    let total = response.total;
    debug!(page, per_page, start_at, total, received = response.issues.len(), "Fetched page");

    Ok(IssuePage {
        issues: response.issues.iter().map(normalize_issue).collect(),
        total,
        pages: total.div_ceil(per_page).max(1),
        current_page: page,
        per_page,
        has_next: start_at.saturating_add(per_page) < total,
        has_prev: page > 1,
    })
}

/// Fetch every issue matching `filters`, one batch at a time.
///
/// Batches are requested strictly in sequence from offset 0. The walk stops
/// once `start_at + FETCH_ALL_BATCH_SIZE >= total`, or early when a batch
/// comes back empty. When a fix version is set, the result is re-filtered
/// locally and `total` reports the filtered count.
///
/// # Errors
///
/// Returns the first error of the underlying source.
pub fn fetch_all<S: IssueSource + ?Sized>(
    source: &S,
    filters: Option<&FilterSet>,
) -> Result<IssuePage> {
    let mut issues = Vec::new();
    let mut start_at = 0u64;
    let mut requests = 0u32;

    loop {
        let response = source.search(&SearchRequest::new(filters, start_at, FETCH_ALL_BATCH_SIZE))?;
        requests += 1;
        let total = response.total;
        let received = response.issues.len();
        issues.extend(response.issues.iter().map(normalize_issue));
        debug!(start_at, received, total, "Fetched batch");

        if received == 0 || start_at + FETCH_ALL_BATCH_SIZE >= total {
            break;
        }
        start_at += FETCH_ALL_BATCH_SIZE;
    }

    if let Some(target) = filters.and_then(|f| f.fix_version.as_deref()) {
        issues = version_filter::apply(issues, target);
    }

    info!(requests, issues = issues.len(), "Exhaustive fetch complete");
    Ok(IssuePage::single(issues))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Project, ProjectVersion};
    use crate::remote::{RawIssue, SearchResponse};
    use serde_json::json;
    use std::cell::RefCell;

    /// Serves `total` synthetic issues and records each request's offset.
    struct CountingSource {
        total: u64,
        offsets: RefCell<Vec<u64>>,
    }

    impl CountingSource {
        fn new(total: u64) -> Self {
            Self {
                total,
                offsets: RefCell::new(Vec::new()),
            }
        }
    }

    impl IssueSource for CountingSource {
        fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
            self.offsets.borrow_mut().push(request.start_at);
            let end = (request.start_at + request.max_results).min(self.total);
            let issues = (request.start_at..end)
                .map(|n| {
                    serde_json::from_value::<RawIssue>(json!({
                        "id": n.to_string(),
                        "key": format!("SHOP-{n}"),
                        "fields": {"fixVersions": [{"name": if n % 2 == 0 { "v1.0" } else { "v2.0" }}]}
                    }))
                    .unwrap()
                })
                .collect();
            Ok(SearchResponse {
                issues,
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

    #[test]
    fn test_fetch_all_walks_every_batch() {
        let source = CountingSource::new(237);
        let page = fetch_all(&source, None).unwrap();
        assert_eq!(*source.offsets.borrow(), vec![0, 100, 200]);
        assert_eq!(page.issues.len(), 237);
        assert_eq!(page.total, 237);
        assert_eq!(page.pages, 1);
        assert_eq!(page.per_page, 237);
        assert!(!page.has_next);
    }

    #[test]
    fn test_fetch_all_empty_makes_one_call() {
        let source = CountingSource::new(0);
        let page = fetch_all(&source, None).unwrap();
        assert_eq!(*source.offsets.borrow(), vec![0]);
        assert!(page.issues.is_empty());
        assert_eq!(page.total, 0);
    }

    #[test]
    fn test_fetch_all_exact_multiple() {
        let source = CountingSource::new(200);
        fetch_all(&source, None).unwrap();
        assert_eq!(*source.offsets.borrow(), vec![0, 100]);
    }

    #[test]
    fn test_fetch_all_applies_version_filter() {
        let source = CountingSource::new(10);
        let filters = FilterSet {
            fix_version: Some(" V2.0".to_string()),
            ..Default::default()
        };
        let page = fetch_all(&source, Some(&filters)).unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.issues.len(), 5);
    }

    #[test]
    fn test_fetch_page_metadata() {
        let source = CountingSource::new(120);
        let page = fetch_page(&source, None, 2, 50).unwrap();
        assert_eq!(*source.offsets.borrow(), vec![50]);
        assert_eq!(page.issues.len(), 50);
        assert_eq!(page.total, 120);
        assert_eq!(page.pages, 3);
        assert!(page.has_next);
        assert!(page.has_prev);

        let last = fetch_page(&source, None, 3, 50).unwrap();
        assert_eq!(last.issues.len(), 20);
        assert!(!last.has_next);
    }

    #[test]
    fn test_fetch_page_empty_result_has_one_page() {
        let page = fetch_page(&CountingSource::new(0), None, 1, 50).unwrap();
        assert_eq!(page.pages, 1);
        assert!(!page.has_next);
        assert!(!page.has_prev);
    }

    #[test]
    fn test_fetch_page_rejects_zero() {
        let source = CountingSource::new(5);
        assert!(matches!(
            fetch_page(&source, None, 0, 10),
            Err(DashError::Validation { .. })
        ));
        assert!(matches!(
            fetch_page(&source, None, 1, 0),
            Err(DashError::Validation { .. })
        ));
        assert!(source.offsets.borrow().is_empty());
    }

    #[test]
    fn test_paginate_local_results() {
        let issues: Vec<Issue> = (0..7)
            .map(|i| Issue {
                key: format!("SHOP-{i}"),
                ..Default::default()
            })
            .collect();
        let page = IssuePage::paginate(issues.clone(), 2, 3).unwrap();
        let keys: Vec<&str> = page.issues.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["SHOP-3", "SHOP-4", "SHOP-5"]);
        assert_eq!(page.pages, 3);
        assert!(page.has_next && page.has_prev);

        let past_end = IssuePage::paginate(issues, 9, 3).unwrap();
        assert!(past_end.issues.is_empty());
        assert!(!past_end.has_next);
        assert!(IssuePage::paginate(Vec::new(), 0, 3).is_err());
    }
}
