//! Dashboard aggregation engine.
//!
//! [`aggregate`] turns a normalized issue list into every dashboard
//! statistic in a single traversal. The timeline and filter-option builders
//! live in their own submodules and work on the same input.

mod options;
mod timeline;

pub use options::{FilterOptions, PersonOption, filter_options};
pub use timeline::{DayCount, Timeline, timeline};

use crate::model::{AgingBucket, Issue, PriorityTier, UNASSIGNED_LABEL, UNKNOWN_LABEL};
use crate::util::whole_days_between;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Trailing window for the "recent" and "resolved" counters.
pub const RECENT_WINDOW_DAYS: i64 = 30;

/// Status names (trimmed, lowercased) that count as finished work.
pub const CLOSED_STATUSES: &[&str] = &[
    "done",
    "concluído",
    "concluído.",
    "cancelado",
    "itens concluídos",
    "resolved",
    "fechado",
    "closed",
];

/// One row of a distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub key: String,
    pub count: u64,
}

/// Open-issue counts for one age range, split by priority tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingRow {
    pub time_range: String,
    pub total: u64,
    pub critical: u64,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
    pub no_priority: u64,
}

impl AgingRow {
    fn from_counts(bucket: AgingBucket, counts: &[u64; 5]) -> Self {
        Self {
            time_range: bucket.label().to_string(),
            total: counts.iter().sum(),
            critical: counts[PriorityTier::Critical.index()],
            high: counts[PriorityTier::High.index()],
            medium: counts[PriorityTier::Medium.index()],
            low: counts[PriorityTier::Low.index()],
            no_priority: counts[PriorityTier::NoPriority.index()],
        }
    }

    /// Count for a single tier.
    #[must_use]
    pub const fn tier(&self, tier: PriorityTier) -> u64 {
        match tier {
            PriorityTier::Critical => self.critical,
            PriorityTier::High => self.high,
            PriorityTier::Medium => self.medium,
            PriorityTier::Low => self.low,
            PriorityTier::NoPriority => self.no_priority,
        }
    }
}

/// Every statistic the dashboard shows.
///
/// Distributions list keys in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_issues: u64,
    pub recent_issues: u64,
    pub resolved_issues: u64,
    pub status_distribution: Vec<BreakdownEntry>,
    pub type_distribution: Vec<BreakdownEntry>,
    pub priority_distribution: Vec<BreakdownEntry>,
    pub assignee_distribution: Vec<BreakdownEntry>,
    pub reporter_distribution: Vec<BreakdownEntry>,
    pub version_distribution: Vec<BreakdownEntry>,
    /// Always four rows, youngest range first.
    pub backlog_aging: Vec<AgingRow>,
}

/// Counter that remembers the order keys were first seen in.
#[derive(Default)]
struct OrderedCounter {
    index: HashMap<String, usize>,
    entries: Vec<BreakdownEntry>,
}

impl OrderedCounter {
    fn add(&mut self, key: &str) {
        if let Some(&slot) = self.index.get(key) {
            self.entries[slot].count += 1;
        } else {
            self.index.insert(key.to_string(), self.entries.len());
            self.entries.push(BreakdownEntry {
                key: key.to_string(),
                count: 1,
            });
        }
    }

    fn into_entries(self) -> Vec<BreakdownEntry> {
        self.entries
    }
}

fn label_or<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    value.filter(|s| !s.is_empty()).unwrap_or(placeholder)
}

/// Whether an issue counts toward `resolved_issues`.
fn resolved_recently(issue: &Issue, since: DateTime<Utc>) -> bool {
    if issue.resolved_at.is_some_and(|r| r >= since) {
        return true;
    }
    let status = issue.status.trim().to_lowercase();
    CLOSED_STATUSES.contains(&status.as_str()) && issue.updated_at.is_some_and(|u| u >= since)
}

/// Compute every dashboard statistic over `issues`, as of `now`.
#[must_use]
pub fn aggregate(issues: &[Issue], now: DateTime<Utc>) -> DashboardStats {
    let since = now - Duration::days(RECENT_WINDOW_DAYS);

    let mut recent_issues = 0u64;
    let mut resolved_issues = 0u64;
    let mut status = OrderedCounter::default();
    let mut issue_type = OrderedCounter::default();
    let mut priority = OrderedCounter::default();
    let mut assignee = OrderedCounter::default();
    let mut reporter = OrderedCounter::default();
    let mut version = OrderedCounter::default();
    let mut aging = [[0u64; 5]; 4];

    for issue in issues {
        status.add(label_or(Some(issue.status.as_str()), UNKNOWN_LABEL));
        issue_type.add(label_or(Some(issue.issue_type.as_str()), UNKNOWN_LABEL));
        priority.add(label_or(issue.priority.as_deref(), UNKNOWN_LABEL));
        assignee.add(label_or(issue.assignee_name.as_deref(), UNASSIGNED_LABEL));
        reporter.add(label_or(issue.reporter_name.as_deref(), UNASSIGNED_LABEL));

        if issue.created_at.is_some_and(|c| c >= since) {
            recent_issues += 1;
        }
        if resolved_recently(issue, since) {
            resolved_issues += 1;
        }

        if issue.is_open() {
            if let Some(created) = issue.created_at {
                let bucket = AgingBucket::for_age_days(whole_days_between(created, now));
                let tier = PriorityTier::from_priority_name(issue.priority.as_deref());
                aging[bucket.index()][tier.index()] += 1;
            }
        }

        let named: Vec<&str> = issue
            .fix_versions
            .iter()
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .collect();
        if named.is_empty() {
            version.add(UNASSIGNED_LABEL);
        } else {
            for name in named {
                version.add(name);
            }
        }
    }

    let backlog_aging = AgingBucket::ALL
        .iter()
        .map(|bucket| AgingRow::from_counts(*bucket, &aging[bucket.index()]))
        .collect();

    let stats = DashboardStats {
        total_issues: issues.len() as u64,
        recent_issues,
        resolved_issues,
        status_distribution: status.into_entries(),
        type_distribution: issue_type.into_entries(),
        priority_distribution: priority.into_entries(),
        assignee_distribution: assignee.into_entries(),
        reporter_distribution: reporter.into_entries(),
        version_distribution: version.into_entries(),
        backlog_aging,
    };
    debug!(
        total = stats.total_issues,
        recent = stats.recent_issues,
        resolved = stats.resolved_issues,
        "Aggregated dashboard stats"
    );
    stats
}
