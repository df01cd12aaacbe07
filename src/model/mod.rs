//! Core data types for `tracker_dash`.
//!
//! This module defines the fundamental types used throughout the application:
//! - `Issue` - The normalized issue record every component works on
//! - `FilterSet` - The fixed filter vocabulary shared by all dashboard queries
//! - `PriorityTier` / `AgingBucket` - Backlog-aging classification
//! - `Project` / `ProjectVersion` - Project metadata mirrored by sync

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder label for a missing status, type or priority.
pub const UNKNOWN_LABEL: &str = "Desconhecido";

/// Placeholder label for a missing assignee, reporter or fix version.
pub const UNASSIGNED_LABEL: &str = "Não atribuído";

/// A normalized issue.
///
/// Built fresh from a raw remote record on every fetch; every field the
/// remote may omit is optional here, so downstream code never has to inspect
/// raw JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Issue {
    /// Human-readable key, `<PROJECT>-<number>`.
    pub key: String,

    /// Remote internal identifier.
    pub id: String,

    pub summary: String,

    #[serde(default)]
    pub description: String,

    /// Workflow status name; empty when the remote omitted it.
    #[serde(default)]
    pub status: String,

    /// Issue type name; empty when the remote omitted it.
    #[serde(default)]
    pub issue_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// `None` means the issue is unresolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,

    /// Fix-version names in remote order.
    #[serde(default)]
    pub fix_versions: Vec<String>,
}

impl Issue {
    /// Project key derived from the issue key (text before the first `-`).
    #[must_use]
    pub fn project_key(&self) -> &str {
        self.key.split('-').next().unwrap_or_default()
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.resolved_at.is_none()
    }
}

/// Normalize a version name for comparison: trimmed and lowercased.
#[must_use]
pub fn normalize_version(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Exact, case- and whitespace-insensitive fix-version match.
#[must_use]
pub fn has_fix_version(issue: &Issue, target: &str) -> bool {
    let target = normalize_version(target);
    issue
        .fix_versions
        .iter()
        .any(|name| normalize_version(name) == target)
}

/// Priority tier used by backlog aging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriorityTier {
    Critical,
    High,
    Medium,
    Low,
    #[serde(rename = "Sem prioridade")]
    NoPriority,
}

impl PriorityTier {
    pub const ALL: [Self; 5] = [
        Self::Critical,
        Self::High,
        Self::Medium,
        Self::Low,
        Self::NoPriority,
    ];

    /// Map a remote priority name onto a tier. Unknown or missing names fall
    /// into `NoPriority`.
    #[must_use]
    pub fn from_priority_name(name: Option<&str>) -> Self {
        let normalized = name.map(|n| n.trim().to_lowercase()).unwrap_or_default();
        match normalized.as_str() {
            "critical" | "highest" | "blocker" => Self::Critical,
            "high" | "major" => Self::High,
            "medium" | "normal" => Self::Medium,
            "low" | "minor" | "lowest" => Self::Low,
            _ => Self::NoPriority,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::NoPriority => "Sem prioridade",
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
            Self::NoPriority => 4,
        }
    }
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Age range of an open issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgingBucket {
    /// 0 to 5 days.
    Fresh,
    /// 6 to 15 days.
    Recent,
    /// 16 to 30 days.
    Aging,
    /// More than 30 days.
    Stale,
}

impl AgingBucket {
    pub const ALL: [Self; 4] = [Self::Fresh, Self::Recent, Self::Aging, Self::Stale];

    /// Select the bucket for an age in whole days. Negative ages (clock skew
    /// between us and the remote) count as fresh.
    #[must_use]
    pub const fn for_age_days(days: i64) -> Self {
        if days <= 5 {
            Self::Fresh
        } else if days <= 15 {
            Self::Recent
        } else if days <= 30 {
            Self::Aging
        } else {
            Self::Stale
        }
    }

    /// Dashboard label of the bucket.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Fresh => "0-5 dias",
            Self::Recent => "6-15 dias",
            Self::Aging => "16-30 dias",
            Self::Stale => "Mais de 30 dias",
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Fresh => 0,
            Self::Recent => 1,
            Self::Aging => 2,
            Self::Stale => 3,
        }
    }
}

/// Bounds on the creation date, rendered as a pre-built JQL comparison.
///
/// Bounds are kept as the caller wrote them (`2024-03-01` or
/// `2024-03-01 10:00`) so the remote sees exactly what was asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CreatedRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
}

impl CreatedRange {
    /// Render the comparison clause, or `None` when neither bound is set.
    #[must_use]
    pub fn to_clause(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(after) = &self.after {
            parts.push(format!("created >= '{after}'"));
        }
        if let Some(before) = &self.before {
            parts.push(format!("created <= '{before}'"));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" AND "))
        }
    }

    /// Local evaluation for sources that cannot run JQL.
    ///
    /// Unparseable bounds are ignored; an issue without a creation date only
    /// matches an empty range.
    #[must_use]
    pub fn contains(&self, created_at: Option<DateTime<Utc>>) -> bool {
        let after = self.after.as_deref().and_then(parse_bound);
        let before = self.before.as_deref().and_then(parse_bound);
        if after.is_none() && before.is_none() {
            return true;
        }
        let Some(created) = created_at else {
            return false;
        };
        after.is_none_or(|a| created >= a) && before.is_none_or(|b| created <= b)
    }
}

/// Parse a JQL date literal (`yyyy-MM-dd` or `yyyy-MM-dd HH:mm`) as UTC.
fn parse_bound(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

/// The fixed filter vocabulary accepted by every dashboard query.
///
/// An unset field places no constraint on that dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FilterSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuetype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<CreatedRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_version: Option<String>,
}

impl FilterSet {
    /// Filter on a single project.
    #[must_use]
    pub fn for_project(key: impl Into<String>) -> Self {
        Self {
            project: Some(key.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.project.is_none()
            && self.status.is_none()
            && self.assignee.is_none()
            && self.reporter.is_none()
            && self.issuetype.is_none()
            && self.priority.is_none()
            && self.created.as_ref().is_none_or(|c| c.to_clause().is_none())
            && self.fix_version.is_none()
    }

    /// Evaluate the filter against an already-normalized issue.
    ///
    /// Mirrors the remote's equality semantics: status, type and priority
    /// compare case-insensitively, people match on either the account id or
    /// the display name, and fix versions use the normalized exact match.
    #[must_use]
    pub fn matches(&self, issue: &Issue) -> bool {
        fn person(filter: Option<&String>, name: Option<&String>, id: Option<&String>) -> bool {
            filter.is_none_or(|f| name == Some(f) || id == Some(f))
        }
        fn label(filter: Option<&String>, value: Option<&str>) -> bool {
            filter.is_none_or(|f| value.is_some_and(|v| v.to_lowercase() == f.to_lowercase()))
        }

        self.project.as_ref().is_none_or(|p| issue.project_key() == p.as_str())
            && label(self.status.as_ref(), Some(&issue.status))
            && person(
                self.assignee.as_ref(),
                issue.assignee_name.as_ref(),
                issue.assignee_id.as_ref(),
            )
            && person(
                self.reporter.as_ref(),
                issue.reporter_name.as_ref(),
                issue.reporter_id.as_ref(),
            )
            && label(self.issuetype.as_ref(), Some(&issue.issue_type))
            && label(self.priority.as_ref(), issue.priority.as_deref())
            && self
                .created
                .as_ref()
                .is_none_or(|c| c.contains(issue.created_at))
            && self
                .fix_version
                .as_deref()
                .is_none_or(|v| has_fix_version(issue, v))
    }
}

/// A project as listed by the remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Project {
    pub id: String,
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub project_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_email: Option<String>,
}

/// A release (fix version) of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProjectVersion {
    pub id: String,
    pub name: String,
    pub project_key: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub released: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}
