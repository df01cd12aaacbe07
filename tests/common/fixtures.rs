//! Builders for normalized and raw issues.

use chrono::{DateTime, Duration, Utc};
use serde_json::{Value, json};
use tracker_dash::model::Issue;
use tracker_dash::remote::RawIssue;

/// Builder for normalized [`Issue`] values.
#[derive(Debug, Clone)]
pub struct IssueBuilder {
    issue: Issue,
}

impl IssueBuilder {
    pub fn new(key: &str) -> Self {
        Self {
            issue: Issue {
                key: key.to_string(),
                id: key.to_string(),
                summary: format!("Summary of {key}"),
                status: "To Do".to_string(),
                issue_type: "Task".to_string(),
                ..Default::default()
            },
        }
    }

    pub fn status(mut self, status: &str) -> Self {
        self.issue.status = status.to_string();
        self
    }

    pub fn issue_type(mut self, issue_type: &str) -> Self {
        self.issue.issue_type = issue_type.to_string();
        self
    }

    pub fn priority(mut self, priority: &str) -> Self {
        self.issue.priority = Some(priority.to_string());
        self
    }

    pub fn assignee(mut self, id: &str, name: &str) -> Self {
        self.issue.assignee_id = Some(id.to_string());
        self.issue.assignee_name = Some(name.to_string());
        self
    }

    pub fn created(mut self, at: DateTime<Utc>) -> Self {
        self.issue.created_at = Some(at);
        self
    }

    pub fn created_days_ago(self, now: DateTime<Utc>, days: i64) -> Self {
        self.created(now - Duration::days(days))
    }

    pub fn updated(mut self, at: DateTime<Utc>) -> Self {
        self.issue.updated_at = Some(at);
        self
    }

    pub fn resolved(mut self, at: DateTime<Utc>) -> Self {
        self.issue.resolved_at = Some(at);
        self
    }

    pub fn fix_versions(mut self, versions: &[&str]) -> Self {
        self.issue.fix_versions = versions.iter().map(|v| (*v).to_string()).collect();
        self
    }

    pub fn build(self) -> Issue {
        self.issue
    }
}

/// A raw search record in the remote payload shape.
pub fn raw_issue(key: &str, fields: Value) -> RawIssue {
    serde_json::from_value(json!({ "id": key, "key": key, "fields": fields }))
        .expect("valid raw issue")
}

/// `count` raw issues `PREFIX-1..=count` with only a status set.
pub fn raw_issues(prefix: &str, count: usize) -> Vec<RawIssue> {
    (1..=count)
        .map(|n| raw_issue(&format!("{prefix}-{n}"), json!({"status": {"name": "To Do"}})))
        .collect()
}
