//! Distinct values offered by the dashboard's filter dropdowns.

use crate::model::Issue;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonOption {
    /// Account id, or the display name when the remote withheld the id.
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FilterOptions {
    pub statuses: Vec<String>,
    pub types: Vec<String>,
    pub priorities: Vec<String>,
    pub assignees: Vec<PersonOption>,
    pub reporters: Vec<PersonOption>,
    pub versions: Vec<String>,
}

#[derive(Default)]
struct People(HashMap<String, String>);

impl People {
    fn add(&mut self, name: Option<&String>, id: Option<&String>) {
        let Some(name) = name.filter(|n| !n.is_empty()) else {
            return;
        };
        let key = id.filter(|i| !i.is_empty()).unwrap_or(name);
        self.0.insert(key.clone(), name.clone());
    }

    fn into_sorted(self) -> Vec<PersonOption> {
        let mut people: Vec<PersonOption> = self
            .0
            .into_iter()
            .map(|(id, name)| PersonOption { id, name })
            .collect();
        people.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        people
    }
}

/// Collect sorted distinct filter values from `issues`. Empty values are
/// skipped.
#[must_use]
pub fn filter_options(issues: &[Issue]) -> FilterOptions {
    let mut statuses = BTreeSet::new();
    let mut types = BTreeSet::new();
    let mut priorities = BTreeSet::new();
    let mut versions = BTreeSet::new();
    let mut assignees = People::default();
    let mut reporters = People::default();

    for issue in issues {
        if !issue.status.is_empty() {
            statuses.insert(issue.status.clone());
        }
        if !issue.issue_type.is_empty() {
            types.insert(issue.issue_type.clone());
        }
        if let Some(priority) = issue.priority.as_ref().filter(|p| !p.is_empty()) {
            priorities.insert(priority.clone());
        }
        for version in issue.fix_versions.iter().filter(|v| !v.is_empty()) {
            versions.insert(version.clone());
        }
        assignees.add(issue.assignee_name.as_ref(), issue.assignee_id.as_ref());
        reporters.add(issue.reporter_name.as_ref(), issue.reporter_id.as_ref());
    }

    FilterOptions {
        statuses: statuses.into_iter().collect(),
        types: types.into_iter().collect(),
        priorities: priorities.into_iter().collect(),
        assignees: assignees.into_sorted(),
        reporters: reporters.into_sorted(),
        versions: versions.into_iter().collect(),
    }
}
