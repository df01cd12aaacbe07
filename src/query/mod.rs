//! Filter-to-JQL translation.
//!
//! Clause order is fixed (project, status, assignee, reporter, issuetype,
//! priority, created, fixVersion) so the same filter always yields the same
//! query string.

use crate::model::FilterSet;

/// Translate a filter set into a JQL expression.
///
/// `project` is emitted bare; every other equality is single-quoted.
/// `created` embeds its pre-built comparison clause. Single quotes inside the
/// fix-version value are escaped as `\'`; nothing else is escaped, so this
/// is not an injection defense.
///
/// `None` or an empty filter set yields an empty string.
#[must_use]
pub fn to_jql(filters: Option<&FilterSet>) -> String {
    let Some(filters) = filters else {
        return String::new();
    };

    let mut clauses: Vec<String> = Vec::new();

    if let Some(project) = &filters.project {
        clauses.push(format!("project = {project}"));
    }
    if let Some(status) = &filters.status {
        clauses.push(format!("status = '{status}'"));
    }
    if let Some(assignee) = &filters.assignee {
        clauses.push(format!("assignee = '{assignee}'"));
    }
    if let Some(reporter) = &filters.reporter {
        clauses.push(format!("reporter = '{reporter}'"));
    }
    if let Some(issuetype) = &filters.issuetype {
        clauses.push(format!("issuetype = '{issuetype}'"));
    }
    if let Some(priority) = &filters.priority {
        clauses.push(format!("priority = '{priority}'"));
    }
    if let Some(clause) = filters.created.as_ref().and_then(|c| c.to_clause()) {
        clauses.push(clause);
    }
    if let Some(version) = &filters.fix_version {
        clauses.push(format!("fixVersion = '{}'", escape_quotes(version)));
    }

    clauses.join(" AND ")
}

fn escape_quotes(value: &str) -> String {
    value.replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CreatedRange;

    #[test]
    fn test_none_and_empty_yield_empty_query() {
        assert_eq!(to_jql(None), "");
        assert_eq!(to_jql(Some(&FilterSet::default())), "");
    }

    #[test]
    fn test_project_is_bare() {
        assert_eq!(to_jql(Some(&FilterSet::for_project("SHOP"))), "project = SHOP");
    }

    #[test]
    fn test_clause_order_is_fixed() {
        let filters = FilterSet {
            fix_version: Some("v1".to_string()),
            priority: Some("High".to_string()),
            status: Some("To Do".to_string()),
            project: Some("SHOP".to_string()),
            assignee: Some("acc-1".to_string()),
            reporter: Some("acc-2".to_string()),
            issuetype: Some("Bug".to_string()),
            created: Some(CreatedRange {
                after: Some("2024-01-01".to_string()),
                before: None,
            }),
        };
        assert_eq!(
            to_jql(Some(&filters)),
            "project = SHOP AND status = 'To Do' AND assignee = 'acc-1' \
             AND reporter = 'acc-2' AND issuetype = 'Bug' AND priority = 'High' \
             AND created >= '2024-01-01' AND fixVersion = 'v1'"
        );
    }

    #[test]
    fn test_fix_version_quotes_are_escaped() {
        let filters = FilterSet {
            fix_version: Some("Sprint 'Q1'".to_string()),
            ..Default::default()
        };
        assert_eq!(to_jql(Some(&filters)), r"fixVersion = 'Sprint \'Q1\''");
    }

    #[test]
    fn test_empty_created_range_is_skipped() {
        let filters = FilterSet {
            status: Some("Done".to_string()),
            created: Some(CreatedRange::default()),
            ..Default::default()
        };
        assert_eq!(to_jql(Some(&filters)), "status = 'Done'");
    }
}
