//! Raw remote record → normalized [`Issue`].

use crate::model::Issue;
use crate::remote::payload::{RawIssue, RawNamed, RawUser};
use crate::util::parse_remote_timestamp;
use serde_json::Value;

/// Convert one raw search hit into an [`Issue`].
///
/// Missing nested objects become `None` (or an empty string for status and
/// type); this never fails. Only fix versions with a non-empty name are kept.
#[must_use]
pub fn normalize_issue(raw: &RawIssue) -> Issue {
    let fields = &raw.fields;
    let (assignee_name, assignee_id) = person(fields.assignee.as_ref());
    let (reporter_name, reporter_id) = person(fields.reporter.as_ref());

    Issue {
        key: raw.key.clone(),
        id: raw.id.clone(),
        summary: fields.summary.clone().unwrap_or_default(),
        description: fields
            .description
            .as_ref()
            .map(description_text)
            .unwrap_or_default(),
        status: name_of(fields.status.as_ref()).unwrap_or_default(),
        issue_type: name_of(fields.issuetype.as_ref()).unwrap_or_default(),
        priority: name_of(fields.priority.as_ref()),
        assignee_name,
        assignee_id,
        reporter_name,
        reporter_id,
        created_at: parse_remote_timestamp(fields.created.as_deref()),
        updated_at: parse_remote_timestamp(fields.updated.as_deref()),
        resolved_at: parse_remote_timestamp(fields.resolutiondate.as_deref()),
        fix_versions: fields
            .fix_versions
            .iter()
            .flatten()
            .flatten()
            .filter_map(|v| non_empty(v.name.as_deref()))
            .collect(),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(str::to_string)
}

fn name_of(named: Option<&RawNamed>) -> Option<String> {
    named.and_then(|n| non_empty(n.name.as_deref()))
}

fn person(user: Option<&RawUser>) -> (Option<String>, Option<String>) {
    user.map_or((None, None), |u| {
        (
            non_empty(u.display_name.as_deref()),
            non_empty(u.account_id.as_deref()),
        )
    })
}

/// Flatten a description into plain text.
///
/// Accepts a plain string or an Atlassian Document Format tree; for the
/// latter, text nodes are concatenated and block nodes end with a newline.
fn description_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(_) => {
            let mut out = String::new();
            collect_adf_text(value, &mut out);
            out.trim_end().to_string()
        }
        _ => String::new(),
    }
}

fn collect_adf_text(node: &Value, out: &mut String) {
    if let Some(text) = node.get("text").and_then(Value::as_str) {
        out.push_str(text);
    }
    if node.get("type").and_then(Value::as_str) == Some("hardBreak") {
        out.push('\n');
    }
    if let Some(children) = node.get("content").and_then(Value::as_array) {
        for child in children {
            collect_adf_text(child, out);
        }
        let is_block = matches!(
            node.get("type").and_then(Value::as_str),
            Some("paragraph" | "heading" | "listItem" | "codeBlock" | "blockquote")
        );
        if is_block && !out.ends_with('\n') {
            out.push('\n');
        }
    }
}
