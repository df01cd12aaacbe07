//! Raw wire types of the Jira REST v3 API.
//!
//! Every nested object is optional: the remote omits or nulls fields freely
//! depending on project configuration and permissions. Conversion into the
//! normalized model happens in `fetch::normalize`.

use crate::model::{Project, ProjectVersion};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Read an explicit `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of a search, as returned by `GET /rest/api/3/search`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub issues: Vec<RawIssue>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_at: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub max_results: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawIssue {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: RawFields,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFields {
    #[serde(default)]
    pub summary: Option<String>,
    /// Plain string (v2 style) or an Atlassian Document Format tree.
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub project: Option<RawProjectRef>,
    #[serde(default)]
    pub status: Option<RawNamed>,
    #[serde(default)]
    pub issuetype: Option<RawNamed>,
    #[serde(default)]
    pub priority: Option<RawNamed>,
    #[serde(default)]
    pub assignee: Option<RawUser>,
    #[serde(default)]
    pub reporter: Option<RawUser>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub resolutiondate: Option<String>,
    #[serde(default)]
    pub fix_versions: Option<Vec<Option<RawNamed>>>,
}

/// Any `{ "name": ... }` object (status, issue type, priority, version ref).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawNamed {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProjectRef {
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUser {
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
}

/// Entry of `GET /rest/api/3/project`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProject {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project_type_key: Option<String>,
    #[serde(default)]
    pub lead: Option<RawUser>,
}

impl RawProject {
    #[must_use]
    pub fn into_project(self) -> Project {
        let lead = self.lead.unwrap_or_default();
        Project {
            id: self.id,
            key: self.key,
            name: self.name,
            description: self.description.unwrap_or_default(),
            project_type: self
                .project_type_key
                .unwrap_or_else(|| "software".to_string()),
            lead_name: lead.display_name.filter(|s| !s.is_empty()),
            lead_email: lead.email_address.filter(|s| !s.is_empty()),
        }
    }
}

/// Entry of `GET /rest/api/3/project/{key}/versions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVersion {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub released: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub archived: bool,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
}

impl RawVersion {
    #[must_use]
    pub fn into_version(self, project_key: &str) -> ProjectVersion {
        ProjectVersion {
            id: self.id,
            name: self.name,
            project_key: project_key.to_string(),
            description: self.description.unwrap_or_default(),
            released: self.released,
            archived: self.archived,
            release_date: parse_day(self.release_date.as_deref()),
            start_date: parse_day(self.start_date.as_deref()),
        }
    }
}

fn parse_day(value: Option<&str>) -> Option<NaiveDate> {
    value.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
}
