//! Blocking HTTP client for Jira Cloud REST v3.

use super::payload::{RawProject, RawVersion, SearchResponse};
use super::{IssueSource, SearchRequest};
use crate::config::RemoteConfig;
use crate::error::{DashError, Result};
use crate::model::{Project, ProjectVersion};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::de::DeserializeOwned;
use std::io;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("tracker_dash/", env!("CARGO_PKG_VERSION"));

/// Longest slice of an error body kept in a `RemoteStatus` message.
const MAX_ERROR_BODY: usize = 300;

/// Live issue source backed by the Jira REST API.
pub struct JiraClient {
    base_url: String,
    auth_header: String,
    timeout: Duration,
    agent: ureq::Agent,
}

impl std::fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl JiraClient {
    /// Build a client from resolved remote settings.
    ///
    /// # Errors
    ///
    /// Returns a config error if any credential is blank.
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(DashError::Config("remote base URL is not set".to_string()));
        }
        if config.email.trim().is_empty() || config.api_token.trim().is_empty() {
            return Err(DashError::Config(
                "remote email and API token are required".to_string(),
            ));
        }

        let credentials = format!("{}:{}", config.email, config.api_token);
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build();

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_header: format!("Basic {}", STANDARD.encode(credentials)),
            timeout: config.timeout,
            agent,
        })
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/rest/api/3/{endpoint}", self.base_url)
    }

    fn get_json<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, String)]) -> Result<T> {
        let url = self.api_url(endpoint);
        debug!(url = %url, ?params, "GET");

        let mut request = self
            .agent
            .get(&url)
            .set("Authorization", &self.auth_header)
            .set("Accept", "application/json");
        for (name, value) in params {
            request = request.query(name, value);
        }

        match request.call() {
            Ok(resp) => resp
                .into_json::<T>()
                .map_err(|e| DashError::Payload(format!("{url}: {e}"))),
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                Err(DashError::RemoteStatus {
                    url,
                    status: code,
                    message: truncate(&body, MAX_ERROR_BODY),
                })
            }
            Err(ureq::Error::Transport(transport)) => {
                if is_timeout(&transport) {
                    Err(DashError::RemoteTimeout {
                        url,
                        timeout_secs: self.timeout.as_secs(),
                    })
                } else {
                    Err(DashError::Transport(format!("{url}: {transport}")))
                }
            }
        }
    }
}

impl IssueSource for JiraClient {
    fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let params = [
            ("jql", request.jql.clone()),
            ("startAt", request.start_at.to_string()),
            ("maxResults", request.max_results.to_string()),
            ("fields", request.fields.clone()),
        ];
        self.get_json("search", &params)
    }

    fn projects(&self) -> Result<Vec<Project>> {
        let raw: Vec<RawProject> = self.get_json("project", &[])?;
        Ok(raw.into_iter().map(RawProject::into_project).collect())
    }

    fn project_versions(&self, project_key: &str) -> Result<Vec<ProjectVersion>> {
        let raw: Vec<RawVersion> = self.get_json(&format!("project/{project_key}/versions"), &[])?;
        Ok(raw
            .into_iter()
            .map(|v| v.into_version(project_key))
            .collect())
    }
}

/// Walk the error chain looking for a socket timeout.
fn is_timeout(transport: &ureq::Transport) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> =
        std::error::Error::source(transport);
    while let Some(err) = source {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            if matches!(io_err.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) {
                return true;
            }
        }
        source = err.source();
    }
    transport.to_string().contains("timed out")
}

fn truncate(body: &str, max: usize) -> String {
    let body = body.trim();
    if body.chars().count() <= max {
        return body.to_string();
    }
    let mut cut: String = body.chars().take(max).collect();
    cut.push('…');
    cut
}
