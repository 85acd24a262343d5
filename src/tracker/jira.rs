//! tracker::jira
//!
//! Jira tracker implementation using the REST API v2.
//!
//! # Design
//!
//! This module implements the `Tracker` trait for Jira:
//! - `search` runs JQL through `/rest/api/2/search`, paging until the
//!   requested bound or the result total is reached
//! - `fetch_issue` reads `/rest/api/2/issue/{key}`
//!
//! Only the fields the feature tree needs are requested. The loosely
//! structured payload is validated here and converted into [`RawIssue`];
//! the epic link lives in a site-specific custom field whose name is
//! configurable.
//!
//! # Authentication
//!
//! Basic authentication with a username and API token (or password) when
//! both are available. Public trackers can be read anonymously.
//!
//! # Example
//!
//! ```ignore
//! use featuretrail::tracker::jira::JiraTracker;
//! use featuretrail::tracker::Tracker;
//!
//! let tracker = JiraTracker::new("https://issues.example.com", "customfield_12821")
//!     .with_credentials("jdoe", token);
//! let issues = tracker.search("project = LPS", 500).await?;
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use super::traits::{Tracker, TrackerError};
use crate::core::types::{IssueKey, IssueType, RawIssue};

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "featuretrail";

/// Largest page requested from the search endpoint.
const PAGE_SIZE: u32 = 100;

/// Jira tracker implementation.
pub struct JiraTracker {
    client: Client,
    /// Base URL without trailing slash
    base_url: String,
    username: Option<String>,
    token: Option<String>,
    /// Custom field holding the epic link
    epic_link_field: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for JiraTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraTracker")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("has_token", &self.token.is_some())
            .field("epic_link_field", &self.epic_link_field)
            .finish()
    }
}

impl JiraTracker {
    /// Create an anonymous Jira tracker.
    pub fn new(base_url: impl Into<String>, epic_link_field: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            username: None,
            token: None,
            epic_link_field: epic_link_field.into(),
        }
    }

    /// Authenticate requests with basic auth.
    pub fn with_credentials(mut self, username: impl Into<String>, token: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.username.is_some() && self.token.is_some()
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/rest/api/2/{}", self.base_url, path)
    }

    /// Comma-separated list of fields to request.
    fn field_list(&self) -> String {
        format!(
            "summary,status,issuetype,parent,{}",
            self.epic_link_field
        )
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match (&self.username, &self.token) {
            (Some(user), Some(token)) => request.basic_auth(user, Some(token)),
            _ => request,
        }
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: Response,
        subject: &str,
    ) -> Result<T, TrackerError> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| TrackerError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            })
        } else {
            Err(self.error_from_response(response, status, subject).await)
        }
    }

    /// Map an error response from the API.
    async fn error_from_response(
        &self,
        response: Response,
        status: StatusCode,
        subject: &str,
    ) -> TrackerError {
        let message = match response.json::<JiraErrorResponse>().await {
            Ok(err) => err.message(),
            Err(_) => "Unknown error".to_string(),
        };

        match status {
            StatusCode::UNAUTHORIZED => {
                if self.is_authenticated() {
                    TrackerError::AuthFailed("Invalid username or token".into())
                } else {
                    TrackerError::AuthRequired
                }
            }
            StatusCode::FORBIDDEN => TrackerError::AuthFailed(format!("Permission denied: {}", message)),
            StatusCode::NOT_FOUND => TrackerError::NotFound(subject.to_string()),
            StatusCode::TOO_MANY_REQUESTS => TrackerError::RateLimited,
            _ if status.is_server_error() => TrackerError::ApiError {
                status: status.as_u16(),
                message: format!("Jira server error: {}", message),
            },
            _ => TrackerError::ApiError {
                status: status.as_u16(),
                message,
            },
        }
    }

    async fn search_page(
        &self,
        query: &str,
        start_at: u32,
        page_size: u32,
    ) -> Result<SearchResponse, TrackerError> {
        let request = self
            .client
            .get(self.api_url("search"))
            .headers(Self::headers())
            .query(&[
                ("jql", query.to_string()),
                ("startAt", start_at.to_string()),
                ("maxResults", page_size.to_string()),
                ("fields", self.field_list()),
            ]);

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| TrackerError::NetworkError(e.to_string()))?;

        self.handle_response(response, query).await
    }
}

#[async_trait]
impl Tracker for JiraTracker {
    fn name(&self) -> &'static str {
        "jira"
    }

    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<RawIssue>, TrackerError> {
        let mut issues = Vec::new();
        let mut start_at = 0;

        while start_at < max_results {
            let page_size = (max_results - start_at).min(PAGE_SIZE);
            let page = self.search_page(query, start_at, page_size).await?;
            let received = page.issues.len() as u32;

            for issue in page.issues {
                match issue.into_raw(&self.epic_link_field) {
                    Ok(raw) => issues.push(raw),
                    Err(e) => tracing::warn!("skipping search result: {}", e),
                }
            }

            start_at += received;
            if received == 0 || start_at >= page.total {
                break;
            }
        }

        tracing::debug!(query, count = issues.len(), "search complete");
        Ok(issues)
    }

    async fn fetch_issue(&self, key: &IssueKey) -> Result<RawIssue, TrackerError> {
        let request = self
            .client
            .get(self.api_url(&format!("issue/{}", key)))
            .headers(Self::headers())
            .query(&[("fields", self.field_list())]);

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| TrackerError::NetworkError(e.to_string()))?;

        let issue: JiraIssue = self.handle_response(response, key.as_str()).await?;
        tracing::debug!(%key, "fetched issue");
        issue.into_raw(&self.epic_link_field)
    }
}

// =============================================================================
// Jira API response types
// =============================================================================

/// Error body returned by Jira.
#[derive(Debug, Deserialize)]
struct JiraErrorResponse {
    #[serde(rename = "errorMessages", default)]
    error_messages: Vec<String>,
    #[serde(default)]
    errors: HashMap<String, String>,
}

impl JiraErrorResponse {
    fn message(&self) -> String {
        let mut parts = self.error_messages.clone();
        let mut fields: Vec<_> = self.errors.iter().collect();
        fields.sort();
        parts.extend(fields.into_iter().map(|(k, v)| format!("{}: {}", k, v)));
        if parts.is_empty() {
            "Unknown error".to_string()
        } else {
            parts.join("; ")
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    total: u32,
    #[serde(default)]
    issues: Vec<JiraIssue>,
}

#[derive(Debug, Deserialize)]
struct JiraIssue {
    key: String,
    fields: JiraFields,
}

#[derive(Debug, Deserialize)]
struct JiraFields {
    summary: Option<String>,
    status: Option<Named>,
    issuetype: Option<Named>,
    parent: Option<KeyRef>,
    #[serde(flatten)]
    extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Deserialize)]
struct KeyRef {
    key: String,
}

impl JiraIssue {
    /// Validate and convert into a [`RawIssue`].
    fn into_raw(self, epic_link_field: &str) -> Result<RawIssue, TrackerError> {
        let key = IssueKey::new(&self.key)
            .map_err(|e| TrackerError::InvalidPayload(e.to_string()))?;

        let issue_type = self
            .fields
            .issuetype
            .map(|t| IssueType::from_name(&t.name))
            .ok_or_else(|| TrackerError::InvalidPayload(format!("{} has no issue type", key)))?;

        let parent = match self.fields.parent {
            Some(p) => Some(IssueKey::new(&p.key).map_err(|e| {
                TrackerError::InvalidPayload(format!("{} has an invalid parent: {}", key, e))
            })?),
            None => None,
        };

        let epic_link = self
            .fields
            .extra
            .get(epic_link_field)
            .and_then(epic_link_text)
            .and_then(|text| match IssueKey::new(text) {
                Ok(k) => Some(k),
                Err(e) => {
                    tracing::warn!(%key, "ignoring epic link: {}", e);
                    None
                }
            });

        Ok(RawIssue {
            key,
            issue_type,
            status: self.fields.status.map(|s| s.name).unwrap_or_default(),
            summary: self.fields.summary.unwrap_or_default(),
            parent,
            epic_link,
        })
    }
}

/// The epic link is usually a plain key string, but some sites expose it
/// as an object with a `key` member.
fn epic_link_text(value: &serde_json::Value) -> Option<&str> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        serde_json::Value::Object(map) => map.get("key").and_then(|k| k.as_str()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> JiraIssue {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn converts_full_payload() {
        let issue = parse(json!({
            "key": "LPS-2",
            "fields": {
                "summary": "Add button",
                "status": { "name": "Closed" },
                "issuetype": { "name": "Technical Task" },
                "parent": { "key": "LPS-1" },
                "customfield_12821": "LPS-100",
                "labels": ["ignored"]
            }
        }));

        let raw = issue.into_raw("customfield_12821").unwrap();
        assert_eq!(raw.key.as_str(), "LPS-2");
        assert_eq!(raw.issue_type, IssueType::TechnicalTask);
        assert_eq!(raw.status, "Closed");
        assert_eq!(raw.summary, "Add button");
        assert_eq!(raw.parent.unwrap().as_str(), "LPS-1");
        assert_eq!(raw.epic_link.unwrap().as_str(), "LPS-100");
    }

    #[test]
    fn epic_link_as_object() {
        let issue = parse(json!({
            "key": "LPS-2",
            "fields": {
                "issuetype": { "name": "Story" },
                "customfield_10014": { "key": "LPS-7" }
            }
        }));

        let raw = issue.into_raw("customfield_10014").unwrap();
        assert_eq!(raw.epic_link.unwrap().as_str(), "LPS-7");
    }

    #[test]
    fn null_or_invalid_epic_link_is_none() {
        let null_link = parse(json!({
            "key": "LPS-2",
            "fields": { "issuetype": { "name": "Story" }, "customfield_12821": null }
        }));
        assert!(null_link.into_raw("customfield_12821").unwrap().epic_link.is_none());

        let bad_link = parse(json!({
            "key": "LPS-2",
            "fields": { "issuetype": { "name": "Story" }, "customfield_12821": "garbage" }
        }));
        assert!(bad_link.into_raw("customfield_12821").unwrap().epic_link.is_none());
    }

    #[test]
    fn missing_issue_type_is_invalid() {
        let issue = parse(json!({ "key": "LPS-2", "fields": { "summary": "x" } }));
        assert!(matches!(
            issue.into_raw("customfield_12821"),
            Err(TrackerError::InvalidPayload(_))
        ));
    }

    #[test]
    fn invalid_key_is_invalid() {
        let issue = parse(json!({ "key": "nope", "fields": { "issuetype": { "name": "Task" } } }));
        assert!(issue.into_raw("customfield_12821").is_err());
    }

    #[test]
    fn error_response_message() {
        let err: JiraErrorResponse = serde_json::from_value(json!({
            "errorMessages": ["The value 'X' does not exist for the field 'project'."],
            "errors": { "jql": "bad" }
        }))
        .unwrap();
        assert_eq!(
            err.message(),
            "The value 'X' does not exist for the field 'project'.; jql: bad"
        );

        let empty: JiraErrorResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.message(), "Unknown error");
    }

    #[test]
    fn trims_trailing_slash() {
        let tracker = JiraTracker::new("https://issues.example.com/", "customfield_1");
        assert_eq!(tracker.base_url(), "https://issues.example.com");
        assert_eq!(
            tracker.api_url("search"),
            "https://issues.example.com/rest/api/2/search"
        );
    }

    #[test]
    fn field_list_includes_epic_field() {
        let tracker = JiraTracker::new("https://x.example.com", "customfield_99");
        assert_eq!(
            tracker.field_list(),
            "summary,status,issuetype,parent,customfield_99"
        );
    }

    #[test]
    fn debug_redacts_token() {
        let tracker = JiraTracker::new("https://x.example.com", "customfield_1")
            .with_credentials("jdoe", "super-secret");
        let debug = format!("{:?}", tracker);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("has_token: true"));
        assert!(tracker.is_authenticated());
    }
}
