//! tracker::traits
//!
//! Tracker trait definition for reading tickets from an issue tracker.
//!
//! # Design
//!
//! The `Tracker` trait is async because tracker lookups involve network
//! I/O. Only two capabilities are needed: a bounded batch search and a
//! single-issue fetch by key. Both hand back [`RawIssue`] values that
//! were already validated at the boundary.
//!
//! # Example
//!
//! ```ignore
//! use featuretrail::tracker::{Tracker, TrackerError};
//!
//! async fn count(tracker: &dyn Tracker) -> Result<usize, TrackerError> {
//!     let issues = tracker.search("project = LPS", 500).await?;
//!     Ok(issues.len())
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::{IssueKey, RawIssue};

/// Errors from tracker operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// Authentication is required but not available.
    #[error("authentication required")]
    AuthRequired,

    /// Authentication failed (invalid credentials, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested issue does not exist or is not visible.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The tracker returned an issue that cannot be represented.
    #[error("invalid issue payload: {0}")]
    InvalidPayload(String),
}

/// The Tracker trait for reading tickets.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, TrackerError>`. Single-issue fetch
/// failures are recoverable: callers decide whether to drop one ticket's
/// lineage or abort the run.
#[async_trait]
pub trait Tracker: Send + Sync {
    /// Get the tracker name (e.g., "jira").
    fn name(&self) -> &'static str;

    /// Run a query and return at most `max_results` issues, in tracker order.
    ///
    /// # Errors
    ///
    /// - `AuthRequired` / `AuthFailed` if credentials are missing or rejected
    /// - `ApiError` if the query is malformed
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<RawIssue>, TrackerError>;

    /// Fetch a single issue by key.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the key does not exist
    async fn fetch_issue(&self, key: &IssueKey) -> Result<RawIssue, TrackerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_error_display() {
        assert_eq!(
            format!("{}", TrackerError::AuthRequired),
            "authentication required"
        );
        assert_eq!(
            format!("{}", TrackerError::AuthFailed("bad password".into())),
            "authentication failed: bad password"
        );
        assert_eq!(
            format!("{}", TrackerError::NotFound("LPS-1".into())),
            "not found: LPS-1"
        );
        assert_eq!(format!("{}", TrackerError::RateLimited), "rate limited");
        assert_eq!(
            format!(
                "{}",
                TrackerError::ApiError {
                    status: 400,
                    message: "bad JQL".into()
                }
            ),
            "API error: 400 - bad JQL"
        );
        assert_eq!(
            format!("{}", TrackerError::NetworkError("connection refused".into())),
            "network error: connection refused"
        );
        assert_eq!(
            format!("{}", TrackerError::InvalidPayload("missing key".into())),
            "invalid issue payload: missing key"
        );
    }
}
