//! tracker::mock
//!
//! Mock tracker implementation for deterministic testing.
//!
//! # Design
//!
//! The mock tracker stores issues in memory, answers every search with
//! its configured batch, and allows configuring per-key fetch failures.
//! All calls are recorded so tests can assert how often the tracker was
//! hit (e.g. that cached parents are not re-fetched).
//!
//! # Example
//!
//! ```
//! use featuretrail::core::types::{IssueKey, IssueType, RawIssue};
//! use featuretrail::tracker::mock::MockTracker;
//! use featuretrail::tracker::Tracker;
//!
//! # tokio_test::block_on(async {
//! let key = IssueKey::new("LPS-1").unwrap();
//! let tracker = MockTracker::new()
//!     .with_issue(RawIssue::new(key.clone(), IssueType::Story, "Open", "Login"));
//!
//! let issue = tracker.fetch_issue(&key).await.unwrap();
//! assert_eq!(issue.summary, "Login");
//! assert_eq!(tracker.fetch_count(&key), 1);
//! # });
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use super::traits::{Tracker, TrackerError};
use crate::core::types::{IssueKey, RawIssue};

/// Mock tracker for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone, Default)]
pub struct MockTracker {
    inner: Arc<Mutex<MockTrackerInner>>,
}

#[derive(Debug, Default)]
struct MockTrackerInner {
    /// Issues fetchable by key.
    issues: HashMap<IssueKey, RawIssue>,
    /// Batch returned by `search`, in order.
    batch: Vec<RawIssue>,
    /// Keys whose fetch fails.
    failing: HashSet<IssueKey>,
    /// Error returned by `search`, if set.
    search_error: Option<TrackerError>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    Search { query: String, max_results: u32 },
    FetchIssue { key: IssueKey },
}

impl MockTracker {
    /// Create a new empty mock tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an issue that can be fetched by key (not part of the batch).
    pub fn with_issue(self, issue: RawIssue) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.issues.insert(issue.key.clone(), issue);
        }
        self
    }

    /// Add an issue to the search batch; it is also fetchable by key.
    pub fn with_batch_issue(self, issue: RawIssue) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.issues.insert(issue.key.clone(), issue.clone());
            inner.batch.push(issue);
        }
        self
    }

    /// Make fetches of `key` fail with `NotFound`.
    pub fn failing(self, key: IssueKey) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.failing.insert(key);
        }
        self
    }

    /// Make `search` fail with the given error.
    pub fn fail_search(self, error: TrackerError) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.search_error = Some(error);
        }
        self
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        let inner = self.inner.lock().unwrap();
        inner.operations.clone()
    }

    /// Number of single-issue fetches recorded for `key`.
    pub fn fetch_count(&self, key: &IssueKey) -> usize {
        let inner = self.inner.lock().unwrap();
        inner
            .operations
            .iter()
            .filter(|op| matches!(op, MockOperation::FetchIssue { key: k } if k == key))
            .count()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.clear();
    }

    fn record(&self, op: MockOperation) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(op);
    }
}

#[async_trait]
impl Tracker for MockTracker {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<RawIssue>, TrackerError> {
        self.record(MockOperation::Search {
            query: query.to_string(),
            max_results,
        });

        let inner = self.inner.lock().unwrap();
        if let Some(err) = &inner.search_error {
            return Err(err.clone());
        }
        Ok(inner
            .batch
            .iter()
            .take(max_results as usize)
            .cloned()
            .collect())
    }

    async fn fetch_issue(&self, key: &IssueKey) -> Result<RawIssue, TrackerError> {
        self.record(MockOperation::FetchIssue { key: key.clone() });

        let inner = self.inner.lock().unwrap();
        if inner.failing.contains(key) {
            return Err(TrackerError::NotFound(key.to_string()));
        }
        inner
            .issues
            .get(key)
            .cloned()
            .ok_or_else(|| TrackerError::NotFound(key.to_string()))
    }
}
