//! engine::cache
//!
//! Process-wide store of every issue seen so far.
//!
//! Issues arrive from bulk search results or from on-demand single-issue
//! lookups, and are used to resolve parent and epic references without
//! re-querying the tracker. The cache is append-only for the lifetime of
//! a run and shared across profiles; the most recently stored value for
//! a key always wins.

use std::collections::HashMap;

use crate::core::types::{IssueKey, RawIssue};
use crate::tracker::{Tracker, TrackerError};

/// Keyed store of raw issues.
#[derive(Debug, Default)]
pub struct IssueCache {
    issues: HashMap<IssueKey, RawIssue>,
}

impl IssueCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an issue, replacing any previous value for its key.
    pub fn put(&mut self, issue: RawIssue) {
        self.issues.insert(issue.key.clone(), issue);
    }

    /// Store every issue of a batch.
    pub fn absorb<'i>(&mut self, issues: impl IntoIterator<Item = &'i RawIssue>) {
        for issue in issues {
            self.put(issue.clone());
        }
    }

    pub fn get(&self, key: &IssueKey) -> Option<&RawIssue> {
        self.issues.get(key)
    }

    pub fn contains(&self, key: &IssueKey) -> bool {
        self.issues.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Return the cached issue, fetching and caching it on a miss.
    ///
    /// # Errors
    ///
    /// Propagates the tracker's fetch error; nothing is cached then.
    pub async fn resolve(
        &mut self,
        key: &IssueKey,
        tracker: &dyn Tracker,
    ) -> Result<RawIssue, TrackerError> {
        if let Some(issue) = self.issues.get(key) {
            return Ok(issue.clone());
        }

        tracing::debug!(%key, "cache miss, fetching from {}", tracker.name());
        let issue = tracker.fetch_issue(key).await?;
        self.put(issue.clone());
        Ok(issue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::IssueType;
    use crate::tracker::mock::MockTracker;

    fn key(s: &str) -> IssueKey {
        IssueKey::new(s).unwrap()
    }

    fn issue(k: &str, summary: &str) -> RawIssue {
        RawIssue::new(key(k), IssueType::Task, "Open", summary)
    }

    #[test]
    fn put_overwrites() {
        let mut cache = IssueCache::new();
        cache.put(issue("LPS-1", "old"));
        cache.put(issue("LPS-1", "new"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key("LPS-1")).unwrap().summary, "new");
    }

    #[test]
    fn absorb_batch() {
        let mut cache = IssueCache::new();
        let batch = vec![issue("LPS-1", "a"), issue("LPS-2", "b")];
        cache.absorb(&batch);

        assert!(cache.contains(&key("LPS-1")));
        assert!(cache.contains(&key("LPS-2")));
        assert!(cache.get(&key("LPS-3")).is_none());
    }

    #[tokio::test]
    async fn resolve_hits_cache_without_fetching() {
        let tracker = MockTracker::new();
        let mut cache = IssueCache::new();
        cache.put(issue("LPS-1", "cached"));

        let resolved = cache.resolve(&key("LPS-1"), &tracker).await.unwrap();
        assert_eq!(resolved.summary, "cached");
        assert!(tracker.operations().is_empty());
    }

    #[tokio::test]
    async fn resolve_fetches_once_then_caches() {
        let tracker = MockTracker::new().with_issue(issue("LPS-1", "remote"));
        let mut cache = IssueCache::new();

        cache.resolve(&key("LPS-1"), &tracker).await.unwrap();
        cache.resolve(&key("LPS-1"), &tracker).await.unwrap();

        assert_eq!(tracker.fetch_count(&key("LPS-1")), 1);
        assert!(cache.contains(&key("LPS-1")));
    }

    #[tokio::test]
    async fn resolve_propagates_failure() {
        let tracker = MockTracker::new();
        let mut cache = IssueCache::new();

        let err = cache.resolve(&key("LPS-404"), &tracker).await.unwrap_err();
        assert!(matches!(err, TrackerError::NotFound(_)));
        assert!(cache.is_empty());
    }
}
