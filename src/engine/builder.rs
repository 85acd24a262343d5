//! engine::builder
//!
//! Feature tree builder: places tickets found in history into a forest.
//!
//! # Algorithm
//!
//! Placement runs in two steps per ticket:
//!
//! 1. **Lineage.** Walk the ticket's parent chain through the issue cache
//!    (fetching on a miss) until reaching a ticket with no parent, or a
//!    Story. Every ancestor must be a Story or Task-family issue; the
//!    walk keeps a visited set so a chain that loops back on itself is
//!    rejected instead of followed forever.
//! 2. **Placement.** The chain root decides the destination: under its
//!    epic if it has an epic link, otherwise the `stories` or `tasks`
//!    bucket. The chain is then inserted top-down, creating each missing
//!    node and leaving existing ones untouched.
//!
//! Nothing is written to the forest until the lineage is fully resolved,
//! so a dropped ticket never leaves a partial branch behind. The only
//! exception is the epic: it is reserved as an empty placeholder before
//! its own fetch, and a failed fetch leaves the placeholder in place.
//!
//! # Diagnostics
//!
//! Dropped and degraded tickets are logged and collected as
//! [`Diagnostic`]s; none of them aborts the build.

use std::collections::HashSet;

use thiserror::Error;

use super::cache::IssueCache;
use crate::core::tree::{Bucket, FeatureForest, FeatureNode};
use crate::core::types::{IssueKey, IssueType, RawIssue};
use crate::tracker::{Tracker, TrackerError};

/// Why a ticket could not be placed as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineageError {
    /// Tracker lookup of an ancestor or epic failed.
    #[error("{ticket}: could not fetch {key}: {source}")]
    FetchFailure {
        ticket: IssueKey,
        key: IssueKey,
        source: TrackerError,
    },

    /// An ancestor is neither a Story nor Task-family.
    #[error("{ticket}: {child} has parent {parent} of type {parent_type}, which is neither a story nor a task")]
    MalformedLineage {
        ticket: IssueKey,
        child: IssueKey,
        parent: IssueKey,
        parent_type: IssueType,
    },

    /// The ticket itself is neither a Story nor Task-family.
    #[error("{ticket} is of type {issue_type}, which is neither a story nor a task")]
    UnsupportedIssueType {
        ticket: IssueKey,
        issue_type: IssueType,
    },

    /// The lineage loops back to a ticket already on the chain.
    #[error("{ticket}: lineage cycles back to {key}")]
    CyclicLineage { ticket: IssueKey, key: IssueKey },
}

impl LineageError {
    /// The ticket whose placement was affected.
    pub fn ticket(&self) -> &IssueKey {
        match self {
            LineageError::FetchFailure { ticket, .. }
            | LineageError::MalformedLineage { ticket, .. }
            | LineageError::UnsupportedIssueType { ticket, .. }
            | LineageError::CyclicLineage { ticket, .. } => ticket,
        }
    }
}

/// What happened to the affected ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// The ticket is absent from the forest.
    Dropped,
    /// The ticket is placed, but an ancestor is only partially represented.
    Degraded,
}

impl std::fmt::Display for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effect::Dropped => write!(f, "dropped"),
            Effect::Degraded => write!(f, "degraded"),
        }
    }
}

/// A dropped or degraded ticket and the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub effect: Effect,
    pub error: LineageError,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.error, self.effect)
    }
}

/// Builds one profile's forest.
///
/// The builder owns the forest under construction and borrows the
/// run-wide issue cache, which it extends with every ancestor it fetches.
pub struct FeatureTreeBuilder<'a> {
    tracker: &'a dyn Tracker,
    cache: &'a mut IssueCache,
    forest: FeatureForest,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> FeatureTreeBuilder<'a> {
    /// Start an empty forest.
    pub fn new(cache: &'a mut IssueCache, tracker: &'a dyn Tracker) -> Self {
        Self {
            tracker,
            cache,
            forest: FeatureForest::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn forest(&self) -> &FeatureForest {
        &self.forest
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the builder, yielding the forest and collected diagnostics.
    pub fn finish(self) -> (FeatureForest, Vec<Diagnostic>) {
        (self.forest, self.diagnostics)
    }

    /// Place a ticket found in history.
    ///
    /// Returns `true` if the ticket is present in the forest afterwards.
    /// Adding a ticket that is already placed is a no-op.
    pub async fn add_issue(&mut self, issue: &RawIssue) -> bool {
        if !issue.issue_type.is_story() && !issue.issue_type.is_task_family() {
            self.report(
                Effect::Dropped,
                LineageError::UnsupportedIssueType {
                    ticket: issue.key.clone(),
                    issue_type: issue.issue_type.clone(),
                },
            );
            return false;
        }

        let chain = match self.lineage(issue).await {
            Ok(chain) => chain,
            Err(err) => {
                self.report(Effect::Dropped, err);
                return false;
            }
        };

        self.place(&issue.key, &chain).await;
        true
    }

    /// Resolve the chain from `issue` up to its placement root.
    ///
    /// The returned chain starts with `issue` and ends with the root.
    async fn lineage(&mut self, issue: &RawIssue) -> Result<Vec<RawIssue>, LineageError> {
        let ticket = issue.key.clone();
        let mut visited: HashSet<IssueKey> = HashSet::from([ticket.clone()]);
        let mut chain = vec![issue.clone()];

        loop {
            let current = &chain[chain.len() - 1];
            if current.issue_type.is_story() {
                break;
            }
            let Some(parent_key) = current.parent.clone() else {
                break;
            };
            if !visited.insert(parent_key.clone()) {
                return Err(LineageError::CyclicLineage {
                    ticket,
                    key: parent_key,
                });
            }

            let parent = self
                .cache
                .resolve(&parent_key, self.tracker)
                .await
                .map_err(|source| LineageError::FetchFailure {
                    ticket: ticket.clone(),
                    key: parent_key.clone(),
                    source,
                })?;

            if !parent.issue_type.is_story() && !parent.issue_type.is_task_family() {
                return Err(LineageError::MalformedLineage {
                    ticket,
                    child: current.key.clone(),
                    parent: parent.key,
                    parent_type: parent.issue_type,
                });
            }

            chain.push(parent);
        }

        let root = &chain[chain.len() - 1];
        if let Some(epic) = &root.epic_link {
            if visited.contains(epic) {
                return Err(LineageError::CyclicLineage {
                    ticket,
                    key: epic.clone(),
                });
            }
        }

        Ok(chain)
    }

    /// Insert a resolved chain top-down.
    async fn place(&mut self, ticket: &IssueKey, chain: &[RawIssue]) {
        let Some(root) = chain.last() else {
            return;
        };

        let bucket = match &root.epic_link {
            Some(epic) => {
                self.add_epic(epic, ticket).await;
                Bucket::Epics
            }
            None if root.issue_type.is_story() => Bucket::Stories,
            None => Bucket::Tasks,
        };

        let top = self.forest.bucket_mut(bucket);
        let mut node: &mut FeatureNode = match &root.epic_link {
            Some(epic) => top
                .entry(epic.clone())
                .or_insert_with(FeatureNode::placeholder)
                .insert_child(root.key.clone(), root.projection()),
            None => top
                .entry(root.key.clone())
                .or_insert_with(|| FeatureNode::new(root.projection())),
        };

        for issue in chain.iter().rev().skip(1) {
            node = node.insert_child(issue.key.clone(), issue.projection());
        }

        tracing::debug!(%ticket, bucket = %bucket, depth = chain.len(), "placed");
    }

    /// Ensure `epics[epic]` exists, resolving its projection once.
    async fn add_epic(&mut self, epic: &IssueKey, ticket: &IssueKey) {
        if !self.forest.reserve_epic(epic) {
            return;
        }

        match self.cache.resolve(epic, self.tracker).await {
            Ok(issue) => self.forest.fill_epic(epic, issue.projection()),
            Err(source) => self.report(
                Effect::Degraded,
                LineageError::FetchFailure {
                    ticket: ticket.clone(),
                    key: epic.clone(),
                    source,
                },
            ),
        }
    }

    fn report(&mut self, effect: Effect, error: LineageError) {
        tracing::warn!(ticket = %error.ticket(), %effect, "{}", error);
        self.diagnostics.push(Diagnostic { effect, error });
    }
}
