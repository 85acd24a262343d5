//! engine
//!
//! Reconciles tracker tickets against git history and assembles the
//! feature forest.
//!
//! # Architecture
//!
//! A [`Run`] drives one process invocation:
//!
//! 1. **Index**: read every configured branch's commit subjects into a
//!    single [`GitHistoryIndex`], syncing branches first when asked to
//! 2. **Query**: for each profile, fetch the bounded ticket batch
//! 3. **Match**: keep the tickets the history index references
//! 4. **Build**: place the matched tickets into a fresh forest with a
//!    [`FeatureTreeBuilder`]
//!
//! The issue cache and the history index live for the whole run and are
//! shared by every profile; each profile gets its own forest.
//!
//! # Invariants
//!
//! - Profiles run sequentially; one ticket's lineage is fully resolved
//!   before the next ticket is considered
//! - Only a failed batch query aborts a profile; lineage problems become
//!   diagnostics

pub mod builder;
pub mod cache;
pub mod history;

pub use builder::{Diagnostic, Effect, FeatureTreeBuilder, LineageError};
pub use cache::IssueCache;
pub use history::{normalize_subjects, GitHistoryIndex, Membership};

use std::path::{Path, PathBuf};

use crate::core::config::BranchConfig;
use crate::core::tree::FeatureForest;
use crate::core::types::{IssueKey, RawIssue};
use crate::git::{Git, GitError};
use crate::tracker::{Tracker, TrackerError};

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command behavior.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Explicit project config file.
    pub config: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
}

impl Context {
    /// The effective working directory.
    pub fn working_dir(&self) -> std::io::Result<PathBuf> {
        match &self.cwd {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir(),
        }
    }
}

/// Raw commit subjects of a configured branch's `from..to` range.
///
/// Relative branch directories are resolved against `base`. When `sync`
/// is set and the branch asks for it, the branch is checked out and
/// pulled before its history is read.
pub fn read_branch_subjects(
    branch: &BranchConfig,
    base: &Path,
    sync: bool,
) -> Result<Vec<String>, GitError> {
    let dir = if branch.dir.is_absolute() {
        branch.dir.clone()
    } else {
        base.join(&branch.dir)
    };

    let git = Git::open(&dir)?;
    if sync && branch.sync {
        tracing::info!(branch = %branch.name, remote = branch.remote(), "syncing branch");
        git.sync_branch(&branch.name, branch.remote())?;
    }
    git.commit_subjects(&branch.from, &branch.to)
}

/// Counts from indexing one branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchIndexed {
    /// Commits in the branch's range.
    pub commits: usize,
    /// Subjects kept after normalization.
    pub kept: usize,
}

/// Read one branch's history and merge it into `index`.
///
/// Subjects are normalized against `ignore` before they are absorbed.
/// This is the only path from a configured branch into a history index.
///
/// # Errors
///
/// Returns the git failure; `index` is left unchanged then.
pub fn index_branch(
    index: &mut GitHistoryIndex,
    branch: &BranchConfig,
    base: &Path,
    ignore: &[String],
    sync: bool,
) -> Result<BranchIndexed, GitError> {
    let subjects = read_branch_subjects(branch, base, sync)?;
    let kept = index.absorb(normalize_subjects(&subjects, ignore));
    tracing::info!(
        branch = %branch.name,
        range = %branch.range(),
        commits = subjects.len(),
        kept,
        "indexed history"
    );
    Ok(BranchIndexed {
        commits: subjects.len(),
        kept,
    })
}

/// Result of running one profile.
#[derive(Debug, Clone)]
pub struct ProfileOutcome {
    /// Profile name.
    pub name: String,
    /// The assembled forest.
    pub forest: FeatureForest,
    /// Size of the queried batch.
    pub total: usize,
    /// Batch tickets found in history, in batch order.
    pub matched: Vec<IssueKey>,
    /// Dropped or degraded tickets.
    pub diagnostics: Vec<Diagnostic>,
}

impl ProfileOutcome {
    /// One-line summary, e.g. `12 out of 40 issues were found in git`.
    pub fn summary(&self) -> String {
        format!(
            "{} out of {} issues were found in git",
            self.matched.len(),
            self.total
        )
    }
}

/// Run-wide state: tracker handle, issue cache, history index.
pub struct Run<'t> {
    tracker: &'t dyn Tracker,
    cache: IssueCache,
    history: GitHistoryIndex,
}

impl<'t> Run<'t> {
    pub fn new(tracker: &'t dyn Tracker) -> Self {
        Self {
            tracker,
            cache: IssueCache::new(),
            history: GitHistoryIndex::new(),
        }
    }

    pub fn cache(&self) -> &IssueCache {
        &self.cache
    }

    pub fn history(&self) -> &GitHistoryIndex {
        &self.history
    }

    /// Normalize raw commit subjects and merge them into the history index.
    ///
    /// Returns the number of subjects kept after normalization.
    pub fn absorb_history<I, S>(&mut self, subjects: I, ignore: &[String]) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized = normalize_subjects(subjects, ignore);
        self.history.absorb(&normalized)
    }

    /// Read one branch's history into the run's index.
    ///
    /// Returns the number of subjects kept. See [`index_branch`].
    ///
    /// # Errors
    ///
    /// Returns the git failure; the index is left unchanged then.
    pub fn index_branch(
        &mut self,
        branch: &BranchConfig,
        base: &Path,
        ignore: &[String],
        sync: bool,
    ) -> Result<usize, GitError> {
        index_branch(&mut self.history, branch, base, ignore, sync).map(|stats| stats.kept)
    }

    /// Query a profile's batch and build its forest.
    ///
    /// # Errors
    ///
    /// Returns the batch query failure.
    pub async fn run_profile(
        &mut self,
        name: &str,
        query: &str,
        max_results: u32,
    ) -> Result<ProfileOutcome, TrackerError> {
        tracing::info!(profile = name, max_results, "querying {}", self.tracker.name());
        let batch = self.tracker.search(query, max_results).await?;
        Ok(self.build_forest(name, &batch).await)
    }

    /// Build a forest from an already-fetched batch.
    pub async fn build_forest(&mut self, name: &str, batch: &[RawIssue]) -> ProfileOutcome {
        self.cache.absorb(batch);

        let matched: Vec<&RawIssue> = batch
            .iter()
            .filter(|issue| self.history.contains_ticket(issue.key.as_str()))
            .collect();

        let mut builder = FeatureTreeBuilder::new(&mut self.cache, self.tracker);
        for issue in &matched {
            builder.add_issue(issue).await;
        }
        let (forest, diagnostics) = builder.finish();

        let outcome = ProfileOutcome {
            name: name.to_string(),
            forest,
            total: batch.len(),
            matched: matched.iter().map(|issue| issue.key.clone()).collect(),
            diagnostics,
        };
        tracing::info!(profile = name, dropped = outcome.diagnostics.len(), "{}", outcome.summary());
        outcome
    }
}
