//! git::interface
//!
//! Git interface implementation using git2.
//!
//! # Architecture
//!
//! The `Git` struct is the only way to read a repository's history.
//! No other module imports `git2` directly. This keeps error
//! normalization in one place and gives callers typed failures.
//!
//! Branch synchronization is the one operation not served by git2: it
//! needs porcelain `checkout` and `pull` with the user's configured
//! credentials and merge settings, so it runs the git CLI in the
//! branch's working directory.
//!
//! # Error Handling
//!
//! - [`GitError::NotARepo`]: Not inside a Git repository
//! - [`GitError::RevisionNotFound`]: A range endpoint does not resolve
//! - [`GitError::CommandFailed`]: A git CLI invocation failed
//!
//! # Example
//!
//! ```ignore
//! use featuretrail::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! for subject in git.commit_subjects("7.0.x", "master")? {
//!     println!("{subject}");
//! }
//! ```

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// A revision does not resolve to a commit.
    #[error("revision not found: {revision}")]
    RevisionNotFound {
        /// The revision that was requested
        revision: String,
    },

    /// A git CLI invocation failed.
    #[error("`git {command}` failed: {message}")]
    CommandFailed {
        /// Arguments of the invocation
        command: String,
        /// Captured stderr or spawn error
        message: String,
    },

    /// Permission or filesystem error.
    #[error("repository access error: {message}")]
    AccessError {
        /// Description of the error
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound | git2::ErrorCode::InvalidSpec => {
                GitError::RevisionNotFound {
                    revision: context.to_string(),
                }
            }
            git2::ErrorCode::Locked => GitError::AccessError {
                message: format!("repository is locked: {}", err.message()),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

/// Handle to an opened repository.
pub struct Git {
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    /// Open the repository containing `path`.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }

        Ok(Self { repo })
    }

    /// Working directory of the repository.
    pub fn work_dir(&self) -> Result<&Path, GitError> {
        self.repo.workdir().ok_or(GitError::BareRepo)
    }

    /// Subjects of the commits reachable from `to` but not from `from`.
    ///
    /// Equivalent to `git log --pretty=format:%s from..to`, newest first.
    /// Subjects that are not valid UTF-8 are decoded lossily; only commits
    /// with an empty message are skipped.
    ///
    /// # Errors
    ///
    /// - [`GitError::RevisionNotFound`] if either endpoint does not resolve
    pub fn commit_subjects(&self, from: &str, to: &str) -> Result<Vec<String>, GitError> {
        let from_oid = self.resolve_commit(from)?;
        let to_oid = self.resolve_commit(to)?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(git2::Sort::TIME)?;
        revwalk.push(to_oid)?;
        revwalk.hide(from_oid)?;

        let mut subjects = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            match commit.summary_bytes() {
                Some(subject) => subjects.push(String::from_utf8_lossy(subject).into_owned()),
                None => tracing::debug!(oid = %commit.id(), "skipping commit without subject"),
            }
        }
        Ok(subjects)
    }

    /// Check out `branch` and pull it from `remote`.
    ///
    /// # Errors
    ///
    /// - [`GitError::CommandFailed`] if either step fails
    pub fn sync_branch(&self, branch: &str, remote: &str) -> Result<(), GitError> {
        let dir = self.work_dir()?;
        run_git(dir, &["checkout", branch])?;
        run_git(dir, &["pull", remote, branch])?;
        Ok(())
    }

    fn resolve_commit(&self, revision: &str) -> Result<git2::Oid, GitError> {
        let object = self
            .repo
            .revparse_single(revision)
            .map_err(|e| GitError::from_git2(e, revision))?;
        let commit = object
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, revision))?;
        Ok(commit.id())
    }
}

fn run_git(dir: &Path, args: &[&str]) -> Result<(), GitError> {
    let command = args.join(" ");
    tracing::debug!(dir = %dir.display(), "git {}", command);

    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| GitError::CommandFailed {
            command: command.clone(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(GitError::CommandFailed {
            command,
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}
