//! tracker
//!
//! Abstraction for issue trackers (Jira).
//!
//! # Architecture
//!
//! The `Tracker` trait defines the two capabilities the reconciliation
//! engine consumes: a bounded batch search and a single-issue fetch.
//! Commands use [`create_tracker`] rather than constructing specific
//! implementations directly.
//!
//! - Tracker results are validated into `RawIssue` at this boundary
//! - Single fetch failures are recoverable and never corrupt a forest
//!
//! # Modules
//!
//! - `traits`: Core `Tracker` trait and `TrackerError`
//! - [`jira`]: Jira REST v2 implementation
//! - [`mock`]: Mock implementation for deterministic testing

pub mod jira;
pub mod mock;
mod traits;

pub use traits::*;

use crate::core::config::{Config, ConfigError};
use jira::JiraTracker;

/// Create the tracker described by `config`.
///
/// `token` is the API token (or password) to pair with the configured
/// username; without either, requests are anonymous.
///
/// # Errors
///
/// Returns `ConfigError::MissingValue` if no tracker URL is configured.
pub fn create_tracker(
    config: &Config,
    token: Option<String>,
) -> Result<Box<dyn Tracker>, ConfigError> {
    // "jira" is the only provider config validation accepts
    let url = config.tracker_url()?;
    let settings = config.tracker();

    let mut tracker = JiraTracker::new(url, config.epic_link_field());
    match (settings.username, token) {
        (Some(user), Some(token)) => tracker = tracker.with_credentials(user, token),
        (Some(user), None) => {
            tracing::warn!(%user, "no tracker token available; querying anonymously")
        }
        _ => {}
    }

    Ok(Box::new(tracker))
}
