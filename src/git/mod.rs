//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **only doorway** to Git. No other module imports
//! `git2` or spawns the git CLI.
//!
//! # Responsibilities
//!
//! - Repository discovery and opening
//! - Commit subject listing over a `from..to` range
//! - Branch synchronization (`checkout` + `pull`)

mod interface;

pub use interface::{Git, GitError};
