//! featuretrail - reassemble tracker tickets found in git history into a feature tree
//!
//! featuretrail reads the commit history of one or more release branches,
//! queries an issue tracker for a set of tickets, keeps the tickets the
//! history references, and groups them into an epic → story → task forest
//! with a deterministic, human-readable ordering.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - History index, issue cache, feature tree builder, run driver
//! - [`core`] - Domain types, key ordering, the forest, configuration
//! - [`tracker`] - Issue tracker abstraction (Jira)
//! - [`git`] - Single interface for all Git operations
//! - [`report`] - JSON and TSV rendering and export
//! - [`secrets`] - Tracker token storage
//!
//! # Correctness Invariants
//!
//! 1. Placing the same ticket twice leaves the forest unchanged
//! 2. Every placed ticket appears exactly once in a forest
//! 3. A ticket whose lineage cannot be resolved is dropped with a
//!    diagnostic and leaves no partial branch behind
//! 4. Rendered output is independent of insertion order

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod report;
pub mod secrets;
pub mod tracker;
