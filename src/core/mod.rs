//! core
//!
//! Core domain types, schemas, and pure algorithms.
//!
//! # Modules
//!
//! - [`types`] - Strong types: IssueKey, IssueType, RawIssue, Projection
//! - [`order`] - Project-aware natural ordering of ticket keys
//! - [`tree`] - Feature forest representation and ordered serialization
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing
//! - Nothing in this layer performs I/O besides config loading

pub mod config;
pub mod order;
pub mod tree;
pub mod types;
