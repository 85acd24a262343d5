//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`IssueKey`] - Validated tracker key (`PROJECT-NUMBER`)
//! - [`IssueType`] - Hierarchy class of a ticket
//! - [`RawIssue`] - Ticket as handed over by the tracker boundary
//! - [`Projection`] - Display-only subset of a ticket
//!
//! # Validation
//!
//! Keys are validated at construction time. Loosely structured tracker
//! payloads are converted into [`RawIssue`] at the tracker boundary, so
//! the rest of the crate never deals with optional or misspelled fields.
//!
//! # Examples
//!
//! ```
//! use featuretrail::core::types::{IssueKey, IssueType};
//!
//! let key = IssueKey::new("LPS-12345").unwrap();
//! assert_eq!(key.project(), "LPS");
//! assert_eq!(key.number(), 12345);
//!
//! assert!(IssueKey::new("not a key").is_err());
//! assert_eq!(IssueType::from_name("Technical Task"), IssueType::TechnicalTask);
//! ```

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::order::compare_keys;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid issue key: {0}")]
    InvalidIssueKey(String),
}

/// A validated tracker issue key.
///
/// Keys have the form `PROJECT-NUMBER`:
/// - The project part is non-empty, starts with an ASCII letter, and
///   contains only ASCII letters, digits, or `_`
/// - The number part is a non-empty run of ASCII digits
///
/// Keys are normalized to uppercase, matching the case-normalized commit
/// history they are looked up in.
///
/// Ordering is the natural key order: by project, then numerically by
/// number, so `PROJ-9 < PROJ-10`.
///
/// # Example
///
/// ```
/// use featuretrail::core::types::IssueKey;
///
/// let a = IssueKey::new("proj-9").unwrap();
/// let b = IssueKey::new("PROJ-10").unwrap();
/// assert_eq!(a.as_str(), "PROJ-9");
/// assert!(a < b);
///
/// assert!(IssueKey::new("").is_err());
/// assert!(IssueKey::new("PROJ").is_err());
/// assert!(IssueKey::new("PROJ-").is_err());
/// assert!(IssueKey::new("-12").is_err());
/// assert!(IssueKey::new("1PROJ-12").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IssueKey(String);

impl IssueKey {
    /// Create a new validated issue key.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidIssueKey` if the key is not of the form
    /// `PROJECT-NUMBER`.
    pub fn new(key: impl Into<String>) -> Result<Self, TypeError> {
        let key = key.into().trim().to_uppercase();
        Self::validate(&key)?;
        Ok(Self(key))
    }

    fn validate(key: &str) -> Result<(), TypeError> {
        let Some((project, number)) = key.rsplit_once('-') else {
            return Err(TypeError::InvalidIssueKey(format!(
                "'{key}' has no '-' separator"
            )));
        };

        let mut chars = project.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() => {}
            _ => {
                return Err(TypeError::InvalidIssueKey(format!(
                    "'{key}' must start with a letter"
                )))
            }
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(TypeError::InvalidIssueKey(format!(
                "'{key}' has an invalid project prefix"
            )));
        }

        if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
            return Err(TypeError::InvalidIssueKey(format!(
                "'{key}' must end with a number"
            )));
        }

        Ok(())
    }

    /// Get the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The project prefix (`LPS` in `LPS-42`).
    pub fn project(&self) -> &str {
        // validated: always contains '-'
        self.0.rsplit_once('-').map(|(p, _)| p).unwrap_or(&self.0)
    }

    /// The numeric suffix (`42` in `LPS-42`).
    ///
    /// Saturates at `u64::MAX` for absurdly long numbers.
    pub fn number(&self) -> u64 {
        self.0
            .rsplit_once('-')
            .and_then(|(_, n)| n.parse().ok())
            .unwrap_or(u64::MAX)
    }
}

impl TryFrom<String> for IssueKey {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IssueKey> for String {
    fn from(key: IssueKey) -> Self {
        key.0
    }
}

impl std::str::FromStr for IssueKey {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl std::fmt::Display for IssueKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for IssueKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialOrd for IssueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IssueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_keys(&self.0, &other.0)
    }
}

/// Hierarchy class of a ticket.
///
/// Only stories and the task family take part in tree placement; epics
/// appear as grouping nodes. Anything else is carried through as
/// [`IssueType::Other`] with its tracker name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IssueType {
    Epic,
    Story,
    Task,
    TechnicalTask,
    Other(String),
}

impl IssueType {
    /// Map a tracker type name to an issue type.
    ///
    /// Matching is exact, as tracker type names are fixed vocabulary.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Epic" => IssueType::Epic,
            "Story" => IssueType::Story,
            "Task" => IssueType::Task,
            "Technical Task" => IssueType::TechnicalTask,
            other => IssueType::Other(other.to_string()),
        }
    }

    /// The tracker-facing name of this type.
    pub fn name(&self) -> &str {
        match self {
            IssueType::Epic => "Epic",
            IssueType::Story => "Story",
            IssueType::Task => "Task",
            IssueType::TechnicalTask => "Technical Task",
            IssueType::Other(name) => name,
        }
    }

    pub fn is_story(&self) -> bool {
        matches!(self, IssueType::Story)
    }

    /// Plain tasks and technical tasks.
    pub fn is_task_family(&self) -> bool {
        matches!(self, IssueType::Task | IssueType::TechnicalTask)
    }
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for IssueType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for IssueType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(IssueType::from_name(&name))
    }
}

/// A ticket as returned by the tracker.
///
/// Immutable once fetched and identified by `key`. Parent and epic link
/// are explicit optional references, resolved lazily through the issue
/// cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawIssue {
    pub key: IssueKey,
    pub issue_type: IssueType,
    pub status: String,
    pub summary: String,
    pub parent: Option<IssueKey>,
    pub epic_link: Option<IssueKey>,
}

impl RawIssue {
    /// Create an issue with no parent and no epic link.
    pub fn new(
        key: IssueKey,
        issue_type: IssueType,
        status: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            key,
            issue_type,
            status: status.into(),
            summary: summary.into(),
            parent: None,
            epic_link: None,
        }
    }

    /// Set the parent reference.
    pub fn with_parent(mut self, parent: IssueKey) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Set the epic link reference.
    pub fn with_epic_link(mut self, epic: IssueKey) -> Self {
        self.epic_link = Some(epic);
        self
    }

    /// Reduce this issue to its display projection.
    pub fn projection(&self) -> Projection {
        Projection {
            summary: self.summary.clone(),
            status: self.status.clone(),
            issue_type: self.issue_type.clone(),
        }
    }
}

/// Display-only subset of a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    pub summary: String,
    pub status: String,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
}

#[cfg(test)]
mod tests {
    use super::*;

    mod issue_key {
        use super::*;

        #[test]
        fn valid_keys() {
            for key in ["LPS-1", "PROJ-10", "A1_B-007", "x-1"] {
                assert!(IssueKey::new(key).is_ok(), "{key} should be valid");
            }
        }

        #[test]
        fn invalid_keys() {
            for key in ["", "LPS", "LPS-", "-1", "1LPS-2", "LP S-3", "LPS-1a", "LPS--1"] {
                assert!(IssueKey::new(key).is_err(), "{key} should be invalid");
            }
        }

        #[test]
        fn normalizes_case_and_whitespace() {
            let key = IssueKey::new("  lps-42 ").unwrap();
            assert_eq!(key.as_str(), "LPS-42");
        }

        #[test]
        fn parts() {
            let key = IssueKey::new("LPS-42").unwrap();
            assert_eq!(key.project(), "LPS");
            assert_eq!(key.number(), 42);
        }

        #[test]
        fn natural_ordering() {
            let mut keys: Vec<IssueKey> = ["PROJ-10", "PROJ-2", "ABC-1", "PROJ-1"]
                .iter()
                .map(|k| IssueKey::new(*k).unwrap())
                .collect();
            keys.sort();
            let sorted: Vec<&str> = keys.iter().map(|k| k.as_str()).collect();
            assert_eq!(sorted, vec!["ABC-1", "PROJ-1", "PROJ-2", "PROJ-10"]);
        }

        #[test]
        fn serde_rejects_invalid() {
            let result: Result<IssueKey, _> = serde_json::from_str("\"nope\"");
            assert!(result.is_err());
        }

        #[test]
        fn display() {
            let key = IssueKey::new("LPS-7").unwrap();
            assert_eq!(format!("{}", key), "LPS-7");
        }
    }

    mod issue_type {
        use super::*;

        #[test]
        fn from_name_roundtrips_known_types() {
            for t in [
                IssueType::Epic,
                IssueType::Story,
                IssueType::Task,
                IssueType::TechnicalTask,
            ] {
                assert_eq!(IssueType::from_name(t.name()), t);
            }
        }

        #[test]
        fn unknown_type_kept_verbatim() {
            let t = IssueType::from_name("Bug");
            assert_eq!(t, IssueType::Other("Bug".into()));
            assert_eq!(t.name(), "Bug");
        }

        #[test]
        fn task_family() {
            assert!(IssueType::Task.is_task_family());
            assert!(IssueType::TechnicalTask.is_task_family());
            assert!(!IssueType::Story.is_task_family());
            assert!(!IssueType::Epic.is_task_family());
            assert!(!IssueType::Other("Sub-task".into()).is_task_family());
        }
    }

    #[test]
    fn projection_copies_display_fields() {
        let issue = RawIssue::new(
            IssueKey::new("LPS-1").unwrap(),
            IssueType::Story,
            "Closed",
            "Add login",
        )
        .with_epic_link(IssueKey::new("LPS-100").unwrap());

        let p = issue.projection();
        assert_eq!(p.summary, "Add login");
        assert_eq!(p.status, "Closed");
        assert_eq!(p.issue_type, IssueType::Story);
    }

    #[test]
    fn projection_serializes_type_field() {
        let p = Projection {
            summary: "s".into(),
            status: "Open".into(),
            issue_type: IssueType::TechnicalTask,
        };
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["type"], "Technical Task");
    }
}
