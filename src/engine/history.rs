//! engine::history
//!
//! Git history index and ticket membership test.
//!
//! # Index
//!
//! Commit subjects are normalized (trimmed, uppercased, boilerplate lines
//! dropped, sorted, deduplicated) and indexed by their first
//! space-delimited token. Each entry holds every subject starting with
//! that token, joined by a single space. Indexing a second branch merges
//! into the same index, so an entry may accumulate subjects from several
//! branches.
//!
//! # Membership
//!
//! A ticket is "in history" if its key is an index token (exact tier) or
//! appears as a plain substring of any entry (substring tier). The
//! substring tier catches subjects that reference several tickets
//! (`PROJ-1 PROJ-2 FIX`). It also matches keys embedded without
//! whitespace boundaries, so `PROJ-1` matches a subject mentioning
//! `PROJ-12`.
//!
//! # Example
//!
//! ```
//! use featuretrail::engine::history::{GitHistoryIndex, Membership};
//!
//! let index = GitHistoryIndex::from_subjects(["PROJ-1 FIX BUG", "PROJ-2 PROJ-3 CLEANUP"]);
//! assert_eq!(index.membership("PROJ-1"), Membership::Exact);
//! assert_eq!(index.membership("PROJ-3"), Membership::Substring);
//! assert_eq!(index.membership("PROJ-9"), Membership::Absent);
//! ```

use std::collections::HashMap;

/// Normalize raw commit subjects for indexing.
///
/// Lines are trimmed and uppercased; empty lines and lines containing any
/// `ignore` pattern (compared uppercased) are dropped; the result is
/// sorted and deduplicated.
pub fn normalize_subjects<I, S>(lines: I, ignore: &[String]) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let ignore: Vec<String> = ignore
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| p.to_uppercase())
        .collect();

    let mut subjects: Vec<String> = lines
        .into_iter()
        .map(|line| line.as_ref().trim().to_uppercase())
        .filter(|line| !line.is_empty())
        .filter(|line| !ignore.iter().any(|p| line.contains(p.as_str())))
        .collect();

    subjects.sort();
    subjects.dedup();
    subjects
}

/// Which tier of the membership test matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// The key is an index token.
    Exact,
    /// The key occurs inside some entry's text.
    Substring,
    /// Not referenced by the history.
    Absent,
}

impl Membership {
    pub fn is_member(&self) -> bool {
        !matches!(self, Membership::Absent)
    }
}

impl std::fmt::Display for Membership {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Membership::Exact => write!(f, "exact"),
            Membership::Substring => write!(f, "substring"),
            Membership::Absent => write!(f, "absent"),
        }
    }
}

/// Token → concatenated subjects starting with that token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitHistoryIndex {
    entries: HashMap<String, String>,
    lines: usize,
}

impl GitHistoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from already-normalized subjects.
    pub fn from_subjects<I, S>(subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::new();
        index.absorb(subjects);
        index
    }

    /// Merge already-normalized subjects into the index.
    ///
    /// Returns the number of lines absorbed.
    pub fn absorb<I, S>(&mut self, subjects: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut absorbed = 0;
        for subject in subjects {
            let line = subject.as_ref().trim();
            if line.is_empty() {
                continue;
            }

            let token = line.split_once(' ').map(|(t, _)| t).unwrap_or(line);
            match self.entries.get_mut(token) {
                Some(entry) => {
                    entry.push(' ');
                    entry.push_str(line);
                }
                None => {
                    self.entries.insert(token.to_string(), line.to_string());
                }
            }
            absorbed += 1;
        }
        self.lines += absorbed;
        absorbed
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total subject lines absorbed so far.
    pub fn line_count(&self) -> usize {
        self.lines
    }

    /// The concatenated subjects for a token.
    pub fn entry(&self, token: &str) -> Option<&str> {
        self.entries.get(token).map(String::as_str)
    }

    /// Decide whether and how `key` is referenced by the history.
    pub fn membership(&self, key: &str) -> Membership {
        if key.is_empty() {
            return Membership::Absent;
        }
        if self.entries.contains_key(key) {
            return Membership::Exact;
        }
        if self.entries.values().any(|text| text.contains(key)) {
            return Membership::Substring;
        }
        Membership::Absent
    }

    /// Whether `key` is referenced by the history.
    pub fn contains_ticket(&self, key: &str) -> bool {
        self.membership(key).is_member()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> GitHistoryIndex {
        GitHistoryIndex::from_subjects(["PROJ-1 FIX BUG", "PROJ-2 PROJ-3 CLEANUP"])
    }

    #[test]
    fn exact_token_match() {
        assert_eq!(index().membership("PROJ-1"), Membership::Exact);
        assert!(index().contains_ticket("PROJ-2"));
    }

    #[test]
    fn substring_fallback() {
        assert_eq!(index().membership("PROJ-3"), Membership::Substring);
    }

    #[test]
    fn absent_key() {
        assert_eq!(index().membership("PROJ-9"), Membership::Absent);
        assert!(!index().contains_ticket("PROJ-9"));
    }

    #[test]
    fn substring_tier_has_no_word_boundaries() {
        let index = GitHistoryIndex::from_subjects(["LPS-123 ADD THING"]);
        assert_eq!(index.membership("LPS-12"), Membership::Substring);
        assert_eq!(index.membership("PS-123"), Membership::Substring);
    }

    #[test]
    fn empty_key_is_never_a_member() {
        assert_eq!(index().membership(""), Membership::Absent);
    }

    #[test]
    fn same_token_concatenates() {
        let index = GitHistoryIndex::from_subjects(["LPS-1 FIRST", "LPS-1 SECOND"]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.entry("LPS-1"), Some("LPS-1 FIRST LPS-1 SECOND"));
        assert_eq!(index.line_count(), 2);
    }

    #[test]
    fn second_branch_merges_additively() {
        let mut index = GitHistoryIndex::from_subjects(["LPS-1 PUBLIC FIX"]);
        index.absorb(["LPS-1 PRIVATE FIX", "LPS-2 OTHER"]);

        assert_eq!(index.len(), 2);
        assert_eq!(index.entry("LPS-1"), Some("LPS-1 PUBLIC FIX LPS-1 PRIVATE FIX"));
        assert_eq!(index.line_count(), 3);
    }

    #[test]
    fn line_without_space_is_its_own_token() {
        let index = GitHistoryIndex::from_subjects(["LPS-5", "", "   "]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.membership("LPS-5"), Membership::Exact);
    }

    #[test]
    fn normalize_uppercases_sorts_and_dedupes() {
        let raw = ["lps-2 second", "LPS-1 first", "lps-1 FIRST", "  ", "LPS-2 SECOND"];
        let normalized = normalize_subjects(raw, &[]);
        assert_eq!(normalized, vec!["LPS-1 FIRST", "LPS-2 SECOND"]);
    }

    #[test]
    fn normalize_drops_ignored_lines() {
        let raw = [
            "LPS-1 real change",
            "SUBREPO:IGNORE bump modules",
            "artifact:ignore publish",
        ];
        let ignore = vec!["SUBREPO:IGNORE".to_string(), "ARTIFACT:IGNORE".to_string()];
        assert_eq!(normalize_subjects(raw, &ignore), vec!["LPS-1 REAL CHANGE"]);
    }

    #[test]
    fn membership_display() {
        assert_eq!(Membership::Exact.to_string(), "exact");
        assert_eq!(Membership::Substring.to_string(), "substring");
        assert_eq!(Membership::Absent.to_string(), "absent");
    }
}
