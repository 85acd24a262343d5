//! core::order
//!
//! Natural ordering of ticket keys for deterministic, readable export.
//!
//! Keys are grouped by project prefix (ascending, lexicographic) and then
//! ordered by their numeric suffix compared as a number, so `PROJ-9` comes
//! before `PROJ-10`. Ordering never affects tree structure.
//!
//! # Example
//!
//! ```
//! use featuretrail::core::order::sort_keys;
//!
//! let mut keys = vec!["PROJ-10", "PROJ-2", "ABC-1", "PROJ-1"];
//! sort_keys(&mut keys);
//! assert_eq!(keys, vec!["ABC-1", "PROJ-1", "PROJ-2", "PROJ-10"]);
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

/// Split a key into its project prefix and numeric suffix.
///
/// The suffix is `None` when the text after the last `-` is not a number
/// (or there is no `-` at all, in which case the whole key is the prefix).
fn split_key(key: &str) -> (&str, Option<u128>) {
    match key.rsplit_once('-') {
        Some((project, number)) => match number.parse::<u128>() {
            Ok(n) if !number.starts_with('+') => (project, Some(n)),
            _ => (project, None),
        },
        None => (key, None),
    }
}

/// Compare two keys in natural order.
///
/// Keys without a numeric suffix sort after numbered keys of the same
/// project. Ties (`PROJ-01` vs `PROJ-1`) fall back to plain string order
/// so the ordering stays total and consistent with equality.
pub fn compare_keys(a: &str, b: &str) -> Ordering {
    let (project_a, number_a) = split_key(a);
    let (project_b, number_b) = split_key(b);

    project_a
        .cmp(project_b)
        .then_with(|| match (number_a, number_b) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.cmp(b))
}

/// Sort a slice of keys in natural order.
pub fn sort_keys<K: AsRef<str>>(keys: &mut [K]) {
    keys.sort_by(|a, b| compare_keys(a.as_ref(), b.as_ref()));
}

/// Keys of a mapping in natural order.
///
/// Reusable for any of the forest buckets or for a node's children.
pub fn ordered_keys<K, V>(map: &HashMap<K, V>) -> Vec<&K>
where
    K: AsRef<str> + Eq + Hash,
{
    let mut keys: Vec<&K> = map.keys().collect();
    keys.sort_by(|a, b| compare_keys(a.as_ref(), b.as_ref()));
    keys
}
