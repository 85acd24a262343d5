//! report::json
//!
//! Pretty-printed JSON rendering of a forest.
//!
//! ```text
//! {
//!   "epics": { "LPS-1": { "fields": {...}, "LPS-2": { "fields": {...} } } },
//!   "stories_without_epic": { ... },
//!   "tasks_without_story": { ... }
//! }
//! ```

use crate::core::tree::FeatureForest;

/// Render the forest, terminated by a newline.
pub fn render(forest: &FeatureForest) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string_pretty(forest)?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_forest_has_all_buckets() {
        let out = render(&FeatureForest::new()).unwrap();
        insta::assert_snapshot!(out, @r###"
        {
          "epics": {},
          "stories_without_epic": {},
          "tasks_without_story": {}
        }
        "###);
    }
}
