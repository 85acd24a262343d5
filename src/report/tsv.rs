//! report::tsv
//!
//! Tab-separated rendering of a forest, one row per feature.
//!
//! Rows come in three groups: the direct children of every epic, then
//! stories without epic, then tasks without story. The `Epic` column
//! names the epic on its first row only; rows outside an epic say
//! `none`. The `Subtasks` column lists the row's direct children as
//! `KEY(status)` joined by `:`.

use std::collections::HashMap;

use crate::core::order::ordered_keys;
use crate::core::tree::{FeatureForest, FeatureNode};
use crate::core::types::IssueKey;

pub const HEADER: &str = "Epic\tFeature\tKey\tStatus\tSubtasks";

const NO_EPIC: &str = "none";

/// Render the forest with a header row; every row ends in a newline.
pub fn render(forest: &FeatureForest) -> String {
    let mut out = String::new();
    push_row(&mut out, [HEADER]);

    for (epic_key, epic) in ordered(forest.epics()) {
        let mut label = Some(epic_label(epic_key, epic));
        for (key, node) in epic.ordered_children() {
            let epic_cell = label.take().unwrap_or_default();
            push_feature(&mut out, &epic_cell, key, node);
        }
    }

    for (key, node) in ordered(forest.stories()) {
        push_feature(&mut out, NO_EPIC, key, node);
    }
    for (key, node) in ordered(forest.tasks()) {
        push_feature(&mut out, NO_EPIC, key, node);
    }
    out
}

fn ordered(bucket: &HashMap<IssueKey, FeatureNode>) -> Vec<(&IssueKey, &FeatureNode)> {
    ordered_keys(bucket)
        .into_iter()
        .map(|k| (k, &bucket[k]))
        .collect()
}

fn epic_label(key: &IssueKey, epic: &FeatureNode) -> String {
    match epic.fields() {
        Some(fields) => format!("{}: {}", key, sanitize(&fields.summary)),
        None => key.to_string(),
    }
}

fn push_feature(out: &mut String, epic_cell: &str, key: &IssueKey, node: &FeatureNode) {
    let (feature, status) = match node.fields() {
        Some(f) => (
            format!("[{}] → {}", f.issue_type, sanitize(&f.summary)),
            sanitize(&f.status),
        ),
        None => (String::new(), String::new()),
    };

    let subtasks = node
        .ordered_children()
        .into_iter()
        .map(|(k, child)| {
            let status = child.fields().map(|f| f.status.as_str()).unwrap_or_default();
            format!("{}({})", k, sanitize(status))
        })
        .collect::<Vec<_>>()
        .join(":");

    push_row(
        out,
        [epic_cell, feature.as_str(), key.as_str(), status.as_str(), subtasks.as_str()],
    );
}

fn push_row<'a>(out: &mut String, cells: impl IntoIterator<Item = &'a str>) {
    let row: Vec<&str> = cells.into_iter().collect();
    out.push_str(&row.join("\t"));
    out.push('\n');
}

fn sanitize(text: &str) -> String {
    text.replace('\t', " ")
}
