//! core::tree
//!
//! Feature tree representation.
//!
//! # Architecture
//!
//! A [`FeatureForest`] has exactly three top-level buckets:
//! - `epics`: epic key → [`FeatureNode`] grouping that epic's stories and tasks
//! - `stories`: stories that have no epic
//! - `tasks`: tasks that have neither story nor epic
//!
//! Every placed ticket is a [`FeatureNode`] carrying its own projection
//! under `fields`, so deeper descendants (tasks under a story, sub-tasks
//! under a task) attach to it directly. Epic nodes may be placeholders
//! without `fields` when the epic itself could not be resolved.
//!
//! # Invariants
//!
//! - Insertion is idempotent: inserting a key that is already present at
//!   the destination never overwrites it
//! - A node never contains itself as a descendant
//!
//! # Serialization
//!
//! Nodes serialize as a map with `fields` first, followed by children in
//! natural key order, so rendered output is deterministic.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::order::ordered_keys;
use super::types::{IssueKey, Projection};

/// Reserved map key under which a node's own projection is rendered.
pub const FIELDS_KEY: &str = "fields";

/// A node of the feature tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureNode {
    fields: Option<Projection>,
    children: HashMap<IssueKey, FeatureNode>,
}

impl FeatureNode {
    /// Create a node for a resolved ticket.
    pub fn new(projection: Projection) -> Self {
        Self {
            fields: Some(projection),
            children: HashMap::new(),
        }
    }

    /// Create a node without its own projection.
    pub fn placeholder() -> Self {
        Self::default()
    }

    /// The node's own projection, if resolved.
    pub fn fields(&self) -> Option<&Projection> {
        self.fields.as_ref()
    }

    pub fn is_placeholder(&self) -> bool {
        self.fields.is_none()
    }

    /// Fill in the projection of a placeholder, keeping its children.
    pub(crate) fn set_fields(&mut self, projection: Projection) {
        self.fields = Some(projection);
    }

    pub fn child(&self, key: &IssueKey) -> Option<&FeatureNode> {
        self.children.get(key)
    }

    pub fn children(&self) -> &HashMap<IssueKey, FeatureNode> {
        &self.children
    }

    /// Children in natural key order.
    pub fn ordered_children(&self) -> Vec<(&IssueKey, &FeatureNode)> {
        ordered_keys(&self.children)
            .into_iter()
            .map(|k| (k, &self.children[k]))
            .collect()
    }

    /// Insert a child unless one with the same key already exists.
    ///
    /// Returns the stored child either way, so callers can keep
    /// attaching descendants to it.
    pub fn insert_child(&mut self, key: IssueKey, projection: Projection) -> &mut FeatureNode {
        self.children
            .entry(key)
            .or_insert_with(|| FeatureNode::new(projection))
    }

    /// Number of nodes in this subtree, excluding the node itself.
    pub fn descendant_count(&self) -> usize {
        self.children
            .values()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }

    fn collect_paths(&self, key: &IssueKey, prefix: &mut Vec<IssueKey>, out: &mut Vec<Vec<IssueKey>>) {
        for (child_key, child) in &self.children {
            prefix.push(child_key.clone());
            if child_key == key {
                out.push(prefix.clone());
            }
            child.collect_paths(key, prefix, out);
            prefix.pop();
        }
    }
}

impl Serialize for FeatureNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.children.len() + usize::from(self.fields.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        if let Some(fields) = &self.fields {
            map.serialize_entry(FIELDS_KEY, fields)?;
        }
        for (key, child) in self.ordered_children() {
            map.serialize_entry(key.as_str(), child)?;
        }
        map.end()
    }
}

/// Top-level bucket of a forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Epics,
    Stories,
    Tasks,
}

impl Bucket {
    /// Name used in rendered output.
    pub fn label(&self) -> &'static str {
        match self {
            Bucket::Epics => "epics",
            Bucket::Stories => "stories_without_epic",
            Bucket::Tasks => "tasks_without_story",
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Where a ticket sits in a forest: its bucket and the key path from the
/// bucket root down to (and including) the ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub bucket: Bucket,
    pub path: Vec<IssueKey>,
}

/// The reconstructed feature hierarchy of one profile run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureForest {
    epics: HashMap<IssueKey, FeatureNode>,
    stories: HashMap<IssueKey, FeatureNode>,
    tasks: HashMap<IssueKey, FeatureNode>,
}

impl FeatureForest {
    /// Create an empty forest.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epics(&self) -> &HashMap<IssueKey, FeatureNode> {
        &self.epics
    }

    pub fn stories(&self) -> &HashMap<IssueKey, FeatureNode> {
        &self.stories
    }

    pub fn tasks(&self) -> &HashMap<IssueKey, FeatureNode> {
        &self.tasks
    }

    pub fn bucket(&self, bucket: Bucket) -> &HashMap<IssueKey, FeatureNode> {
        match bucket {
            Bucket::Epics => &self.epics,
            Bucket::Stories => &self.stories,
            Bucket::Tasks => &self.tasks,
        }
    }

    pub(crate) fn bucket_mut(&mut self, bucket: Bucket) -> &mut HashMap<IssueKey, FeatureNode> {
        match bucket {
            Bucket::Epics => &mut self.epics,
            Bucket::Stories => &mut self.stories,
            Bucket::Tasks => &mut self.tasks,
        }
    }

    pub fn epic(&self, key: &IssueKey) -> Option<&FeatureNode> {
        self.epics.get(key)
    }

    /// Reserve an empty placeholder for an epic.
    ///
    /// Returns `true` if the epic was not present before. An existing
    /// epic node is left untouched.
    pub(crate) fn reserve_epic(&mut self, key: &IssueKey) -> bool {
        if self.epics.contains_key(key) {
            return false;
        }
        self.epics.insert(key.clone(), FeatureNode::placeholder());
        true
    }

    /// Fill a reserved epic placeholder with its projection.
    pub(crate) fn fill_epic(&mut self, key: &IssueKey, projection: Projection) {
        if let Some(node) = self.epics.get_mut(key) {
            node.set_fields(projection);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.epics.is_empty() && self.stories.is_empty() && self.tasks.is_empty()
    }

    /// Total number of nodes across all buckets, placeholders included.
    pub fn node_count(&self) -> usize {
        [Bucket::Epics, Bucket::Stories, Bucket::Tasks]
            .into_iter()
            .flat_map(|b| self.bucket(b).values())
            .map(|n| 1 + n.descendant_count())
            .sum()
    }

    /// Every location at which `key` appears.
    ///
    /// A well-formed forest yields at most one location per key.
    pub fn locate(&self, key: &IssueKey) -> Vec<Location> {
        let mut found = Vec::new();
        for bucket in [Bucket::Epics, Bucket::Stories, Bucket::Tasks] {
            let root = self.bucket(bucket);
            let mut paths = Vec::new();
            for (top_key, node) in root {
                let mut prefix = vec![top_key.clone()];
                if top_key == key {
                    paths.push(prefix.clone());
                }
                node.collect_paths(key, &mut prefix, &mut paths);
            }
            found.extend(paths.into_iter().map(|path| Location { bucket, path }));
        }
        found
    }

    /// Whether `key` appears anywhere in the forest.
    pub fn contains(&self, key: &IssueKey) -> bool {
        !self.locate(key).is_empty()
    }
}

impl Serialize for FeatureForest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        for bucket in [Bucket::Epics, Bucket::Stories, Bucket::Tasks] {
            map.serialize_entry(bucket.label(), &OrderedBucket(self.bucket(bucket)))?;
        }
        map.end()
    }
}

struct OrderedBucket<'a>(&'a HashMap<IssueKey, FeatureNode>);

impl Serialize for OrderedBucket<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for key in ordered_keys(self.0) {
            map.serialize_entry(key.as_str(), &self.0[key])?;
        }
        map.end()
    }
}
