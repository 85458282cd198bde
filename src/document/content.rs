//! Loader for nested JSON content trees.
//!
//! The input shape is the one mind-map style editors export:
//!
//! ```json
//! {"id": 1, "title": "root", "attr": {...},
//!  "ideas": {"1": {"id": 11, "title": "child"}, "-2": {...}}}
//! ```
//!
//! Keys of `ideas` are ranks; children are ordered by numeric rank.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::accessor::NodeId;
use super::manager::TreeDocument;
use super::model::{TreeNode, TreeRoot};
use crate::error::{BoardError, BoardResult};

/// One idea of a content tree, with its sub-ideas keyed by rank.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContentIdea {
    pub id: NodeId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub attr: Map<String, Value>,
    #[serde(default)]
    pub ideas: BTreeMap<String, ContentIdea>,
}

impl ContentIdea {
    pub fn new(id: NodeId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            ..Default::default()
        }
    }

    /// Builder: Set an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attr.insert(name.into(), value);
        self
    }

    /// Builder: Add a sub-idea under `rank`.
    pub fn with_idea(mut self, rank: impl Into<String>, idea: ContentIdea) -> Self {
        self.ideas.insert(rank.into(), idea);
        self
    }

    /// Sub-ideas in rank order. Non-numeric ranks sort after numeric ones.
    pub fn ranked_ideas(&self) -> Vec<&ContentIdea> {
        let mut ranked: Vec<(Option<f64>, &String, &ContentIdea)> = self
            .ideas
            .iter()
            .map(|(rank, idea)| (rank.parse::<f64>().ok(), rank, idea))
            .collect();
        ranked.sort_by(|a, b| match (a.0, b.0) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.1.cmp(b.1),
        });
        ranked.into_iter().map(|(_, _, idea)| idea).collect()
    }

    /// Flattens the content tree into a `TreeRoot`.
    pub fn to_tree(&self) -> BoardResult<TreeRoot> {
        let mut tree = TreeRoot {
            root_id: self.id,
            ..Default::default()
        };
        self.flatten_into(None, &mut tree)?;
        Ok(tree)
    }

    fn flatten_into(&self, parent_id: Option<NodeId>, tree: &mut TreeRoot) -> BoardResult<()> {
        let key = self.id.to_string();
        if tree.nodes.contains_key(&key) {
            return Err(BoardError::schema_violation(format!("duplicate node id {}", self.id)));
        }

        let mut node = TreeNode::new(self.id, self.title.clone());
        node.parent_id = parent_id;
        for (name, value) in &self.attr {
            // null is how exporters spell "no attribute"
            if !value.is_null() {
                node = node.with_attr(name.clone(), value);
            }
        }
        let children = self.ranked_ideas();
        node.children = children.iter().map(|child| child.id).collect();
        tree.nodes.insert(key, node);

        for child in children {
            child.flatten_into(Some(self.id), tree)?;
        }
        Ok(())
    }
}

impl TreeDocument {
    /// Builds a document from a content tree.
    pub fn from_content(content: &ContentIdea) -> BoardResult<Self> {
        Self::from_state(content.to_tree()?)
    }

    /// Builds a document from content-tree JSON.
    pub fn from_content_json(json: &str) -> BoardResult<Self> {
        let content: ContentIdea = serde_json::from_str(json)?;
        Self::from_content(&content)
    }
}
