//! Automerge layout of a tree document.
//!
//! Attribute values are arbitrary JSON, so each one is stored as a JSON
//! string (blob approach) under `nodes/<id>/attrs/<name>`.

use autosurgeon::{Hydrate, Reconcile};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::accessor::{NodeId, NodeSummary};

// =============================================================================
// TREE ROOT
// =============================================================================

/// Root document structure for a tree of nodes.
#[derive(Debug, Clone, Default, Reconcile, Hydrate, Serialize, Deserialize, PartialEq)]
pub struct TreeRoot {
    /// Id of the root node.
    pub root_id: i64,

    /// Map of node id (as string) -> TreeNode.
    pub nodes: HashMap<String, TreeNode>,
}

impl TreeRoot {
    /// Creates a tree holding only its root node.
    pub fn new(root_id: NodeId, title: impl Into<String>) -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(root_id.to_string(), TreeNode::new(root_id, title));
        Self { root_id, nodes }
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(&id.to_string())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.nodes.get_mut(&id.to_string())
    }

    /// Returns the number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn summaries(&self) -> Vec<NodeSummary> {
        self.nodes
            .values()
            .map(|node| NodeSummary::new(node.id, node.title.clone()))
            .collect()
    }
}

// =============================================================================
// TREE NODE
// =============================================================================

/// A single node: id, title, tree links and JSON-encoded attributes.
#[derive(Debug, Clone, Default, Reconcile, Hydrate, Serialize, Deserialize, PartialEq)]
pub struct TreeNode {
    pub id: i64,
    pub title: String,
    pub parent_id: Option<i64>,
    /// Child ids in rank order.
    pub children: Vec<i64>,
    /// Attribute name -> JSON-encoded value.
    pub attrs: HashMap<String, String>,
}

impl TreeNode {
    pub fn new(id: NodeId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            ..Default::default()
        }
    }

    /// Builder: Set parent.
    pub fn with_parent(mut self, parent_id: NodeId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Builder: Set an attribute from a JSON value.
    pub fn with_attr(mut self, name: impl Into<String>, value: &serde_json::Value) -> Self {
        self.attrs.insert(name.into(), value.to_string());
        self
    }

    /// Decodes an attribute. Malformed JSON reads as absent.
    pub fn attr(&self, name: &str) -> Option<serde_json::Value> {
        let raw = self.attrs.get(name)?;
        match serde_json::from_str(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(node = self.id, attr = name, error = %e, "malformed attribute JSON");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tree_root_new() {
        let root = TreeRoot::new(1, "root");
        assert_eq!(root.root_id, 1);
        assert_eq!(root.len(), 1);
        assert_eq!(root.node(1).unwrap().title, "root");
        assert!(root.node(2).is_none());
    }

    #[test]
    fn test_node_attr_roundtrip() {
        let node = TreeNode::new(5, "idea").with_attr("tags", &json!(["a", "b"]));
        assert_eq!(node.attr("tags"), Some(json!(["a", "b"])));
        assert_eq!(node.attr("missing"), None);
    }

    #[test]
    fn test_malformed_attr_reads_as_none() {
        let mut node = TreeNode::new(5, "idea");
        node.attrs.insert("broken".to_string(), "{not json".to_string());
        assert_eq!(node.attr("broken"), None);
    }
}
