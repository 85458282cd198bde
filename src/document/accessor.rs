//! The narrow read/write contract the storyboard index needs from a tree
//! document.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::error::BoardResult;

/// Integer id of a node in the tree.
pub type NodeId = i64;

/// Arbitrary attribute value stored on a node.
pub type AttrValue = Value;

/// A document shared between the tracker that loaded it and its readers.
pub type SharedDocument<D> = Rc<RefCell<D>>;

/// Id and current title of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSummary {
    pub id: NodeId,
    pub title: String,
}

impl NodeSummary {
    pub fn new(id: NodeId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

/// Attribute access by node id.
///
/// Reads are infallible: a missing node or attribute reads as `None`.
pub trait DocumentAccessor {
    /// Id of the root node, where the storyboard name list lives.
    fn root_id(&self) -> NodeId;

    /// Returns the attribute value, or `None` if absent.
    fn attr(&self, node_id: NodeId, name: &str) -> Option<AttrValue>;

    /// Replaces the attribute value. `None` removes the attribute.
    fn update_attr(&mut self, node_id: NodeId, name: &str, value: Option<AttrValue>) -> BoardResult<()>;

    /// Every node in the document, in no particular order.
    fn nodes(&self) -> Vec<NodeSummary>;
}

/// Wraps a document for sharing with a tracker and storyboard managers.
pub fn share<D: DocumentAccessor>(document: D) -> SharedDocument<D> {
    Rc::new(RefCell::new(document))
}
