//! TreeDocument implementation with hybrid operations pattern.
//!
//! `TreeDocument` wraps an Automerge document holding a `TreeRoot` and
//! provides:
//! - Structural edits (adding nodes) via autosurgeon hydrate/reconcile
//! - Targeted O(1) puts for titles and attributes, the high-frequency writes
//! - The `DocumentAccessor` contract consumed by the storyboard index

use automerge::{transaction::Transactable, AutoCommit, ObjId, ReadDoc, ScalarValue, Value, ROOT};
use autosurgeon::{hydrate, reconcile};

use super::accessor::{AttrValue, DocumentAccessor, NodeId, NodeSummary};
use super::model::{TreeNode, TreeRoot};
use crate::error::{BoardError, BoardResult};

/// An Automerge-backed tree of nodes with keyed JSON attributes.
///
/// # Caching Strategy
///
/// `cached_state` holds the full hydrated `TreeRoot` and is invalidated by
/// every targeted put, load and merge.
pub struct TreeDocument {
    doc: AutoCommit,
    /// Cached hydrated state - invalidated after direct document mutations.
    cached_state: Option<TreeRoot>,
}

impl TreeDocument {
    // =========================================================================
    // INITIALIZATION
    // =========================================================================

    /// Creates a document holding a single root node.
    pub fn new(root_id: NodeId, title: &str) -> Self {
        let mut doc = AutoCommit::new();
        let root = TreeRoot::new(root_id, title);
        reconcile(&mut doc, &root).expect("Failed to initialize document");
        Self {
            doc,
            cached_state: Some(root),
        }
    }

    /// Creates a document from a fully built tree.
    pub fn from_state(root: TreeRoot) -> BoardResult<Self> {
        if root.node(root.root_id).is_none() {
            return Err(BoardError::schema_violation(format!(
                "root node {} missing from node map",
                root.root_id
            )));
        }
        let mut doc = AutoCommit::new();
        reconcile(&mut doc, &root)?;
        Ok(Self {
            doc,
            cached_state: Some(root),
        })
    }

    /// Creates a TreeDocument from saved binary data.
    pub fn from_bytes(bytes: &[u8]) -> BoardResult<Self> {
        let doc = AutoCommit::load(bytes)?;
        Ok(Self {
            doc,
            cached_state: None,
        })
    }

    /// Saves the document to binary format.
    pub fn save(&mut self) -> Vec<u8> {
        self.doc.save()
    }

    /// Gets the actor ID for this document instance.
    pub fn actor_id(&self) -> String {
        self.doc.get_actor().to_hex_string()
    }

    // =========================================================================
    // HIGH-LEVEL OPERATIONS (via Hydrate/Reconcile)
    // =========================================================================

    /// Hydrates the entire document state to Rust structs.
    pub fn get_state(&mut self) -> BoardResult<TreeRoot> {
        if let Some(ref cached) = self.cached_state {
            return Ok(cached.clone());
        }
        let state: TreeRoot = hydrate(&self.doc)?;
        self.cached_state = Some(state.clone());
        Ok(state)
    }

    /// Applies a function to mutate the state, then reconciles back to the document.
    pub fn update_state<F>(&mut self, f: F) -> BoardResult<()>
    where
        F: FnOnce(&mut TreeRoot),
    {
        let mut state = self.get_state()?;
        f(&mut state);
        reconcile(&mut self.doc, &state)?;
        self.cached_state = Some(state);
        Ok(())
    }

    /// Adds a child node under `parent_id`, appended after existing children.
    pub fn add_node(&mut self, parent_id: NodeId, id: NodeId, title: &str) -> BoardResult<()> {
        let state = self.get_state()?;
        if state.node(parent_id).is_none() {
            return Err(BoardError::node_not_found(parent_id));
        }
        if state.node(id).is_some() {
            return Err(BoardError::schema_violation(format!("duplicate node id {}", id)));
        }
        self.update_state(|state| {
            state
                .nodes
                .insert(id.to_string(), TreeNode::new(id, title).with_parent(parent_id));
            if let Some(parent) = state.node_mut(parent_id) {
                parent.children.push(id);
            }
        })
    }

    /// Returns the number of nodes, root included.
    pub fn len(&self) -> usize {
        match self.cached_state {
            Some(ref state) => state.len(),
            None => self
                .get_obj_at_key(&ROOT, "nodes")
                .map(|nodes| self.doc.length(&nodes))
                .unwrap_or(0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // =========================================================================
    // NODE FIELD OPERATIONS (targeted, O(1))
    // =========================================================================

    /// Sets the node title (O(1)).
    pub fn set_title(&mut self, node_id: NodeId, title: &str) -> BoardResult<()> {
        self.cached_state = None;
        let node_obj = self.get_node_obj(node_id)?;
        self.doc.put(&node_obj, "title", ScalarValue::Str(title.into()))?;
        Ok(())
    }

    /// Reads the node title, or `None` if the node does not exist.
    pub fn node_title(&self, node_id: NodeId) -> Option<String> {
        if let Some(ref state) = self.cached_state {
            return state.node(node_id).map(|node| node.title.clone());
        }
        let node_obj = self.get_node_obj(node_id).ok()?;
        self.read_str(&node_obj, "title").ok().flatten()
    }

    // =========================================================================
    // SYNC OPERATIONS
    // =========================================================================

    /// Merges another document into this one.
    pub fn merge(&mut self, other: &mut Self) -> BoardResult<()> {
        self.cached_state = None;
        self.doc.merge(&mut other.doc)?;
        Ok(())
    }

    // =========================================================================
    // INTERNAL HELPERS
    // =========================================================================

    fn read_attr_raw(&self, node_id: NodeId, name: &str) -> BoardResult<Option<String>> {
        let node_obj = self.get_node_obj(node_id)?;
        let attrs_obj = self.get_obj_at_key(&node_obj, "attrs")?;
        self.read_str(&attrs_obj, name)
    }

    fn write_attr_raw(&mut self, node_id: NodeId, name: &str, raw: Option<String>) -> BoardResult<()> {
        self.cached_state = None;
        let node_obj = self.get_node_obj(node_id)?;
        let attrs_obj = self.get_obj_at_key(&node_obj, "attrs")?;
        match raw {
            Some(v) => self.doc.put(&attrs_obj, name, ScalarValue::Str(v.into()))?,
            // Delete instead of storing null, and only when present.
            None => {
                if self.doc.get(&attrs_obj, name)?.is_some() {
                    self.doc.delete(&attrs_obj, name)?;
                }
            }
        }
        Ok(())
    }

    /// Reads a string scalar at a map key.
    fn read_str(&self, parent: &ObjId, key: &str) -> BoardResult<Option<String>> {
        match self.doc.get(parent, key)? {
            Some((Value::Scalar(scalar), _)) => match scalar.as_ref() {
                ScalarValue::Str(text) => Ok(Some(text.to_string())),
                _ => Err(BoardError::schema_violation(format!("'{}' is not a string", key))),
            },
            Some((Value::Object(_), _)) => Err(BoardError::schema_violation(format!(
                "'{}' is an object, expected a string",
                key
            ))),
            None => Ok(None),
        }
    }

    /// Gets a node's ObjId.
    fn get_node_obj(&self, node_id: NodeId) -> BoardResult<ObjId> {
        let nodes_obj = self.get_obj_at_key(&ROOT, "nodes")?;
        match self.get_obj_at_key(&nodes_obj, &node_id.to_string()) {
            Err(BoardError::FieldNotFound(_)) => Err(BoardError::node_not_found(node_id)),
            other => other,
        }
    }

    /// Gets an object ID at a map key.
    fn get_obj_at_key(&self, parent: &ObjId, key: &str) -> BoardResult<ObjId> {
        match self.doc.get(parent, key) {
            Ok(Some((Value::Object(_), obj_id))) => Ok(obj_id),
            Ok(Some(_)) => Err(BoardError::schema_violation(format!(
                "'{}' is not an object",
                key
            ))),
            Ok(None) => Err(BoardError::field_not_found(key)),
            Err(e) => Err(BoardError::Automerge(e)),
        }
    }
}

impl DocumentAccessor for TreeDocument {
    fn root_id(&self) -> NodeId {
        if let Some(ref state) = self.cached_state {
            return state.root_id;
        }
        match self.doc.get(&ROOT, "root_id") {
            Ok(Some((Value::Scalar(scalar), _))) => match scalar.as_ref() {
                ScalarValue::Int(id) => *id,
                ScalarValue::Uint(id) => *id as i64,
                other => {
                    tracing::warn!(value = ?other, "root_id is not an integer, using 0");
                    0
                }
            },
            Ok(_) => {
                tracing::warn!("document has no root_id, using 0");
                0
            }
            Err(e) => {
                tracing::warn!(error = %e, "root_id read failed, using 0");
                0
            }
        }
    }

    fn attr(&self, node_id: NodeId, name: &str) -> Option<AttrValue> {
        if let Some(ref state) = self.cached_state {
            return state.node(node_id)?.attr(name);
        }
        let raw = match self.read_attr_raw(node_id, name) {
            Ok(raw) => raw?,
            Err(BoardError::NodeNotFound(_)) => return None,
            Err(e) => {
                tracing::warn!(node = node_id, attr = name, error = %e, "attribute read failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(node = node_id, attr = name, error = %e, "malformed attribute JSON");
                None
            }
        }
    }

    fn update_attr(&mut self, node_id: NodeId, name: &str, value: Option<AttrValue>) -> BoardResult<()> {
        let raw = match value {
            Some(ref v) => Some(serde_json::to_string(v)?),
            None => None,
        };
        tracing::debug!(node = node_id, attr = name, clear = raw.is_none(), "updating attribute");
        self.write_attr_raw(node_id, name, raw)
    }

    fn nodes(&self) -> Vec<NodeSummary> {
        if let Some(ref state) = self.cached_state {
            return state.summaries();
        }
        let hydrated: Result<TreeRoot, _> = hydrate(&self.doc);
        match hydrated {
            Ok(state) => state.summaries(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to hydrate tree for node enumeration");
                Vec::new()
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
