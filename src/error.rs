//! Error types for the storyboard index manager.

use thiserror::Error;

use crate::document::NodeId;

/// Result type alias for storyboard operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Errors that can occur while writing to the active document.
///
/// Read operations never surface these: an absent document, attribute or
/// node reads as "nothing".
#[derive(Error, Debug)]
pub enum BoardError {
    /// Automerge error during document operations.
    #[error("Automerge error: {0}")]
    Automerge(#[from] automerge::AutomergeError),

    /// Autosurgeon hydration error.
    #[error("Hydration error: {0}")]
    Hydrate(#[from] autosurgeon::HydrateError),

    /// Autosurgeon reconcile error.
    #[error("Reconcile error: {0}")]
    Reconcile(#[from] autosurgeon::ReconcileError),

    /// Attribute value could not be encoded or decoded as JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Node not found in the document.
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Field not found in the document structure.
    #[error("Field not found: {0}")]
    FieldNotFound(String),

    /// Schema violation - document structure is invalid.
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    /// A write was requested before any document was loaded.
    #[error("No active document")]
    NoActiveDocument,

    /// A scene edit was requested while no storyboard exists.
    #[error("No active storyboard")]
    NoActiveStoryboard,
}

impl BoardError {
    /// Creates a NodeNotFound error.
    pub fn node_not_found(id: NodeId) -> Self {
        Self::NodeNotFound(id)
    }

    /// Creates a FieldNotFound error.
    pub fn field_not_found(field: impl Into<String>) -> Self {
        Self::FieldNotFound(field.into())
    }

    /// Creates a SchemaViolation error.
    pub fn schema_violation(msg: impl Into<String>) -> Self {
        Self::SchemaViolation(msg.into())
    }
}
