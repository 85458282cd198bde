//! Tree document collaborators.
//!
//! This module provides:
//! - `accessor`: the `DocumentAccessor` contract the storyboard index reads through
//! - `model` / `manager`: an Automerge-backed `TreeDocument` implementing it
//! - `content`: loading nested JSON content trees
//! - `tracker`: the active-document "loaded" event source

pub mod accessor;
pub mod content;
pub mod manager;
pub mod model;
pub mod tracker;

pub use accessor::{share, AttrValue, DocumentAccessor, NodeId, NodeSummary, SharedDocument};
pub use content::ContentIdea;
pub use manager::TreeDocument;
pub use model::{TreeNode, TreeRoot};
pub use tracker::{ActiveDocumentTracker, DocumentLoaded};
