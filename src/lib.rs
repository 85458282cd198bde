//! Sceneboard - storyboard and scene index manager for tree documents.
//!
//! A document is a tree of nodes, each with an id, a title and keyed
//! attributes. Storyboards live on top of it:
//!
//! - **Storyboard names**: one ordered list on the root node; the first name is active
//! - **Scenes**: per-node descriptors mapping storyboard name -> fractional index
//! - **Projection**: every scene of the active storyboard, gathered and sorted
//!
//! New scenes get an index strictly between their neighbours, so inserting
//! never rewrites another scene.
//!
//! # Example
//!
//! ```rust
//! use sceneboard::{share, ActiveDocumentTracker, StoryboardConfig, StoryboardManager, TreeDocument};
//!
//! let mut tracker = ActiveDocumentTracker::new();
//! let mut manager = StoryboardManager::attach(&mut tracker, StoryboardConfig::default());
//!
//! let mut doc = TreeDocument::new(1, "root");
//! doc.add_node(1, 2, "Opening").unwrap();
//! tracker.load("map-1", share(doc));
//!
//! let name = manager.create_storyboard().unwrap();
//! assert_eq!(name, "Storyboard 1");
//!
//! manager.add_scene(2, manager.next_scene_index()).unwrap();
//! assert_eq!(manager.scenes()[0].title, "Opening");
//! assert_eq!(manager.insertion_index_after(Some(2)), Some(2.0));
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod events;
pub mod storyboard;

// Re-exports for convenience
pub use config::StoryboardConfig;
pub use document::{
    share, ActiveDocumentTracker, ContentIdea, DocumentAccessor, DocumentLoaded, NodeId, NodeSummary,
    SharedDocument, TreeDocument,
};
pub use error::{BoardError, BoardResult};
pub use events::{ListenerId, Listeners};
pub use storyboard::{Scene, SceneDescriptor, StoryboardManager};

#[cfg(feature = "wasm")]
pub use storyboard::wasm::JsStoryboardManager;
