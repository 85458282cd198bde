//! Storyboard index module.
//!
//! This module provides:
//! - `model`: Scene and descriptor types plus the pure naming and ordering rules
//! - `manager`: StoryboardManager with active-storyboard tracking and insertion keys
//! - `projector`: scene projection across every node of the active document
//! - `wasm`: WASM bindings for browser usage (JsStoryboardManager)

pub mod manager;
pub mod model;
pub mod projector;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use manager::StoryboardManager;
pub use model::{Scene, SceneDescriptor};
pub use projector::project_scenes;

#[cfg(feature = "wasm")]
pub use wasm::JsStoryboardManager;
