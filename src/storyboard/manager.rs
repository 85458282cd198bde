//! StoryboardManager: the storyboard index over the active document.
//!
//! The manager holds one document reference at a time, swapped wholesale
//! whenever the tracker reports a load. Every query reads the document as it
//! is now; nothing is cached between calls.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;

use crate::config::StoryboardConfig;
use crate::document::{ActiveDocumentTracker, DocumentAccessor, NodeId, SharedDocument};
use crate::error::{BoardError, BoardResult};
use crate::events::{ListenerId, Listeners};
use crate::storyboard::model::{self, Scene};

type DocumentSlot<D> = Rc<RefCell<Option<SharedDocument<D>>>>;

// =============================================================================
// STORYBOARD MANAGER
// =============================================================================

/// Tracks the active storyboard, computes scene ordering keys, names new
/// storyboards and projects scenes out of the active document.
///
/// Listeners run synchronously while the manager is mutably borrowed, so
/// they cannot call back into it.
pub struct StoryboardManager<D> {
    config: StoryboardConfig,
    document: DocumentSlot<D>,
    input_enabled: bool,
    input_enabled_listeners: Listeners<bool>,
    subscription: Option<ListenerId>,
}

impl<D: DocumentAccessor + 'static> StoryboardManager<D> {
    // =========================================================================
    // INITIALIZATION
    // =========================================================================

    /// Creates a manager with no document loaded.
    pub fn new(config: StoryboardConfig) -> Self {
        Self {
            config,
            document: Rc::new(RefCell::new(None)),
            input_enabled: false,
            input_enabled_listeners: Listeners::new(),
            subscription: None,
        }
    }

    /// Creates a manager that follows `tracker`'s "document loaded" events.
    ///
    /// The subscription lives until `detach` is called with the same tracker.
    pub fn attach(tracker: &mut ActiveDocumentTracker<D>, config: StoryboardConfig) -> Self {
        let mut manager = Self::new(config);
        let slot = Rc::clone(&manager.document);
        let id = tracker.subscribe(move |event| {
            tracing::debug!(load_id = %event.load_id, "swapping active document");
            *slot.borrow_mut() = Some(Rc::clone(&event.document));
        });
        manager.subscription = Some(id);
        manager
    }

    /// Stops following `tracker`. The held document stays until replaced.
    ///
    /// Returns false when the manager was not attached to `tracker`.
    pub fn detach(&mut self, tracker: &mut ActiveDocumentTracker<D>) -> bool {
        match self.subscription.take() {
            Some(id) => tracker.unsubscribe(id),
            None => false,
        }
    }

    /// Replaces the held document.
    pub fn set_document(&mut self, document: SharedDocument<D>) {
        *self.document.borrow_mut() = Some(document);
    }

    /// The held document, if any.
    pub fn document(&self) -> Option<SharedDocument<D>> {
        self.document.borrow().clone()
    }

    pub fn config(&self) -> &StoryboardConfig {
        &self.config
    }

    // =========================================================================
    // STORYBOARDS
    // =========================================================================

    /// All storyboard names in document order. The first one is active.
    pub fn storyboard_names(&self) -> Vec<String> {
        match self.document() {
            Some(doc) => {
                let doc = doc.borrow();
                model::names_from_attr(doc.attr(doc.root_id(), &self.config.storyboards_attribute_name))
            }
            None => Vec::new(),
        }
    }

    /// Name of the active storyboard, i.e. the first in the list.
    pub fn active_storyboard_name(&self) -> Option<String> {
        self.storyboard_names().into_iter().next()
    }

    /// Creates an autogenerated storyboard at the front of the list, making
    /// it active, and returns its name.
    pub fn create_storyboard(&mut self) -> BoardResult<String> {
        let doc = self.document().ok_or(BoardError::NoActiveDocument)?;
        let mut names = self.storyboard_names();
        let name = model::next_storyboard_name(&names);
        names.insert(0, name.clone());

        let mut doc = doc.borrow_mut();
        let root = doc.root_id();
        doc.update_attr(root, &self.config.storyboards_attribute_name, Some(json!(names)))?;
        tracing::debug!(storyboard = %name, total = names.len(), "created storyboard");
        Ok(name)
    }

    // =========================================================================
    // ORDERING KEYS
    // =========================================================================

    /// Index that appends a scene to the end of the active storyboard.
    pub fn next_scene_index(&self) -> f64 {
        model::next_index(&self.scenes())
    }

    /// Ordering key for a scene inserted after the scene hosted by
    /// `after_idea_id`, or before every scene when `None`.
    ///
    /// Returns `None` when there is no active storyboard, it has no scenes,
    /// or no scene of it is hosted by `after_idea_id`. If the node hosts
    /// several scenes of the storyboard the earliest one is the anchor.
    pub fn insertion_index_after(&self, after_idea_id: Option<NodeId>) -> Option<f64> {
        let scenes = self.scenes();
        let position = match after_idea_id {
            None => None,
            Some(id) => Some(scenes.iter().position(|scene| scene.idea_id == id)?),
        };
        let key = model::insertion_key(&scenes, position);
        tracing::trace!(?after_idea_id, ?key, "insertion key by node");
        key
    }

    /// Same as `insertion_index_after`, with the anchor identified by its
    /// scene index instead of its host node.
    pub fn insertion_index_after_scene_index(&self, after_index: Option<f64>) -> Option<f64> {
        let scenes = self.scenes();
        let position = match after_index {
            None => None,
            Some(index) => Some(scenes.iter().position(|scene| scene.index == index)?),
        };
        let key = model::insertion_key(&scenes, position);
        tracing::trace!(?after_index, ?key, "insertion key by index");
        key
    }

    // =========================================================================
    // INPUT ENABLED FLAG
    // =========================================================================

    /// Sets the flag and notifies listeners with the new value.
    pub fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
        tracing::debug!(enabled, "input enabled changed");
        self.input_enabled_listeners.dispatch(&enabled);
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// Registers a listener for input-enabled changes.
    pub fn on_input_enabled_changed<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&bool) + 'static,
    {
        self.input_enabled_listeners.add(callback)
    }

    pub fn remove_input_enabled_listener(&mut self, id: ListenerId) -> bool {
        self.input_enabled_listeners.remove(id)
    }

    // =========================================================================
    // INTERNAL HELPERS
    // =========================================================================

    /// Projects the active storyboard's scenes; empty without one.
    pub(crate) fn project_active(&self) -> (Option<String>, Vec<Scene>) {
        let Some(doc) = self.document() else {
            return (None, Vec::new());
        };
        let doc = doc.borrow();
        let names = model::names_from_attr(doc.attr(doc.root_id(), &self.config.storyboards_attribute_name));
        let Some(active) = names.into_iter().next() else {
            return (None, Vec::new());
        };
        let scenes = super::projector::project_scenes(&*doc, &self.config.scenes_attribute_name, &active);
        (Some(active), scenes)
    }
}

// =============================================================================
// TESTS
// =============================================================================
