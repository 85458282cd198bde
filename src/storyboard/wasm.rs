//! WASM bindings for the storyboard index.
//!
//! This module provides a JavaScript-friendly wrapper owning an active
//! document tracker and a StoryboardManager attached to it.

use js_sys::{Function, Uint8Array};
use serde::Serialize;
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::prelude::*;

use crate::config::StoryboardConfig;
use crate::document::{share, ActiveDocumentTracker, NodeId, TreeDocument};
use crate::storyboard::manager::StoryboardManager;
use crate::storyboard::model::SceneDescriptor;
use crate::BoardError;

/// Serialize a value to JsValue with maps as plain JS objects (not Map).
fn to_js_value<T: Serialize>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&Serializer::new().serialize_maps_as_objects(true))
}

// =============================================================================
// ERROR CONVERSION
// =============================================================================

/// Helper macro for Result conversion
macro_rules! js_result {
    ($expr:expr) => {
        $expr.map_err(|e: BoardError| JsValue::from_str(&e.to_string()))
    };
}

/// Node id carried by a JS number, if it is a whole number in range.
fn checked_node_id(id: f64) -> Option<NodeId> {
    let in_range = id >= NodeId::MIN as f64 && id < NodeId::MAX as f64;
    (id.is_finite() && id.fract() == 0.0 && in_range).then_some(id as NodeId)
}

fn node_id(id: f64) -> Result<NodeId, JsValue> {
    checked_node_id(id).ok_or_else(|| JsValue::from_str(&format!("invalid node id: {}", id)))
}

// =============================================================================
// MAIN WRAPPER TYPE
// =============================================================================

/// JavaScript-friendly storyboard index over an Automerge tree document.
#[wasm_bindgen]
pub struct JsStoryboardManager {
    tracker: ActiveDocumentTracker<TreeDocument>,
    inner: StoryboardManager<TreeDocument>,
}

#[wasm_bindgen]
impl JsStoryboardManager {
    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Creates a manager. Attribute names default when omitted.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// const manager = new JsStoryboardManager('storyboards', 'storyboard-scenes');
    /// ```
    #[wasm_bindgen(constructor)]
    pub fn new(storyboards_attr: Option<String>, scenes_attr: Option<String>) -> JsStoryboardManager {
        let defaults = StoryboardConfig::default();
        let config = StoryboardConfig::new(
            storyboards_attr.unwrap_or(defaults.storyboards_attribute_name),
            scenes_attr.unwrap_or(defaults.scenes_attribute_name),
        );
        let mut tracker = ActiveDocumentTracker::new();
        let inner = StoryboardManager::attach(&mut tracker, config);
        JsStoryboardManager { tracker, inner }
    }

    /// Loads an Automerge tree document (Uint8Array) and makes it active.
    #[wasm_bindgen(js_name = loadDocument)]
    pub fn load_document(&mut self, load_id: &str, bytes: &[u8]) -> Result<(), JsValue> {
        let doc = js_result!(TreeDocument::from_bytes(bytes))?;
        self.tracker.load(load_id, share(doc));
        Ok(())
    }

    /// Loads a JSON content tree and makes it active.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// manager.loadContent('map-1', JSON.stringify({id: 1, title: 'root', ideas: {}}));
    /// ```
    #[wasm_bindgen(js_name = loadContent)]
    pub fn load_content(&mut self, load_id: &str, json: &str) -> Result<(), JsValue> {
        let doc = js_result!(TreeDocument::from_content_json(json))?;
        self.tracker.load(load_id, share(doc));
        Ok(())
    }

    /// Saves the active document (returns Uint8Array, or undefined without one).
    #[wasm_bindgen(js_name = saveDocument)]
    pub fn save_document(&mut self) -> Option<Uint8Array> {
        let doc = self.tracker.current_document()?;
        let bytes = doc.borrow_mut().save();
        Some(Uint8Array::from(&bytes[..]))
    }

    // =========================================================================
    // STORYBOARDS
    // =========================================================================

    #[wasm_bindgen(js_name = getActiveStoryboardName)]
    pub fn get_active_storyboard_name(&self) -> Option<String> {
        self.inner.active_storyboard_name()
    }

    #[wasm_bindgen(js_name = getStoryboards)]
    pub fn get_storyboards(&self) -> Result<JsValue, JsValue> {
        Ok(to_js_value(&self.inner.storyboard_names())?)
    }

    #[wasm_bindgen(js_name = createStoryboard)]
    pub fn create_storyboard(&mut self) -> Result<String, JsValue> {
        js_result!(self.inner.create_storyboard())
    }

    // =========================================================================
    // ORDERING KEYS
    // =========================================================================

    #[wasm_bindgen(js_name = nextSceneIndex)]
    pub fn next_scene_index(&self) -> f64 {
        self.inner.next_scene_index()
    }

    /// Returns undefined when no insertion point exists.
    #[wasm_bindgen(js_name = insertionIndexAfter)]
    pub fn insertion_index_after(&self, after_idea_id: Option<f64>) -> Result<Option<f64>, JsValue> {
        let after_idea_id = after_idea_id.map(node_id).transpose()?;
        Ok(self.inner.insertion_index_after(after_idea_id))
    }

    // =========================================================================
    // SCENES
    // =========================================================================

    /// Scenes of the active storyboard as `{ideaId, title, index}` objects.
    #[wasm_bindgen(js_name = getScenes)]
    pub fn get_scenes(&self) -> Result<JsValue, JsValue> {
        Ok(to_js_value(&self.inner.scenes())?)
    }

    #[wasm_bindgen(js_name = getScenesForNodeId)]
    pub fn get_scenes_for_node_id(&self, id: f64) -> Result<JsValue, JsValue> {
        Ok(to_js_value(&self.inner.scenes_for_node_id(node_id(id)?))?)
    }

    #[wasm_bindgen(js_name = setScenesForNodeId)]
    pub fn set_scenes_for_node_id(&self, id: f64, descriptors: JsValue) -> Result<(), JsValue> {
        let descriptors: Vec<SceneDescriptor> = from_value(descriptors)?;
        js_result!(self.inner.set_scenes_for_node_id(node_id(id)?, &descriptors))
    }

    #[wasm_bindgen(js_name = addScene)]
    pub fn add_scene(&self, id: f64, index: f64) -> Result<(), JsValue> {
        js_result!(self.inner.add_scene(node_id(id)?, index))
    }

    #[wasm_bindgen(js_name = removeScene)]
    pub fn remove_scene(&self, id: f64, index: f64) -> Result<bool, JsValue> {
        js_result!(self.inner.remove_scene(node_id(id)?, index))
    }

    // =========================================================================
    // INPUT ENABLED
    // =========================================================================

    #[wasm_bindgen(js_name = setInputEnabled)]
    pub fn set_input_enabled(&mut self, enabled: bool) {
        self.inner.set_input_enabled(enabled);
    }

    #[wasm_bindgen(js_name = getInputEnabled)]
    pub fn get_input_enabled(&self) -> bool {
        self.inner.input_enabled()
    }

    /// Registers a callback invoked with the new boolean on every change.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// manager.onInputEnabledChanged((enabled) => console.log(enabled));
    /// ```
    #[wasm_bindgen(js_name = onInputEnabledChanged)]
    pub fn on_input_enabled_changed(&mut self, callback: Function) {
        self.inner.on_input_enabled_changed(move |enabled| {
            if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_bool(*enabled)) {
                tracing::warn!(error = ?e, "input enabled listener threw");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_node_id() {
        assert_eq!(checked_node_id(12.0), Some(12));
        assert_eq!(checked_node_id(-3.0), Some(-3));
        assert_eq!(checked_node_id(1.5), None);
        assert_eq!(checked_node_id(f64::NAN), None);
        assert_eq!(checked_node_id(f64::INFINITY), None);
        assert_eq!(checked_node_id(1e300), None);
    }
}
