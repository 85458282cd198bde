//! Scene projection: per-node scene descriptors -> one ordered scene list.

use std::collections::HashMap;

use crate::document::{DocumentAccessor, NodeId};
use crate::error::{BoardError, BoardResult};
use crate::storyboard::manager::StoryboardManager;
use crate::storyboard::model::{self, Scene, SceneDescriptor};

/// Collects every scene of `storyboard` across the document, sorted by index.
///
/// Titles are read from the nodes as they are now.
pub fn project_scenes<D>(doc: &D, scenes_attribute: &str, storyboard: &str) -> Vec<Scene>
where
    D: DocumentAccessor + ?Sized,
{
    let mut scenes = Vec::new();
    for node in doc.nodes() {
        for descriptor in model::descriptors_from_attr(node.id, doc.attr(node.id, scenes_attribute)) {
            if let Some(index) = descriptor.index_in(storyboard) {
                scenes.push(Scene::new(node.id, node.title.clone(), index));
            }
        }
    }
    model::sort_scenes(&mut scenes);
    tracing::trace!(storyboard, count = scenes.len(), "projected scenes");
    scenes
}

impl<D: DocumentAccessor + 'static> StoryboardManager<D> {
    // =========================================================================
    // PER-NODE DESCRIPTORS
    // =========================================================================

    /// The node's scene descriptors as stored, across all storyboards.
    pub fn scenes_for_node_id(&self, node_id: NodeId) -> Vec<SceneDescriptor> {
        match self.document() {
            Some(doc) => model::descriptors_from_attr(
                node_id,
                doc.borrow().attr(node_id, &self.config().scenes_attribute_name),
            ),
            None => Vec::new(),
        }
    }

    /// The node's descriptors, decoded strictly before a rewrite.
    fn descriptors_for_edit(&self, node_id: NodeId) -> BoardResult<Vec<SceneDescriptor>> {
        let doc = self.document().ok_or(BoardError::NoActiveDocument)?;
        let raw = doc.borrow().attr(node_id, &self.config().scenes_attribute_name);
        model::descriptors_for_edit(node_id, raw)
    }

    /// Replaces the node's scene descriptors wholesale.
    pub fn set_scenes_for_node_id(&self, node_id: NodeId, descriptors: &[SceneDescriptor]) -> BoardResult<()> {
        let doc = self.document().ok_or(BoardError::NoActiveDocument)?;
        let value = serde_json::to_value(descriptors)?;
        let mut doc = doc.borrow_mut();
        doc.update_attr(node_id, &self.config().scenes_attribute_name, Some(value))
    }

    // =========================================================================
    // ACTIVE STORYBOARD SCENES
    // =========================================================================

    /// Scenes of the active storyboard, ascending by index.
    pub fn scenes(&self) -> Vec<Scene> {
        self.project_active().1
    }

    /// Places `node_id` in the active storyboard at `index` by appending a
    /// new descriptor to the node.
    pub fn add_scene(&self, node_id: NodeId, index: f64) -> BoardResult<()> {
        let active = self.active_storyboard_name().ok_or(BoardError::NoActiveStoryboard)?;
        let mut descriptors = self.descriptors_for_edit(node_id)?;
        descriptors.push(SceneDescriptor::for_storyboard(active, index));
        self.set_scenes_for_node_id(node_id, &descriptors)
    }

    /// Removes the node's scene at `index` from the active storyboard.
    ///
    /// Descriptors left without any storyboard are dropped. Returns whether
    /// anything was removed.
    pub fn remove_scene(&self, node_id: NodeId, index: f64) -> BoardResult<bool> {
        let active = self.active_storyboard_name().ok_or(BoardError::NoActiveStoryboard)?;
        let mut descriptors = self.descriptors_for_edit(node_id)?;
        let mut removed = false;
        for descriptor in descriptors.iter_mut() {
            if descriptor.index_in(&active) == Some(index) {
                descriptor.storyboards.remove(&active);
                removed = true;
            }
        }
        if !removed {
            return Ok(false);
        }
        descriptors.retain(|descriptor| !descriptor.is_empty());
        self.set_scenes_for_node_id(node_id, &descriptors)?;
        Ok(true)
    }

    // =========================================================================
    // RENUMBERING
    // =========================================================================

    /// True when repeated midpoint inserts have exhausted the resolution
    /// between two neighbouring scenes of the active storyboard.
    pub fn needs_renumbering(&self) -> bool {
        model::needs_renumbering(&self.scenes())
    }

    /// Rewrites the active storyboard's indices to 1..N, keeping their order.
    ///
    /// Only runs when called. Other storyboards and descriptor fields are
    /// untouched. Returns the number of nodes rewritten.
    pub fn renumber_scenes(&self) -> BoardResult<usize> {
        let (Some(active), scenes) = self.project_active() else {
            return Ok(0);
        };

        let mut renumbered: HashMap<(NodeId, u64), f64> = HashMap::new();
        let mut next = model::FIRST_SCENE_INDEX;
        for scene in &scenes {
            renumbered.entry((scene.idea_id, scene.index.to_bits())).or_insert_with(|| {
                let index = next;
                next += 1.0;
                index
            });
        }

        let mut nodes: Vec<NodeId> = scenes.iter().map(|scene| scene.idea_id).collect();
        nodes.sort_unstable();
        nodes.dedup();

        // Decode every node before the first write so a bad node leaves the
        // storyboard untouched.
        let decoded = nodes
            .into_iter()
            .map(|node_id| self.descriptors_for_edit(node_id).map(|descriptors| (node_id, descriptors)))
            .collect::<BoardResult<Vec<_>>>()?;

        let mut rewritten = 0;
        for (node_id, mut descriptors) in decoded {
            let mut changed = false;
            for descriptor in descriptors.iter_mut() {
                if let Some(index) = descriptor.storyboards.get_mut(&active) {
                    if let Some(new_index) = renumbered.get(&(node_id, index.to_bits())) {
                        if *index != *new_index {
                            *index = *new_index;
                            changed = true;
                        }
                    }
                }
            }
            if changed {
                self.set_scenes_for_node_id(node_id, &descriptors)?;
                rewritten += 1;
            }
        }
        tracing::debug!(storyboard = %active, scenes = scenes.len(), rewritten, "renumbered scenes");
        Ok(rewritten)
    }
}

// =============================================================================
// TESTS
// =============================================================================
