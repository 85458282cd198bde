//! Scene data model and the pure ordering rules of the storyboard index.
//!
//! Scene indices are fractional ordering keys. Only their relative order
//! within one storyboard is meaningful. Inserting between two neighbours
//! takes the midpoint, so no other scene is ever rewritten; a long chain of
//! inserts into the same gap halves it each time and eventually runs out of
//! `f64` resolution. `needs_renumbering` detects that point and
//! `StoryboardManager::renumber_scenes` compacts the storyboard on request.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

use crate::document::{AttrValue, NodeId};
use crate::error::{BoardError, BoardResult};

/// Prefix of autogenerated storyboard names ("Storyboard 1", "Storyboard 2", ...).
pub const AUTO_NAME_PREFIX: &str = "Storyboard ";

/// Index given to the first scene of an empty storyboard.
pub const FIRST_SCENE_INDEX: f64 = 1.0;

// =============================================================================
// SCENE
// =============================================================================

/// One scene of the active storyboard, projected from its host node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Id of the node hosting the scene.
    pub idea_id: NodeId,
    /// Title of the host node at projection time.
    pub title: String,
    /// Ordering key within the storyboard.
    pub index: f64,
}

impl Scene {
    pub fn new(idea_id: NodeId, title: impl Into<String>, index: f64) -> Self {
        Self {
            idea_id,
            title: title.into(),
            index,
        }
    }
}

// =============================================================================
// SCENE DESCRIPTOR
// =============================================================================

/// Persisted per-node scene record: storyboard name -> index.
///
/// Unknown keys are carried through untouched in `extra`. Storyboard entries
/// whose index is not a number sit in `unparsed`; they belong to no
/// storyboard but are written back as found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneDescriptor {
    pub storyboards: BTreeMap<String, f64>,
    pub unparsed: Map<String, Value>,
    pub extra: Map<String, Value>,
}

impl SceneDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a descriptor placing the scene in one storyboard.
    pub fn for_storyboard(name: impl Into<String>, index: f64) -> Self {
        Self::new().with_storyboard(name, index)
    }

    /// Builder: Add a storyboard membership.
    pub fn with_storyboard(mut self, name: impl Into<String>, index: f64) -> Self {
        let name = name.into();
        self.unparsed.remove(&name);
        self.storyboards.insert(name, index);
        self
    }

    /// Index of this scene in `storyboard`, if it belongs to it.
    pub fn index_in(&self, storyboard: &str) -> Option<f64> {
        self.storyboards.get(storyboard).copied()
    }

    /// True when no storyboard entry is left, valid or not.
    pub fn is_empty(&self) -> bool {
        self.storyboards.is_empty() && self.unparsed.is_empty()
    }

    /// Decodes one descriptor object.
    ///
    /// Fails only when the shape cannot be carried back unchanged: the entry
    /// is not an object, or its `storyboards` is not an object.
    pub fn from_value(value: Value) -> BoardResult<Self> {
        let mut fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(BoardError::schema_violation(format!(
                    "scene descriptor is not an object: {}",
                    other
                )))
            }
        };

        let mut descriptor = Self::new();
        match fields.remove("storyboards") {
            None | Some(Value::Null) => {}
            Some(Value::Object(entries)) => {
                for (name, index) in entries {
                    match index.as_f64() {
                        Some(index) => {
                            descriptor.storyboards.insert(name, index);
                        }
                        None => {
                            descriptor.unparsed.insert(name, index);
                        }
                    }
                }
            }
            Some(other) => {
                return Err(BoardError::schema_violation(format!(
                    "scene storyboards is not an object: {}",
                    other
                )))
            }
        }
        descriptor.extra = fields;
        Ok(descriptor)
    }
}

impl Serialize for SceneDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut storyboards = self.unparsed.clone();
        for (name, index) in &self.storyboards {
            storyboards.insert(name.clone(), Value::from(*index));
        }

        let extra = self.extra.iter().filter(|(key, _)| key.as_str() != "storyboards");
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("storyboards", &storyboards)?;
        for (key, value) in extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SceneDescriptor {
    fn deserialize<De: Deserializer<'de>>(deserializer: De) -> Result<Self, De::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(de::Error::custom)
    }
}

/// Decodes a node's scene attribute for reading. Absent or null reads as no
/// scenes; entries that cannot be decoded are skipped, the rest kept.
pub fn descriptors_from_attr(node_id: NodeId, value: Option<AttrValue>) -> Vec<SceneDescriptor> {
    let items = match value {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => {
            tracing::warn!(node = node_id, value = %other, "scene list is not an array");
            return Vec::new();
        }
    };

    items
        .into_iter()
        .filter_map(|item| match SceneDescriptor::from_value(item) {
            Ok(descriptor) => {
                if !descriptor.unparsed.is_empty() {
                    let names: Vec<&String> = descriptor.unparsed.keys().collect();
                    tracing::warn!(node = node_id, storyboards = ?names, "ignoring non-numeric scene indices");
                }
                Some(descriptor)
            }
            Err(e) => {
                tracing::warn!(node = node_id, error = %e, "ignoring malformed scene descriptor");
                None
            }
        })
        .collect()
}

/// Decodes a node's scene attribute ahead of rewriting it.
///
/// Unlike `descriptors_from_attr` nothing is skipped: any entry that could
/// not be written back unchanged is an error, so an edit never drops data.
pub fn descriptors_for_edit(node_id: NodeId, value: Option<AttrValue>) -> BoardResult<Vec<SceneDescriptor>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(SceneDescriptor::from_value)
            .collect::<BoardResult<Vec<_>>>()
            .map_err(|e| BoardError::schema_violation(format!("node {}: {}", node_id, e))),
        Some(other) => Err(BoardError::schema_violation(format!(
            "node {}: scene list is not an array: {}",
            node_id, other
        ))),
    }
}

/// Decodes the storyboard name list. Non-string entries are skipped.
pub fn names_from_attr(value: Option<AttrValue>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(name) => Some(name),
                other => {
                    tracing::warn!(entry = %other, "ignoring non-string storyboard name");
                    None
                }
            })
            .collect(),
        Some(other) => {
            tracing::warn!(value = %other, "storyboard name list is not an array");
            Vec::new()
        }
    }
}

// =============================================================================
// NAME GENERATION
// =============================================================================

/// Returns N if `name` is exactly `"Storyboard " + N` for a decimal N.
pub fn autogenerated_suffix(name: &str) -> Option<u64> {
    let digits = name.strip_prefix(AUTO_NAME_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Next autogenerated name: one past the largest existing suffix, or
/// "Storyboard 1".
///
/// Distinct from every autogenerated-looking name in `existing`; a manually
/// typed name can still collide. If the largest suffix is `u64::MAX` the
/// smallest unused suffix is taken instead.
pub fn next_storyboard_name(existing: &[String]) -> String {
    let used: BTreeSet<u64> = existing.iter().filter_map(|name| autogenerated_suffix(name)).collect();
    let next = match used.last() {
        None => 1,
        Some(max) => max
            .checked_add(1)
            .unwrap_or_else(|| (1..).find(|n| !used.contains(n)).unwrap_or(1)),
    };
    format!("{}{}", AUTO_NAME_PREFIX, next)
}

// =============================================================================
// ORDERING KEYS
// =============================================================================

/// Sorts scenes ascending by index. Ties keep no particular order.
pub fn sort_scenes(scenes: &mut [Scene]) {
    scenes.sort_by(|a, b| a.index.total_cmp(&b.index));
}

/// Index that appends after every scene: max + 1, or 1 when empty.
pub fn next_index(scenes: &[Scene]) -> f64 {
    scenes
        .iter()
        .map(|scene| scene.index)
        .reduce(f64::max)
        .map_or(FIRST_SCENE_INDEX, |max| max + 1.0)
}

/// Ordering key for a scene inserted after the scene at `position`
/// (`None` inserts before everything). `scenes` must be sorted.
pub fn insertion_key(scenes: &[Scene], position: Option<usize>) -> Option<f64> {
    let first = scenes.first()?;
    match position {
        None => Some(midpoint(0.0, first.index)),
        Some(i) => {
            let anchor = scenes.get(i)?;
            match scenes.get(i + 1) {
                Some(next) => Some(midpoint(anchor.index, next.index)),
                None => Some(anchor.index + 1.0),
            }
        }
    }
}

/// True when some adjacent pair of distinct indices has no representable
/// value strictly between them.
pub fn needs_renumbering(scenes: &[Scene]) -> bool {
    scenes.windows(2).any(|pair| {
        let (low, high) = (pair[0].index, pair[1].index);
        if low >= high {
            return false;
        }
        let mid = midpoint(low, high);
        mid <= low || mid >= high
    })
}

fn midpoint(a: f64, b: f64) -> f64 {
    (a + b) / 2.0
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scenes(indices: &[f64]) -> Vec<Scene> {
        indices
            .iter()
            .enumerate()
            .map(|(i, index)| Scene::new(100 + i as NodeId, format!("scene {}", i), *index))
            .collect()
    }

    #[test]
    fn test_autogenerated_suffix() {
        assert_eq!(autogenerated_suffix("Storyboard 5"), Some(5));
        assert_eq!(autogenerated_suffix("Storyboard 12"), Some(12));
        assert_eq!(autogenerated_suffix("Storyboard "), None);
        assert_eq!(autogenerated_suffix("Storyboard 5b"), None);
        assert_eq!(autogenerated_suffix("storyboard 5"), None);
        assert_eq!(autogenerated_suffix("My Storyboard 5"), None);
        assert_eq!(autogenerated_suffix("Storyboard -1"), None);
    }

    #[test]
    fn test_next_storyboard_name_starts_at_one() {
        assert_eq!(next_storyboard_name(&[]), "Storyboard 1");
        let manual = vec!["mickey mouse".to_string(), "donald duck".to_string()];
        assert_eq!(next_storyboard_name(&manual), "Storyboard 1");
    }

    #[test]
    fn test_next_storyboard_name_skips_past_maximum() {
        let names = vec![
            "donald duck".to_string(),
            "Storyboard 2".to_string(),
            "Storyboard 5".to_string(),
            "Storyboard 3".to_string(),
        ];
        assert_eq!(next_storyboard_name(&names), "Storyboard 6");
    }

    #[test]
    fn test_next_storyboard_name_never_repeats_at_counter_limit() {
        let names = vec![format!("Storyboard {}", u64::MAX)];
        assert_eq!(next_storyboard_name(&names), "Storyboard 1");

        let names = vec![
            format!("Storyboard {}", u64::MAX),
            "Storyboard 1".to_string(),
            "Storyboard 3".to_string(),
        ];
        assert_eq!(next_storyboard_name(&names), "Storyboard 2");
    }

    #[test]
    fn test_next_index() {
        assert_eq!(next_index(&[]), 1.0);
        assert_eq!(next_index(&scenes(&[1.0, 2.0, 10.0])), 11.0);
        assert_eq!(next_index(&scenes(&[0.25])), 1.25);
    }

    #[test]
    fn test_insertion_key() {
        let ordered = scenes(&[1.0, 2.0, 10.0]);
        assert_eq!(insertion_key(&ordered, None), Some(0.5));
        assert_eq!(insertion_key(&ordered, Some(0)), Some(1.5));
        assert_eq!(insertion_key(&ordered, Some(1)), Some(6.0));
        assert_eq!(insertion_key(&ordered, Some(2)), Some(11.0));
        assert_eq!(insertion_key(&ordered, Some(3)), None);
        assert_eq!(insertion_key(&[], None), None);
    }

    #[test]
    fn test_repeated_midpoint_inserts_stay_ordered() {
        let mut ordered = scenes(&[1.0, 2.0]);
        for _ in 0..20 {
            let key = insertion_key(&ordered, Some(0)).unwrap();
            assert!(key > ordered[0].index && key < ordered[1].index);
            ordered.insert(1, Scene::new(0, "inserted", key));
        }
        assert!(!needs_renumbering(&ordered));
    }

    #[test]
    fn test_needs_renumbering_detects_exhausted_gap() {
        let low = 1.0_f64;
        let high = f64::from_bits(low.to_bits() + 1);
        assert!(needs_renumbering(&scenes(&[low, high])));
        assert!(!needs_renumbering(&scenes(&[1.0, 1.0, 2.0])));
    }

    #[test]
    fn test_descriptor_parsing_keeps_extra_fields() {
        let raw = json!([{"storyboards": {"ted talk": 1, "bed talk": 2.5}, "note": "keep me"}]);
        let descriptors = descriptors_from_attr(1, Some(raw.clone()));

        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].index_in("ted talk"), Some(1.0));
        assert_eq!(descriptors[0].index_in("bed talk"), Some(2.5));
        assert_eq!(descriptors[0].extra.get("note"), Some(&json!("keep me")));

        let reparsed = descriptors_from_attr(1, Some(serde_json::to_value(&descriptors).unwrap()));
        assert_eq!(reparsed, descriptors);
    }

    #[test]
    fn test_descriptor_parsing_absent_or_malformed() {
        assert!(descriptors_from_attr(1, None).is_empty());
        assert!(descriptors_from_attr(1, Some(Value::Null)).is_empty());
        assert!(descriptors_from_attr(1, Some(json!("nonsense"))).is_empty());
    }

    #[test]
    fn test_descriptor_parsing_keeps_valid_entries_beside_bad_ones() {
        let raw = json!([
            {"storyboards": {"ted talk": 2}},
            {"storyboards": {"legacy": "3", "bed talk": 4}},
            "nonsense",
            {"storyboards": 7}
        ]);
        let descriptors = descriptors_from_attr(13, Some(raw));

        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].index_in("ted talk"), Some(2.0));
        assert_eq!(descriptors[1].index_in("bed talk"), Some(4.0));
        assert_eq!(descriptors[1].index_in("legacy"), None);
        assert_eq!(descriptors[1].unparsed.get("legacy"), Some(&json!("3")));
        assert!(!descriptors[1].is_empty());
    }

    #[test]
    fn test_non_numeric_index_written_back_unchanged() {
        let descriptor = SceneDescriptor::from_value(json!({"storyboards": {"legacy": "3"}, "note": 1})).unwrap();
        assert!(descriptor.storyboards.is_empty());
        assert_eq!(
            serde_json::to_value(&descriptor).unwrap(),
            json!({"storyboards": {"legacy": "3"}, "note": 1})
        );

        let replaced = descriptor.with_storyboard("legacy", 5.0);
        assert_eq!(
            serde_json::to_value(&replaced).unwrap(),
            json!({"storyboards": {"legacy": 5.0}, "note": 1})
        );
    }

    #[test]
    fn test_descriptors_for_edit_rejects_undecodable_lists() {
        let ok = descriptors_for_edit(1, Some(json!([{"storyboards": {"legacy": "3"}}]))).unwrap();
        assert_eq!(ok[0].unparsed.get("legacy"), Some(&json!("3")));
        assert!(descriptors_for_edit(1, None).unwrap().is_empty());

        for raw in [json!("nonsense"), json!([{"storyboards": {}}, 4]), json!([{"storyboards": [1]}])] {
            assert!(matches!(
                descriptors_for_edit(1, Some(raw)),
                Err(BoardError::SchemaViolation(_))
            ));
        }
    }

    #[test]
    fn test_names_from_attr() {
        assert!(names_from_attr(None).is_empty());
        assert!(names_from_attr(Some(json!({"a": 1}))).is_empty());
        assert_eq!(
            names_from_attr(Some(json!(["a", 3, "b"]))),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_scene_serializes_camel_case() {
        let value = serde_json::to_value(Scene::new(12, "idea", 1.5)).unwrap();
        assert_eq!(value, json!({"ideaId": 12, "title": "idea", "index": 1.5}));
    }
}
