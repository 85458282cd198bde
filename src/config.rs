//! Attribute-name configuration for the storyboard index.

use serde::{Deserialize, Serialize};

use crate::error::BoardResult;

/// Default root attribute holding the ordered storyboard names.
pub const DEFAULT_STORYBOARDS_ATTRIBUTE: &str = "storyboards";
/// Default per-node attribute holding scene descriptors.
pub const DEFAULT_SCENES_ATTRIBUTE: &str = "storyboard-scenes";

/// Names of the two document attributes the index operates over.
///
/// Deployments (and tests) pick their own keys, so nothing in the index
/// hard-codes them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoryboardConfig {
    /// Root attribute holding the ordered list of storyboard names.
    #[serde(alias = "storyboardsAttributeName")]
    pub storyboards_attribute_name: String,
    /// Per-node attribute holding the list of scene descriptors.
    #[serde(alias = "scenesAttributeName")]
    pub scenes_attribute_name: String,
}

impl StoryboardConfig {
    pub fn new(storyboards: impl Into<String>, scenes: impl Into<String>) -> Self {
        Self {
            storyboards_attribute_name: storyboards.into(),
            scenes_attribute_name: scenes.into(),
        }
    }

    /// Parses a config from JSON, accepting snake_case or camelCase keys.
    pub fn from_json(json: &str) -> BoardResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for StoryboardConfig {
    fn default() -> Self {
        Self::new(DEFAULT_STORYBOARDS_ATTRIBUTE, DEFAULT_SCENES_ATTRIBUTE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keys() {
        let config = StoryboardConfig::default();
        assert_eq!(config.storyboards_attribute_name, "storyboards");
        assert_eq!(config.scenes_attribute_name, "storyboard-scenes");
    }

    #[test]
    fn test_from_json_camel_case() {
        let config = StoryboardConfig::from_json(
            r#"{"storyboardsAttributeName": "test-storyboards", "scenesAttributeName": "test-scenes"}"#,
        )
        .unwrap();
        assert_eq!(config, StoryboardConfig::new("test-storyboards", "test-scenes"));
    }

    #[test]
    fn test_from_json_missing_key_fails() {
        assert!(StoryboardConfig::from_json(r#"{"storyboards_attribute_name": "a"}"#).is_err());
    }
}
