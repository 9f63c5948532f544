//! Editor tunables and policy switches.

use serde::{Deserialize, Serialize};

/// Maximum number of undo states to keep.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Marquee rectangles smaller than this along either axis count as a click.
pub const MARQUEE_MIN_SIZE: f64 = 5.0;

/// Largest share of the print area a freshly placed image may cover per axis.
pub const IMAGE_FIT_RATIO: f64 = 0.8;

/// View used before any product data arrives.
pub const DEFAULT_VIEW: &str = "front";

/// How cached scenes are keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SceneKeying {
    /// One scene per view, shared by every color. A color change only swaps
    /// the background and print area.
    #[default]
    PerView,
    /// Separate scenes for every (view, color) pair.
    PerViewAndColor,
}

/// Stacking index given to newly added objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StackingPolicy {
    /// Every new object starts at index 1; reorder to raise it.
    #[default]
    Fixed,
    /// New objects take the top index (N).
    Top,
}

/// Configuration for a [`SceneStore`](crate::store::SceneStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    pub max_history: usize,
    pub scene_keying: SceneKeying,
    pub stacking: StackingPolicy,
    pub marquee_min_size: f64,
    pub image_fit_ratio: f64,
    pub default_view: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_history: MAX_UNDO_HISTORY,
            scene_keying: SceneKeying::default(),
            stacking: StackingPolicy::default(),
            marquee_min_size: MARQUEE_MIN_SIZE,
            image_fit_ratio: IMAGE_FIT_RATIO,
            default_view: DEFAULT_VIEW.to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON, filling missing fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = EditorConfig::from_json(r#"{"maxHistory": 10, "sceneKeying": "per-view-and-color"}"#).unwrap();
        assert_eq!(config.max_history, 10);
        assert_eq!(config.scene_keying, SceneKeying::PerViewAndColor);
        assert_eq!(config.stacking, StackingPolicy::Fixed);
        assert!((config.marquee_min_size - MARQUEE_MIN_SIZE).abs() < f64::EPSILON);
        assert_eq!(config.default_view, "front");
    }
}
