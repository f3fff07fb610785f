//! Editor configuration.
//!
//! Every field has a default, so a config file only needs the keys it
//! overrides. Zoom bounds are not configurable; see `model::MIN_ZOOM`.

use crate::model::GridConfig;
use serde::{Deserialize, Serialize};

/// Tunables for the scene editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of history snapshots kept. Oldest are dropped first.
    /// `None` (the default) keeps the whole session.
    pub history_depth: Option<usize>,

    /// Zoom change per zoom-in / zoom-out step.
    pub zoom_step: f64,

    /// Pixels panned per keyboard pan step.
    pub pan_step: f64,

    /// Cell offset applied to duplicated elements. Not clamped to the grid.
    pub duplicate_offset: (i32, i32),

    /// Scale change per scale-up / scale-down step.
    pub scale_step: f64,
    pub min_scale: f64,
    pub max_scale: f64,

    /// Grid used for new scenes.
    pub default_grid: GridConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_depth: None,
            zoom_step: 0.1,
            pan_step: 50.0,
            duplicate_offset: (1, 1),
            scale_step: 0.1,
            min_scale: 0.25,
            max_scale: 4.0,
            default_grid: GridConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a JSON config, filling unspecified keys with defaults.
    /// A degenerate `default_grid` is rejected.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let config: Self = serde_json::from_str(text)?;
        config
            .default_grid
            .validate()
            .map_err(<serde_json::Error as serde::de::Error>::custom)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = EditorConfig::from_json(r#"{ "history_depth": 10, "pan_step": 8.0 }"#).unwrap();
        assert_eq!(config.history_depth, Some(10));
        assert_eq!(config.pan_step, 8.0);
        assert_eq!(config.zoom_step, 0.1);
        assert_eq!(config.default_grid, GridConfig::default());
    }

    #[test]
    fn degenerate_default_grid_is_rejected() {
        let text = r#"{ "default_grid": { "grid_width": 0, "grid_height": 5, "tile_width": 64.0, "tile_height": 32.0 } }"#;
        assert!(EditorConfig::from_json(text).is_err());
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(EditorConfig::from_json("{}").unwrap(), EditorConfig::default());
    }
}
