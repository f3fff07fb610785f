//! Persisted scene document.
//!
//! ```json
//! {
//!   "version": "1.0.0",
//!   "timestamp": "2026-10-19T12:00:00Z",
//!   "metadata": { "gridSize": { "width": 10, "height": 10 },
//!                 "tileSize": { "width": 64, "height": 32 } },
//!   "elements": [ { "id": "el_1", "type": "tree", "species": "oak",
//!                   "position": { "x": 5, "y": 5 }, "rotation": 0, "scale": 1 } ]
//! }
//! ```
//!
//! View state, selection, and history are deliberately absent: a document
//! holds the grid and the element collection only.

use crate::error::SchemaError;
use crate::model::{Element, GridConfig, SCHEMA_VERSION};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scene as written to a store or file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: DocumentMetadata,
    pub elements: Vec<Element>,
}

fn default_version() -> String {
    SCHEMA_VERSION.to_string()
}

fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Grid and tile dimensions of a persisted scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub grid_size: GridSize,
    pub tile_size: TileSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileSize {
    pub width: f64,
    pub height: f64,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        GridConfig::default().into()
    }
}

impl From<GridConfig> for DocumentMetadata {
    fn from(grid: GridConfig) -> Self {
        Self {
            grid_size: GridSize {
                width: grid.grid_width,
                height: grid.grid_height,
            },
            tile_size: TileSize {
                width: grid.tile_width,
                height: grid.tile_height,
            },
        }
    }
}

impl DocumentMetadata {
    /// The grid this metadata describes, if its dimensions are usable.
    pub fn grid_config(&self) -> Result<GridConfig, SchemaError> {
        let grid = GridConfig {
            grid_width: self.grid_size.width,
            grid_height: self.grid_size.height,
            tile_width: self.tile_size.width,
            tile_height: self.tile_size.height,
        };
        grid.validate().map_err(|e| match e {
            crate::error::SceneError::InvalidGrid(reason) => SchemaError::InvalidGrid(reason),
            other => SchemaError::Malformed(other.to_string()),
        })?;
        Ok(grid)
    }
}

impl SceneDocument {
    /// Number of elements per type label, in palette order. Zero counts omitted.
    pub fn type_counts(&self) -> Vec<(&'static str, usize)> {
        crate::model::ElementType::all()
            .iter()
            .filter_map(|ty| {
                let n = self
                    .elements
                    .iter()
                    .filter(|el| el.element_type() == *ty)
                    .count();
                (n > 0).then_some((ty.label(), n))
            })
            .collect()
    }
}
