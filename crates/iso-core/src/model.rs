//! Core data model for isometric scenes.
//!
//! A scene is a flat collection of `Element`s placed on integer grid cells.
//! Elements never nest; layering is derived from position (see
//! `transform::z_order`), not from collection order, except as a stable
//! tie-breaker between elements on the same diagonal.

use crate::error::SceneError;
use crate::id::ElementId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Schema version written into every persisted scene.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Zoom is always kept inside `[MIN_ZOOM, MAX_ZOOM]`.
pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 2.0;

// ─── Positions ───────────────────────────────────────────────────────────

/// A discrete grid cell. May lie outside the grid (e.g. after duplication).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// This cell shifted by `(dx, dy)`.
    #[must_use]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A point in screen (pixel) space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for ScreenPoint {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for ScreenPoint {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Pixel dimensions of a surface or of the whole grid.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Extent {
    pub width: f64,
    pub height: f64,
}

// ─── Grid configuration ──────────────────────────────────────────────────

/// Size of the placement grid and the pixel footprint of one tile.
///
/// Always valid once constructed: dimensions are positive and tile sizes
/// are finite, so the projection functions never divide by zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub grid_width: u32,
    pub grid_height: u32,
    pub tile_width: f64,
    pub tile_height: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 20,
            tile_width: 64.0,
            tile_height: 32.0,
        }
    }
}

impl GridConfig {
    pub fn new(
        grid_width: u32,
        grid_height: u32,
        tile_width: f64,
        tile_height: f64,
    ) -> Result<Self, SceneError> {
        let config = Self {
            grid_width,
            grid_height,
            tile_width,
            tile_height,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject zero grid sizes and zero, negative, or non-finite tiles.
    pub fn validate(&self) -> Result<(), SceneError> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(SceneError::InvalidGrid("grid dimensions must be positive"));
        }
        if !(self.tile_width.is_finite() && self.tile_width > 0.0) {
            return Err(SceneError::InvalidGrid("tile width must be positive"));
        }
        if !(self.tile_height.is_finite() && self.tile_height > 0.0) {
            return Err(SceneError::InvalidGrid("tile height must be positive"));
        }
        Ok(())
    }

    /// Return a copy with `patch` applied, validated as a whole.
    pub fn patched(&self, patch: &GridPatch) -> Result<Self, SceneError> {
        let next = Self {
            grid_width: patch.grid_width.unwrap_or(self.grid_width),
            grid_height: patch.grid_height.unwrap_or(self.grid_height),
            tile_width: patch.tile_width.unwrap_or(self.tile_width),
            tile_height: patch.tile_height.unwrap_or(self.tile_height),
        };
        next.validate()?;
        Ok(next)
    }

    /// Whether `pos` lies inside `[0, grid_width) x [0, grid_height)`.
    pub fn contains(&self, pos: GridPos) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && (pos.x as i64) < self.grid_width as i64
            && (pos.y as i64) < self.grid_height as i64
    }
}

/// Partial update for `GridConfig`; `None` keeps the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GridPatch {
    pub grid_width: Option<u32>,
    pub grid_height: Option<u32>,
    pub tile_width: Option<f64>,
    pub tile_height: Option<f64>,
}

// ─── Rotation ────────────────────────────────────────────────────────────

/// Quarter-turn rotation. Serialized as integer degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Any multiple of 90, normalized into `[0, 360)`.
    pub fn from_degrees(degrees: i64) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            _ => Some(Rotation::Deg270),
        }
    }

    /// The next quarter turn clockwise.
    #[must_use]
    pub fn rotated_cw(self) -> Self {
        match self {
            Rotation::Deg0 => Rotation::Deg90,
            Rotation::Deg90 => Rotation::Deg180,
            Rotation::Deg180 => Rotation::Deg270,
            Rotation::Deg270 => Rotation::Deg0,
        }
    }
}

impl From<Rotation> for i64 {
    fn from(r: Rotation) -> i64 {
        r.degrees() as i64
    }
}

impl TryFrom<i64> for Rotation {
    type Error = String;

    fn try_from(degrees: i64) -> Result<Self, Self::Error> {
        Rotation::from_degrees(degrees)
            .ok_or_else(|| format!("rotation must be a multiple of 90 degrees, got {degrees}"))
    }
}

// ─── Element kinds ───────────────────────────────────────────────────────

/// Fieldless element type, as offered by a palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Tree,
    Building,
    Road,
    Water,
    Rock,
    Character,
    Label,
}

impl ElementType {
    /// Human-readable label for the element type.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Tree => "Tree",
            Self::Building => "Building",
            Self::Road => "Road",
            Self::Water => "Water",
            Self::Rock => "Rock",
            Self::Character => "Character",
            Self::Label => "Label",
        }
    }

    /// All variants in palette order.
    pub fn all() -> [Self; 7] {
        [
            Self::Tree,
            Self::Building,
            Self::Road,
            Self::Water,
            Self::Rock,
            Self::Character,
            Self::Label,
        ]
    }

    /// A kind carrying the default type-specific fields.
    pub fn default_kind(&self) -> ElementKind {
        match self {
            Self::Tree => ElementKind::Tree {
                species: default_species(),
            },
            Self::Building => ElementKind::Building {
                floors: default_floors(),
                color: None,
            },
            Self::Road => ElementKind::Road {},
            Self::Water => ElementKind::Water {},
            Self::Rock => ElementKind::Rock {},
            Self::Character => ElementKind::Character {
                name: String::new(),
            },
            Self::Label => ElementKind::Label {
                text: String::new(),
            },
        }
    }
}

/// Element type plus its type-specific fields.
///
/// Persisted inline with the element, discriminated by `"type"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Tree {
        #[serde(default = "default_species")]
        species: String,
    },
    Building {
        #[serde(default = "default_floors")]
        floors: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
    Road {},
    Water {},
    Rock {},
    Character {
        #[serde(default)]
        name: String,
    },
    Label {
        #[serde(default)]
        text: String,
    },
}

fn default_species() -> String {
    "oak".to_string()
}

fn default_floors() -> u32 {
    1
}

impl ElementKind {
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Tree { .. } => ElementType::Tree,
            Self::Building { .. } => ElementType::Building,
            Self::Road {} => ElementType::Road,
            Self::Water {} => ElementType::Water,
            Self::Rock {} => ElementType::Rock,
            Self::Character { .. } => ElementType::Character,
            Self::Label { .. } => ElementType::Label,
        }
    }
}

// ─── Elements ────────────────────────────────────────────────────────────

/// A placed object on the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    #[serde(flatten)]
    pub kind: ElementKind,
    pub position: GridPos,
    #[serde(default)]
    pub rotation: Rotation,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

/// Scale must be a finite, strictly positive factor.
pub fn validate_scale(scale: f64) -> Result<(), SceneError> {
    if scale.is_finite() && scale > 0.0 {
        Ok(())
    } else {
        Err(SceneError::InvalidScale(scale))
    }
}

impl Element {
    pub fn new(id: ElementId, kind: ElementKind, position: GridPos) -> Self {
        Self {
            id,
            kind,
            position,
            rotation: Rotation::Deg0,
            scale: 1.0,
        }
    }

    pub fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    /// Merge `patch` into this element. Leaves the element untouched on error.
    pub fn apply(&mut self, patch: &ElementPatch) -> Result<(), SceneError> {
        if let Some(scale) = patch.scale {
            validate_scale(scale)?;
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(scale) = patch.scale {
            self.scale = scale;
        }
        if let Some(kind) = &patch.kind {
            self.kind = kind.clone();
        }
        Ok(())
    }
}

/// Partial update for an `Element`; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub position: Option<GridPos>,
    pub rotation: Option<Rotation>,
    pub scale: Option<f64>,
    pub kind: Option<ElementKind>,
}

impl ElementPatch {
    pub fn position(position: GridPos) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn rotation(rotation: Rotation) -> Self {
        Self {
            rotation: Some(rotation),
            ..Self::default()
        }
    }

    pub fn scale(scale: f64) -> Self {
        Self {
            scale: Some(scale),
            ..Self::default()
        }
    }
}

// ─── View & metadata ─────────────────────────────────────────────────────

/// Pan/zoom of the canvas. Ephemeral: never persisted, never undoable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub zoom: f64,
    pub offset: ScreenPoint,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            offset: ScreenPoint::ORIGIN,
        }
    }
}

impl ViewState {
    /// Clamp a zoom factor into `[MIN_ZOOM, MAX_ZOOM]`; NaN maps to 1.0.
    pub fn clamp_zoom(zoom: f64) -> f64 {
        if zoom.is_nan() {
            1.0
        } else {
            zoom.clamp(MIN_ZOOM, MAX_ZOOM)
        }
    }

    #[must_use]
    pub fn patched(&self, patch: &ViewPatch) -> Self {
        Self {
            zoom: patch.zoom.map(Self::clamp_zoom).unwrap_or(self.zoom),
            offset: patch.offset.unwrap_or(self.offset),
        }
    }
}

/// Partial update for `ViewState`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewPatch {
    pub zoom: Option<f64>,
    pub offset: Option<ScreenPoint>,
}

/// Name, dirty flag, and schema version of the open scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneMetadata {
    pub name: String,
    pub modified: bool,
    pub version: String,
}

impl Default for SceneMetadata {
    fn default() -> Self {
        Self {
            name: "Untitled".to_string(),
            modified: false,
            version: SCHEMA_VERSION.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_config_rejects_degenerate_values() {
        assert!(GridConfig::new(0, 10, 64.0, 32.0).is_err());
        assert!(GridConfig::new(10, 0, 64.0, 32.0).is_err());
        assert!(GridConfig::new(10, 10, 0.0, 32.0).is_err());
        assert!(GridConfig::new(10, 10, 64.0, -1.0).is_err());
        assert!(GridConfig::new(10, 10, f64::NAN, 32.0).is_err());
        assert!(GridConfig::new(10, 10, 64.0, 32.0).is_ok());
    }

    #[test]
    fn grid_patch_is_validated_as_a_whole() {
        let grid = GridConfig::default();
        let bad = GridPatch {
            grid_width: Some(12),
            tile_height: Some(0.0),
            ..GridPatch::default()
        };
        assert_eq!(
            grid.patched(&bad),
            Err(SceneError::InvalidGrid("tile height must be positive"))
        );
        let good = GridPatch {
            grid_width: Some(12),
            ..GridPatch::default()
        };
        assert_eq!(grid.patched(&good).unwrap().grid_width, 12);
    }

    #[test]
    fn grid_contains_is_half_open() {
        let grid = GridConfig::new(10, 5, 64.0, 32.0).unwrap();
        assert!(grid.contains(GridPos::new(0, 0)));
        assert!(grid.contains(GridPos::new(9, 4)));
        assert!(!grid.contains(GridPos::new(10, 4)));
        assert!(!grid.contains(GridPos::new(9, 5)));
        assert!(!grid.contains(GridPos::new(-1, 0)));
    }

    #[test]
    fn rotation_normalizes_quarter_turns() {
        assert_eq!(Rotation::from_degrees(450), Some(Rotation::Deg90));
        assert_eq!(Rotation::from_degrees(-90), Some(Rotation::Deg270));
        assert_eq!(Rotation::from_degrees(45), None);
        assert_eq!(Rotation::Deg270.rotated_cw(), Rotation::Deg0);
    }

    #[test]
    fn element_serializes_kind_inline() {
        let el = Element::new(
            ElementId::intern("b1"),
            ElementKind::Building {
                floors: 3,
                color: None,
            },
            GridPos::new(2, 4),
        );
        let json = serde_json::to_value(&el).unwrap();
        assert_eq!(json["type"], "building");
        assert_eq!(json["floors"], 3);
        assert_eq!(json["rotation"], 0);
        assert_eq!(json["position"]["x"], 2);
        assert!(json.get("color").is_none());
    }

    #[test]
    fn element_kind_fields_default_when_missing() {
        let el: Element =
            serde_json::from_str(r#"{"id":"t","type":"tree","position":{"x":1,"y":1}}"#).unwrap();
        assert_eq!(
            el.kind,
            ElementKind::Tree {
                species: "oak".to_string()
            }
        );
        assert_eq!(el.rotation, Rotation::Deg0);
        assert_eq!(el.scale, 1.0);
    }

    #[test]
    fn element_rejects_odd_rotation() {
        let res: Result<Element, _> = serde_json::from_str(
            r#"{"id":"t","type":"rock","position":{"x":1,"y":1},"rotation":45}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn patch_with_bad_scale_leaves_element_untouched() {
        let mut el = Element::new(
            ElementId::intern("r1"),
            ElementKind::Rock {},
            GridPos::new(0, 0),
        );
        let patch = ElementPatch {
            position: Some(GridPos::new(5, 5)),
            scale: Some(0.0),
            ..ElementPatch::default()
        };
        assert_eq!(el.apply(&patch), Err(SceneError::InvalidScale(0.0)));
        assert_eq!(el.position, GridPos::new(0, 0));
    }

    #[test]
    fn view_patch_clamps_zoom() {
        let view = ViewState::default().patched(&ViewPatch {
            zoom: Some(5.0),
            offset: None,
        });
        assert_eq!(view.zoom, MAX_ZOOM);
        let view = view.patched(&ViewPatch {
            zoom: Some(0.1),
            offset: Some(ScreenPoint::new(3.0, 4.0)),
        });
        assert_eq!(view.zoom, MIN_ZOOM);
        assert_eq!(view.offset, ScreenPoint::new(3.0, 4.0));
    }
}
